pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, PumpPolicy, SendFailurePolicy};
pub use error::{ConfigError, StreamError};
pub use types::{
    AudioChunk, FinalTranscript, RecognitionResult, RecognitionSettings, ResultFrame,
    SessionIdentity, SessionSummary, TranscriptAlternative,
};
