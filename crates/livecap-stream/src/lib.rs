pub mod null_transport;
pub mod pump;
pub mod session;
pub mod transport;

pub use null_transport::NullTransport;
pub use pump::{pump_audio, PumpSummary};
pub use session::TranscribeSession;
pub use transport::{AudioSink, RecognizeTransport, ResultSource};
