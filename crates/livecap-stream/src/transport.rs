use async_trait::async_trait;
use livecap_core::{AudioChunk, RecognitionSettings, ResultFrame, SessionIdentity, StreamError};

/// Factory for one duplex stream to a recognition service. `open` must
/// transmit the configuration frame before returning; the two halves it
/// hands back are driven independently.
#[async_trait]
pub trait RecognizeTransport: Send + Sync {
    async fn open(
        &self,
        identity: &SessionIdentity,
        settings: &RecognitionSettings,
    ) -> Result<(Box<dyn AudioSink>, Box<dyn ResultSource>), StreamError>;
}

/// Send direction of the stream. `close` consumes the sink, so the send
/// side can only ever be half-closed once.
#[async_trait]
pub trait AudioSink: Send {
    async fn send(&mut self, chunk: AudioChunk) -> Result<(), StreamError>;
    async fn close(self: Box<Self>) -> Result<(), StreamError>;
}

/// Receive direction of the stream. `Ok(None)` is the service's clean
/// end-of-stream; any `Err` is fatal to the session.
#[async_trait]
pub trait ResultSource: Send {
    async fn recv(&mut self) -> Result<Option<ResultFrame>, StreamError>;
}
