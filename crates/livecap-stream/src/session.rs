use crate::pump::pump_audio;
use crate::transport::{RecognizeTransport, ResultSource};
use livecap_core::{
    FinalTranscript, PumpPolicy, RecognitionSettings, SessionIdentity, SessionSummary, StreamError,
};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;

/// Drives one duplex recognition session: a spawned audio pump on the send
/// side and a result consumer on the calling task, coordinated only through
/// the stream's half-close semantics. Finalized transcripts go out through
/// the channel obtained from `take_result_receiver`.
pub struct TranscribeSession {
    identity: SessionIdentity,
    settings: RecognitionSettings,
    policy: PumpPolicy,
    result_tx: mpsc::UnboundedSender<FinalTranscript>,
    result_rx: Option<mpsc::UnboundedReceiver<FinalTranscript>>,
}

impl TranscribeSession {
    pub fn new(
        identity: SessionIdentity,
        settings: RecognitionSettings,
        policy: PumpPolicy,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            identity,
            settings,
            policy,
            result_tx,
            result_rx: Some(result_rx),
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn take_result_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<FinalTranscript>> {
        self.result_rx.take()
    }

    /// Run the session to completion. Returns once the service has closed
    /// the receive side and the pump task has been observed, or on the
    /// first fatal error. A consumer failure aborts a still-running pump;
    /// after a clean end-of-stream the pump's terminal error, if any, is
    /// surfaced instead of being silently dropped.
    pub async fn run<R>(
        &mut self,
        transport: &dyn RecognizeTransport,
        source: R,
    ) -> Result<SessionSummary, StreamError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (sink, mut results) = transport.open(&self.identity, &self.settings).await?;

        let policy = self.policy;
        let pump = tokio::spawn(async move { pump_audio(sink, source, policy).await });

        let consumed = self.consume_results(results.as_mut()).await;

        let finals_emitted = match consumed {
            Ok(count) => count,
            Err(e) => {
                pump.abort();
                let _ = pump.await;
                return Err(e);
            }
        };

        let pumped = match pump.await {
            Ok(result) => result?,
            Err(e) => {
                return Err(StreamError::Send(format!("audio pump task failed: {e}")));
            }
        };

        Ok(SessionSummary {
            frames_sent: pumped.frames_sent,
            bytes_sent: pumped.bytes_sent,
            finals_emitted,
        })
    }

    /// Receive frames until clean end-of-stream. Forwards the top
    /// alternative of every final result; interim and alternative-less
    /// results are dropped.
    async fn consume_results(
        &self,
        source: &mut dyn ResultSource,
    ) -> Result<u64, StreamError> {
        let mut finals_emitted = 0u64;
        while let Some(frame) = source.recv().await? {
            for result in frame.results {
                if !result.is_final {
                    tracing::debug!(
                        alternatives = result.alternatives.len(),
                        "interim result dropped"
                    );
                    continue;
                }
                let Some(best) = result.alternatives.into_iter().next() else {
                    continue;
                };
                let transcript = FinalTranscript {
                    text: best.transcript,
                    is_final: result.is_final,
                };
                if self.result_tx.send(transcript).is_err() {
                    tracing::debug!("transcript receiver dropped");
                } else {
                    finals_emitted += 1;
                }
            }
        }
        Ok(finals_emitted)
    }
}
