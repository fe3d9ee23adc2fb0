use crate::transport::{AudioSink, RecognizeTransport, ResultSource};
use async_trait::async_trait;
use livecap_core::{AudioChunk, RecognitionSettings, ResultFrame, SessionIdentity, StreamError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-process transport that records everything sent and replays a scripted
/// sequence of result frames. Used by tests in place of the network.
#[derive(Clone, Default)]
pub struct NullTransport {
    inner: Arc<NullInner>,
}

#[derive(Default)]
struct NullInner {
    opened: Mutex<Vec<String>>,
    sent: Mutex<Vec<Vec<u8>>>,
    close_count: AtomicUsize,
    fail_sends: AtomicBool,
    script: Mutex<VecDeque<ScriptStep>>,
}

enum ScriptStep {
    Frame(ResultFrame),
    Error(StreamError),
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result frame the receive side will hand out in order.
    pub fn push_frame(&self, frame: ResultFrame) {
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(ScriptStep::Frame(frame));
    }

    /// Queue a receive error; the script is consumed in order.
    pub fn push_error(&self, err: StreamError) {
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(ScriptStep::Error(err));
    }

    /// Make every subsequent `send` fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.inner.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.inner.sent.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.inner.close_count.load(Ordering::SeqCst)
    }

    /// Recognizer paths seen by `open`, one per session.
    pub fn opened_recognizers(&self) -> Vec<String> {
        self.inner.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecognizeTransport for NullTransport {
    async fn open(
        &self,
        identity: &SessionIdentity,
        _settings: &RecognitionSettings,
    ) -> Result<(Box<dyn AudioSink>, Box<dyn ResultSource>), StreamError> {
        self.inner
            .opened
            .lock()
            .unwrap()
            .push(identity.recognizer().to_string());
        Ok((
            Box::new(NullSink {
                inner: Arc::clone(&self.inner),
            }),
            Box::new(NullSource {
                inner: Arc::clone(&self.inner),
            }),
        ))
    }
}

struct NullSink {
    inner: Arc<NullInner>,
}

#[async_trait]
impl AudioSink for NullSink {
    async fn send(&mut self, chunk: AudioChunk) -> Result<(), StreamError> {
        if self.inner.fail_sends.load(Ordering::SeqCst) {
            return Err(StreamError::Send("null transport send failure".to_string()));
        }
        self.inner.sent.lock().unwrap().push(chunk.data);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StreamError> {
        self.inner.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct NullSource {
    inner: Arc<NullInner>,
}

#[async_trait]
impl ResultSource for NullSource {
    async fn recv(&mut self) -> Result<Option<ResultFrame>, StreamError> {
        match self.inner.script.lock().unwrap().pop_front() {
            Some(ScriptStep::Frame(frame)) => Ok(Some(frame)),
            Some(ScriptStep::Error(err)) => Err(err),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecap_core::{RecognitionResult, TranscriptAlternative};

    fn open_args() -> (SessionIdentity, RecognitionSettings) {
        (
            SessionIdentity::new("test-project"),
            RecognitionSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_null_transport_records_open() {
        let transport = NullTransport::new();
        let (identity, settings) = open_args();
        let _ = transport.open(&identity, &settings).await.unwrap();
        assert_eq!(
            transport.opened_recognizers(),
            vec!["projects/test-project/locations/global/recognizers/_"],
        );
    }

    #[tokio::test]
    async fn test_null_transport_records_sent_frames_in_order() {
        let transport = NullTransport::new();
        let (identity, settings) = open_args();
        let (mut sink, _source) = transport.open(&identity, &settings).await.unwrap();

        sink.send(AudioChunk::new(vec![1, 2])).await.unwrap();
        sink.send(AudioChunk::new(vec![3])).await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(transport.sent_frames(), vec![vec![1, 2], vec![3]]);
        assert_eq!(transport.close_count(), 1);
    }

    #[tokio::test]
    async fn test_null_transport_fail_sends() {
        let transport = NullTransport::new();
        transport.set_fail_sends(true);
        let (identity, settings) = open_args();
        let (mut sink, _source) = transport.open(&identity, &settings).await.unwrap();

        let result = sink.send(AudioChunk::new(vec![1])).await;
        match result {
            Err(StreamError::Send(_)) => {}
            _ => panic!("expected Send error"),
        }
        assert!(transport.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn test_null_transport_scripted_results_then_eos() {
        let transport = NullTransport::new();
        transport.push_frame(ResultFrame {
            results: vec![RecognitionResult {
                alternatives: vec![TranscriptAlternative {
                    transcript: "hello".to_string(),
                    confidence: 0.9,
                }],
                is_final: true,
            }],
        });
        let (identity, settings) = open_args();
        let (_sink, mut source) = transport.open(&identity, &settings).await.unwrap();

        let frame = source.recv().await.unwrap().unwrap();
        assert_eq!(frame.results.len(), 1);
        assert!(source.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_transport_scripted_error() {
        let transport = NullTransport::new();
        transport.push_error(StreamError::Receive("broken".to_string()));
        let (identity, settings) = open_args();
        let (_sink, mut source) = transport.open(&identity, &settings).await.unwrap();

        match source.recv().await {
            Err(StreamError::Receive(msg)) => assert_eq!(msg, "broken"),
            _ => panic!("expected Receive error"),
        }
    }
}
