use crate::convert;
use crate::proto;
use crate::proto::speech_client::SpeechClient;
use async_trait::async_trait;
use livecap_core::{AudioChunk, RecognitionSettings, ResultFrame, SessionIdentity, StreamError};
use livecap_stream::{AudioSink, RecognizeTransport, ResultSource};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Request, Status};

/// Duplex transport backed by the Cloud Speech-to-Text v2 gRPC API. The
/// request stream is fed through a bounded channel; dropping its sender is
/// what gRPC surfaces to the service as the half-close.
pub struct GrpcTransport {
    endpoint: String,
    access_token: String,
}

impl GrpcTransport {
    /// Fails fast with an auth error when no token is configured, before
    /// any network activity.
    pub fn new(endpoint: &str, access_token: &str) -> Result<Self, StreamError> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(StreamError::Auth(
                "no access token configured; set [auth].access_token or GOOGLE_ACCESS_TOKEN"
                    .to_string(),
            ));
        }
        Ok(Self {
            endpoint: endpoint.to_string(),
            access_token: token.to_string(),
        })
    }

    async fn connect(&self) -> Result<SpeechClient<Channel>, StreamError> {
        let endpoint = Endpoint::from_shared(self.endpoint.clone())
            .map_err(|e| {
                StreamError::Connection(format!("invalid endpoint {}: {e}", self.endpoint))
            })?
            .tls_config(ClientTlsConfig::new())
            .map_err(|e| StreamError::Connection(format!("TLS setup failed: {e}")))?;

        tracing::debug!(endpoint = %self.endpoint, "connecting to speech service");
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| StreamError::Connection(e.to_string()))?;
        Ok(SpeechClient::new(channel))
    }
}

fn open_error(status: Status) -> StreamError {
    match status.code() {
        Code::Unauthenticated | Code::PermissionDenied => StreamError::Auth(status.to_string()),
        _ => StreamError::Connection(status.to_string()),
    }
}

fn receive_error(status: Status) -> StreamError {
    match status.code() {
        Code::Unauthenticated | Code::PermissionDenied => StreamError::Auth(status.to_string()),
        _ => StreamError::Receive(status.to_string()),
    }
}

#[async_trait]
impl RecognizeTransport for GrpcTransport {
    async fn open(
        &self,
        identity: &SessionIdentity,
        settings: &RecognitionSettings,
    ) -> Result<(Box<dyn AudioSink>, Box<dyn ResultSource>), StreamError> {
        let mut client = self.connect().await?;

        let (tx, rx) = mpsc::channel::<proto::StreamingRecognizeRequest>(32);
        tx.send(convert::config_request(identity, settings))
            .await
            .map_err(|_| {
                StreamError::Connection("request stream closed before config frame".to_string())
            })?;

        let mut request = Request::new(ReceiverStream::new(rx));
        let bearer: AsciiMetadataValue = format!("Bearer {}", self.access_token)
            .parse()
            .map_err(|_| {
                StreamError::Auth("access token contains non-ASCII characters".to_string())
            })?;
        request.metadata_mut().insert("authorization", bearer);
        // Routing header the official clients attach to streaming calls.
        let params: AsciiMetadataValue = format!("recognizer={}", identity.recognizer())
            .parse()
            .map_err(|_| {
                StreamError::Connection("recognizer path is not valid metadata".to_string())
            })?;
        request.metadata_mut().insert("x-goog-request-params", params);

        let response = client
            .streaming_recognize(request)
            .await
            .map_err(open_error)?;

        tracing::debug!(recognizer = %identity.recognizer(), "streaming session open");
        Ok((
            Box::new(GrpcSink {
                tx,
                recognizer: identity.recognizer().to_string(),
            }),
            Box::new(GrpcSource {
                streaming: response.into_inner(),
            }),
        ))
    }
}

struct GrpcSink {
    tx: mpsc::Sender<proto::StreamingRecognizeRequest>,
    recognizer: String,
}

#[async_trait]
impl AudioSink for GrpcSink {
    async fn send(&mut self, chunk: AudioChunk) -> Result<(), StreamError> {
        self.tx
            .send(convert::audio_request(&self.recognizer, chunk))
            .await
            .map_err(|_| StreamError::Send("request stream closed".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), StreamError> {
        // Dropping the sender ends the request stream, which the service
        // observes as a half-close of the send direction.
        drop(self);
        Ok(())
    }
}

struct GrpcSource {
    streaming: tonic::Streaming<proto::StreamingRecognizeResponse>,
}

#[async_trait]
impl ResultSource for GrpcSource {
    async fn recv(&mut self) -> Result<Option<ResultFrame>, StreamError> {
        match self.streaming.message().await {
            Ok(Some(response)) => Ok(Some(convert::result_frame(response))),
            Ok(None) => Ok(None),
            Err(status) => Err(receive_error(status)),
        }
    }
}
