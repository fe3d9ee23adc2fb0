use crate::transport::AudioSink;
use livecap_core::{AudioChunk, PumpPolicy, SendFailurePolicy, StreamError};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Terminal accounting for one pump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub frames_sent: u64,
    pub bytes_sent: u64,
    pub send_failures: u64,
}

/// Fill `buf` from `source`, tolerating short reads. Returns the bytes
/// filled so far together with any read error; bytes that arrived before
/// the error are still handed to the caller.
async fn read_full<R: AsyncRead + Unpin>(
    source: &mut R,
    buf: &mut [u8],
) -> (usize, Option<std::io::Error>) {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => return (filled, Some(e)),
        }
    }
    (filled, None)
}

/// Read the audio source in fixed-size chunks and forward each non-empty
/// chunk to the sink, in order. On end-of-input the send side is
/// half-closed exactly once, after the last frame, even when zero bytes
/// were read. Send failures follow the configured policy; read failures
/// other than end-of-input are logged and the loop continues.
pub async fn pump_audio<R>(
    mut sink: Box<dyn AudioSink>,
    mut source: R,
    policy: PumpPolicy,
) -> Result<PumpSummary, StreamError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; policy.chunk_bytes];
    let mut summary = PumpSummary::default();
    let mut consecutive_failures: u32 = 0;

    loop {
        let (n, read_err) = read_full(&mut source, &mut buf).await;

        if n > 0 {
            match sink.send(AudioChunk::new(buf[..n].to_vec())).await {
                Ok(()) => {
                    summary.frames_sent += 1;
                    summary.bytes_sent += n as u64;
                    consecutive_failures = 0;
                }
                Err(e) => {
                    summary.send_failures += 1;
                    consecutive_failures += 1;
                    tracing::warn!("could not send audio frame: {e}");
                    if policy.send_failure == SendFailurePolicy::Abort
                        && consecutive_failures >= policy.max_consecutive_send_failures
                    {
                        return Err(StreamError::PumpAborted(consecutive_failures));
                    }
                }
            }
        }

        if let Some(e) = read_err {
            tracing::warn!("could not read audio source: {e}");
            continue;
        }

        if n < policy.chunk_bytes {
            // End of input: nothing else to pipe, half-close the stream.
            sink.close().await?;
            return Ok(summary);
        }
    }
}
