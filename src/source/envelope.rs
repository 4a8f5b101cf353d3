//! Firehose envelope stream reader.
//!
//! Envelopes arrive as protobuf messages, each preceded by its length as a
//! base-128 varint (the framing protobuf itself uses for length-delimited
//! streams).

use metrics_adapters::firehose::Envelope;
use metrics_sdk::{SourceChannels, SourceError, SourceSenders};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::report;

/// Largest frame accepted from the stream.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Longest encoding of a 64-bit varint.
const MAX_VARINT_LEN: usize = 10;

/// Spawn a background task reading length-delimited envelopes from `reader`.
///
/// Frames that do not decode are reported on the error channel and skipped.
/// A bad length prefix ends the stream, since frame boundaries are lost.
pub fn spawn<R>(reader: R, description: &str, capacity: usize) -> SourceChannels<Envelope>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (senders, channels) = SourceChannels::pair(capacity);
    tokio::spawn(read_envelopes(reader, description.to_string(), senders));
    channels
}

/// Create an envelope source from a raw bytes channel.
///
/// Each item is one protobuf-encoded envelope without a length prefix. This
/// is useful when another transport already delivers whole messages.
pub fn from_bytes_channel(
    mut rx: mpsc::Receiver<Vec<u8>>,
    description: &str,
    capacity: usize,
) -> SourceChannels<Envelope> {
    let (senders, channels) = SourceChannels::pair(capacity);
    let description = description.to_string();

    tokio::spawn(async move {
        while let Some(bytes) = rx.recv().await {
            if !forward(&senders, &description, &bytes).await {
                break;
            }
        }
        debug!(source = %description, "Envelope channel finished");
    });

    channels
}

async fn read_envelopes<R>(reader: R, description: String, senders: SourceSenders<Envelope>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);

    loop {
        match read_frame(&mut reader).await {
            Ok(Some(frame)) => {
                if !forward(&senders, &description, &frame).await {
                    break;
                }
            }
            Ok(None) => {
                report(&senders, &description, SourceError::Closed).await;
                break;
            }
            Err(e) => {
                report(&senders, &description, e).await;
                break;
            }
        }
    }

    debug!(source = %description, "Envelope reader finished");
}

/// Decode one envelope and pass it on. Returns `false` once the ingestion
/// side has gone away.
async fn forward(senders: &SourceSenders<Envelope>, description: &str, bytes: &[u8]) -> bool {
    match Envelope::decode_bytes(bytes) {
        Ok(envelope) => senders.messages.send(envelope).await.is_ok(),
        Err(e) => report(senders, description, e.into()).await,
    }
}

/// Read one length-prefixed frame.
///
/// Returns `Ok(None)` on a clean end of stream between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, SourceError>
where
    R: AsyncRead + Unpin,
{
    let Some(len) = read_length(reader).await? else {
        return Ok(None);
    };
    if len > MAX_FRAME_LEN {
        return Err(SourceError::Frame(format!(
            "frame of {} bytes exceeds the {} byte limit",
            len, MAX_FRAME_LEN
        )));
    }

    let mut frame = vec![0u8; len];
    reader.read_exact(&mut frame).await?;
    Ok(Some(frame))
}

async fn read_length<R>(reader: &mut R) -> Result<Option<usize>, SourceError>
where
    R: AsyncRead + Unpin,
{
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if i == 0 && e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return usize::try_from(value)
                .map(Some)
                .map_err(|_| SourceError::Frame(format!("frame length {} overflows", value)));
        }
    }
    Err(SourceError::Frame("frame length prefix is too long".to_string()))
}
