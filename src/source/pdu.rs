//! Bolo PDU stream reader.
//!
//! One PDU per line. The parts of a message are separated by TAB
//! characters; NUL padding inside a part is left for the decoder to strip.

use metrics_sdk::{SourceChannels, SourceError, SourceSenders};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing::debug;

use super::report;

/// Separator between the parts of one message.
pub const FIELD_SEPARATOR: char = '\t';

/// Largest accepted line, terminator included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Spawn a background task reading PDU messages from `reader`.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use firehose2influxdb::source::pdu;
///
/// # tokio_test::block_on(async {
/// let data = b"COUNTER\t0\ttestCounter\t1\n";
/// let mut channels = pdu::spawn(Cursor::new(data.to_vec()), "example", 16);
///
/// let message = channels.messages.recv().await.unwrap();
/// assert_eq!(message, ["COUNTER", "0", "testCounter", "1"]);
/// # });
/// ```
pub fn spawn<R>(reader: R, description: &str, capacity: usize) -> SourceChannels<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (senders, channels) = SourceChannels::pair(capacity);
    tokio::spawn(read_messages(reader, description.to_string(), senders));
    channels
}

async fn read_messages<R>(reader: R, description: String, senders: SourceSenders<Vec<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        let limit = (MAX_LINE_LEN + 1) as u64;
        match (&mut reader).take(limit).read_until(b'\n', &mut line).await {
            Ok(0) => {
                report(&senders, &description, SourceError::Closed).await;
                break;
            }
            Ok(n) if n > MAX_LINE_LEN => {
                let err = SourceError::Frame(format!("PDU line exceeds {} bytes", MAX_LINE_LEN));
                report(&senders, &description, err).await;
                break;
            }
            Ok(_) => match parse_line(&line) {
                Ok(Some(fields)) => {
                    if senders.messages.send(fields).await.is_err() {
                        // Receiver dropped
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    if !report(&senders, &description, e).await {
                        break;
                    }
                }
            },
            Err(e) => {
                report(&senders, &description, e.into()).await;
                break;
            }
        }
    }

    debug!(source = %description, "PDU reader finished");
}

/// Split one line into the parts of a message.
///
/// Blank lines carry no message and yield `Ok(None)`.
pub fn parse_line(line: &[u8]) -> Result<Option<Vec<String>>, SourceError> {
    let text = std::str::from_utf8(line)
        .map_err(|e| SourceError::Frame(format!("PDU is not valid UTF-8: {}", e)))?;
    let text = text.trim_end_matches(&['\r', '\n'][..]);
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(text.split(FIELD_SEPARATOR).map(str::to_string).collect()))
}
