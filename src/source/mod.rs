//! Transport readers feeding the ingestion loops.
//!
//! Each reader is spawned as a background task that owns its transport and
//! hands decoded messages and transport errors over on a
//! [`SourceChannels`](metrics_sdk::SourceChannels) pair. The task ends, and
//! closes the message channel, when the transport reaches end of stream or
//! fails; there is no reconnect.
//!
//! - [`pdu`]: newline-delimited bolo PDUs with TAB-separated fields
//! - [`envelope`]: varint length-delimited protobuf firehose envelopes

pub mod envelope;
pub mod pdu;

use metrics_sdk::{SourceError, SourceSenders};
use tracing::debug;

/// Hand an error to the ingestion loop.
///
/// Returns `false` once nobody is listening for errors anymore.
async fn report<M>(senders: &SourceSenders<M>, description: &str, err: SourceError) -> bool {
    debug!(source = %description, "Reporting source error: {}", err);
    senders.errors.send(err).await.is_ok()
}
