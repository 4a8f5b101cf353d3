//! Per-source ingestion loops.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics_adapters::{DecodeError, Translate};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::sink::Sink;
use crate::stats::{IngestSnapshot, IngestStats, StatsRegistry};

/// Errors reported by a source on its error channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Reading from the transport failed.
    #[error("Read error: {0}")]
    Io(String),

    /// A frame could not be extracted from the byte stream.
    #[error("Framing error: {0}")]
    Frame(String),

    /// A frame was extracted but could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The remote end closed the connection.
    #[error("Connection closed")]
    Closed,
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// The two inbound channels of one source: messages and errors.
#[derive(Debug)]
pub struct SourceChannels<M> {
    pub messages: mpsc::Receiver<M>,
    pub errors: mpsc::Receiver<SourceError>,
}

/// The sending halves matching a [`SourceChannels`].
#[derive(Debug)]
pub struct SourceSenders<M> {
    pub messages: mpsc::Sender<M>,
    pub errors: mpsc::Sender<SourceError>,
}

// Manual impl so `M` does not need to be `Clone`.
impl<M> Clone for SourceSenders<M> {
    fn clone(&self) -> Self {
        Self {
            messages: self.messages.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl<M> SourceChannels<M> {
    /// Create a connected pair of senders and channels, each channel holding
    /// up to `capacity` items.
    pub fn pair(capacity: usize) -> (SourceSenders<M>, Self) {
        let (msg_tx, msg_rx) = mpsc::channel(capacity);
        let (err_tx, err_rx) = mpsc::channel(capacity);
        (
            SourceSenders {
                messages: msg_tx,
                errors: err_tx,
            },
            SourceChannels {
                messages: msg_rx,
                errors: err_rx,
            },
        )
    }
}

/// Drives sources into a sink.
///
/// Each call to [`Ingestor::run`] consumes one source until its message
/// channel closes. Runs for different sources share nothing but the sink and
/// the stats registry, so they can be spawned as independent tasks.
///
/// # Example
///
/// ```rust
/// use metrics_adapters::bolo::BoloTranslator;
/// use metrics_sdk::{Ingestor, Output, SourceChannels};
///
/// #[tokio::main]
/// async fn main() {
///     let (output, mut points) = Output::channel(16);
///     let ingestor = Ingestor::new(output);
///
///     let (tx, channels) = SourceChannels::<Vec<String>>::pair(16);
///     tx.messages
///         .send(vec!["COUNTER".into(), "0".into(), "testCounter".into(), "1".into()])
///         .await
///         .unwrap();
///     drop(tx);
///
///     let stats = ingestor.run(BoloTranslator, channels).await;
///     assert_eq!(stats.points_sent, 1);
///     assert_eq!(points.recv().await.unwrap().name(), "testCounter");
/// }
/// ```
#[derive(Debug)]
pub struct Ingestor<S> {
    sink: Arc<S>,
    stats: Arc<StatsRegistry>,
}

impl<S> Clone for Ingestor<S> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<S: Sink> Ingestor<S> {
    /// Create an ingestor forwarding to `sink`.
    pub fn new(sink: S) -> Self {
        Self::with_shared_sink(Arc::new(sink))
    }

    /// Create an ingestor forwarding to an already shared sink.
    pub fn with_shared_sink(sink: Arc<S>) -> Self {
        Self {
            sink,
            stats: Arc::new(StatsRegistry::default()),
        }
    }

    /// The sink points are forwarded to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Live counters for a source, created on first use.
    pub fn stats(&self, source: &'static str) -> Arc<IngestStats> {
        self.stats.get_or_create(source)
    }

    /// Snapshot the counters of every source seen so far.
    pub fn collect(&self) -> BTreeMap<&'static str, IngestSnapshot> {
        self.stats.collect()
    }

    /// Consume one source until its message channel is closed.
    ///
    /// Every message is translated and any resulting point is forwarded to
    /// the sink before the next message is taken, so points leave in arrival
    /// order. Translation and sink failures are logged and counted, then the
    /// loop moves on. Errors from the source's error channel are logged and
    /// counted too; that channel closing does not end the loop.
    ///
    /// Returns the source's counters as they stand when the loop ends.
    pub async fn run<T>(&self, translator: T, channels: SourceChannels<T::Message>) -> IngestSnapshot
    where
        T: Translate,
    {
        let source = translator.source_name();
        let stats = self.stats(source);
        let SourceChannels {
            mut messages,
            mut errors,
        } = channels;
        let mut errors_open = true;

        info!(source, "Ingestion started");

        loop {
            tokio::select! {
                message = messages.recv() => match message {
                    Some(message) => self.ingest(&translator, &stats, message).await,
                    None => break,
                },
                err = errors.recv(), if errors_open => match err {
                    Some(err) => report_source_error(source, &stats, err),
                    None => {
                        debug!(source, "Error channel closed");
                        errors_open = false;
                    }
                },
            }
        }

        // Errors that raced with the message channel closing
        while let Ok(err) = errors.try_recv() {
            report_source_error(source, &stats, err);
        }

        let snapshot = stats.snapshot();
        info!(
            source,
            received = snapshot.received,
            points_sent = snapshot.points_sent,
            errors = snapshot.errors(),
            "Ingestion finished"
        );
        snapshot
    }

    async fn ingest<T: Translate>(&self, translator: &T, stats: &IngestStats, message: T::Message) {
        let source = translator.source_name();
        stats.record_received();

        match translator.translate(message) {
            Ok(Some(point)) => {
                let name = point.name().to_string();
                match self.sink.send(point).await {
                    Ok(()) => stats.record_sent(),
                    Err(e) => {
                        error!(source, point = %name, "Failed to write point: {}", e);
                        stats.record_sink_error(&e);
                    }
                }
            }
            Ok(None) => stats.record_skipped(),
            Err(e) => {
                warn!(source, "Dropping message: {}", e);
                stats.record_decode_error(&e);
            }
        }
    }
}

fn report_source_error(source: &'static str, stats: &IngestStats, err: SourceError) {
    warn!(source, "Source error: {}", err);
    stats.record_source_error(&err);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use metrics_adapters::bolo::BoloTranslator;
    use metrics_types::Point;
    use parking_lot::Mutex;

    use super::*;
    use crate::output::Output;
    use crate::sink::SinkError;

    fn msg(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// Sink that records points and refuses ones named "reject".
    #[derive(Debug, Default)]
    struct RecordingSink {
        points: Mutex<Vec<Point>>,
    }

    #[async_trait]
    impl Sink for RecordingSink {
        async fn send(&self, point: Point) -> Result<(), SinkError> {
            if point.name() == "reject" {
                return Err(SinkError::Rejected {
                    status: 400,
                    body: "nope".into(),
                });
            }
            self.points.lock().push(point);
            Ok(())
        }
    }

    impl RecordingSink {
        fn names(&self) -> Vec<String> {
            self.points
                .lock()
                .iter()
                .map(|p| p.name().to_string())
                .collect()
        }
    }

    // ========================================================================
    // Message handling
    // ========================================================================

    #[tokio::test]
    async fn bad_messages_do_not_stop_the_loop() {
        let ingestor = Ingestor::new(RecordingSink::default());
        let (tx, channels) = SourceChannels::pair(16);

        for m in [
            msg(&["COUNTER", "0", "first", "1"]),
            msg(&["BOGUS", "0"]),
            msg(&["RATE", "0", "n", "60"]),
            msg(&["COUNTER", "0", "n", "not-a-number"]),
            msg(&["EVENT", "0", "deploy", "started"]),
            msg(&["COUNTER", "0", "second", "2"]),
        ] {
            tx.messages.send(m).await.unwrap();
        }
        drop(tx);

        let stats = ingestor.run(BoloTranslator, channels).await;

        assert_eq!(ingestor.sink().names(), vec!["first", "second"]);
        assert_eq!(stats.received, 6);
        assert_eq!(stats.points_sent, 2);
        assert_eq!(stats.decode_errors, 3);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.sink_errors, 0);
    }

    #[tokio::test]
    async fn sink_errors_are_counted_and_skipped() {
        let ingestor = Ingestor::new(RecordingSink::default());
        let (tx, channels) = SourceChannels::pair(16);

        tx.messages.send(msg(&["COUNTER", "0", "reject", "1"])).await.unwrap();
        tx.messages.send(msg(&["COUNTER", "0", "kept", "1"])).await.unwrap();
        drop(tx);

        let stats = ingestor.run(BoloTranslator, channels).await;

        assert_eq!(ingestor.sink().names(), vec!["kept"]);
        assert_eq!(stats.sink_errors, 1);
        assert_eq!(stats.points_sent, 1);
        assert_eq!(
            stats.last_error.as_deref(),
            Some("Write rejected with status 400: nope")
        );
    }

    #[tokio::test]
    async fn points_keep_arrival_order() {
        let (output, mut rx) = Output::channel(64);
        let ingestor = Ingestor::new(output);
        let (tx, channels) = SourceChannels::pair(64);

        let names: Vec<String> = (0..20).map(|i| format!("m{}", i)).collect();
        for name in &names {
            tx.messages
                .send(msg(&["COUNTER", "0", name.as_str(), "1"]))
                .await
                .unwrap();
        }
        drop(tx);

        ingestor.run(BoloTranslator, channels).await;

        let mut received = Vec::new();
        while let Ok(point) = rx.try_recv() {
            received.push(point.name().to_string());
        }
        assert_eq!(received, names);
    }

    // ========================================================================
    // Error channel and termination
    // ========================================================================

    #[tokio::test]
    async fn source_errors_are_counted() {
        let ingestor = Ingestor::new(RecordingSink::default());
        let (tx, channels) = SourceChannels::pair(16);

        tx.errors
            .send(SourceError::Io("connection reset".into()))
            .await
            .unwrap();
        tx.messages.send(msg(&["COUNTER", "0", "c", "1"])).await.unwrap();
        drop(tx);

        let stats = ingestor.run(BoloTranslator, channels).await;

        assert_eq!(stats.source_errors, 1);
        assert_eq!(stats.points_sent, 1);
    }

    #[tokio::test]
    async fn closed_error_channel_does_not_stop_the_loop() {
        let ingestor = Ingestor::new(RecordingSink::default());
        let (tx, channels) = SourceChannels::pair(16);
        let SourceSenders { messages, errors } = tx;
        drop(errors);

        let run = tokio::spawn({
            let ingestor = ingestor.clone();
            async move { ingestor.run(BoloTranslator, channels).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!run.is_finished());

        messages.send(msg(&["COUNTER", "0", "late", "1"])).await.unwrap();
        drop(messages);

        let stats = run.await.unwrap();
        assert_eq!(stats.points_sent, 1);
        assert_eq!(ingestor.sink().names(), vec!["late"]);
    }

    #[tokio::test]
    async fn stats_are_kept_per_source() {
        let ingestor = Ingestor::new(RecordingSink::default());
        let (tx, channels) = SourceChannels::pair(4);
        tx.messages.send(msg(&["COUNTER", "0", "c", "1"])).await.unwrap();
        drop(tx);

        ingestor.run(BoloTranslator, channels).await;

        let all = ingestor.collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all["bolo"].points_sent, 1);
        assert_eq!(ingestor.stats("bolo").snapshot().received, 1);
    }

    #[test]
    fn source_error_conversions() {
        let err: SourceError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err, SourceError::Io("boom".into()));

        let err: SourceError = DecodeError::Envelope("truncated".into()).into();
        assert_eq!(
            err.to_string(),
            "Decode error: Failed to decode envelope: truncated"
        );
    }
}
