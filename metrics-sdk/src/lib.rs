//! # metrics-sdk
//!
//! Sinks and ingestion loops for forwarding metric points to storage.
//!
//! A source hands its messages and errors over on a pair of channels
//! ([`SourceChannels`]). An [`Ingestor`] consumes those channels, translates
//! each message with a [`metrics_adapters::Translate`] implementation and
//! forwards the resulting points to a [`Sink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metrics_adapters::bolo::BoloTranslator;
//! use metrics_sdk::{InfluxSink, Ingestor, Output, SourceChannels};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = InfluxSink::builder()
//!         .url("http://localhost:8086")
//!         .database("metrics")
//!         .credentials("admin", "secret")
//!         .build()?;
//!     let ingestor = Ingestor::new(Output::influx(sink));
//!
//!     // Hand the senders to whatever reads the transport
//!     let (senders, channels) = SourceChannels::<Vec<String>>::pair(1024);
//!     # drop(senders);
//!
//!     let stats = ingestor.run(BoloTranslator, channels).await;
//!     println!("{} points written", stats.points_sent);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **One loop per source**: sources never share state, so run them as
//!   separate tasks
//! - **Failure isolation**: bad messages and refused points are counted and
//!   logged, never fatal
//! - **Multiple outputs**: InfluxDB, stdout, or custom channel

mod ingest;
mod output;
mod sink;
mod stats;

pub use ingest::{Ingestor, SourceChannels, SourceError, SourceSenders};
pub use output::Output;
pub use sink::{Sink, SinkError};
pub use stats::{IngestSnapshot, IngestStats};

#[cfg(feature = "influx")]
pub use output::{InfluxSink, InfluxSinkBuilder};

// Re-export types for convenience
pub use metrics_types::Point;
