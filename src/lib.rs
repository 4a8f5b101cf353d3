//! # firehose2influxdb
//!
//! Forwards platform metrics into InfluxDB.
//!
//! Two kinds of sources are supported, each consumed by its own ingestion
//! loop:
//!
//! - **bolo**: text PDUs from a bolo aggregator, of which SAMPLE, RATE and
//!   COUNTER become points
//! - **firehose**: protobuf envelopes from the platform firehose, of which
//!   counter events, value metrics and container metrics become points
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   Vec<String>   ┌──────────────────────────┐
//! │ source::pdu  │────────────────▶│ Ingestor (BoloTranslator) │──┐
//! └──────────────┘                 └──────────────────────────┘  │   ┌────────┐
//!                                                                ├──▶│ Output │
//! ┌──────────────────┐  Envelope   ┌──────────────────────────────┐  │   └────────┘
//! │ source::envelope │────────────▶│ Ingestor (FirehoseTranslator) │──┘
//! └──────────────────┘             └──────────────────────────────┘
//! ```
//!
//! - **[`config`]**: JSON configuration with environment overrides
//! - **[`source`]**: TCP readers that frame the two wire formats
//! - **[`app`]**: connects the sources and runs one loop per source
//!
//! ## Usage
//!
//! ```bash
//! firehose2influxdb --config firehose2influxdb.conf
//! ```
//!
//! ### As a library with a channel output
//!
//! ```
//! use firehose2influxdb::app::{ingest, Sources};
//! use firehose2influxdb::source::pdu;
//! use metrics_sdk::{Ingestor, Output};
//! use std::io::Cursor;
//!
//! # tokio_test::block_on(async {
//! let (output, mut points) = Output::channel(16);
//! let data = b"COUNTER\t0\ttestCounter\t1\n";
//! let sources = Sources {
//!     bolo: Some(pdu::spawn(Cursor::new(data.to_vec()), "example", 16)),
//!     firehose: None,
//! };
//!
//! let stats = ingest(Ingestor::new(output), sources).await.unwrap();
//! assert_eq!(stats["bolo"].points_sent, 1);
//! assert_eq!(points.recv().await.unwrap().name(), "testCounter");
//! # });
//! ```

pub mod app;
pub mod config;
pub mod source;

// Re-export main types for convenience
pub use app::{App, Sources};
pub use config::{Config, InfluxConfig, OutputKind, SourceConfig};
