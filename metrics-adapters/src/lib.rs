//! # metrics-adapters
//!
//! Decoders that turn monitoring wire formats into [`Point`]s.
//!
//! ## Supported Sources
//!
//! - **Bolo** (`bolo` feature) - Multi-part text PDUs broadcast by bolo
//!   aggregators (SAMPLE, RATE, COUNTER and the non-metric types)
//! - **Firehose** (`firehose` feature) - Protobuf envelopes from the platform
//!   firehose (counter events, value metrics, container metrics)
//!
//! Each source exposes a `decode` step, a `to_point` step and a translator
//! implementing [`Translate`], which is what ingestion loops are generic over.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "bolo")]
//! # {
//! use metrics_adapters::bolo::BoloTranslator;
//! use metrics_adapters::Translate;
//!
//! let message = vec!["COUNTER".to_string(), "0".into(), "testCounter".into(), "1".into()];
//! let point = BoloTranslator.translate(message).unwrap().unwrap();
//!
//! assert_eq!(point.to_line_protocol(), "testCounter Value=1 0");
//! # }
//! ```

pub mod error;

#[cfg(feature = "bolo")]
pub mod bolo;

#[cfg(feature = "firehose")]
pub mod firehose;

pub use error::DecodeError;

// Re-export types for convenience
pub use metrics_types::{FieldValue, Point, Tags, Timestamp};

/// Converts one wire message of a source into at most one point.
///
/// `Ok(None)` means the message was valid but carries no metric.
pub trait Translate: Send + Sync {
    /// The decoded-enough form a source stream hands over.
    type Message: Send;

    /// Short name of the source, used in logs and statistics.
    fn source_name(&self) -> &'static str;

    /// Translate one message.
    fn translate(&self, message: Self::Message) -> Result<Option<Point>, DecodeError>;
}
