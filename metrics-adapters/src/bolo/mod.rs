//! Bolo text protocol adapter.
//!
//! Bolo aggregators broadcast their state as multi-part text messages.
//! This module decodes those messages into [`Pdu`] values and maps the
//! metric-bearing ones onto points.
//!
//! ## Example
//!
//! ```rust
//! use metrics_adapters::bolo::{decode, to_point};
//!
//! let pdu = decode(&["RATE", "1700000000", "http.requests", "60", "12.5"]).unwrap();
//! let point = to_point(pdu).unwrap().expect("RATE is a metric");
//!
//! assert_eq!(point.name(), "http.requests");
//! ```

mod decode;
mod pdu;
mod translate;

pub use decode::decode;
pub use pdu::*;
pub use translate::to_point;

use metrics_types::Point;

use crate::{DecodeError, Translate};

/// Translates raw bolo wire messages (field lists) into points.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoloTranslator;

impl Translate for BoloTranslator {
    type Message = Vec<String>;

    fn source_name(&self) -> &'static str {
        "bolo"
    }

    fn translate(&self, message: Vec<String>) -> Result<Option<Point>, DecodeError> {
        to_point(decode(&message)?)
    }
}
