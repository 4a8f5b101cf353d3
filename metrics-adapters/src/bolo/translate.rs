//! PDU to point translation.

use metrics_types::{Point, PointBuilder};
use tracing::debug;

use super::pdu::Pdu;
use crate::DecodeError;

/// Translate a decoded PDU into a metric point.
///
/// SAMPLE, RATE and COUNTER PDUs are metrics. SET.KEYS, STATE, TRANSITION
/// and EVENT PDUs are not, and yield `Ok(None)`.
///
/// Points from this source carry no tags. The only possible error is a
/// `PointConstruction` failure for PDUs whose values cannot be stored
/// (an empty name, or a NaN/infinite float).
pub fn to_point(pdu: Pdu) -> Result<Option<Point>, DecodeError> {
    let builder = match pdu {
        Pdu::Sample(s) => Point::builder(s.name)
            .field("Min", s.min)
            .field("Max", s.max)
            .field("Sum", s.sum)
            .field("Samples", s.sample_size)
            .field("Mean", s.mean)
            .field("Variance", s.variance)
            .timestamp(s.timestamp),
        Pdu::Rate(r) => Point::builder(r.name)
            .field("Window", r.window)
            .field("Value", r.value)
            .timestamp(r.timestamp),
        Pdu::Counter(c) => Point::builder(c.name)
            .field("Value", c.value)
            .timestamp(c.timestamp),
        other @ (Pdu::SetKeys(_) | Pdu::State(_) | Pdu::StateTransition(_) | Pdu::Event(_)) => {
            debug!("Ignoring PDU type '{}' - not a metric", other.kind());
            return Ok(None);
        }
    };
    build(builder).map(Some)
}

fn build(builder: PointBuilder) -> Result<Point, DecodeError> {
    let name = builder.name().to_string();
    builder
        .build()
        .map_err(|source| DecodeError::PointConstruction { name, source })
}
