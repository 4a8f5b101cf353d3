//! Firehose envelope adapter.
//!
//! The platform firehose streams protobuf-encoded envelopes describing
//! everything happening on the platform. Counter, value metric and container
//! metric envelopes are turned into points; the rest are ignored.
//!
//! ## Example
//!
//! ```rust
//! use metrics_adapters::firehose::{to_point, ContainerMetric, Envelope, EventType};
//!
//! let envelope = Envelope {
//!     origin: "rep".into(),
//!     event_type: EventType::ContainerMetric as i32,
//!     container_metric: Some(ContainerMetric {
//!         application_id: "abc".into(),
//!         instance_index: 2,
//!         cpu_percentage: 12.5,
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//!
//! let point = to_point(&envelope).unwrap().expect("container metrics are points");
//! assert_eq!(point.name(), "ContainerHealth");
//! assert_eq!(point.tag("app_instance"), Some("2"));
//! ```

mod envelope;
mod translate;

pub use envelope::*;
pub use translate::{to_point, CONTAINER_HEALTH};

use metrics_types::Point;

use crate::{DecodeError, Translate};

/// Translates decoded firehose envelopes into points.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirehoseTranslator;

impl Translate for FirehoseTranslator {
    type Message = Envelope;

    fn source_name(&self) -> &'static str {
        "firehose"
    }

    fn translate(&self, message: Envelope) -> Result<Option<Point>, DecodeError> {
        to_point(&message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translator_delegates_to_to_point() {
        let envelope = Envelope {
            event_type: EventType::ValueMetric as i32,
            value_metric: Some(ValueMetric {
                name: "numCPUS".into(),
                value: 4.0,
                unit: "count".into(),
            }),
            ..Default::default()
        };
        let point = FirehoseTranslator.translate(envelope).unwrap().unwrap();
        assert_eq!(point.name(), "numCPUS");
        assert_eq!(FirehoseTranslator.source_name(), "firehose");
    }

    #[test]
    fn translator_skips_log_messages() {
        let envelope = Envelope {
            event_type: EventType::LogMessage as i32,
            ..Default::default()
        };
        assert!(FirehoseTranslator.translate(envelope).unwrap().is_none());
    }
}
