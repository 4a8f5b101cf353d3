//! Envelope to point translation.

use metrics_types::{merge_tags, Point, PointBuilder, Tags, Timestamp};
use tracing::debug;

use super::envelope::{Envelope, EventType};
use crate::DecodeError;

/// Measurement name for container resource usage points.
pub const CONTAINER_HEALTH: &str = "ContainerHealth";

/// Translate a firehose envelope into a metric point.
///
/// Counter, container and value metric envelopes become points; every
/// other event type yields `Ok(None)`.
///
/// All points are tagged with the emitting component (`origin`, `job`,
/// `index`, `deployment`, `ip_addr`). Tags carried by the envelope itself
/// are applied first, so those five always win on a name collision.
pub fn to_point(envelope: &Envelope) -> Result<Option<Point>, DecodeError> {
    let Some(kind) = envelope.kind() else {
        debug!(
            event_type = envelope.event_type,
            "Ignoring envelope with unknown event type"
        );
        return Ok(None);
    };

    let tags = envelope_tags(envelope);
    let timestamp = Timestamp::from_nanos(envelope.timestamp);

    let builder = match kind {
        EventType::CounterEvent => {
            let evt = payload(kind, envelope.counter_event.as_ref())?;
            Point::builder(evt.name.as_str())
                .tags(tags)
                .field("Delta", evt.delta)
                .field("Total", evt.total)
        }
        EventType::ContainerMetric => {
            let metric = payload(kind, envelope.container_metric.as_ref())?;
            Point::builder(CONTAINER_HEALTH)
                .tags(tags)
                .tag("app_guid", metric.application_id.as_str())
                .tag("app_instance", metric.instance_index.to_string())
                .field("CPU", metric.cpu_percentage)
                .field("Memory", metric.memory_bytes)
                .field("MemoryQuota", metric.memory_bytes_quota)
                .field("Disk", metric.disk_bytes)
                .field("DiskQuota", metric.disk_bytes_quota)
        }
        EventType::ValueMetric => {
            let metric = payload(kind, envelope.value_metric.as_ref())?;
            Point::builder(metric.name.as_str())
                .tags(tags)
                .field("Value", metric.value)
        }
        EventType::HttpStartStop | EventType::LogMessage | EventType::Error => {
            debug!("Ignoring {} envelope - not a metric", kind.label());
            return Ok(None);
        }
    };

    build(builder.timestamp(timestamp)).map(Some)
}

/// The envelope's own tags overlaid with the tags derived from its origin.
fn envelope_tags(envelope: &Envelope) -> Tags {
    let derived = [
        ("origin", envelope.origin.as_str()),
        ("job", envelope.job.as_str()),
        ("index", envelope.index.as_str()),
        ("deployment", envelope.deployment.as_str()),
        ("ip_addr", envelope.ip.as_str()),
    ];
    merge_tags(
        envelope
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
        derived,
    )
}

fn payload<T>(kind: EventType, payload: Option<&T>) -> Result<&T, DecodeError> {
    payload.ok_or(DecodeError::MissingPayload {
        event_type: kind.label(),
    })
}

fn build(builder: PointBuilder) -> Result<Point, DecodeError> {
    let name = builder.name().to_string();
    builder
        .build()
        .map_err(|source| DecodeError::PointConstruction { name, source })
}
