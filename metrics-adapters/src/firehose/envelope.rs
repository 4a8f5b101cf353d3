//! Firehose envelope wire types.
//!
//! These mirror the dropsonde protobuf schema emitted by the platform's
//! loggregator firehose, restricted to the fields this crate reads. Fields
//! of payloads that are never turned into points (HTTP start/stop, log
//! messages, errors) are skipped by the decoder.

use std::collections::HashMap;

use prost::Message;

use crate::DecodeError;

/// Discriminator naming which payload an envelope carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    HttpStartStop = 4,
    LogMessage = 5,
    ValueMetric = 6,
    CounterEvent = 7,
    Error = 8,
    ContainerMetric = 9,
}

impl EventType {
    /// Name of the event type as used in the schema.
    pub const fn label(&self) -> &'static str {
        match self {
            EventType::HttpStartStop => "HttpStartStop",
            EventType::LogMessage => "LogMessage",
            EventType::ValueMetric => "ValueMetric",
            EventType::CounterEvent => "CounterEvent",
            EventType::Error => "Error",
            EventType::ContainerMetric => "ContainerMetric",
        }
    }
}

/// A structured platform event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    /// Unique description of the emitting component.
    #[prost(string, tag = "1")]
    pub origin: String,
    #[prost(enumeration = "EventType", tag = "2")]
    pub event_type: i32,
    /// Nanoseconds since the Unix epoch.
    #[prost(int64, tag = "6")]
    pub timestamp: i64,
    #[prost(message, optional, tag = "9")]
    pub value_metric: Option<ValueMetric>,
    #[prost(message, optional, tag = "10")]
    pub counter_event: Option<CounterEvent>,
    #[prost(message, optional, tag = "12")]
    pub container_metric: Option<ContainerMetric>,
    #[prost(string, tag = "13")]
    pub deployment: String,
    #[prost(string, tag = "14")]
    pub job: String,
    #[prost(string, tag = "15")]
    pub index: String,
    #[prost(string, tag = "16")]
    pub ip: String,
    #[prost(map = "string, string", tag = "17")]
    pub tags: HashMap<String, String>,
}

impl Envelope {
    /// Decode an envelope from its protobuf encoding.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Envelope::decode(bytes).map_err(|e| DecodeError::Envelope(e.to_string()))
    }

    /// The event type, or `None` for discriminators this schema does not know.
    pub fn kind(&self) -> Option<EventType> {
        EventType::try_from(self.event_type).ok()
    }
}

/// A single named gauge value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueMetric {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub value: f64,
    #[prost(string, tag = "3")]
    pub unit: String,
}

/// A counter increment together with the running total.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterEvent {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub delta: u64,
    #[prost(uint64, tag = "3")]
    pub total: u64,
}

/// Resource usage of one application instance container.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContainerMetric {
    #[prost(string, tag = "1")]
    pub application_id: String,
    #[prost(int32, tag = "2")]
    pub instance_index: i32,
    #[prost(double, tag = "3")]
    pub cpu_percentage: f64,
    #[prost(uint64, tag = "4")]
    pub memory_bytes: u64,
    #[prost(uint64, tag = "5")]
    pub disk_bytes: u64,
    #[prost(uint64, tag = "6")]
    pub memory_bytes_quota: u64,
    #[prost(uint64, tag = "7")]
    pub disk_bytes_quota: u64,
}
