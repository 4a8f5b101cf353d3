//! Bolo PDU types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use metrics_types::Timestamp;

use crate::DecodeError;

/// The wire tag of a PDU, the first field of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduKind {
    Sample,
    Rate,
    Counter,
    SetKeys,
    State,
    StateTransition,
    Event,
}

impl PduKind {
    /// All known PDU kinds.
    pub const ALL: [PduKind; 7] = [
        PduKind::Sample,
        PduKind::Rate,
        PduKind::Counter,
        PduKind::SetKeys,
        PduKind::State,
        PduKind::StateTransition,
        PduKind::Event,
    ];

    /// The tag as it appears on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PduKind::Sample => "SAMPLE",
            PduKind::Rate => "RATE",
            PduKind::Counter => "COUNTER",
            PduKind::SetKeys => "SET.KEYS",
            PduKind::State => "STATE",
            PduKind::StateTransition => "TRANSITION",
            PduKind::Event => "EVENT",
        }
    }
}

impl fmt::Display for PduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PduKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PduKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownType { tag: s.to_string() })
    }
}

/// Summary statistics over a window of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePdu {
    pub timestamp: Timestamp,
    pub name: String,
    pub sample_size: i64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
}

/// A per-second rate computed over a window.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePdu {
    pub timestamp: Timestamp,
    pub name: String,
    /// Window length in seconds.
    pub window: i64,
    pub value: f64,
}

/// A monotonically increasing counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterPdu {
    pub timestamp: Timestamp,
    pub name: String,
    pub value: f64,
}

/// Key/value pairs broadcast by the aggregator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetKeysPdu {
    pub keys: BTreeMap<String, String>,
}

/// The state of a check. Shared by STATE and TRANSITION PDUs.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePdu {
    pub timestamp: Timestamp,
    pub name: String,
    pub stale: i64,
    pub state_code: i64,
    pub summary: String,
}

/// A free-form event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPdu {
    pub timestamp: Timestamp,
    pub name: String,
    pub event: String,
}

/// A decoded bolo protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    Sample(SamplePdu),
    Rate(RatePdu),
    Counter(CounterPdu),
    SetKeys(SetKeysPdu),
    State(StatePdu),
    /// Like `State`, but only broadcast when the state changes.
    StateTransition(StatePdu),
    Event(EventPdu),
}

impl Pdu {
    /// Decode a PDU from its wire fields. See [`super::decode`].
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, DecodeError> {
        super::decode(fields)
    }

    /// The wire tag of this PDU.
    pub fn kind(&self) -> PduKind {
        match self {
            Pdu::Sample(_) => PduKind::Sample,
            Pdu::Rate(_) => PduKind::Rate,
            Pdu::Counter(_) => PduKind::Counter,
            Pdu::SetKeys(_) => PduKind::SetKeys,
            Pdu::State(_) => PduKind::State,
            Pdu::StateTransition(_) => PduKind::StateTransition,
            Pdu::Event(_) => PduKind::Event,
        }
    }
}

impl fmt::Display for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pdu::Sample(p) => write!(
                f,
                "{}: Samples: {}, Min: {:.6}, Max: {:.6}, Sum: {:.6}, Mean: {:.6}, Variance: {:.6}",
                p.name, p.sample_size, p.min, p.max, p.sum, p.mean, p.variance
            ),
            Pdu::Rate(p) => write!(f, "{}: {:.6} ({} sec window)", p.name, p.value, p.window),
            Pdu::Counter(p) => write!(f, "{}: {:.6}", p.name, p.value),
            Pdu::SetKeys(p) => {
                for (i, (k, v)) in p.keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                Ok(())
            }
            Pdu::State(p) | Pdu::StateTransition(p) => {
                write!(f, "{}: {} {}", p.name, p.state_code, p.summary)
            }
            Pdu::Event(p) => write!(f, "{}: {}", p.name, p.event),
        }
    }
}
