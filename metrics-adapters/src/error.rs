//! Error types for decoding and translation.

use metrics_types::PointError;
use thiserror::Error;

/// Longest message snippet carried inside an error.
const MAX_SNIPPET_LEN: usize = 128;

/// Errors that can occur while decoding a message or translating it into a
/// point.
///
/// Every variant identifies the offending message (by type tag and a
/// bounded snippet, or by envelope event type) so callers can log or count
/// failures without holding on to the message itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The PDU type tag is not one of the known types.
    #[error("Invalid PDU type '{tag}' detected")]
    UnknownType { tag: String },

    /// Too few fields for the PDU type, or an unpaired SET.KEYS key.
    #[error("Malformed {kind} PDU: [{message}]")]
    Malformed { kind: String, message: String },

    /// A field is present but cannot be parsed as its required type.
    #[error("Invalid {field} '{value}' for {kind} PDU: {reason}")]
    InvalidField {
        kind: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The decoded values do not make a valid point.
    #[error("Unable to build point '{name}': {source}")]
    PointConstruction {
        name: String,
        #[source]
        source: PointError,
    },

    /// A metric envelope arrived without the payload its event type names.
    #[error("{event_type} envelope carries no {event_type} payload")]
    MissingPayload { event_type: &'static str },

    /// The envelope bytes are not a valid envelope.
    #[error("Failed to decode envelope: {0}")]
    Envelope(String),
}

impl DecodeError {
    /// Name of the field implicated in the failure, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DecodeError::InvalidField { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub(crate) fn malformed<S: AsRef<str>>(kind: &str, fields: &[S]) -> Self {
        DecodeError::Malformed {
            kind: kind.to_string(),
            message: snippet(fields),
        }
    }
}

/// Join message fields for display, cut to a bounded length.
pub(crate) fn snippet<S: AsRef<str>>(fields: &[S]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(field.as_ref());
        if out.len() > MAX_SNIPPET_LEN {
            break;
        }
    }
    if out.len() > MAX_SNIPPET_LEN {
        let mut cut = MAX_SNIPPET_LEN;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_joins_fields() {
        assert_eq!(snippet(&["RATE", "0", "n", "60"]), "RATE 0 n 60");
        assert_eq!(snippet::<&str>(&[]), "");
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(500);
        let s = snippet(&["EVENT", long.as_str()]);
        assert_eq!(s.len(), MAX_SNIPPET_LEN + 3);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn snippet_cuts_on_char_boundary() {
        let long = "é".repeat(200);
        let s = snippet(&[long.as_str()]);
        assert!(s.ends_with("..."));
        assert!(s.len() <= MAX_SNIPPET_LEN + 3);
    }

    #[test]
    fn display_messages() {
        let err = DecodeError::InvalidField {
            kind: "COUNTER".into(),
            field: "value",
            value: "not-a-number".into(),
            reason: "invalid float literal".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'not-a-number' for COUNTER PDU: invalid float literal"
        );
        assert_eq!(err.field(), Some("value"));

        let err = DecodeError::malformed("RATE", &["RATE", "0", "n", "60"]);
        assert_eq!(err.to_string(), "Malformed RATE PDU: [RATE 0 n 60]");
        assert_eq!(err.field(), None);

        let err = DecodeError::MissingPayload {
            event_type: "CounterEvent",
        };
        assert_eq!(
            err.to_string(),
            "CounterEvent envelope carries no CounterEvent payload"
        );
    }
}
