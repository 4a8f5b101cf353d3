//! Bolo wire message decoding.
//!
//! A message is an ordered list of string fields. The first field is the
//! type tag; the remaining fields are laid out per type:
//!
//! ```text
//! SAMPLE      <ts> <name> <n> <min> <max> <sum> <mean> <var>
//! RATE        <ts> <name> <window> <value>
//! COUNTER     <ts> <name> <value>
//! EVENT       <ts> <name> <extra>
//! STATE       <name> <ts> <stale> <code> <summary>
//! TRANSITION  <name> <ts> <stale> <code> <summary>
//! SET.KEYS    <key> <value> [<key> <value> ...]
//! ```
//!
//! STATE and TRANSITION put the name before the timestamp. That is how the
//! aggregator emits them.

use std::collections::BTreeMap;

use metrics_types::Timestamp;

use super::pdu::*;
use crate::DecodeError;

/// Decode one wire message into a [`Pdu`].
///
/// NUL padding is stripped from both ends of every field before it is
/// interpreted. Decoding stops at the first field that fails to parse.
///
/// # Example
///
/// ```rust
/// use metrics_adapters::bolo::{decode, Pdu};
///
/// let pdu = decode(&["COUNTER\0", "0", "testCounter", "1"]).unwrap();
/// match pdu {
///     Pdu::Counter(c) => assert_eq!(c.value, 1.0),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn decode<S: AsRef<str>>(message: &[S]) -> Result<Pdu, DecodeError> {
    let fields: Vec<&str> = message
        .iter()
        .map(|f| f.as_ref().trim_matches('\0'))
        .collect();

    let Some(tag) = fields.first() else {
        return Err(DecodeError::malformed("<empty>", &fields));
    };
    let kind: PduKind = tag.parse()?;
    let msg = Message {
        kind,
        fields: &fields,
    };

    match kind {
        PduKind::Sample => {
            msg.require(9)?;
            Ok(Pdu::Sample(SamplePdu {
                timestamp: msg.timestamp(1)?,
                name: msg.text(2),
                sample_size: msg.int(3, "sample_size")?,
                min: msg.float(4, "min")?,
                max: msg.float(5, "max")?,
                sum: msg.float(6, "sum")?,
                mean: msg.float(7, "mean")?,
                variance: msg.float(8, "variance")?,
            }))
        }
        PduKind::Rate => {
            msg.require(5)?;
            Ok(Pdu::Rate(RatePdu {
                timestamp: msg.timestamp(1)?,
                name: msg.text(2),
                window: msg.int(3, "window")?,
                value: msg.float(4, "value")?,
            }))
        }
        PduKind::Counter => {
            msg.require(4)?;
            Ok(Pdu::Counter(CounterPdu {
                timestamp: msg.timestamp(1)?,
                name: msg.text(2),
                value: msg.float(3, "value")?,
            }))
        }
        PduKind::Event => {
            msg.require(4)?;
            Ok(Pdu::Event(EventPdu {
                timestamp: msg.timestamp(1)?,
                name: msg.text(2),
                event: msg.text(3),
            }))
        }
        PduKind::State => {
            msg.require(6)?;
            Ok(Pdu::State(msg.state()?))
        }
        PduKind::StateTransition => {
            msg.require(6)?;
            Ok(Pdu::StateTransition(msg.state()?))
        }
        PduKind::SetKeys => {
            let pairs = &fields[1..];
            if pairs.len() % 2 != 0 {
                return Err(DecodeError::malformed(kind.as_str(), &fields));
            }
            let keys: BTreeMap<String, String> = pairs
                .chunks_exact(2)
                .map(|kv| (kv[0].to_string(), kv[1].to_string()))
                .collect();
            Ok(Pdu::SetKeys(SetKeysPdu { keys }))
        }
    }
}

/// Trimmed fields of one message, with typed accessors.
struct Message<'a> {
    kind: PduKind,
    fields: &'a [&'a str],
}

impl Message<'_> {
    fn require(&self, min: usize) -> Result<(), DecodeError> {
        if self.fields.len() < min {
            return Err(DecodeError::malformed(self.kind.as_str(), self.fields));
        }
        Ok(())
    }

    fn text(&self, idx: usize) -> String {
        self.fields[idx].to_string()
    }

    fn timestamp(&self, idx: usize) -> Result<Timestamp, DecodeError> {
        let raw = self.fields[idx];
        let secs: i64 = raw
            .parse()
            .map_err(|e: std::num::ParseIntError| self.invalid(idx, "timestamp", e.to_string()))?;
        Timestamp::checked_from_secs(secs)
            .ok_or_else(|| self.invalid(idx, "timestamp", "out of range".to_string()))
    }

    fn int(&self, idx: usize, field: &'static str) -> Result<i64, DecodeError> {
        self.fields[idx]
            .parse()
            .map_err(|e: std::num::ParseIntError| self.invalid(idx, field, e.to_string()))
    }

    fn float(&self, idx: usize, field: &'static str) -> Result<f64, DecodeError> {
        let raw = self.fields[idx];
        let value: f64 = raw
            .parse()
            .map_err(|e: std::num::ParseFloatError| self.invalid(idx, field, e.to_string()))?;
        // `parse` saturates overflow to infinity instead of failing
        if value.is_infinite() && !is_infinity_literal(raw) {
            return Err(self.invalid(idx, field, "value out of range".to_string()));
        }
        Ok(value)
    }

    fn state(&self) -> Result<StatePdu, DecodeError> {
        let name = self.text(1);
        let timestamp = self.timestamp(2)?;
        Ok(StatePdu {
            timestamp,
            name,
            stale: self.int(3, "stale")?,
            state_code: self.int(4, "state_code")?,
            summary: self.text(5),
        })
    }

    fn invalid(&self, idx: usize, field: &'static str, reason: String) -> DecodeError {
        DecodeError::InvalidField {
            kind: self.kind.as_str().to_string(),
            field,
            value: self.fields[idx].to_string(),
            reason,
        }
    }
}

fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn invalid_field(result: Result<Pdu, DecodeError>) -> &'static str {
        match result {
            Err(DecodeError::InvalidField { field, .. }) => field,
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    fn is_malformed(result: &Result<Pdu, DecodeError>) -> bool {
        matches!(result, Err(DecodeError::Malformed { .. }))
    }

    // ========================================================================
    // Type tag
    // ========================================================================

    #[test]
    fn unknown_type_is_rejected() {
        let err = decode(&["FOO", "0", "n"]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownType { tag: "FOO".into() });
    }

    #[test]
    fn empty_tag_is_unknown_type() {
        let err = decode(&["\0\0", "0"]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownType { tag: String::new() });
    }

    #[test]
    fn empty_message_is_malformed() {
        assert!(is_malformed(&decode::<&str>(&[])));
    }

    // ========================================================================
    // SAMPLE
    // ========================================================================

    #[test]
    fn sample_decodes_all_fields() {
        let pdu = decode(&["SAMPLE", "0", "n", "1", "2", "3", "4", "5", "6"]).unwrap();
        assert_eq!(
            pdu,
            Pdu::Sample(SamplePdu {
                timestamp: ts(0),
                name: "n".into(),
                sample_size: 1,
                min: 2.0,
                max: 3.0,
                sum: 4.0,
                mean: 5.0,
                variance: 6.0,
            })
        );
    }

    #[test]
    fn nul_padding_is_stripped() {
        let padded = decode(&[
            "SAMPLE\0", "0\0", "n\0", "1\0", "2\0", "3\0", "4\0", "5\0", "6\0",
        ])
        .unwrap();
        let plain = decode(&["SAMPLE", "0", "n", "1", "2", "3", "4", "5", "6"]).unwrap();
        assert_eq!(padded, plain);
    }

    #[test]
    fn sample_short_is_malformed() {
        assert!(is_malformed(&decode(&["SAMPLE", "0", "n", "1", "2", "3", "4", "5"])));
    }

    #[test]
    fn sample_invalid_fields_in_order() {
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "x", "n", "1", "2", "3", "4", "5", "6"])),
            "timestamp"
        );
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1.5", "2", "3", "4", "5", "6"])),
            "sample_size"
        );
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1", "a", "b", "4", "5", "6"])),
            "min"
        );
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1", "2", "b", "4", "5", "6"])),
            "max"
        );
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1", "2", "3", "c", "5", "6"])),
            "sum"
        );
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1", "2", "3", "4", "d", "6"])),
            "mean"
        );
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1", "2", "3", "4", "5", "e"])),
            "variance"
        );
    }

    #[test]
    fn overflowing_float_is_invalid() {
        assert_eq!(
            invalid_field(decode(&["SAMPLE", "0", "n", "1", "1e400", "3", "4", "5", "6"])),
            "min"
        );
        assert_eq!(invalid_field(decode(&["RATE", "0", "r", "60", "-1e400"])), "value");

        let err = decode(&["COUNTER", "0", "c", "1e309"]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidField { field: "value", ref reason, .. } if reason == "value out of range"
        ));
    }

    #[test]
    fn explicit_infinity_is_parsed() {
        let Pdu::Counter(c) = decode(&["COUNTER", "0", "c", "-Infinity"]).unwrap() else {
            panic!("expected Counter");
        };
        assert_eq!(c.value, f64::NEG_INFINITY);
        assert!(is_infinity_literal("+INF"));
        assert!(!is_infinity_literal("1e400"));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let pdu = decode(&["COUNTER", "0", "n", "1", "trailing"]).unwrap();
        assert_eq!(pdu.kind(), PduKind::Counter);
    }

    // ========================================================================
    // RATE / COUNTER
    // ========================================================================

    #[test]
    fn rate_decodes() {
        let pdu = decode(&["RATE", "10", "r", "60", "2.5"]).unwrap();
        assert_eq!(
            pdu,
            Pdu::Rate(RatePdu {
                timestamp: ts(10),
                name: "r".into(),
                window: 60,
                value: 2.5,
            })
        );
    }

    #[test]
    fn rate_missing_value_is_malformed() {
        assert!(is_malformed(&decode(&["RATE", "0", "n", "60"])));
    }

    #[test]
    fn rate_invalid_window() {
        assert_eq!(invalid_field(decode(&["RATE", "0", "n", "sixty", "1"])), "window");
    }

    #[test]
    fn counter_decodes() {
        let pdu = decode(&["COUNTER", "0", "testCounter", "1"]).unwrap();
        assert_eq!(
            pdu,
            Pdu::Counter(CounterPdu {
                timestamp: ts(0),
                name: "testCounter".into(),
                value: 1.0,
            })
        );
    }

    #[test]
    fn counter_invalid_value() {
        let err = decode(&["COUNTER", "0", "n", "not-a-number"]).unwrap_err();
        assert_eq!(err.field(), Some("value"));
        assert!(matches!(
            err,
            DecodeError::InvalidField { ref kind, ref value, .. }
                if kind == "COUNTER" && value == "not-a-number"
        ));
    }

    #[test]
    fn counter_short_is_malformed() {
        assert!(is_malformed(&decode(&["COUNTER", "0", "n"])));
    }

    #[test]
    fn timestamp_out_of_range_is_invalid() {
        let huge = i64::MAX.to_string();
        assert_eq!(
            invalid_field(decode(&["COUNTER", huge.as_str(), "n", "1"])),
            "timestamp"
        );
    }

    // ========================================================================
    // EVENT
    // ========================================================================

    #[test]
    fn event_decodes() {
        let pdu = decode(&["EVENT", "0", "testEvent", "This is the event"]).unwrap();
        assert_eq!(
            pdu,
            Pdu::Event(EventPdu {
                timestamp: ts(0),
                name: "testEvent".into(),
                event: "This is the event".into(),
            })
        );
    }

    #[test]
    fn event_invalid_timestamp() {
        assert_eq!(
            invalid_field(decode(&["EVENT", "invalid timestamp", "testEvent", "x"])),
            "timestamp"
        );
    }

    #[test]
    fn event_short_is_malformed() {
        assert!(is_malformed(&decode(&["EVENT", "0", "testEvent"])));
    }

    // ========================================================================
    // STATE / TRANSITION
    // ========================================================================

    #[test]
    fn state_puts_name_before_timestamp() {
        let pdu = decode(&["STATE", "testState", "7", "1", "2", "State message"]).unwrap();
        assert_eq!(
            pdu,
            Pdu::State(StatePdu {
                timestamp: ts(7),
                name: "testState".into(),
                stale: 1,
                state_code: 2,
                summary: "State message".into(),
            })
        );
    }

    #[test]
    fn transition_decodes() {
        let pdu = decode(&["TRANSITION", "testTransition", "0", "1", "2", "State message"]).unwrap();
        assert_eq!(
            pdu,
            Pdu::StateTransition(StatePdu {
                timestamp: ts(0),
                name: "testTransition".into(),
                stale: 1,
                state_code: 2,
                summary: "State message".into(),
            })
        );
    }

    #[test]
    fn transition_invalid_fields() {
        assert_eq!(
            invalid_field(decode(&["TRANSITION", "t", "invalid timestamp", "1", "2", "m"])),
            "timestamp"
        );
        assert_eq!(
            invalid_field(decode(&["TRANSITION", "t", "0", "invalid stale", "2", "m"])),
            "stale"
        );
        assert_eq!(
            invalid_field(decode(&["TRANSITION", "t", "0", "1", "invalid state", "m"])),
            "state_code"
        );
    }

    #[test]
    fn state_short_is_malformed() {
        assert!(is_malformed(&decode(&["STATE", "s", "0", "1", "2"])));
        assert!(is_malformed(&decode(&["TRANSITION", "s", "0", "1", "2"])));
    }

    // ========================================================================
    // SET.KEYS
    // ========================================================================

    #[test]
    fn set_keys_pairs() {
        let pdu = decode(&["SET.KEYS", "k1", "v1", "k2", "v2"]).unwrap();
        let Pdu::SetKeys(set) = pdu else {
            panic!("expected SetKeys");
        };
        assert_eq!(set.keys.len(), 2);
        assert_eq!(set.keys["k1"], "v1");
        assert_eq!(set.keys["k2"], "v2");
    }

    #[test]
    fn set_keys_without_pairs_is_empty() {
        let pdu = decode(&["SET.KEYS"]).unwrap();
        assert_eq!(pdu, Pdu::SetKeys(SetKeysPdu::default()));
    }

    #[test]
    fn set_keys_odd_count_is_malformed() {
        assert!(is_malformed(&decode(&["SET.KEYS", "k1", "v1", "k2"])));
        assert!(is_malformed(&decode(&["SET.KEYS", "k1"])));
    }

    #[test]
    fn set_keys_duplicate_key_keeps_last() {
        let Pdu::SetKeys(set) = decode(&["SET.KEYS", "k", "a", "k", "b"]).unwrap() else {
            panic!("expected SetKeys");
        };
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys["k"], "b");
    }

    // ========================================================================
    // Purity
    // ========================================================================

    #[test]
    fn decoding_is_repeatable() {
        let msg = vec![
            "RATE".to_string(),
            "5".to_string(),
            "r\0".to_string(),
            "30".to_string(),
            "0.5".to_string(),
        ];
        let first = decode(&msg).unwrap();
        let second = decode(&msg).unwrap();
        assert_eq!(first, second);
        assert_eq!(msg[2], "r\0");
    }
}
