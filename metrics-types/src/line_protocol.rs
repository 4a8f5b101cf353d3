//! InfluxDB line protocol rendering.
//!
//! ```text
//! measurement[,tag_key=tag_value...] field_key=field_value[,field_key=field_value...] timestamp_ns
//! ```

use std::fmt::Write;

use crate::{FieldValue, Point};

pub(crate) fn write_point(out: &mut String, point: &Point) {
    escape_into(out, point.name(), &[',', ' ']);

    for (key, value) in point.tags() {
        // The store drops empty tag values; leave them out up front.
        if value.is_empty() || key.is_empty() {
            continue;
        }
        out.push(',');
        escape_into(out, key, &[',', '=', ' ']);
        out.push('=');
        escape_into(out, value, &[',', '=', ' ']);
    }

    let mut first = true;
    for (key, value) in point.fields() {
        out.push(if first { ' ' } else { ',' });
        first = false;
        escape_into(out, key, &[',', '=', ' ']);
        out.push('=');
        write_field_value(out, value);
    }

    out.push(' ');
    let _ = write!(out, "{}", point.timestamp().as_nanos());
}

fn write_field_value(out: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Float(v) => {
            let _ = write!(out, "{}", v);
        }
        FieldValue::Integer(v) => {
            let _ = write!(out, "{}i", v);
        }
        FieldValue::UnsignedInteger(v) => match i64::try_from(*v) {
            Ok(signed) => {
                let _ = write!(out, "{}i", signed);
            }
            Err(_) => {
                let _ = write!(out, "{}u", v);
            }
        },
        FieldValue::String(v) => {
            out.push('"');
            for c in v.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        FieldValue::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
    }
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
