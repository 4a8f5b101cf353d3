//! The canonical metric point.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::{FieldValue, Timestamp};

/// Tag set of a point, keyed and ordered by tag name.
pub type Tags = BTreeMap<String, String>;

/// Field set of a point, keyed and ordered by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// Reasons a point cannot be assembled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    /// The measurement name is empty.
    #[error("point has an empty measurement name")]
    EmptyName,

    /// A point needs at least one field.
    #[error("point '{0}' has no fields")]
    NoFields(String),

    /// A field key is empty.
    #[error("point '{0}' has a field with an empty key")]
    EmptyFieldKey(String),

    /// Float fields must be finite.
    #[error("field '{field}' has unsupported non-finite value {value}")]
    NonFiniteField { field: String, value: f64 },
}

/// A single metric record: measurement name, tags, fields and time.
///
/// A `Point` can only be obtained through [`Point::new`] or
/// [`PointBuilder::build`], both of which validate it, so a value of this
/// type is always fully populated.
///
/// # Example
///
/// ```rust
/// use metrics_types::{Point, Timestamp};
///
/// let point = Point::builder("cpu")
///     .tag("host", "cell-1")
///     .field("usage", 12.5)
///     .timestamp(Timestamp::from_secs(1))
///     .build()
///     .unwrap();
///
/// assert_eq!(point.to_line_protocol(), "cpu,host=cell-1 usage=12.5 1000000000");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    name: String,
    tags: Tags,
    fields: Fields,
    timestamp: Timestamp,
}

impl Point {
    /// Assemble and validate a point.
    pub fn new(
        name: impl Into<String>,
        tags: Tags,
        fields: Fields,
        timestamp: Timestamp,
    ) -> Result<Self, PointError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PointError::EmptyName);
        }
        if fields.is_empty() {
            return Err(PointError::NoFields(name));
        }
        for (key, value) in &fields {
            if key.is_empty() {
                return Err(PointError::EmptyFieldKey(name));
            }
            if let FieldValue::Float(v) = value {
                if !v.is_finite() {
                    return Err(PointError::NonFiniteField {
                        field: key.clone(),
                        value: *v,
                    });
                }
            }
        }
        Ok(Self {
            name,
            tags,
            fields,
            timestamp,
        })
    }

    /// Create a builder for a point with the given measurement name.
    pub fn builder(name: impl Into<String>) -> PointBuilder {
        PointBuilder::new(name)
    }

    /// The measurement name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tag set.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Look up a single tag.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The field set.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Look up a single field.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The point's time.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Render the point as one line of InfluxDB line protocol.
    pub fn to_line_protocol(&self) -> String {
        let mut out = String::with_capacity(64);
        crate::line_protocol::write_point(&mut out, self);
        out
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_protocol())
    }
}

/// Merge two tag sets: every entry of `base` first, then every entry of
/// `overrides`, with `overrides` winning on key collisions.
pub fn merge_tags<B, O, K1, V1, K2, V2>(base: B, overrides: O) -> Tags
where
    B: IntoIterator<Item = (K1, V1)>,
    O: IntoIterator<Item = (K2, V2)>,
    K1: Into<String>,
    V1: Into<String>,
    K2: Into<String>,
    V2: Into<String>,
{
    let mut tags: Tags = base
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    tags.extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
    tags
}

/// Builder for [`Point`].
#[derive(Debug, Clone)]
pub struct PointBuilder {
    name: String,
    tags: Tags,
    fields: Fields,
    timestamp: Option<Timestamp>,
}

impl PointBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Tags::new(),
            fields: Fields::new(),
            timestamp: None,
        }
    }

    /// The measurement name the point will get.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a tag, replacing any previous value for the key.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Set several tags, later entries replacing earlier ones.
    pub fn tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set a field, replacing any previous value for the key.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set the point's time. Defaults to the current time when unset.
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate and build the point.
    pub fn build(self) -> Result<Point, PointError> {
        let timestamp = self.timestamp.unwrap_or_else(Timestamp::now);
        Point::new(self.name, self.tags, self.fields, timestamp)
    }
}
