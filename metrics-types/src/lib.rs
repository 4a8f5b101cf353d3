//! # metrics-types
//!
//! The canonical metric model shared by every firehose2influxdb crate.
//! Both event sources (the platform firehose and the bolo text protocol)
//! are normalized into a [`Point`] before they reach a sink.
//!
//! ## Design Goals
//!
//! - **Always valid**: a `Point` can only be built through validating
//!   constructors, so sinks never see a partial point
//! - **Deterministic**: tags and fields are kept in ordered maps, so the
//!   rendered line protocol is stable
//! - **Lossless time**: nanosecond timestamps
//!
//! ## Features
//!
//! - `serde`: serialization of points via serde
//!
//! ## Example
//!
//! ```rust
//! use metrics_types::{merge_tags, Point, Timestamp};
//!
//! let tags = merge_tags([("origin", "spoofed"), ("zone", "z1")], [("origin", "router")]);
//!
//! let point = Point::builder("requests")
//!     .tags(tags)
//!     .field("Value", 42.0)
//!     .timestamp(Timestamp::from_secs(1_700_000_000))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(point.tag("origin"), Some("router"));
//! ```

mod field;
mod line_protocol;
mod point;
mod timestamp;

pub use field::*;
pub use point::*;
pub use timestamp::*;
