//! The outbound sink contract.

use std::sync::Arc;

use async_trait::async_trait;
use metrics_types::Point;
use thiserror::Error;

/// Errors that can occur when forwarding a point to storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The store answered but refused the point.
    #[error("Write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The receiving side has gone away.
    #[error("Sink is closed")]
    Closed,

    /// Writing to a local stream failed.
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(feature = "influx")]
impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SinkError::Timeout
        } else if err.is_connect() {
            SinkError::Connection(err.to_string())
        } else {
            SinkError::Http(err.to_string())
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err.to_string())
    }
}

/// Destination for translated points.
///
/// Batching, flushing and retries are the implementation's concern; the
/// ingestion loop only ever hands over one point at a time and reports
/// whatever error comes back.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Forward a single point.
    async fn send(&self, point: Point) -> Result<(), SinkError>;
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Arc<S> {
    async fn send(&self, point: Point) -> Result<(), SinkError> {
        (**self).send(point).await
    }
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Box<S> {
    async fn send(&self, point: Point) -> Result<(), SinkError> {
        (**self).send(point).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: SinkError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert_eq!(err, SinkError::Io("pipe".into()));
    }

    #[test]
    fn display_messages() {
        let err = SinkError::Rejected {
            status: 400,
            body: "unable to parse".into(),
        };
        assert_eq!(
            err.to_string(),
            "Write rejected with status 400: unable to parse"
        );
        assert_eq!(SinkError::Closed.to_string(), "Sink is closed");
    }
}
