//! Output backends for forwarding points.

use async_trait::async_trait;
use metrics_types::Point;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::sink::{Sink, SinkError};

#[cfg(feature = "influx")]
pub use influx::{InfluxSink, InfluxSinkBuilder};

/// Output destination for points.
///
/// Configure where the ingestion loops should forward translated points.
#[derive(Debug)]
pub enum Output {
    /// Write each point to an InfluxDB server over its HTTP write API.
    ///
    /// Use `Output::influx()` to create this variant.
    #[cfg(feature = "influx")]
    Influx(InfluxSink),

    /// Print each point to stdout in line protocol.
    Stdout,

    /// Send points through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<Point>),
}

impl Output {
    /// Create an InfluxDB output from a configured sink.
    ///
    /// # Example
    ///
    /// ```rust
    /// use metrics_sdk::{InfluxSink, Output};
    ///
    /// let sink = InfluxSink::builder()
    ///     .url("http://localhost:8086")
    ///     .database("metrics")
    ///     .build()
    ///     .unwrap();
    /// let output = Output::influx(sink);
    /// ```
    #[cfg(feature = "influx")]
    pub fn influx(sink: InfluxSink) -> Self {
        Output::Influx(sink)
    }

    /// Create a stdout output.
    pub fn stdout() -> Self {
        Output::Stdout
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use metrics_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive points
    /// // while let Some(point) = rx.recv().await {
    /// //     println!("{point}");
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Point>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Short description of the destination, for logs.
    pub fn describe(&self) -> String {
        match self {
            #[cfg(feature = "influx")]
            Output::Influx(sink) => format!("influx: {}", sink.url()),
            Output::Stdout => "stdout".to_string(),
            Output::Channel(_) => "channel".to_string(),
        }
    }
}

#[async_trait]
impl Sink for Output {
    async fn send(&self, point: Point) -> Result<(), SinkError> {
        match self {
            #[cfg(feature = "influx")]
            Output::Influx(sink) => sink.send(point).await,
            Output::Stdout => {
                let mut line = point.to_line_protocol();
                line.push('\n');
                let mut out = tokio::io::stdout();
                out.write_all(line.as_bytes()).await?;
                out.flush().await?;
                Ok(())
            }
            // Waits for capacity, so a slow receiver backs up the loop
            Output::Channel(tx) => tx.send(point).await.map_err(|_| SinkError::Closed),
        }
    }
}

#[cfg(feature = "influx")]
mod influx {
    use std::time::Duration;

    use async_trait::async_trait;
    use metrics_types::Point;
    use reqwest::Client;
    use tracing::debug;

    use crate::sink::{Sink, SinkError};

    /// User agent sent with every write.
    pub const USER_AGENT: &str = "firehose2influxdb";

    const DEFAULT_URL: &str = "http://localhost:8086";
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// InfluxDB sink using the HTTP write API.
    ///
    /// Every point is written with its own request, at nanosecond precision.
    #[derive(Debug, Clone)]
    pub struct InfluxSink {
        client: Client,
        url: String,
        database: String,
        username: Option<String>,
        password: Option<String>,
    }

    impl InfluxSink {
        /// Create a new builder for configuring the sink.
        pub fn builder() -> InfluxSinkBuilder {
            InfluxSinkBuilder::default()
        }

        /// The server URL writes go to.
        pub fn url(&self) -> &str {
            &self.url
        }

        /// The target database.
        pub fn database(&self) -> &str {
            &self.database
        }

        fn write_url(&self) -> String {
            format!("{}/write", self.url.trim_end_matches('/'))
        }
    }

    #[async_trait]
    impl Sink for InfluxSink {
        async fn send(&self, point: Point) -> Result<(), SinkError> {
            let body = point.to_line_protocol();
            debug!(database = %self.database, "Writing point: {}", body);

            let mut request = self
                .client
                .post(self.write_url())
                .query(&[("db", self.database.as_str()), ("precision", "ns")])
                .body(body);
            if let Some(username) = &self.username {
                request = request.basic_auth(username, self.password.as_ref());
            }

            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(SinkError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            })
        }
    }

    /// Builder for InfluxSink.
    #[derive(Debug, Default)]
    pub struct InfluxSinkBuilder {
        url: Option<String>,
        database: Option<String>,
        username: Option<String>,
        password: Option<String>,
        timeout: Option<Duration>,
        insecure_skip_verify: bool,
    }

    impl InfluxSinkBuilder {
        /// Set the server URL (default: "http://localhost:8086").
        pub fn url(mut self, url: impl Into<String>) -> Self {
            self.url = Some(url.into());
            self
        }

        /// Set the database points are written to.
        pub fn database(mut self, database: impl Into<String>) -> Self {
            self.database = Some(database.into());
            self
        }

        /// Set the username and password for authentication.
        ///
        /// An empty username disables authentication.
        pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
            let username = username.into();
            if username.is_empty() {
                self.username = None;
                self.password = None;
            } else {
                self.username = Some(username);
                self.password = Some(password.into());
            }
            self
        }

        /// Set the request timeout (default: 1 second).
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        /// Accept invalid TLS certificates from the server.
        pub fn insecure_skip_verify(mut self, skip: bool) -> Self {
            self.insecure_skip_verify = skip;
            self
        }

        /// Build the sink.
        pub fn build(self) -> Result<InfluxSink, SinkError> {
            let client = Client::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .user_agent(USER_AGENT)
                .danger_accept_invalid_certs(self.insecure_skip_verify)
                .build()
                .map_err(|e| SinkError::Http(format!("Failed to build HTTP client: {}", e)))?;

            Ok(InfluxSink {
                client,
                url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
                database: self.database.unwrap_or_default(),
                username: self.username,
                password: self.password,
            })
        }
    }
}
