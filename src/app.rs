//! Wiring of configuration, sources and the sink.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use metrics_adapters::bolo::BoloTranslator;
use metrics_adapters::firehose::{Envelope, FirehoseTranslator};
use metrics_sdk::{IngestSnapshot, Ingestor, InfluxSink, Output, Sink, SourceChannels};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{Config, InfluxConfig, OutputKind};
use crate::source;

/// Inbound channels for every configured source.
#[derive(Debug, Default)]
pub struct Sources {
    pub bolo: Option<SourceChannels<Vec<String>>>,
    pub firehose: Option<SourceChannels<Envelope>>,
}

impl Sources {
    /// Whether no source is configured.
    pub fn is_empty(&self) -> bool {
        self.bolo.is_none() && self.firehose.is_none()
    }
}

/// The running application.
#[derive(Debug)]
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the configured output.
    pub fn output(&self) -> Result<Output> {
        match self.config.output {
            OutputKind::Influx => Ok(Output::influx(influx_sink(&self.config.influx)?)),
            OutputKind::Stdout => Ok(Output::stdout()),
        }
    }

    /// Connect to every configured source.
    pub async fn connect(&self) -> Result<Sources> {
        let capacity = self.config.channel_capacity;
        let mut sources = Sources::default();

        if let Some(bolo) = &self.config.bolo {
            debug!("Connecting to bolo at {}", bolo.address);
            let stream = TcpStream::connect(&bolo.address)
                .await
                .with_context(|| format!("Unable to connect to bolo at {}", bolo.address))?;
            info!("Connected to bolo at {}", bolo.address);
            sources.bolo = Some(source::pdu::spawn(stream, &bolo.address, capacity));
        }

        if let Some(firehose) = &self.config.firehose {
            debug!("Connecting to the firehose at {}", firehose.address);
            let stream = TcpStream::connect(&firehose.address)
                .await
                .with_context(|| format!("Unable to connect to the firehose at {}", firehose.address))?;
            info!("Connected to the firehose at {}", firehose.address);
            sources.firehose = Some(source::envelope::spawn(stream, &firehose.address, capacity));
        }

        if sources.is_empty() {
            bail!("No sources configured: set bolo.address and/or firehose.address");
        }
        Ok(sources)
    }

    /// Connect the sources and ingest until they all end.
    pub async fn run(self) -> Result<BTreeMap<&'static str, IngestSnapshot>> {
        let output = self.output()?;
        info!("Writing points to {}", output.describe());
        let sources = self.connect().await?;
        ingest(Ingestor::new(output), sources).await
    }
}

/// Run one ingestion loop per source concurrently and wait for all of them.
///
/// Returns the final counters of every source.
pub async fn ingest<S>(
    ingestor: Ingestor<S>,
    sources: Sources,
) -> Result<BTreeMap<&'static str, IngestSnapshot>>
where
    S: Sink + 'static,
{
    let mut tasks: Vec<JoinHandle<IngestSnapshot>> = Vec::new();

    if let Some(channels) = sources.bolo {
        let ingestor = ingestor.clone();
        tasks.push(tokio::spawn(async move {
            ingestor.run(BoloTranslator, channels).await
        }));
    }
    if let Some(channels) = sources.firehose {
        let ingestor = ingestor.clone();
        tasks.push(tokio::spawn(async move {
            ingestor.run(FirehoseTranslator, channels).await
        }));
    }

    for task in tasks {
        task.await.context("Ingestion task failed")?;
    }
    Ok(ingestor.collect())
}

fn influx_sink(cfg: &InfluxConfig) -> Result<InfluxSink> {
    if cfg.url.is_empty() {
        bail!("influx.url is not set");
    }
    let sink = InfluxSink::builder()
        .url(&cfg.url)
        .database(&cfg.database)
        .credentials(&cfg.user, &cfg.password)
        .insecure_skip_verify(cfg.insecure_skip_verify)
        .build()
        .with_context(|| format!("Unable to set up influx client for {}", cfg.url))?;
    Ok(sink)
}
