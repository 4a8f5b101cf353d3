use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info, Level};

use firehose2influxdb::config::DEFAULT_CONFIG_FILE;
use firehose2influxdb::{App, Config};

#[derive(Parser, Debug)]
#[command(name = "firehose2influxdb", version)]
#[command(about = "Forward bolo PDUs and firehose metrics into InfluxDB")]
struct Args {
    /// Specify the config file for firehose2influxdb
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable debugging
    #[arg(short = 'D', long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting up firehose2influxdb");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            error!("Bailing out due to errors");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.config)?;
    debug!("Loaded config from {}", args.config.display());

    let app = App::new(config);
    tokio::select! {
        result = app.run() => {
            for (source, stats) in result? {
                info!(
                    source,
                    received = stats.received,
                    points_sent = stats.points_sent,
                    skipped = stats.skipped,
                    errors = stats.errors(),
                    "Source finished"
                );
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
    Ok(())
}
