use std::path::Path;

use clap::Parser;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use apiary::configuration::client::StaticConfigClient;
use apiary::configuration::config::Config;
use apiary::{BusEvent, BusSubscriber, Repository, SessionIngestor};

#[derive(Parser)]
#[command(name = "apiary")]
#[command(version = "0.1.0")]
#[command(about = "Session-correlation engine for a honeypot monitoring platform")]
struct Args {
    config_file: String,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    info!("importing configuration");
    let config = match Config::from_file(Path::new(args.config_file.as_str())) {
        Ok(config) => config,
        Err(e) => {
            error!("unable to import configuration from file: {}", e);
            std::process::exit(1);
        }
    };

    let repository = match Repository::open(&config.database_url).await {
        Ok(repository) => repository,
        Err(e) => {
            error!("unable to open the session store: {}", e);
            std::process::exit(1);
        }
    };

    // Sessions still pending are residue of an interrupted correlation pass.
    match repository.clear_pending().await {
        Ok(n) => info!("cleaned {} pending sessions on startup", n),
        Err(e) => {
            error!("startup cleanup failed: {}", e);
            std::process::exit(1);
        }
    }
    if config.clear_sessions {
        match repository.clear_all().await {
            Ok(n) => info!("deleting {} sessions on startup", n),
            Err(e) => {
                error!("startup cleanup failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let (sender, bus) = BusSubscriber::channel(64);
    tokio::spawn(forward_stdin(sender));

    let ingestor = SessionIngestor::new(
        bus,
        StaticConfigClient::from_config(&config),
        repository,
        config.correlation_window_secs,
    );
    ingestor.run().await;
}

/// Host wiring: feeds `topic payload` lines from stdin onto the bus,
/// split at the first space. The loop ends (and with it the engine) at
/// end of input.
async fn forward_stdin(sender: mpsc::Sender<BusEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.is_empty() {
            continue;
        }
        let Some((topic, payload)) = line.split_once(' ') else {
            warn!("discarding unframed bus line");
            continue;
        };
        let event = BusEvent {
            topic: topic.to_owned(),
            payload: payload.as_bytes().to_vec(),
        };
        if sender.send(event).await.is_err() {
            break;
        }
    }
}
