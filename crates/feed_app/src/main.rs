use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use feed_app::{format_event, format_toast, ConfigLayer, CONFIG_FILENAME};
use feed_core::{toast_for, StatusEvent};
use feed_engine::{ClientSettings, StatusClient};
use feed_logging::{feed_info, feed_warn, LogDestination};
use log::LevelFilter;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Tail live detection, sync and recovery status events.
#[derive(Debug, Parser)]
#[command(name = "feed-tail", version)]
struct Args {
    /// RON config file. Defaults to ./feed.ron when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// API base URL; the stream endpoints are derived from it.
    #[arg(long)]
    api_base: Option<String>,
    /// Auth token appended as `?token=`.
    #[arg(long)]
    token: Option<String>,
    /// Never try the WebSocket transport.
    #[arg(long)]
    no_websocket: bool,
    /// Never fall back to Server-Sent Events.
    #[arg(long)]
    no_sse: bool,
    /// Exit after this many events.
    #[arg(long)]
    count: Option<usize>,
    /// Print events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
    /// Do not print notification lines.
    #[arg(long)]
    no_toasts: bool,
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    log: LogTarget,
    #[arg(long, default_value = "feed-tail.log")]
    log_file: PathBuf,
    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn cli_layer(&self) -> ConfigLayer {
        ConfigLayer {
            api_base: self.api_base.clone(),
            token: self.token.clone(),
            websocket: self.no_websocket.then_some(false),
            sse: self.no_sse.then_some(false),
            ..ConfigLayer::default()
        }
    }
}

fn load_settings(args: &Args) -> Result<ClientSettings> {
    let file = match &args.config {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::load_optional(Path::new(CONFIG_FILENAME))?,
    };
    let env = ConfigLayer::from_env(std::env::vars()).context("reading FEED_* variables")?;
    Ok(file.overlay(env).overlay(args.cli_layer()).into_settings())
}

fn print_event(event: &StatusEvent, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{}", format_event(Utc::now(), event));
    }
    if !args.no_toasts {
        if let Some(toast) = toast_for(event) {
            println!("{}", format_toast(&toast));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    feed_logging::initialize(args.log.into(), level, &args.log_file);

    let settings = load_settings(&args)?;
    let client = StatusClient::new(settings).context("starting status client")?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<StatusEvent>();
    let subscription = client.subscribe(move |event| {
        let _ = event_tx.send(event.clone());
    });
    let mut status = client.status();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seen = 0usize;
    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                print_event(&event, &args)?;
                seen += 1;
                if args.count.is_some_and(|count| seen >= count) {
                    break;
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    feed_warn!("status client stopped");
                    break;
                }
                let label = status.borrow_and_update().connection.label();
                feed_info!("connection: {}", label);
            }
            _ = &mut ctrl_c => {
                feed_info!("interrupted; closing status feed");
                break;
            }
        }
    }

    subscription.unsubscribe();
    client.shutdown();
    Ok(())
}
