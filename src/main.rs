//! # Top-up Widget
//!
//! Terminal front end for the order status widget.
//!
//! On start it restores the last created order (one status check, no
//! polling), then reads commands from stdin and prints the panel every time
//! it changes. See [`command`] for the accepted input.

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use topup_widget::clients::WidgetClient;
use topup_widget::lifecycle::{setup_tracing, WidgetConfig, WidgetSystem};
use topup_widget::model::PanelState;
use topup_widget::widget_actor::{WidgetError, NO_TRANSACTION_MESSAGE};
use tracing::{error, info, warn};

mod command;

use command::Command;

/// Command-line arguments for the widget.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Origin of the top-up backend
    #[arg(long, env = "TOPUP_API_URL")]
    api_url: Option<String>,

    /// File holding the last created order
    #[arg(long, env = "TOPUP_STORAGE")]
    storage: Option<PathBuf>,

    /// Delay between status checks, in milliseconds
    #[arg(long, env = "TOPUP_POLL_MS")]
    poll_ms: Option<u64>,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied.
    fn load_config(&self) -> Result<WidgetConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => WidgetConfig::from_file(path)?,
            None => WidgetConfig::default(),
        };
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(storage) = &self.storage {
            config.storage_path = storage.clone();
        }
        if let Some(poll_ms) = self.poll_ms {
            config.poll_interval_ms = poll_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing();

    let config = args.load_config().inspect_err(|e| error!(error = %e, "Bad configuration"))?;
    let system = WidgetSystem::from_config(&config)?;
    info!("Started widget");

    let printer = tokio::spawn(print_panel(system.panel.subscribe()));

    match system.widget_client.restore().await {
        Ok(Some(status)) => info!(status = %status.status, "Restored last order"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Could not restore last order"),
    }

    println!("Commands: {}, status, close, open, quit", command::USAGE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(&system.widget_client, command).await,
            Ok(None) => {}
            Err(e) => println!("{e}"),
        }
    }

    printer.abort();
    system.shutdown().await?;
    info!("Stopped widget");
    Ok(())
}

async fn execute(client: &WidgetClient, command: Command) {
    let result = match command {
        Command::Topup(request) => client.create_order_with(request).await.map(|_| ()),
        Command::Status => match client.poll().await {
            Ok(false) => {
                println!("{NO_TRANSACTION_MESSAGE}");
                Ok(())
            }
            other => other.map(|_| ()),
        },
        Command::Close => client.close_panel().await,
        Command::Open => client.reopen_panel().await,
        Command::Quit => Ok(()),
    };

    match result {
        // already on the panel
        Err(WidgetError::NoTransaction) | Err(WidgetError::Api(_)) => {}
        Err(e) => error!(error = %e, "Command failed"),
        Ok(()) => {}
    }
}

async fn print_panel(mut panel: watch::Receiver<PanelState>) {
    while panel.changed().await.is_ok() {
        let state = panel.borrow_and_update().clone();
        println!("{state}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "topup-widget",
            "--api-url",
            "https://topup.example.com",
            "--poll-ms",
            "2000",
        ])
        .unwrap();
        let config = args.load_config().unwrap();

        assert_eq!(config.api_base_url, "https://topup.example.com");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = Args::try_parse_from(["topup-widget", "--poll-ms", "0"]).unwrap();
        assert!(args.load_config().is_err());
    }
}
