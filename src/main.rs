//! # Secret Rotation CLI
//!
//! Runs rotation steps against AWS Secrets Manager.
//!
//! ## Usage
//!
//! ```bash
//! # Run a single step
//! secret-rotation step --secret-id app/config --token 3f1c... --step createSecret
//!
//! # Handle a rotation trigger event read from stdin
//! echo '{"SecretId":"app/config","ClientRequestToken":"3f1c...","Step":"testSecret"}' \
//!   | secret-rotation event
//!
//! # Run all four steps with a fresh token
//! secret-rotation rotate --secret-id app/config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secret_rotation::observability::metrics;
use secret_rotation::rotation::RotationEvent;
use secret_rotation::runtime::{initialize, InitOptions, RotationRunner};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "secret-rotation", version, about = "Four-step secret rotation")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// AWS region (overrides AWS_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Secrets Manager endpoint override (overrides SECRETS_MANAGER_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Use an in-memory store seeded with this JSON payload as the current version
    #[arg(long, global = true, value_name = "JSON")]
    in_memory: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single rotation step
    Step {
        #[arg(long)]
        secret_id: String,
        /// Client request token identifying the new version
        #[arg(long)]
        token: String,
        /// createSecret, setSecret, testSecret or finishSecret
        #[arg(long)]
        step: String,
    },
    /// Handle a rotation trigger event (JSON with SecretId, ClientRequestToken, Step)
    Event {
        /// Read the event from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run all four steps in order
    Rotate {
        #[arg(long)]
        secret_id: String,
        /// Client request token; a random UUID when omitted
        #[arg(long)]
        token: Option<String>,
        /// Print Prometheus metrics after the rotation
        #[arg(long)]
        print_metrics: bool,
    },
}

fn read_event(file: Option<&PathBuf>) -> Result<RotationEvent> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Failed to parse rotation event")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let event = match &cli.command {
        Command::Event { file } => Some(read_event(file.as_ref())?),
        _ => None,
    };
    let seed_secret_id = match (&cli.command, &event) {
        (Command::Step { secret_id, .. } | Command::Rotate { secret_id, .. }, _) => {
            secret_id.clone()
        }
        (Command::Event { .. }, Some(event)) => event.secret_id.clone(),
        (Command::Event { .. }, None) => String::new(),
    };

    let init = initialize(InitOptions {
        json_logs: cli.json_logs,
        region: cli.region.clone(),
        endpoint: cli.endpoint.clone(),
        in_memory_seed: cli.in_memory.clone().map(|payload| (seed_secret_id, payload)),
    })
    .await?;

    match cli.command {
        Command::Step {
            secret_id,
            token,
            step,
        } => {
            init.coordinator
                .rotate(&secret_id, &token, &step)
                .await
                .with_context(|| format!("Step {step} failed for {secret_id}"))?;
        }
        Command::Event { .. } => {
            let event = event.context("Rotation event missing")?;
            let response = init
                .coordinator
                .handle_event(event)
                .await
                .context("Rotation step failed")?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Command::Rotate {
            secret_id,
            token,
            print_metrics,
        } => {
            let token = token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let runner = RotationRunner::new(init.coordinator, &init.config);
            let outcome = runner
                .run(&secret_id, &token)
                .await
                .with_context(|| format!("Rotation failed for {secret_id}"))?;
            println!("{}", outcome.token);
            if print_metrics {
                print!("{}", metrics::render_metrics()?);
            }
        }
    }

    Ok(())
}
