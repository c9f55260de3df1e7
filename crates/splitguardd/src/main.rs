//! splitguardd — the SplitGuard daemon.
//!
//! Serves the local cluster's topology so a peer zone can check it,
//! and runs the periodic split-brain check against that peer.
//!
//! # Usage
//!
//! ```text
//! splitguardd run --config /etc/splitguard/splitguard.toml
//! splitguardd check --check-server zone-b:8080 --member a1 --member a2
//! ```

mod daemon;
mod oneshot;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use splitguard_core::SplitGuardConfig;

#[derive(Parser)]
#[command(name = "splitguardd", about = "SplitGuard split-brain checker")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Settings shared by every subcommand. Flags override the file.
#[derive(Args)]
struct ConfigArgs {
    /// Path to splitguard.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Peer `host[:port]` to compare membership with.
    #[arg(long)]
    check_server: Option<String>,

    /// Whether this zone wins an equal split (`true` or `false`).
    #[arg(long, action = ArgAction::Set)]
    preferred_zone: Option<bool>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the topology API and run the periodic check.
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Check interval, e.g. "10s".
        #[arg(long)]
        interval: Option<String>,

        /// Address to serve the API on.
        #[arg(long)]
        listen: Option<String>,

        /// Fixed id for this node.
        #[arg(long)]
        node_id: Option<String>,
    },
    /// Run a single check with a given local view and report the outcome.
    ///
    /// Nothing is stopped: a losing outcome is only reported.
    Check {
        #[command(flatten)]
        config: ConfigArgs,

        /// Local node id (repeatable).
        #[arg(long = "member", required = true)]
        members: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Run {
            config,
            interval,
            listen,
            node_id,
        } => {
            let mut config = load_config(&config)?;
            if let Some(interval) = interval {
                config.check.interval = interval;
            }
            if let Some(listen) = listen {
                config.node.listen = listen;
            }
            if let Some(node_id) = node_id {
                config.node.node_id = Some(node_id);
            }
            config.validate()?;
            daemon::run_daemon(config).await
        }
        Command::Check { config, members } => {
            let config = load_config(&config)?;
            oneshot::run_check(config, members).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,splitguardd=debug,splitguard_check=debug".parse().unwrap());

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Read the config file (if any) and apply command-line overrides.
fn load_config(args: &ConfigArgs) -> anyhow::Result<SplitGuardConfig> {
    let mut config = match &args.config {
        Some(path) => SplitGuardConfig::from_file(path)?,
        None => SplitGuardConfig::default(),
    };

    if let Some(server) = &args.check_server {
        config.check.server = Some(server.clone());
    }
    if let Some(preferred) = args.preferred_zone {
        config.check.preferred_zone = Some(preferred);
    }

    config.validate()?;
    Ok(config)
}
