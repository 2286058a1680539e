//! renta — resolver and engine inspection CLI.
//!
//! Offline commands (`parse`, `normalize`, `device-id`, `node-id`,
//! `config-hash`) need no collaborators.  `resolve`, `state` and `quote` run
//! against a JSON ledger fixture, so scenarios can be inspected without a
//! deployment.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "renta")]
#[command(about = "Rental URL resolver and reconciliation engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a rental URL and print the derived identifiers
    Parse {
        /// URL in device[#counter]@contract form
        url: String,
        /// Root node to hash contract names under (hex, defaults to zero)
        #[arg(long)]
        root: Option<String>,
    },

    /// Print the canonical form of a rental URL
    Normalize { url: String },

    /// Derive a device id from a name and counter
    DeviceId {
        name: String,
        #[arg(long, default_value_t = 0)]
        counter: u32,
    },

    /// Derive the namehash node of a contract name
    NodeId {
        name: String,
        /// Root node (hex, defaults to zero)
        #[arg(long)]
        root: Option<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Resolve a URL against a ledger fixture
    Resolve {
        url: String,
        /// JSON ledger fixture path
        #[arg(long)]
        fixture: String,
        /// YAML config layers in merge order; supplies the root node
        #[arg(long)]
        config: Vec<String>,
        /// Root node (hex, overrides the configured one)
        #[arg(long)]
        root: Option<String>,
    },

    /// Print the reconciled renting state of a device in a fixture
    State {
        url: String,
        #[arg(long)]
        fixture: String,
        /// YAML config layers; supply `services.hub` for off-chain reads
        #[arg(long)]
        config: Vec<String>,
        /// Acting user address (hex, defaults to zero)
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        root: Option<String>,
    },

    /// Validate a prospective rent against a fixture
    Quote {
        url: String,
        #[arg(long)]
        fixture: String,
        /// YAML config layers; supply hub endpoint and default token
        #[arg(long)]
        config: Vec<String>,
        /// Acting user address (hex)
        #[arg(long)]
        user: String,
        #[arg(long)]
        seconds: Option<u64>,
        #[arg(long)]
        amount: Option<u128>,
        /// Payment token address (hex, overrides the configured default)
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        root: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Parse { url, root } => commands::resolver::parse(&url, root.as_deref()),
        Commands::Normalize { url } => commands::resolver::normalize(&url),
        Commands::DeviceId { name, counter } => commands::resolver::device_id(&name, counter),
        Commands::NodeId { name, root } => commands::resolver::node_id(&name, root.as_deref()),
        Commands::ConfigHash { paths } => commands::resolver::config_hash(&paths),
        Commands::Resolve {
            url,
            fixture,
            config,
            root,
        } => commands::inspect::resolve(&url, &fixture, &config, root.as_deref()).await,
        Commands::State {
            url,
            fixture,
            config,
            user,
            root,
        } => {
            commands::inspect::state(&url, &fixture, &config, user.as_deref(), root.as_deref())
                .await
        }
        Commands::Quote {
            url,
            fixture,
            config,
            user,
            seconds,
            amount,
            token,
            root,
        } => {
            commands::inspect::quote(
                &url,
                &fixture,
                &config,
                &user,
                seconds,
                amount,
                token.as_deref(),
                root.as_deref(),
            )
            .await
        }
    }
}
