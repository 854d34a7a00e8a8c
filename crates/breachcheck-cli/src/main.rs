//! BreachCheck CLI - breach lookups, password exposure checks and the local
//! offline proxy.
//!
//! Thin layer over `breachcheck-core`: every command builds one
//! [`BreachCheck`] from the global flags and renders what it returns.

mod commands;
mod output;
mod server;

use anyhow::Result;
use breachcheck_core::config::{NetworkConfig, OfflineConfig};
use breachcheck_core::{BreachCheck, ClientConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "breachcheck")]
#[command(about = "Check accounts and passwords against known data breaches")]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the breach API
    #[arg(long, global = true, env = "BREACHCHECK_API_URL", default_value = NetworkConfig::DEFAULT_API_BASE)]
    api_url: String,

    /// Base URL of the password range service
    #[arg(long, global = true, env = "BREACHCHECK_RANGE_URL", default_value = NetworkConfig::DEFAULT_RANGE_BASE)]
    range_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "10")]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a password has appeared in a breach
    Password {
        /// Password to check (read from stdin when omitted)
        password: Option<String>,

        /// Read the password from the first line of stdin
        #[arg(long, conflicts_with = "password")]
        stdin: bool,
    },
    /// Look up an email address or username
    Account { account: String },
    /// List the breach catalog
    Breaches,
    /// Show one breach by name
    Breach { id: String },
    /// Site-wide statistics and most leaked data classes
    Stats,
    /// Subscribe to notifications about an account or domain
    Notify {
        target: String,

        /// Where to send notifications
        #[arg(long)]
        contact: Option<String>,
    },
    /// Backend health and configured sources
    Status,
    /// Run the offline proxy in front of the site
    Serve {
        #[command(flatten)]
        cache: CacheArgs,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on (0 = auto-assign)
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Keep generations in memory instead of SQLite
        #[arg(long)]
        memory: bool,
    },
    /// Manage the offline cache directly
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Fetch and activate the application shell
    Install {
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Show stored generations
    Status {
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Delete every stored generation
    Clear {
        #[command(flatten)]
        cache: CacheArgs,
    },
}

/// Where the offline cache lives and what it holds.
#[derive(clap::Args, Debug, Clone)]
struct CacheArgs {
    /// Site origin the shell is fetched from
    #[arg(long, env = "BREACHCHECK_ORIGIN", default_value = "http://127.0.0.1:5000")]
    origin: String,

    /// SQLite file for cached generations
    #[arg(long)]
    db: Option<PathBuf>,

    /// Generation to install
    #[arg(long, default_value = OfflineConfig::CACHE_VERSION)]
    cache_version: String,
}

impl CacheArgs {
    fn db_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(OfflineConfig::default_db_path)
    }
}

fn client_config(args: &Args) -> Result<ClientConfig> {
    Ok(ClientConfig::new()
        .with_api_base(&args.api_url)?
        .with_range_base(&args.range_url)?
        .with_timeout(Duration::from_secs(args.timeout)))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let client = BreachCheck::new(client_config(&args)?)?;
    debug!("API base {}", client.config().api_base);
    let json = args.json;

    match args.command {
        Command::Password { password, stdin } => {
            let password = match password {
                Some(p) if !stdin => p,
                _ => commands::read_password_line().await?,
            };
            commands::password(&client, &password, json).await
        }
        Command::Account { account } => commands::account(&client, &account, json).await,
        Command::Breaches => commands::breaches(&client, json).await,
        Command::Breach { id } => commands::breach(&client, &id, json).await,
        Command::Stats => commands::stats(&client, json).await,
        Command::Notify { target, contact } => {
            commands::notify(&client, &target, contact.as_deref(), json).await
        }
        Command::Status => commands::status(&client, json).await,
        Command::Serve {
            cache,
            host,
            port,
            memory,
        } => {
            let offline = if memory {
                client.ephemeral_offline_cache(&cache.origin)?
            } else {
                client.persistent_offline_cache(&cache.origin, cache.db_path())?
            };
            commands::serve(&client, offline, &cache.origin, &cache.cache_version, &host, port).await
        }
        Command::Cache { action } => match action {
            CacheAction::Install { cache } => {
                let offline = client.persistent_offline_cache(&cache.origin, cache.db_path())?;
                commands::cache_install(&offline, &cache.cache_version, json).await
            }
            CacheAction::Status { cache } => {
                let offline = client.persistent_offline_cache(&cache.origin, cache.db_path())?;
                commands::cache_status(&offline, json)
            }
            CacheAction::Clear { cache } => {
                let offline = client.persistent_offline_cache(&cache.origin, cache.db_path())?;
                commands::cache_clear(&offline, json)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_globals_after_subcommand() {
        let args = Args::try_parse_from([
            "breachcheck",
            "breach",
            "Adobe",
            "--json",
            "--api-url",
            "https://breachcheck.example",
        ])
        .unwrap();
        assert!(args.json);
        assert!(matches!(args.command, Command::Breach { ref id } if id == "Adobe"));
        let config = client_config(&args).unwrap();
        assert_eq!(config.api_base.as_str(), "https://breachcheck.example/");
    }

    #[test]
    fn test_password_stdin_conflicts_with_argument() {
        let err = Args::try_parse_from(["breachcheck", "password", "hunter2", "--stdin"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_cache_defaults() {
        let args = Args::try_parse_from(["breachcheck", "cache", "status"]).unwrap();
        match args.command {
            Command::Cache {
                action: CacheAction::Status { cache },
            } => {
                assert_eq!(cache.cache_version, OfflineConfig::CACHE_VERSION);
                assert!(cache.db_path().ends_with("offline.db"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
