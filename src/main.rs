//! bucket-notifier: object-storage change detection with webhook and chat
//! notifications.

use anyhow::{Context, Result};
use bucket_notifier::{cli, config::AppConfig, config::StoreBackend};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bucket-notifier")]
#[command(version)]
#[command(about = "Watch an S3 bucket and notify webhooks about changed objects", long_about = None)]
#[command(after_help = "ENVIRONMENT:
    BUCKET_NAME, AWS_REGION, AWS_ROLE_ARN, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY,
    WEBHOOK_URLS, WEBHOOK_SECRET_TOKEN, SLACK_WEBHOOK_URL, POLL_INTERVAL_MINUTES,
    PORT, SNAPSHOT_PATH override the config file.

EXAMPLES:
    # Poll every 5 minutes and serve /health, /check and /status on :8080
    bucket-notifier serve --bucket reports

    # Run a single poll and print what changed
    bucket-notifier check --bucket reports

    # Start from a commented config file
    bucket-notifier config init")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by commands that run polls.
#[derive(Parser)]
struct PollArgs {
    /// Bucket to watch (overrides config and BUCKET_NAME)
    #[arg(short, long)]
    bucket: Option<String>,

    /// Snapshot file path
    #[arg(long, conflicts_with = "memory_store")]
    snapshot_path: Option<PathBuf>,

    /// Keep the snapshot in memory only
    #[arg(long)]
    memory_store: bool,

    /// Generic webhook URL (repeatable; replaces configured URLs)
    #[arg(long = "webhook-url")]
    webhook_urls: Vec<String>,
}

/// Arguments for the `serve` subcommand
#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    poll: PollArgs,

    /// Poll interval (e.g. 30s, 5m, 1h)
    #[arg(short, long)]
    interval: Option<String>,

    /// Run the first poll immediately
    #[arg(long)]
    poll_on_start: bool,

    /// Port for the trigger server
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll on a schedule and serve the HTTP trigger endpoints
    Serve(ServeArgs),

    /// Run one poll, wait for notifications, and print the result as JSON
    Check(PollArgs),

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with secrets redacted
    Show,
    /// Print config file search paths and the discovered config file
    Path,
    /// Write a commented bucket-notifier.yaml to the current directory
    Init,
    /// Print the JSON Schema of the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl PollArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(bucket) = self.bucket {
            config.bucket.name = bucket;
        }
        if let Some(path) = self.snapshot_path {
            config.store.backend = StoreBackend::File;
            config.store.path = Some(path);
        }
        if self.memory_store {
            config.store.backend = StoreBackend::Memory;
        }
        if !self.webhook_urls.is_empty() {
            config.notify.webhook_urls = self.webhook_urls;
        }
    }
}

/// Load file + environment, apply CLI overrides, and validate.
fn effective_config(path: Option<&Path>, apply: impl FnOnce(&mut AppConfig)) -> Result<AppConfig> {
    let (mut config, loaded_from) =
        bucket_notifier::config::load(path).context("failed to load configuration")?;
    if let Some(path) = &loaded_from {
        tracing::info!("Loaded configuration from {}", path.display());
    }
    apply(&mut config);
    config.ensure_valid()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Serve(args) => {
            let config = effective_config(cli.config.as_deref(), |config| {
                args.poll.apply(config);
                if let Some(interval) = args.interval {
                    config.schedule.interval = interval;
                }
                if args.poll_on_start {
                    config.schedule.poll_on_start = true;
                }
                if let Some(port) = args.port {
                    config.server.port = port;
                }
            })?;
            cli::run_serve(config).await
        }

        Commands::Check(args) => {
            let config = effective_config(cli.config.as_deref(), |config| args.apply(config))?;
            cli::run_check(config).await.map(|_| ())
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "bucket-notifier", &mut io::stdout());
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = bucket_notifier::config::load(cli.config.as_deref())
                    .context("failed to load configuration")?;
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults and environment");
                }
                let overrides =
                    bucket_notifier::config::active_overrides(|name| std::env::var(name).ok());
                if !overrides.is_empty() {
                    eprintln!("# Environment overrides: {}", overrides.join(", "));
                }
                let yaml = serde_yaml::to_string(&config.redacted())
                    .context("failed to serialize config")?;
                print!("{yaml}");
                for error in bucket_notifier::config::Validatable::validate(&config) {
                    eprintln!("# warning: {error}");
                }
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths = [
                    std::env::current_dir().ok(),
                    ::dirs::config_dir().map(|p| p.join("bucket-notifier")),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {}", path.display());
                }
                match bucket_notifier::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join("bucket-notifier.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = bucket_notifier::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
            ConfigAction::Schema { output } => {
                let schema = bucket_notifier::config::generate_json_schema();
                match output {
                    Some(path) => {
                        std::fs::write(&path, &schema)?;
                        eprintln!("Schema written to {}", path.display());
                    }
                    None => println!("{schema}"),
                }
                Ok(())
            }
        },
    }
}
