//! amz-book-tracker - Notifies about new Kindle books of tracked authors.

use amz_book_tracker::amazon::StorefrontClient;
use amz_book_tracker::config::{Config, LogLevel};
use amz_book_tracker::tracker::{load_authors, AuthorSelection, PushoverClient, Tracker};
use anyhow::Result;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "amz-book-tracker",
    version,
    about = "Checks Amazon for new Kindle books of your favourite authors",
    long_about = "Searches the Kindle store for every author in the author list, \
                  remembers the books found and sends a Pushover message when \
                  new books appear or known ones change."
)]
struct Cli {
    /// Author to check, or "all" for every author in the list
    #[arg(short, long, default_value = "all")]
    author: String,

    /// CSV file with an "author" column
    #[arg(short = 'l', long)]
    author_list: Option<PathBuf>,

    /// Folder holding the known books of each author
    #[arg(long)]
    author_file_folder: Option<PathBuf>,

    /// Log level: DEBUG, INFO, WARNING, ERROR or CRITICAL
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Only log what was found: no files are written and nothing is sent
    #[arg(long, alias = "test")]
    dry_run: bool,

    /// Pushover user key
    #[arg(long, env = "PUSHOVER_USER_TOKEN")]
    pushover_user_token: Option<String>,

    /// Pushover application token
    #[arg(long, env = "PUSHOVER_API_TOKEN")]
    pushover_api_token: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// Credentials are logged only as present or absent
impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("Cli")
            .field("author", &self.author)
            .field("author_list", &self.author_list)
            .field("author_file_folder", &self.author_file_folder)
            .field("log_level", &self.log_level)
            .field("dry_run", &self.dry_run)
            .field("pushover_user_token", &redacted(&self.pushover_user_token))
            .field("pushover_api_token", &redacted(&self.pushover_api_token))
            .field("config", &self.config)
            .finish()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(path) = cli.author_list.clone() {
        config.author_list = path;
    }
    if let Some(folder) = cli.author_file_folder.clone() {
        config.authors_folder = folder;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(user) = cli.pushover_user_token.clone() {
        config.pushover_user = Some(user);
    }
    if let Some(token) = cli.pushover_api_token.clone() {
        config.pushover_token = Some(token);
    }

    let level: tracing::Level = config.log_level.into();
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    debug!("Arguments: {:?}", cli);

    tokio::select! {
        result = run(cli, config) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted. Exiting...");
            Ok(())
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    // Fail before any network traffic when notifications cannot be sent
    let credentials = config.credentials(cli.dry_run)?;

    let authors = load_authors(&config.author_list, &config.storefront_url)?;
    info!("Loaded {} authors from {}", authors.len(), config.author_list.display());

    let mut storefront = StorefrontClient::new(&config)?;
    storefront.select_user_agent(&config.user_agents_url, &config.probe_author).await;

    let notifier = match credentials {
        Some(credentials) => Some(PushoverClient::new(&config, credentials)?),
        None => None,
    };

    let tracker = Tracker::new(storefront, notifier, &config.authors_folder)
        .with_dry_run(cli.dry_run);
    let summary = tracker.run(&authors, &AuthorSelection::parse(&cli.author)).await;

    debug!("{:?}", summary);
    Ok(())
}
