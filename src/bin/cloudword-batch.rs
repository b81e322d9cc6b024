//! Offline pipeline for category clouds:
//! `fetch` writes `data_raw_<category>.json`, `aggregate` turns those into
//! `data_terms_<category>.json`, `render` draws `outputs/<category>.png`.

use anyhow::bail;
use clap::{Parser, Subcommand};
use cloud_renderer::WordCloud;
use cloudword_core::{AppConfig, CoreError, ErrorReporter, RenderConfig, ENV_CONFIG_PATH};
use reddit_client::{fetch_category, RedditClient, RedditCredentials};
use std::path::PathBuf;
use term_engine::TermCounter;
use term_store::{DataKind, DataStore};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_DIRECTIVES: &str = "cloudword_batch=info,reddit_client=info,term_store=info";

#[derive(Parser)]
#[command(name = "cloudword-batch")]
#[command(about = "Fetch, aggregate and render per-category word clouds")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = ENV_CONFIG_PATH, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch hot posts for each category's subreddits
    Fetch {
        #[arg(long)]
        category: Option<String>,
        /// Posts per category, split across its subreddits
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Count terms in the fetched posts
    Aggregate {
        #[arg(long)]
        category: Option<String>,
    },
    /// Draw a cloud for every aggregated category
    Render {
        #[arg(long)]
        category: Option<String>,
    },
    /// Fetch, aggregate and render in one go
    All {
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_DIRECTIVES.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;
    let store = DataStore::new(config.data_dir.clone());

    match cli.command {
        Command::Fetch { category, limit } => fetch(&config, &store, category, limit).await,
        Command::Aggregate { category } => aggregate(&config, &store, category).await,
        Command::Render { category } => render(&config, &store, category).await,
        Command::All { limit } => {
            fetch(&config, &store, None, limit).await?;
            aggregate(&config, &store, None).await?;
            render(&config, &store, None).await
        }
    }
}

async fn fetch(
    config: &AppConfig,
    store: &DataStore,
    category: Option<String>,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let categories: Vec<String> = match category {
        Some(name) if config.subreddits_for(&name).is_none() => {
            bail!("Unknown category '{name}'")
        }
        Some(name) => vec![name],
        None => config.category_names().map(str::to_string).collect(),
    };

    let client = RedditClient::new(RedditCredentials::from_env()?)?;
    let limit = limit.unwrap_or(config.fetch_limit);

    let reporter = ErrorReporter::new();
    let mut failed = Vec::new();
    for category in categories {
        let subreddits = config.subreddits_for(&category).unwrap_or_default();
        info!(
            "Fetching up to {} posts for '{}' from {:?}",
            limit, category, subreddits
        );
        if let Err(e) = fetch_one(&client, store, &category, subreddits, limit).await {
            reporter.report_error(&e);
            failed.push(category);
        }
    }

    if !failed.is_empty() {
        bail!("Fetch failed for: {}", failed.join(", "));
    }
    Ok(())
}

async fn fetch_one(
    client: &RedditClient,
    store: &DataStore,
    category: &str,
    subreddits: &[String],
    limit: u32,
) -> Result<(), CoreError> {
    let posts = fetch_category(client, subreddits, limit).await?;
    store.save_raw(category, &posts).await?;
    Ok(())
}

async fn aggregate(
    config: &AppConfig,
    store: &DataStore,
    category: Option<String>,
) -> anyhow::Result<()> {
    let categories = match category {
        Some(name) => vec![name],
        None => store.list_categories(DataKind::Raw).await?,
    };
    if categories.is_empty() {
        warn!("No raw data found in {}", store.root().display());
    }

    let counter = TermCounter::with_extra_stopwords(config.extra_stopwords.as_slice());
    for category in categories {
        let posts = store.load_raw(&category).await?;
        let terms = counter.count_posts(&posts);
        info!(
            "'{}': {} posts, {} distinct terms",
            category,
            posts.len(),
            terms.len()
        );
        store.save_terms(&category, &terms).await?;
    }
    Ok(())
}

async fn render(
    config: &AppConfig,
    store: &DataStore,
    category: Option<String>,
) -> anyhow::Result<()> {
    let categories = match category {
        Some(name) => vec![name],
        None => store.list_categories(DataKind::Terms).await?,
    };
    if categories.is_empty() {
        warn!("No term data found in {}", store.root().display());
    }

    let cloud = WordCloud::from_font_path(config.font_path.as_deref())?;
    for category in categories {
        let terms = store.load_terms(&category).await?;
        if terms.is_empty() {
            warn!("Skipping '{}': no terms", category);
            continue;
        }

        let cloud = cloud.clone();
        let png = tokio::task::spawn_blocking(move || {
            cloud.render_png(&terms, &RenderConfig::category_default())
        })
        .await??;
        store.save_image(&category, png).await?;
    }
    Ok(())
}
