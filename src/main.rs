//! # Generation AI Episode Sync
//!
//! A run-to-completion job that keeps the Generation AI episode list up to
//! date: it polls the AZFamily YouTube channel feed for new episodes,
//! scrapes azfamily.com for matching article links, and appends anything
//! new to the configured store.
//!
//! ## Usage
//!
//! ```sh
//! # Local JSON store
//! genai_episode_sync --data-file data/episodes.json
//!
//! # Airtable store
//! AIRTABLE_API_KEY=... AIRTABLE_BASE_ID=... genai_episode_sync
//! ```
//!
//! ## Pipeline
//!
//! 1. **Feed**: fetch and parse the channel's Atom feed (retried with
//!    backoff; an unreachable feed means nothing to sync and exits 0)
//! 2. **Scrape**: collect Generation AI article links (best-effort)
//! 3. **Match**: attach the best article link to each episode by word
//!    overlap
//! 4. **Persist**: existence-check-then-append against Airtable or the
//!    local JSON file, whichever the credentials select (a store failure
//!    exits 1)

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod feed;
mod fetch;
mod matching;
mod models;
mod scrape;
mod store;

use cli::Cli;
use config::Config;
use models::Episode;
use store::airtable::AirtableStore;
use store::json_file::JsonFileStore;
use store::{EpisodeStore, SyncReport};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("episode_sync starting up");

    let args = Cli::parse();
    let config = Config::from_cli(&args);
    debug!(?config, "resolved configuration");

    let client = match fetch::build_client() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    // ---- Feed ----
    let episodes = match feed::fetch_episodes(&client, &config.feed_url).await {
        Ok(episodes) => episodes,
        Err(e) => {
            // Without a feed there is nothing to synchronize; the next
            // scheduled run will try again.
            warn!(error = %e, "feed unavailable; nothing to sync this run");
            return ExitCode::SUCCESS;
        }
    };

    if episodes.is_empty() {
        info!("no matching episodes in feed");
    }

    // ---- Scrape (best-effort) ----
    let links = scrape::scrape_article_links(&client, &config.article_page_url).await;

    // ---- Match ----
    let episodes: Vec<Episode> = episodes
        .into_iter()
        .map(|mut episode| {
            match matching::best_article_url(&episode.title, &links, &config.site_origin) {
                Some(url) => {
                    debug!(title = %episode.title, article_url = %url, "matched article link");
                    episode.article_url = url;
                }
                None => {
                    debug!(title = %episode.title, "no article link matched");
                }
            }
            episode
        })
        .collect();

    // ---- Persist ----
    let result = match config.airtable {
        Some(ref credentials) => {
            info!(base_id = %credentials.base_id, "using Airtable store");
            match AirtableStore::new(credentials) {
                Ok(mut airtable) => airtable.sync(episodes).await,
                Err(e) => Err(e),
            }
        }
        None => {
            info!(
                path = %config.data_file.display(),
                "Airtable credentials not set; using local JSON store"
            );
            JsonFileStore::new(config.data_file.clone())
                .sync(episodes)
                .await
        }
    };

    let report: SyncReport = match result {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "failed to persist episodes");
            return ExitCode::FAILURE;
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        created = report.created,
        skipped = report.skipped,
        ?elapsed,
        "sync complete"
    );

    ExitCode::SUCCESS
}
