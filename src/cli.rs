//! Command-line interface definitions for the episode sync job.
//!
//! All options have defaults suitable for the production cron invocation;
//! the URL overrides exist so tests and local dry-runs can point the job at
//! a mock server instead of youtube.com and azfamily.com.

use std::path::PathBuf;

use clap::Parser;

use crate::config;

/// Command-line arguments for one sync run.
///
/// # Examples
///
/// ```sh
/// # Local JSON store
/// genai_episode_sync --data-file data/episodes.json
///
/// # Airtable store (credentials usually come from the environment)
/// AIRTABLE_API_KEY=... AIRTABLE_BASE_ID=... genai_episode_sync
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the local JSON episode store
    #[arg(short, long, default_value = "data/episodes.json")]
    pub data_file: PathBuf,

    /// YouTube channel to poll for episodes
    #[arg(long, default_value = config::DEFAULT_CHANNEL_ID)]
    pub channel_id: String,

    /// Full feed URL override; takes precedence over --channel-id
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Page scraped for matching article links
    #[arg(long, default_value = config::DEFAULT_ARTICLE_PAGE_URL)]
    pub article_page_url: String,

    /// Origin prefixed onto site-relative article links
    #[arg(long, default_value = config::DEFAULT_SITE_ORIGIN)]
    pub site_origin: String,

    /// Airtable API key; enables the Airtable store together with the base id
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    pub airtable_api_key: Option<String>,

    /// Airtable base id
    #[arg(long, env = "AIRTABLE_BASE_ID")]
    pub airtable_base_id: Option<String>,
}
