//! Fixed constants and the immutable run configuration.
//!
//! Everything that was tunable about a run (paths, channel, URL overrides,
//! credentials) is folded into a single [`Config`] built once from the CLI;
//! everything fixed (retry policy, table name, User-Agent, title pattern)
//! lives here as constants.

use std::path::PathBuf;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cli::Cli;

/// AZFamily YouTube channel that airs Generation AI.
pub const DEFAULT_CHANNEL_ID: &str = "UCIrgpHvUm1FMtv-C1xwkJtw";

/// AZFamily technology section, where episode articles are published.
pub const DEFAULT_ARTICLE_PAGE_URL: &str = "https://www.azfamily.com/news/technology/";

/// Origin used to absolutize site-relative article links.
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.azfamily.com";

/// Airtable REST endpoint.
pub const AIRTABLE_BASE_URL: &str = "https://api.airtable.com/v0/";

/// Airtable table holding one record per episode.
pub const AIRTABLE_TABLE: &str = "YouTube Videos";

/// Browser User-Agent sent with every request; both youtube.com and
/// azfamily.com serve different (or no) content to unknown agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry budget for the feed fetch. The feed is the whole reason the job
/// runs, so it gets retries; scraping and persistence do not.
pub const FEED_MAX_RETRIES: usize = 5;

/// Initial backoff delay for the feed fetch; doubles per attempt.
pub const FEED_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Title phrase identifying show episodes, applied to feed entry titles and
/// scraped link text/hrefs alike.
pub static SHOW_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)generation\s+ai").unwrap());

/// Feed URL for a channel.
pub fn feed_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/feeds/videos.xml?channel_id={channel_id}")
}

/// Derived thumbnail location for a video.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

/// Airtable credentials; remote persistence activates only when both parts
/// were supplied.
#[derive(Clone)]
pub struct AirtableCredentials {
    pub api_key: String,
    pub base_id: String,
}

// Keep the API key out of debug logs.
impl std::fmt::Debug for AirtableCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableCredentials")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .finish()
    }
}

/// Immutable configuration for one run, resolved from the CLI at startup.
#[derive(Debug)]
pub struct Config {
    /// Atom feed to poll.
    pub feed_url: String,
    /// Page scraped for matching article links.
    pub article_page_url: String,
    /// Origin prefixed onto site-relative article links.
    pub site_origin: String,
    /// Local JSON store, used when no Airtable credentials are present.
    pub data_file: PathBuf,
    /// Remote store credentials, when configured.
    pub airtable: Option<AirtableCredentials>,
}

impl Config {
    pub fn from_cli(args: &Cli) -> Self {
        let airtable = match (&args.airtable_api_key, &args.airtable_base_id) {
            (Some(api_key), Some(base_id)) => Some(AirtableCredentials {
                api_key: api_key.clone(),
                base_id: base_id.clone(),
            }),
            _ => None,
        };

        Self {
            feed_url: args
                .feed_url
                .clone()
                .unwrap_or_else(|| feed_url(&args.channel_id)),
            article_page_url: args.article_page_url.clone(),
            site_origin: args.site_origin.clone(),
            data_file: args.data_file.clone(),
            airtable,
        }
    }
}
