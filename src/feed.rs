//! Channel feed reader.
//!
//! Fetches the YouTube Atom feed for the configured channel and extracts
//! Generation AI episode candidates. Parsing is a single streaming pass over
//! XML events; the element path is tracked explicitly so `title` inside
//! `entry` is not confused with `media:title` inside `media:group`.
//!
//! Entries whose title does not match the show pattern are dropped, and
//! retained entries missing a video id or publish timestamp are skipped
//! silently.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::{FEED_MAX_RETRIES, FEED_RETRY_BASE_DELAY, SHOW_TITLE_RE};
use crate::error::SyncError;
use crate::fetch;
use crate::models::Episode;

static PARAGRAPH_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static URL_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

/// Fetch the feed (with backoff) and return the matching episode candidates
/// in feed order.
///
/// # Errors
///
/// Returns [`SyncError::Http`] once the retry budget is exhausted, or
/// [`SyncError::Xml`] for a malformed feed. Both are treated as "nothing to
/// sync this run" by the caller.
#[instrument(level = "info", skip(client))]
pub async fn fetch_episodes(client: &Client, feed_url: &str) -> Result<Vec<Episode>, SyncError> {
    let xml =
        fetch::get_text_with_backoff(client, feed_url, FEED_MAX_RETRIES, FEED_RETRY_BASE_DELAY)
            .await?;
    let episodes = parse_feed(&xml)?;
    info!(count = episodes.len(), "parsed matching feed entries");
    Ok(episodes)
}

/// Fields accumulated while inside an `<entry>` element.
#[derive(Default)]
struct EntryFields {
    title: String,
    video_id: String,
    published: String,
    description: String,
}

impl EntryFields {
    /// Apply the filter and the skip rules; build an [`Episode`] if the
    /// entry survives both.
    fn finish(self) -> Option<Episode> {
        if !SHOW_TITLE_RE.is_match(&self.title) {
            return None;
        }
        if self.video_id.is_empty() || self.published.is_empty() {
            debug!(title = %self.title, "entry missing video id or publish date; skipping");
            return None;
        }

        let date = self
            .published
            .get(..10)
            .unwrap_or(&self.published)
            .to_string();

        Some(Episode {
            date_formatted: format_air_date(&date),
            title: self.title,
            youtube_id: self.video_id,
            date,
            description: extract_description(&self.description),
            article_url: String::new(),
        })
    }
}

/// Parse the Atom feed and return the episodes passing the title filter.
pub fn parse_feed(xml: &str) -> Result<Vec<Episode>, SyncError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut entry: Option<EntryFields> = None;
    let mut text = String::new();
    let mut episodes = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "entry" {
                    entry = Some(EntryFields::default());
                }
                path.push(name);
                text.clear();
            }
            Event::Text(e) => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            // Entity and character references arrive as their own events;
            // fold the common ones back into the surrounding text.
            Event::GeneralRef(e) => {
                if let Some(resolved) = resolve_reference(&e) {
                    text.push_str(&resolved);
                }
            }
            Event::End(_) => {
                if let Some(fields) = entry.as_mut() {
                    let p: Vec<&str> = path.iter().map(String::as_str).collect();
                    match p.as_slice() {
                        ["feed", "entry", "title"] => fields.title = text.trim().to_string(),
                        ["feed", "entry", "yt:videoId"] => {
                            fields.video_id = text.trim().to_string();
                        }
                        ["feed", "entry", "published"] => {
                            fields.published = text.trim().to_string();
                        }
                        ["feed", "entry", "media:group", "media:description"] => {
                            fields.description = text.trim().to_string();
                        }
                        _ => {}
                    }
                }
                if path.pop().as_deref() == Some("entry") {
                    if let Some(episode) = entry.take().and_then(EntryFields::finish) {
                        episodes.push(episode);
                    }
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(episodes)
}

/// Resolve a predefined entity or numeric character reference by name
/// (the bytes between `&` and `;`). Unknown entities resolve to nothing.
fn resolve_reference(name: &[u8]) -> Option<String> {
    match name {
        b"amp" => Some("&".to_string()),
        b"lt" => Some("<".to_string()),
        b"gt" => Some(">".to_string()),
        b"quot" => Some("\"".to_string()),
        b"apos" => Some("'".to_string()),
        _ => {
            let name = std::str::from_utf8(name).ok()?;
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code).map(String::from)
        }
    }
}

/// First paragraph of a video description, truncated at the first line that
/// looks like a URL, with the surviving lines joined by a space.
fn extract_description(raw: &str) -> String {
    let first = PARAGRAPH_BREAK_RE
        .split(raw.trim())
        .next()
        .unwrap_or("")
        .trim();

    let mut lines = Vec::new();
    for line in first.split('\n') {
        let line = line.trim();
        if URL_LINE_RE.is_match(line) {
            break;
        }
        lines.push(line);
    }
    lines.join(" ")
}

/// Render `YYYY-MM-DD` as `February 5, 2026`; leading zero stripped from the
/// day only. A string that does not parse is passed through untouched.
fn format_air_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
