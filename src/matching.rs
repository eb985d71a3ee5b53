//! Episode-to-article matching by word overlap.
//!
//! Headlines on azfamily.com rarely repeat the YouTube title verbatim, so
//! matching is fuzzy: both sides are reduced to lowercase word sets and a
//! link is accepted only when enough words are shared.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::models::ScrapedLink;

/// Minimum shared-word count for a link to count as a match.
const MIN_OVERLAP: usize = 3;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Lowercase word set of a string.
fn tokenize(text: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|word| word.as_str().to_string())
        .collect()
}

/// Pick the article link best matching an episode title.
///
/// Each link is scored by the number of words shared between the title and
/// the link's text and destination combined. The highest score wins, ties
/// going to the earlier link; a best score under [`MIN_OVERLAP`] means no
/// match. A site-relative destination is rewritten against `site_origin`.
pub fn best_article_url(
    title: &str,
    links: &[ScrapedLink],
    site_origin: &str,
) -> Option<String> {
    let title_words = tokenize(title);

    let mut best: Option<&ScrapedLink> = None;
    let mut best_score = 0usize;

    for link in links {
        let link_words = tokenize(&format!("{} {}", link.text, link.href));
        let overlap = title_words.intersection(&link_words).count();
        if overlap > best_score {
            best_score = overlap;
            best = Some(link);
        }
    }

    if best_score < MIN_OVERLAP {
        return None;
    }

    let href = best.map(|link| link.href.as_str())?;
    if href.starts_with('/') {
        let absolute = Url::parse(site_origin).ok()?.join(href).ok()?;
        Some(absolute.to_string())
    } else {
        Some(href.to_string())
    }
}
