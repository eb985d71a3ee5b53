//! AZFamily article link scraper.
//!
//! Scrapes the technology section of [azfamily.com](https://www.azfamily.com)
//! for anchors related to Generation AI. This step is strictly best-effort:
//! the site is rendered client-side at times and occasionally rate-limits,
//! so every failure degrades to "no links found" rather than failing the
//! sync run.

use itertools::Itertools;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::config::SHOW_TITLE_RE;
use crate::error::SyncError;
use crate::fetch;
use crate::models::ScrapedLink;

/// Scrape the article page for Generation AI links.
///
/// Returns every `(href, text)` anchor pair whose visible text or
/// destination matches the show pattern, in document order with exact
/// duplicates dropped. Any failure is logged and mapped to an empty list.
#[instrument(level = "info", skip(client))]
pub async fn scrape_article_links(client: &Client, url: &str) -> Vec<ScrapedLink> {
    match fetch_links(client, url).await {
        Ok(links) => {
            info!(count = links.len(), source = url, "scraped candidate article links");
            links
        }
        Err(e) => {
            warn!(error = %e, %url, "could not scrape article links; continuing without");
            Vec::new()
        }
    }
}

async fn fetch_links(client: &Client, url: &str) -> Result<Vec<ScrapedLink>, SyncError> {
    let html = fetch::get_text(client, url).await?;
    Ok(extract_links(&html))
}

fn extract_links(html: &str) -> Vec<ScrapedLink> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let text = element.text().collect::<Vec<_>>().join(" ").trim().to_string();

        if SHOW_TITLE_RE.is_match(&text) || SHOW_TITLE_RE.is_match(href) {
            debug!(%href, %text, "anchor matches show pattern");
            links.push(ScrapedLink {
                href: href.to_string(),
                text,
            });
        }
    }

    links.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
        <a href="/news/technology/2026/02/11/generation-ai-classroom-robots/">
            Generation AI: Robots in the classroom
        </a>
        <a href="/news/weather/forecast/">Weather forecast</a>
        <a href="https://www.azfamily.com/video/generation ai extended cut">watch</a>
        <a href="/news/technology/2026/02/11/generation-ai-classroom-robots/">
            Generation AI: Robots in the classroom
        </a>
    </body></html>"#;

    #[test]
    fn test_extract_links_filters_by_text_or_href() {
        let links = extract_links(PAGE);

        assert_eq!(links.len(), 2);
        assert_eq!(
            links[0].href,
            "/news/technology/2026/02/11/generation-ai-classroom-robots/"
        );
        assert_eq!(links[0].text, "Generation AI: Robots in the classroom");
        // matched on href alone
        assert_eq!(links[1].text, "watch");
    }

    #[test]
    fn test_extract_links_drops_exact_duplicates() {
        let links = extract_links(PAGE);
        let robots = links
            .iter()
            .filter(|l| l.href.contains("classroom-robots"))
            .count();
        assert_eq!(robots, 1);
    }

    #[test]
    fn test_extract_links_empty_page() {
        assert!(extract_links("<html><body></body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_scrape_failure_yields_no_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = fetch::build_client().unwrap();
        let links = scrape_article_links(&client, &server.uri()).await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_unreachable_host_yields_no_links() {
        let client = fetch::build_client().unwrap();
        // Port 9 (discard) is not listening; connection is refused.
        let links = scrape_article_links(&client, "http://127.0.0.1:9/news/").await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_success_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/technology/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let client = fetch::build_client().unwrap();
        let links =
            scrape_article_links(&client, &format!("{}/news/technology/", server.uri())).await;
        assert_eq!(links.len(), 2);
    }
}
