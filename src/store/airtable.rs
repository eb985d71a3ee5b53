//! Airtable episode store.
//!
//! Wraps the Airtable REST API for the `YouTube Videos` table: one paged
//! listing to learn which episodes exist and where the numbering stands,
//! then one create request per new episode. Any non-success response is
//! fatal and surfaces the status code and body verbatim; records created
//! before the failure stay in place, which is safe to retry because the
//! video id keys the existence check.

use std::collections::HashMap;

use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::{EpisodeStore, SyncReport};
use crate::config::{self, AirtableCredentials, AIRTABLE_BASE_URL, AIRTABLE_TABLE};
use crate::error::SyncError;
use crate::fetch;
use crate::models::Episode;

/// Records fetched per listing page.
const PAGE_SIZE: &str = "100";

pub struct AirtableStore {
    client: Client,
    base_url: Url,
    api_key: String,
    base_id: String,
}

/// One page of the record listing.
#[derive(Debug, Deserialize)]
struct RecordPage {
    records: Vec<Record>,
    /// Continuation token; present while more pages remain.
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    fields: RecordFields,
}

/// The two projected fields of the listing.
#[derive(Debug, Default, Deserialize)]
struct RecordFields {
    #[serde(rename = "YouTube ID")]
    youtube_id: Option<String>,
    #[serde(rename = "Episode Number")]
    episode_number: Option<u32>,
}

impl AirtableStore {
    /// Create a store pointed at the production Airtable API.
    pub fn new(credentials: &AirtableCredentials) -> Result<Self, SyncError> {
        Self::with_base_url(credentials, AIRTABLE_BASE_URL)
    }

    /// Create a store with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        credentials: &AirtableCredentials,
        base_url: &str,
    ) -> Result<Self, SyncError> {
        // One trailing slash so join() appends instead of replacing the
        // last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        Ok(Self {
            client: fetch::build_client()?,
            base_url: Url::parse(&normalized)?,
            api_key: credentials.api_key.clone(),
            base_id: credentials.base_id.clone(),
        })
    }

    /// URL of the episodes table; the table name contains a space and is
    /// percent-encoded into the path.
    fn table_url(&self) -> Result<Url, SyncError> {
        let path = format!("{}/{}", self.base_id, urlencoding::encode(AIRTABLE_TABLE));
        Ok(self.base_url.join(&path)?)
    }

    /// Page through the whole table, projecting the video id and episode
    /// number, and return the id → record-id map plus the maximum episode
    /// number seen.
    #[instrument(level = "info", skip(self))]
    async fn list_existing(&self) -> Result<(HashMap<String, String>, u32), SyncError> {
        let mut by_video_id = HashMap::new();
        let mut max_number = 0u32;
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.table_url()?)
                .bearer_auth(&self.api_key)
                .query(&[
                    ("pageSize", PAGE_SIZE),
                    ("fields[]", "YouTube ID"),
                    ("fields[]", "Episode Number"),
                ]);
            if let Some(ref token) = offset {
                request = request.query(&[("offset", token.as_str())]);
            }

            let page: RecordPage = read_json(request.send().await?).await?;
            for record in page.records {
                if let Some(number) = record.fields.episode_number {
                    max_number = max_number.max(number);
                }
                if let Some(video_id) = record.fields.youtube_id {
                    by_video_id.insert(video_id, record.id);
                }
            }

            match page.offset {
                Some(token) => offset = Some(token),
                None => break,
            }
        }

        Ok((by_video_id, max_number))
    }

    /// Create one episode record.
    #[instrument(level = "info", skip(self, episode), fields(title = %episode.title, number))]
    async fn create_record(&self, episode: &Episode, number: u32) -> Result<(), SyncError> {
        let mut fields = serde_json::Map::new();
        fields.insert("Title".to_string(), json!(episode.title));
        fields.insert("Episode Number".to_string(), json!(number));
        fields.insert("YouTube ID".to_string(), json!(episode.youtube_id));
        fields.insert(
            "Thumbnail URL".to_string(),
            json!(config::thumbnail_url(&episode.youtube_id)),
        );
        fields.insert("Air Date".to_string(), json!(episode.date));
        fields.insert("Show on Website".to_string(), json!(true));
        if !episode.description.is_empty() {
            fields.insert("Description".to_string(), json!(episode.description));
        }
        if !episode.article_url.is_empty() {
            fields.insert("AZFamily URL".to_string(), json!(episode.article_url));
        }

        let response = self
            .client
            .post(self.table_url()?)
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

impl EpisodeStore for AirtableStore {
    async fn sync(&mut self, candidates: Vec<Episode>) -> Result<SyncReport, SyncError> {
        let (existing, max_number) = self.list_existing().await?;
        info!(
            existing = existing.len(),
            max_number, "loaded existing Airtable records"
        );

        let mut next_number = max_number;
        let mut report = SyncReport::default();

        for episode in candidates {
            if existing.contains_key(&episode.youtube_id) {
                debug!(title = %episode.title, "already in Airtable; skipping");
                report.skipped += 1;
                continue;
            }

            next_number += 1;
            self.create_record(&episode, next_number).await?;
            info!(number = next_number, title = %episode.title, "created Airtable record");
            report.created += 1;
        }

        Ok(report)
    }
}

/// Deserialize a response body, turning any non-success status into a fatal
/// error carrying the status code and body.
async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SyncError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Like [`read_json`] for endpoints whose body we do not need.
async fn check_status(response: Response) -> Result<(), SyncError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(SyncError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}
