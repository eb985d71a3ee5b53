//! Local JSON episode store.
//!
//! Fallback store for environments without Airtable credentials: a single
//! pretty-printed `episodes.json` with a `lastUpdated` stamp and the
//! ordered episode list. The website reads this file as-is, so the schema
//! (see [`crate::models::EpisodeRecord`]) must not drift.
//!
//! Writes go to a sibling temp file and are renamed into place, so an
//! interrupted run leaves either the old or the new complete document.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, instrument};

use super::{EpisodeStore, SyncReport};
use crate::error::SyncError;
use crate::models::{Episode, EpisodesFile};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the store document, or start from an empty one if the file
    /// does not exist yet. A malformed document is an error, not a reset.
    async fn load(&self) -> Result<EpisodesFile, SyncError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no store file yet; starting empty");
                Ok(EpisodesFile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the document: pretty-printed, trailing newline, non-ASCII
    /// preserved literally, temp-file-then-rename.
    async fn save(&self, data: &EpisodesFile) -> Result<(), SyncError> {
        let mut json = serde_json::to_string_pretty(data)?;
        json.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).await?;
        fs::rename(&tmp_path, &self.path).await?;
        info!(path = %self.path.display(), bytes = json.len(), "wrote episode store");
        Ok(())
    }
}

impl EpisodeStore for JsonFileStore {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn sync(&mut self, candidates: Vec<Episode>) -> Result<SyncReport, SyncError> {
        let mut data = self.load().await?;
        let existing: HashSet<String> = data
            .episodes
            .iter()
            .map(|record| record.youtube_id.clone())
            .collect();

        let mut report = SyncReport::default();
        for episode in candidates {
            if existing.contains(&episode.youtube_id) {
                debug!(title = %episode.title, "already in store file; skipping");
                report.skipped += 1;
                continue;
            }

            let number = data.episodes.len() as u32 + 1;
            info!(number, title = %episode.title, "appending episode");
            data.episodes.push(episode.into_record(number));
            report.created += 1;
        }

        if report.created > 0 {
            data.last_updated = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
            self.save(&data).await?;
        } else {
            info!("no new episodes; store file untouched");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Episode;
    use tempfile::TempDir;

    fn episode(title: &str, video_id: &str, date: &str) -> Episode {
        Episode {
            title: title.to_string(),
            youtube_id: video_id.to_string(),
            date: date.to_string(),
            date_formatted: crate_format(date),
            description: "Body.".to_string(),
            article_url: String::new(),
        }
    }

    // Mirror of the feed's rendering, enough for store tests.
    fn crate_format(date: &str) -> String {
        match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
            Err(_) => date.to_string(),
        }
    }

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("data").join("episodes.json"))
    }

    #[tokio::test]
    async fn test_empty_store_first_episode_gets_number_one() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let report = store
            .sync(vec![episode(
                "Generation AI: Classroom robots",
                "xyz123",
                "2026-02-11",
            )])
            .await
            .unwrap();

        assert_eq!(report, SyncReport { created: 1, skipped: 0 });

        let raw = std::fs::read_to_string(dir.path().join("data").join("episodes.json")).unwrap();
        let data: EpisodesFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(data.episodes.len(), 1);
        let record = &data.episodes[0];
        assert_eq!(record.number, 1);
        assert_eq!(record.youtube_id, "xyz123");
        assert_eq!(record.date, "2026-02-11");
        assert_eq!(record.date_formatted, "February 11, 2026");
        assert_eq!(record.guest, "");
        assert!(!data.last_updated.is_empty());
    }

    #[tokio::test]
    async fn test_rerun_neither_duplicates_nor_renumbers() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let candidate = episode("Generation AI: Stable", "abc001", "2026-02-05");

        store.sync(vec![candidate.clone()]).await.unwrap();
        let report = store.sync(vec![candidate]).await.unwrap();

        assert_eq!(report, SyncReport { created: 0, skipped: 1 });

        let raw = std::fs::read_to_string(dir.path().join("data").join("episodes.json")).unwrap();
        let data: EpisodesFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(data.episodes.len(), 1);
        assert_eq!(data.episodes[0].number, 1);
    }

    #[tokio::test]
    async fn test_numbers_continue_from_list_length() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .sync(vec![
                episode("Generation AI: One", "v1", "2026-01-07"),
                episode("Generation AI: Two", "v2", "2026-01-14"),
            ])
            .await
            .unwrap();
        store
            .sync(vec![
                episode("Generation AI: Two", "v2", "2026-01-14"),
                episode("Generation AI: Three", "v3", "2026-01-21"),
            ])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("data").join("episodes.json")).unwrap();
        let data: EpisodesFile = serde_json::from_str(&raw).unwrap();
        let numbers: Vec<u32> = data.episodes.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_no_new_episodes_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .sync(vec![episode("Generation AI: Only", "v1", "2026-01-07")])
            .await
            .unwrap();
        let before =
            std::fs::read_to_string(dir.path().join("data").join("episodes.json")).unwrap();

        store
            .sync(vec![episode("Generation AI: Only", "v1", "2026-01-07")])
            .await
            .unwrap();
        let after =
            std::fs::read_to_string(dir.path().join("data").join("episodes.json")).unwrap();

        assert_eq!(before, after, "lastUpdated must not move without writes");
    }

    #[tokio::test]
    async fn test_written_document_shape() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let mut with_article = episode("Generation AI: Água y más", "v9", "2026-02-05");
        with_article.article_url =
            "https://www.azfamily.com/news/technology/generation-ai-agua/".to_string();
        store.sync(vec![with_article]).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("data").join("episodes.json")).unwrap();

        assert!(raw.ends_with('\n'), "document must end with a newline");
        assert!(raw.contains("  \"lastUpdated\""), "pretty two-space indent");
        assert!(raw.contains("Água y más"), "non-ASCII preserved literally");
        assert!(raw.contains("\"azfamilyUrl\""));
        assert!(raw.contains("\"dateFormatted\": \"February 5, 2026\""));
    }

    #[tokio::test]
    async fn test_malformed_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episodes.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = JsonFileStore::new(path);
        let result = store
            .sync(vec![episode("Generation AI: Unlucky", "v1", "2026-01-07")])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .sync(vec![episode("Generation AI: Tidy", "v1", "2026-01-07")])
            .await
            .unwrap();

        assert!(!dir.path().join("data").join("episodes.json.tmp").exists());
    }
}
