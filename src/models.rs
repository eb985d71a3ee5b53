//! Data models for feed episodes, scraped links, and the local store schema.
//!
//! [`EpisodeRecord`] and [`EpisodesFile`] pin the on-disk JSON schema with
//! serde rename attributes; the website reads that file directly, so the
//! field names are load-bearing.

use serde::{Deserialize, Serialize};

/// An episode candidate parsed out of the channel feed.
///
/// `article_url` starts empty and is filled in by the matcher when a
/// scraped link clears the overlap threshold.
#[derive(Debug, Clone)]
pub struct Episode {
    /// Episode title as published on YouTube.
    pub title: String,
    /// YouTube video id; the unique key across both stores.
    pub youtube_id: String,
    /// Air date, `YYYY-MM-DD`.
    pub date: String,
    /// Human rendering of the air date, e.g. `February 5, 2026`.
    pub date_formatted: String,
    /// First paragraph of the video description, cut at the first URL line.
    pub description: String,
    /// Matched azfamily.com article, or empty when none cleared the bar.
    pub article_url: String,
}

/// An anchor scraped from the article page: destination plus visible text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScrapedLink {
    pub href: String,
    pub text: String,
}

/// One persisted episode in the local JSON store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Sequence number assigned at persistence time; never reused.
    pub number: u32,
    pub title: String,
    /// Filled in by hand after the fact; the sync job always writes "".
    pub guest: String,
    pub date: String,
    pub date_formatted: String,
    pub description: String,
    pub youtube_id: String,
    pub azfamily_url: String,
}

/// The local JSON store document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodesFile {
    /// ISO-8601 UTC, second precision, `Z`-suffixed; "" until first write.
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}

impl Episode {
    /// Convert into a store record with the sequence number the backend
    /// assigned.
    pub fn into_record(self, number: u32) -> EpisodeRecord {
        EpisodeRecord {
            number,
            title: self.title,
            guest: String::new(),
            date: self.date,
            date_formatted: self.date_formatted,
            description: self.description,
            youtube_id: self.youtube_id,
            azfamily_url: self.article_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_episode() -> Episode {
        Episode {
            title: "Generation AI: Robots in the classroom".to_string(),
            youtube_id: "xyz123".to_string(),
            date: "2026-02-11".to_string(),
            date_formatted: "February 11, 2026".to_string(),
            description: "A look at classroom robots.".to_string(),
            article_url: String::new(),
        }
    }

    #[test]
    fn test_record_serializes_with_camel_case_names() {
        let record = sample_episode().into_record(7);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"dateFormatted\""));
        assert!(json.contains("\"youtubeId\""));
        assert!(json.contains("\"azfamilyUrl\""));
        assert!(json.contains("\"guest\":\"\""));
        assert!(json.contains("\"number\":7"));
    }

    #[test]
    fn test_file_serializes_last_updated() {
        let file = EpisodesFile {
            last_updated: "2026-02-11T22:15:03Z".to_string(),
            episodes: vec![],
        };
        let json = serde_json::to_string(&file).unwrap();

        assert!(json.contains("\"lastUpdated\":\"2026-02-11T22:15:03Z\""));
        assert!(json.contains("\"episodes\":[]"));
    }

    #[test]
    fn test_file_deserializes_empty_document() {
        let file: EpisodesFile =
            serde_json::from_str(r#"{"lastUpdated": "", "episodes": []}"#).unwrap();
        assert_eq!(file.last_updated, "");
        assert!(file.episodes.is_empty());
    }

    #[test]
    fn test_file_round_trips_existing_records() {
        let json = r#"{
            "lastUpdated": "2026-02-05T09:00:00Z",
            "episodes": [
                {
                    "number": 1,
                    "title": "Generation AI: Pilot",
                    "guest": "Dr. Ortega",
                    "date": "2026-01-28",
                    "dateFormatted": "January 28, 2026",
                    "description": "The first episode.",
                    "youtubeId": "abc999",
                    "azfamilyUrl": ""
                }
            ]
        }"#;

        let file: EpisodesFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.episodes.len(), 1);
        assert_eq!(file.episodes[0].number, 1);
        assert_eq!(file.episodes[0].guest, "Dr. Ortega");
        assert_eq!(file.episodes[0].youtube_id, "abc999");
    }

    #[test]
    fn test_non_ascii_preserved_literally() {
        let mut episode = sample_episode();
        episode.title = "Generation AI: ¿Qué sigue?".to_string();
        let json = serde_json::to_string_pretty(&episode.into_record(1)).unwrap();
        assert!(json.contains("¿Qué sigue?"));
    }
}
