//! Persistent episode stores.
//!
//! Two interchangeable backends: the Airtable table used by the production
//! site ([`airtable::AirtableStore`]) and a local JSON document
//! ([`json_file::JsonFileStore`]) for environments without credentials. The
//! caller selects one at startup based on which credentials are present.
//!
//! Both follow the same discipline: check existence by video id, append
//! only what is new, and continue the sequence numbering from the store's
//! current maximum. An episode that is already present is never re-inserted
//! or re-numbered.

pub mod airtable;
pub mod json_file;

use crate::error::SyncError;
use crate::models::Episode;

/// Outcome of a sync pass against a store.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Episodes newly appended this run.
    pub created: usize,
    /// Episodes skipped because their video id was already present.
    pub skipped: usize,
}

/// A persistent episode store.
pub trait EpisodeStore {
    /// Append the candidates that are not yet present, assigning sequence
    /// numbers contiguous with the store's existing maximum.
    ///
    /// Candidates must be offered in feed order; numbering follows that
    /// order.
    async fn sync(&mut self, candidates: Vec<Episode>) -> Result<SyncReport, SyncError>;
}
