//! # Affinity Store
//!
//! Persists each contact's [`Affinity`] rating.
//!
//! ## Document layout
//!
//! ```json
//! { "<contact id>": { "affinity": "best" } }
//! ```
//!
//! Entries with an unrecognized raw value are skipped on load, so those
//! contacts fall back to [`Affinity::Undefined`].

use crate::document;
use crate::error::StoreError;
use rapport_core::affinity::affinity_of;
use rapport_core::{Affinity, AffinityMap, ContactId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AffinityRecord {
    affinity: String,
}

type AffinityDocument = BTreeMap<String, AffinityRecord>;

/// File-backed affinity ratings keyed by contact id.
#[derive(Debug, Clone)]
pub struct AffinityStore {
    path: Option<PathBuf>,
    ratings: AffinityMap,
}

impl AffinityStore {
    /// Open the store at `path`. A missing or corrupt file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc: AffinityDocument = document::load_or_default(&path);

        let mut ratings = AffinityMap::new();
        for (id, record) in doc {
            match record.affinity.parse::<Affinity>() {
                Ok(affinity) => {
                    ratings.insert(ContactId::new(id), affinity);
                }
                Err(e) => warn!(contact_id = %id, error = %e, "Skipping unknown affinity"),
            }
        }
        debug!(path = %path.display(), ratings = ratings.len(), "Opened affinity store");

        Self {
            path: Some(path),
            ratings,
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            ratings: AffinityMap::new(),
        }
    }

    /// Rating for `id`, defaulting to [`Affinity::Undefined`].
    pub fn get(&self, id: &ContactId) -> Affinity {
        affinity_of(&self.ratings, id)
    }

    /// Record a rating and persist the whole document. On a write failure
    /// the store is left as it was.
    pub fn set(&mut self, id: ContactId, affinity: Affinity) -> Result<(), StoreError> {
        let mut next = self.ratings.clone();
        next.insert(id, affinity);
        self.commit(next)
    }

    /// Forget a contact's rating and persist. On a write failure the rating
    /// is kept.
    pub fn remove(&mut self, id: &ContactId) -> Result<bool, StoreError> {
        if !self.ratings.contains_key(id) {
            return Ok(false);
        }
        let mut next = self.ratings.clone();
        next.remove(id);
        self.commit(next)?;
        Ok(true)
    }

    /// Copy of all ratings.
    pub fn snapshot(&self) -> AffinityMap {
        self.ratings.clone()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write `next` and adopt it only once it is on disk.
    fn commit(&mut self, next: AffinityMap) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            write_ratings(path, &next)?;
        }
        self.ratings = next;
        Ok(())
    }
}

fn write_ratings(path: &Path, ratings: &AffinityMap) -> Result<(), StoreError> {
    let doc: AffinityDocument = ratings
        .iter()
        .map(|(id, affinity)| {
            (
                id.to_string(),
                AffinityRecord {
                    affinity: affinity.raw_value().to_string(),
                },
            )
        })
        .collect();
    document::write_atomic(path, &doc)
}
