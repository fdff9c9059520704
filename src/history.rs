//! Game history
//!
//! Every saved result, in insertion order, persisted as one JSON list under
//! `gameHistory`. Each mutation rewrites the whole list.

use serde::{Deserialize, Serialize};

use crate::consts::{HISTORY_BACKUP_STORAGE_KEY, HISTORY_STORAGE_KEY};
use crate::error::HistoryError;
use crate::platform::Storage;

/// Session-stable handle for an entry
///
/// Assigned on load/add and never persisted; survives deletions of other
/// entries, unlike a list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single saved game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(skip, default = "unassigned_id")]
    pub id: EntryId,
    /// Player initials (uppercase)
    pub initials: String,
    pub score: u32,
    /// Locale date string at save time
    pub date: String,
    /// Locale time string at save time
    pub time: String,
}

fn unassigned_id() -> EntryId {
    EntryId(0)
}

impl HistoryEntry {
    pub fn new(
        initials: impl Into<String>,
        score: u32,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            id: unassigned_id(),
            initials: initials.into(),
            score,
            date: date.into(),
            time: time.into(),
        }
    }

    /// One-line summary, as shown in the history list and delete prompt
    pub fn summary(&self) -> String {
        format!(
            "{}: Score - {} - {} {}",
            self.initials, self.score, self.date, self.time
        )
    }
}

/// Trim and uppercase initials, rejecting empty input
pub fn normalize_initials(raw: &str) -> Result<String, HistoryError> {
    let initials = raw.trim().to_uppercase();
    if initials.is_empty() {
        return Err(HistoryError::Validation("initials must not be empty"));
    }
    Ok(initials)
}

/// Lenient parse of the minimum-score field: leading digits, else 0
pub fn parse_min_score(text: &str) -> u32 {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Lazy filtered view over the history
///
/// Cloning restarts the iteration from the beginning.
#[derive(Debug, Clone)]
pub struct HistoryFilter<'a> {
    entries: std::slice::Iter<'a, HistoryEntry>,
    min_score: u32,
    /// Uppercased prefix, empty matches everything
    prefix: String,
}

impl<'a> Iterator for HistoryFilter<'a> {
    type Item = &'a HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let min_score = self.min_score;
        let prefix = &self.prefix;
        self.entries.by_ref().find(|e| {
            e.score >= min_score && (prefix.is_empty() || e.initials.to_uppercase().starts_with(prefix))
        })
    }
}

/// What the history list should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryListing<'a> {
    /// Nothing saved yet
    Empty,
    /// History exists but the filter excludes all of it
    NoMatches,
    Entries(Vec<&'a HistoryEntry>),
}

/// Persisted history of finished games
#[derive(Debug)]
pub struct HistoryStore<S: Storage> {
    entries: Vec<HistoryEntry>,
    storage: S,
    next_id: u64,
}

impl<S: Storage> HistoryStore<S> {
    /// Load the history from storage
    ///
    /// Missing or corrupt data starts an empty history. Corrupt data is copied
    /// to the backup key first so the next save cannot destroy it.
    pub fn load(mut storage: S) -> Self {
        let entries = match storage.get_item(HISTORY_STORAGE_KEY) {
            Some(json) => match serde_json::from_str::<Vec<HistoryEntry>>(&json) {
                Ok(entries) => {
                    log::info!("Loaded {} history entries", entries.len());
                    entries
                }
                Err(e) => {
                    log::warn!("Discarding unreadable game history: {}", e);
                    match storage.set_item(HISTORY_BACKUP_STORAGE_KEY, &json) {
                        Ok(()) => log::warn!(
                            "Unreadable history kept under {}",
                            HISTORY_BACKUP_STORAGE_KEY
                        ),
                        Err(e) => log::warn!("Could not back up unreadable history: {}", e),
                    }
                    Vec::new()
                }
            },
            None => {
                log::info!("No game history found, starting fresh");
                Vec::new()
            }
        };

        let mut store = Self {
            entries: Vec::with_capacity(entries.len()),
            storage,
            next_id: 1,
        };
        for mut entry in entries {
            entry.id = store.allocate_id();
            store.entries.push(entry);
        }
        store
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Write the full list back; failures are logged and the in-memory list kept
    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize game history: {}", e);
                return;
            }
        };
        match self.storage.set_item(HISTORY_STORAGE_KEY, &json) {
            Ok(()) => log::debug!("Game history saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Game history not persisted: {}", e),
        }
    }

    /// Append an entry and persist
    pub fn add(&mut self, mut entry: HistoryEntry) -> Result<EntryId, HistoryError> {
        entry.initials = normalize_initials(&entry.initials)?;
        entry.id = self.allocate_id();
        let id = entry.id;
        log::info!("Saving score {} for {}", entry.score, entry.initials);
        self.entries.push(entry);
        self.persist();
        Ok(id)
    }

    /// Entries with `score >= min_score` whose initials start with `prefix`
    /// (case-insensitive, empty prefix matches all)
    pub fn filter(&self, min_score: u32, prefix: &str) -> HistoryFilter<'_> {
        HistoryFilter {
            entries: self.entries.iter(),
            min_score,
            prefix: prefix.trim().to_uppercase(),
        }
    }

    /// Filtered view plus the empty/no-match distinction for display
    pub fn listing(&self, min_score: u32, prefix: &str) -> HistoryListing<'_> {
        if self.entries.is_empty() {
            return HistoryListing::Empty;
        }
        let matches: Vec<_> = self.filter(min_score, prefix).collect();
        if matches.is_empty() {
            HistoryListing::NoMatches
        } else {
            HistoryListing::Entries(matches)
        }
    }

    /// Replace the initials of the entry at `index` (unfiltered position)
    pub fn edit(&mut self, index: usize, new_initials: &str) -> Result<(), HistoryError> {
        let initials = normalize_initials(new_initials)?;
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(HistoryError::IndexNotFound { index, len })?;
        log::info!("Renaming entry {} from {} to {}", entry.id, entry.initials, initials);
        entry.initials = initials;
        self.persist();
        Ok(())
    }

    /// Remove the entry at `index` (unfiltered position)
    pub fn delete(&mut self, index: usize) -> Result<HistoryEntry, HistoryError> {
        let len = self.entries.len();
        if index >= len {
            return Err(HistoryError::IndexNotFound { index, len });
        }
        let removed = self.entries.remove(index);
        log::info!("Deleted history entry {}", removed.summary());
        self.persist();
        Ok(removed)
    }

    pub fn edit_by_id(&mut self, id: EntryId, new_initials: &str) -> Result<(), HistoryError> {
        let index = self.position(id).ok_or(HistoryError::IdNotFound(id))?;
        self.edit(index, new_initials)
    }

    pub fn delete_by_id(&mut self, id: EntryId) -> Result<HistoryEntry, HistoryError> {
        let index = self.position(id).ok_or(HistoryError::IdNotFound(id))?;
        self.delete(index)
    }

    /// Current unfiltered position of an entry
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, id: EntryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest saved score (if any)
    pub fn best_score(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.score).max()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
