use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::search::TitleFilter;
use crate::validation::{validate, Limits, ValidationError};

mod clock;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub(crate) use clock::ManualClock;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Owned, ordered note collection plus the transient title filter.
///
/// Notes are kept newest-first by creation; edits never reorder. Every
/// accepted mutation or filter change bumps [`NoteStore::revision`] so that
/// views know to redraw from scratch.
pub struct NoteStore {
    notes: IndexMap<NoteId, Note>,
    filter: TitleFilter,
    limits: Limits,
    clock: Box<dyn Clock>,
    revision: u64,
}

impl fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteStore")
            .field("notes", &self.notes.len())
            .field("filter", &self.filter)
            .field("limits", &self.limits)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl NoteStore {
    pub fn new(limits: Limits) -> Self {
        Self::with_clock(limits, Box::new(SystemClock))
    }

    pub fn with_clock(limits: Limits, clock: Box<dyn Clock>) -> Self {
        Self {
            notes: IndexMap::new(),
            filter: TitleFilter::default(),
            limits,
            clock,
            revision: 0,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn filter(&self) -> &TitleFilter {
        &self.filter
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.get_index_of(id)
    }

    /// Notes in collection order (newest created first).
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn create(&mut self, title: &str, body: &str) -> Result<NoteId, ValidationError> {
        validate(title, body, &self.limits)?;
        let now = self.clock.now();
        let id = NoteId::generate();
        let note = Note {
            id: id.clone(),
            title: title.trim().to_string(),
            body: body.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.notes.shift_insert(0, id.clone(), note);
        self.touch();
        tracing::debug!(%id, total = self.notes.len(), "note created");
        Ok(id)
    }

    /// Replaces title and body in place. Returns `Ok(false)` when no note has
    /// the given id.
    pub fn update(&mut self, id: &NoteId, title: &str, body: &str) -> Result<bool, ValidationError> {
        validate(title, body, &self.limits)?;
        let now = self.clock.now();
        let Some(note) = self.notes.get_mut(id) else {
            tracing::debug!(%id, "update skipped, note not found");
            return Ok(false);
        };
        note.title = title.trim().to_string();
        note.body = body.trim().to_string();
        note.updated_at = now.max(note.updated_at);
        self.touch();
        tracing::debug!(%id, "note updated");
        Ok(true)
    }

    pub fn delete(&mut self, id: &NoteId) -> bool {
        if self.notes.shift_remove(id).is_none() {
            tracing::debug!(%id, "delete skipped, note not found");
            return false;
        }
        self.touch();
        tracing::debug!(%id, total = self.notes.len(), "note deleted");
        true
    }

    pub fn search(&mut self, query: &str) {
        self.filter = TitleFilter::new(query);
        self.touch();
        tracing::trace!(filter = self.filter.as_str(), "filter changed");
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
