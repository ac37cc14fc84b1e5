use serde::{Deserialize, Serialize};

use crate::store::{NoteId, NoteStore};
use crate::validation::ValidationError;

/// A single user intent against the note store.
///
/// Note references are either a literal note id or `#N`, the N-th note of the
/// currently visible (filtered) list, counting from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum NoteAction {
    Create { title: String, body: String },
    Update { id: String, title: String, body: String },
    Delete { id: String },
    Search { query: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Created(NoteId),
    Updated(NoteId),
    Deleted(NoteId),
    Filtered,
    /// The referenced note does not exist; nothing changed.
    Missing,
    Rejected(ValidationError),
}

impl ActionOutcome {
    pub fn status_message(&self) -> Option<String> {
        match self {
            ActionOutcome::Created(_) => Some("Note added.".to_string()),
            ActionOutcome::Updated(_) => Some("Note updated.".to_string()),
            ActionOutcome::Deleted(_) => Some("Note deleted.".to_string()),
            ActionOutcome::Filtered | ActionOutcome::Missing => None,
            ActionOutcome::Rejected(err) => Some(err.to_string()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected(_))
    }
}

pub struct ActionDispatcher<'a> {
    store: &'a mut NoteStore,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(store: &'a mut NoteStore) -> Self {
        Self { store }
    }

    pub fn dispatch(&mut self, action: NoteAction) -> ActionOutcome {
        match action {
            NoteAction::Create { title, body } => self.create(&title, &body),
            NoteAction::Update { id, title, body } => match self.resolve(&id) {
                Some(id) => self.update(&id, &title, &body),
                None => ActionOutcome::Missing,
            },
            NoteAction::Delete { id } => match self.resolve(&id) {
                Some(id) => self.delete(&id),
                None => ActionOutcome::Missing,
            },
            NoteAction::Search { query } => self.search(&query),
        }
    }

    pub fn create(&mut self, title: &str, body: &str) -> ActionOutcome {
        match self.store.create(title, body) {
            Ok(id) => ActionOutcome::Created(id),
            Err(err) => ActionOutcome::Rejected(err),
        }
    }

    pub fn update(&mut self, id: &NoteId, title: &str, body: &str) -> ActionOutcome {
        match self.store.update(id, title, body) {
            Ok(true) => ActionOutcome::Updated(id.clone()),
            Ok(false) => ActionOutcome::Missing,
            Err(err) => ActionOutcome::Rejected(err),
        }
    }

    pub fn delete(&mut self, id: &NoteId) -> ActionOutcome {
        if self.store.delete(id) {
            ActionOutcome::Deleted(id.clone())
        } else {
            ActionOutcome::Missing
        }
    }

    pub fn search(&mut self, query: &str) -> ActionOutcome {
        self.store.search(query);
        ActionOutcome::Filtered
    }

    fn resolve(&self, reference: &str) -> Option<NoteId> {
        let reference = reference.trim();
        let Some(position) = reference.strip_prefix('#') else {
            return Some(NoteId::from(reference));
        };
        let index = position.parse::<usize>().ok()?.checked_sub(1)?;
        let filter = self.store.filter();
        self.store
            .iter()
            .filter(|note| filter.matches(&note.title))
            .nth(index)
            .map(|note| note.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ManualClock;
    use crate::validation::Limits;
    use assert_matches::assert_matches;

    fn store() -> NoteStore {
        NoteStore::with_clock(Limits::default(), Box::new(ManualClock::default()))
    }

    #[test]
    fn actions_parse_from_json() -> anyhow::Result<()> {
        let action: NoteAction =
            serde_json::from_str(r#"{"action":"create","title":"T","body":"B"}"#)?;
        assert_eq!(
            action,
            NoteAction::Create {
                title: "T".into(),
                body: "B".into()
            }
        );
        let action: NoteAction = serde_json::from_str(r##"{"action":"delete","id":"#2"}"##)?;
        assert_eq!(action, NoteAction::Delete { id: "#2".into() });
        Ok(())
    }

    #[test]
    fn create_reports_status_or_validation_error() {
        let mut store = store();
        let mut dispatcher = ActionDispatcher::new(&mut store);
        let outcome = dispatcher.create("Groceries", "Milk, eggs");
        assert_matches!(outcome, ActionOutcome::Created(_));
        assert_eq!(outcome.status_message().as_deref(), Some("Note added."));

        let outcome = dispatcher.create("Groceries", "   ");
        assert!(outcome.is_rejected());
        assert_eq!(outcome.status_message().as_deref(), Some("Body is required."));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn positional_references_follow_the_visible_list() -> anyhow::Result<()> {
        let mut store = store();
        store.create("Groceries", "Milk")?;
        let work = store.create("Work", "Standup")?;
        store.create("Garden", "Tomatoes")?;
        store.search("w");

        let mut dispatcher = ActionDispatcher::new(&mut store);
        let outcome = dispatcher.dispatch(NoteAction::Delete { id: "#1".into() });
        assert_eq!(outcome, ActionOutcome::Deleted(work));
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[test]
    fn unknown_references_are_missing() -> anyhow::Result<()> {
        let mut store = store();
        store.create("Only", "note")?;
        let mut dispatcher = ActionDispatcher::new(&mut store);
        for id in ["#0", "#9", "#x", "no-such-id"] {
            let outcome = dispatcher.dispatch(NoteAction::Update {
                id: id.into(),
                title: "New".into(),
                body: "Body".into(),
            });
            assert_eq!(outcome, ActionOutcome::Missing, "reference {id}");
            assert_eq!(outcome.status_message(), None);
        }
        assert_eq!(store.iter().next().map(|n| n.title.as_str()), Some("Only"));
        Ok(())
    }

    #[test]
    fn update_by_literal_id() -> anyhow::Result<()> {
        let mut store = store();
        let id = store.create("Draft", "v1")?;
        let mut dispatcher = ActionDispatcher::new(&mut store);
        let outcome = dispatcher.dispatch(NoteAction::Update {
            id: id.to_string(),
            title: "Final".into(),
            body: "v2".into(),
        });
        assert_eq!(outcome, ActionOutcome::Updated(id.clone()));
        assert_eq!(outcome.status_message().as_deref(), Some("Note updated."));
        assert_eq!(store.get(&id).map(|n| n.title.as_str()), Some("Final"));
        Ok(())
    }
}
