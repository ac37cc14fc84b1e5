use unicode_segmentation::UnicodeSegmentation;

use crate::app::actions::{ActionDispatcher, ActionOutcome};
use crate::store::{NoteId, NoteStore};
use crate::view::{project, NoteCard, NotesView, ViewOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Title,
    Body,
    Search,
    List,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Title => FocusPane::Body,
            FocusPane::Body => FocusPane::Search,
            FocusPane::Search => FocusPane::List,
            FocusPane::List => FocusPane::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FocusPane::Title => FocusPane::List,
            FocusPane::Body => FocusPane::Title,
            FocusPane::Search => FocusPane::Body,
            FocusPane::List => FocusPane::Search,
        }
    }
}

/// Single-line or multi-line text buffer with a character cap.
#[derive(Debug, Clone)]
pub struct TextInput {
    value: String,
    max_chars: usize,
}

impl TextInput {
    pub fn new(max_chars: usize) -> Self {
        Self {
            value: String::new(),
            max_chars,
        }
    }

    pub fn with_value(value: &str, max_chars: usize) -> Self {
        let mut input = Self::new(max_chars);
        input.set(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.chars().take(self.max_chars).collect();
    }

    pub fn push(&mut self, ch: char) -> bool {
        if self.value.chars().count() >= self.max_chars {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub fn pop(&mut self) -> bool {
        match self.value.grapheme_indices(true).next_back() {
            Some((idx, _)) => {
                self.value.truncate(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}

#[derive(Debug, Clone)]
pub struct CreateForm {
    pub title: TextInput,
    pub body: TextInput,
}

impl CreateForm {
    fn new(title_max: usize, body_max: usize) -> Self {
        Self {
            title: TextInput::new(title_max),
            body: TextInput::new(body_max),
        }
    }

    fn reset(&mut self) {
        self.title.clear();
        self.body.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Body,
}

/// Result of closing the edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Submitted { title: String, body: String },
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct EditDialog {
    pub note_id: NoteId,
    pub title: TextInput,
    pub body: TextInput,
    pub field: EditField,
}

impl EditDialog {
    pub fn active_input_mut(&mut self) -> &mut TextInput {
        match self.field {
            EditField::Title => &mut self.title,
            EditField::Body => &mut self.body,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            EditField::Title => EditField::Body,
            EditField::Body => EditField::Title,
        };
    }

    pub fn submit(&self) -> EditOutcome {
        EditOutcome::Submitted {
            title: self.title.value().to_string(),
            body: self.body.value().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeleteConfirm {
    pub note_id: NoteId,
    pub title: String,
}

#[derive(Debug, Clone)]
pub enum OverlayState {
    Edit(EditDialog),
    ConfirmDelete(DeleteConfirm),
}

#[derive(Debug)]
pub struct AppState {
    store: NoteStore,
    view_options: ViewOptions,
    view: NotesView,
    rendered_revision: u64,
    pub focus: FocusPane,
    pub form: CreateForm,
    pub search: TextInput,
    pub selected: usize,
    pub status_message: Option<String>,
    pub overlay: Option<OverlayState>,
    pub highlight_matches: bool,
}

impl AppState {
    pub fn new(store: NoteStore, view_options: ViewOptions, highlight_matches: bool) -> Self {
        let limits = *store.limits();
        let view = project(&store, &view_options);
        let rendered_revision = store.revision();
        Self {
            store,
            view_options,
            view,
            rendered_revision,
            focus: FocusPane::Title,
            form: CreateForm::new(limits.title_max, limits.body_max),
            search: TextInput::new(limits.title_max),
            selected: 0,
            status_message: None,
            overlay: None,
            highlight_matches,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn view(&self) -> &NotesView {
        &self.view
    }

    pub fn rendered_revision(&self) -> u64 {
        self.rendered_revision
    }

    /// Recomputes the visible list from the whole store and clamps the
    /// selection.
    pub fn refresh_view(&mut self) {
        self.view = project(&self.store, &self.view_options);
        self.rendered_revision = self.store.revision();
        self.normalize_selection();
    }

    pub fn selected_card(&self) -> Option<&NoteCard> {
        self.view.cards().get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.view.len();
        if len == 0 {
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn normalize_selection(&mut self) {
        let len = self.view.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn select_note(&mut self, id: &NoteId) {
        if let Some(idx) = self.view.cards().iter().position(|card| &card.id == id) {
            self.selected = idx;
        }
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    fn apply_outcome(&mut self, outcome: &ActionOutcome) {
        if let Some(message) = outcome.status_message() {
            self.set_status_message(Some(message));
        }
        self.refresh_view();
    }

    pub fn submit_create_form(&mut self) -> ActionOutcome {
        let title = self.form.title.value().to_string();
        let body = self.form.body.value().to_string();
        let outcome = ActionDispatcher::new(&mut self.store).create(&title, &body);
        match &outcome {
            ActionOutcome::Created(id) => {
                tracing::info!(%id, "note added");
                self.form.reset();
                self.focus = FocusPane::Title;
                self.apply_outcome(&outcome);
                let id = id.clone();
                self.select_note(&id);
            }
            ActionOutcome::Rejected(err) => {
                tracing::debug!(%err, "create rejected");
                self.set_status_message(Some(err.to_string()));
            }
            _ => {}
        }
        outcome
    }

    pub fn clear_form(&mut self) {
        self.form.reset();
        self.clear_status_message();
        self.focus = FocusPane::Title;
    }

    pub fn push_search_char(&mut self, ch: char) {
        if self.search.push(ch) {
            self.apply_search();
        }
    }

    pub fn pop_search_char(&mut self) {
        if self.search.pop() {
            self.apply_search();
        }
    }

    pub fn clear_search(&mut self) {
        if self.search.is_empty() && self.store.filter().is_empty() {
            return;
        }
        self.search.clear();
        self.apply_search();
    }

    fn apply_search(&mut self) {
        let query = self.search.value().to_string();
        let outcome = ActionDispatcher::new(&mut self.store).search(&query);
        self.selected = 0;
        self.apply_outcome(&outcome);
    }

    pub fn open_edit_dialog(&mut self) -> bool {
        let Some(card) = self.selected_card() else {
            return false;
        };
        let limits = self.store.limits();
        let dialog = EditDialog {
            note_id: card.id.clone(),
            title: TextInput::with_value(&card.title, limits.title_max),
            body: TextInput::with_value(&card.body, limits.body_max),
            field: EditField::Title,
        };
        self.overlay = Some(OverlayState::Edit(dialog));
        true
    }

    pub fn edit_dialog_mut(&mut self) -> Option<&mut EditDialog> {
        match self.overlay.as_mut() {
            Some(OverlayState::Edit(dialog)) => Some(dialog),
            _ => None,
        }
    }

    /// Closes the edit dialog and applies its outcome. A cancelled dialog
    /// leaves the note untouched.
    pub fn finish_edit(&mut self, outcome: EditOutcome) -> Option<ActionOutcome> {
        let note_id = match self.overlay.as_ref() {
            Some(OverlayState::Edit(dialog)) => dialog.note_id.clone(),
            _ => return None,
        };
        let (title, body) = match outcome {
            EditOutcome::Cancelled => {
                self.overlay = None;
                self.clear_status_message();
                return None;
            }
            EditOutcome::Submitted { title, body } => (title, body),
        };
        let result = ActionDispatcher::new(&mut self.store).update(&note_id, &title, &body);
        match &result {
            ActionOutcome::Rejected(err) => {
                // keep the dialog open so the draft is not lost
                tracing::debug!(%err, id = %note_id, "edit rejected");
                self.set_status_message(Some(err.to_string()));
            }
            _ => {
                self.overlay = None;
                self.apply_outcome(&result);
            }
        }
        Some(result)
    }

    pub fn open_delete_confirm(&mut self) -> bool {
        let Some(card) = self.selected_card() else {
            return false;
        };
        self.overlay = Some(OverlayState::ConfirmDelete(DeleteConfirm {
            note_id: card.id.clone(),
            title: card.title.clone(),
        }));
        true
    }

    pub fn resolve_delete(&mut self, accept: bool) -> Option<ActionOutcome> {
        let note_id = match self.overlay.take() {
            Some(OverlayState::ConfirmDelete(confirm)) => confirm.note_id,
            other => {
                self.overlay = other;
                return None;
            }
        };
        if !accept {
            self.clear_status_message();
            return None;
        }
        let outcome = ActionDispatcher::new(&mut self.store).delete(&note_id);
        self.apply_outcome(&outcome);
        Some(outcome)
    }
}
