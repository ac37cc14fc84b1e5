//! Pure projection of the note store into render-ready records.
//!
//! Every draw starts from [`project`]: the visible subset is recomputed from
//! the whole collection and the current filter, never patched. Drawing is
//! left to a [`Renderer`] (markup, plain text) or to the terminal UI.

use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, OwnedFormatItem};
use time::OffsetDateTime;

use crate::store::{Note, NoteId, NoteStore};

pub mod html;
pub mod text;

pub use html::{escape_attr, escape_html, HtmlRenderer};
pub use text::TextRenderer;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";

pub trait Renderer {
    fn render(&mut self, view: &NotesView) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoNotes,
    NoMatches,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoNotes => "No notes yet.",
            EmptyReason::NoMatches => "No notes match your search.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    /// Machine-readable RFC 3339 timestamp.
    pub updated_at: String,
    pub updated_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesView {
    Empty { reason: EmptyReason },
    List(Vec<NoteCard>),
}

impl NotesView {
    pub fn is_empty(&self) -> bool {
        matches!(self, NotesView::Empty { .. })
    }

    pub fn cards(&self) -> &[NoteCard] {
        match self {
            NotesView::Empty { .. } => &[],
            NotesView::List(cards) => cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards().len()
    }
}

#[derive(Debug, Clone)]
pub struct TimestampFormat {
    items: OwnedFormatItem,
}

impl TimestampFormat {
    pub fn parse(description: &str) -> Result<Self> {
        let items = format_description::parse_owned::<1>(description)
            .with_context(|| format!("parsing timestamp format {description:?}"))?;
        Ok(Self { items })
    }

    pub fn format(&self, dt: OffsetDateTime) -> String {
        dt.format(&self.items)
            .unwrap_or_else(|_| dt.unix_timestamp().to_string())
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            items: format_description::parse_owned::<1>(DEFAULT_TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| OwnedFormatItem::Compound(Box::new([]))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub timestamp_format: TimestampFormat,
}

pub fn project(store: &NoteStore, options: &ViewOptions) -> NotesView {
    let filter = store.filter();
    let cards: Vec<NoteCard> = store
        .iter()
        .filter(|note| filter.matches(&note.title))
        .map(|note| note_card(note, options))
        .collect();
    if !cards.is_empty() {
        return NotesView::List(cards);
    }
    let reason = if store.is_empty() {
        EmptyReason::NoNotes
    } else {
        EmptyReason::NoMatches
    };
    NotesView::Empty { reason }
}

fn note_card(note: &Note, options: &ViewOptions) -> NoteCard {
    NoteCard {
        id: note.id.clone(),
        title: note.title.clone(),
        body: note.body.clone(),
        updated_at: format_rfc3339(note.updated_at),
        updated_label: options.timestamp_format.format(note.updated_at),
    }
}

pub fn format_rfc3339(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}
