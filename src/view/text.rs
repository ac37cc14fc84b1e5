use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};

use super::{NotesView, Renderer};

pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &NotesView) -> Result<()> {
        let text = render_text(view);
        self.out
            .write_all(text.as_bytes())
            .context("writing text view")?;
        self.out.flush().context("flushing text view")
    }
}

pub fn render_text(view: &NotesView) -> String {
    let cards = match view {
        NotesView::Empty { reason } => return format!("{}\n", reason.message()),
        NotesView::List(cards) => cards,
    };
    let mut out = String::new();
    for (index, card) in cards.iter().enumerate() {
        let _ = writeln!(&mut out, "#{}  {}", index + 1, card.title);
        let _ = writeln!(&mut out, "    updated {}", card.updated_label);
        let _ = writeln!(&mut out, "    id      {}", card.id);
        for line in card.body.lines() {
            let _ = writeln!(&mut out, "    {}", line.trim_end());
        }
        out.push('\n');
    }
    out
}
