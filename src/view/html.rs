use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};

use super::{NoteCard, NotesView, Renderer};

/// Writes the note list as HTML markup. Every piece of user text is escaped
/// before it is spliced into the document.
pub struct HtmlRenderer<W: Write> {
    out: W,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for HtmlRenderer<W> {
    fn render(&mut self, view: &NotesView) -> Result<()> {
        let markup = render_markup(view);
        self.out
            .write_all(markup.as_bytes())
            .context("writing html view")?;
        self.out.flush().context("flushing html view")
    }
}

pub fn render_markup(view: &NotesView) -> String {
    match view {
        NotesView::Empty { reason } => {
            format!("<p class=\"empty-state\">{}</p>\n", escape_html(reason.message()))
        }
        NotesView::List(cards) => {
            let mut out = String::from("<ul class=\"notes\">\n");
            for card in cards {
                push_card(&mut out, card);
            }
            out.push_str("</ul>\n");
            out
        }
    }
}

fn push_card(out: &mut String, card: &NoteCard) {
    let id = escape_attr(card.id.as_str());
    let title_attr = escape_attr(&card.title);
    let _ = writeln!(out, "  <li class=\"note\" data-id=\"{id}\">");
    let _ = writeln!(out, "    <div class=\"note-head\">");
    let _ = writeln!(
        out,
        "      <h3 class=\"note-title\">{}</h3>",
        escape_html(&card.title)
    );
    let _ = writeln!(
        out,
        "      <time class=\"note-time\" datetime=\"{}\">{}</time>",
        escape_attr(&card.updated_at),
        escape_html(&card.updated_label)
    );
    let _ = writeln!(out, "    </div>");
    let _ = writeln!(out, "    <p class=\"note-body\">{}</p>", escape_html(&card.body));
    let _ = writeln!(out, "    <div class=\"note-actions\">");
    let _ = writeln!(
        out,
        "      <button class=\"edit-btn\" data-id=\"{id}\" aria-label=\"Edit note {title_attr}\">Edit</button>"
    );
    let _ = writeln!(
        out,
        "      <button class=\"delete-btn\" data-id=\"{id}\" aria-label=\"Delete note {title_attr}\">Delete</button>"
    );
    let _ = writeln!(out, "    </div>");
    let _ = writeln!(out, "  </li>");
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Attribute flavour of [`escape_html`]; newlines collapse to spaces.
pub fn escape_attr(input: &str) -> String {
    escape_html(input).replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoteId;
    use crate::view::EmptyReason;

    fn card(title: &str, body: &str) -> NoteCard {
        NoteCard {
            id: NoteId::from("n-1"),
            title: title.to_string(),
            body: body.to_string(),
            updated_at: "2024-03-01T09:30:00Z".to_string(),
            updated_label: "2024-03-01 09:30:00".to_string(),
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_attr("two\nlines"), "two lines");
    }

    #[test]
    fn empty_view_renders_empty_state() {
        let markup = render_markup(&NotesView::Empty {
            reason: EmptyReason::NoMatches,
        });
        assert_eq!(
            markup,
            "<p class=\"empty-state\">No notes match your search.</p>\n"
        );
    }

    #[test]
    fn card_markup_is_keyed_by_id_and_escaped() {
        let view = NotesView::List(vec![card("<script>alert(1)</script>", "a\nb & c")]);
        let markup = render_markup(&view);
        assert!(markup.starts_with("<ul class=\"notes\">\n"));
        assert!(markup.contains("<li class=\"note\" data-id=\"n-1\">"));
        assert!(markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("<p class=\"note-body\">a\nb &amp; c</p>"));
        assert!(markup.contains("datetime=\"2024-03-01T09:30:00Z\">2024-03-01 09:30:00</time>"));
        assert!(markup.contains("class=\"edit-btn\" data-id=\"n-1\""));
        assert!(markup.contains("class=\"delete-btn\" data-id=\"n-1\""));
    }

    #[test]
    fn renderer_writes_to_sink() -> anyhow::Result<()> {
        let mut renderer = HtmlRenderer::new(Vec::new());
        renderer.render(&NotesView::List(vec![card("Groceries", "Milk, eggs")]))?;
        let written = String::from_utf8(renderer.into_inner())?;
        assert_eq!(written.matches("<li class=\"note\"").count(), 1);
        assert!(written.contains("aria-label=\"Delete note Groceries\""));
        Ok(())
    }
}
