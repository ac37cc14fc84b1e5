use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;

use crate::app::state::{AppState, EditDialog, EditField, FocusPane, OverlayState, TextInput};
use crate::highlight::{build_highlight_regex, segments};
use crate::view::NotesView;

const BODY_PREVIEW_LINES: usize = 3;

pub fn draw_app(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(vertical[0]);

    draw_form(frame, state, columns[0]);
    draw_notes(frame, state, list_state, columns[1]);

    let status = build_status_line(state);
    let status_paragraph = Paragraph::new(status).style(Style::default().fg(Color::Gray));
    frame.render_widget(status_paragraph, vertical[1]);

    render_overlay(frame, state);
}

fn pane_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn input_text(input: &TextInput, active: bool) -> String {
    let mut display = input.value().to_string();
    if active {
        display.push('▌');
    }
    display
}

fn draw_form(frame: &mut Frame, state: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let title_active = state.focus == FocusPane::Title && state.overlay.is_none();
    let title = Paragraph::new(input_text(&state.form.title, title_active)).block(
        Block::default()
            .title("New note: title")
            .borders(Borders::ALL)
            .border_style(pane_style(title_active)),
    );
    frame.render_widget(title, rows[0]);

    let body_active = state.focus == FocusPane::Body && state.overlay.is_none();
    let body = Paragraph::new(input_text(&state.form.body, body_active))
        .block(
            Block::default()
                .title("Body (Enter add • Alt+Enter newline • Ctrl-l clear)")
                .borders(Borders::ALL)
                .border_style(pane_style(body_active)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, rows[1]);
}

fn draw_notes(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let search_active = state.focus == FocusPane::Search && state.overlay.is_none();
    let search = Paragraph::new(input_text(&state.search, search_active)).block(
        Block::default()
            .title("Search titles")
            .borders(Borders::ALL)
            .border_style(pane_style(search_active)),
    );
    frame.render_widget(search, rows[0]);

    let list_active = state.focus == FocusPane::List && state.overlay.is_none();
    let block = Block::default()
        .title(format!("Notes ({})", state.view().len()))
        .borders(Borders::ALL)
        .border_style(pane_style(list_active));

    let cards = match state.view() {
        NotesView::Empty { reason } => {
            let empty = Paragraph::new(Span::styled(
                reason.message(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
            .block(block);
            frame.render_widget(empty, rows[1]);
            return;
        }
        NotesView::List(cards) => cards,
    };

    let highlight_regex = if state.highlight_matches {
        build_highlight_regex(state.store().filter())
    } else {
        None
    };
    let match_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let mut lines = Vec::with_capacity(2 + BODY_PREVIEW_LINES);
            lines.push(Line::from(highlight_line(
                &card.title,
                highlight_regex.as_ref(),
                match_style,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Updated {}", card.updated_label),
                Style::default().fg(Color::Gray),
            )));
            let mut body_lines = card.body.lines();
            for line in body_lines.by_ref().take(BODY_PREVIEW_LINES) {
                lines.push(Line::from(line.to_string()));
            }
            if body_lines.next().is_some() {
                lines.push(Line::from(Span::styled(
                    "…",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, rows[1], list_state);
}

fn highlight_line(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    segments(text, regex)
        .into_iter()
        .map(|(matched, segment)| {
            let style = if matched { highlight_style } else { base_style };
            Span::styled(segment.to_string(), style)
        })
        .collect()
}

fn build_status_line(state: &AppState) -> Text<'static> {
    let focus = match state.focus {
        FocusPane::Title => "Title",
        FocusPane::Body => "Body",
        FocusPane::Search => "Search",
        FocusPane::List => "List",
    };
    let mut spans = vec![
        Span::raw(format!("Total: {} ", state.store().len())),
        Span::raw(" | Focus: "),
        Span::styled(focus, Style::default().add_modifier(Modifier::BOLD)),
    ];
    let filter = state.store().filter();
    if !filter.is_empty() {
        spans.push(Span::raw(" | Filter: "));
        spans.push(Span::styled(
            filter.as_str().to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(message) = &state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let keys = Line::from(vec![
        Span::styled(
            "Keys: ",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Tab focus • / search • j/k move • e edit • d delete • a new • q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    Text::from(vec![Line::from(spans), keys])
}

fn render_overlay(frame: &mut Frame, state: &AppState) {
    match &state.overlay {
        Some(OverlayState::Edit(dialog)) => render_edit_dialog(frame, dialog),
        Some(OverlayState::ConfirmDelete(confirm)) => {
            let area = centered_rect(50, 25, frame.size());
            frame.render_widget(Clear, area);
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Delete this note?",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(confirm.title.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    "y/Enter delete • n/Esc keep",
                    Style::default().fg(Color::Gray),
                )),
            ])
            .block(
                Block::default()
                    .title("Confirm Delete")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            )
            .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        None => {}
    }
}

fn render_edit_dialog(frame: &mut Frame, dialog: &EditDialog) {
    let area = centered_rect(70, 60, frame.size());
    frame.render_widget(Clear, area);
    let outer = Block::default()
        .title("Edit Note")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let title_active = dialog.field == EditField::Title;
    let title = Paragraph::new(input_text(&dialog.title, title_active)).block(
        Block::default()
            .title("Title")
            .borders(Borders::ALL)
            .border_style(pane_style(title_active)),
    );
    frame.render_widget(title, rows[0]);

    let body_active = dialog.field == EditField::Body;
    let body = Paragraph::new(input_text(&dialog.body, body_active))
        .block(
            Block::default()
                .title("Body")
                .borders(Borders::ALL)
                .border_style(pane_style(body_active)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, rows[1]);

    let help = Paragraph::new(Span::styled(
        "Tab switch field • Alt+Enter newline • Enter save • Esc cancel",
        Style::default().fg(Color::Gray),
    ));
    frame.render_widget(help, rows[2]);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
