use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::store::NoteStore;
use crate::ui;

pub mod actions;
pub mod state;

pub use actions::{ActionDispatcher, ActionOutcome, NoteAction};
pub use state::{AppState, EditField, EditOutcome, FocusPane, OverlayState, TextInput};

pub struct App {
    state: AppState,
    list_state: ListState,
    should_quit: bool,
    poll_interval: Duration,
    device_id: String,
}

impl App {
    pub fn new(config: &AppConfig, device_id: String) -> Self {
        let store = NoteStore::new(config.limits);
        let state = AppState::new(store, config.view_options(), config.ui.highlight_matches);
        Self {
            state,
            list_state: ListState::default(),
            should_quit: false,
            poll_interval: Duration::from_millis(250),
            device_id,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        tracing::info!(device_id = %self.device_id, "starting interactive session");
        loop {
            terminal
                .draw(|frame| {
                    if self.state.view().is_empty() {
                        self.list_state.select(None);
                    } else {
                        self.list_state.select(Some(self.state.selected));
                    }
                    ui::draw_app(frame, &self.state, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            if event::poll(self.poll_interval).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // next draw adapts to the new size
                    }
                    _ => {}
                }
            }
        }
        tracing::info!(notes = self.state.store().len(), "interactive session ended");
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.handle_overlay_key(key) {
            return;
        }
        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state.clear_form();
            return;
        }
        match key.code {
            KeyCode::Tab => {
                self.state.focus = self.state.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.state.focus = self.state.focus.previous();
                return;
            }
            _ => {}
        }

        match self.state.focus {
            FocusPane::Title => self.handle_title_key(key),
            FocusPane::Body => self.handle_body_key(key),
            FocusPane::Search => self.handle_search_key(key),
            FocusPane::List => self.handle_list_key(key),
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.state.submit_create_form();
            }
            KeyCode::Backspace => {
                self.state.form.title.pop();
            }
            KeyCode::Esc => self.state.focus = FocusPane::List,
            KeyCode::Char(ch) if is_plain(key) => {
                self.state.form.title.push(ch);
            }
            _ => {}
        }
    }

    fn handle_body_key(&mut self, key: KeyEvent) {
        if is_newline_chord(key) {
            self.state.form.body.push('\n');
            return;
        }
        match key.code {
            KeyCode::Enter => {
                self.state.submit_create_form();
            }
            KeyCode::Backspace => {
                self.state.form.body.pop();
            }
            KeyCode::Esc => self.state.focus = FocusPane::List,
            KeyCode::Char(ch) if is_plain(key) => {
                self.state.form.body.push(ch);
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.clear_search(),
            KeyCode::Enter | KeyCode::Down => self.state.focus = FocusPane::List,
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char(ch) if is_plain(key) => self.state.push_search_char(ch),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if !is_plain(key) {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection(-1),
            KeyCode::Char('e') | KeyCode::Enter => {
                if self.state.open_edit_dialog() {
                    self.state
                        .set_status_message(Some("Edit note: Tab switch field • Enter save • Esc cancel"));
                } else {
                    self.state.set_status_message(Some("No note selected"));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if !self.state.open_delete_confirm() {
                    self.state.set_status_message(Some("No note selected"));
                }
            }
            KeyCode::Char('/') => self.state.focus = FocusPane::Search,
            KeyCode::Char('a') | KeyCode::Char('n') => self.state.focus = FocusPane::Title,
            _ => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> bool {
        match self.state.overlay {
            Some(OverlayState::Edit(_)) => {
                self.handle_edit_key(key);
                true
            }
            Some(OverlayState::ConfirmDelete(_)) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                        self.state.resolve_delete(true);
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        self.state.resolve_delete(false);
                    }
                    _ => {}
                }
                true
            }
            None => false,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let newline = is_newline_chord(key);
        let Some(dialog) = self.state.edit_dialog_mut() else {
            return;
        };
        if newline {
            if dialog.field == EditField::Body {
                dialog.body.push('\n');
            }
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.state.finish_edit(EditOutcome::Cancelled);
            }
            KeyCode::Enter => {
                let outcome = dialog.submit();
                self.state.finish_edit(outcome);
            }
            KeyCode::Tab | KeyCode::BackTab => dialog.toggle_field(),
            KeyCode::Backspace => {
                dialog.active_input_mut().pop();
            }
            KeyCode::Char(ch) if is_plain(key) => {
                dialog.active_input_mut().push(ch);
            }
            _ => {}
        }
    }
}

fn is_plain(key: KeyEvent) -> bool {
    !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

fn is_newline_chord(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => key.modifiers.contains(KeyModifiers::ALT),
        KeyCode::Char('j') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("creating terminal backend")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::NotesView;

    fn app() -> App {
        App::new(&AppConfig::default(), "device".into())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    #[test]
    fn keyboard_flow_creates_searches_and_deletes() {
        let mut app = app();
        type_text(&mut app, "Groceries");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Milk, eggs");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        type_text(&mut app, "bread");
        press(&mut app, KeyCode::Enter);

        let cards = app.state().view().cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].body, "Milk, eggs\nbread");
        assert_eq!(app.state().focus, FocusPane::Title);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "xyz");
        assert!(matches!(app.state().view(), NotesView::Empty { .. }));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state().view().len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().focus, FocusPane::List);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.state().view().is_empty());
        assert!(!app.should_quit());
    }

    #[test]
    fn edit_dialog_escape_cancels() {
        let mut app = app();
        type_text(&mut app, "Title");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Body");
        press(&mut app, KeyCode::Enter);

        app.state.focus = FocusPane::List;
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " changed");
        press(&mut app, KeyCode::Esc);
        assert!(app.state().overlay.is_none());
        assert_eq!(app.state().view().cards()[0].title, "Title");

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " changed");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().view().cards()[0].title, "Title changed");
    }

    #[test]
    fn declined_delete_is_silent() {
        let mut app = app();
        type_text(&mut app, "Keep");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "me");
        press(&mut app, KeyCode::Enter);

        app.state.focus = FocusPane::List;
        press(&mut app, KeyCode::Char('d'));
        assert!(app.state().overlay.is_some());
        press(&mut app, KeyCode::Char('n'));
        assert!(app.state().overlay.is_none());
        assert!(app.state().status_message.is_none());
        assert_eq!(app.state().view().len(), 1);
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }
}
