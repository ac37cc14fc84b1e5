use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use crate::app::{ActionDispatcher, App, NoteAction};
use crate::config::AppConfig;
use crate::store::NoteStore;
use crate::view::{project, HtmlRenderer, Renderer, TextRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// JSON-lines action script. Reads stdin when omitted.
    #[arg()]
    pub file: Option<PathBuf>,
    /// How to print the final view
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run_tui(config: &AppConfig, device_id: String) -> Result<()> {
    let mut app = App::new(config, device_id);
    app.run()
}

pub fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<()> {
    let script = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading batch script {}", path.display()))?,
        None => match read_stdin()? {
            Some(script) => script,
            None => bail!("no batch script given: pass a file or pipe actions on stdin"),
        },
    };

    let mut store = NoteStore::new(config.limits);
    for line in apply_script(&mut store, &script)? {
        eprintln!("{line}");
    }

    let view = project(&store, &config.view_options());
    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Text => TextRenderer::new(stdout).render(&view),
        OutputFormat::Html => HtmlRenderer::new(stdout).render(&view),
    }
}

/// Runs every action of a JSON-lines script against `store`, in order.
///
/// Blank lines are skipped. Validation failures are collected as status lines
/// and do not stop the script; a line that is not a valid action does.
pub fn apply_script(store: &mut NoteStore, script: &str) -> Result<Vec<String>> {
    let mut status = Vec::new();
    for (index, raw) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let action: NoteAction = serde_json::from_str(line)
            .with_context(|| format!("parsing batch action on line {line_no}"))?;
        let outcome = ActionDispatcher::new(store).dispatch(action);
        if outcome.is_rejected() {
            tracing::warn!(line = line_no, ?outcome, "batch action rejected");
        }
        if let Some(message) = outcome.status_message() {
            status.push(format!("line {line_no}: {message}"));
        }
    }
    Ok(status)
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("reading batch script from stdin")?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Limits;
    use crate::view::{text::render_text, ViewOptions};

    #[test]
    fn script_applies_actions_in_order() -> Result<()> {
        let mut store = NoteStore::new(Limits::default());
        let script = r##"
{"action":"create","title":"Groceries","body":"Milk, eggs"}
{"action":"create","title":"Work","body":"Standup at 10"}
{"action":"create","title":"","body":"orphan"}
{"action":"update","id":"#2","title":"Groceries","body":"Milk, eggs, bread"}
{"action":"search","query":"GRO"}
"##;
        let status = apply_script(&mut store, script)?;
        assert_eq!(
            status,
            vec![
                "line 2: Note added.",
                "line 3: Note added.",
                "line 4: Title is required.",
                "line 5: Note updated.",
            ]
        );
        let view = project(&store, &ViewOptions::default());
        assert_eq!(view.len(), 1);
        assert_eq!(view.cards()[0].body, "Milk, eggs, bread");
        Ok(())
    }

    #[test]
    fn malformed_line_aborts_with_line_number() {
        let mut store = NoteStore::new(Limits::default());
        let script = "{\"action\":\"create\",\"title\":\"A\",\"body\":\"B\"}\n{\"action\":\"rename\"}\n";
        let err = apply_script(&mut store, script).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn search_without_matches_renders_empty_state() -> Result<()> {
        let mut store = NoteStore::new(Limits::default());
        apply_script(
            &mut store,
            "{\"action\":\"create\",\"title\":\"Groceries\",\"body\":\"Milk\"}\n{\"action\":\"search\",\"query\":\"xyz\"}",
        )?;
        let view = project(&store, &ViewOptions::default());
        assert_eq!(render_text(&view), "No notes match your search.\n");
        Ok(())
    }
}
