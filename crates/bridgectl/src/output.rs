//! Rendering for `--output`.
//!
//! Structured formats serialize the same data the table view is built
//! from. Progress lines go to stderr via [`notice`] so stdout stays
//! machine-readable.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// `--color auto` honours `NO_COLOR` and only colors a terminal.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Applies status colors when enabled, plain text otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: &ColorMode) -> Self {
        Self {
            enabled: should_color(mode),
        }
    }

    fn paint(self, text: &str, style: impl FnOnce(&str) -> String) -> String {
        if self.enabled { style(text) } else { text.to_owned() }
    }

    pub fn good(self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    pub fn warn(self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn bad(self, text: &str) -> String {
        self.paint(text, |t| t.red().to_string())
    }

    pub fn dim(self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().to_string())
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a collection. `to_row` maps each item to its table row and
/// `id_fn` to its `plain` line; the structured formats serialize `data`
/// itself.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one item. In table mode `detail_fn` builds the whole view, which
/// may itself embed tables.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Write rendered output to stdout. Nothing is written under `--quiet` or
/// for an empty render.
pub fn print_output(output: &str, quiet: bool) {
    if !quiet && !output.is_empty() {
        let _ = writeln!(io::stdout().lock(), "{output}");
    }
}

/// Status line on stderr, respecting quiet mode.
pub fn notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Renderers ───────────────────────────────────────────────────────

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        name: &'static str,
        rx: u64,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { name: "D1", rx: 10 }, Item { name: "D2", rx: 0 }]
    }

    #[test]
    fn list_formats() {
        let data = items();
        let row = |i: &Item| Row {
            name: i.name.into(),
        };
        let id = |i: &Item| i.name.to_owned();

        let table = render_list(&OutputFormat::Table, &data, row, id).unwrap();
        assert!(table.contains("Name") && table.contains("D2"));

        let plain = render_list(&OutputFormat::Plain, &data, row, id).unwrap();
        assert_eq!(plain, "D1\nD2");

        let compact = render_list(&OutputFormat::JsonCompact, &data, row, id).unwrap();
        assert_eq!(compact, r#"[{"name":"D1","rx":10},{"name":"D2","rx":0}]"#);

        let yaml = render_list(&OutputFormat::Yaml, &data, row, id).unwrap();
        assert!(yaml.contains("- name: D1"));
    }

    #[test]
    fn painter_without_color_is_identity() {
        let p = Painter::new(&ColorMode::Never);
        assert_eq!(p.good("ok"), "ok");
        assert_eq!(p.bad("down"), "down");
        assert!(Painter::new(&ColorMode::Always).good("ok").contains("\u{1b}["));
    }
}
