//! Log command handler.

use tokio::time::MissedTickBehavior;

use bridgectl_core::Console;

use crate::cli::{GlobalOpts, LogsArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Lines of `current` that were not in `prev`. The device keeps a rolling
/// window, so the longest suffix of `prev` that starts `current` is the
/// overlap.
fn new_lines<'a>(prev: &[String], current: &'a [String]) -> &'a [String] {
    let max = prev.len().min(current.len());
    let overlap = (1..=max)
        .rev()
        .find(|&k| prev[prev.len() - k..] == current[..k])
        .unwrap_or(0);
    &current[overlap..]
}

fn tail(lines: &[String], n: Option<usize>) -> &[String] {
    match n {
        Some(n) if n < lines.len() => &lines[lines.len() - n..],
        _ => lines,
    }
}

fn render(lines: &[String], global: &GlobalOpts) -> Result<String, CliError> {
    match global.output {
        OutputFormat::Table | OutputFormat::Plain => Ok(lines.join("\n")),
        OutputFormat::Json => output::render_json_pretty(lines),
        OutputFormat::JsonCompact => output::render_json_compact(lines),
        OutputFormat::Yaml => output::render_yaml(lines),
    }
}

pub async fn handle(console: &Console, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut seen = console.logs().await?;
    output::print_output(&render(tail(&seen, args.lines), global)?, global.quiet);
    if !args.follow {
        return Ok(());
    }

    let mut interval = tokio::time::interval(console.config().poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match console.logs().await {
                    Ok(current) => {
                        output::print_output(&render(new_lines(&seen, &current), global)?, global.quiet);
                        seen = current;
                    }
                    Err(e) => tracing::warn!(error = %e, "log poll failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn rolling_window_yields_only_new_lines() {
        let prev = lines(&["a", "b", "c"]);
        assert_eq!(new_lines(&prev, &lines(&["b", "c", "d", "e"])), lines(&["d", "e"]));
        assert_eq!(new_lines(&prev, &lines(&["a", "b", "c"])), Vec::<String>::new());
        assert_eq!(new_lines(&prev, &lines(&["x", "y"])), lines(&["x", "y"]));
        assert_eq!(new_lines(&[], &lines(&["x"])), lines(&["x"]));
    }

    #[test]
    fn tail_limits_lines() {
        let all = lines(&["a", "b", "c"]);
        assert_eq!(tail(&all, Some(2)), lines(&["b", "c"]));
        assert_eq!(tail(&all, Some(10)), all);
        assert_eq!(tail(&all, None), all);
    }
}
