use std::io::{self, Write};

use serde::Serialize;
use tracing::debug;

use crate::app::{ProgressEvent, ProgressSink, RunResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Json,
    Text,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", summary_line(result))
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => debug!("{}", event.message),
        }
    }
}

pub fn summary_line(result: &RunResult) -> String {
    let archive = &result.archive;
    let mut line = format!(
        "{}: wrote {} of {} checks to '{}'!{} ({})",
        result.contact_group,
        archive.written,
        result.checks_found,
        archive.tab,
        archive.column,
        archive.column_label,
    );
    if archive.skipped > 0 {
        line.push_str(&format!(", {} over the count limit", archive.skipped));
    }
    if archive.rows_inserted > 0 {
        line.push_str(&format!(", {} new rows", archive.rows_inserted));
    }
    line
}
