//! CSV export of the joined run table
//!
//! Written by hand: fields are quoted only when they contain a comma, quote,
//! or newline, with embedded quotes doubled.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::data::DataError;
use crate::stats::JoinedRun;

const HEADER: &[&str] = &[
    "id", "date", "category", "level", "time_seconds", "player", "status", "examiner",
];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single CSV row to any writer
fn write_row<W: Write>(w: &mut W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

fn status_label(entry: &JoinedRun<'_>) -> &'static str {
    use crate::data::RunStatus;
    match entry.run.status {
        RunStatus::New => "new",
        RunStatus::Verified { .. } => "verified",
        RunStatus::Rejected { .. } => "rejected",
    }
}

/// Builds one output row for a joined run
fn build_row(entry: &JoinedRun<'_>) -> Result<Vec<String>, DataError> {
    Ok(vec![
        entry.run.id.clone(),
        entry
            .run
            .date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        entry.category_name().to_string(),
        entry.level_label()?,
        format!("{}", entry.run.primary_seconds()),
        entry.run.player_key().unwrap_or_default(),
        status_label(entry).to_string(),
        entry.run.examiner().unwrap_or_default().to_string(),
    ])
}

/// Writes the joined run table as CSV, header row included
pub fn write_runs_csv<W: Write>(w: &mut W, joined: &[JoinedRun<'_>]) -> Result<(), DataError> {
    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    write_row(w, &header)?;
    for entry in joined {
        let row = build_row(entry)?;
        write_row(w, &row)?;
    }
    Ok(())
}

/// Exports the joined run table to a CSV file
pub fn export_runs_csv(path: &Path, joined: &[JoinedRun<'_>]) -> Result<(), DataError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_runs_csv(&mut writer, joined)?;
    writer.flush()?;
    Ok(())
}
