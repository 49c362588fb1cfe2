//! Plain-text rendering of log rows and per-frame results.

use crate::constants::{FRAME_COLUMNS, LOG_COLUMNS};
use crate::detection::ResultRow;
use crate::results::LogEntry;
use std::fmt::Write;

/// Render `rows` as an aligned text table with a header line.
///
/// Confidence and elapsed time are shown with two decimals.
pub fn render_table<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let cells: Vec<[String; 5]> = rows
        .into_iter()
        .map(|row| {
            [
                row.source_path.clone(),
                row.label.clone(),
                row.bbox.clone(),
                format!("{:.2}", row.confidence),
                format!("{:.2}", row.elapsed_seconds),
            ]
        })
        .collect();
    render_cells(&LOG_COLUMNS, &cells)
}

/// Render the result rows of one frame, numbered by detection index.
pub fn render_frame_rows(rows: &[ResultRow]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            [
                index.to_string(),
                row.label.clone(),
                row.bbox.clone(),
                format!("{:.2}", row.confidence),
                format!("{:.2}", row.elapsed_seconds),
            ]
        })
        .collect();
    render_cells(&FRAME_COLUMNS, &cells)
}

fn render_cells<const N: usize>(header: &[&str; N], cells: &[[String; N]]) -> String {
    let mut widths = header.map(str::len);
    for line in cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_line(&mut out, header, &widths);
    for line in cells {
        write_line(&mut out, line, &widths);
    }
    out
}

fn write_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}
