//! Plain-text table rendering for the end-of-run report.

use std::fmt::Write as _;

use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "  ";

/// Renders `rows` under `headers` as space-aligned columns with a dashed
/// separator. Cells are measured in terminal columns, so wide CJK text lines
/// up, and control characters are flattened to spaces so multi-line error
/// messages stay on one row.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers = headers.iter().map(|h| sanitize_cell(h)).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| sanitize_cell(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat((*w).max(3))).join(COLUMN_GAP);
    let _ = writeln!(output, "{separator}");
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths.iter().copied())
        .map(|(value, width)| {
            let padding = width.saturating_sub(display_width(value));
            format!("{value}{}", " ".repeat(padding))
        })
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

fn display_width(value: &str) -> usize {
    UnicodeWidthStr::width(value)
}
