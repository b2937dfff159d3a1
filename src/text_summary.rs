//! Text rendering of a results panel for CLI output.
//!
//! Turns the projected report into aligned plain-text tables, one per room.

use crate::render::{ResultsPanel, RoomSection, NO_DATA_MESSAGE, TABLE_HEADERS};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build text output from a projected results panel.
pub(crate) fn build_text_summary(panel: &ResultsPanel) -> TextSummary {
    let report = match panel {
        ResultsPanel::NoData => {
            return TextSummary {
                lines: vec![NO_DATA_MESSAGE.to_string()],
            }
        }
        ResultsPanel::Seating(report) => report,
    };

    let mut lines = vec!["Seating Summary".to_string()];
    lines.extend(report.summary.iter().map(|l| format!("  {l}")));

    for section in &report.rooms {
        lines.push(String::new());
        lines.push(room_header(&section.title));
        lines.extend(format_table(section));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} record(s) available for export",
        report.export_records
    ));

    TextSummary { lines }
}

/// Heading line written above each room's table.
pub(crate) fn room_header(title: &str) -> String {
    format!("== {title} ==")
}

fn format_table(section: &RoomSection) -> Vec<String> {
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &section.rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let fmt_row = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{c:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(section.rows.len() + 2);
    out.push(fmt_row(TABLE_HEADERS));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &section.rows {
        out.push(fmt_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    out
}
