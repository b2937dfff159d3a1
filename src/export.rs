//! Spreadsheet and JSON export of a ResultSet.

use crate::model::{SeatId, SeatRecord};
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

pub const SHEET_NAME: &str = "Seating Arrangement";
pub const DEFAULT_EXPORT_FILE: &str = "exam_seating_arrangement.xlsx";
pub const SHEET_COLUMNS: [&str; 6] = ["room", "seat", "roll_number", "name", "department", "year"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

/// Header row followed by one row per record, independent of room grouping.
pub fn sheet_rows(records: &[SeatRecord]) -> Vec<Vec<Cell>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(
        SHEET_COLUMNS
            .iter()
            .map(|c| Cell::Text(c.to_string()))
            .collect(),
    );
    for r in records {
        let seat = match &r.seat {
            SeatId::Number(n) => Cell::Number(*n as f64),
            SeatId::Text(s) => Cell::Text(s.clone()),
        };
        rows.push(vec![
            Cell::Text(r.room.clone()),
            seat,
            Cell::Text(r.roll_number.clone()),
            Cell::Text(r.name.clone()),
            Cell::Text(r.department.clone()),
            r.year.clone().map(Cell::Text).unwrap_or(Cell::Empty),
        ]);
    }
    rows
}

/// Encode records into a single-sheet workbook and return the file bytes.
pub fn encode_xlsx(records: &[SeatRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).context("name worksheet")?;

    for (r, row) in sheet_rows(records).iter().enumerate() {
        let r = u32::try_from(r).context("too many rows for a worksheet")?;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Text(s) if r == 0 => {
                    sheet.write_string_with_format(r, c, s, &header)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook.save_to_buffer().context("encode xlsx workbook")
}

pub fn write_xlsx(path: &Path, records: &[SeatRecord]) -> Result<()> {
    let bytes = encode_xlsx(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export directory {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn write_json(path: &Path, records: &[SeatRecord]) -> Result<()> {
    let out = serde_json::to_string_pretty(records).context("serialize seating json")?;
    std::fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Where an export lands when no path is given: the download directory,
/// or the working directory when there is none.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_export_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_EXPORT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::seat;

    #[test]
    fn rows_ignore_room_grouping() {
        let records = vec![
            seat("Room 1", 1, "a", "cs"),
            seat("Room 2", 1, "b", "ee"),
            seat("Room 1", 2, "c", "cs"),
        ];
        let rows = sheet_rows(&records);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], Cell::Text("room".into()));
        assert_eq!(rows[3][2], Cell::Text("c".into()));
        assert_eq!(rows[3][1], Cell::Number(2.0));
        assert_eq!(rows[1][5], Cell::Empty);
    }

    #[test]
    fn empty_result_gives_header_only() {
        let rows = sheet_rows(&[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), SHEET_COLUMNS.len());
        let bytes = encode_xlsx(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn writes_files_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![seat("Room 1", 1, "a", "cs")];

        let xlsx = default_export_path(dir.path());
        write_xlsx(&xlsx, &records).unwrap();
        assert!(std::fs::metadata(&xlsx).unwrap().len() > 0);
        assert!(xlsx.ends_with(DEFAULT_EXPORT_FILE));

        let json = dir.path().join("nested").join("seating.json");
        std::fs::create_dir_all(json.parent().unwrap()).unwrap();
        write_json(&json, &records).unwrap();
        let back: Vec<SeatRecord> =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(back, records);
    }
}
