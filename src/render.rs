//! Projection of a ResultSet into the widgets every front end draws.

use crate::model::SeatRecord;
use crate::transform::{group_by_room, summarize};

pub const TABLE_HEADERS: [&str; 4] = ["Seat", "Roll Number", "Name", "Department"];
pub const NO_DATA_MESSAGE: &str = "No seating data available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSection {
    pub title: String,
    pub rows: Vec<[String; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingReport {
    pub summary: Vec<String>,
    pub rooms: Vec<RoomSection>,
    /// Number of records the export trigger is bound to.
    pub export_records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPanel {
    NoData,
    Seating(SeatingReport),
}

pub fn project(records: &[SeatRecord]) -> ResultsPanel {
    if records.is_empty() {
        return ResultsPanel::NoData;
    }

    let stats = summarize(records);
    let summary = vec![
        format!("Total Students: {}", stats.total_students),
        format!("Classrooms Used: {}", stats.room_count),
        format!("Departments: {}", stats.departments_display()),
    ];

    let rooms = group_by_room(records)
        .rooms
        .into_iter()
        .map(|group| RoomSection {
            title: format!("{} ({} students)", group.room, group.seats.len()),
            rows: group
                .seats
                .iter()
                .map(|r| {
                    [
                        r.seat.to_string(),
                        r.roll_number.clone(),
                        r.name.clone(),
                        r.department.clone(),
                    ]
                })
                .collect(),
        })
        .collect();

    ResultsPanel::Seating(SeatingReport {
        summary,
        rooms,
        export_records: records.len(),
    })
}

impl SeatingReport {
    /// Tab-separated rendering used for clipboard copies.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for section in &self.rooms {
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&TABLE_HEADERS.join("\t"));
            out.push('\n');
            for row in &section.rows {
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
        }
        out
    }
}
