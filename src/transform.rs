//! Pure reshaping of a flat ResultSet for display.

use crate::model::{GroupedView, RoomGroup, SeatRecord, SummaryStats};
use std::collections::{HashMap, HashSet};

/// Count students, distinct rooms, and distinct departments (first-seen order).
pub fn summarize(records: &[SeatRecord]) -> SummaryStats {
    let rooms: HashSet<&str> = records.iter().map(|r| r.room.as_str()).collect();
    let mut seen = HashSet::new();
    let departments = records
        .iter()
        .filter(|r| seen.insert(r.department.as_str()))
        .map(|r| r.department.clone())
        .collect();

    SummaryStats {
        total_students: records.len(),
        room_count: rooms.len(),
        departments,
    }
}

/// Stable partition by room. Rooms appear in order of first occurrence and
/// records keep their input order inside each room.
pub fn group_by_room(records: &[SeatRecord]) -> GroupedView {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rooms: Vec<RoomGroup> = Vec::new();

    for rec in records {
        let slot = *index.entry(rec.room.as_str()).or_insert_with(|| {
            rooms.push(RoomGroup {
                room: rec.room.clone(),
                seats: Vec::new(),
            });
            rooms.len() - 1
        });
        rooms[slot].seats.push(rec.clone());
    }

    GroupedView { rooms }
}

#[cfg(test)]
pub(crate) fn seat(room: &str, seat: u64, roll: &str, dept: &str) -> SeatRecord {
    SeatRecord {
        room: room.to_string(),
        seat: crate::model::SeatId::Number(seat),
        roll_number: roll.to_string(),
        name: format!("Student {roll}"),
        department: dept.to_string(),
        year: None,
    }
}
