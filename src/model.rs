use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Runtime configuration assembled from CLI flags.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub max_upload_bytes: u64,
    pub export_dir: PathBuf,
}

/// Successful reply from `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub message: String,
    pub departments: Vec<String>,
}

/// Body of `POST /generate_seating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub departments: Vec<String>,
    pub classrooms: u32,
    #[serde(rename = "studentsPerClass")]
    pub students_per_class: u32,
}

/// Seat identifier as delivered by the backend: usually a 1-based number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeatId {
    Number(u64),
    Text(String),
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatId::Number(n) => write!(f, "{n}"),
            SeatId::Text(s) => f.write_str(s),
        }
    }
}

/// One seated student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub room: String,
    pub seat: SeatId,
    pub roll_number: String,
    pub name: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

/// Full ordered payload of a generate call.
pub type ResultSet = Vec<SeatRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryStats {
    pub total_students: usize,
    pub room_count: usize,
    /// Distinct departments in order of first appearance.
    pub departments: Vec<String>,
}

impl SummaryStats {
    pub fn departments_display(&self) -> String {
        self.departments.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGroup {
    pub room: String,
    pub seats: Vec<SeatRecord>,
}

/// ResultSet partitioned by room; rooms ordered by first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedView {
    pub rooms: Vec<RoomGroup>,
}

#[cfg(test)]
impl GroupedView {
    pub fn room_names(&self) -> Vec<&str> {
        self.rooms.iter().map(|g| g.room.as_str()).collect()
    }

    pub fn total_seats(&self) -> usize {
        self.rooms.iter().map(|g| g.seats.len()).sum()
    }
}

/// Departments offered by the last upload and whether each one is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentSelection {
    entries: Vec<(String, bool)>,
}

impl DepartmentSelection {
    /// Every department starts checked.
    pub fn all_checked(departments: &[String]) -> Self {
        Self {
            entries: departments.iter().map(|d| (d.clone(), true)).collect(),
        }
    }

    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let entry = self.entries.get_mut(index)?;
        entry.1 = !entry.1;
        Some(entry.1)
    }

    pub fn set_all(&mut self, checked: bool) {
        for entry in &mut self.entries {
            entry.1 = checked;
        }
    }

    /// Check only the named departments; unknown names are returned.
    pub fn retain_only(&mut self, wanted: &[String]) -> Vec<String> {
        for entry in &mut self.entries {
            entry.1 = wanted.iter().any(|w| w == &entry.0);
        }
        wanted
            .iter()
            .filter(|w| !self.entries.iter().any(|(d, _)| d == *w))
            .cloned()
            .collect()
    }

    /// Checked departments in checklist order.
    pub fn selected(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(d, _)| d.clone())
            .collect()
    }
}

/// The two remote actions a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Upload,
    Generate,
}

impl Action {
    pub fn idle_label(self) -> &'static str {
        match self {
            Action::Upload => "Upload",
            Action::Generate => "Generate Seating",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Action::Upload => "Uploading...",
            Action::Generate => "Generating...",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::Generate => "generate",
        }
    }
}

/// Enabled flag and label of an action's trigger control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerState {
    pub enabled: bool,
    pub label: String,
}

impl TriggerState {
    pub fn idle(action: Action) -> Self {
        Self {
            enabled: true,
            label: action.idle_label().to_string(),
        }
    }

    pub fn busy(action: Action) -> Self {
        Self {
            enabled: false,
            label: action.busy_label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Uploading,
    DepartmentsReady,
    Generating,
    ResultsReady,
    Error,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Uploading => "uploading",
            Stage::DepartmentsReady => "departments ready",
            Stage::Generating => "generating",
            Stage::ResultsReady => "results ready",
            Stage::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// A message written to one status region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub hint: Option<String>,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
            hint: None,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
            hint: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }
}
