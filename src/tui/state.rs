use crate::model::{Stage, StatusKind, StatusMessage};
use crate::orchestrator::view::{Region, Triggers, ViewUpdate};
use crate::orchestrator::UiCommand;
use crate::render::ResultsPanel;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::path::PathBuf;

/// Which input receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Departments,
    File,
    Classrooms,
    StudentsPerClass,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Departments => Focus::File,
            Focus::File => Focus::Classrooms,
            Focus::Classrooms => Focus::StudentsPerClass,
            Focus::StudentsPerClass => Focus::Departments,
        }
    }

    fn is_text(self) -> bool {
        self != Focus::Departments
    }
}

/// What the UI loop should do after a key press.
#[derive(Debug)]
pub enum KeyOutcome {
    Send(UiCommand),
    CopyResults,
    Quit,
}

pub struct UiState {
    pub stage: Stage,
    pub triggers: Triggers,
    pub upload_status: Option<StatusMessage>,
    pub results_status: Option<StatusMessage>,
    pub departments: Vec<(String, bool)>,
    pub dept_cursor: usize,
    pub results: Option<ResultsPanel>,
    pub results_scroll: u16,
    pub file: String,
    pub classrooms: String,
    pub students_per_class: String,
    pub focus: Focus,
    pub show_help: bool,
    /// Local feedback that never reaches the controller (clipboard, hints).
    pub info: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            triggers: Triggers::default(),
            upload_status: None,
            results_status: None,
            departments: Vec::new(),
            dept_cursor: 0,
            results: None,
            results_scroll: 0,
            file: String::new(),
            classrooms: "3".into(),
            students_per_class: "30".into(),
            focus: Focus::Departments,
            show_help: false,
            info: String::new(),
        }
    }
}

impl UiState {
    pub fn apply(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::Stage(stage) => self.stage = stage,
            ViewUpdate::Trigger(action, state) => self.triggers.set(action, state),
            ViewUpdate::Status(Region::Upload, status) => self.upload_status = Some(status),
            ViewUpdate::Status(Region::Results, status) => self.results_status = Some(status),
            ViewUpdate::Departments(entries) => {
                self.departments = entries;
                self.dept_cursor = self.dept_cursor.min(self.departments.len().saturating_sub(1));
            }
            ViewUpdate::Results(panel) => {
                self.results = Some(panel);
                self.results_scroll = 0;
            }
            ViewUpdate::ClearResults => {
                self.results = None;
                self.results_scroll = 0;
            }
        }
    }

    fn upload_command(&self) -> UiCommand {
        let file = self.file.trim();
        UiCommand::Upload((!file.is_empty()).then(|| PathBuf::from(file)))
    }

    fn generate_command(&self) -> UiCommand {
        UiCommand::Generate {
            classrooms: self.classrooms.clone(),
            students_per_class: self.students_per_class.clone(),
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Departments => None,
            Focus::File => Some(&mut self.file),
            Focus::Classrooms => Some(&mut self.classrooms),
            Focus::StudentsPerClass => Some(&mut self.students_per_class),
        }
    }

    /// Translate a key press into local state changes and, when needed, a
    /// command for the controller.
    pub fn on_key(&mut self, modifiers: KeyModifiers, code: KeyCode) -> Option<KeyOutcome> {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Some(KeyOutcome::Quit);
        }
        if self.show_help {
            self.show_help = false;
            return None;
        }

        match code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::Esc => {
                self.focus = Focus::Departments;
                return None;
            }
            KeyCode::PageDown => {
                self.results_scroll = self.results_scroll.saturating_add(10);
                return None;
            }
            KeyCode::PageUp => {
                self.results_scroll = self.results_scroll.saturating_sub(10);
                return None;
            }
            _ => {}
        }

        if self.focus.is_text() {
            return self.on_text_key(code);
        }

        match code {
            KeyCode::Char('q') => Some(KeyOutcome::Quit),
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Char('u') => Some(KeyOutcome::Send(self.upload_command())),
            KeyCode::Char('g') => Some(KeyOutcome::Send(self.generate_command())),
            KeyCode::Char('e') => Some(KeyOutcome::Send(UiCommand::Export(None))),
            KeyCode::Char('y') => Some(KeyOutcome::CopyResults),
            KeyCode::Char('a') => {
                let all_checked = self.departments.iter().all(|(_, checked)| *checked);
                Some(KeyOutcome::Send(UiCommand::SelectAll(!all_checked)))
            }
            KeyCode::Char(' ') | KeyCode::Enter if !self.departments.is_empty() => Some(
                KeyOutcome::Send(UiCommand::ToggleDepartment(self.dept_cursor)),
            ),
            KeyCode::Up | KeyCode::Char('k') => {
                self.dept_cursor = self.dept_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.dept_cursor + 1 < self.departments.len() {
                    self.dept_cursor += 1;
                }
                None
            }
            _ => None,
        }
    }

    fn on_text_key(&mut self, code: KeyCode) -> Option<KeyOutcome> {
        match code {
            KeyCode::Enter if self.focus == Focus::File => {
                Some(KeyOutcome::Send(self.upload_command()))
            }
            KeyCode::Enter => Some(KeyOutcome::Send(self.generate_command())),
            KeyCode::Backspace => {
                if let Some(field) = self.field_mut() {
                    field.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.field_mut() {
                    field.push(c);
                }
                None
            }
            _ => None,
        }
    }
}

pub fn status_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Info => Color::Cyan,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
    }
}

/// Status message plus its hint, wrapped to the region width.
pub fn status_lines(
    status: Option<&StatusMessage>,
    prefix: &str,
    area_width: u16,
) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    let Some(status) = status else {
        return out;
    };
    let text = if status.kind == StatusKind::Error {
        format!("{prefix}{}", status.text)
    } else {
        status.text.clone()
    };
    push_wrapped(
        &mut out,
        &text,
        Style::default().fg(status_color(status.kind)),
        area_width,
    );
    if let Some(hint) = &status.hint {
        push_wrapped(&mut out, hint, Style::default().fg(Color::Gray), area_width);
    }
    out
}

fn push_wrapped(out: &mut Vec<Line<'static>>, value: &str, style: Style, area_width: u16) {
    // Account for borders (2 chars on each side)
    let usable_width = area_width.saturating_sub(4).max(1) as usize;
    let chars: Vec<char> = value.trim().chars().collect();
    for chunk in chars.chunks(usable_width) {
        let text: String = chunk.iter().collect();
        out.push(Line::from(Span::styled(text, style)));
    }
}
