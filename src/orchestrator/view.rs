//! View capability injected into the workflow.
//!
//! The workflow never touches a terminal or stdout directly; it reads trigger
//! state from and pushes updates into whatever `View` it was built with.

use crate::model::{Action, DepartmentSelection, Stage, StatusKind, StatusMessage, TriggerState};
use crate::render::ResultsPanel;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// Status regions: one under the upload control, one above the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Upload,
    Results,
}

impl Action {
    pub fn region(self) -> Region {
        match self {
            Action::Upload => Region::Upload,
            Action::Generate => Region::Results,
        }
    }
}

pub trait View: Send {
    fn trigger(&self, action: Action) -> TriggerState;
    fn set_trigger(&mut self, action: Action, state: TriggerState);
    fn stage_changed(&mut self, _stage: Stage) {}
    fn show_status(&mut self, region: Region, status: StatusMessage);
    fn render_departments(&mut self, selection: &DepartmentSelection);
    fn render_results(&mut self, panel: &ResultsPanel);
    fn clear_results(&mut self);
}

/// Current trigger states, shared by views that have to answer reads locally.
#[derive(Debug, Clone, Default)]
pub(crate) struct Triggers(HashMap<Action, TriggerState>);

impl Triggers {
    pub fn get(&self, action: Action) -> TriggerState {
        self.0
            .get(&action)
            .cloned()
            .unwrap_or_else(|| TriggerState::idle(action))
    }

    pub fn set(&mut self, action: Action, state: TriggerState) {
        self.0.insert(action, state);
    }
}

/// Updates forwarded from the controller task to the TUI thread.
#[derive(Debug, Clone)]
pub(crate) enum ViewUpdate {
    Stage(Stage),
    Trigger(Action, TriggerState),
    Status(Region, StatusMessage),
    Departments(Vec<(String, bool)>),
    Results(ResultsPanel),
    ClearResults,
}

/// View that mirrors trigger state locally and forwards everything else.
pub(crate) struct ChannelView {
    tx: UnboundedSender<ViewUpdate>,
    triggers: Triggers,
}

impl ChannelView {
    pub fn new(tx: UnboundedSender<ViewUpdate>) -> Self {
        Self {
            tx,
            triggers: Triggers::default(),
        }
    }

    fn send(&self, update: ViewUpdate) {
        // The UI may already be gone during shutdown.
        let _ = self.tx.send(update);
    }
}

impl View for ChannelView {
    fn trigger(&self, action: Action) -> TriggerState {
        self.triggers.get(action)
    }

    fn set_trigger(&mut self, action: Action, state: TriggerState) {
        self.triggers.set(action, state.clone());
        self.send(ViewUpdate::Trigger(action, state));
    }

    fn stage_changed(&mut self, stage: Stage) {
        self.send(ViewUpdate::Stage(stage));
    }

    fn show_status(&mut self, region: Region, status: StatusMessage) {
        self.send(ViewUpdate::Status(region, status));
    }

    fn render_departments(&mut self, selection: &DepartmentSelection) {
        self.send(ViewUpdate::Departments(selection.entries().to_vec()));
    }

    fn render_results(&mut self, panel: &ResultsPanel) {
        self.send(ViewUpdate::Results(panel.clone()));
    }

    fn clear_results(&mut self) {
        self.send(ViewUpdate::ClearResults);
    }
}

/// Output line routing for stdout/stderr writer.
pub(crate) enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Headless view: statuses go to stderr, rendered results to stdout.
pub(crate) struct TextView {
    out: UnboundedSender<OutputLine>,
    print_results: bool,
    triggers: Triggers,
}

impl TextView {
    pub fn new(out: UnboundedSender<OutputLine>, print_results: bool) -> Self {
        Self {
            out,
            print_results,
            triggers: Triggers::default(),
        }
    }

    fn err(&self, line: String) {
        let _ = self.out.send(OutputLine::Stderr(line));
    }
}

pub(crate) fn status_line(region: Region, status: &StatusMessage) -> String {
    match (status.kind, region) {
        (StatusKind::Error, Region::Results) => format!("Error: {}", status.text),
        (StatusKind::Error, Region::Upload) => format!("Upload error: {}", status.text),
        _ => status.text.clone(),
    }
}

impl View for TextView {
    fn trigger(&self, action: Action) -> TriggerState {
        self.triggers.get(action)
    }

    fn set_trigger(&mut self, action: Action, state: TriggerState) {
        if !state.enabled {
            self.err(state.label.clone());
        }
        self.triggers.set(action, state);
    }

    fn show_status(&mut self, region: Region, status: StatusMessage) {
        self.err(status_line(region, &status));
        if let Some(hint) = status.hint {
            self.err(format!("  {hint}"));
        }
    }

    fn render_departments(&mut self, selection: &DepartmentSelection) {
        for (dept, checked) in selection.entries() {
            let mark = if *checked { 'x' } else { ' ' };
            self.err(format!("  [{mark}] {dept}"));
        }
    }

    fn render_results(&mut self, panel: &ResultsPanel) {
        if !self.print_results {
            return;
        }
        let summary = crate::text_summary::build_text_summary(panel);
        for line in summary.lines {
            let _ = self.out.send(OutputLine::Stdout(line));
        }
    }

    fn clear_results(&mut self) {}
}
