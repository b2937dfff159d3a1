//! Workflow controller.
//!
//! Owns the upload/generate state machine and the busy guard around each
//! remote call, plus the actor loop that serialises UI commands.

use super::view::{Region, View};
use crate::error::SeatingError;
use crate::model::{
    Action, DepartmentSelection, GenerateRequest, ResultSet, Stage, StatusMessage, TriggerState,
    UploadResult,
};
use crate::render::{self, ResultsPanel, NO_DATA_MESSAGE};
use crate::transport::SeatingTransport;
use crate::validate;
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// How a user action ended, for callers that need an exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    NoData,
    /// Trigger was already busy; nothing happened.
    Ignored,
    Failed(SeatingError),
}

pub struct Workflow<V: View> {
    view: V,
    max_upload_bytes: u64,
    export_dir: PathBuf,
    stage: Stage,
    /// Trigger state to restore once the in-flight call for an action resolves.
    in_flight: HashMap<Action, TriggerState>,
    selection: DepartmentSelection,
    results: Option<ResultSet>,
}

impl<V: View> Workflow<V> {
    pub fn new(view: V, max_upload_bytes: u64, export_dir: PathBuf) -> Self {
        Self {
            view,
            max_upload_bytes,
            export_dir,
            stage: Stage::Idle,
            in_flight: HashMap::new(),
            selection: DepartmentSelection::default(),
            results: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selection(&self) -> &DepartmentSelection {
        &self.selection
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage != stage {
            tracing::debug!(from = self.stage.as_str(), to = stage.as_str(), "stage change");
        }
        self.stage = stage;
        self.view.stage_changed(stage);
    }

    /// Disable the trigger and remember what to restore. `false` if already busy.
    fn acquire(&mut self, action: Action) -> bool {
        if self.in_flight.contains_key(&action) {
            tracing::debug!(action = action.as_str(), "trigger busy, ignoring");
            return false;
        }
        let previous = self.view.trigger(action);
        self.in_flight.insert(action, previous);
        self.view.set_trigger(action, TriggerState::busy(action));
        true
    }

    fn release(&mut self, action: Action) {
        let restore = self
            .in_flight
            .remove(&action)
            .unwrap_or_else(|| TriggerState::idle(action));
        self.view.set_trigger(action, restore);
    }

    fn fail(&mut self, action: Action, err: &SeatingError, in_flight: bool) {
        tracing::warn!(action = action.as_str(), kind = err.kind(), error = %err, "action failed");
        if in_flight {
            self.set_stage(Stage::Error);
        }
        self.view.show_status(
            action.region(),
            StatusMessage::error(err.to_string()).with_hint(err.hint()),
        );
    }

    fn check_upload(&self, file: Option<&Path>) -> Result<PathBuf, SeatingError> {
        let path = validate::validate_file(file)?;
        let meta = std::fs::metadata(path).map_err(|e| {
            SeatingError::validation(format!("Cannot read {}: {e}", path.display()))
        })?;
        validate::validate_file_size(meta.len(), self.max_upload_bytes)?;
        Ok(path.to_path_buf())
    }

    /// Validate and mark the upload in flight; the caller performs the call.
    pub fn begin_upload(&mut self, file: Option<&Path>) -> Result<PathBuf, Outcome> {
        if !self.acquire(Action::Upload) {
            return Err(Outcome::Ignored);
        }
        match self.check_upload(file) {
            Ok(path) => {
                tracing::info!(file = %path.display(), "uploading roster");
                self.set_stage(Stage::Uploading);
                Ok(path)
            }
            Err(err) => {
                self.fail(Action::Upload, &err, false);
                self.release(Action::Upload);
                Err(Outcome::Failed(err))
            }
        }
    }

    pub fn finish_upload(&mut self, result: Result<UploadResult, SeatingError>) -> Outcome {
        let outcome = match result {
            Ok(upload) => {
                tracing::info!(
                    departments = upload.departments.len(),
                    message = %upload.message,
                    "upload accepted"
                );
                // Each upload replaces the checklist wholesale.
                self.selection = DepartmentSelection::all_checked(&upload.departments);
                self.view.render_departments(&self.selection);
                self.set_stage(Stage::DepartmentsReady);
                self.view
                    .show_status(Region::Upload, StatusMessage::success(upload.message));
                Outcome::Completed
            }
            Err(err) => {
                self.fail(Action::Upload, &err, true);
                Outcome::Failed(err)
            }
        };
        self.release(Action::Upload);
        outcome
    }

    pub async fn submit_upload<T>(&mut self, transport: &T, file: Option<&Path>) -> Outcome
    where
        T: SeatingTransport + ?Sized,
    {
        let path = match self.begin_upload(file) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };
        let result = transport.upload(&path).await;
        self.finish_upload(result)
    }

    pub fn toggle_department(&mut self, index: usize) {
        if self.selection.toggle(index).is_some() {
            self.view.render_departments(&self.selection);
        }
    }

    pub fn select_all(&mut self, checked: bool) {
        self.selection.set_all(checked);
        self.view.render_departments(&self.selection);
    }

    /// Keep only the named departments checked; returns names the upload did not offer.
    pub fn select_only(&mut self, names: &[String]) -> Vec<String> {
        let unknown = self.selection.retain_only(names);
        self.view.render_departments(&self.selection);
        unknown
    }

    fn check_generate(
        selection: &DepartmentSelection,
        classrooms: &str,
        students_per_class: &str,
    ) -> Result<GenerateRequest, SeatingError> {
        let departments = validate::validate_selection(selection)?;
        let classrooms = validate::validate_classrooms(classrooms)?;
        let students_per_class = validate::validate_students_per_class(students_per_class)?;
        Ok(GenerateRequest {
            departments,
            classrooms,
            students_per_class,
        })
    }

    pub fn begin_generate(
        &mut self,
        selection: &DepartmentSelection,
        classrooms: &str,
        students_per_class: &str,
    ) -> Result<GenerateRequest, Outcome> {
        if !self.acquire(Action::Generate) {
            return Err(Outcome::Ignored);
        }
        match Self::check_generate(selection, classrooms, students_per_class) {
            Ok(request) => {
                tracing::info!(
                    departments = request.departments.len(),
                    classrooms = request.classrooms,
                    students_per_class = request.students_per_class,
                    "generating seating"
                );
                self.set_stage(Stage::Generating);
                self.view.show_status(
                    Region::Results,
                    StatusMessage::info("Generating seating arrangement..."),
                );
                Ok(request)
            }
            Err(err) => {
                self.fail(Action::Generate, &err, false);
                self.release(Action::Generate);
                Err(Outcome::Failed(err))
            }
        }
    }

    pub fn finish_generate(&mut self, result: Result<ResultSet, SeatingError>) -> Outcome {
        let outcome = match result {
            Ok(records) if records.is_empty() => {
                tracing::info!("generate returned no seats");
                self.results = None;
                self.view.render_results(&ResultsPanel::NoData);
                let fallback = if self.selection.is_empty() {
                    Stage::Idle
                } else {
                    Stage::DepartmentsReady
                };
                self.set_stage(fallback);
                self.view
                    .show_status(Region::Results, StatusMessage::info(NO_DATA_MESSAGE));
                Outcome::NoData
            }
            Ok(records) => {
                let panel = render::project(&records);
                let message = match &panel {
                    ResultsPanel::Seating(report) => format!(
                        "Seating generated for {} students in {} rooms",
                        report.export_records,
                        report.rooms.len()
                    ),
                    ResultsPanel::NoData => NO_DATA_MESSAGE.to_string(),
                };
                tracing::info!(records = records.len(), "seating generated");
                self.results = Some(records);
                self.view.render_results(&panel);
                self.set_stage(Stage::ResultsReady);
                self.view
                    .show_status(Region::Results, StatusMessage::success(message));
                Outcome::Completed
            }
            Err(err) => {
                self.results = None;
                self.view.clear_results();
                self.fail(Action::Generate, &err, true);
                Outcome::Failed(err)
            }
        };
        self.release(Action::Generate);
        outcome
    }

    /// Generate with an explicit department selection.
    pub async fn submit_generate<T>(
        &mut self,
        transport: &T,
        selection: &DepartmentSelection,
        classrooms: &str,
        students_per_class: &str,
    ) -> Outcome
    where
        T: SeatingTransport + ?Sized,
    {
        let request = match self.begin_generate(selection, classrooms, students_per_class) {
            Ok(r) => r,
            Err(outcome) => return outcome,
        };
        let result = transport.generate(&request).await;
        self.finish_generate(result)
    }

    /// Generate with the workflow's own checklist.
    pub async fn submit_generate_checked<T>(
        &mut self,
        transport: &T,
        classrooms: &str,
        students_per_class: &str,
    ) -> Outcome
    where
        T: SeatingTransport + ?Sized,
    {
        let selection = self.selection.clone();
        self.submit_generate(transport, &selection, classrooms, students_per_class)
            .await
    }

    /// Write the current results to `path` (or the default download location).
    pub fn export(&mut self, path: Option<&Path>) -> Option<PathBuf> {
        let Some(records) = self.results.as_ref() else {
            self.view.show_status(
                Region::Results,
                StatusMessage::info("No seating data to export"),
            );
            return None;
        };
        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| crate::export::default_export_path(&self.export_dir));

        match crate::export::write_xlsx(&target, records) {
            Ok(()) => {
                tracing::info!(path = %target.display(), records = records.len(), "exported xlsx");
                self.view.show_status(
                    Region::Results,
                    StatusMessage::success(format!("Exported: {}", target.display())),
                );
                Some(target)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "export failed");
                self.view.show_status(
                    Region::Results,
                    StatusMessage::error(format!("Export failed: {e:#}")),
                );
                None
            }
        }
    }
}

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Upload(Option<PathBuf>),
    ToggleDepartment(usize),
    SelectAll(bool),
    Generate {
        classrooms: String,
        students_per_class: String,
    },
    Export(Option<PathBuf>),
    Quit,
}

async fn wait_task<R>(task: &mut Option<JoinHandle<R>>) -> Result<R, tokio::task::JoinError> {
    match task.as_mut() {
        Some(handle) => handle.await,
        None => futures::future::pending().await,
    }
}

fn joined<R>(
    action: Action,
    res: Result<Result<R, SeatingError>, tokio::task::JoinError>,
) -> Result<R, SeatingError> {
    res.unwrap_or_else(|e| {
        Err(SeatingError::transport(format!(
            "{} task failed: {e}",
            action.as_str()
        )))
    })
}

/// Serialise UI commands against the workflow. At most one task per action
/// runs at a time; upload and generate do not block each other.
pub(crate) async fn run_controller<T, V>(
    transport: Arc<T>,
    mut workflow: Workflow<V>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()>
where
    T: SeatingTransport + 'static,
    V: View,
{
    let mut upload_task: Option<JoinHandle<Result<UploadResult, SeatingError>>> = None;
    let mut generate_task: Option<JoinHandle<Result<ResultSet, SeatingError>>> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Upload(file)) => {
                        if let Ok(path) = workflow.begin_upload(file.as_deref()) {
                            let t = transport.clone();
                            upload_task = Some(tokio::spawn(async move { t.upload(&path).await }));
                        }
                    }
                    Some(UiCommand::ToggleDepartment(i)) => workflow.toggle_department(i),
                    Some(UiCommand::SelectAll(checked)) => workflow.select_all(checked),
                    Some(UiCommand::Generate { classrooms, students_per_class }) => {
                        let selection = workflow.selection().clone();
                        if let Ok(request) =
                            workflow.begin_generate(&selection, &classrooms, &students_per_class)
                        {
                            let t = transport.clone();
                            generate_task =
                                Some(tokio::spawn(async move { t.generate(&request).await }));
                        }
                    }
                    Some(UiCommand::Export(path)) => {
                        workflow.export(path.as_deref());
                    }
                    Some(UiCommand::Quit) | None => break,
                }
            }
            // The handle stays in place until this branch wins, so a losing
            // branch never drops it.
            res = wait_task(&mut upload_task) => {
                upload_task = None;
                workflow.finish_upload(joined(Action::Upload, res));
            }
            res = wait_task(&mut generate_task) => {
                generate_task = None;
                workflow.finish_generate(joined(Action::Generate, res));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
