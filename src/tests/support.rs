//! Shared fixtures: a scripted HTTP backend, a fake transport and a recording view.

use crate::error::SeatingError;
use crate::model::{
    Action, ClientConfig, DepartmentSelection, GenerateRequest, ResultSet, Stage, StatusMessage,
    TriggerState, UploadResult,
};
use crate::orchestrator::view::{Region, Triggers, View};
use crate::render::ResultsPanel;
use crate::transport::{HttpTransport, SeatingTransport, GENERATE_PATH, UPLOAD_PATH};
use async_trait::async_trait;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub(crate) struct BackendState {
    pub uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
    pub generates: Arc<Mutex<Vec<Value>>>,
    pub upload_reply: Arc<Mutex<(u16, String)>>,
    pub generate_reply: Arc<Mutex<(u16, String)>>,
}

impl BackendState {
    pub fn reply_upload(&self, status: u16, body: &str) {
        *self.upload_reply.lock().unwrap() = (status, body.to_string());
    }

    pub fn reply_generate(&self, status: u16, body: &str) {
        *self.generate_reply.lock().unwrap() = (status, body.to_string());
    }
}

fn raw_reply(status: u16, body: String) -> axum::response::Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [("content-type", "application/json")], body).into_response()
}

async fn handle_upload(
    State(state): State<BackendState>,
    mut multipart: Multipart,
) -> axum::response::Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state.uploads.lock().unwrap().push((name, file_name, len));
    }
    let (status, body) = state.upload_reply.lock().unwrap().clone();
    raw_reply(status, body)
}

async fn handle_generate(
    State(state): State<BackendState>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.generates.lock().unwrap().push(body);
    let (status, body) = state.generate_reply.lock().unwrap().clone();
    raw_reply(status, body)
}

/// Serve a scripted backend on an ephemeral port.
pub(crate) async fn spawn_backend() -> (String, BackendState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let state = BackendState::default();
    state.reply_upload(
        200,
        r#"{"success":true,"message":"Uploaded 2 student records","departments":["CS","EE"]}"#,
    );
    state.reply_generate(200, "[]");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route(UPLOAD_PATH, post(handle_upload))
        .route(GENERATE_PATH, post(handle_generate))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

pub(crate) fn transport_for(base_url: &str) -> HttpTransport {
    HttpTransport::new(&ClientConfig {
        base_url: format!("{base_url}/"),
        user_agent: "exam-seating-cli/test".into(),
        max_upload_bytes: 1024 * 1024,
        export_dir: std::env::temp_dir(),
    })
    .expect("client")
}

pub(crate) fn roster_file(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"PK\x03\x04 fake roster").expect("write roster");
    path
}

/// In-memory transport with scripted replies and an optional gate that holds
/// calls until released.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    pub uploads: Arc<Mutex<Vec<PathBuf>>>,
    pub requests: Arc<Mutex<Vec<GenerateRequest>>>,
    pub upload_reply: Arc<Mutex<Option<Result<UploadResult, SeatingError>>>>,
    pub generate_reply: Arc<Mutex<Option<Result<ResultSet, SeatingError>>>>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub fn with_departments(departments: &[&str]) -> Self {
        let t = Self::default();
        *t.upload_reply.lock().unwrap() = Some(Ok(UploadResult {
            message: format!("Uploaded {} student records", departments.len() * 10),
            departments: departments.iter().map(|d| d.to_string()).collect(),
        }));
        *t.generate_reply.lock().unwrap() = Some(Ok(Vec::new()));
        t
    }

    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn set_upload(&self, reply: Result<UploadResult, SeatingError>) {
        *self.upload_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_generate(&self, reply: Result<ResultSet, SeatingError>) {
        *self.generate_reply.lock().unwrap() = Some(reply);
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl SeatingTransport for FakeTransport {
    async fn upload(&self, file: &Path) -> Result<UploadResult, SeatingError> {
        self.uploads.lock().unwrap().push(file.to_path_buf());
        self.wait_gate().await;
        self.upload_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(SeatingError::transport("no upload reply scripted")))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ResultSet, SeatingError> {
        self.requests.lock().unwrap().push(request.clone());
        self.wait_gate().await;
        self.generate_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(SeatingError::transport("no generate reply scripted")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Stage(Stage),
    Trigger(Action, TriggerState),
    Status(Region, StatusMessage),
    Departments(Vec<(String, bool)>),
    Results(ResultsPanel),
    Cleared,
}

/// View that records every call; clones share the same log.
#[derive(Clone, Default)]
pub(crate) struct RecordingView {
    pub log: Arc<Mutex<Vec<Recorded>>>,
    triggers: Arc<Mutex<Triggers>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn statuses(&self, region: Region) -> Vec<StatusMessage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Status(r, s) if r == region => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn last_results(&self) -> Option<ResultsPanel> {
        self.events().into_iter().rev().find_map(|e| match e {
            Recorded::Results(p) => Some(p),
            _ => None,
        })
    }

    pub fn current_trigger(&self, action: Action) -> TriggerState {
        self.triggers.lock().unwrap().get(action)
    }

    fn push(&self, event: Recorded) {
        self.log.lock().unwrap().push(event);
    }
}

impl View for RecordingView {
    fn trigger(&self, action: Action) -> TriggerState {
        self.triggers.lock().unwrap().get(action)
    }

    fn set_trigger(&mut self, action: Action, state: TriggerState) {
        self.triggers.lock().unwrap().set(action, state.clone());
        self.push(Recorded::Trigger(action, state));
    }

    fn stage_changed(&mut self, stage: Stage) {
        self.push(Recorded::Stage(stage));
    }

    fn show_status(&mut self, region: Region, status: StatusMessage) {
        self.push(Recorded::Status(region, status));
    }

    fn render_departments(&mut self, selection: &DepartmentSelection) {
        self.push(Recorded::Departments(selection.entries().to_vec()));
    }

    fn render_results(&mut self, panel: &ResultsPanel) {
        self.push(Recorded::Results(panel.clone()));
    }

    fn clear_results(&mut self) {
        self.push(Recorded::Cleared);
    }
}
