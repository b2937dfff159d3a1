//! HTTP adapter for the seating backend's two endpoints.

use crate::error::{RemoteError, SeatingError};
use crate::model::{ClientConfig, GenerateRequest, ResultSet, UploadResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

pub const UPLOAD_PATH: &str = "/upload";
pub const GENERATE_PATH: &str = "/generate_seating";

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";

/// Outbound calls made by the workflow. One shot each: no retry, no timeout.
#[async_trait]
pub trait SeatingTransport: Send + Sync {
    async fn upload(&self, file: &Path) -> Result<UploadResult, SeatingError>;
    async fn generate(&self, request: &GenerateRequest) -> Result<ResultSet, SeatingError>;
}

/// Either the `{ error }` body or the endpoint's success payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Failure(RemoteError),
    Success(T),
}

#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, SeatingError> {
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            SeatingError::transport(format!("Failed to read response from {path}: {e}"))
        })?;

        match serde_json::from_slice::<Reply<T>>(&body) {
            Ok(Reply::Failure(remote)) => {
                tracing::warn!(endpoint = path, %status, error = %remote.error, "server reported error");
                Err(SeatingError::Remote(remote))
            }
            Ok(Reply::Success(_)) if !status.is_success() => Err(SeatingError::transport(
                format!("Request to {path} failed with status {status}"),
            )),
            Ok(Reply::Success(v)) => Ok(v),
            Err(e) if status.is_success() => Err(SeatingError::transport(format!(
                "Invalid response from {path}: {e}"
            ))),
            Err(_) => Err(SeatingError::transport(format!(
                "Request to {path} failed with status {status}"
            ))),
        }
    }
}

/// Every seat needs a room and a department to be grouped and listed.
fn check_seats(records: &ResultSet) -> Result<(), SeatingError> {
    for (i, r) in records.iter().enumerate() {
        if r.room.trim().is_empty() || r.department.trim().is_empty() {
            return Err(SeatingError::transport(format!(
                "Invalid response from {GENERATE_PATH}: record {i} has an empty room or department"
            )));
        }
    }
    Ok(())
}

pub fn mime_for(file: &Path) -> &'static str {
    let is_xls = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("xls"))
        .unwrap_or(false);
    if is_xls {
        XLS_MIME
    } else {
        XLSX_MIME
    }
}

#[async_trait]
impl SeatingTransport for HttpTransport {
    async fn upload(&self, file: &Path) -> Result<UploadResult, SeatingError> {
        let data = tokio::fs::read(file).await.map_err(|e| {
            SeatingError::transport(format!("Could not read {}: {e}", file.display()))
        })?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("roster.xlsx")
            .to_string();

        tracing::debug!(endpoint = UPLOAD_PATH, bytes = data.len(), file = %file_name, "sending upload");
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime_for(file))
            .map_err(|e| SeatingError::transport(format!("Invalid upload part: {e}")))?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SeatingError::transport(format!("Upload request failed: {e}")))?;

        Self::decode(UPLOAD_PATH, resp).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ResultSet, SeatingError> {
        tracing::debug!(
            endpoint = GENERATE_PATH,
            departments = request.departments.len(),
            classrooms = request.classrooms,
            students_per_class = request.students_per_class,
            "sending generate"
        );
        let resp = self
            .http
            .post(self.url(GENERATE_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| SeatingError::transport(format!("Generate request failed: {e}")))?;

        let records = Self::decode(GENERATE_PATH, resp).await?;
        check_seats(&records)?;
        Ok(records)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
