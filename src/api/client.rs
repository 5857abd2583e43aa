use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

use super::models::{
    DownloadedFile, ExecutionHandle, ExecutionStatus, FileListing, InputVariable,
    scalar_to_string,
};
use crate::endpoints::{ApiVariant, Endpoints};
use crate::host::BinaryData;
use crate::mime_types::get_mime_type;
use crate::transport::{HttpClient, Result, TransportError};

/// Header carrying the static worker credential
pub const API_KEY_HEADER: &str = "ms-api-key";

/// Multipart field holding the JSON-encoded variable list
pub const VARIABLES_FIELD: &str = "inputVariables";

/// Multipart field used for every attached file
pub const FILES_FIELD: &str = "files";

/// Calls of the remote worker API, keyed by [`ExecutionHandle`]
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    /// API generation this client talks to
    fn variant(&self) -> ApiVariant;

    /// Start an execution. Not idempotent: each call creates a new one.
    async fn submit(
        &self,
        variables: &[InputVariable],
        attachments: Vec<BinaryData>,
    ) -> Result<ExecutionHandle>;

    async fn status(&self, handle: &ExecutionHandle) -> Result<ExecutionStatus>;

    async fn list_files(&self, handle: &ExecutionHandle) -> Result<FileListing>;

    async fn download_file(
        &self,
        handle: &ExecutionHandle,
        file_name: &str,
    ) -> Result<DownloadedFile>;
}

/// [`ExecutionApi`] over HTTP
#[derive(Debug, Clone)]
pub struct WorkerClient {
    http: HttpClient,
    endpoints: Endpoints,
    headers: Vec<(String, String)>,
}

impl WorkerClient {
    pub fn new(http: HttpClient, endpoints: Endpoints, api_key: &str) -> Self {
        Self {
            http,
            endpoints,
            headers: vec![(API_KEY_HEADER.to_string(), api_key.to_string())],
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl ExecutionApi for WorkerClient {
    fn variant(&self) -> ApiVariant {
        self.endpoints.variant()
    }

    async fn submit(
        &self,
        variables: &[InputVariable],
        attachments: Vec<BinaryData>,
    ) -> Result<ExecutionHandle> {
        let url = self.endpoints.submit();
        let encoded = serde_json::to_string(variables)
            .map_err(|e| TransportError::InvalidPart(e.to_string()))?;

        let attachment_count = attachments.len();
        let mut form = Form::new().text(VARIABLES_FIELD, encoded);
        for attachment in attachments {
            let part = Part::bytes(attachment.bytes.to_vec())
                .file_name(attachment.file_name)
                .mime_str(&attachment.mime_type)
                .map_err(|e| TransportError::InvalidPart(e.to_string()))?;
            form = form.part(FILES_FIELD, part);
        }

        debug!(
            url,
            variables = variables.len(),
            attachments = attachment_count,
            "Submitting execution"
        );

        let body = self.http.post_multipart(url, &self.headers, form).await?;
        let handle = extract_handle(self.variant(), &body, url)?;

        info!(url, execution_id = %handle, "Execution submitted");

        Ok(handle)
    }

    async fn status(&self, handle: &ExecutionHandle) -> Result<ExecutionStatus> {
        let url = self.endpoints.status(handle.as_str());
        let body = self.http.get_json(&url, &self.headers).await?;

        match body {
            Value::Object(fields) => Ok(ExecutionStatus::new(fields)),
            other => Err(TransportError::MalformedBody {
                url,
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    async fn list_files(&self, handle: &ExecutionHandle) -> Result<FileListing> {
        let url = self.endpoints.list_files(handle.as_str());
        let body = self.http.get_json(&url, &self.headers).await?;

        serde_json::from_value(body).map_err(|e| TransportError::MalformedBody {
            url,
            reason: e.to_string(),
        })
    }

    async fn download_file(
        &self,
        handle: &ExecutionHandle,
        file_name: &str,
    ) -> Result<DownloadedFile> {
        let url = self.endpoints.download_file(handle.as_str(), file_name);
        let bytes = self.http.get_bytes(&url, &self.headers).await?;

        Ok(DownloadedFile {
            file_name: file_name.to_string(),
            bytes,
            mime_type: get_mime_type(file_name).to_string(),
        })
    }
}

/// Pull the execution id out of a submit response.
///
/// The legacy API wraps it in `data`; the detail API returns it as the body
/// itself (a bare string, or an object carrying `id`/`executionId`).
pub fn extract_handle(variant: ApiVariant, body: &Value, url: &str) -> Result<ExecutionHandle> {
    // Some gateways double-encode the body as a JSON string
    let reparsed;
    let body = match body {
        Value::String(text) if text.trim_start().starts_with('{') => {
            reparsed = serde_json::from_str::<Value>(text).unwrap_or(Value::Null);
            &reparsed
        }
        other => other,
    };

    let id = match variant {
        ApiVariant::Legacy => body.get("data").and_then(scalar_to_string),
        ApiVariant::Detail => match body {
            Value::Object(fields) => ["id", "executionId"]
                .iter()
                .filter_map(|key| fields.get(*key))
                .find_map(scalar_to_string),
            other => scalar_to_string(other),
        },
    };

    id.map(ExecutionHandle::new)
        .ok_or_else(|| TransportError::MalformedBody {
            url: url.to_string(),
            reason: format!("no execution id in submit response ({})", json_kind(body)),
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
