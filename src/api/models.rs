//! Wire models of the remote worker API.
//!
//! Status payloads are deliberately loose: only the completion markers and the
//! execution id are interpreted, every other field is carried through to the
//! host untouched.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::endpoints::ApiVariant;

/// Terminal values of the `status` discriminator (detail API)
pub const TERMINAL_STATUSES: &[&str] = &["completed", "failed", "error"];
const FAILED_STATUSES: &[&str] = &["failed", "error"];

/// Opaque execution identifier returned by submit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionHandle(String);

impl ExecutionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `{name, value}` pair of the submit payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVariable {
    pub name: String,
    pub value: String,
}

impl InputVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Status payload as reported by the worker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionStatus(Map<String, Value>);

impl ExecutionStatus {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn result(&self) -> Option<&Value> {
        self.0.get("result")
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// `id`, falling back to `workerId`
    pub fn id(&self) -> Option<String> {
        ["id", "workerId"]
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(scalar_to_string)
    }

    /// Completion predicate of the given API generation
    pub fn is_terminal(&self, variant: ApiVariant) -> bool {
        match variant {
            ApiVariant::Legacy => self.result().is_some_and(is_truthy),
            ApiVariant::Detail => self
                .status()
                .is_some_and(|status| TERMINAL_STATUSES.contains(&status)),
        }
    }

    /// Terminal and not reporting a remote-side failure
    pub fn is_success(&self, variant: ApiVariant) -> bool {
        if !self.is_terminal(variant) {
            return false;
        }
        match variant {
            ApiVariant::Legacy => !self
                .status()
                .is_some_and(|status| FAILED_STATUSES.contains(&status)),
            ApiVariant::Detail => self.status() == Some("completed"),
        }
    }
}

/// A `result` counts as present the way a JavaScript truthiness check would:
/// null, false, 0 and "" are absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Entry of the list-files response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFileDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Files of an execution, split into inputs and outputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileListing {
    #[serde(rename = "in", default)]
    pub inputs: Option<Vec<OutputFileDescriptor>>,
    #[serde(rename = "out", default)]
    pub outputs: Option<Vec<OutputFileDescriptor>>,
}

/// A produced file pulled from the worker
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub bytes: Bytes,
    pub mime_type: String,
}
