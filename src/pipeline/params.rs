//! Typed view of the per-item parameters a host supplies

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::poller::PollSettings;
use crate::api::InputVariable;
use crate::endpoints::ApiVariant;
use crate::error::{BridgeError, Result};
use crate::host::Host;
use crate::humanize::HumanDuration;

pub const OPERATION: &str = "operation";
pub const WORKER_URL: &str = "workerUrl";
pub const API_KEY: &str = "apiKey";
pub const API_VARIANT: &str = "apiVariant";
pub const INPUT_VARIABLES: &str = "inputVariables";
pub const BINARY_PROPERTIES: &str = "binaryProperties";
pub const WAIT_FOR_COMPLETION: &str = "waitForCompletion";
pub const POLLING_INTERVAL: &str = "pollingInterval";
pub const TIMEOUT: &str = "timeout";
pub const AUTO_DOWNLOAD: &str = "autoDownload";
pub const EMIT_PROGRESS: &str = "emitProgress";
pub const FAIL_ON_REMOTE_ERROR: &str = "failOnRemoteError";
pub const EXECUTION_ID: &str = "executionId";
pub const FILE_NAME: &str = "fileName";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Execute,
    GetStatus,
    ListFiles,
    DownloadFile,
    DownloadAll,
}

impl FromStr for Operation {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "execute" => Ok(Operation::Execute),
            "getStatus" => Ok(Operation::GetStatus),
            "listFiles" => Ok(Operation::ListFiles),
            "downloadFile" => Ok(Operation::DownloadFile),
            "downloadAll" => Ok(Operation::DownloadAll),
            other => Err(BridgeError::invalid_parameter(
                OPERATION,
                format!("unknown operation '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Execute => "execute",
            Operation::GetStatus => "getStatus",
            Operation::ListFiles => "listFiles",
            Operation::DownloadFile => "downloadFile",
            Operation::DownloadAll => "downloadAll",
        };
        f.write_str(name)
    }
}

/// Which worker to talk to and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerTarget {
    pub url: String,
    pub api_key: String,
    pub variant: ApiVariant,
}

/// Parameters of the `execute` operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteParams {
    pub variables: Vec<InputVariable>,
    pub binary_properties: Vec<String>,
    pub wait_for_completion: bool,
    pub polling: PollSettings,
    pub auto_download: bool,
    pub emit_progress: bool,
    pub fail_on_remote_error: bool,
}

impl Default for ExecuteParams {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            binary_properties: Vec::new(),
            wait_for_completion: true,
            polling: PollSettings::default(),
            auto_download: true,
            emit_progress: false,
            fail_on_remote_error: false,
        }
    }
}

/// Everything one item asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRequest {
    Execute(ExecuteParams),
    GetStatus { execution_id: String },
    ListFiles { execution_id: String },
    DownloadFile { execution_id: String, file_name: String },
    DownloadAll { execution_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemParams {
    pub target: WorkerTarget,
    pub request: ItemRequest,
}

impl ItemParams {
    /// Read and validate the parameters of `item`
    pub fn read(host: &(impl Host + ?Sized), item: usize) -> Result<Self> {
        let reader = ParamReader { host, item };

        let operation = match reader.string(OPERATION)? {
            Some(op) => op.parse()?,
            None => Operation::default(),
        };

        let target = WorkerTarget {
            url: reader.required_string(WORKER_URL)?,
            api_key: reader.required_string(API_KEY)?,
            variant: match reader.string(API_VARIANT)? {
                Some(v) => v
                    .parse()
                    .map_err(|e: crate::endpoints::UnknownVariant| {
                        BridgeError::invalid_parameter(API_VARIANT, e.to_string())
                    })?,
                None => ApiVariant::default(),
            },
        };

        let request = match operation {
            Operation::Execute => {
                let defaults = ExecuteParams::default();
                ItemRequest::Execute(ExecuteParams {
                    variables: reader.variables(INPUT_VARIABLES)?,
                    binary_properties: reader.property_list(BINARY_PROPERTIES)?,
                    wait_for_completion: reader
                        .bool(WAIT_FOR_COMPLETION)?
                        .unwrap_or(defaults.wait_for_completion),
                    polling: reader.polling(defaults.polling)?,
                    auto_download: reader.bool(AUTO_DOWNLOAD)?.unwrap_or(defaults.auto_download),
                    emit_progress: reader.bool(EMIT_PROGRESS)?.unwrap_or(defaults.emit_progress),
                    fail_on_remote_error: reader
                        .bool(FAIL_ON_REMOTE_ERROR)?
                        .unwrap_or(defaults.fail_on_remote_error),
                })
            }
            Operation::GetStatus => ItemRequest::GetStatus {
                execution_id: reader.required_id(EXECUTION_ID)?,
            },
            Operation::ListFiles => ItemRequest::ListFiles {
                execution_id: reader.required_id(EXECUTION_ID)?,
            },
            Operation::DownloadFile => ItemRequest::DownloadFile {
                execution_id: reader.required_id(EXECUTION_ID)?,
                file_name: reader.required_string(FILE_NAME)?,
            },
            Operation::DownloadAll => ItemRequest::DownloadAll {
                execution_id: reader.required_id(EXECUTION_ID)?,
            },
        };

        Ok(Self { target, request })
    }

    pub fn operation(&self) -> Operation {
        match self.request {
            ItemRequest::Execute(_) => Operation::Execute,
            ItemRequest::GetStatus { .. } => Operation::GetStatus,
            ItemRequest::ListFiles { .. } => Operation::ListFiles,
            ItemRequest::DownloadFile { .. } => Operation::DownloadFile,
            ItemRequest::DownloadAll { .. } => Operation::DownloadAll,
        }
    }
}

struct ParamReader<'a, H: Host + ?Sized> {
    host: &'a H,
    item: usize,
}

impl<H: Host + ?Sized> ParamReader<'_, H> {
    fn get(&self, name: &str) -> Option<Value> {
        self.host
            .param(name, self.item)
            .filter(|value| !value.is_null())
    }

    fn string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(mistyped(name, "a string", &other)),
        }
    }

    fn required_string(&self, name: &str) -> Result<String> {
        self.string(name)?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BridgeError::invalid_parameter(name, "required"))
    }

    /// Ids are accepted as strings or numbers
    fn required_id(&self, name: &str) -> Result<String> {
        match self.get(name) {
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => self.required_string(name),
        }
    }

    fn bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Some(true)),
                "false" | "no" | "0" => Ok(Some(false)),
                _ => Err(BridgeError::invalid_parameter(name, format!("not a boolean: '{}'", s))),
            },
            Some(other) => Err(mistyped(name, "a boolean", &other)),
        }
    }

    /// Numbers are seconds; strings use the human duration syntax
    fn duration(&self, name: &str) -> Result<Option<Duration>> {
        let parsed = match self.get(name) {
            None => return Ok(None),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(secs) => HumanDuration::from_secs_f64(secs),
                None => return Err(mistyped(name, "a duration", &Value::Number(n))),
            },
            Some(Value::String(s)) => s.parse::<HumanDuration>(),
            Some(other) => return Err(mistyped(name, "a duration", &other)),
        };

        parsed
            .map(|d| Some(d.as_duration()))
            .map_err(|e| BridgeError::invalid_parameter(name, e.to_string()))
    }

    /// Interval must be positive and no longer than the timeout
    fn polling(&self, defaults: PollSettings) -> Result<PollSettings> {
        let interval = self.duration(POLLING_INTERVAL)?.unwrap_or(defaults.interval);
        let timeout = self.duration(TIMEOUT)?.unwrap_or(defaults.timeout);

        if interval.is_zero() {
            return Err(BridgeError::invalid_parameter(
                POLLING_INTERVAL,
                "must be greater than zero",
            ));
        }
        if timeout < interval {
            return Err(BridgeError::invalid_parameter(
                TIMEOUT,
                format!("{:?} is shorter than the polling interval {:?}", timeout, interval),
            ));
        }

        Ok(PollSettings { interval, timeout })
    }

    /// Array of `{name, value}` objects, or the same array as JSON text
    fn variables(&self, name: &str) -> Result<Vec<InputVariable>> {
        let value = match self.get(name) {
            None => return Ok(Vec::new()),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(Vec::new()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(&text)
                .map_err(|e| BridgeError::invalid_parameter(name, e.to_string()))?,
            Some(other) => other,
        };

        let entries = match value {
            Value::Array(entries) => entries,
            other => return Err(mistyped(name, "an array of {name, value}", &other)),
        };

        entries
            .into_iter()
            .map(|entry| {
                let var_name = entry.get("name").and_then(Value::as_str).ok_or_else(|| {
                    BridgeError::invalid_parameter(name, "every variable needs a string 'name'")
                })?;
                let var_value = match entry.get("value") {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                Ok(InputVariable::new(var_name, var_value))
            })
            .collect()
    }

    /// Comma-separated property names; blanks are dropped
    fn property_list(&self, name: &str) -> Result<Vec<String>> {
        let names = match self.get(name) {
            None => Vec::new(),
            Some(Value::String(s)) => s.split(',').map(|p| p.trim().to_string()).collect(),
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(|| mistyped(name, "a list of strings", v))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => return Err(mistyped(name, "a comma-separated string", &other)),
        };

        Ok(names.into_iter().filter(|p| !p.is_empty()).collect())
    }
}

fn mistyped(name: &str, expected: &str, actual: &Value) -> BridgeError {
    BridgeError::invalid_parameter(name, format!("expected {}, got {}", expected, actual))
}
