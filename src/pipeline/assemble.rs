//! Result assembly: status payload + execution id + downloaded files into one
//! host record.

use serde_json::{Map, Value, json};

use crate::api::{DownloadedFile, ExecutionHandle, ExecutionStatus};
use crate::host::{BinaryData, OutputRecord};

pub const EXECUTION_ID_FIELD: &str = "executionId";
pub const OUTPUT_FILES_FIELD: &str = "outputFiles";

/// Slot names for `count` files: `data` for one, `data0..` for several
pub fn binary_slot_names(count: usize) -> Vec<String> {
    match count {
        1 => vec!["data".to_string()],
        n => (0..n).map(|i| format!("data{}", i)).collect(),
    }
}

/// Outcome of one synchronous execution
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub handle: ExecutionHandle,
    pub status: ExecutionStatus,
    pub files: Vec<DownloadedFile>,
    /// Terminal payload is success-shaped; failed remote runs still produce
    /// a report
    pub succeeded: bool,
}

impl ExecutionReport {
    pub fn into_record(self, paired_item: usize) -> OutputRecord {
        let mut json = self.status.into_fields();
        json.insert(
            EXECUTION_ID_FIELD.to_string(),
            Value::String(self.handle.to_string()),
        );

        let (descriptors, binary) = place_files(self.files);
        json.insert(OUTPUT_FILES_FIELD.to_string(), Value::Array(descriptors));

        OutputRecord {
            paired_item,
            json,
            binary,
        }
    }
}

/// Record for a submission that was not waited on
pub fn submitted_record(paired_item: usize, handle: &ExecutionHandle) -> OutputRecord {
    let mut json = Map::new();
    json.insert(
        EXECUTION_ID_FIELD.to_string(),
        Value::String(handle.to_string()),
    );
    OutputRecord::new(paired_item, json)
}

/// Record emitted on the progress stream after one poll
pub fn progress_record(
    paired_item: usize,
    handle: &ExecutionHandle,
    attempt: u32,
    status: &ExecutionStatus,
) -> OutputRecord {
    let mut json = Map::new();
    json.insert(
        EXECUTION_ID_FIELD.to_string(),
        Value::String(handle.to_string()),
    );
    json.insert("attempt".to_string(), json!(attempt));
    json.insert("status".to_string(), Value::Object(status.fields().clone()));
    OutputRecord::new(paired_item, json)
}

/// Record carrying downloaded files without a status payload
pub fn files_record(
    paired_item: usize,
    handle: &ExecutionHandle,
    files: Vec<DownloadedFile>,
) -> OutputRecord {
    let mut json = Map::new();
    json.insert(
        EXECUTION_ID_FIELD.to_string(),
        Value::String(handle.to_string()),
    );

    let (descriptors, binary) = place_files(files);
    json.insert(OUTPUT_FILES_FIELD.to_string(), Value::Array(descriptors));

    OutputRecord {
        paired_item,
        json,
        binary,
    }
}

/// Record for a single downloaded file, always in slot `data`
pub fn single_file_record(
    paired_item: usize,
    handle: &ExecutionHandle,
    file: DownloadedFile,
) -> OutputRecord {
    let mut json = Map::new();
    json.insert(
        EXECUTION_ID_FIELD.to_string(),
        Value::String(handle.to_string()),
    );
    json.insert("fileName".to_string(), json!(file.file_name));
    json.insert("mimeType".to_string(), json!(file.mime_type));
    json.insert("fileSize".to_string(), json!(file.bytes.len()));

    OutputRecord {
        paired_item,
        json,
        binary: vec![("data".to_string(), into_binary(file))],
    }
}

fn place_files(files: Vec<DownloadedFile>) -> (Vec<Value>, Vec<(String, BinaryData)>) {
    let slots = binary_slot_names(files.len());

    files
        .into_iter()
        .zip(slots)
        .map(|(file, slot)| {
            let descriptor = json!({
                "fileName": file.file_name,
                "mimeType": file.mime_type,
                "fileSize": file.bytes.len(),
                "binaryProperty": slot,
            });
            (descriptor, (slot, into_binary(file)))
        })
        .unzip()
}

fn into_binary(file: DownloadedFile) -> BinaryData {
    BinaryData {
        bytes: file.bytes,
        file_name: file.file_name,
        mime_type: file.mime_type,
    }
}
