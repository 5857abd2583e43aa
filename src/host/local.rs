//! File-backed host used by the command-line binary
//!
//! Items come from a JSON array:
//!
//! ```json
//! [
//!   {
//!     "params": { "inputVariables": [{ "name": "prompt", "value": "hi" }] },
//!     "binary": { "data": { "path": "input/contract.pdf" } }
//!   }
//! ]
//! ```
//!
//! Attachment paths are relative to the items file. Parameters missing from
//! an item fall back to the defaults derived from configuration.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::traits::Host;
use super::types::BinaryData;
use crate::error::BridgeError;
use crate::mime_types::get_mime_type;

#[derive(Debug, Error)]
pub enum LocalHostError {
    #[error("Failed to read items file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse items file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalItem {
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub binary: HashMap<String, LocalAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAttachment {
    pub path: PathBuf,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    defaults: Map<String, Value>,
    items: Vec<LocalItem>,
    base_dir: PathBuf,
    continue_on_fail: bool,
}

impl LocalHost {
    pub fn new(defaults: Map<String, Value>) -> Self {
        Self {
            defaults,
            base_dir: PathBuf::from("."),
            ..Self::default()
        }
    }

    /// Load items from a JSON file; attachment paths resolve against its directory
    pub fn with_items_file(mut self, path: &Path) -> Result<Self, LocalHostError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LocalHostError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let items: Vec<LocalItem> =
            serde_json::from_str(&raw).map_err(|source| LocalHostError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), count = items.len(), "Loaded items file");

        self.items.extend(items);
        self.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(self)
    }

    pub fn with_item(mut self, item: LocalItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }
}

#[async_trait]
impl Host for LocalHost {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn param(&self, name: &str, item: usize) -> Option<Value> {
        self.items
            .get(item)
            .and_then(|i| i.params.get(name))
            .or_else(|| self.defaults.get(name))
            .cloned()
    }

    async fn binary_attachment(
        &self,
        property: &str,
        item: usize,
    ) -> Result<Option<BinaryData>, BridgeError> {
        let Some(attachment) = self.items.get(item).and_then(|i| i.binary.get(property)) else {
            return Ok(None);
        };

        let path = self.base_dir.join(&attachment.path);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| BridgeError::Host(format!("cannot read {}: {}", path.display(), e)))?;

        let file_name = attachment.file_name.clone().unwrap_or_else(|| {
            attachment
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| property.to_string())
        });
        let mime_type = attachment
            .mime_type
            .clone()
            .unwrap_or_else(|| get_mime_type(&file_name).to_string());

        Ok(Some(BinaryData::new(bytes, file_name, mime_type)))
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_items_file_with_attachment() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("doc.pdf"), b"%PDF").unwrap();
        let items_path = temp_dir.path().join("items.json");
        fs::write(
            &items_path,
            r#"[
                {"params": {"timeout": 5}, "binary": {"data": {"path": "doc.pdf"}}},
                {"params": {}}
            ]"#,
        )
        .unwrap();

        let mut defaults = Map::new();
        defaults.insert("timeout".to_string(), json!(600));
        let host = LocalHost::new(defaults).with_items_file(&items_path).unwrap();

        assert_eq!(host.item_count(), 2);
        assert_eq!(host.param("timeout", 0), Some(json!(5)));
        assert_eq!(host.param("timeout", 1), Some(json!(600)));

        let data = host.binary_attachment("data", 0).await.unwrap().unwrap();
        assert_eq!(data.file_name, "doc.pdf");
        assert_eq!(data.mime_type, "application/pdf");
        assert_eq!(data.bytes.as_ref(), b"%PDF");

        assert!(host.binary_attachment("data", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_attachment_file_is_host_error() {
        let host = LocalHost::new(Map::new()).with_item(LocalItem {
            params: Map::new(),
            binary: [(
                "data".to_string(),
                LocalAttachment {
                    path: PathBuf::from("/nonexistent/file.bin"),
                    file_name: Some("renamed.bin".to_string()),
                    mime_type: None,
                },
            )]
            .into(),
        });

        let err = host.binary_attachment("data", 0).await.unwrap_err();
        assert!(matches!(err, BridgeError::Host(_)));
    }

    #[test]
    fn test_malformed_items_file() {
        let temp_dir = TempDir::new().unwrap();
        let items_path = temp_dir.path().join("items.json");
        fs::write(&items_path, "{not json").unwrap();

        let result = LocalHost::new(Map::new()).with_items_file(&items_path);
        assert!(matches!(result, Err(LocalHostError::Parse { .. })));
    }
}
