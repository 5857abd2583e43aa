//! Output file retrieval

use tracing::{debug, info};

use crate::api::{DownloadedFile, ExecutionApi, ExecutionHandle};
use crate::error::Result;

/// List the execution's files and download every `out` entry.
///
/// Downloads run one after another in listing order. The first failed
/// download aborts the rest; nothing is retried and no partial result is
/// returned. Duplicate names are downloaded once per entry.
pub async fn download_all(
    api: &dyn ExecutionApi,
    handle: &ExecutionHandle,
) -> Result<Vec<DownloadedFile>> {
    let listing = api.list_files(handle).await?;
    let outputs = listing.outputs.unwrap_or_default();

    debug!(execution_id = %handle, count = outputs.len(), "Listed output files");

    let mut files = Vec::with_capacity(outputs.len());
    for descriptor in &outputs {
        let file = api.download_file(handle, &descriptor.file_name).await?;
        debug!(
            execution_id = %handle,
            file_name = %file.file_name,
            size = file.bytes.len(),
            "Output file downloaded"
        );
        files.push(file);
    }

    if !files.is_empty() {
        info!(execution_id = %handle, count = files.len(), "Output files downloaded");
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FileListing, OutputFileDescriptor};
    use crate::endpoints::ApiVariant;
    use crate::error::BridgeError;
    use crate::pipeline::test_helpers::ScriptedApi;
    use serde_json::Map;

    fn descriptor(name: &str) -> OutputFileDescriptor {
        OutputFileDescriptor {
            id: None,
            file_key: None,
            file_name: name.to_string(),
            created_at: None,
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_names_download_twice() {
        let api = ScriptedApi::new(ApiVariant::Legacy).with_listing(FileListing {
            inputs: None,
            outputs: Some(vec![descriptor("a.pdf"), descriptor("a.pdf")]),
        });

        let files = download_all(&api, &ExecutionHandle::new("E1")).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(api.downloads(), vec!["a.pdf", "a.pdf"]);
        assert!(files.iter().all(|f| f.mime_type == "application/pdf"));
    }

    #[tokio::test]
    async fn test_only_outputs_are_downloaded_in_order() {
        let api = ScriptedApi::new(ApiVariant::Legacy).with_listing(FileListing {
            inputs: Some(vec![descriptor("input.csv")]),
            outputs: Some(vec![descriptor("b.txt"), descriptor("a.png")]),
        });

        let files = download_all(&api, &ExecutionHandle::new("E1")).await.unwrap();

        assert_eq!(api.downloads(), vec!["b.txt", "a.png"]);
        assert_eq!(files[1].mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_null_outputs_yield_nothing() {
        let api = ScriptedApi::new(ApiVariant::Detail).with_listing(FileListing::default());

        let files = download_all(&api, &ExecutionHandle::new("E1")).await.unwrap();

        assert!(files.is_empty());
        assert_eq!(api.list_calls(), 1);
        assert!(api.downloads().is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_aborts_remaining() {
        let api = ScriptedApi::new(ApiVariant::Legacy)
            .with_listing(FileListing {
                inputs: None,
                outputs: Some(vec![descriptor("a.pdf"), descriptor("b.pdf"), descriptor("c.pdf")]),
            })
            .with_failing_download("b.pdf");

        let err = download_all(&api, &ExecutionHandle::new("E1")).await.unwrap_err();

        assert!(matches!(err, BridgeError::Transport(_)));
        assert_eq!(api.downloads(), vec!["a.pdf", "b.pdf"]);
    }
}
