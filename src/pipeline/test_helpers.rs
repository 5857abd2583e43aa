//! Scripted [`ExecutionApi`] for pipeline unit tests

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{
    DownloadedFile, ExecutionApi, ExecutionHandle, ExecutionStatus, FileListing, InputVariable,
};
use crate::endpoints::ApiVariant;
use crate::host::BinaryData;
use crate::mime_types::get_mime_type;
use crate::pipeline::poller::ManualClock;
use crate::transport::{Result, TransportError};

pub(crate) fn status(value: Value) -> ExecutionStatus {
    serde_json::from_value(value).expect("status fixture must be an object")
}

pub(crate) struct ScriptedApi {
    variant: ApiVariant,
    handle: String,
    submit_error: Mutex<Option<TransportError>>,
    submit_delay: Option<(Arc<ManualClock>, Duration)>,
    statuses: Mutex<VecDeque<ExecutionStatus>>,
    fallback_status: Option<ExecutionStatus>,
    status_error: Mutex<Option<TransportError>>,
    listing: FileListing,
    failing_downloads: HashSet<String>,
    submitted: Mutex<Vec<(Vec<InputVariable>, Vec<BinaryData>)>>,
    downloads: Mutex<Vec<String>>,
    status_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl ScriptedApi {
    pub(crate) fn new(variant: ApiVariant) -> Self {
        Self {
            variant,
            handle: "E1".to_string(),
            submit_error: Mutex::new(None),
            submit_delay: None,
            statuses: Mutex::new(VecDeque::new()),
            fallback_status: None,
            status_error: Mutex::new(None),
            listing: FileListing::default(),
            failing_downloads: HashSet::new(),
            submitted: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_handle(mut self, handle: &str) -> Self {
        self.handle = handle.to_string();
        self
    }

    pub(crate) fn with_submit_error(self, error: TransportError) -> Self {
        *self.submit_error.lock().unwrap() = Some(error);
        self
    }

    /// Submit advances `clock` by `delay` before answering
    pub(crate) fn with_submit_delay(mut self, clock: Arc<ManualClock>, delay: Duration) -> Self {
        self.submit_delay = Some((clock, delay));
        self
    }

    pub(crate) fn with_statuses(self, statuses: Vec<ExecutionStatus>) -> Self {
        self.statuses.lock().unwrap().extend(statuses);
        self
    }

    /// Returned once the scripted statuses run out
    pub(crate) fn with_fallback_status(mut self, status: ExecutionStatus) -> Self {
        self.fallback_status = Some(status);
        self
    }

    pub(crate) fn with_status_error(self, error: TransportError) -> Self {
        *self.status_error.lock().unwrap() = Some(error);
        self
    }

    pub(crate) fn with_listing(mut self, listing: FileListing) -> Self {
        self.listing = listing;
        self
    }

    pub(crate) fn with_failing_download(mut self, file_name: &str) -> Self {
        self.failing_downloads.insert(file_name.to_string());
        self
    }

    pub(crate) fn submitted(&self) -> Vec<(Vec<InputVariable>, Vec<BinaryData>)> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionApi for ScriptedApi {
    fn variant(&self) -> ApiVariant {
        self.variant
    }

    async fn submit(
        &self,
        variables: &[InputVariable],
        attachments: Vec<BinaryData>,
    ) -> Result<ExecutionHandle> {
        if let Some((clock, delay)) = &self.submit_delay {
            clock.advance(*delay);
        }
        if let Some(error) = self.submit_error.lock().unwrap().take() {
            return Err(error);
        }
        self.submitted
            .lock()
            .unwrap()
            .push((variables.to_vec(), attachments));
        Ok(ExecutionHandle::new(self.handle.clone()))
    }

    async fn status(&self, _handle: &ExecutionHandle) -> Result<ExecutionStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.status_error.lock().unwrap().take() {
            return Err(error);
        }

        let next = self.statuses.lock().unwrap().pop_front();
        next.or_else(|| self.fallback_status.clone())
            .ok_or_else(|| TransportError::MalformedBody {
                url: "scripted".to_string(),
                reason: "status script exhausted".to_string(),
            })
    }

    async fn list_files(&self, _handle: &ExecutionHandle) -> Result<FileListing> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.listing.clone())
    }

    async fn download_file(
        &self,
        _handle: &ExecutionHandle,
        file_name: &str,
    ) -> Result<DownloadedFile> {
        self.downloads.lock().unwrap().push(file_name.to_string());

        if self.failing_downloads.contains(file_name) {
            return Err(TransportError::Status {
                status: 404,
                body: "Not Found".to_string(),
            });
        }

        Ok(DownloadedFile {
            file_name: file_name.to_string(),
            bytes: Bytes::from(format!("content of {}", file_name)),
            mime_type: get_mime_type(file_name).to_string(),
        })
    }
}
