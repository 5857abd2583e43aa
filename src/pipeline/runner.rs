//! Item runner: drives each input item through submit, poll, retrieve and
//! assemble, strictly one item after another.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::assemble::{
    EXECUTION_ID_FIELD, ExecutionReport, files_record, progress_record, single_file_record,
    submitted_record,
};
use super::params::{ExecuteParams, ItemParams, ItemRequest};
use super::poller::{Clock, TokioClock, poll_since};
use super::retriever::download_all;
use crate::api::{ExecutionApi, ExecutionHandle, WorkerClient};
use crate::endpoints::Endpoints;
use crate::error::{BridgeError, Result};
use crate::host::{Host, OutputRecord, OutputSink};
use crate::observability::RunMetrics;
use crate::transport::{HttpClient, TransportError};

/// Runs host items against the worker API
pub struct Pipeline {
    http: HttpClient,
    clock: Arc<dyn Clock>,
    metrics: Arc<RunMetrics>,
}

impl Pipeline {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            clock: Arc::new(TokioClock),
            metrics: Arc::new(RunMetrics::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(&self) -> Arc<RunMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Process every host item in order, emitting one record per item.
    ///
    /// A failed item becomes an `{error}` record when the host allows
    /// continuing; otherwise the run stops and later items are never started.
    pub async fn run<H, S>(&self, host: &H, sink: &mut S) -> Result<()>
    where
        H: Host + ?Sized,
        S: OutputSink + ?Sized,
    {
        let total = host.item_count();
        info!(items = total, "Starting bridge run");

        for item in 0..total {
            match self.process_item(host, sink, item).await {
                Ok(record) => {
                    self.metrics.item_succeeded();
                    sink.emit_item(record);
                }
                Err(e) if host.continue_on_fail() => {
                    self.metrics.item_failed();
                    warn!(item, code = e.code(), error = %e, "Item failed, continuing");
                    sink.emit_item(OutputRecord::error(item, e.to_string()));
                }
                Err(e) => {
                    self.metrics.item_failed();
                    error!(item, code = e.code(), error = %e, "Item failed, aborting run");
                    return Err(e);
                }
            }
        }

        info!(items = total, "Bridge run finished");
        Ok(())
    }

    /// Read one item's parameters and run it against its worker
    pub async fn process_item<H, S>(&self, host: &H, sink: &mut S, item: usize) -> Result<OutputRecord>
    where
        H: Host + ?Sized,
        S: OutputSink + ?Sized,
    {
        let params = ItemParams::read(host, item)?;
        let endpoints = Endpoints::resolve(&params.target.url, params.target.variant);

        info!(
            item,
            operation = %params.operation(),
            submit_url = endpoints.submit(),
            variant = %params.target.variant,
            "Processing item"
        );

        let client = WorkerClient::new(self.http.clone(), endpoints, &params.target.api_key);
        self.dispatch(&client, host, sink, item, params.request).await
    }

    /// Run one already-parsed request against `api`
    pub async fn dispatch<H, S>(
        &self,
        api: &dyn ExecutionApi,
        host: &H,
        sink: &mut S,
        item: usize,
        request: ItemRequest,
    ) -> Result<OutputRecord>
    where
        H: Host + ?Sized,
        S: OutputSink + ?Sized,
    {
        match request {
            ItemRequest::Execute(exec) => {
                // The deadline counts from submission, not from the first poll
                let started = self.clock.now();
                let handle = self.submit(api, host, item, &exec).await?;
                if !exec.wait_for_completion {
                    return Ok(submitted_record(item, &handle));
                }
                let report = self
                    .await_completion(api, sink, item, handle, &exec, started)
                    .await?;
                Ok(report.into_record(item))
            }
            ItemRequest::GetStatus { execution_id } => {
                let handle = ExecutionHandle::new(execution_id);
                let mut json = api.status(&handle).await?.into_fields();
                json.insert(
                    EXECUTION_ID_FIELD.to_string(),
                    Value::String(handle.to_string()),
                );
                Ok(OutputRecord::new(item, json))
            }
            ItemRequest::ListFiles { execution_id } => {
                let handle = ExecutionHandle::new(execution_id);
                let listing = api.list_files(&handle).await?;
                let mut json = match serde_json::to_value(&listing) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) => serde_json::Map::new(),
                    Err(e) => {
                        return Err(TransportError::MalformedBody {
                            url: handle.to_string(),
                            reason: e.to_string(),
                        }
                        .into());
                    }
                };
                json.insert(
                    EXECUTION_ID_FIELD.to_string(),
                    Value::String(handle.to_string()),
                );
                Ok(OutputRecord::new(item, json))
            }
            ItemRequest::DownloadFile {
                execution_id,
                file_name,
            } => {
                let handle = ExecutionHandle::new(execution_id);
                let file = api.download_file(&handle, &file_name).await?;
                self.metrics.files_downloaded(1);
                Ok(single_file_record(item, &handle, file))
            }
            ItemRequest::DownloadAll { execution_id } => {
                let handle = ExecutionHandle::new(execution_id);
                let files = download_all(api, &handle).await?;
                self.metrics.files_downloaded(files.len());
                Ok(files_record(item, &handle, files))
            }
        }
    }

    /// Resolve attachments and start the execution
    pub async fn submit<H>(
        &self,
        api: &dyn ExecutionApi,
        host: &H,
        item: usize,
        exec: &ExecuteParams,
    ) -> Result<ExecutionHandle>
    where
        H: Host + ?Sized,
    {
        let mut attachments = Vec::with_capacity(exec.binary_properties.len());
        for property in &exec.binary_properties {
            let data = host.binary_attachment(property, item).await?.ok_or_else(|| {
                BridgeError::AttachmentNotFound {
                    property: property.clone(),
                    item,
                }
            })?;
            attachments.push(data);
        }

        let handle = api.submit(&exec.variables, attachments).await?;
        self.metrics.execution_submitted();
        Ok(handle)
    }

    /// Poll to a terminal payload, then download outputs when asked to and
    /// the execution succeeded. The poll deadline runs from `started`.
    pub async fn await_completion<S>(
        &self,
        api: &dyn ExecutionApi,
        sink: &mut S,
        item: usize,
        handle: ExecutionHandle,
        exec: &ExecuteParams,
        started: Instant,
    ) -> Result<ExecutionReport>
    where
        S: OutputSink + ?Sized,
    {
        let metrics = &self.metrics;
        let emit_progress = exec.emit_progress;

        let status = poll_since(
            api,
            &handle,
            exec.polling,
            self.clock.as_ref(),
            started,
            |attempt, status| {
                metrics.poll_issued();
                if emit_progress {
                    sink.emit_progress(progress_record(item, &handle, attempt, status));
                }
            },
        )
        .await?;

        let succeeded = status.is_success(api.variant());
        if !succeeded {
            let remote_status = status.status().unwrap_or("unknown").to_string();
            if exec.fail_on_remote_error {
                return Err(BridgeError::RemoteFailure {
                    execution_id: handle.to_string(),
                    status: remote_status,
                });
            }
            warn!(execution_id = %handle, status = %remote_status, "Remote execution did not succeed");
        }

        let files = if exec.auto_download && succeeded {
            let files = download_all(api, &handle).await?;
            self.metrics.files_downloaded(files.len());
            files
        } else {
            Vec::new()
        };

        Ok(ExecutionReport {
            handle,
            status,
            files,
            succeeded,
        })
    }
}
