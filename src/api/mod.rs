//! Remote worker API client
//!
//! - [`ExecutionApi`] - the four calls an execution goes through
//! - [`WorkerClient`] - HTTP implementation bound to one resolved worker
//! - [`models`] - loosely-typed wire payloads

mod client;
pub mod models;

pub use client::{
    API_KEY_HEADER, ExecutionApi, FILES_FIELD, VARIABLES_FIELD, WorkerClient, extract_handle,
};
pub use models::{
    DownloadedFile, ExecutionHandle, ExecutionStatus, FileListing, InputVariable,
    OutputFileDescriptor,
};
