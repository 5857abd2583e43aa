//! Host runtime contract
//!
//! The bridge runs inside a workflow host it does not control. This module
//! narrows that contract to what the pipeline needs.
//!
//! ## Key Components
//!
//! - [`Host`] - per-item parameters, binary attachments, continue-on-fail policy
//! - [`OutputSink`] - receives final records and optional per-poll progress
//! - [`MemoryHost`] - in-memory host for embedding and tests
//! - [`LocalHost`] - file-backed host used by the CLI
//!
//! ## Example
//!
//! ```rust,ignore
//! use workerbridge::host::{MemoryHost, MemoryItem};
//!
//! let host = MemoryHost::new(vec![MemoryItem::new().with_param("executionId", "E1")])
//!     .with_default("operation", "getStatus");
//! let mut records = Vec::new();
//! pipeline.run(&host, &mut records).await?;
//! ```

mod local;
mod memory;
mod traits;
pub(crate) mod types;

pub use local::{LocalAttachment, LocalHost, LocalHostError, LocalItem};
pub use memory::{MemoryHost, MemoryItem};
pub use traits::{CollectingSink, Host, OutputSink};
pub use types::{BinaryData, OutputRecord};
