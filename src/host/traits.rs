use async_trait::async_trait;
use serde_json::Value;

use super::types::{BinaryData, OutputRecord};
use crate::error::BridgeError;

/// Read side of the host runtime contract
///
/// The host owns parameter values, credentials and binary storage; the
/// bridge only ever asks for them by name and item index.
#[async_trait]
pub trait Host: Send + Sync {
    /// Number of input items in this invocation
    fn item_count(&self) -> usize;

    /// Parameter value for one item, `None` when unset
    fn param(&self, name: &str, item: usize) -> Option<Value>;

    /// Resolve a binary property of one item, `Ok(None)` when the item has no
    /// such property
    async fn binary_attachment(
        &self,
        property: &str,
        item: usize,
    ) -> Result<Option<BinaryData>, BridgeError>;

    /// Whether a failed item becomes an `{error}` record instead of aborting
    fn continue_on_fail(&self) -> bool {
        false
    }
}

/// Write side of the host runtime contract
pub trait OutputSink: Send {
    /// Final record of an item, in input order
    fn emit_item(&mut self, record: OutputRecord);

    /// Intermediate record emitted once per poll iteration
    fn emit_progress(&mut self, _record: OutputRecord) {}
}

impl OutputSink for Vec<OutputRecord> {
    fn emit_item(&mut self, record: OutputRecord) {
        self.push(record);
    }
}

/// Sink keeping both output streams
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub items: Vec<OutputRecord>,
    pub progress: Vec<OutputRecord>,
}

impl OutputSink for CollectingSink {
    fn emit_item(&mut self, record: OutputRecord) {
        self.items.push(record);
    }

    fn emit_progress(&mut self, record: OutputRecord) {
        self.progress.push(record);
    }
}
