use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::traits::Host;
use super::types::BinaryData;
use crate::error::BridgeError;

/// One input item: parameter overrides plus binary properties
#[derive(Debug, Clone, Default)]
pub struct MemoryItem {
    pub params: Map<String, Value>,
    pub binary: HashMap<String, BinaryData>,
}

impl MemoryItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_binary(mut self, property: impl Into<String>, data: BinaryData) -> Self {
        self.binary.insert(property.into(), data);
        self
    }
}

/// In-memory [`Host`]: item parameters fall back to shared defaults
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    defaults: Map<String, Value>,
    items: Vec<MemoryItem>,
    continue_on_fail: bool,
}

impl MemoryHost {
    pub fn new(items: Vec<MemoryItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults.extend(defaults);
        self
    }

    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    pub fn with_continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn push_item(&mut self, item: MemoryItem) {
        self.items.push(item);
    }
}

#[async_trait]
impl Host for MemoryHost {
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
        Ok(self
            .items
            .get(item)
            .and_then(|i| i.binary.get(property))
            .cloned())
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_item_params_override_defaults() {
        let host = MemoryHost::new(vec![
            MemoryItem::new().with_param("timeout", 30),
            MemoryItem::new(),
        ])
        .with_default("timeout", 600)
        .with_default("workerUrl", "https://x.io/w");

        assert_eq!(host.item_count(), 2);
        assert_eq!(host.param("timeout", 0), Some(json!(30)));
        assert_eq!(host.param("timeout", 1), Some(json!(600)));
        assert_eq!(host.param("workerUrl", 0), Some(json!("https://x.io/w")));
        assert_eq!(host.param("missing", 0), None);
    }

    #[tokio::test]
    async fn test_binary_lookup_is_per_item() {
        let data = BinaryData::new(&b"x"[..], "x.txt", "text/plain");
        let host = MemoryHost::new(vec![
            MemoryItem::new().with_binary("data", data.clone()),
            MemoryItem::new(),
        ]);

        assert_eq!(host.binary_attachment("data", 0).await.unwrap(), Some(data));
        assert_eq!(host.binary_attachment("data", 1).await.unwrap(), None);
        assert_eq!(host.binary_attachment("data", 9).await.unwrap(), None);
    }
}
