use bytes::Bytes;
use serde_json::{Map, Value, json};

/// Binary payload as the host stores it
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryData {
    pub bytes: Bytes,
    pub file_name: String,
    pub mime_type: String,
}

impl BinaryData {
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Per-item record handed back to the host
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRecord {
    /// Index of the input item this record belongs to
    pub paired_item: usize,
    pub json: Map<String, Value>,
    /// Named binary slots, in slot order
    pub binary: Vec<(String, BinaryData)>,
}

impl OutputRecord {
    pub fn new(paired_item: usize, json: Map<String, Value>) -> Self {
        Self {
            paired_item,
            json,
            binary: Vec::new(),
        }
    }

    /// `{error: <message>}`, emitted in place of a failed item
    pub fn error(paired_item: usize, message: impl Into<String>) -> Self {
        let mut json = Map::new();
        json.insert("error".to_string(), Value::String(message.into()));
        Self::new(paired_item, json)
    }

    pub fn binary_slot(&self, name: &str) -> Option<&BinaryData> {
        self.binary
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, data)| data)
    }

    pub fn is_error(&self) -> bool {
        self.json.contains_key("error") && self.json.len() == 1
    }

    /// JSON view including binary slot metadata, as printed by the CLI
    pub fn to_json(&self) -> Value {
        let binary: Map<String, Value> = self
            .binary
            .iter()
            .map(|(slot, data)| {
                (
                    slot.clone(),
                    json!({
                        "fileName": data.file_name,
                        "mimeType": data.mime_type,
                        "fileSize": data.size(),
                    }),
                )
            })
            .collect();

        json!({
            "pairedItem": self.paired_item,
            "json": self.json,
            "binary": binary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record() {
        let record = OutputRecord::error(3, "HTTP 500: boom");
        assert_eq!(record.paired_item, 3);
        assert_eq!(record.json["error"], "HTTP 500: boom");
        assert!(record.is_error());
        assert!(record.binary.is_empty());
    }

    #[test]
    fn test_binary_slot_lookup_and_json_view() {
        let mut record = OutputRecord::new(0, Map::new());
        record
            .binary
            .push(("data".to_string(), BinaryData::new(&b"abc"[..], "a.txt", "text/plain")));

        assert_eq!(record.binary_slot("data").unwrap().size(), 3);
        assert!(record.binary_slot("data0").is_none());

        let view = record.to_json();
        assert_eq!(view["binary"]["data"]["fileName"], "a.txt");
        assert_eq!(view["binary"]["data"]["fileSize"], 3);
        assert_eq!(view["pairedItem"], 0);
    }
}
