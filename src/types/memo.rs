//! Memo records and flattened notes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One logical note inside a memo record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MemoEntry {
    #[serde(default)]
    pub text: String,
    /// Name of the tool the note relates to, empty when untagged.
    #[serde(default)]
    pub tool: String,
}

/// Stored memo record holding a batch of entries.
///
/// The `entries` field tolerates malformed stored data: a missing, null, or
/// non-array value deserializes to `None` instead of failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub entries: Option<Vec<MemoEntry>>,
}

/// One flattened, individually renderable note.
///
/// `id` is the parent record's id; every note produced from the same record
/// shares it, so deleting by id removes the whole record and all of its
/// sibling notes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub tool: String,
}

/// Accept any JSON value for `entries`: arrays map item-by-item with
/// missing or non-string `text`/`tool` fields defaulting to empty strings,
/// anything else maps to `None`.
fn lenient_entries<'de, D>(deserializer: D) -> Result<Option<Vec<MemoEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(items) => {
            let entries = items
                .iter()
                .map(|item| MemoEntry {
                    text: string_field(item, "text"),
                    tool: string_field(item, "tool"),
                })
                .collect();
            Ok(Some(entries))
        }
        _ => Ok(None),
    }
}

fn string_field(item: &serde_json::Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
