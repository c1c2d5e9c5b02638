//! Memo record normalization
//!
//! Stored memo records each hold a batch of entries. Flattens them into a
//! uniform list of notes for display, tolerating malformed records.

use crate::types::{MemoRecord, Note};

/// Flatten memo records into individually renderable notes.
///
/// Records with a missing or invalid entry list contribute nothing. Every
/// note inherits its parent record's id, so notes from the same record
/// share an id and are deleted together. Output order is record order,
/// then entry order within each record.
///
/// # Examples
/// ```
/// use subtrack::services::normalizer::normalize_memos;
/// use subtrack::types::{MemoEntry, MemoRecord};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let record = MemoRecord {
///     id: Uuid::new_v4(),
///     created_at: Utc::now(),
///     entries: Some(vec![MemoEntry { text: "ship it".into(), tool: String::new() }]),
/// };
/// let notes = normalize_memos(&[record]);
/// assert_eq!(notes.len(), 1);
/// assert_eq!(notes[0].text, "ship it");
/// ```
pub fn normalize_memos(records: &[MemoRecord]) -> Vec<Note> {
    records
        .iter()
        .filter_map(|record| {
            let entries = record.entries.as_ref()?;
            Some(entries.iter().map(|entry| Note {
                id: record.id,
                text: entry.text.clone(),
                tool: entry.tool.clone(),
            }))
        })
        .flatten()
        .collect()
}
