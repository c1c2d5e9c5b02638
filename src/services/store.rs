//! JSON document store for usage, plan, and memo records
//!
//! All records live in a single document at `~/.subtrack/store.json`.
//! Mutations re-read the document under an exclusive file lock before
//! writing it back, so concurrent invocations cannot lose an appended
//! usage timestamp to a read-modify-write race.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::BaseDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    MemoEntry, MemoRecord, Plan, PlanAssignment, Result, SubtrackError, UsageRecord,
};

const STORE_FILE: &str = "store.json";

/// On-disk document holding every stored record set.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub usage: Vec<UsageRecord>,
    #[serde(default)]
    pub plans: Vec<PlanAssignment>,
    #[serde(default)]
    pub memos: Vec<MemoRecord>,
}

/// File-backed store exposing async request/response methods.
///
/// The statistics functions never touch this type; callers fetch record
/// sets here and pass them on as plain slices.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store at the default location (`~/.subtrack/store.json`).
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| SubtrackError::Store("Cannot determine home directory".into()))?;
        let dir = base_dirs.home_dir().join(".subtrack");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(STORE_FILE),
        })
    }

    /// Create a store with a custom document path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn fetch_usage_records(&self) -> Result<Vec<UsageRecord>> {
        Ok(self.read_document().await?.usage)
    }

    pub async fn fetch_plan_assignments(&self) -> Result<Vec<PlanAssignment>> {
        Ok(self.read_document().await?.plans)
    }

    pub async fn fetch_memo_records(&self) -> Result<Vec<MemoRecord>> {
        Ok(self.read_document().await?.memos)
    }

    /// Record a use of `service_name` at `at`, creating the usage record on
    /// first use and appending to it afterwards.
    pub async fn append_usage(&self, service_name: &str, at: DateTime<Utc>) -> Result<()> {
        let service_name = service_name.to_string();
        self.update(move |doc| {
            match doc
                .usage
                .iter_mut()
                .find(|r| r.service_name == service_name)
            {
                Some(record) => record.record_use(at),
                None => {
                    let mut record = UsageRecord::new(&service_name);
                    record.record_use(at);
                    doc.usage.push(record);
                }
            }
        })
        .await
    }

    /// Assign `plan` to `service_name`, replacing any existing assignment.
    pub async fn upsert_plan(&self, service_name: &str, plan: Plan) -> Result<()> {
        let service_name = service_name.to_string();
        self.update(move |doc| {
            match doc
                .plans
                .iter_mut()
                .find(|a| a.service_name == service_name)
            {
                Some(assignment) => assignment.plan = plan,
                None => doc.plans.push(PlanAssignment { service_name, plan }),
            }
        })
        .await
    }

    /// Store a batch of entries as one memo record, returning its id.
    pub async fn add_memo(&self, entries: Vec<MemoEntry>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        self.update(move |doc| {
            doc.memos.push(MemoRecord {
                id,
                created_at,
                entries: Some(entries),
            });
        })
        .await?;
        Ok(id)
    }

    /// Delete the memo record with `id`. The whole record goes, including
    /// every note it holds. Returns whether a record was removed.
    pub async fn delete_memo(&self, id: Uuid) -> Result<bool> {
        self.update(move |doc| {
            let before = doc.memos.len();
            doc.memos.retain(|m| m.id != id);
            doc.memos.len() != before
        })
        .await
    }

    async fn read_document(&self) -> Result<StoreDocument> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_document(&path))
            .await
            .map_err(|e| SubtrackError::Store(format!("store task failed: {}", e)))?
    }

    async fn update<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut StoreDocument) -> R + Send + 'static,
        R: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::modify_document(&path, mutate))
            .await
            .map_err(|e| SubtrackError::Store(format!("store task failed: {}", e)))?
    }

    /// Load the document with a shared lock. A missing file is the empty
    /// document, not an error.
    fn load_document(path: &Path) -> Result<StoreDocument> {
        if !path.exists() {
            return Ok(StoreDocument::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut content = String::new();
        let mut reader = BufReader::new(&file);
        let read_result = reader.read_to_string(&mut content);
        let _ = file.unlock();
        read_result?;

        Self::parse_document(&content)
    }

    fn parse_document(content: &str) -> Result<StoreDocument> {
        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        serde_json::from_str(content)
            .map_err(|e| SubtrackError::Store(format!("Invalid store format: {}", e)))
    }

    /// Read-modify-write with the exclusive lock held for the whole cycle.
    fn modify_document<F, R>(path: &Path, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut StoreDocument) -> R,
    {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;

        let result = Self::modify_locked(&file, path, mutate);
        let _ = file.unlock();
        result
    }

    fn modify_locked<F, R>(file: &File, path: &Path, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut StoreDocument) -> R,
    {
        let mut content = String::new();
        let mut reader = BufReader::new(file);
        reader.read_to_string(&mut content)?;

        let mut doc = Self::parse_document(&content)?;
        let result = mutate(&mut doc);

        let serialized = serde_json::to_string_pretty(&doc)
            .map_err(|e| SubtrackError::Store(format!("Serialization failed: {}", e)))?;

        // Atomic replace: write a temp file, rename over the locked target.
        let temp_path = path.with_extension("json.tmp");
        {
            let mut temp = File::create(&temp_path)?;
            temp.write_all(serialized.as_bytes())?;
            temp.sync_all()?;
        }
        fs::rename(&temp_path, path)?;

        Ok(result)
    }
}
