//! Quote Store - Persistence Contract
//!
//! The engine only needs load / save / update. Records round-trip the payload
//! through JSON in both stores, so what comes back is exactly what a real
//! backend would hand back. Status is set to draft on save and survives update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::hashing::configuration_hash;
use crate::quote::{QuotePayload, QuoteStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Quote not found: {0}")]
    NotFound(String),

    #[error("Quote {id} cannot move from {from} to {to}")]
    InvalidTransition { id: String, from: &'static str, to: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Quote store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: String,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub configuration_hash: String,
    #[serde(flatten)]
    pub payload: QuotePayload,
}

impl QuoteRecord {
    /// New draft record with a fresh id.
    pub fn draft(payload: QuotePayload) -> Result<Self, StoreError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            status: QuoteStatus::Draft,
            created_at: now,
            updated_at: now,
            configuration_hash: configuration_hash(&payload.configuration)?,
            payload,
        })
    }

    /// Replace the payload, keeping id, status and creation time.
    pub fn revise(self, payload: QuotePayload) -> Result<Self, StoreError> {
        Ok(Self {
            configuration_hash: configuration_hash(&payload.configuration)?,
            updated_at: Utc::now(),
            payload,
            ..self
        })
    }

    pub fn transition(self, next: QuoteStatus) -> Result<Self, StoreError> {
        if !self.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                id: self.id,
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        Ok(Self { status: next, updated_at: Utc::now(), ..self })
    }
}

/// Trait defining the quote persistence collaborator
pub trait QuoteStore: Send + Sync {
    fn load(&self, id: &str) -> Result<QuoteRecord, StoreError>;

    /// Create a new draft record.
    fn save(&self, payload: QuotePayload) -> Result<QuoteRecord, StoreError>;

    /// Replace the payload of an existing record. Status is preserved.
    fn update(&self, id: &str, payload: QuotePayload) -> Result<QuoteRecord, StoreError>;

    fn set_status(&self, id: &str, status: QuoteStatus) -> Result<QuoteRecord, StoreError>;

    /// All records, oldest first.
    fn list(&self) -> Result<Vec<QuoteRecord>, StoreError>;
}

/// In-process store keeping each record as serialized JSON.
#[derive(Debug, Default)]
pub struct MemoryQuoteStore {
    records: RwLock<BTreeMap<String, String>>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&self, record: &QuoteRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        self.records
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(record.id.clone(), json);
        Ok(())
    }
}

impl QuoteStore for MemoryQuoteStore {
    fn load(&self, id: &str) -> Result<QuoteRecord, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let json = records.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(json)?)
    }

    fn save(&self, payload: QuotePayload) -> Result<QuoteRecord, StoreError> {
        let record = QuoteRecord::draft(payload)?;
        self.put(&record)?;
        info!(quote = %record.id, "saved quote");
        Ok(record)
    }

    fn update(&self, id: &str, payload: QuotePayload) -> Result<QuoteRecord, StoreError> {
        let record = self.load(id)?.revise(payload)?;
        self.put(&record)?;
        info!(quote = %id, status = record.status.as_str(), "updated quote");
        Ok(record)
    }

    fn set_status(&self, id: &str, status: QuoteStatus) -> Result<QuoteRecord, StoreError> {
        let record = self.load(id)?.transition(status)?;
        self.put(&record)?;
        info!(quote = %id, status = status.as_str(), "changed quote status");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<QuoteRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut all = records
            .values()
            .map(|json| serde_json::from_str(json))
            .collect::<Result<Vec<QuoteRecord>, _>>()?;
        all.sort_by_key(|r| r.created_at);
        Ok(all)
    }
}

/// One pretty-printed `<id>.json` file per record.
#[derive(Debug, Clone)]
pub struct JsonFileQuoteStore {
    dir: PathBuf,
}

impl JsonFileQuoteStore {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let safe = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        safe.then(|| self.dir.join(format!("{}.json", id)))
    }

    fn write(&self, record: &QuoteRecord) -> Result<(), StoreError> {
        let path = self
            .path_for(&record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "wrote quote record");
        Ok(())
    }
}

impl QuoteStore for JsonFileQuoteStore {
    fn load(&self, id: &str) -> Result<QuoteRecord, StoreError> {
        let path = self
            .path_for(id)
            .filter(|p| p.exists())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn save(&self, payload: QuotePayload) -> Result<QuoteRecord, StoreError> {
        let record = QuoteRecord::draft(payload)?;
        self.write(&record)?;
        info!(quote = %record.id, "saved quote");
        Ok(record)
    }

    fn update(&self, id: &str, payload: QuotePayload) -> Result<QuoteRecord, StoreError> {
        let record = self.load(id)?.revise(payload)?;
        self.write(&record)?;
        info!(quote = %id, status = record.status.as_str(), "updated quote");
        Ok(record)
    }

    fn set_status(&self, id: &str, status: QuoteStatus) -> Result<QuoteRecord, StoreError> {
        let record = self.load(id)?.transition(status)?;
        self.write(&record)?;
        info!(quote = %id, status = status.as_str(), "changed quote status");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<QuoteRecord>, StoreError> {
        let mut all = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                all.push(serde_json::from_str::<QuoteRecord>(&fs::read_to_string(&path)?)?);
            }
        }
        all.sort_by_key(|r| r.created_at);
        Ok(all)
    }
}

/// At most one save in flight per quote key.
#[derive(Debug, Default)]
pub struct SaveGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl SaveGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another ticket for `key` is alive.
    pub fn try_begin(&self, key: &str) -> Option<SaveTicket<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(key.to_string()) {
            return None;
        }
        Some(SaveTicket { guard: self, key: key.to_string() })
    }

    pub fn is_saving(&self, key: &str) -> bool {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).contains(key)
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct SaveTicket<'a> {
    guard: &'a SaveGuard,
    key: String,
}

impl Drop for SaveTicket<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
