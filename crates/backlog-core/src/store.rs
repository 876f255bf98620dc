//! The backlog document and the stores that persist it.
//!
//! The whole document is read into memory, mutated, and written back in one
//! piece. Stores offer exactly two primitives, [`BacklogStore::read_all`] and
//! [`BacklogStore::write_all`]; the provided `load`/`save` add the recovery
//! and bookkeeping rules shared by every backend.

use crate::error::Result;
use crate::feature::{feature_id, serialize_hours, Epic, Feature};
use crate::io;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub const STORE_VERSION: &str = "1.0.0";

/// The calendar date stamped on records and on the document.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacklogSection {
    #[serde(default)]
    pub epics: Vec<Epic>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletedSection {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Aggregate counts derived from the two collections. Never edited by hand;
/// see [`Metrics::compute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub total_features: usize,
    pub backlog_features: usize,
    pub completed_features: usize,
    /// Sum over the backlog collection only.
    #[serde(serialize_with = "serialize_hours")]
    pub total_estimated_hours: f64,
    /// Actual hours are not tracked; always written as 0.
    #[serde(serialize_with = "serialize_hours")]
    pub completed_hours: f64,
}

impl Metrics {
    pub fn compute(backlog: &BacklogSection, completed: &CompletedSection) -> Self {
        let backlog_features = backlog.features.len();
        let completed_features = completed.features.len();
        Self {
            total_features: backlog_features + completed_features,
            backlog_features,
            completed_features,
            total_estimated_hours: backlog
                .features
                .iter()
                .map(|f| f.estimated_hours)
                .sum(),
            completed_hours: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlog {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "today")]
    pub last_updated: NaiveDate,
    #[serde(default)]
    pub backlog: BacklogSection,
    #[serde(default)]
    pub completed: CompletedSection,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    STORE_VERSION.to_string()
}

impl Backlog {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            version: default_version(),
            last_updated: date,
            backlog: BacklogSection::default(),
            completed: CompletedSection::default(),
            metrics: Metrics::default(),
            extra: Map::new(),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.backlog.features.len() + self.completed.features.len()
    }

    /// Id for the next feature: one past the current record count.
    ///
    /// Count-based, not max-based: deleting records by hand or two
    /// concurrent runs can hand out an id that is already taken.
    pub fn next_id(&self) -> String {
        feature_id(self.feature_count() + 1)
    }

    /// Remove and return the first backlog record with `id`.
    pub fn take_from_backlog(&mut self, id: &str) -> Option<Feature> {
        let pos = self.backlog.features.iter().position(|f| f.id == id)?;
        Some(self.backlog.features.remove(pos))
    }

    /// Look a feature up in either collection, backlog first.
    pub fn find(&self, id: &str) -> Option<&Feature> {
        self.backlog
            .features
            .iter()
            .chain(self.completed.features.iter())
            .find(|f| f.id == id)
    }

    /// Stamp `lastUpdated` and recompute `metrics`; called on every save.
    pub fn refresh(&mut self, date: NaiveDate) {
        self.last_updated = date;
        self.metrics = Metrics::compute(&self.backlog, &self.completed);
    }
}

// ---------------------------------------------------------------------------
// BacklogStore
// ---------------------------------------------------------------------------

pub trait BacklogStore {
    /// Read the whole document, or `None` if nothing has been stored yet.
    fn read_all(&self) -> Result<Option<Backlog>>;

    /// Replace the whole stored document with `data`.
    fn write_all(&self, data: &Backlog) -> Result<()>;

    /// Load the document, falling back to a fresh empty one.
    fn load(&self) -> Result<Backlog> {
        Ok(self.read_all()?.unwrap_or_else(|| Backlog::empty(today())))
    }

    /// Stamp, recompute metrics, and write.
    fn save(&self, data: &mut Backlog) -> Result<()> {
        data.refresh(today());
        tracing::debug!(
            total = data.metrics.total_features,
            backlog = data.metrics.backlog_features,
            completed = data.metrics.completed_features,
            "saving backlog"
        );
        self.write_all(data)
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// The backlog as a 2-space indented JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BacklogStore for JsonFileStore {
    fn read_all(&self) -> Result<Option<Backlog>> {
        let Some(data) = io::read_optional(&self.path)? else {
            tracing::debug!(path = %self.path.display(), "no backlog file yet");
            return Ok(None);
        };
        let backlog: Backlog = serde_json::from_str(&data)?;
        Ok(Some(backlog))
    }

    fn write_all(&self, data: &Backlog) -> Result<()> {
        let mut json = serde_json::to_string_pretty(data)?;
        json.push('\n');
        io::atomic_write(&self.path, json.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory backend. Single-threaded, like everything else here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RefCell<Option<Backlog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Backlog> {
        self.doc.borrow().clone()
    }
}

impl BacklogStore for MemoryStore {
    fn read_all(&self) -> Result<Option<Backlog>> {
        Ok(self.doc.borrow().clone())
    }

    fn write_all(&self, data: &Backlog) -> Result<()> {
        *self.doc.borrow_mut() = Some(data.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
