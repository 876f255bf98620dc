//! One-way export of the backlog into the external issue tracker.
//!
//! Epics become projects, backlog features become issues. Each step is
//! appended to the migration log; a failed item is logged and skipped.
//! The result is a JSON report mapping local ids to tracker ids.

use crate::error::Result;
use crate::feature::Feature;
use crate::io;
use crate::paths::Layout;
use crate::store::{Backlog, BacklogStore, JsonFileStore};
use crate::tracker::{IssueDraft, IssueTracker, ProjectDraft};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MigrationLog
// ---------------------------------------------------------------------------

type Echo = Box<dyn FnMut(&str)>;

/// Append-only `[YYYY-MM-DD HH:MM:SS] message` log. Lines written during this
/// run are also kept in memory and handed to the echo callback, if any, as
/// they are recorded.
pub struct MigrationLog {
    path: PathBuf,
    lines: Vec<String>,
    echo: Option<Echo>,
}

impl MigrationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: Vec::new(),
            echo: None,
        }
    }

    pub fn set_echo(&mut self, echo: impl FnMut(&str) + 'static) {
        self.echo = Some(Box::new(echo));
    }

    pub fn record(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        io::append_text(&self.path, &format!("[{stamp}] {message}\n"))?;
        tracing::info!("{message}");
        if let Some(echo) = self.echo.as_mut() {
            echo(&message);
        }
        self.lines.push(message);
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMapping {
    pub linear_id: String,
    pub url: String,
    pub original_data: Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub migration_date: String,
    pub migrated_epics: usize,
    pub migrated_features: usize,
    pub epic_mapping: BTreeMap<String, String>,
    pub feature_mapping: BTreeMap<String, FeatureMapping>,
}

impl MigrationReport {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match io::read_optional(path)? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        io::atomic_write(path, data.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub expected_features: usize,
    pub listed_issues: usize,
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

pub struct Migration {
    store: JsonFileStore,
    report_path: PathBuf,
    log: MigrationLog,
}

impl Migration {
    pub fn new(layout: &Layout) -> Self {
        Self {
            store: JsonFileStore::new(layout.backlog_file()),
            report_path: layout.migration_report(),
            log: MigrationLog::new(layout.migration_log()),
        }
    }

    pub fn log(&self) -> &MigrationLog {
        &self.log
    }

    /// Forward every log line to `echo` the moment it is recorded.
    pub fn echo_to(&mut self, echo: impl FnMut(&str) + 'static) {
        self.log.set_echo(echo);
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Migrate everything. Returns `None` when there is no backlog file;
    /// nothing is logged or written in that case.
    pub fn run(&mut self, tracker: &mut dyn IssueTracker) -> Result<Option<MigrationReport>> {
        let Some(data) = self.store.read_all()? else {
            return Ok(None);
        };

        self.log.record("Checking issue tracker connection...")?;
        let epic_mapping = self.migrate_epics(&data, tracker)?;
        let feature_mapping = self.migrate_features(&data, &epic_mapping, tracker)?;

        let report = MigrationReport {
            migration_date: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            migrated_epics: epic_mapping.len(),
            migrated_features: feature_mapping.len(),
            epic_mapping,
            feature_mapping,
        };
        report.save(&self.report_path)?;
        self.log.record(format!(
            "Migration report saved to {}",
            self.report_path.display()
        ))?;
        Ok(Some(report))
    }

    fn migrate_epics(
        &mut self,
        data: &Backlog,
        tracker: &mut dyn IssueTracker,
    ) -> Result<BTreeMap<String, String>> {
        self.log.record("Starting epic migration...")?;
        let mut mapping = BTreeMap::new();

        for epic in &data.backlog.epics {
            self.log.record(format!("Migrating epic: {}", epic.name))?;
            match tracker.create_project(&ProjectDraft::from_epic(epic)) {
                Ok(created) => {
                    self.log
                        .record(format!("✅ Epic {} → Linear {}", epic.id, created.id))?;
                    mapping.insert(epic.id.clone(), created.id);
                }
                Err(e) => {
                    tracing::warn!(epic = %epic.id, error = %e, "epic migration failed");
                    self.log
                        .record(format!("❌ Failed to migrate epic {}: {e}", epic.id))?;
                }
            }
        }
        Ok(mapping)
    }

    fn migrate_features(
        &mut self,
        data: &Backlog,
        epic_mapping: &BTreeMap<String, String>,
        tracker: &mut dyn IssueTracker,
    ) -> Result<BTreeMap<String, FeatureMapping>> {
        self.log.record("Starting feature migration...")?;
        let mut mapping = BTreeMap::new();

        for feature in &data.backlog.features {
            self.log
                .record(format!("Migrating feature: {}", feature.name))?;
            let project = feature
                .epic
                .as_ref()
                .and_then(|epic| epic_mapping.get(epic))
                .cloned();

            match tracker.create_issue(&IssueDraft::from_feature(feature, project)) {
                Ok(created) => {
                    self.log.record(format!(
                        "✅ Feature {} → Linear {}",
                        feature.id, created.id
                    ))?;
                    mapping.insert(
                        feature.id.clone(),
                        FeatureMapping {
                            linear_id: created.id,
                            url: created.url,
                            original_data: feature.clone(),
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(feature = %feature.id, error = %e, "feature migration failed");
                    self.log
                        .record(format!("❌ Failed to migrate feature {}: {e}", feature.id))?;
                }
            }
        }
        Ok(mapping)
    }

    /// Ask the tracker for its issues and compare against the last report.
    /// Returns `None` when no report exists.
    pub fn verify(&mut self, tracker: &mut dyn IssueTracker) -> Result<Option<Verification>> {
        self.log.record("Verifying migration...")?;
        let listed = tracker.list_issues()?;

        let Some(report) = MigrationReport::load(&self.report_path)? else {
            return Ok(None);
        };
        self.log.record(format!(
            "Expected {} migrated features",
            report.migrated_features
        ))?;
        Ok(Some(Verification {
            expected_features: report.migrated_features,
            listed_issues: listed.len(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
