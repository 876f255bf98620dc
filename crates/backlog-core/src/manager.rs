//! Feature lifecycle: create, move between statuses, list, and report.
//!
//! Every operation is one load-mutate-save cycle against the store followed
//! by the matching document operation. The two are not transactional: a
//! crash between them leaves the store and the documents out of step.

use crate::config::Config;
use crate::error::Result;
use crate::feature::{Feature, NewFeature};
use crate::io;
use crate::paths::Layout;
use crate::render::{self, DocRenderer};
use crate::store::{today, BacklogStore, JsonFileStore, Metrics};
use crate::types::Status;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub feature: Feature,
    /// `None` when the template was missing.
    pub doc: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Moved {
    pub feature: Feature,
    pub old_status: Status,
    /// `None` when there was no document at the old location.
    pub doc: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub metrics: Metrics,
    pub completion_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitReport {
    pub store_created: bool,
    pub template_created: bool,
}

/// Completed share of all features, in percent.
///
/// Only reported while the backlog is non-empty, even though the divisor is
/// the total: a store where everything is complete reports no rate.
pub fn completion_rate(metrics: &Metrics) -> Option<f64> {
    if metrics.backlog_features == 0 {
        return None;
    }
    Some(metrics.completed_features as f64 / metrics.total_features as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// FeatureManager
// ---------------------------------------------------------------------------

pub struct FeatureManager<S = JsonFileStore> {
    store: S,
    renderer: DocRenderer,
}

impl FeatureManager<JsonFileStore> {
    /// Manager for the project at `root`, honouring its config file.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        Ok(Self::from_layout(&config.layout(root)))
    }

    pub fn from_layout(layout: &Layout) -> Self {
        Self::new(
            JsonFileStore::new(layout.backlog_file()),
            DocRenderer::new(&layout.features_dir, &layout.template_path),
        )
    }
}

impl<S: BacklogStore> FeatureManager<S> {
    pub fn new(store: S, renderer: DocRenderer) -> Self {
        Self { store, renderer }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn renderer(&self) -> &DocRenderer {
        &self.renderer
    }

    /// Create the store and the default template if either is missing.
    pub fn init(&self) -> Result<InitReport> {
        let mut report = InitReport::default();
        if self.store.read_all()?.is_none() {
            let mut doc = self.store.load()?;
            self.store.save(&mut doc)?;
            report.store_created = true;
        }
        report.template_created = io::write_if_missing(
            self.renderer.template_path(),
            render::DEFAULT_TEMPLATE.as_bytes(),
        )?;
        Ok(report)
    }

    /// Append a new backlog record and render its document.
    pub fn create_feature(&self, new: NewFeature) -> Result<Created> {
        let mut doc = self.store.load()?;
        let id = doc.next_id();
        let feature = Feature::from_new(id, new, today());

        doc.backlog.features.push(feature.clone());
        self.store.save(&mut doc)?;
        tracing::info!(id = %feature.id, name = %feature.name, "created feature");

        let doc_path = self.renderer.create_doc(&feature)?;
        Ok(Created {
            feature,
            doc: doc_path,
        })
    }

    /// Move a backlog feature to `new_status`.
    ///
    /// Returns `None`, leaving the store untouched, when `id` is not in the
    /// backlog collection. Completed features are never moved back.
    pub fn move_feature(&self, id: &str, new_status: Status) -> Result<Option<Moved>> {
        let mut doc = self.store.load()?;
        let Some(mut feature) = doc.take_from_backlog(id) else {
            tracing::debug!(id, "feature not in backlog");
            return Ok(None);
        };

        let old_status = feature.status;
        feature.status = new_status;
        if new_status.is_complete() {
            feature.completed_date = Some(today());
            doc.completed.features.push(feature.clone());
        } else {
            doc.backlog.features.push(feature.clone());
        }
        self.store.save(&mut doc)?;
        tracing::info!(id, from = %old_status, to = %new_status, "moved feature");

        let doc_path = self.renderer.move_doc(&feature, old_status, new_status)?;
        Ok(Some(Moved {
            feature,
            old_status,
            doc: doc_path,
        }))
    }

    /// Backlog features, optionally only those with `status`. Read-only.
    pub fn list_features(&self, status: Option<Status>) -> Result<Vec<Feature>> {
        let doc = self.store.load()?;
        Ok(doc
            .backlog
            .features
            .into_iter()
            .filter(|f| status.map_or(true, |s| f.status == s))
            .collect())
    }

    /// A feature from either collection.
    pub fn get_feature(&self, id: &str) -> Result<Option<Feature>> {
        let doc = self.store.load()?;
        Ok(doc.find(id).cloned())
    }

    /// The stored metrics block as-is, plus the derived completion rate.
    pub fn show_metrics(&self) -> Result<MetricsReport> {
        let doc = self.store.load()?;
        Ok(MetricsReport {
            metrics: doc.metrics,
            completion_rate: completion_rate(&doc.metrics),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::feature_id;
    use crate::render::DEFAULT_TEMPLATE;
    use crate::store::{Backlog, MemoryStore};
    use crate::types::Priority;
    use tempfile::TempDir;

    fn file_manager(dir: &TempDir) -> FeatureManager {
        let layout = Config::default().layout(dir.path());
        let fm = FeatureManager::from_layout(&layout);
        std::fs::create_dir_all(layout.templates_dir()).unwrap();
        std::fs::write(&layout.template_path, DEFAULT_TEMPLATE).unwrap();
        fm
    }

    fn scratch_renderer(dir: &TempDir) -> DocRenderer {
        DocRenderer::new(dir.path().join("features"), dir.path().join("no-template.md"))
    }

    fn memory_manager(dir: &TempDir) -> FeatureManager<MemoryStore> {
        FeatureManager::new(MemoryStore::new(), scratch_renderer(dir))
    }

    fn oauth() -> NewFeature {
        let mut new = NewFeature::new("Add OAuth Login", "Sign in with Google");
        new.priority = Priority::High;
        new.estimated_hours = 12.0;
        new
    }

    #[test]
    fn create_feature_appends_and_renders() {
        let dir = TempDir::new().unwrap();
        let fm = file_manager(&dir);
        fm.create_feature(NewFeature::new("Seed", "first")).unwrap();
        fm.create_feature(NewFeature::new("Seed two", "second")).unwrap();
        let before = fm.store().load().unwrap().feature_count();

        let created = fm.create_feature(oauth()).unwrap();
        let doc = fm.store().load().unwrap();

        assert_eq!(doc.feature_count(), before + 1);
        assert_eq!(created.feature.id, feature_id(before + 1));
        let stored = doc.backlog.features.last().unwrap();
        assert_eq!(stored.id, "feat-003");
        assert_eq!(stored.status, Status::Backlog);
        assert_eq!(stored.priority, Priority::High);
        assert_eq!(stored.estimated_hours, 12.0);
        assert_eq!(stored.created_date, today());
        assert_eq!(
            created.doc.unwrap(),
            dir.path().join("docs/features/backlog/feat-003-add-oauth-login.md")
        );
        assert_eq!(doc.metrics.total_features, 3);
    }

    #[test]
    fn create_without_template_still_stores() {
        let dir = TempDir::new().unwrap();
        let fm = memory_manager(&dir);
        let created = fm.create_feature(oauth()).unwrap();
        assert!(created.doc.is_none());
        assert_eq!(fm.store().snapshot().unwrap().backlog.features.len(), 1);
    }

    #[test]
    fn move_to_complete_relocates_record_and_doc() {
        let dir = TempDir::new().unwrap();
        let fm = file_manager(&dir);
        fm.create_feature(NewFeature::new("One", "1")).unwrap();
        fm.create_feature(NewFeature::new("Two", "2")).unwrap();
        fm.create_feature(NewFeature::new("Three", "3")).unwrap();

        let moved = fm.move_feature("feat-003", Status::Complete).unwrap().unwrap();
        assert_eq!(moved.old_status, Status::Backlog);
        assert_eq!(
            moved.doc.unwrap(),
            dir.path().join("docs/features/completed/feat-003-three.md")
        );

        let doc = fm.store().load().unwrap();
        assert!(doc.backlog.features.iter().all(|f| f.id != "feat-003"));
        let done: Vec<_> = doc.completed.features.iter().filter(|f| f.id == "feat-003").collect();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].completed_date, Some(today()));
        assert_eq!(done[0].status, Status::Complete);
        assert_eq!(doc.metrics.completed_features, 1);
        assert_eq!(doc.metrics.backlog_features, 2);
    }

    #[test]
    fn move_to_other_status_stays_in_backlog_under_active_dir() {
        let dir = TempDir::new().unwrap();
        let fm = file_manager(&dir);
        fm.create_feature(NewFeature::new("Search", "s")).unwrap();

        let moved = fm.move_feature("feat-001", Status::Testing).unwrap().unwrap();
        assert_eq!(moved.feature.status, Status::Testing);
        assert!(moved.doc.unwrap().ends_with("active/feat-001-search.md"));

        let doc = fm.store().load().unwrap();
        assert_eq!(doc.backlog.features[0].status, Status::Testing);
        assert!(doc.backlog.features[0].completed_date.is_none());

        // The document now lives in active/, not testing/, so the next move
        // from testing finds nothing to relocate.
        let moved = fm.move_feature("feat-001", Status::Complete).unwrap().unwrap();
        assert!(moved.doc.is_none());
    }

    #[test]
    fn move_unknown_id_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let fm = memory_manager(&dir);
        fm.create_feature(NewFeature::new("Only", "o")).unwrap();
        let before = fm.store().snapshot().unwrap();

        assert!(fm.move_feature("feat-404", Status::Complete).unwrap().is_none());
        assert_eq!(fm.store().snapshot().unwrap(), before);
    }

    #[test]
    fn completed_feature_cannot_be_moved_again() {
        let dir = TempDir::new().unwrap();
        let fm = memory_manager(&dir);
        fm.create_feature(NewFeature::new("Only", "o")).unwrap();
        fm.move_feature("feat-001", Status::Complete).unwrap().unwrap();
        assert!(fm.move_feature("feat-001", Status::Active).unwrap().is_none());
    }

    #[test]
    fn list_filters_backlog_by_status() {
        let dir = TempDir::new().unwrap();
        let fm = memory_manager(&dir);
        fm.create_feature(NewFeature::new("A", "a")).unwrap();
        fm.create_feature(NewFeature::new("B", "b")).unwrap();
        fm.create_feature(NewFeature::new("C", "c")).unwrap();
        fm.move_feature("feat-002", Status::Review).unwrap();
        fm.move_feature("feat-003", Status::Complete).unwrap();
        let before = fm.store().snapshot().unwrap();

        assert_eq!(fm.list_features(None).unwrap().len(), 2);
        let review = fm.list_features(Some(Status::Review)).unwrap();
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].id, "feat-002");
        assert!(fm.list_features(Some(Status::Complete)).unwrap().is_empty());
        assert_eq!(fm.store().snapshot().unwrap(), before);
    }

    #[test]
    fn metrics_rate_requires_backlog_entries() {
        let mut doc = Backlog::empty(today());
        for n in 1..=5 {
            doc.completed.features.push(Feature::from_new(
                feature_id(n),
                NewFeature::new(format!("Done {n}"), "d"),
                today(),
            ));
        }
        let store = MemoryStore::new();
        store.save(&mut doc).unwrap();
        let dir = TempDir::new().unwrap();
        let fm = FeatureManager::new(store, scratch_renderer(&dir));

        let report = fm.show_metrics().unwrap();
        assert_eq!(report.metrics.completed_features, 5);
        assert_eq!(report.metrics.backlog_features, 0);
        assert!(report.completion_rate.is_none());
    }

    #[test]
    fn metrics_rate_with_mixed_store() {
        let dir = TempDir::new().unwrap();
        let fm = memory_manager(&dir);
        for name in ["A", "B", "C", "D"] {
            fm.create_feature(NewFeature::new(name, "x")).unwrap();
        }
        fm.move_feature("feat-001", Status::Complete).unwrap();
        let rate = fm.show_metrics().unwrap().completion_rate.unwrap();
        assert!((rate - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let layout = Config::default().layout(dir.path());
        let fm = FeatureManager::from_layout(&layout);

        let first = fm.init().unwrap();
        assert!(first.store_created);
        assert!(first.template_created);
        assert!(layout.backlog_file().exists());
        assert!(layout.template_path.exists());

        let second = fm.init().unwrap();
        assert!(!second.store_created);
        assert!(!second.template_created);
    }

    #[test]
    fn get_feature_finds_completed() {
        let dir = TempDir::new().unwrap();
        let fm = memory_manager(&dir);
        fm.create_feature(NewFeature::new("A", "a")).unwrap();
        fm.move_feature("feat-001", Status::Complete).unwrap();
        assert_eq!(fm.get_feature("feat-001").unwrap().unwrap().status, Status::Complete);
        assert!(fm.get_feature("feat-002").unwrap().is_none());
    }
}
