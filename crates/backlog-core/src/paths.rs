use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TRACKING_DIR: &str = ".feature-tracking";
pub const CONFIG_FILE: &str = ".feature-tracking/config.yaml";

pub const DEFAULT_DATA_DIR: &str = ".feature-tracking/data";
pub const DEFAULT_FEATURES_DIR: &str = "docs/features";
pub const DEFAULT_SPEC_DIR: &str = ".specify";
pub const DEFAULT_TEMPLATE: &str = "feature-template.md";

pub const TEMPLATES_DIR: &str = "templates";
pub const SPEC_MEMORY_DIR: &str = "memory";

pub const BACKLOG_FILE: &str = "backlog.json";
pub const MIGRATION_LOG: &str = "linear-migration.log";
pub const MIGRATION_REPORT: &str = "linear-migration-report.json";

/// Document buckets used when a feature moves. Only these two exist on disk
/// after a move, whatever the logical status.
pub const COMPLETED_BUCKET: &str = "completed";
pub const ACTIVE_BUCKET: &str = "active";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Absolute locations of everything the tool reads or writes, resolved from
/// the project root and [`crate::config::Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub features_dir: PathBuf,
    pub data_dir: PathBuf,
    pub template_path: PathBuf,
    pub spec_dir: PathBuf,
}

impl Layout {
    pub fn backlog_file(&self) -> PathBuf {
        self.data_dir.join(BACKLOG_FILE)
    }

    pub fn migration_log(&self) -> PathBuf {
        self.data_dir.join(MIGRATION_LOG)
    }

    pub fn migration_report(&self) -> PathBuf {
        self.data_dir.join(MIGRATION_REPORT)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.features_dir.join(TEMPLATES_DIR)
    }

    pub fn spec_memory_dir(&self) -> PathBuf {
        self.spec_dir.join(SPEC_MEMORY_DIR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn default_layout_paths() {
        let root = Path::new("/tmp/proj");
        let layout = Config::default().layout(root);
        assert_eq!(
            layout.backlog_file(),
            PathBuf::from("/tmp/proj/.feature-tracking/data/backlog.json")
        );
        assert_eq!(
            layout.template_path,
            PathBuf::from("/tmp/proj/docs/features/templates/feature-template.md")
        );
        assert_eq!(
            layout.migration_report(),
            PathBuf::from("/tmp/proj/.feature-tracking/data/linear-migration-report.json")
        );
        assert_eq!(
            layout.spec_memory_dir(),
            PathBuf::from("/tmp/proj/.specify/memory")
        );
    }

    #[test]
    fn config_path_under_tracking_dir() {
        assert_eq!(
            config_path(Path::new("/p")),
            PathBuf::from("/p/.feature-tracking/config.yaml")
        );
    }
}
