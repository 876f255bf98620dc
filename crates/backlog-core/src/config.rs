use crate::error::Result;
use crate::io;
use crate::paths::{self, Layout};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project-level settings read from `.feature-tracking/config.yaml`.
///
/// Every field is optional in the file; a missing file means all defaults,
/// which reproduce the fixed layout of an unconfigured project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_features_dir")]
    pub features_dir: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Template file name, resolved under `<features_dir>/templates/`.
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_spec_dir")]
    pub spec_dir: String,
}

fn default_features_dir() -> String {
    paths::DEFAULT_FEATURES_DIR.to_string()
}

fn default_data_dir() -> String {
    paths::DEFAULT_DATA_DIR.to_string()
}

fn default_template() -> String {
    paths::DEFAULT_TEMPLATE.to_string()
}

fn default_spec_dir() -> String {
    paths::DEFAULT_SPEC_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            features_dir: default_features_dir(),
            data_dir: default_data_dir(),
            template: default_template(),
            spec_dir: default_spec_dir(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        match io::read_optional(&path)? {
            Some(data) => {
                let config: Config = serde_yaml::from_str(&data)?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    /// Resolve every configured location against `root`. Absolute values in
    /// the config are used as-is.
    pub fn layout(&self, root: &Path) -> Layout {
        let features_dir = root.join(&self.features_dir);
        Layout {
            root: root.to_path_buf(),
            template_path: features_dir.join(paths::TEMPLATES_DIR).join(&self.template),
            features_dir,
            data_dir: root.join(&self.data_dir),
            spec_dir: root.join(&self.spec_dir),
        }
    }
}
