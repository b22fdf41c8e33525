use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::load::resolve_config_path;
use super::schema::Settings;
use crate::error::{Error, Result};

/// Reads and writes the settings document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the resolved default location, if one can be determined.
    pub fn from_env() -> Option<Self> {
        resolve_config_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; any failure is logged and yields defaults.
    pub fn load_or_default(&self) -> Settings {
        match Settings::load_from(Some(&self.path)) {
            Ok(s) => s,
            Err(e) => {
                // Config is optional; failures should not prevent the app from starting.
                warn!(path = %self.path.display(), error = %e, "failed to load config, using defaults");
                Settings::default()
            }
        }
    }

    /// Write `settings` as pretty JSON, replacing the file atomically.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let body = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::io(&self.path, e))?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
