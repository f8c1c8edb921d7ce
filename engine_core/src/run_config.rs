use std::fs;
use std::path::{Path, PathBuf};

use plugin_core::AppParams;
use serde::Deserialize;

use crate::app_utils::resolve_app_binary_path;
use crate::error::HostError;

/// What the runner executes: one app over one input file and its outputs.
///
/// The `[logging]` table of the same file belongs to `liblogger` and is
/// ignored here.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub app: AppSection,
    pub io: IoSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: String,
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
    #[serde(default)]
    pub params: AppParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IoSection {
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
}

impl RunConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, HostError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| HostError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, HostError> {
        let config: RunConfig =
            toml::from_str(content).map_err(|e| HostError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), HostError> {
        if self.app.name.trim().is_empty() {
            return Err(HostError::Config("missing 'name' in [app] section".into()));
        }
        if self.io.input.as_os_str().is_empty() {
            return Err(HostError::Config("missing 'input' in [io] section".into()));
        }
        if self.io.outputs.is_empty() {
            return Err(HostError::Config("[io] section needs at least one output".into()));
        }
        if let Some(index) = self.io.outputs.iter().position(|o| o.as_os_str().is_empty()) {
            return Err(HostError::Config(format!("output at index {} is empty", index)));
        }
        Ok(())
    }

    /// Platform file name of the app library inside `library_dir`
    /// (the working directory when unset).
    pub fn library_path(&self) -> PathBuf {
        let folder = self.app.library_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        resolve_app_binary_path(folder, &self.app.name)
    }
}
