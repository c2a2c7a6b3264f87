use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persists CLI choices (active network, account index, ...) between runs.
///
/// The file holds `KEY=VALUE` lines. Blank lines and lines starting with `#`
/// are ignored, and values are written back sorted by key.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a single value. A missing or unreadable file yields `None`.
    pub fn load_value(&self, key: &str) -> Option<String> {
        self.load_all().remove(key)
    }

    /// Set one key, keeping every other entry.
    pub fn save_value(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.load_all();
        state.insert(key.to_string(), value.to_string());
        self.save_all(&state)
    }

    pub fn load_all(&self) -> BTreeMap<String, String> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect()
    }

    pub fn save_all(&self, state: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content: String = state.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
        fs::write(&self.path, content)
            .with_context(|| format!("writing state file {}", self.path.display()))
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
