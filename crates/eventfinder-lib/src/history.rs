//! Rolling history of picked locations, persisted between runs.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::DATA_DIR_ENV;
use crate::error::{Error, Result};
use crate::geocode::LocationSuggestion;

/// Storage key; the file on disk is `<key>.json`.
pub const HISTORY_KEY: &str = "locationSearchHistory";

/// Maximum number of remembered places.
pub const HISTORY_CAPACITY: usize = 5;

/// Most-recent-first list of places, unique by `place_name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationHistory {
    entries: Vec<LocationSuggestion>,
}

impl LocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, re-applying the de-duplication and cap.
    pub fn from_entries(entries: Vec<LocationSuggestion>) -> Self {
        let mut history = Self::new();
        for entry in entries.into_iter().rev() {
            history.add(entry);
        }
        history
    }

    pub fn entries(&self) -> &[LocationSuggestion] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Put `place` first, dropping an older entry with the same name and
    /// anything beyond [`HISTORY_CAPACITY`].
    pub fn add(&mut self, place: LocationSuggestion) {
        self.entries.retain(|p| p.place_name != place.place_name);
        self.entries.insert(0, place);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, place_name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|p| p.place_name != place_name);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// JSON file holding a [`LocationHistory`].
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Store inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{HISTORY_KEY}.json")),
        }
    }

    /// Store in `dir` when given, otherwise in the platform data directory.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            return Ok(Self::in_dir(dir));
        }
        let dirs = ProjectDirs::from("com", "eventfinder", "eventfinder")
            .ok_or(Error::ProjectDirsUnavailable)?;
        Ok(Self::in_dir(dirs.data_dir()))
    }

    /// Store in `EVENTFINDER_DATA_DIR`, or the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dir = env::var_os(DATA_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        Self::resolve(dir.as_deref())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file yields an empty history; a malformed one is discarded.
    pub fn load(&self) -> Result<LocationHistory> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored location history");
                return Ok(LocationHistory::new());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Vec<LocationSuggestion>>(&raw) {
            Ok(entries) => Ok(LocationHistory::from_entries(entries)),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "invalid location history format in storage; starting empty"
                );
                Ok(LocationHistory::new())
            }
        }
    }

    /// Replace the file atomically.
    pub fn save(&self, history: &LocationHistory) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer(tmp.as_file_mut(), history.entries())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| Error::Persist {
            path: self.path.clone(),
            source: err.error,
        })?;
        debug!(path = %self.path.display(), entries = history.len(), "location history saved");
        Ok(())
    }
}
