// 🗄️ Registration Store - JSON file backed, append-only list
//
// The whole list lives in memory and the whole file is rewritten on every
// append. There is no cross-process locking: two stores opened on the same
// file each write their own view, and the last write wins.

use crate::registration::{NewRegistration, Registration};
use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to persist registrations to {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode registrations: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the backing file could not be written
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence { .. })
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug)]
pub struct RegistrationStore {
    path: PathBuf,
    registrations: Vec<Registration>,
}

impl RegistrationStore {
    /// Open the store backed by `path`.
    ///
    /// A missing, unreadable or undecodable file yields an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let registrations = load(&path);
        info!(path = %path.display(), count = registrations.len(), "registration store opened");
        RegistrationStore { path, registrations }
    }

    /// Validated submission in, stamped registration out, file rewritten.
    ///
    /// On failure the in-memory list is left exactly as it was.
    pub fn append(&mut self, new: NewRegistration) -> Result<&Registration, StoreError> {
        self.append_record(Registration::stamp_now(new))
    }

    /// Like [`append`](Self::append) with an explicit timestamp
    pub fn append_at(
        &mut self,
        new: NewRegistration,
        registered_at: NaiveDateTime,
    ) -> Result<&Registration, StoreError> {
        self.append_record(Registration::stamp(new, registered_at))
    }

    fn append_record(&mut self, record: Registration) -> Result<&Registration, StoreError> {
        self.registrations.push(record);

        if let Err(e) = self.persist() {
            self.registrations.pop();
            error!(path = %self.path.display(), error = %e, "append rolled back");
            return Err(e);
        }

        debug!(count = self.registrations.len(), "registration appended");
        Ok(&self.registrations[self.registrations.len() - 1])
    }

    /// Every registration, in insertion order
    pub fn all(&self) -> &[Registration] {
        &self.registrations
    }

    /// Case-insensitive substring search over name, email and club id.
    /// A blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<&Registration> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.registrations.iter().collect();
        }

        self.registrations
            .iter()
            .filter(|reg| reg.matches(&needle))
            .collect()
    }

    /// Same as [`search`](Self::search), paired with each record's 1-based
    /// insertion number.
    pub fn search_numbered(&self, query: &str) -> Vec<(usize, &Registration)> {
        let needle = query.trim().to_lowercase();
        self.registrations
            .iter()
            .enumerate()
            .filter(|(_, reg)| needle.is_empty() || reg.matches(&needle))
            .map(|(i, reg)| (i + 1, reg))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole file: write a sibling temp file, then rename it over
    /// the target so readers never see a half-written array.
    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.registrations)?;

        let persistence = |source: io::Error| StoreError::Persistence {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(persistence)?;
            }
        }

        let tmp = tmp_path(&self.path);
        if let Err(e) = fs::write(&tmp, json) {
            return Err(persistence(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(persistence(e));
        }

        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load(path: &Path) -> Vec<Registration> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read registrations, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(registrations) => registrations,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not decode registrations, starting empty");
            Vec::new()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
