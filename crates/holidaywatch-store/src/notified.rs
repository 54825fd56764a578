//! JSON-backed notified-key store.
//!
//! On disk the store is a JSON array of `"YYYY-MM-DD_Name"` strings. It is
//! read once when opened and rewritten in full after every insertion and
//! every prune, through a temp file in the same directory that is then
//! renamed over the old one. A crash mid-write leaves the previous file.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use holidaywatch_core::policy::{is_retained, retention_cutoff};
use holidaywatch_core::{NotifiedKey, NotifiedLedger};
use tracing::{Span, debug, error, info, warn};

use crate::StoreError;

/// Durable set of [`NotifiedKey`]s.
///
/// The single source of truth for "has this holiday been announced". Only
/// the polling actor mutates it, one cycle at a time.
pub struct NotifiedStore {
    path: PathBuf,
    keys: BTreeSet<NotifiedKey>,
    span: Span,
}

impl NotifiedStore {
    /// Open the store at `path`.
    ///
    /// Never fails: a missing file starts an empty store, and an unreadable
    /// or malformed one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_span(path, tracing::info_span!("notified_store"))
    }

    /// Like [`open`](Self::open), logging under `span`.
    pub fn open_with_span(path: impl Into<PathBuf>, span: Span) -> Self {
        let path = path.into();
        let keys = span.in_scope(|| match load_keys(&path) {
            Ok(None) => {
                info!(path = %path.display(), "no notified-key file, starting empty");
                BTreeSet::new()
            }
            Ok(Some(keys)) => {
                info!(path = %path.display(), count = keys.len(), "loaded notified holidays");
                keys
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "starting with empty notified set");
                BTreeSet::new()
            }
        });
        Self { path, keys, span }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rewrite the backing file with the current key set.
    pub fn save(&self) -> Result<(), StoreError> {
        let raw: Vec<&str> = self.keys.iter().map(NotifiedKey::as_str).collect();
        let json = serde_json::to_vec(&raw)?;
        write_atomic(&self.path, &json)
    }

    fn save_logged(&self) {
        if let Err(e) = self.save() {
            error!(path = %self.path.display(), error = %e, "failed to save notified holidays");
        }
    }
}

impl NotifiedLedger for NotifiedStore {
    fn contains(&self, key: &NotifiedKey) -> bool {
        self.keys.contains(key)
    }

    fn add(&mut self, key: NotifiedKey) {
        let _guard = self.span.enter();
        if self.keys.contains(&key) {
            return;
        }
        debug!(key = %key, "recording notified holiday");
        self.keys.insert(key);
        self.save_logged();
    }

    fn prune(&mut self, today: NaiveDate, retention_days: u64) -> usize {
        let _guard = self.span.enter();
        let cutoff = retention_cutoff(today, retention_days);
        let before = self.keys.len();
        self.keys.retain(|key| {
            let keep = is_retained(key, cutoff);
            if !keep && key.date().is_none() {
                warn!(key = %key, "dropping notified key without a date");
            }
            keep
        });
        let removed = before - self.keys.len();
        if removed > 0 {
            info!(removed, %cutoff, "pruned notified holidays");
        }
        self.save_logged();
        removed
    }
}

/// `Ok(None)` when there is no file yet.
fn load_keys(path: &Path) -> Result<Option<BTreeSet<NotifiedKey>>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let raw: Vec<String> = serde_json::from_slice(&bytes)?;
    Ok(Some(raw.into_iter().map(NotifiedKey::from_stored).collect()))
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    temp.write_all(data)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.persist(path).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
