use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use wello_shared::ThreadId;

/// Name of the file holding the persisted thread id.
pub const STORAGE_KEY: &str = "welloChatThreadId";

/// Session-scoped home of the thread id.
///
/// The id lives under the user's runtime directory, which is cleared when
/// the login session ends, so a new session gets a new thread. When that
/// directory is missing or unwritable the id degrades to in-memory for
/// this process, which still keeps repeated lookups stable.
pub struct SessionStore {
    path: Option<PathBuf>,
    fallback: Option<ThreadId>,
}

impl SessionStore {
    pub fn open() -> Self {
        let dir = dirs::runtime_dir().map(|dir| dir.join("wello"));
        if dir.is_none() {
            warn!("No runtime directory; the thread id will not outlive this process");
        }

        Self {
            path: dir.map(|dir| dir.join(STORAGE_KEY)),
            fallback: None,
        }
    }

    /// Store under an explicit directory instead of the runtime dir.
    pub fn at(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(STORAGE_KEY)),
            fallback: None,
        }
    }

    /// Process-local store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            fallback: None,
        }
    }

    /// Return the session's thread id, minting and persisting a fresh one
    /// on first use. Repeated calls return the identical value.
    pub fn get_or_create(&mut self) -> ThreadId {
        if let Some(id) = &self.fallback {
            return id.clone();
        }

        if let Some(path) = &self.path {
            if let Some(existing) = read_id(path) {
                return existing;
            }
        }

        let fresh = ThreadId::generate();
        match &self.path {
            Some(path) => {
                if let Err(e) = write_id(path, &fresh) {
                    warn!("Could not persist thread id ({}); keeping it in memory", e);
                    self.fallback = Some(fresh.clone());
                }
            }
            None => self.fallback = Some(fresh.clone()),
        }
        fresh
    }
}

fn read_id(path: &Path) -> Option<ThreadId> {
    let raw = fs::read_to_string(path).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(ThreadId::new(trimmed))
}

fn write_id(path: &Path, id: &ThreadId) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, id.as_str())
}
