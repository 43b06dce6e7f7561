//! Persistence of the auth slice between runs.
//!
//! Only the auth slice is kept, together with the session cookie header the
//! API set for it. The file is versioned; a file that does not parse or was
//! written by another version is discarded and the store starts fresh.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::AuthState;

/// Format version of the persisted file.
pub const PERSIST_VERSION: u32 = 1;

/// Errors that can occur while saving state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where persisted state lives.
pub trait StateStorage: Send + Sync {
    /// The stored text, or `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self) -> Result<Option<String>, PersistError>;

    /// Replace the stored text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, contents: &str) -> Result<(), PersistError>;

    /// Remove the stored text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be cleared.
    fn clear(&self) -> Result<(), PersistError>;
}

// =============================================================================
// Backends
// =============================================================================

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-memory storage. Clones share contents, so a second store built from a
/// clone sees what the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// What is currently stored.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), PersistError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// Persistor
// =============================================================================

/// The persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    version: u32,
    #[serde(default)]
    auth: AuthState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_cookie: Option<String>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: PERSIST_VERSION,
            auth: AuthState::default(),
            session_cookie: None,
        }
    }
}

/// Loads persisted state once and writes it back on every change.
#[derive(Clone)]
pub struct Persistor {
    storage: Arc<dyn StateStorage>,
    state: Arc<Mutex<PersistedState>>,
}

impl Persistor {
    /// Read what `storage` holds. Unreadable, corrupt or outdated contents
    /// are logged and replaced by the initial state.
    pub fn open(storage: impl StateStorage + 'static) -> Self {
        let state = match storage.read() {
            Ok(Some(contents)) => parse(&contents),
            Ok(None) => PersistedState::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted state, starting fresh");
                PersistedState::default()
            }
        };

        Self {
            storage: Arc::new(storage),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// The persisted auth slice.
    #[must_use]
    pub fn auth(&self) -> AuthState {
        self.lock().auth.clone()
    }

    /// The persisted session cookie header.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.lock().session_cookie.clone()
    }

    /// Save a new auth slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    pub fn write_auth(&self, auth: &AuthState) -> Result<(), PersistError> {
        let mut state = self.lock();
        state.auth = auth.clone();
        self.flush(&state)
    }

    /// Save the session cookie header; `None` forgets it.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    pub fn write_session_cookie(&self, cookie: Option<String>) -> Result<(), PersistError> {
        let mut state = self.lock();
        if state.session_cookie == cookie {
            return Ok(());
        }
        state.session_cookie = cookie;
        self.flush(&state)
    }

    /// Forget everything, in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be cleared.
    pub fn purge(&self) -> Result<(), PersistError> {
        *self.lock() = PersistedState::default();
        self.storage.clear()
    }

    fn flush(&self, state: &PersistedState) -> Result<(), PersistError> {
        let contents = serde_json::to_string_pretty(state)?;
        self.storage.write(&contents)?;
        debug!("Persisted state written");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PersistedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse(contents: &str) -> PersistedState {
    match serde_json::from_str::<PersistedState>(contents) {
        Ok(state) if state.version == PERSIST_VERSION => state,
        Ok(state) => {
            warn!(
                found = state.version,
                expected = PERSIST_VERSION,
                "Discarding persisted state from another version"
            );
            PersistedState::default()
        }
        Err(e) => {
            warn!(error = %e, "Discarding corrupt persisted state");
            PersistedState::default()
        }
    }
}
