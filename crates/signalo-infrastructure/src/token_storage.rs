//! File-backed credential store.
//!
//! Persists the one opaque auth token in `~/.config/signalo/token.json`.
//! Writes are atomic (tmp file + fsync + rename) and mutations take an
//! exclusive advisory lock, so interleaved login/logout from two processes
//! cannot tear the file.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signalo_core::credential::CredentialStore;
use signalo_core::error::{Result, SignaloError};

use crate::paths::SignaloPaths;

/// On-disk shape of the token file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenRecord {
    token: String,
}

/// Credential store backed by a JSON file.
///
/// Responsibilities:
/// - Persist the token across process restarts
/// - Atomic replacement on write, exclusive lock on mutation
/// - 600 permissions on Unix
///
/// Does NOT:
/// - Encrypt the token (plaintext JSON, like the rest of the config dir)
/// - Enforce expiry (the backend is authoritative)
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store at the default path (~/.config/signalo/token.json).
    pub fn new() -> Result<Self> {
        let path = SignaloPaths::token_file()
            .map_err(|e| SignaloError::storage(format!("cannot resolve token path: {e}")))?;
        Ok(Self { path })
    }

    /// Creates a store with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path to the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(path: &Path) -> Result<Option<TokenRecord>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let record: TokenRecord = serde_json::from_str(&content)
            .map_err(|e| SignaloError::storage(format!("token file is corrupt: {e}")))?;
        Ok(Some(record))
    }

    fn write_record(path: &Path, record: &TokenRecord) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| SignaloError::storage(format!("cannot serialize token: {e}")))?;

        // Write to a temporary file in the same directory, then rename.
        let tmp_path = Self::temp_path(path)?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn remove_file(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn temp_path(path: &Path) -> Result<PathBuf> {
        let parent = path
            .parent()
            .ok_or_else(|| SignaloError::storage("token path has no parent directory"))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| SignaloError::storage("token path has no file name"))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn set(&self, token: &str) -> Result<()> {
        let path = self.path.clone();
        let record = TokenRecord {
            token: token.to_string(),
        };
        tokio::task::spawn_blocking(move || {
            let _lock = FileLock::acquire(&path)?;
            Self::write_record(&path, &record)
        })
        .await
        .map_err(|e| SignaloError::storage(format!("failed to join storage task: {e}")))??;

        tracing::debug!("token persisted");
        Ok(())
    }

    async fn get(&self) -> Result<Option<String>> {
        let path = self.path.clone();
        let record = tokio::task::spawn_blocking(move || Self::read_record(&path))
            .await
            .map_err(|e| SignaloError::storage(format!("failed to join storage task: {e}")))??;
        Ok(record.map(|r| r.token))
    }

    async fn clear(&self) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = FileLock::acquire(&path)?;
            Self::remove_file(&path)
        })
        .await
        .map_err(|e| SignaloError::storage(format!("failed to join storage task: {e}")))??;

        tracing::debug!("token cleared");
        Ok(())
    }
}

/// A file lock guard that automatically releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock next to the given path.
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| SignaloError::storage(format!("failed to acquire lock: {e}")))?;
        }

        #[cfg(not(unix))]
        {
            // No advisory locking off Unix; single-user desktop use.
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped.
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_without_file_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("token.json"));
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("token.json"));

        store.set("tok-abc").await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some("tok-abc".to_string()));
    }

    #[tokio::test]
    async fn test_token_survives_a_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token.json");

        let store = FileCredentialStore::with_path(path.clone());
        store.set("tok-persist").await.unwrap();
        drop(store);

        let reopened = FileCredentialStore::with_path(path);
        assert_eq!(
            reopened.get().await.unwrap(),
            Some("tok-persist".to_string())
        );
    }

    #[tokio::test]
    async fn test_clear_removes_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token.json");
        let store = FileCredentialStore::with_path(path.clone());

        store.set("tok-gone").await.unwrap();
        store.clear().await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.get().await.unwrap(), None);

        // Clearing again is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_replaces_previous_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("token.json"));

        store.set("first").await.unwrap();
        store.set("second").await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some("second".to_string()));

        // No temp file left behind.
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token.json");
        let store = FileCredentialStore::with_path(path.clone());

        store.set("tok-secret").await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
