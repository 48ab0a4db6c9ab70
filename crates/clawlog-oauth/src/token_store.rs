//! Token persistence.
//!
//! The file store writes the whole record to a sibling temp file and renames
//! it into place, restricting permissions to the owner where the platform
//! allows. Loading never fails: a missing, unreadable, or corrupt file is
//! reported as "no token" so callers simply ask the user to log in again.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{OAuthError, Result};
use crate::types::{TokenRecord, now_epoch_secs};

/// Default token file name within the claw-log data directory.
pub const TOKEN_FILE: &str = "oauth_tokens.json";

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Storage for the single OAuth credential.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Persist `record`, returning the stored copy with `saved_at` stamped.
    async fn save(&self, record: &TokenRecord) -> Result<TokenRecord>;

    /// Load the stored record; `None` if absent or unusable.
    async fn load(&self) -> Option<TokenRecord>;

    /// Remove the stored record.
    async fn delete(&self) -> Result<()>;

    /// Whether anything is stored (valid or not).
    fn exists(&self) -> bool;
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// File-based token store for production use.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    token_path: PathBuf,
}

impl FileTokenStore {
    /// Create a store at `data_dir/oauth_tokens.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            token_path: data_dir.join(TOKEN_FILE),
        }
    }

    /// Create with a custom token path.
    pub fn with_path(token_path: PathBuf) -> Self {
        Self { token_path }
    }

    /// Get the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .token_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| TOKEN_FILE.into());
        name.push(".tmp");
        self.token_path.with_file_name(name)
    }

    fn write_file(&self, json: &[u8]) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                OAuthError::Storage(format!("failed to create token directory: {}", e))
            })?;
        }

        let tmp = self.temp_path();
        let mut file = open_private(&tmp)
            .map_err(|e| OAuthError::Storage(format!("failed to create token file: {}", e)))?;
        file.write_all(json)
            .and_then(|_| file.sync_all())
            .map_err(|e| OAuthError::Storage(format!("failed to write token file: {}", e)))?;
        drop(file);

        restrict_permissions(&tmp);

        std::fs::rename(&tmp, &self.token_path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            OAuthError::Storage(format!("failed to replace token file: {}", e))
        })
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Best effort: a filesystem that rejects the mode change does not block saving.
#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::warn!(path = %path.display(), error = %e, "Could not restrict token file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, record: &TokenRecord) -> Result<TokenRecord> {
        let mut stored = record.clone();
        stored.saved_at = now_epoch_secs();

        let json = serde_json::to_vec_pretty(&stored)?;
        self.write_file(&json)?;

        tracing::info!("Tokens saved to {}", self.token_path.display());
        Ok(stored)
    }

    async fn load(&self) -> Option<TokenRecord> {
        let content = match std::fs::read_to_string(&self.token_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Token file unreadable, treating as logged out");
                return None;
            }
        };

        match serde_json::from_str::<TokenRecord>(&content) {
            Ok(record) if !record.access_token.is_empty() => Some(record),
            Ok(_) => {
                tracing::warn!("Token file has no access token, treating as logged out");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token file is corrupt, treating as logged out");
                None
            }
        }
    }

    async fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OAuthError::Storage(format!(
                "failed to delete token file: {}",
                e
            ))),
        }
    }

    fn exists(&self) -> bool {
        self.token_path.exists()
    }
}

// ============================================================================
// InMemoryTokenStore (for testing)
// ============================================================================

/// In-memory token store for testing.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    record: RwLock<Option<TokenRecord>>,
    save_count: std::sync::atomic::AtomicU32,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> u32 {
        self.save_count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn save(&self, record: &TokenRecord) -> Result<TokenRecord> {
        let mut stored = record.clone();
        stored.saved_at = now_epoch_secs();
        *self.record.write().await = Some(stored.clone());
        self.save_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(stored)
    }

    async fn load(&self) -> Option<TokenRecord> {
        self.record.read().await.clone()
    }

    async fn delete(&self) -> Result<()> {
        *self.record.write().await = None;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.record
            .try_read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> TokenRecord {
        TokenRecord {
            access_token: "test_access".to_string(),
            refresh_token: Some("test_refresh".to_string()),
            id_token: None,
            expires_in: 3600,
            expires_at: 1_900_000_000,
            saved_at: 0,
            token_type: Some("Bearer".to_string()),
            scope: Some("openid".to_string()),
        }
    }

    #[tokio::test]
    async fn test_file_store_new() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        assert!(!store.exists());
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_file_save_and_load() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());

        let before = now_epoch_secs();
        let saved = store.save(&sample()).await.unwrap();
        assert!(saved.saved_at >= before);
        assert!(store.exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(
            TokenRecord {
                saved_at: 0,
                ..loaded
            },
            sample()
        );
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::with_path(temp.path().join("nested/dir/tokens.json"));
        store.save(&sample()).await.unwrap();
        assert!(store.load().await.is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.save(&sample()).await.unwrap();

        let mode = std::fs::metadata(store.token_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_none() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.save(&sample()).await.unwrap();

        std::fs::write(store.token_path(), "{\"access_tok").unwrap();
        assert!(store.load().await.is_none());

        std::fs::write(store.token_path(), "").unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_record_without_access_token_loads_as_none() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());

        std::fs::write(store.token_path(), r#"{"refresh_token":"r"}"#).unwrap();
        assert!(store.load().await.is_none());

        std::fs::write(store.token_path(), r#"{"access_token":""}"#).unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_file_delete() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());

        store.save(&sample()).await.unwrap();
        assert!(store.exists());

        store.delete().await.unwrap();
        assert!(!store.exists());
        store.delete().await.unwrap();
    }

    #[tokio::test]
    async fn test_inmemory_store() {
        let store = InMemoryTokenStore::new();
        assert!(!store.exists());

        store.save(&sample()).await.unwrap();
        assert!(store.exists());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().await.unwrap().access_token, "test_access");

        store.delete().await.unwrap();
        assert!(store.load().await.is_none());
    }
}
