use crate::common::CredentialStoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Names of the two credentials kept by a [`CredentialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    /// Key under which the credential is persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "accessToken",
            CredentialKey::RefreshToken => "refreshToken",
        }
    }

    pub const ALL: [CredentialKey; 2] = [CredentialKey::AccessToken, CredentialKey::RefreshToken];
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide key-value store for bearer credentials.
///
/// Stores hold plain strings with no expiry metadata. Implementations must
/// be safe to share between concurrent requests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, CredentialStoreError>;

    async fn set(&self, key: CredentialKey, value: String) -> Result<(), CredentialStoreError>;

    async fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError>;

    /// Removes every credential.
    async fn clear(&self) -> Result<(), CredentialStoreError> {
        for key in CredentialKey::ALL {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// In-memory credential store. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    values: Arc<RwLock<HashMap<CredentialKey, String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<(), CredentialStoreError> {
        self.values.write().await.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError> {
        self.values.write().await.remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.values.write().await.clear();
        Ok(())
    }
}

/// Credential store persisted as a JSON object on disk.
///
/// The file maps `accessToken` / `refreshToken` to their values, mirroring
/// how the browser front end keeps them in local storage. A missing file is
/// an empty store. Writes go to a sibling temporary file that is renamed
/// over the original; on Unix it is created with mode `0600`.
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> CredentialStoreError {
        CredentialStoreError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>, CredentialStoreError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }

        serde_json::from_slice(&contents).map_err(|e| CredentialStoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, values: &HashMap<String, String>) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_vec_pretty(values).map_err(|e| CredentialStoreError::Io {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Readers see either the old file or the new one, never a partial write
        let temp_path = self.path.with_extension("tmp");
        match tokio::fs::remove_file(&temp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&temp_path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(&contents)
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.load().await?.remove(key.as_str()))
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.as_str().to_string(), value);
        self.save(&values).await
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        if values.remove(key.as_str()).is_some() {
            self.save(&values).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?
        {
            self.save(&HashMap::new()).await?;
        }
        Ok(())
    }
}
