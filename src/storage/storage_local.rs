//! Local filesystem document store
//!
//! This module provides a document store backed by a directory, one file per
//! record:
//! - File names are the hex encoding of the record id, so any id is safe
//! - File contents are the [`DocumentRecord`] JSON, id included
//! - Atomic writes through a uniquely named temporary file and a rename
//! - Optional Unix permissions for files and directories

use crate::error::{StorageError, StorageResult};
use crate::storage::adapter::{DocumentRecord, DocumentStore};
use crate::utils;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;

/// Local storage configuration
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Base directory for storage
    pub base_path: PathBuf,
    /// Create the base directory if it doesn't exist
    pub create_dirs: bool,
    /// Use atomic writes (write to temp file, then rename)
    pub atomic_writes: bool,
    /// File permissions (Unix only)
    pub file_permissions: Option<u32>,
    /// Directory permissions (Unix only)
    pub dir_permissions: Option<u32>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./auth_state"),
            create_dirs: true,
            atomic_writes: true,
            file_permissions: Some(0o600),
            dir_permissions: Some(0o700),
        }
    }
}

/// Local filesystem document store
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    config: LocalConfig,
}

impl LocalDocumentStore {
    /// Create a new local document store
    pub fn new(config: LocalConfig) -> StorageResult<Self> {
        if config.create_dirs && !config.base_path.exists() {
            fs::create_dir_all(&config.base_path).map_err(|e| StorageError::OperationFailed {
                operation: "create_base_directory".to_string(),
                reason: format!("Failed to create base directory: {}", e),
            })?;

            #[cfg(unix)]
            if let Some(perms) = config.dir_permissions {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&config.base_path, fs::Permissions::from_mode(perms)).map_err(
                    |e| StorageError::OperationFailed {
                        operation: "set_directory_permissions".to_string(),
                        reason: format!("Failed to set directory permissions: {}", e),
                    },
                )?;
            }
        }

        if !config.base_path.is_dir() {
            return Err(StorageError::OperationFailed {
                operation: "verify_base_directory".to_string(),
                reason: format!(
                    "{} is not a directory and create_dirs is disabled",
                    config.base_path.display()
                ),
            });
        }

        Ok(Self { config })
    }

    /// Store rooted at `base_path` with default settings
    pub fn open(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        Self::new(LocalConfig {
            base_path: base_path.into(),
            ..Default::default()
        })
    }

    /// The active configuration
    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.config.base_path.join(utils::record_file_name(id))
    }

    /// Sorted identifiers of every stored record
    pub async fn ids(&self) -> StorageResult<Vec<String>> {
        let mut entries = async_fs::read_dir(&self.config.base_path)
            .await
            .map_err(|e| StorageError::OperationFailed {
                operation: "read_directory".to_string(),
                reason: format!("Failed to read directory: {}", e),
            })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(utils::record_id_from_file_name)
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        if self.config.atomic_writes {
            let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
            Self::write_and_flush(&temp_path, contents).await?;
            if let Err(e) = async_fs::rename(&temp_path, path).await {
                let _ = async_fs::remove_file(&temp_path).await;
                return Err(StorageError::OperationFailed {
                    operation: "atomic_rename".to_string(),
                    reason: format!("Failed to rename temporary file: {}", e),
                });
            }
        } else {
            Self::write_and_flush(path, contents).await?;
        }

        #[cfg(unix)]
        if let Some(perms) = self.config.file_permissions {
            use std::os::unix::fs::PermissionsExt;
            async_fs::set_permissions(path, fs::Permissions::from_mode(perms))
                .await
                .map_err(|e| StorageError::OperationFailed {
                    operation: "set_file_permissions".to_string(),
                    reason: format!("Failed to set file permissions: {}", e),
                })?;
        }

        Ok(())
    }

    async fn write_and_flush(path: &Path, contents: &[u8]) -> StorageResult<()> {
        let mut file = async_fs::File::create(path)
            .await
            .map_err(|e| StorageError::OperationFailed {
                operation: "create_file".to_string(),
                reason: format!("Failed to create {}: {}", path.display(), e),
            })?;
        file.write_all(contents)
            .await
            .map_err(|e| StorageError::OperationFailed {
                operation: "write_file".to_string(),
                reason: format!("Failed to write {}: {}", path.display(), e),
            })?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::OperationFailed {
                operation: "flush_file".to_string(),
                reason: format!("Failed to flush {}: {}", path.display(), e),
            })?;
        Ok(())
    }
}

impl DocumentStore for LocalDocumentStore {
    async fn find_one(&self, id: &str) -> StorageResult<Option<DocumentRecord>> {
        let path = self.record_path(id);
        let text = match async_fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::OperationFailed {
                    operation: "read_file".to_string(),
                    reason: format!("Failed to read {}: {}", path.display(), e),
                })
            }
        };

        let record: DocumentRecord =
            serde_json::from_str(&text).map_err(|e| StorageError::OperationFailed {
                operation: "parse_record".to_string(),
                reason: format!("Corrupt record file {}: {}", path.display(), e),
            })?;
        if record.id != id {
            return Err(StorageError::OperationFailed {
                operation: "parse_record".to_string(),
                reason: format!("Record file {} holds id {:?}", path.display(), record.id),
            });
        }

        tracing::trace!(id, path = %path.display(), "read record file");
        Ok(Some(record))
    }

    async fn upsert(&self, id: &str, data: String) -> StorageResult<()> {
        let path = self.record_path(id);
        let record = DocumentRecord::new(id, data);
        let contents = serde_json::to_vec(&record).map_err(|e| StorageError::OperationFailed {
            operation: "encode_record".to_string(),
            reason: e.to_string(),
        })?;
        self.write_file(&path, &contents).await?;
        tracing::trace!(id, path = %path.display(), "wrote record file");
        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.record_path(id);
        match async_fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::OperationFailed {
                operation: "delete_file".to_string(),
                reason: format!("Failed to delete {}: {}", path.display(), e),
            }),
        }
    }
}
