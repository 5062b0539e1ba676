use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRecord;

/// Persistence for the full application collection. Every call reads or
/// replaces the whole collection; there are no partial updates.
///
/// Carried in `AppState` as `Arc<dyn ApplicationStore>`.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Returns every stored record in insertion order.
    async fn load(&self) -> Result<Vec<ApplicationRecord>, AppError>;

    /// Replaces the stored collection with `records`.
    async fn save(&self, records: &[ApplicationRecord]) -> Result<(), AppError>;
}

/// Id for the next inserted record: one past the highest id present.
pub fn next_id(records: &[ApplicationRecord]) -> u64 {
    records.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
}

/// Stores the collection as a pretty-printed JSON array in a single file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the file with `[]` if it is absent or blank.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = JsonFileStore { path: path.into() };
        store.load().await?;
        info!("Application store ready at {}", store.path().display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn initialize(&self) -> Result<(), AppError> {
        debug!("Initializing empty application store at {}", self.path.display());
        self.prepare_parent().await?;
        tokio::fs::write(&self.path, b"[]")
            .await
            .map_err(|source| AppError::FileWrite {
                path: self.path.clone(),
                source,
            })
    }

    async fn prepare_parent(&self) -> Result<(), AppError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| AppError::FileWrite {
                    path: parent.to_path_buf(),
                    source,
                }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ApplicationStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<ApplicationRecord>, AppError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.initialize().await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!(
                        "Failed to read application store {}",
                        self.path.display()
                    ))
                    .into())
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            self.initialize().await?;
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw)
            .map_err(|e| AppError::CorruptStore(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, records: &[ApplicationRecord]) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(records)
            .context("Failed to encode application records")?;

        self.prepare_parent().await?;

        // Write beside the target and rename over it so readers never see a torn file.
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|source| AppError::FileWrite {
                path: temp_path.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(AppError::FileWrite {
                path: self.path.clone(),
                source,
            });
        }

        debug!("Saved {} application(s)", records.len());
        Ok(())
    }
}
