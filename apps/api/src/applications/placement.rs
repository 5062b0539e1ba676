use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::application::UploadedResume;

const PUBLIC_PREFIX: &str = "/uploads";

/// Where a resume ended up: on disk, and as served to browsers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedResume {
    pub disk_path: PathBuf,
    pub public_path: String,
}

/// Writes uploaded resumes into the public uploads directory under
/// `resume_<unix millis><original extension>`.
///
/// Two uploads in the same millisecond get the same name and the later one
/// overwrites the earlier.
#[derive(Debug, Clone)]
pub struct ResumePlacer {
    upload_dir: PathBuf,
}

impl ResumePlacer {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        ResumePlacer {
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn place(&self, file: &UploadedResume) -> Result<PlacedResume, AppError> {
        self.place_at(file, Utc::now().timestamp_millis()).await
    }

    pub async fn place_at(
        &self,
        file: &UploadedResume,
        millis: i64,
    ) -> Result<PlacedResume, AppError> {
        let file_name = resume_file_name(&file.file_name, millis);
        let disk_path = self.upload_dir.join(&file_name);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| AppError::FileWrite {
                path: self.upload_dir.clone(),
                source,
            })?;
        tokio::fs::write(&disk_path, &file.data)
            .await
            .map_err(|source| AppError::FileWrite {
                path: disk_path.clone(),
                source,
            })?;

        debug!(
            "Placed resume '{}' ({} bytes) at {}",
            file.file_name,
            file.data.len(),
            disk_path.display()
        );

        Ok(PlacedResume {
            disk_path,
            public_path: format!("{PUBLIC_PREFIX}/{file_name}"),
        })
    }

    /// Best-effort removal of a resume whose application was never stored.
    pub async fn discard(&self, placed: &PlacedResume) {
        if let Err(e) = tokio::fs::remove_file(&placed.disk_path).await {
            warn!(
                "Could not remove orphaned resume {}: {e}",
                placed.disk_path.display()
            );
        }
    }
}

/// `resume_<millis>` plus the original extension with its dot, if any.
pub fn resume_file_name(original: &str, millis: i64) -> String {
    match Path::new(original).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("resume_{millis}.{ext}"),
        None => format!("resume_{millis}"),
    }
}
