use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::applications::placement::ResumePlacer;
use crate::applications::validation::{
    find_duplicate, validate_required_fields, validate_resume_or_experience,
};
use crate::errors::AppError;
use crate::models::application::{ApplicantInput, ApplicationRecord, UploadedResume};
use crate::store::{next_id, ApplicationStore};

/// Submission, listing and deletion over the application store.
///
/// Mutations hold `writes` across their load-modify-save cycle, so two requests
/// in this process never overwrite each other's changes.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
    placer: ResumePlacer,
    writes: Arc<Mutex<()>>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn ApplicationStore>, placer: ResumePlacer) -> Self {
        ApplicationService {
            store,
            placer,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Validates and stores a new application, placing the resume first if one
    /// was uploaded. Nothing is written when any validation fails.
    pub async fn submit(
        &self,
        input: ApplicantInput,
        resume: Option<UploadedResume>,
    ) -> Result<ApplicationRecord, AppError> {
        let input = input.normalized();
        validate_required_fields(&input)?;
        validate_resume_or_experience(resume.is_some(), input.experience.as_deref())?;

        let _guard = self.writes.lock().await;

        let mut records = self.store.load().await?;
        if let Some(existing) = find_duplicate(&records, &input.email, &input.phone, &input.whatsapp)
        {
            info!("Rejected duplicate applicant (matches id {})", existing.id);
            return Err(AppError::DuplicateApplicant);
        }

        let placed = match &resume {
            Some(file) => Some(self.placer.place(file).await?),
            None => None,
        };

        let record = input.into_record(
            next_id(&records),
            placed.as_ref().map(|p| p.public_path.clone()),
        );
        records.push(record.clone());

        if let Err(e) = self.store.save(&records).await {
            if let Some(placed) = &placed {
                self.placer.discard(placed).await;
            }
            return Err(e);
        }

        info!(
            "Stored application {} (resume: {})",
            record.id,
            record.resume.as_deref().unwrap_or("none")
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<ApplicationRecord>, AppError> {
        self.store.load().await
    }

    /// Removes the record whose id matches `raw_id`. The id arrives as URL text;
    /// anything that does not parse as an id, or matches nothing, is a no-op.
    /// Returns whether a record was removed.
    pub async fn delete(&self, raw_id: &str) -> Result<bool, AppError> {
        let Ok(id) = raw_id.trim().parse::<u64>() else {
            return Ok(false);
        };

        let _guard = self.writes.lock().await;

        let mut records = self.store.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }

        self.store.save(&records).await?;
        info!("Deleted application {id}");
        Ok(true)
    }
}
