use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One stored job application. Created on submission, removed only by an admin
/// delete, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: String,
    pub education: String,
    #[serde(default)]
    pub experience: Option<String>,
    /// Public path of the uploaded resume, e.g. `/uploads/resume_1700000000000.pdf`.
    #[serde(default)]
    pub resume: Option<String>,
}

/// Text fields of the public application form, as submitted.
/// Absent fields deserialize as empty so validation can name them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicantInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: String,
    pub education: String,
    pub experience: Option<String>,
}

impl ApplicantInput {
    /// Trims every field and drops a blank experience.
    pub fn normalized(self) -> Self {
        ApplicantInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
            education: self.education.trim().to_string(),
            experience: self
                .experience
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }

    pub fn into_record(self, id: u64, resume: Option<String>) -> ApplicationRecord {
        ApplicationRecord {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            whatsapp: self.whatsapp,
            education: self.education,
            experience: self.experience,
            resume,
        }
    }
}

/// A resume file received with the form.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub file_name: String,
    pub data: Bytes,
}
