use crate::errors::AppError;
use crate::models::application::{ApplicantInput, ApplicationRecord};

/// Fails with `MissingField` naming the first blank required field, checked in
/// form order: name, email, phone, whatsapp, education.
pub fn validate_required_fields(input: &ApplicantInput) -> Result<(), AppError> {
    let required = [
        ("name", &input.name),
        ("email", &input.email),
        ("phone", &input.phone),
        ("whatsapp", &input.whatsapp),
        ("education", &input.education),
    ];

    match required.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(AppError::MissingField(*field)),
        None => Ok(()),
    }
}

/// An applicant must supply a resume file, written experience, or both.
pub fn validate_resume_or_experience(
    has_resume_file: bool,
    experience: Option<&str>,
) -> Result<(), AppError> {
    let has_experience = experience.is_some_and(|e| !e.trim().is_empty());
    if has_resume_file || has_experience {
        Ok(())
    } else {
        Err(AppError::MissingQualification)
    }
}

/// Returns the first record that shares the email (case-insensitive), phone,
/// or whatsapp number. Any one match is enough to reject the applicant.
pub fn find_duplicate<'a>(
    records: &'a [ApplicationRecord],
    email: &str,
    phone: &str,
    whatsapp: &str,
) -> Option<&'a ApplicationRecord> {
    let email = email.to_lowercase();
    records.iter().find(|r| {
        r.email.to_lowercase() == email || r.phone == phone || r.whatsapp == whatsapp
    })
}
