//! Multipart form → `ResumeInput`.

use axum::extract::multipart::{Multipart, MultipartError};
use tracing::debug;

use crate::errors::AppError;
use crate::models::resume::{ResumeInput, SectionInput};

/// Reads every field of the builder form. Unknown fields are ignored; an empty
/// `photo` part counts as no photo.
pub async fn read_resume_form(mut multipart: Multipart) -> Result<ResumeInput, AppError> {
    let mut input = ResumeInput::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "photo" {
            let bytes = field.bytes().await.map_err(malformed)?;
            if !bytes.is_empty() {
                debug!(bytes = bytes.len(), "Received photo upload");
                input.photo = Some(bytes);
            }
            continue;
        }
        let value = field.text().await.map_err(malformed)?;
        apply_field(&mut input, &name, value);
    }

    Ok(input)
}

fn malformed(e: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed form data: {}", e.body_text()))
}

/// Stores one text field on `input`.
pub fn apply_field(input: &mut ResumeInput, name: &str, value: String) {
    let record = &mut input.record;
    match name {
        "name" => record.name = value,
        "title" => record.title = value,
        "email" => record.email = value,
        "phone" => record.phone = value,
        "location" => record.location = value,
        "linkedin" => record.linkedin = value,
        "github" => record.github = value,
        "portfolio" => record.portfolio = value,
        "summary" => record.summary = value,
        "skills" => record.skills = value,
        "certifications" => record.certifications = value,
        "experience" => input.experience = SectionInput::Text(value),
        "education" => input.education = SectionInput::Text(value),
        "projects" => input.projects = SectionInput::Text(value),
        "template" => input.template = Some(value),
        "theme" => input.theme = Some(value),
        other => debug!("Ignoring unknown form field '{other}'"),
    }
}
