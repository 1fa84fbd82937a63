use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::form::read_resume_form;
use crate::export::{download_filename, DocumentFormat};
use crate::models::resume::ResumeInput;
use crate::models::theme::{Accent, Template, Theme};
use crate::render::{render, section_headings, Block};
use crate::state::AppState;

#[derive(Serialize)]
pub struct TemplateInfo {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub color: String,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub templates: Vec<TemplateInfo>,
    pub themes: Vec<ThemeInfo>,
    pub default_template: Template,
    pub default_theme: Accent,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub theme: Theme,
    /// Section headings in render order, for an outline next to the preview.
    pub sections: Vec<String>,
    pub blocks: Vec<Block>,
}

/// GET /api/v1/templates
pub async fn handle_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let defaults = state.config.default_theme();
    Json(CatalogResponse {
        templates: Template::ALL
            .iter()
            .map(|t| TemplateInfo {
                name: t.as_str(),
                description: t.description(),
            })
            .collect(),
        themes: Accent::ALL
            .iter()
            .map(|a| ThemeInfo {
                name: a.as_str(),
                color: a.rgb().hex(),
            })
            .collect(),
        default_template: defaults.template,
        default_theme: defaults.accent,
    })
}

/// GET /api/v1/resumes/sample
pub async fn handle_sample() -> Json<ResumeInput> {
    Json(ResumeInput::sample())
}

/// POST /api/v1/resumes/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(input): Json<ResumeInput>,
) -> Result<Json<PreviewResponse>, AppError> {
    let resume = input.validate(state.config.default_theme())?;
    let theme = resume.theme;
    let blocks = tokio::task::spawn_blocking(move || {
        render(
            &resume.record,
            &resume.entries,
            resume.theme,
            resume.photo.as_deref(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("preview task failed: {e}")))?;
    let sections = section_headings(&blocks)
        .into_iter()
        .map(String::from)
        .collect();
    Ok(Json(PreviewResponse {
        theme,
        sections,
        blocks,
    }))
}

/// POST /api/v1/resumes/pdf
pub async fn handle_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    download(&state, multipart, DocumentFormat::Pdf).await
}

/// POST /api/v1/resumes/docx
pub async fn handle_docx(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    download(&state, multipart, DocumentFormat::Docx).await
}

/// Validates the form, then renders and emits off the async executor.
/// Nothing is written to the response unless the whole document succeeded.
async fn download(
    state: &AppState,
    multipart: Multipart,
    format: DocumentFormat,
) -> Result<Response, AppError> {
    let input = read_resume_form(multipart).await?;
    let resume = input.validate(state.config.default_theme())?;
    let filename = download_filename(&resume.record.name, resume.theme, format, &Local::now());

    let bytes = tokio::task::spawn_blocking(move || {
        let blocks = render(
            &resume.record,
            &resume.entries,
            resume.theme,
            resume.photo.as_deref(),
        );
        format.emit(&blocks, resume.theme)
    })
    .await
    .map_err(|e| AppError::Render(format!("render task failed: {e}")))??;

    info!(%filename, bytes = bytes.len(), "Generated resume download");

    Ok((
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
