//! Axum route handlers for downloads.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::models::resume::{PersonalInfo, ResumeDocument};
use crate::render::{render_resume_pdf, RenderError, RenderOptions};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadPdfRequest {
    pub resume_data: ResumeDocument,
    pub personal_info: PersonalInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadCoverLetterRequest {
    pub cover_letter: String,
}

/// `resume.pdf`, or `resume_<Name_With_Underscores>.pdf` when a name is given.
/// Characters that are unsafe in a header value are dropped.
pub fn resume_filename(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    if slug.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("resume_{slug}.pdf")
    }
}

fn attachment(content_type: &str, filename: &str, body: impl IntoResponse) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /api/download-pdf
///
/// Layout runs on the blocking pool; a large document can take a few milliseconds.
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DownloadPdfRequest>,
) -> Result<Response, AppError> {
    let filename = resume_filename(&request.personal_info.name);
    let options = RenderOptions {
        footer: state.config.pdf_footer.clone(),
    };

    let bytes = tokio::task::spawn_blocking(move || {
        render_resume_pdf(&request.resume_data, &request.personal_info, &options)
    })
    .await
    .map_err(RenderError::from)??;

    info!("Rendered {filename} ({} bytes)", bytes.len());
    Ok(attachment("application/pdf", &filename, bytes))
}

/// POST /api/download-cover-letter
pub async fn handle_download_cover_letter(
    ApiJson(request): ApiJson<DownloadCoverLetterRequest>,
) -> Result<Response, AppError> {
    if request.cover_letter.trim().is_empty() {
        return Err(AppError::Validation("coverLetter must not be empty".to_string()));
    }
    Ok(attachment(
        "text/plain; charset=utf-8",
        "cover_letter.txt",
        request.cover_letter,
    ))
}
