//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::models::resume::{CoverLetterRequest, PersonalInfo, ResumeDocument, ResumeRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResumeResponse {
    pub success: bool,
    pub resume: ResumeDocument,
    pub personal_info: PersonalInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCoverLetterResponse {
    pub success: bool,
    pub cover_letter: String,
}

/// POST /api/generate-resume
///
/// Drafts a `ResumeDocument` from the form fields. No field is required.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ResumeRequest>,
) -> Result<Json<GenerateResumeResponse>, AppError> {
    info!(
        "Generating resume via {} backend",
        state.generator.backend()
    );
    let resume = state.generator.resume(&request).await?;

    Ok(Json(GenerateResumeResponse {
        success: true,
        resume,
        personal_info: request.personal_info(),
    }))
}

/// POST /api/generate-cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CoverLetterRequest>,
) -> Result<Json<GenerateCoverLetterResponse>, AppError> {
    info!(
        "Generating cover letter via {} backend",
        state.generator.backend()
    );
    let cover_letter = state.generator.cover_letter(&request).await?;

    Ok(Json(GenerateCoverLetterResponse {
        success: true,
        cover_letter,
    }))
}
