//! Content generation: pluggable drafting of resumes and cover letters.
//!
//! `LlmContentGenerator` sends one prompt per request to the chat-completion provider.
//! `FallbackContentGenerator` fabricates deterministic documents when no credential
//! is configured. `AppState` holds an `Arc<dyn ContentGenerator>`, picked at startup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::fallback::{fallback_cover_letter, fallback_resume};
use crate::generation::prompts::{
    fill_template, COVER_LETTER_MAX_TOKENS, COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM,
    RESUME_MAX_TOKENS, RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM,
};
use crate::llm_client::LlmClient;
use crate::models::resume::{CoverLetterRequest, ResumeDocument, ResumeRequest};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn resume(&self, request: &ResumeRequest) -> Result<ResumeDocument, AppError>;

    async fn cover_letter(&self, request: &CoverLetterRequest) -> Result<String, AppError>;

    /// "llm" or "fallback", for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Picks the LLM-backed generator when a client is available, else the fallback.
pub fn content_generator(llm: Option<LlmClient>) -> Arc<dyn ContentGenerator> {
    match llm {
        Some(llm) => {
            info!("Content generation backed by model {}", llm.model());
            Arc::new(LlmContentGenerator::new(llm))
        }
        None => {
            warn!("No AI provider key configured; using fallback templates");
            Arc::new(FallbackContentGenerator)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed generator
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmContentGenerator {
    llm: LlmClient,
}

impl LlmContentGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn resume(&self, request: &ResumeRequest) -> Result<ResumeDocument, AppError> {
        let prompt = build_resume_prompt(request);
        let document: ResumeDocument = self
            .llm
            .call_json(&prompt, RESUME_SYSTEM, RESUME_MAX_TOKENS)
            .await?;
        info!(
            "Drafted resume for target role {:?}: {} skills, {} experience entries",
            request.target_role,
            document.skills.len(),
            document.experience.len()
        );
        Ok(document)
    }

    async fn cover_letter(&self, request: &CoverLetterRequest) -> Result<String, AppError> {
        let prompt = build_cover_letter_prompt(request);
        let letter = self
            .llm
            .call_text(&prompt, COVER_LETTER_SYSTEM, COVER_LETTER_MAX_TOKENS)
            .await?;
        Ok(letter)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback generator
// ────────────────────────────────────────────────────────────────────────────

pub struct FallbackContentGenerator;

#[async_trait]
impl ContentGenerator for FallbackContentGenerator {
    async fn resume(&self, request: &ResumeRequest) -> Result<ResumeDocument, AppError> {
        Ok(fallback_resume(request))
    }

    async fn cover_letter(&self, request: &CoverLetterRequest) -> Result<String, AppError> {
        Ok(fallback_cover_letter(request))
    }

    fn backend(&self) -> &'static str {
        "fallback"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

/// Embeds every form field verbatim into the resume instruction.
pub fn build_resume_prompt(request: &ResumeRequest) -> String {
    fill_template(
        RESUME_PROMPT_TEMPLATE,
        &[
            ("name", request.name.as_str()),
            ("email", request.email.as_str()),
            ("phone", request.phone.as_str()),
            ("target_role", request.target_role.as_str()),
            ("skills", request.skills.as_str()),
            ("education", request.education.as_str()),
            ("experience", request.experience.as_str()),
            ("projects", request.projects.as_str()),
        ],
    )
}

pub fn build_cover_letter_prompt(request: &CoverLetterRequest) -> String {
    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("name", request.name.as_str()),
            ("target_role", request.target_role.as_str()),
            ("company", request.company.as_str()),
            ("skills", request.skills.as_str()),
            ("experience", request.experience.as_str()),
        ],
    )
}
