//! Résumé extraction — the full-document `/parse` path.
//!
//! Flow: uploaded file → plain text → one extraction call → `ResumeRecord`.
//! No plugin templating and no strict fence parsing here: the answer is
//! decoded leniently, with or without a code fence around it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::usage_log::UsageLog;
use crate::llm_client::{GenerationClient, Message};
use crate::validation::FieldViolation;

pub mod handlers;
pub mod prompts;

use prompts::{RESUME_EXTRACT_PROMPT, RESUME_EXTRACT_SYSTEM};

/// Usage-log tag for extraction calls.
pub const EXTRACTOR_NAME: &str = "resume_extractor";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceEntry {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Structured résumé fields. Every field defaults, so partial answers decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub educations: Vec<EducationEntry>,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperienceEntry>,
    #[serde(default)]
    pub years_of_experience: Option<f64>,
}

/// The extractor is asked for bare JSON but sometimes fences it anyway,
/// with or without a `json` tag. An unterminated fence keeps the rest.
fn unfence_answer(answer: &str) -> &str {
    let answer = answer.trim();
    let Some(body) = answer
        .strip_prefix("```json")
        .or_else(|| answer.strip_prefix("```"))
    else {
        return answer;
    };
    let body = body.trim_start();
    body.strip_suffix("```").map_or(body, str::trim)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Reads the text of an uploaded document. PDFs go through `pdf-extract`
/// on a blocking thread; anything else is read as (lossy) UTF-8.
pub async fn read_document_text(path: &Path) -> Result<String, AppError> {
    if is_pdf(path) {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::Document(format!("Could not read PDF: {e}")))
    } else {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Document(format!("Could not read upload: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub fn build_extraction_messages(resume_text: &str) -> Vec<Message> {
    vec![
        Message::system(RESUME_EXTRACT_SYSTEM),
        Message::user(RESUME_EXTRACT_PROMPT.replace("{resume_text}", resume_text)),
    ]
}

/// Extracts every supported field from the document at `path` in one call.
///
/// An unreachable backend yields an empty record; an answer that does not
/// decode as a `ResumeRecord` is an error.
pub async fn extract_all(
    path: &Path,
    client: &GenerationClient,
    usage_log: &UsageLog,
) -> Result<ResumeRecord, AppError> {
    let text = read_document_text(path).await?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldViolation::field(
            "file",
            "Uploaded document contains no readable text",
            "value_error",
        )]));
    }
    info!("Extracting resume fields from {} characters of text", text.len());

    let messages = build_extraction_messages(&text);
    let (completion, usage) = client.generate(&messages).await?;
    let usage = usage.with_extractor(EXTRACTOR_NAME);
    usage_log.record(client.model(), &usage).await;

    let Some(completion) = completion else {
        warn!("Resume extraction returned no completion; responding with an empty record");
        return Ok(ResumeRecord::default());
    };

    let answer = unfence_answer(completion.text().unwrap_or_default());
    serde_json::from_str(answer)
        .map_err(|e| AppError::Llm(format!("Failed to parse extracted resume: {e}")))
}
