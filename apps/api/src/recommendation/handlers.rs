//! Axum route handlers for the recommendation endpoints.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::recommendation::schemas::{
    CollectionGenerativeResponse, DictionaryGenerativeResponse, EducationRequest, SkillRequest,
    WorkExperienceRequest, WorkProfileRequest,
};
use crate::recommendation::{EDUCATION, SKILLS, WORK_EXPERIENCE, WORK_PROFILE};
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// POST /api/v1/ai/generate/work-profile
pub async fn handle_work_profile(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<WorkProfileRequest>,
) -> Result<Json<CollectionGenerativeResponse>, AppError> {
    let (recommendations, _) = WORK_PROFILE
        .generate(&request, &state.generator, &state.usage_log)
        .await?;
    Ok(Json(recommendations.into()))
}

/// POST /api/v1/ai/generate/work-experience
pub async fn handle_work_experience(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<WorkExperienceRequest>,
) -> Result<Json<CollectionGenerativeResponse>, AppError> {
    let (recommendations, _) = WORK_EXPERIENCE
        .generate(&request, &state.generator, &state.usage_log)
        .await?;
    Ok(Json(recommendations.into()))
}

/// POST /api/v1/ai/generate/education
pub async fn handle_education(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EducationRequest>,
) -> Result<Json<CollectionGenerativeResponse>, AppError> {
    let (recommendations, _) = EDUCATION
        .generate(&request, &state.generator, &state.usage_log)
        .await?;
    Ok(Json(recommendations.into()))
}

/// POST /api/v1/ai/generate/skills
///
/// Unlike the list endpoints, `data` is the category mapping itself.
pub async fn handle_skills(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SkillRequest>,
) -> Result<Json<DictionaryGenerativeResponse>, AppError> {
    let (skills, _) = SKILLS
        .generate(&request, &state.generator, &state.usage_log)
        .await?;
    Ok(Json(DictionaryGenerativeResponse { data: skills }))
}
