//! Request and response bodies for the recommendation endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validation::{check_length, into_result, FieldViolation, Validate};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkProfileRequest {
    pub name: String,
    pub role: String,
    pub target_role: String,
    pub description: String,
    #[serde(default)]
    pub my_company: Option<String>,
}

impl Validate for WorkProfileRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Vec::new();
        check_length(&mut v, "name", &self.name, NAME_MIN, Some(NAME_MAX));
        check_length(&mut v, "description", &self.description, 1, None);
        into_result(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperienceRequest {
    pub current_role: String,
    #[serde(default)]
    pub current_job_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for WorkExperienceRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Vec::new();
        check_length(&mut v, "current_role", &self.current_role, NAME_MIN, Some(NAME_MAX));
        into_result(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationRequest {
    pub current_major: String,
}

impl Validate for EducationRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Vec::new();
        check_length(&mut v, "current_major", &self.current_major, NAME_MIN, Some(NAME_MAX));
        into_result(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRequest {
    pub current_role: String,
}

impl Validate for SkillRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Vec::new();
        check_length(&mut v, "current_role", &self.current_role, NAME_MIN, Some(NAME_MAX));
        into_result(v)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionGenerative {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionGenerativeResponse {
    pub data: CollectionGenerative,
}

impl From<Vec<String>> for CollectionGenerativeResponse {
    fn from(recommendations: Vec<String>) -> Self {
        Self {
            data: CollectionGenerative { recommendations },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryGenerativeResponse {
    pub data: BTreeMap<String, Vec<String>>,
}
