//! Recommendation plugins: one fixed template and output shape per endpoint.
//!
//! Every plugin runs the same pipeline:
//! template → `[system, user]` messages → `GenerationClient` →
//! first fenced JSON block → typed output.
//!
//! The plugin set is fixed, so each plugin is a `const` descriptor rather
//! than something discovered at runtime.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::json_block::extract_json;
use crate::llm_client::prompts::{build_messages, template_fields};
use crate::llm_client::usage_log::UsageLog;
use crate::llm_client::{GenerationClient, Message, TokenUsage};

pub mod handlers;
pub mod prompts;
pub mod schemas;

use prompts::{EDUCATION_TEMPLATE, SKILLS_TEMPLATE, WORK_EXPERIENCE_TEMPLATE, WORK_PROFILE_TEMPLATE};

/// Output a plugin parses from the model's JSON block.
pub trait RecommendationShape: Default + Sized {
    fn from_payload(payload: Value) -> Result<Self, serde_json::Error>;

    fn entry_count(&self) -> usize;
}

#[derive(Deserialize)]
struct CollectionPayload {
    recommendations: Vec<String>,
}

/// `{"recommendations": [...]}`
impl RecommendationShape for Vec<String> {
    fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<CollectionPayload>(payload).map(|p| p.recommendations)
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

/// `{"<category>": [...], ...}`
impl RecommendationShape for BTreeMap<String, Vec<String>> {
    fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload)
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

pub struct RecommendationPlugin<O> {
    pub name: &'static str,
    pub template: &'static str,
    shape: PhantomData<fn() -> O>,
}

impl<O> RecommendationPlugin<O> {
    pub const fn new(name: &'static str, template: &'static str) -> Self {
        Self {
            name,
            template,
            shape: PhantomData,
        }
    }
}

pub const WORK_PROFILE: RecommendationPlugin<Vec<String>> =
    RecommendationPlugin::new("work_profile_recommendator", WORK_PROFILE_TEMPLATE);

pub const WORK_EXPERIENCE: RecommendationPlugin<Vec<String>> =
    RecommendationPlugin::new("work_experience_recommendator", WORK_EXPERIENCE_TEMPLATE);

pub const EDUCATION: RecommendationPlugin<Vec<String>> =
    RecommendationPlugin::new("education_recommendator", EDUCATION_TEMPLATE);

pub const SKILLS: RecommendationPlugin<BTreeMap<String, Vec<String>>> =
    RecommendationPlugin::new("skill_recommendator", SKILLS_TEMPLATE);

impl<O: RecommendationShape> RecommendationPlugin<O> {
    pub fn build_messages<T: Serialize>(&self, request: &T) -> Result<Vec<Message>, AppError> {
        let fields = template_fields(request).map_err(|e| AppError::Internal(e.into()))?;
        Ok(build_messages(self.template, &fields))
    }

    /// Runs the plugin once. Usage is logged before the answer is parsed,
    /// so malformed answers are still accounted for.
    ///
    /// An unreachable backend yields an empty output with zeroed usage.
    pub async fn generate<T: Serialize>(
        &self,
        request: &T,
        client: &GenerationClient,
        usage_log: &UsageLog,
    ) -> Result<(O, TokenUsage), AppError> {
        let messages = self.build_messages(request)?;

        let (completion, usage) = client.generate(&messages).await?;
        let usage = usage.with_extractor(self.name);
        usage_log.record(client.model(), &usage).await;

        let Some(completion) = completion else {
            return Ok((O::default(), usage));
        };

        let payload = extract_json(completion.text().unwrap_or_default())?;
        let output = O::from_payload(payload)
            .map_err(|e| AppError::Llm(format!("Unexpected {} payload: {e}", self.name)))?;

        info!("{} produced {} entries", self.name, output.entry_count());
        Ok((output, usage))
    }
}
