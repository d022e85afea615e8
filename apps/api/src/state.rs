use crate::config::Config;
use crate::llm_client::usage_log::UsageLog;
use crate::llm_client::GenerationClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Recommendation backend (DeepSeek).
    pub generator: GenerationClient,
    /// Full-document extraction backend (Gemini).
    pub extractor: GenerationClient,
    pub usage_log: UsageLog,
}
