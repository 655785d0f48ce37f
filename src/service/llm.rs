//! LLM-backed summarization and quiz generation.
//!
//! Both services share one `edgequake_llm` provider. Every prompt lives in
//! [`crate::prompts`] and there is no retry loop here. A failed call becomes a
//! [`TransformError`] that the transform runner turns into an inline marker
//! for that chunk.

use crate::config::DigestConfig;
use crate::error::{DigestError, TransformError};
use crate::prompts::summary_system_prompt;
use crate::service::{QuestionGenerator, Summarizer, SummaryBounds};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Model used when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Upper bound on generated quiz text per chunk.
const QUIZ_MAX_TOKENS: usize = 1024;

/// [`Summarizer`] that asks a chat model for a bounded-length summary.
pub struct LlmSummarizer {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String, TransformError> {
        let messages = vec![
            ChatMessage::system(summary_system_prompt(bounds)),
            ChatMessage::user(text),
        ];
        let options = build_options(self.temperature, bounds.max_length);
        chat(&self.provider, &messages, &options, "summary").await
    }
}

/// [`QuestionGenerator`] that sends the templated quiz prompt as a single user turn.
pub struct LlmQuestionGenerator {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl LlmQuestionGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, TransformError> {
        let messages = vec![ChatMessage::user(prompt)];
        let options = build_options(self.temperature, QUIZ_MAX_TOKENS);
        chat(&self.provider, &messages, &options, "quiz").await
    }
}

async fn chat(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    options: &CompletionOptions,
    what: &str,
) -> Result<String, TransformError> {
    let start = Instant::now();
    let response = provider
        .chat(messages, Some(options))
        .await
        .map_err(|e| TransformError::Service(e.to_string()))?;

    debug!(
        "{} call: {} input tokens, {} output tokens, {:?}",
        what,
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );

    Ok(response.content.trim().to_string())
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider + model** (`config.provider_name`) — built through
///    [`ProviderFactory::create_llm_provider`], which reads the matching API
///    key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **`OPENAI_API_KEY` present** — OpenAI with the configured or default model.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &DigestConfig) -> Result<Arc<dyn LLMProvider>, DigestError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DigestError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DigestError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DigestError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
