//! Pluggable external services.
//!
//! Every substantive transformation in the pipeline is delegated to one of
//! three narrow traits. The orchestrator only ever sees `Arc<dyn …>` handles,
//! so providers can be swapped (another LLM vendor, a local model, a different
//! TTS engine, an in-memory fake in tests) without touching pipeline logic.
//!
//! | Trait | Contract | Default implementation |
//! |-------|----------|------------------------|
//! | [`Summarizer`] | text → summary | [`llm::LlmSummarizer`] |
//! | [`QuestionGenerator`] | prompt → generated text | [`llm::LlmQuestionGenerator`] |
//! | [`SpeechSynthesizer`] | text + voice → audio bytes | [`polly::PollySynthesizer`] |
//!
//! Text extraction is the fourth collaborator and lives next to its default
//! pdfium implementation in [`crate::pipeline::extract`].

pub mod llm;
pub mod polly;

use crate::config::DigestConfig;
use crate::error::{DigestError, TransformError};
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Requested summary length, in model tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: 50,
            max_length: 300,
        }
    }
}

/// Audio container requested from the speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioFormat {
    #[default]
    Mp3,
    OggVorbis,
    /// Raw 16-bit mono PCM.
    Pcm,
}

impl AudioFormat {
    /// File extension used for artifacts in this format.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::OggVorbis => "ogg",
            AudioFormat::Pcm => "pcm",
        }
    }

    /// MIME type, for players that need one.
    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::OggVorbis => "audio/ogg",
            AudioFormat::Pcm => "audio/pcm",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Summarizes one chunk of text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String, TransformError>;
}

/// Generates free-form text from a fully templated prompt.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, TransformError>;
}

/// Turns text into encoded audio with a given voice.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        format: AudioFormat,
    ) -> Result<Vec<u8>, TransformError>;
}

/// The set of collaborators one [`crate::digest::Digester`] runs against.
///
/// Construct explicitly with [`Services::new`] (tests, custom providers) or
/// from configuration with [`Services::from_config`]. Cloning is cheap: every
/// field is an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub extractor: Arc<dyn TextExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub question_generator: Arc<dyn QuestionGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Services {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        summarizer: Arc<dyn Summarizer>,
        question_generator: Arc<dyn QuestionGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            question_generator,
            speech,
        }
    }

    /// Build the default service stack: pdfium extraction, one LLM provider
    /// shared by summarization and quiz generation, and Amazon Polly.
    ///
    /// # Errors
    /// [`DigestError::ProviderNotConfigured`] when no LLM provider can be
    /// resolved. AWS credentials are only checked on the first Polly call.
    pub async fn from_config(config: &DigestConfig) -> Result<Self, DigestError> {
        let provider = llm::resolve_provider(config)?;
        let summarizer = llm::LlmSummarizer::new(Arc::clone(&provider), config.temperature);
        let generator = llm::LlmQuestionGenerator::new(provider, config.temperature);
        let speech = polly::PollySynthesizer::from_region(&config.aws_region).await;

        Ok(Self {
            extractor: Arc::new(PdfiumExtractor::new(config.password.clone())),
            summarizer: Arc::new(summarizer),
            question_generator: Arc::new(generator),
            speech: Arc::new(speech),
        })
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("extractor", &"<dyn TextExtractor>")
            .field("summarizer", &"<dyn Summarizer>")
            .field("question_generator", &"<dyn QuestionGenerator>")
            .field("speech", &"<dyn SpeechSynthesizer>")
            .finish()
    }
}
