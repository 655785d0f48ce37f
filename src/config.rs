//! Configuration types for a lecture digest run.
//!
//! All run behaviour is controlled through [`DigestConfig`], built via its
//! [`DigestConfigBuilder`]. One struct holds every knob so a config can be
//! cloned into a spawned run, logged, or diffed between two runs.

use crate::error::DigestError;
use crate::pipeline::language::LanguageBucket;
use crate::progress::ProgressCallback;
use crate::service::{AudioFormat, SummaryBounds};
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for one PDF → summary / podcast / quiz run.
///
/// Built via [`DigestConfig::builder()`] or using [`DigestConfig::default()`].
///
/// # Example
/// ```rust
/// use lecture_digest::DigestConfig;
///
/// let config = DigestConfig::builder()
///     .summary_chunk_size(800)
///     .english_voice("Matthew")
///     .output_dir("out/audio")
///     .build()
///     .unwrap();
/// assert_eq!(config.speech_chunk_size, 1500);
/// ```
#[derive(Clone)]
pub struct DigestConfig {
    /// Characters per summarization call. Default: 1000.
    pub summary_chunk_size: usize,

    /// Characters per quiz-generation call. Default: 1000.
    pub quiz_chunk_size: usize,

    /// Characters per speech-synthesis call. Default: 1500.
    ///
    /// Polly rejects requests above 3000 billed characters; 1500 leaves room
    /// for multi-byte scripts.
    pub speech_chunk_size: usize,

    /// Summary length requested from the summarizer. Default: 50–300.
    pub summary_bounds: SummaryBounds,

    /// Questions requested per quiz chunk. Default: 5.
    pub quiz_question_count: usize,

    /// Voice for the Arabic bucket. Default: "Zeina".
    pub arabic_voice: String,

    /// Voice for the Other/English bucket. Default: "Joanna".
    pub english_voice: String,

    /// Audio container for both artifacts. Default: MP3.
    pub audio_format: AudioFormat,

    /// Directory receiving the audio artifacts. Default: "assets".
    pub output_dir: PathBuf,

    /// Where inside `output_dir` each run writes. Default: [`OutputLayout::Fixed`].
    pub output_layout: OutputLayout,

    /// What a failing speech chunk does to its branch. Default: abort the branch.
    pub synthesis_failure_policy: SynthesisFailurePolicy,

    /// Language of inline error and no-text markers. Default: English.
    pub marker_locale: MarkerLocale,

    /// LLM model identifier. If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for summarization and quiz calls. Default: 0.0.
    pub temperature: f32,

    /// AWS region for Polly. Default: "us-east-1".
    pub aws_region: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives stage events as the run progresses.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            summary_chunk_size: 1000,
            quiz_chunk_size: 1000,
            speech_chunk_size: 1500,
            summary_bounds: SummaryBounds::default(),
            quiz_question_count: 5,
            arabic_voice: "Zeina".to_string(),
            english_voice: "Joanna".to_string(),
            audio_format: AudioFormat::default(),
            output_dir: PathBuf::from("assets"),
            output_layout: OutputLayout::default(),
            synthesis_failure_policy: SynthesisFailurePolicy::default(),
            marker_locale: MarkerLocale::default(),
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            aws_region: "us-east-1".to_string(),
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DigestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestConfig")
            .field("summary_chunk_size", &self.summary_chunk_size)
            .field("quiz_chunk_size", &self.quiz_chunk_size)
            .field("speech_chunk_size", &self.speech_chunk_size)
            .field("summary_bounds", &self.summary_bounds)
            .field("quiz_question_count", &self.quiz_question_count)
            .field("arabic_voice", &self.arabic_voice)
            .field("english_voice", &self.english_voice)
            .field("audio_format", &self.audio_format)
            .field("output_dir", &self.output_dir)
            .field("output_layout", &self.output_layout)
            .field("synthesis_failure_policy", &self.synthesis_failure_policy)
            .field("marker_locale", &self.marker_locale)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("aws_region", &self.aws_region)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn DigestProgressCallback>"),
            )
            .finish()
    }
}

impl DigestConfig {
    /// Create a new builder for `DigestConfig`.
    pub fn builder() -> DigestConfigBuilder {
        DigestConfigBuilder {
            config: Self::default(),
        }
    }

    /// Voice used for a language bucket.
    pub fn voice_for(&self, bucket: LanguageBucket) -> &str {
        match bucket {
            LanguageBucket::Arabic => &self.arabic_voice,
            LanguageBucket::Other => &self.english_voice,
        }
    }

    /// File name of a bucket's audio artifact, e.g. `podcast_ar.mp3`.
    pub fn audio_file_name(&self, bucket: LanguageBucket) -> String {
        format!(
            "podcast_{}.{}",
            bucket.file_suffix(),
            self.audio_format.extension()
        )
    }
}

/// Builder for [`DigestConfig`].
#[derive(Debug)]
pub struct DigestConfigBuilder {
    config: DigestConfig,
}

impl DigestConfigBuilder {
    pub fn summary_chunk_size(mut self, n: usize) -> Self {
        self.config.summary_chunk_size = n;
        self
    }

    pub fn quiz_chunk_size(mut self, n: usize) -> Self {
        self.config.quiz_chunk_size = n;
        self
    }

    pub fn speech_chunk_size(mut self, n: usize) -> Self {
        self.config.speech_chunk_size = n;
        self
    }

    pub fn summary_bounds(mut self, min_length: usize, max_length: usize) -> Self {
        self.config.summary_bounds = SummaryBounds {
            min_length,
            max_length,
        };
        self
    }

    pub fn quiz_question_count(mut self, n: usize) -> Self {
        self.config.quiz_question_count = n;
        self
    }

    pub fn arabic_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.arabic_voice = voice.into();
        self
    }

    pub fn english_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.english_voice = voice.into();
        self
    }

    pub fn audio_format(mut self, format: AudioFormat) -> Self {
        self.config.audio_format = format;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn output_layout(mut self, layout: OutputLayout) -> Self {
        self.config.output_layout = layout;
        self
    }

    pub fn synthesis_failure_policy(mut self, policy: SynthesisFailurePolicy) -> Self {
        self.config.synthesis_failure_policy = policy;
        self
    }

    pub fn marker_locale(mut self, locale: MarkerLocale) -> Self {
        self.config.marker_locale = locale;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn aws_region(mut self, region: impl Into<String>) -> Self {
        self.config.aws_region = region.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DigestConfig, DigestError> {
        let c = &self.config;
        for (name, size) in [
            ("summary chunk size", c.summary_chunk_size),
            ("quiz chunk size", c.quiz_chunk_size),
            ("speech chunk size", c.speech_chunk_size),
        ] {
            if size == 0 {
                return Err(DigestError::InvalidConfig(format!("{name} must be ≥ 1")));
            }
        }
        if c.summary_bounds.max_length == 0
            || c.summary_bounds.min_length > c.summary_bounds.max_length
        {
            return Err(DigestError::InvalidConfig(format!(
                "summary bounds must satisfy 0 ≤ min ≤ max and max ≥ 1, got {}–{}",
                c.summary_bounds.min_length, c.summary_bounds.max_length
            )));
        }
        if c.quiz_question_count == 0 {
            return Err(DigestError::InvalidConfig(
                "quiz question count must be ≥ 1".into(),
            ));
        }
        if c.arabic_voice.trim().is_empty() || c.english_voice.trim().is_empty() {
            return Err(DigestError::InvalidConfig(
                "voice identifiers must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Where a run places its audio artifacts inside `output_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputLayout {
    /// `output_dir/podcast_<lang>.<ext>`, overwritten by every run. (default)
    #[default]
    Fixed,
    /// `output_dir/run-<uuid>/podcast_<lang>.<ext>`, unique per run.
    PerRun,
}

impl OutputLayout {
    /// Resolve the directory one run writes into.
    pub fn run_dir(self, output_dir: &Path) -> PathBuf {
        match self {
            OutputLayout::Fixed => output_dir.to_path_buf(),
            OutputLayout::PerRun => output_dir.join(format!("run-{}", uuid::Uuid::new_v4())),
        }
    }
}

/// Failure isolation for speech synthesis.
///
/// Text stages always isolate chunk failures. Speech synthesis aborts the
/// whole language branch by default; `SkipChunk` aligns it with the text
/// stages by dropping only the failing chunk's audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SynthesisFailurePolicy {
    #[default]
    AbortBranch,
    SkipChunk,
}

/// Language used for inline markers in the summary and quiz text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerLocale {
    #[default]
    English,
    Arabic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = DigestConfig::default();
        assert_eq!(c.summary_chunk_size, 1000);
        assert_eq!(c.quiz_chunk_size, 1000);
        assert_eq!(c.speech_chunk_size, 1500);
        assert_eq!(c.arabic_voice, "Zeina");
        assert_eq!(c.english_voice, "Joanna");
        assert_eq!(c.output_dir, PathBuf::from("assets"));
        assert_eq!(c.output_layout, OutputLayout::Fixed);
        assert_eq!(c.synthesis_failure_policy, SynthesisFailurePolicy::AbortBranch);
    }

    #[test]
    fn builder_rejects_zero_chunk_size() {
        let err = DigestConfig::builder().speech_chunk_size(0).build().unwrap_err();
        assert!(err.to_string().contains("speech chunk size"), "got: {err}");
    }

    #[test]
    fn builder_rejects_inverted_bounds() {
        assert!(DigestConfig::builder().summary_bounds(300, 50).build().is_err());
        assert!(DigestConfig::builder().summary_bounds(0, 0).build().is_err());
        assert!(DigestConfig::builder().summary_bounds(0, 10).build().is_ok());
    }

    #[test]
    fn builder_rejects_blank_voice() {
        assert!(DigestConfig::builder().arabic_voice("  ").build().is_err());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = DigestConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn voices_and_file_names_per_bucket() {
        let c = DigestConfig::builder()
            .audio_format(AudioFormat::OggVorbis)
            .build()
            .unwrap();
        assert_eq!(c.voice_for(LanguageBucket::Arabic), "Zeina");
        assert_eq!(c.voice_for(LanguageBucket::Other), "Joanna");
        assert_eq!(c.audio_file_name(LanguageBucket::Arabic), "podcast_ar.ogg");
        assert_eq!(c.audio_file_name(LanguageBucket::Other), "podcast_en.ogg");
    }

    #[test]
    fn per_run_layout_is_unique() {
        let base = Path::new("assets");
        assert_eq!(OutputLayout::Fixed.run_dir(base), PathBuf::from("assets"));
        let a = OutputLayout::PerRun.run_dir(base);
        let b = OutputLayout::PerRun.run_dir(base);
        assert_ne!(a, b);
        assert!(a.starts_with(base));
        assert!(a.file_name().unwrap().to_string_lossy().starts_with("run-"));
    }
}
