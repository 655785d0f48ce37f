//! Pipeline orchestrator and eager entry points.
//!
//! A [`Digester`] owns one configuration and one set of [`Services`] and can
//! run any number of documents through the fixed stage sequence:
//!
//! ```text
//! Idle → Extracting → Summarizing → Splitting → Synthesizing → QuizGenerating → Done
//!            └──────→ Failed
//! ```
//!
//! Only extraction can end a run with `Err`. Summary and quiz chunk failures
//! become inline markers; a failed audio branch is recorded in
//! [`DigestOutput::audio_failures`] and the run carries on.

use crate::config::DigestConfig;
use crate::error::DigestError;
use crate::output::{AudioArtifact, AudioFailure, DigestOutput, DigestStats};
use crate::pipeline::input::{self, Document};
use crate::pipeline::language::{split_by_language, LanguageBucket};
use crate::pipeline::speech::{synthesize_to_file, SpeechJob};
use crate::pipeline::transform::{run_text_stage, QuizTransform, Stage, SummarizeTransform};
use crate::progress::ProgressCallback;
use crate::service::Services;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Extracting,
    Summarizing,
    Splitting,
    Synthesizing,
    QuizGenerating,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Extracting => "extracting text",
            PipelineState::Summarizing => "summarizing",
            PipelineState::Splitting => "splitting by language",
            PipelineState::Synthesizing => "synthesizing audio",
            PipelineState::QuizGenerating => "generating quiz",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Runs documents through extraction, summarization, narration and quiz
/// generation.
///
/// Cheap to clone; clones share the same service clients.
#[derive(Clone, Debug)]
pub struct Digester {
    config: DigestConfig,
    services: Services,
}

impl Digester {
    pub fn new(config: DigestConfig, services: Services) -> Self {
        Self { config, services }
    }

    /// Build a digester with the default service stack for `config`.
    pub async fn from_config(config: DigestConfig) -> Result<Self, DigestError> {
        let services = Services::from_config(&config).await?;
        Ok(Self::new(config, services))
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Replace the progress callback, keeping everything else.
    pub fn with_progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    fn progress(&self) -> Option<&ProgressCallback> {
        self.config.progress_callback.as_ref()
    }

    fn enter(&self, state: PipelineState) {
        info!("State → {}", state);
        if let Some(cb) = self.progress() {
            cb.on_state_change(state);
        }
    }

    /// Run one document through the whole pipeline.
    ///
    /// # Errors
    /// Only extraction failures are returned as `Err`; nothing is written in
    /// that case. Every later failure is reported inside the output.
    pub async fn run(&self, document: Document) -> Result<DigestOutput, DigestError> {
        let total_start = Instant::now();
        let source = document.name().to_string();
        let mut stats = DigestStats::default();
        info!("Digesting {} ({} bytes)", source, document.len());

        self.enter(PipelineState::Idle);

        // ── Extract ──────────────────────────────────────────────────────
        self.enter(PipelineState::Extracting);
        let extract_start = Instant::now();
        let text = match self.services.extractor.extract(document).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Extraction failed for {}: {}", source, e);
                self.enter(PipelineState::Failed);
                return Err(e);
            }
        };
        stats.extract_duration_ms = extract_start.elapsed().as_millis() as u64;
        stats.extracted_chars = text.chars().count();
        info!(
            "Extracted {} chars in {}ms",
            stats.extracted_chars, stats.extract_duration_ms
        );

        // ── Summarize ────────────────────────────────────────────────────
        self.enter(PipelineState::Summarizing);
        let summarize = SummarizeTransform {
            summarizer: self.services.summarizer.as_ref(),
            bounds: self.config.summary_bounds,
        };
        let summary = run_text_stage(
            Stage::Summarization,
            &text,
            self.config.summary_chunk_size,
            &summarize,
            self.config.marker_locale,
            self.progress(),
        )
        .await;
        if let Some(cb) = self.progress() {
            cb.on_summary_ready(&summary.text);
        }

        // ── Split ────────────────────────────────────────────────────────
        self.enter(PipelineState::Splitting);
        let (arabic, other) = split_by_language(&summary.text);

        // ── Synthesize ───────────────────────────────────────────────────
        self.enter(PipelineState::Synthesizing);
        let speech_start = Instant::now();
        let run_dir = self.config.output_layout.run_dir(&self.config.output_dir);
        let mut audio = Vec::new();
        let mut audio_failures = Vec::new();

        for (bucket, bucket_text) in [
            (LanguageBucket::Arabic, arabic.as_str()),
            (LanguageBucket::Other, other.as_str()),
        ] {
            if bucket_text.is_empty() {
                info!("No {} text in summary, skipping narration", bucket);
                continue;
            }
            match self.narrate(bucket, bucket_text, &run_dir).await {
                Ok(artifact) => {
                    if let Some(cb) = self.progress() {
                        cb.on_audio_ready(&artifact);
                    }
                    audio.push(artifact);
                }
                Err(failure) => {
                    warn!("{} narration failed: {}", bucket, failure.error);
                    if let Some(cb) = self.progress() {
                        cb.on_audio_failed(&failure);
                    }
                    audio_failures.push(failure);
                }
            }
        }
        stats.speech_duration_ms = speech_start.elapsed().as_millis() as u64;

        // ── Quiz (over the original text, not the summary) ──────────────
        self.enter(PipelineState::QuizGenerating);
        let quiz_transform = QuizTransform {
            generator: self.services.question_generator.as_ref(),
            question_count: self.config.quiz_question_count,
        };
        let quiz = run_text_stage(
            Stage::QuizGeneration,
            &text,
            self.config.quiz_chunk_size,
            &quiz_transform,
            self.config.marker_locale,
            self.progress(),
        )
        .await;
        if let Some(cb) = self.progress() {
            cb.on_quiz_ready(&quiz.text);
        }

        stats.summary_chars = summary.text.chars().count();
        stats.summary_chunks = summary.chunks.len();
        stats.failed_summary_chunks = summary.failed_chunks();
        stats.summary_duration_ms = summary.duration_ms;
        stats.quiz_chunks = quiz.chunks.len();
        stats.failed_quiz_chunks = quiz.failed_chunks();
        stats.quiz_duration_ms = quiz.duration_ms;
        stats.audio_artifacts = audio.len();
        stats.failed_audio_branches = audio_failures.len();
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

        info!(
            "Digest complete: {} summary chunks ({} failed), {} audio files, {} quiz chunks ({} failed), {}ms total",
            stats.summary_chunks,
            stats.failed_summary_chunks,
            stats.audio_artifacts,
            stats.quiz_chunks,
            stats.failed_quiz_chunks,
            stats.total_duration_ms
        );
        self.enter(PipelineState::Done);

        Ok(DigestOutput {
            source,
            summary,
            audio,
            audio_failures,
            quiz,
            stats,
        })
    }

    async fn narrate(
        &self,
        bucket: LanguageBucket,
        text: &str,
        run_dir: &Path,
    ) -> Result<AudioArtifact, AudioFailure> {
        let voice = self.config.voice_for(bucket);
        let path = run_dir.join(self.config.audio_file_name(bucket));
        let job = SpeechJob {
            text,
            voice,
            format: self.config.audio_format,
            chunk_size: self.config.speech_chunk_size,
            path: &path,
            policy: self.config.synthesis_failure_policy,
        };

        match synthesize_to_file(self.services.speech.as_ref(), &job, self.progress()).await {
            Ok(report) => Ok(AudioArtifact {
                bucket,
                voice: voice.to_string(),
                format: self.config.audio_format,
                path,
                bytes: report.bytes_written,
                chunks: report.chunks,
                skipped_chunks: report.skipped_chunks,
            }),
            Err(e) => Err(AudioFailure {
                bucket,
                voice: voice.to_string(),
                error: e.to_string(),
            }),
        }
    }
}

/// Digest a PDF file or URL with the default service stack.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — local file path or HTTP/HTTPS URL to a PDF
/// * `config`    — run configuration
///
/// # Returns
/// `Ok(DigestOutput)` whenever text extraction succeeded, even if some
/// chunks or an audio branch failed (check `output.stats`).
///
/// # Errors
/// Returns `Err(DigestError)` only for fatal errors:
/// - File not found / permission denied / download failure
/// - Not a valid PDF, encrypted or corrupt
/// - No LLM provider configured
pub async fn digest(
    input_str: impl AsRef<str>,
    config: &DigestConfig,
) -> Result<DigestOutput, DigestError> {
    let input_str = input_str.as_ref();
    info!("Starting digest: {}", input_str);
    let document = input::load_document(input_str, config.download_timeout_secs).await?;
    let digester = Digester::from_config(config.clone()).await?;
    digester.run(document).await
}

/// Digest PDF bytes already in memory.
///
/// # Example
/// ```rust,no_run
/// use lecture_digest::{digest_from_bytes, DigestConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("lecture.pdf")?;
/// let output = digest_from_bytes("lecture.pdf", bytes, &DigestConfig::default()).await?;
/// println!("{}", output.summary.text);
/// # Ok(())
/// # }
/// ```
pub async fn digest_from_bytes(
    name: impl Into<String>,
    bytes: Vec<u8>,
    config: &DigestConfig,
) -> Result<DigestOutput, DigestError> {
    let digester = Digester::from_config(config.clone()).await?;
    digester.run(Document::new(name, bytes)).await
}

/// Synchronous wrapper around [`digest`].
///
/// Creates a temporary tokio runtime internally.
pub fn digest_sync(
    input_str: impl AsRef<str>,
    config: &DigestConfig,
) -> Result<DigestOutput, DigestError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DigestError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(digest(input_str, config))
}
