//! Per-chunk transform runner with failure isolation.
//!
//! Summarization and quiz generation share one policy: every chunk is sent
//! to the service in order, a failed call is replaced by an inline error
//! marker, and processing always continues with the next chunk. The stage
//! output is the per-chunk results joined with `\n`.

use crate::config::MarkerLocale;
use crate::error::TransformError;
use crate::output::{ChunkOutcome, StageOutput};
use crate::pipeline::chunk::{chunk_text, Chunks};
use crate::progress::ProgressCallback;
use crate::prompts::{error_marker, no_text_marker, quiz_prompt};
use crate::service::{QuestionGenerator, Summarizer, SummaryBounds};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A chunk-level external transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Summarization,
    QuizGeneration,
    SpeechSynthesis,
}

impl Stage {
    /// Lower-case name used in markers and logs.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Summarization => "summarization",
            Stage::QuizGeneration => "quiz generation",
            Stage::SpeechSynthesis => "speech synthesis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One text → text step applied to each chunk.
#[async_trait]
pub trait TextTransform: Send + Sync {
    async fn apply(&self, chunk: &str) -> Result<String, TransformError>;
}

/// Summarize each chunk within the configured length bounds.
pub struct SummarizeTransform<'a> {
    pub summarizer: &'a dyn Summarizer,
    pub bounds: SummaryBounds,
}

#[async_trait]
impl TextTransform for SummarizeTransform<'_> {
    async fn apply(&self, chunk: &str) -> Result<String, TransformError> {
        self.summarizer.summarize(chunk, self.bounds).await
    }
}

/// Wrap each chunk in the quiz prompt and hand it to the generator.
pub struct QuizTransform<'a> {
    pub generator: &'a dyn QuestionGenerator,
    pub question_count: usize,
}

#[async_trait]
impl TextTransform for QuizTransform<'_> {
    async fn apply(&self, chunk: &str) -> Result<String, TransformError> {
        self.generator
            .generate(&quiz_prompt(self.question_count, chunk))
            .await
    }
}

/// Run a text stage over `text`.
///
/// Whitespace-only `text` short-circuits to the "no text extracted" marker
/// without calling the transform.
pub async fn run_text_stage<T>(
    stage: Stage,
    text: &str,
    chunk_size: usize,
    transform: &T,
    locale: MarkerLocale,
    progress: Option<&ProgressCallback>,
) -> StageOutput
where
    T: TextTransform + ?Sized,
{
    if text.trim().is_empty() {
        info!("{}: no text extracted, skipping", stage);
        return StageOutput {
            stage,
            text: no_text_marker(locale).to_string(),
            chunks: Vec::new(),
            skipped_empty_input: true,
            duration_ms: 0,
        };
    }

    run_isolated(stage, chunk_text(text, chunk_size), transform, locale, progress).await
}

/// Apply `transform` to every chunk in order, isolating failures.
///
/// The result has exactly one [`ChunkOutcome`] per chunk. A failed chunk's
/// output is the error marker for `stage` in `locale`.
pub async fn run_isolated<T>(
    stage: Stage,
    chunks: Chunks<'_>,
    transform: &T,
    locale: MarkerLocale,
    progress: Option<&ProgressCallback>,
) -> StageOutput
where
    T: TextTransform + ?Sized,
{
    let start = Instant::now();
    let total = chunks.clone().count();
    info!("{}: {} chunks", stage, total);

    let mut outcomes = Vec::with_capacity(total);

    for (idx, chunk) in chunks.enumerate() {
        let chunk_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_chunk_start(stage, chunk_num, total);
        }

        let chunk_start = Instant::now();
        let result = transform.apply(chunk).await;
        let duration_ms = chunk_start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(output) => {
                debug!(
                    "{} chunk {}/{}: {} → {} chars in {}ms",
                    stage,
                    chunk_num,
                    total,
                    chunk.chars().count(),
                    output.chars().count(),
                    duration_ms
                );
                if let Some(cb) = progress {
                    cb.on_chunk_complete(stage, chunk_num, total, output.len());
                }
                ChunkOutcome {
                    chunk_num,
                    input_chars: chunk.chars().count(),
                    output,
                    error: None,
                    duration_ms,
                }
            }
            Err(e) => {
                let detail = e.to_string();
                warn!("{} chunk {}/{} failed: {}", stage, chunk_num, total, detail);
                if let Some(cb) = progress {
                    cb.on_chunk_error(stage, chunk_num, total, &detail);
                }
                ChunkOutcome {
                    chunk_num,
                    input_chars: chunk.chars().count(),
                    output: error_marker(locale, stage, &detail),
                    error: Some(e),
                    duration_ms,
                }
            }
        };
        outcomes.push(outcome);
    }

    let text = outcomes
        .iter()
        .map(|o| o.output.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    StageOutput {
        stage,
        text,
        chunks: outcomes,
        skipped_empty_input: false,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Upper-cases chunks, failing on the configured 1-indexed calls.
    struct Flaky {
        fail_on: HashSet<usize>,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn failing_on(calls: &[usize]) -> Self {
            Self {
                fail_on: calls.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextTransform for Flaky {
        async fn apply(&self, chunk: &str) -> Result<String, TransformError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&n) {
                Err(TransformError::Service(format!("boom {n}")))
            } else {
                Ok(chunk.to_uppercase())
            }
        }
    }

    #[tokio::test]
    async fn failures_are_replaced_in_place() {
        let flaky = Flaky::failing_on(&[2, 4]);
        let out = run_isolated(
            Stage::Summarization,
            chunk_text("aabbccddee", 2),
            &flaky,
            MarkerLocale::English,
            None,
        )
        .await;

        assert_eq!(out.chunks.len(), 5);
        let outputs: Vec<&str> = out.chunks.iter().map(|c| c.output.as_str()).collect();
        assert_eq!(
            outputs,
            vec![
                "AA",
                "❌ error during summarization: boom 2",
                "CC",
                "❌ error during summarization: boom 4",
                "EE",
            ]
        );
        assert_eq!(out.failed_chunks(), 2);
        assert_eq!(out.chunks[1].error, Some(TransformError::Service("boom 2".into())));
        assert_eq!(out.text, outputs.join("\n"));
    }

    #[tokio::test]
    async fn every_chunk_failing_still_yields_full_length() {
        let flaky = Flaky::failing_on(&[1, 2, 3]);
        let out = run_isolated(
            Stage::QuizGeneration,
            chunk_text("abc", 1),
            &flaky,
            MarkerLocale::English,
            None,
        )
        .await;
        assert_eq!(out.chunks.len(), 3);
        assert!(out
            .chunks
            .iter()
            .all(|c| c.output.starts_with("❌ error during quiz generation")));
    }

    #[test]
    fn whitespace_input_skips_the_service() {
        let flaky = Flaky::failing_on(&[]);
        let out = tokio_test::block_on(run_text_stage(
            Stage::QuizGeneration,
            " \n\t ",
            1000,
            &flaky,
            MarkerLocale::English,
            None,
        ));
        assert_eq!(out.text, no_text_marker(MarkerLocale::English));
        assert!(out.skipped_empty_input);
        assert!(out.chunks.is_empty());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 0);
    }

    struct RecordingGenerator(Mutex<Vec<String>>);

    #[async_trait]
    impl QuestionGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, TransformError> {
            self.0.lock().unwrap().push(prompt.to_string());
            Ok("Q1?".to_string())
        }
    }

    #[tokio::test]
    async fn quiz_transform_templates_each_chunk() {
        let generator = RecordingGenerator(Mutex::new(Vec::new()));
        let transform = QuizTransform {
            generator: &generator,
            question_count: 3,
        };
        let out = run_text_stage(
            Stage::QuizGeneration,
            "abcdef",
            3,
            &transform,
            MarkerLocale::English,
            None,
        )
        .await;

        assert_eq!(out.text, "Q1?\nQ1?");
        let prompts = generator.0.lock().unwrap();
        assert_eq!(
            *prompts,
            vec![
                "Generate 3 multiple choice questions from this text:\nabc",
                "Generate 3 multiple choice questions from this text:\ndef",
            ]
        );
    }
}
