//! Result types returned by a digest run.

use crate::error::TransformError;
use crate::pipeline::language::LanguageBucket;
use crate::pipeline::transform::Stage;
use crate::service::AudioFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestOutput {
    /// Display name of the input document.
    pub source: String,
    /// Joined summary text, including inline error markers.
    pub summary: StageOutput,
    /// Zero, one or two artifacts, Arabic first.
    pub audio: Vec<AudioArtifact>,
    /// Language branches whose audio could not be produced.
    pub audio_failures: Vec<AudioFailure>,
    /// Joined quiz text, including inline error markers.
    pub quiz: StageOutput,
    pub stats: DigestStats,
}

impl DigestOutput {
    /// Audio artifact for a bucket, if one was written.
    pub fn audio_for(&self, bucket: LanguageBucket) -> Option<&AudioArtifact> {
        self.audio.iter().find(|a| a.bucket == bucket)
    }
}

/// Output of one text stage (summarization or quiz generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: Stage,
    /// Per-chunk outputs joined with `\n`.
    pub text: String,
    /// One entry per chunk, in chunk order.
    pub chunks: Vec<ChunkOutcome>,
    /// True when the input was blank and the service was never called.
    pub skipped_empty_input: bool,
    pub duration_ms: u64,
}

impl StageOutput {
    pub fn failed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.error.is_some()).count()
    }
}

/// Result of one chunk's transform call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 1-indexed position of the chunk.
    pub chunk_num: usize,
    pub input_chars: usize,
    /// Transform output, or the inline error marker on failure.
    pub output: String,
    pub error: Option<TransformError>,
    pub duration_ms: u64,
}

/// An audio file written for one language bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub bucket: LanguageBucket,
    pub voice: String,
    pub format: AudioFormat,
    pub path: PathBuf,
    pub bytes: usize,
    pub chunks: usize,
    /// Chunks dropped under the skip-chunk synthesis policy.
    pub skipped_chunks: usize,
}

/// A language branch that produced no audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFailure {
    pub bucket: LanguageBucket,
    pub voice: String,
    pub error: String,
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestStats {
    pub extracted_chars: usize,
    pub summary_chars: usize,
    pub summary_chunks: usize,
    pub failed_summary_chunks: usize,
    pub quiz_chunks: usize,
    pub failed_quiz_chunks: usize,
    pub audio_artifacts: usize,
    pub failed_audio_branches: usize,
    pub extract_duration_ms: u64,
    pub summary_duration_ms: u64,
    pub speech_duration_ms: u64,
    pub quiz_duration_ms: u64,
    pub total_duration_ms: u64,
}
