//! # lecture-digest
//!
//! Turn a PDF lecture into a study pack: a chunked summary, a narrated
//! podcast per language (Arabic and English voices), and multiple-choice
//! quiz questions.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Extract     page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Summarize   per-chunk LLM calls, failures become inline markers
//!  ├─ 4. Split       summary lines → Arabic / Other buckets
//!  ├─ 5. Narrate     per-bucket Polly synthesis → podcast_ar / podcast_en
//!  └─ 6. Quiz        per-chunk question generation over the ORIGINAL text
//! ```
//!
//! Every step runs sequentially. Only a failure to obtain text aborts a run;
//! everything after that degrades per chunk or per language branch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lecture_digest::{digest, DigestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LLM provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     // Polly credentials come from the standard AWS chain.
//!     let config = DigestConfig::default();
//!     let output = digest("lecture.pdf", &config).await?;
//!     println!("{}", output.summary.text);
//!     for audio in &output.audio {
//!         eprintln!("{} podcast: {}", audio.bucket, audio.path.display());
//!     }
//!     println!("{}", output.quiz.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom services
//!
//! The extractor, summarizer, question generator and speech synthesizer are
//! trait objects collected in [`Services`]. Build a [`Digester`] from your own
//! implementations to run against local models, another TTS engine, or
//! in-memory fakes in tests.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lecture-digest` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lecture-digest = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod digest;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod service;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    DigestConfig, DigestConfigBuilder, MarkerLocale, OutputLayout, SynthesisFailurePolicy,
};
pub use digest::{digest, digest_from_bytes, digest_sync, Digester, PipelineState};
pub use error::{DigestError, TransformError};
pub use output::{AudioArtifact, AudioFailure, ChunkOutcome, DigestOutput, DigestStats, StageOutput};
pub use pipeline::chunk::chunk_text;
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::input::{load_document, Document};
pub use pipeline::language::{split_by_language, LanguageBucket};
pub use pipeline::transform::Stage;
pub use progress::{DigestProgressCallback, NoopProgressCallback, ProgressCallback};
pub use service::{
    AudioFormat, QuestionGenerator, Services, SpeechSynthesizer, Summarizer, SummaryBounds,
};
pub use stream::{digest_stream, DigestEvent, DigestEventStream};
