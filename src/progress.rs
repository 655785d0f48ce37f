//! Progress-callback trait for stage and chunk events.
//!
//! Inject an [`Arc<dyn DigestProgressCallback>`] via
//! [`crate::config::DigestConfigBuilder::progress_callback`] to receive
//! events as the run advances. The summary, each audio artifact and the quiz
//! are delivered as soon as their stage finishes, so a front-end can render
//! them progressively instead of waiting for the whole run.
//!
//! # Example
//!
//! ```rust
//! use lecture_digest::{DigestConfig, DigestProgressCallback, PipelineState};
//! use std::sync::Arc;
//!
//! struct PrintStates;
//!
//! impl DigestProgressCallback for PrintStates {
//!     fn on_state_change(&self, state: PipelineState) {
//!         eprintln!("→ {state}");
//!     }
//!
//!     fn on_summary_ready(&self, summary: &str) {
//!         println!("{summary}");
//!     }
//! }
//!
//! let config = DigestConfig::builder()
//!     .progress_callback(Arc::new(PrintStates) as Arc<dyn DigestProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::digest::PipelineState;
use crate::output::{AudioArtifact, AudioFailure};
use crate::pipeline::transform::Stage;
use std::sync::Arc;

/// Called by the pipeline as it processes a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Runs are sequential, but the callback may be invoked
/// from whichever runtime thread drives the run, hence `Send + Sync`.
pub trait DigestProgressCallback: Send + Sync {
    /// The pipeline entered a new state.
    fn on_state_change(&self, state: PipelineState) {
        let _ = state;
    }

    /// Just before a chunk is sent to its service.
    ///
    /// # Arguments
    /// * `stage`     — which transform is running
    /// * `chunk_num` — 1-indexed chunk number
    /// * `total`     — number of chunks in this stage
    fn on_chunk_start(&self, stage: Stage, chunk_num: usize, total: usize) {
        let _ = (stage, chunk_num, total);
    }

    /// A chunk succeeded; `output_len` is the byte length of its output.
    fn on_chunk_complete(&self, stage: Stage, chunk_num: usize, total: usize, output_len: usize) {
        let _ = (stage, chunk_num, total, output_len);
    }

    /// A chunk failed; `error` is the human-readable failure detail.
    fn on_chunk_error(&self, stage: Stage, chunk_num: usize, total: usize, error: &str) {
        let _ = (stage, chunk_num, total, error);
    }

    /// The joined summary is final.
    fn on_summary_ready(&self, summary: &str) {
        let _ = summary;
    }

    /// One language branch's audio file was written.
    fn on_audio_ready(&self, artifact: &AudioArtifact) {
        let _ = artifact;
    }

    /// One language branch failed and has no audio.
    fn on_audio_failed(&self, failure: &AudioFailure) {
        let _ = failure;
    }

    /// The joined quiz text is final.
    fn on_quiz_ready(&self, quiz: &str) {
        let _ = quiz;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DigestProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DigestConfig`].
pub type ProgressCallback = Arc<dyn DigestProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::language::LanguageBucket;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        states: Mutex<Vec<PipelineState>>,
        chunk_errors: AtomicUsize,
        audio_failures: AtomicUsize,
    }

    impl DigestProgressCallback for TrackingCallback {
        fn on_state_change(&self, state: PipelineState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_chunk_error(&self, _stage: Stage, _chunk_num: usize, _total: usize, _error: &str) {
            self.chunk_errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_audio_failed(&self, _failure: &AudioFailure) {
            self.audio_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_state_change(PipelineState::Extracting);
        cb.on_chunk_start(Stage::Summarization, 1, 3);
        cb.on_chunk_complete(Stage::Summarization, 1, 3, 42);
        cb.on_chunk_error(Stage::QuizGeneration, 2, 3, "some error");
        cb.on_summary_ready("summary");
        cb.on_quiz_ready("quiz");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_state_change(PipelineState::Summarizing);
        tracker.on_chunk_error(Stage::Summarization, 2, 3, "timeout");
        tracker.on_audio_failed(&AudioFailure {
            bucket: LanguageBucket::Arabic,
            voice: "Zeina".into(),
            error: "throttled".into(),
        });
        tracker.on_state_change(PipelineState::Done);

        assert_eq!(
            *tracker.states.lock().unwrap(),
            vec![PipelineState::Summarizing, PipelineState::Done]
        );
        assert_eq!(tracker.chunk_errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.audio_failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_state_change(PipelineState::Idle);
        cb.on_chunk_complete(Stage::SpeechSynthesis, 1, 1, 512);
    }
}
