//! Streaming API: emit each result block as soon as its stage finishes.
//!
//! A full run makes dozens of sequential model and speech calls. Instead of
//! waiting for [`crate::digest::Digester::run`] to return, callers can drive
//! [`digest_stream`] and render the summary, each podcast and the quiz the
//! moment they are ready.
//!
//! Events arrive in pipeline order: state changes interleaved with
//! `SummaryReady`, zero to two audio events, `QuizReady`, then exactly one
//! terminal `Finished` or `Failed`.

use crate::digest::{Digester, PipelineState};
use crate::error::DigestError;
use crate::output::{AudioArtifact, AudioFailure, DigestOutput};
use crate::pipeline::input::Document;
use crate::pipeline::transform::Stage;
use crate::progress::{DigestProgressCallback, ProgressCallback};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

/// One progressive update from a running digest.
#[derive(Debug)]
pub enum DigestEvent {
    StateChanged(PipelineState),
    SummaryReady(String),
    AudioReady(AudioArtifact),
    AudioFailed(AudioFailure),
    QuizReady(String),
    /// Terminal: the run completed.
    Finished(Box<DigestOutput>),
    /// Terminal: the run aborted with a fatal error.
    Failed(DigestError),
}

impl DigestEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DigestEvent::Finished(_) | DigestEvent::Failed(_))
    }
}

/// A boxed stream of digest events.
pub type DigestEventStream = Pin<Box<dyn Stream<Item = DigestEvent> + Send>>;

/// Forwards callbacks into the event channel, then on to any callback the
/// caller had already configured.
struct ChannelProgress {
    tx: mpsc::UnboundedSender<DigestEvent>,
    inner: Option<ProgressCallback>,
}

impl ChannelProgress {
    fn send(&self, event: DigestEvent) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl DigestProgressCallback for ChannelProgress {
    fn on_state_change(&self, state: PipelineState) {
        self.send(DigestEvent::StateChanged(state));
        if let Some(cb) = &self.inner {
            cb.on_state_change(state);
        }
    }

    fn on_chunk_start(&self, stage: Stage, chunk_num: usize, total: usize) {
        if let Some(cb) = &self.inner {
            cb.on_chunk_start(stage, chunk_num, total);
        }
    }

    fn on_chunk_complete(&self, stage: Stage, chunk_num: usize, total: usize, output_len: usize) {
        if let Some(cb) = &self.inner {
            cb.on_chunk_complete(stage, chunk_num, total, output_len);
        }
    }

    fn on_chunk_error(&self, stage: Stage, chunk_num: usize, total: usize, error: &str) {
        if let Some(cb) = &self.inner {
            cb.on_chunk_error(stage, chunk_num, total, error);
        }
    }

    fn on_summary_ready(&self, summary: &str) {
        self.send(DigestEvent::SummaryReady(summary.to_string()));
        if let Some(cb) = &self.inner {
            cb.on_summary_ready(summary);
        }
    }

    fn on_audio_ready(&self, artifact: &AudioArtifact) {
        self.send(DigestEvent::AudioReady(artifact.clone()));
        if let Some(cb) = &self.inner {
            cb.on_audio_ready(artifact);
        }
    }

    fn on_audio_failed(&self, failure: &AudioFailure) {
        self.send(DigestEvent::AudioFailed(failure.clone()));
        if let Some(cb) = &self.inner {
            cb.on_audio_failed(failure);
        }
    }

    fn on_quiz_ready(&self, quiz: &str) {
        self.send(DigestEvent::QuizReady(quiz.to_string()));
        if let Some(cb) = &self.inner {
            cb.on_quiz_ready(quiz);
        }
    }
}

/// Run `document` on a spawned task and stream its events.
///
/// Must be called from within a tokio runtime. The run continues even if the
/// stream is dropped early; its artifacts are still written.
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use lecture_digest::{digest_stream, load_document, DigestConfig, DigestEvent, Digester};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DigestConfig::default();
/// let digester = Digester::from_config(config).await?;
/// let document = load_document("lecture.pdf", 120).await?;
/// let mut events = digest_stream(&digester, document);
/// while let Some(event) = events.next().await {
///     match event {
///         DigestEvent::SummaryReady(s) => println!("Summary:\n{s}"),
///         DigestEvent::QuizReady(q) => println!("Quiz:\n{q}"),
///         DigestEvent::Failed(e) => eprintln!("Error: {e}"),
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn digest_stream(digester: &Digester, document: Document) -> DigestEventStream {
    let (tx, rx) = mpsc::unbounded_channel();
    let forwarder = ChannelProgress {
        tx: tx.clone(),
        inner: digester.config().progress_callback.clone(),
    };
    let digester = digester
        .clone()
        .with_progress_callback(Arc::new(forwarder) as ProgressCallback);

    tokio::spawn(async move {
        let terminal = match digester.run(document).await {
            Ok(output) => DigestEvent::Finished(Box::new(output)),
            Err(e) => DigestEvent::Failed(e),
        };
        let _ = tx.send(terminal);
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
