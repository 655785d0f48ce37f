//! Chunked speech synthesis into one audio file.
//!
//! Unlike the text stages, a failing chunk aborts the whole file by default:
//! a narration with a silent gap is worse than none. The
//! [`SynthesisFailurePolicy::SkipChunk`] policy relaxes this to per-chunk
//! isolation.
//!
//! Chunk outputs are concatenated byte-for-byte. MP3 and raw PCM streams
//! play back correctly when joined this way; Ogg players typically stop
//! after the first logical stream.

use crate::config::SynthesisFailurePolicy;
use crate::error::DigestError;
use crate::pipeline::chunk::chunk_text;
use crate::pipeline::transform::Stage;
use crate::progress::ProgressCallback;
use crate::service::{AudioFormat, SpeechSynthesizer};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One language branch's synthesis request.
#[derive(Debug, Clone)]
pub struct SpeechJob<'a> {
    pub text: &'a str,
    pub voice: &'a str,
    pub format: AudioFormat,
    pub chunk_size: usize,
    pub path: &'a Path,
    pub policy: SynthesisFailurePolicy,
}

/// What [`synthesize_to_file`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisReport {
    pub bytes_written: usize,
    pub chunks: usize,
    pub skipped_chunks: usize,
    pub duration_ms: u64,
}

/// Synthesize `job.text` chunk by chunk and write the concatenated audio to
/// `job.path`, replacing any existing file.
///
/// The parent directory is created if missing. The file is written to a
/// sibling temp path and renamed into place, so a failed run never leaves a
/// truncated artifact behind.
///
/// # Errors
/// - [`DigestError::SynthesisFailed`] on the first failing chunk
///   (`AbortBranch`), or when every chunk failed (`SkipChunk`).
/// - [`DigestError::OutputWriteFailed`] if the file cannot be written.
pub async fn synthesize_to_file(
    synthesizer: &dyn SpeechSynthesizer,
    job: &SpeechJob<'_>,
    progress: Option<&ProgressCallback>,
) -> Result<SynthesisReport, DigestError> {
    let start = Instant::now();
    let chunks = chunk_text(job.text, job.chunk_size);
    let total = chunks.clone().count();
    info!(
        "Synthesizing {} chunks with voice '{}' → {}",
        total,
        job.voice,
        job.path.display()
    );

    let mut audio: Vec<u8> = Vec::new();
    let mut skipped = 0usize;
    let mut last_error = None;

    for (idx, chunk) in chunks.enumerate() {
        let chunk_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_chunk_start(Stage::SpeechSynthesis, chunk_num, total);
        }

        match synthesizer.synthesize(chunk, job.voice, job.format).await {
            Ok(bytes) => {
                debug!("Speech chunk {}/{}: {} bytes", chunk_num, total, bytes.len());
                if let Some(cb) = progress {
                    cb.on_chunk_complete(Stage::SpeechSynthesis, chunk_num, total, bytes.len());
                }
                audio.extend_from_slice(&bytes);
            }
            Err(e) => {
                let detail = e.to_string();
                if let Some(cb) = progress {
                    cb.on_chunk_error(Stage::SpeechSynthesis, chunk_num, total, &detail);
                }
                let err = DigestError::SynthesisFailed {
                    voice: job.voice.to_string(),
                    chunk: chunk_num,
                    total,
                    detail,
                };
                match job.policy {
                    SynthesisFailurePolicy::AbortBranch => return Err(err),
                    SynthesisFailurePolicy::SkipChunk => {
                        warn!("{}; skipping chunk", err);
                        skipped += 1;
                        last_error = Some(err);
                    }
                }
            }
        }
    }

    if total > 0 && skipped == total {
        if let Some(err) = last_error {
            return Err(err);
        }
    }

    write_atomic(job.path, &audio, job.format).await?;

    let report = SynthesisReport {
        bytes_written: audio.len(),
        chunks: total,
        skipped_chunks: skipped,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Wrote {} bytes of audio to {} in {}ms",
        report.bytes_written,
        job.path.display(),
        report.duration_ms
    );
    Ok(report)
}

async fn write_atomic(path: &Path, bytes: &[u8], format: AudioFormat) -> Result<(), DigestError> {
    let write_err = |source: std::io::Error| DigestError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(source) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns `[voice initial] + chunk bytes`, failing on listed 1-indexed calls.
    struct FakeVoice {
        fail_on: Vec<usize>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeVoice {
        fn new(fail_on: &[usize]) -> Self {
            Self {
                fail_on: fail_on.to_vec(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeVoice {
        async fn synthesize(
            &self,
            text: &str,
            voice: &str,
            _format: AudioFormat,
        ) -> Result<Vec<u8>, TransformError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(text.to_string());
            if self.fail_on.contains(&calls.len()) {
                return Err(TransformError::Service("throttled".into()));
            }
            let mut out = vec![voice.as_bytes()[0]];
            out.extend_from_slice(text.as_bytes());
            Ok(out)
        }
    }

    fn job<'a>(text: &'a str, path: &'a Path, policy: SynthesisFailurePolicy) -> SpeechJob<'a> {
        SpeechJob {
            text,
            voice: "Joanna",
            format: AudioFormat::Mp3,
            chunk_size: 4,
            path,
            policy,
        }
    }

    #[tokio::test]
    async fn concatenates_chunks_in_order_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/assets/podcast_en.mp3");
        let voice = FakeVoice::new(&[]);

        let report = synthesize_to_file(
            &voice,
            &job("abcdefghij", &path, SynthesisFailurePolicy::AbortBranch),
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.chunks, 3);
        assert_eq!(report.skipped_chunks, 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"JabcdJefghJij");
        assert_eq!(report.bytes_written, 13);
        assert_eq!(*voice.calls.lock().unwrap(), vec!["abcd", "efgh", "ij"]);
    }

    #[tokio::test]
    async fn overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast_en.mp3");
        std::fs::write(&path, b"old audio that is longer").unwrap();

        synthesize_to_file(
            &FakeVoice::new(&[]),
            &job("new", &path, SynthesisFailurePolicy::AbortBranch),
            None,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"Jnew");
        assert!(!path.with_extension("mp3.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        let path = dir.path().join("podcast_en.mp3");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let err = synthesize_to_file(
            &FakeVoice::new(&[]),
            &job("abcdefghij", &path, SynthesisFailurePolicy::AbortBranch),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DigestError::OutputWriteFailed { .. }), "got {err:?}");
        assert!(!path.with_extension("mp3.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[tokio::test]
    async fn abort_policy_fails_branch_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast_en.mp3");
        let voice = FakeVoice::new(&[2]);

        let err = synthesize_to_file(
            &voice,
            &job("abcdefghij", &path, SynthesisFailurePolicy::AbortBranch),
            None,
        )
        .await
        .unwrap_err();

        match err {
            DigestError::SynthesisFailed { chunk, total, .. } => assert_eq!((chunk, total), (2, 3)),
            other => panic!("expected SynthesisFailed, got {other:?}"),
        }
        assert!(!path.exists());
        // Chunk 3 is never requested.
        assert_eq!(voice.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn skip_policy_drops_only_the_failing_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast_en.mp3");

        let report = synthesize_to_file(
            &FakeVoice::new(&[2]),
            &job("abcdefghij", &path, SynthesisFailurePolicy::SkipChunk),
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.skipped_chunks, 1);
        assert_eq!(std::fs::read(&path).unwrap(), b"JabcdJij");
    }

    #[tokio::test]
    async fn skip_policy_with_every_chunk_failing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast_en.mp3");

        let err = synthesize_to_file(
            &FakeVoice::new(&[1, 2]),
            &job("abcdefg", &path, SynthesisFailurePolicy::SkipChunk),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DigestError::SynthesisFailed { .. }));
        assert!(!path.exists());
    }
}
