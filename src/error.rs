//! Error types for the lecture-digest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DigestError`] — **Fatal**: the run (or one audio branch of it) cannot
//!   proceed at all (bad input file, unparseable PDF, provider not
//!   configured, speech synthesis rejected a chunk). Returned as
//!   `Err(DigestError)` from the top-level `digest*` functions, or recorded
//!   as an [`crate::output::AudioFailure`] when only one language branch is
//!   lost.
//!
//! * [`TransformError`] — **Non-fatal**: a single chunk failed inside the
//!   summarization or quiz stage. It is replaced by an inline error marker in
//!   the stage text and kept in [`crate::output::ChunkOutcome`] so callers can
//!   still inspect what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the lecture-digest library.
///
/// Chunk-level failures use [`TransformError`] and are stored in
/// [`crate::output::ChunkOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DigestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The document was read, but does not start with the `%PDF` magic.
    #[error("Document '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction needs the PDFium shared library. You can:\n\
  • Install libpdfium system-wide so the loader can find it.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Service errors ────────────────────────────────────────────────────
    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Speech synthesis failed for one chunk of a language branch.
    ///
    /// Aborts that branch's audio artifact only; the other branch and the quiz
    /// stage still run.
    #[error("Speech synthesis failed on chunk {chunk}/{total} with voice '{voice}': {detail}")]
    SynthesisFailed {
        voice: String,
        chunk: usize,
        total: usize,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an audio output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error from one external transform call.
///
/// Produced by the [`crate::service`] traits; the summarization and quiz
/// stages turn it into an inline error marker and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum TransformError {
    /// The service call itself failed (network, API, model error).
    #[error("{0}")]
    Service(String),

    /// The service answered, but the payload could not be used.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
