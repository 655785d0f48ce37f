//! Input resolution: load a user-supplied path or URL into a [`Document`].
//!
//! The whole PDF is held in memory for the duration of extraction; pdfium
//! parses it from the byte slice, so no temp file is involved. Validation of
//! the `%PDF` magic happens in the extractor, which also covers documents
//! handed over directly as bytes.

use crate::error::DigestError;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Raw bytes of one uploaded document.
///
/// Moved into the text extractor and dropped once extraction finishes.
pub struct Document {
    name: String,
    bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Display name (file name or URL) used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.name, self.bytes)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load the input string into a [`Document`].
///
/// URLs are downloaded; anything else is read as a local file.
pub async fn load_document(input: &str, timeout_secs: u64) -> Result<Document, DigestError> {
    if input.trim().is_empty() {
        return Err(DigestError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<Document, DigestError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DigestError::PermissionDenied { path: path.clone() },
        _ => DigestError::FileNotFound { path: path.clone() },
    })?;

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());
    Ok(Document::new(name, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Document, DigestError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DigestError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DigestError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DigestError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(DigestError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DigestError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(Document::new(url, bytes.to_vec()))
}
