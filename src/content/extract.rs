//! Document text extraction.
//!
//! [`TextExtractor`] is the seam; [`PdftotextExtractor`] (poppler's
//! `pdftotext`) is the default backend and [`PdfiumExtractor`] is available
//! behind the `pdfium` cargo feature.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ExtractBackend, ExtractConfig};
use crate::media::{locate_tool, run_tool, ToolError};

/// Page separator emitted by `pdftotext`.
const FORM_FEED: char = '\u{000c}';

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extracted text is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("extractor exited with code {code:?}: {diagnostics}")]
    Failed {
        code: Option<i32>,
        diagnostics: String,
    },

    #[error("PDF backend error: {0}")]
    Backend(String),
}

/// Pulls the raw text layer out of a document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Return the document's text in reading order. Pages are separated by
    /// newlines; no other cleanup is performed.
    async fn extract(&self, document: &Path) -> Result<String, ExtractionError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TextExtractor>) {}
};

/// Build the extractor selected in `[extract]`.
pub fn extractor_from_config(
    config: &ExtractConfig,
) -> Result<Arc<dyn TextExtractor>, ExtractionError> {
    match config.backend {
        ExtractBackend::Pdftotext => Ok(Arc::new(PdftotextExtractor::from_config(config))),
        #[cfg(feature = "pdfium")]
        ExtractBackend::Pdfium => Ok(Arc::new(PdfiumExtractor)),
        #[cfg(not(feature = "pdfium"))]
        ExtractBackend::Pdfium => Err(ExtractionError::Backend(
            "built without the `pdfium` feature".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// pdftotext
// ---------------------------------------------------------------------------

/// Runs `pdftotext -enc UTF-8 <document> -` and reads stdout.
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    program: PathBuf,
}

impl PdftotextExtractor {
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self {
            program: locate_tool(config.pdftotext_path.as_deref(), "pdftotext"),
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl TextExtractor for PdftotextExtractor {
    async fn extract(&self, document: &Path) -> Result<String, ExtractionError> {
        if !document.is_file() {
            return Err(ExtractionError::Io {
                path: document.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        let args: Vec<OsString> = vec![
            "-enc".into(),
            "UTF-8".into(),
            document.into(),
            "-".into(),
        ];
        let output = run_tool(&self.program, &args).await?;
        if !output.success {
            return Err(ExtractionError::Failed {
                code: output.code,
                diagnostics: output.diagnostics(),
            });
        }

        let text = String::from_utf8(output.stdout)?;
        Ok(text.replace(FORM_FEED, "\n"))
    }
}

// ---------------------------------------------------------------------------
// pdfium
// ---------------------------------------------------------------------------

/// In-process extraction through the pdfium library.
#[cfg(feature = "pdfium")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumExtractor;

#[cfg(feature = "pdfium")]
#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, document: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(document)
            .await
            .map_err(|source| ExtractionError::Io {
                path: document.to_path_buf(),
                source,
            })?;

        // pdfium is a blocking FFI library.
        tokio::task::spawn_blocking(move || pdfium_text(&bytes))
            .await
            .map_err(|e| ExtractionError::Backend(format!("extraction task panicked: {e}")))?
    }
}

#[cfg(feature = "pdfium")]
fn pdfium_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    use pdfium_render::prelude::*;

    let pdfium = Pdfium::default();
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ExtractionError::Backend(format!("failed to load PDF: {e}")))?;

    let mut pages = Vec::new();
    for page in doc.pages().iter() {
        let text = page
            .text()
            .map_err(|e| ExtractionError::Backend(format!("failed to read page text: {e}")))?;
        pages.push(text.all());
    }
    Ok(pages.join("\n"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_document_is_io_error() {
        let extractor = PdftotextExtractor::from_config(&ExtractConfig::default());
        let err = extractor
            .extract(Path::new("/nonexistent/doc.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.pdf");
        std::fs::write(&doc, b"%PDF-1.4").unwrap();

        let extractor = PdftotextExtractor::from_config(&ExtractConfig::default())
            .with_program("/nonexistent/bin/pdftotext");
        let err = extractor.extract(&doc).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Tool(_)));
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-pdftotext");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn page_breaks_become_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.pdf");
        std::fs::write(&doc, b"%PDF-1.4").unwrap();
        let script = fake_tool(dir.path(), r"printf 'page one\fpage two\f'");

        let extractor =
            PdftotextExtractor::from_config(&ExtractConfig::default()).with_program(script);
        let text = extractor.extract(&doc).await.unwrap();
        assert_eq!(text, "page one\npage two\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn invalid_utf8_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.pdf");
        std::fs::write(&doc, b"%PDF-1.4").unwrap();
        let script = fake_tool(dir.path(), r"printf '\377\376bad'");

        let extractor =
            PdftotextExtractor::from_config(&ExtractConfig::default()).with_program(script);
        let err = extractor.extract(&doc).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_extractor_reports_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.pdf");
        std::fs::write(&doc, b"%PDF-1.4").unwrap();
        let script = fake_tool(dir.path(), "echo 'Syntax Error: broken xref' >&2; exit 1");

        let extractor =
            PdftotextExtractor::from_config(&ExtractConfig::default()).with_program(script);
        match extractor.extract(&doc).await.unwrap_err() {
            ExtractionError::Failed { code, diagnostics } => {
                assert_eq!(code, Some(1));
                assert!(diagnostics.contains("broken xref"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(not(feature = "pdfium"))]
    #[test]
    fn pdfium_backend_requires_feature() {
        let config = ExtractConfig {
            backend: ExtractBackend::Pdfium,
            ..ExtractConfig::default()
        };
        assert!(matches!(
            extractor_from_config(&config),
            Err(ExtractionError::Backend(_))
        ));
    }
}
