//! Document → narration text.
//!
//! Extraction ([`TextExtractor`]) is an external collaborator; normalization
//! ([`normalize`]) is a pure transform applied to whatever it returns.

pub mod extract;
pub mod normalize;

#[cfg(feature = "pdfium")]
pub use extract::PdfiumExtractor;
pub use extract::{extractor_from_config, ExtractionError, PdftotextExtractor, TextExtractor};
pub use normalize::{normalize, TextContent};
