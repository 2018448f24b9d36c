//! # ragdesk Extractor
//!
//! Turns an uploaded document into one flat text string.
//!
//! ```text
//! path + kind
//!     │
//!     ├──> txt ──> whole file as UTF-8
//!     │
//!     └──> pdf ──> per-page text, in page order, newline after each page
//! ```
//!
//! Every failure is reported as an [`ExtractError`]; the caller decides whether that means
//! "skipped" or "failed". Nothing here touches the vector store.
//!
//! ## Example
//!
//! ```no_run
//! use ragdesk_extractor::{extract, DocumentKind};
//!
//! #[tokio::main]
//! async fn main() -> ragdesk_extractor::Result<()> {
//!     let path = std::path::Path::new("notes.txt");
//!     let kind = DocumentKind::from_path(path).unwrap_or(DocumentKind::Text);
//!     let text = extract(path, kind).await?;
//!     println!("{} characters", text.chars().count());
//!     Ok(())
//! }
//! ```

mod error;
mod kind;
mod pdf;
mod text;

pub use error::{ExtractError, Result};
pub use kind::DocumentKind;

use std::path::Path;

/// Extract the text content of `path`, interpreting it as `kind`.
///
/// Returns [`ExtractError::NoText`] when the document parsed but held no usable text.
pub async fn extract(path: &Path, kind: DocumentKind) -> Result<String> {
    log::info!("Extracting text from {} ({kind})", path.display());

    let text = match kind {
        DocumentKind::Text => text::extract_text_file(path).await,
        DocumentKind::Pdf => pdf::extract_pdf_file(path).await,
    }
    .inspect_err(|err| log::error!("Extraction failed for {}: {err}", path.display()))?;

    if text.trim().is_empty() {
        log::warn!("No text extracted from {}", path.display());
        return Err(ExtractError::NoText(path.display().to_string()));
    }

    log::info!(
        "Extracted {} characters from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

/// Like [`extract`], but resolves the kind from the file extension first.
///
/// Unknown extensions yield [`ExtractError::UnsupportedKind`].
pub async fn extract_by_extension(path: &Path) -> Result<String> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string();
        log::warn!("Unsupported file type skipped: {}", path.display());
        ExtractError::UnsupportedKind(ext)
    })?;
    extract(path, kind).await
}
