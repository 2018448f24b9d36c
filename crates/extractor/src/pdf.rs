use crate::error::{ExtractError, Result};
use lopdf::Document;
use std::path::Path;

/// Extract text from every page of a PDF, in page order.
///
/// Any page yielding a non-empty string is kept, whitespace included, each followed by a
/// newline. Parsing runs on the blocking pool.
pub(crate) async fn extract_pdf_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || extract_pdf_bytes(&bytes, &display))
        .await
        .map_err(|e| ExtractError::Other(format!("PDF extraction task error: {e}")))?
}

pub(crate) fn extract_pdf_bytes(bytes: &[u8], display: &str) -> Result<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::PdfError(format!("{display}: {e}")))?;

    let pages = doc.get_pages();
    let mut text = String::new();
    let mut pages_with_text = 0usize;
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
                pages_with_text += 1;
            }
            Ok(_) => {}
            Err(e) => log::debug!("{display}: page {page_number} yielded no text ({e})"),
        }
    }

    log::info!(
        "Extracted text from {pages_with_text}/{} pages in {display}",
        pages.len()
    );
    Ok(text)
}
