use crate::error::{ExtractError, Result};
use std::path::Path;

/// Read a plain text file as UTF-8.
pub(crate) async fn extract_text_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes)
        .map_err(|err| ExtractError::InvalidUtf8(format!("{}: {err}", path.display())))
}
