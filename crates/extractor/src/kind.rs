use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Document formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[serde(rename = "txt")]
    Text,
    Pdf,
}

impl DocumentKind {
    pub const ALL: [Self; 2] = [Self::Text, Self::Pdf];

    /// Resolve the kind from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|kind| ext.eq_ignore_ascii_case(kind.extension()))
    }

    /// Parse an explicit kind name such as `txt` or `pdf`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim().trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|kind| raw.eq_ignore_ascii_case(kind.extension()))
            .ok_or_else(|| ExtractError::UnsupportedKind(raw.to_string()))
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentKind {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_kind_from_extension_ignoring_case() {
        assert_eq!(
            DocumentKind::from_path(Path::new("report.PDF")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("dir/notes.txt")),
            Some(DocumentKind::Text)
        );
        assert_eq!(DocumentKind::from_path(Path::new("slides.pptx")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn parses_explicit_kind_names() {
        assert_eq!(DocumentKind::parse("txt").unwrap(), DocumentKind::Text);
        assert_eq!(DocumentKind::parse(".Pdf").unwrap(), DocumentKind::Pdf);
        assert!(matches!(
            DocumentKind::parse("docx"),
            Err(ExtractError::UnsupportedKind(kind)) if kind == "docx"
        ));
    }
}
