use serde::{Deserialize, Serialize};

/// A fragment of one ingested document, tagged with the file it came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Chunk text
    pub text: String,

    /// Source filename
    pub source: String,
}

impl Chunk {
    #[must_use]
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }

    /// Length in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
