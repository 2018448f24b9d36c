use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of ingesting a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Chunks were embedded, added and persisted
    Indexed { source: String, chunks: usize },
    /// Nothing to index (unsupported kind, no text); store untouched
    Skipped { source: String, reason: String },
    /// Ingestion broke; store untouched
    Failed { source: String, reason: String },
}

impl IngestOutcome {
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Indexed { source, .. }
            | Self::Skipped { source, .. }
            | Self::Failed { source, .. } => source,
        }
    }

    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed { source, chunks } => write!(f, "indexed {source} ({chunks} chunks)"),
            Self::Skipped { source, reason } => write!(f, "skipped {source}: {reason}"),
            Self::Failed { source, reason } => write!(f, "failed {source}: {reason}"),
        }
    }
}

/// Statistics about a batch of ingestions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Documents indexed
    pub indexed: usize,

    /// Documents skipped
    pub skipped: usize,

    /// Documents that failed
    pub failed: usize,

    /// Chunks added across all documents
    pub chunks: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Skip and failure reasons
    pub errors: Vec<String>,
}

impl IngestStats {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Indexed { chunks, .. } => {
                self.indexed += 1;
                self.chunks += chunks;
            }
            IngestOutcome::Skipped { .. } => {
                self.skipped += 1;
                self.errors.push(outcome.to_string());
            }
            IngestOutcome::Failed { .. } => {
                self.failed += 1;
                self.errors.push(outcome.to_string());
            }
        }
    }
}

/// Per-document outcomes of a batch, in input order, with their tally
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub outcomes: Vec<IngestOutcome>,
    pub stats: IngestStats,
}

impl IngestReport {
    pub fn record(&mut self, outcome: IngestOutcome) {
        self.stats.record(&outcome);
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_tallies_outcomes() {
        let mut stats = IngestStats::default();
        stats.record(&IngestOutcome::Indexed {
            source: "a.txt".into(),
            chunks: 3,
        });
        stats.record(&IngestOutcome::Skipped {
            source: "b.docx".into(),
            reason: "unsupported".into(),
        });
        stats.record(&IngestOutcome::Indexed {
            source: "c.pdf".into(),
            chunks: 2,
        });

        assert_eq!((stats.indexed, stats.skipped, stats.failed), (2, 1, 0));
        assert_eq!(stats.chunks, 5);
        assert_eq!(stats.errors, vec!["skipped b.docx: unsupported".to_string()]);
    }

    #[test]
    fn report_keeps_input_order() {
        let mut report = IngestReport::default();
        report.record(IngestOutcome::Failed {
            source: "gone.txt".into(),
            reason: "missing".into(),
        });
        report.record(IngestOutcome::Indexed {
            source: "a.txt".into(),
            chunks: 1,
        });

        let sources: Vec<&str> = report.outcomes.iter().map(IngestOutcome::source).collect();
        assert_eq!(sources, vec!["gone.txt", "a.txt"]);
        assert_eq!((report.stats.indexed, report.stats.failed), (1, 1));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(IngestOutcome::Failed {
            source: "x.txt".into(),
            reason: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["source"], "x.txt");
    }
}
