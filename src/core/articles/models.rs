use serde::Serialize;
use thiserror::Error;

/// Errors that abort a pipeline run before or outside the per-item guard.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("No data found")]
    NoDataFound,
    #[error("Invalid {kind} reference: {value}")]
    InvalidReference { kind: &'static str, value: String },
    #[error("Row store error: {0}")]
    RowStore(String),
}

/// Per-item failure while asking the language model for an article.
#[derive(Debug, Error)]
#[error("Generation failed: {0}")]
pub struct GenerationError(pub String);

/// Per-item failure while persisting a generated article.
#[derive(Debug, Error)]
#[error("Artifact store error: {0}")]
pub struct StoreError(pub String);

/// Identifier of the spreadsheet a run reads from and writes back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef(pub String);

/// Identifier of the storage folder generated articles land in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef(pub String);

/// Request-scoped configuration for one pipeline run. Carried through the
/// call chain instead of process-wide state so concurrent runs cannot race
/// on each other's identifiers.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub sheet: SheetRef,
    pub folder: FolderRef,
}

/// A spreadsheet row that still needs an article generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub topic: String,
    pub description: String,
}

/// Whether the generate-and-store unit for a work item went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

impl OutcomeStatus {
    /// Text written into the status cell of the matched row.
    pub fn as_cell_text(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "Success",
            OutcomeStatus::Failure => "Failure",
        }
    }
}

/// The per-topic result of attempting generation and storage.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub topic: String,
    pub status: OutcomeStatus,
    pub link: Option<String>,
    #[serde(rename = "file_id")]
    pub artifact_ref: Option<String>,
}

impl Outcome {
    pub fn success(topic: impl Into<String>, artifact: StoredArtifact) -> Self {
        Self {
            topic: topic.into(),
            status: OutcomeStatus::Success,
            link: Some(artifact.link),
            artifact_ref: Some(artifact.file_id),
        }
    }

    pub fn failure(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            status: OutcomeStatus::Failure,
            link: None,
            artifact_ref: None,
        }
    }
}

/// Opaque reference to a persisted article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub file_id: String,
    pub link: String,
}

/// One heading plus its body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSection {
    pub heading: String,
    pub content: String,
}

/// A structured article as returned by the generator and uploaded to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub sections: Vec<ArticleSection>,
}

impl Article {
    /// Splits the generator's raw text into sections.
    ///
    /// Blocks are separated by blank lines; within a block the first line is
    /// the heading and the rest is the content body (which may be empty).
    pub fn from_generated_text(title: impl Into<String>, raw: &str) -> Self {
        let sections = raw
            .trim()
            .split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| {
                let mut lines = block.lines();
                let heading = lines.next().unwrap_or_default().to_string();
                let content = lines.collect::<Vec<_>>().join("\n");
                ArticleSection { heading, content }
            })
            .collect();

        Self {
            title: title.into(),
            sections,
        }
    }
}

/// Caller-facing summary of one full run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub message: String,
    pub results: Vec<Outcome>,
}

impl RunSummary {
    pub fn new(results: Vec<Outcome>) -> Self {
        Self {
            message: "All articles processed".to_string(),
            results,
        }
    }
}
