use async_trait::async_trait;
use thiserror::Error;

use crate::core::articles::models::{
    Article, FolderRef, GenerationError, Outcome, PipelineError, RunRequest, RunSummary, SheetRef,
    StoreError, StoredArtifact, WorkItem,
};
use crate::core::articles::reconcile::reconcile;
use crate::core::articles::schema::{list_work_items, resolve_schema};

const SHEET_TAB: &str = "Sheet1";
const HEADER_RANGE: &str = "Sheet1!1:1";

/// Rows fetched per read. Pages keep going until a short page comes back, so
/// sheets are not silently capped at a fixed row count.
const PAGE_SIZE: usize = 500;

/// Trait describing the minimal spreadsheet operations needed by the pipeline.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn get_range(
        &self,
        sheet: &SheetRef,
        range: &str,
    ) -> Result<Vec<Vec<String>>, PipelineError>;

    async fn set_range(
        &self,
        sheet: &SheetRef,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), PipelineError>;
}

/// Drafts one article for a (topic, description) pair.
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate(&self, topic: &str, description: &str)
        -> Result<Article, GenerationError>;
}

/// Persists a generated article and hands back an opaque reference to it.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(
        &self,
        folder: &FolderRef,
        article: &Article,
    ) -> Result<StoredArtifact, StoreError>;
}

/// Failure of one work item's generate-and-store unit. Recovered into a
/// `Failure` outcome; never aborts the batch.
#[derive(Debug, Error)]
enum ItemError {
    #[error(transparent)]
    Generate(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives one full run: read rows, generate and store per eligible row,
/// reconcile outcomes back into the row set, write the whole range back once.
///
/// The orchestration lives here so it can be tested without Google or OpenAI
/// concerns.
pub struct PipelineService<R, G, S> {
    row_store: R,
    generator: G,
    artifact_store: S,
}

impl<R, G, S> PipelineService<R, G, S>
where
    R: RowStore,
    G: ArticleGenerator,
    S: ArtifactStore,
{
    pub fn new(row_store: R, generator: G, artifact_store: S) -> Self {
        Self {
            row_store,
            generator,
            artifact_store,
        }
    }

    /// Processes every not-yet-completed row of the sheet.
    ///
    /// Schema problems and an empty work list abort the run before any
    /// generation happens. Per-item failures are downgraded to `Failure`
    /// outcomes and the batch continues. The sheet is read at the start and
    /// written exactly once at the end; nothing is persisted in between.
    pub async fn run_all(&self, request: &RunRequest) -> Result<RunSummary, PipelineError> {
        let header = self
            .row_store
            .get_range(&request.sheet, HEADER_RANGE)
            .await?;
        let header_row = header.into_iter().next().unwrap_or_default();
        let schema = resolve_schema(&header_row)?;

        // Write-back needs status and link; surface that before spending
        // tokens on generation.
        schema.status_required()?;
        schema.link_required()?;

        let rows = self.read_data_rows(&request.sheet).await?;
        let work_items = list_work_items(&rows, &schema);
        if work_items.is_empty() {
            return Err(PipelineError::NoDataFound);
        }

        tracing::info!(count = work_items.len(), "Processing work items");

        let mut results = Vec::with_capacity(work_items.len());
        for item in &work_items {
            match self.process_item(&request.folder, item).await {
                Ok(artifact) => {
                    tracing::info!(topic = %item.topic, file_id = %artifact.file_id, "Article stored");
                    results.push(Outcome::success(item.topic.as_str(), artifact));
                }
                Err(err) => {
                    tracing::error!(topic = %item.topic, "Failed to process work item: {}", err);
                    results.push(Outcome::failure(item.topic.as_str()));
                }
            }
        }

        let updated = reconcile(&rows, &results, &schema)?;
        let range = format!("{}!2:{}", SHEET_TAB, updated.len() + 1);
        self.row_store
            .set_range(&request.sheet, &range, &updated)
            .await?;

        Ok(RunSummary::new(results))
    }

    /// One work item's atomic unit: either both generate and store succeed,
    /// or the unit is abandoned at the first failure.
    async fn process_item(
        &self,
        folder: &FolderRef,
        item: &WorkItem,
    ) -> Result<StoredArtifact, ItemError> {
        let article = self
            .generator
            .generate(&item.topic, &item.description)
            .await?;
        let artifact = self.artifact_store.store(folder, &article).await?;
        Ok(artifact)
    }

    /// Reads the data range page by page, starting at row 2, until a page
    /// comes back short.
    async fn read_data_rows(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, PipelineError> {
        let mut rows = Vec::new();
        let mut start = 2usize;

        loop {
            let end = start + PAGE_SIZE - 1;
            let range = format!("{}!{}:{}", SHEET_TAB, start, end);
            let page = self.row_store.get_range(sheet, &range).await?;
            let page_len = page.len();
            rows.extend(page);

            if page_len < PAGE_SIZE {
                break;
            }
            start = end + 1;
        }

        Ok(rows)
    }
}
