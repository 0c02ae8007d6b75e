pub mod models;
pub mod pipeline_service;
pub mod reconcile;
pub mod schema;

pub use models::{
    Article, ArticleSection, FolderRef, GenerationError, Outcome, OutcomeStatus, PipelineError,
    RunRequest, RunSummary, SheetRef, StoreError, StoredArtifact, WorkItem,
};
pub use pipeline_service::{ArticleGenerator, ArtifactStore, PipelineService, RowStore};
pub use reconcile::reconcile;
pub use schema::{list_work_items, resolve_schema, ColumnSchema};
