// This is the entry point of the article automation pipeline.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (Google APIs, OpenAI)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Run the pipeline once and print the outcome summary

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::articles::{PipelineService, RunRequest, RunSummary};
use crate::infra::ai::OpenAiClient;
use crate::infra::google::{DriveStore, ServiceAccountAuth, SheetsClient};

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    match run().await {
        Ok(summary) => {
            // Same payload shape on stdout that callers of the original
            // service endpoint received.
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).expect("Summary is always serializable")
            );
        }
        Err(err) => {
            eprintln!("{}", serde_json::json!({ "error": format!("{err:#}") }));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<RunSummary> {
    // Sheet and folder references are request-scoped: parsed here and passed
    // down the call chain, never held as process-wide state.
    let mut args = std::env::args().skip(1);
    let sheet_url = args
        .next()
        .or_else(|| std::env::var("SHEET_URL").ok())
        .context("Missing sheet reference: pass it as the first argument or set SHEET_URL")?;
    let folder_url = args
        .next()
        .or_else(|| std::env::var("DRIVE_FOLDER_URL").ok())
        .context(
            "Missing drive folder reference: pass it as the second argument or set DRIVE_FOLDER_URL",
        )?;

    let sheet = SheetsClient::extract_sheet_id(&sheet_url)?;
    let folder = DriveStore::extract_folder_id(&folder_url)?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let auth = Arc::new(
        ServiceAccountAuth::from_env()
            .await
            .context("Failed to load Google service account credentials")?,
    );
    let sheets = SheetsClient::new(Arc::clone(&auth));
    let drive = DriveStore::new(Arc::clone(&auth));

    let openai_api_key =
        std::env::var("OPENAI_API_KEY").context("Missing OPENAI_API_KEY environment variable")?;
    let generator = match std::env::var("OPENAI_MODEL") {
        Ok(model) => OpenAiClient::with_model(openai_api_key, model),
        Err(_) => OpenAiClient::new(openai_api_key),
    };

    drive
        .make_folder_editable(&folder)
        .await
        .context("Failed to grant link access on the Drive folder")?;

    let pipeline = PipelineService::new(sheets, generator, drive);
    let request = RunRequest { sheet, folder };

    let summary = pipeline.run_all(&request).await?;
    Ok(summary)
}
