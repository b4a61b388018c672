//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(input: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Ingesting {}...", input));
    let result = orchestrator.ingestion().ingest(input).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            Output::success(&format!(
                "Indexed {} ({} chunks)",
                outcome.video_id, outcome.chunks_indexed
            ));
            if outcome.replaced > 0 {
                Output::kv("Replaced chunks", &outcome.replaced.to_string());
            }
            if let Some(err) = &outcome.cache_error {
                Output::warning(&format!("Transcript was not cached: {}", err));
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to ingest {}: {}", input, e));
            Err(e.into())
        }
    }
}
