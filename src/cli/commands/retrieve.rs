//! Retrieve command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the retrieve command.
pub async fn run_retrieve(query: &str, video_id: &str, k: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let retriever = orchestrator.retriever();
    let k = k.unwrap_or_else(|| retriever.top_k());

    let context = retriever.retrieve_k(query, Some(video_id), k).await?;

    if context.is_empty() {
        Output::warning(&format!("Nothing in {} matched that question.", video_id));
        return Ok(());
    }

    Output::header(&format!("Context from {}", video_id));
    println!("{}", context);

    Ok(())
}
