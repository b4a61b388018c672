//! Reindex command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use futures::stream::{self, StreamExt};

/// Re-index at most this many cached transcripts at once.
const MAX_CONCURRENT_REINDEX: usize = 4;

/// Run the reindex command.
pub async fn run_reindex(video_id: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let ingestion = orchestrator.ingestion();

    if video_id != "all" {
        let outcome = ingestion.reindex(video_id).await?;
        Output::success(&format!(
            "Re-indexed {} ({} chunks, {} replaced)",
            outcome.video_id, outcome.chunks_indexed, outcome.replaced
        ));
        return Ok(());
    }

    let videos = ingestion.cache().list().await?;
    if videos.is_empty() {
        Output::warning(&format!(
            "No cached transcripts found in {}",
            ingestion.cache().dir().display()
        ));
        Output::info("Use 'vidchat ingest <url>' to fetch and cache a transcript.");
        return Ok(());
    }

    Output::info(&format!("Found {} cached transcripts", videos.len()));

    let pb = Output::progress_bar(videos.len() as u64, "Re-indexing");
    let mut stream = stream::iter(videos.iter())
        .map(|vid_id| {
            let ingestion = ingestion.clone();
            async move { (vid_id, ingestion.reindex(vid_id).await) }
        })
        .buffer_unordered(MAX_CONCURRENT_REINDEX);

    let mut success_count = 0;
    let mut failures = Vec::new();

    while let Some((vid_id, result)) = stream.next().await {
        pb.inc(1);
        match result {
            Ok(outcome) => {
                pb.set_message(format!("{} ({} chunks)", vid_id, outcome.chunks_indexed));
                success_count += 1;
            }
            Err(e) => failures.push((vid_id, e)),
        }
    }
    pb.finish_and_clear();

    for (vid_id, e) in &failures {
        Output::error(&format!("Failed to re-index {}: {}", vid_id, e));
    }

    println!();
    Output::kv("Succeeded", &success_count.to_string());
    if !failures.is_empty() {
        Output::kv("Failed", &failures.len().to_string());
    }

    Ok(())
}
