//! Seed command: index the bundled demo videos.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::{demo_corpus, StaticTranscriptProvider};
use anyhow::Result;
use std::sync::Arc;

/// Run the seed command.
pub async fn run_seed(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::with_provider(settings, Arc::new(StaticTranscriptProvider::demo()))?;
    let ingestion = orchestrator.ingestion();

    let corpus = demo_corpus();
    let pb = Output::progress_bar(corpus.len() as u64, "Indexing demo videos");

    let mut indexed = Vec::new();
    for video in &corpus {
        pb.set_message(video.title.to_string());
        let outcome = ingestion.ingest_document(&video.document()).await?;
        indexed.push((video, outcome));
        pb.inc(1);
    }
    pb.finish_and_clear();

    Output::success(&format!("Seeded {} demo videos", indexed.len()));
    for (video, outcome) in &indexed {
        Output::list_item(&format!(
            "{} ({}, {} chunks)",
            video.title, outcome.video_id, outcome.chunks_indexed
        ));
    }

    Ok(())
}
