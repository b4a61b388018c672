//! List command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::HashingEmbedder;
use crate::vector_store::{create_vector_store, VectorIndex};
use anyhow::Result;
use std::sync::Arc;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    preflight::check(Operation::List, &settings)?;

    // Listing never embeds, so no API key is needed.
    let index = VectorIndex::new(
        Arc::new(HashingEmbedder::default()),
        create_vector_store(&settings)?,
    );

    match index.list_videos().await {
        Ok(videos) => {
            if videos.is_empty() {
                Output::info("No videos indexed yet. Use 'vidchat ingest <url>' or 'vidchat seed' to add content.");
            } else {
                Output::header(&format!("Indexed Videos ({})", videos.len()));
                println!();

                for video in &videos {
                    Output::video_info(&video.video_id, video.chunk_count, &video.indexed_at);
                }

                let total_chunks: u32 = videos.iter().map(|v| v.chunk_count).sum();
                println!();
                Output::kv("Total videos", &videos.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
