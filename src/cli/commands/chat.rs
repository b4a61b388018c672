//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::parse_video_reference;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

const CLI_THREAD: &str = "cli";

/// Run the interactive chat command.
pub async fn run_chat(video: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let chat = orchestrator.chat();
    let mut thread_id = CLI_THREAD.to_string();

    if let Some(reference) = video {
        let video_id = parse_video_reference(&reference)?;
        if orchestrator.index().count_for_video(&video_id).await? == 0 {
            let spinner = Output::spinner(&format!("Ingesting {}...", video_id));
            let outcome = orchestrator.ingestion().ingest(&video_id).await;
            spinner.finish_and_clear();
            let outcome = outcome?;
            Output::success(&format!(
                "Indexed {} ({} chunks)",
                outcome.video_id, outcome.chunks_indexed
            ));
        }
        chat.sessions().bind_video(&thread_id, &video_id)?;
        Output::kv("Video", &video_id);
    }

    println!("\n{}", style("Vidchat").bold().cyan());
    println!(
        "{}\n",
        style("Paste a YouTube link to add a video, then ask about it. 'clear' resets, 'exit' quits.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            thread_id = chat.reset(&thread_id)?;
            Output::info("Conversation cleared.");
            continue;
        }

        match chat.generate(input, None, &thread_id).await {
            Ok(reply) => {
                println!("\n{} {}\n", style("Vidchat:").cyan().bold(), reply);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
