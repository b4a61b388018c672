//! HTTP API server command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::server::{router, AppState};
use std::sync::Arc;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;
    let app = router(Arc::new(AppState::new(orchestrator.chat())));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Vidchat API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Hello", "GET  /");
    Output::kv("Chat", "POST /generate");
    Output::kv("Reset thread", "POST /threads/{thread_id}/reset");
    println!();
    Output::kv("Reasoner", &orchestrator.settings().agent.reasoner.to_string());
    Output::kv("Embeddings", &orchestrator.settings().embedding.provider.to_string());
    Output::kv("Vector store", &orchestrator.settings().vector_store.provider.to_string());
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
