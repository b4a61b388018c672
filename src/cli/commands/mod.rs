//! CLI command implementations.

mod chat;
mod config;
mod ingest;
mod list;
mod reindex;
mod retrieve;
mod seed;
mod serve;

pub use chat::run_chat;
pub use config::run_config;
pub use ingest::run_ingest;
pub use list::run_list;
pub use reindex::run_reindex;
pub use retrieve::run_retrieve;
pub use seed::run_seed;
pub use serve::run_serve;
