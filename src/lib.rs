pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod scrapers;
pub mod server;
pub mod utils;

pub use config::ScraperConfig;
pub use error::{RowSkip, ScrapeError};
pub use models::*;
pub use orchestrator::ScrapeOrchestrator;
pub use scrapers::oddschecker::OddscheckerExtractor;
pub use utils::dates::resolve_match_date;
pub use utils::odds::normalize_odds;

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
