use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub const SCREENSHOT_FILE: &str = "error_screenshot.png";
pub const PAGE_SOURCE_FILE: &str = "error_page_source.html";

/// Receives debug artifacts when a scrape fails
pub trait DiagnosticSink: Send + Sync {
    fn save_screenshot(&self, png: &[u8]) -> Result<()>;
    fn save_page_source(&self, html: &str) -> Result<()>;
}

/// Writes artifacts as fixed file names inside one directory
#[derive(Debug, Clone)]
pub struct FileDiagnostics {
    dir: PathBuf,
}

impl FileDiagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DiagnosticSink for FileDiagnostics {
    fn save_screenshot(&self, png: &[u8]) -> Result<()> {
        let path = self.dir.join(SCREENSHOT_FILE);
        std::fs::write(&path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved screenshot to {}", path.display());
        Ok(())
    }

    fn save_page_source(&self, html: &str) -> Result<()> {
        let path = self.dir.join(PAGE_SOURCE_FILE);
        std::fs::write(&path, html)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved page HTML to {}", path.display());
        Ok(())
    }
}
