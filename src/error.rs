use std::backtrace::Backtrace;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to initialize browser")]
    BrowserLaunch(#[source] anyhow::Error),

    #[error("No leagues found. Website structure may have changed.")]
    NoLeagueCards,

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

/// Why a match row produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowSkip {
    /// Row node sits inside another row of the same group, whose record
    /// already covers it
    #[error("row is nested inside another match row")]
    NestedRow,
}

/// Debug rendering of `err`, followed by a backtrace of the calling thread
/// when the error did not capture one itself
pub fn stack_trace(err: &dyn Debug, captured: bool) -> String {
    let rendered = format!("{:?}", err);
    if captured {
        rendered
    } else {
        format!("{}\n\nStack backtrace:\n{}", rendered, Backtrace::force_capture())
    }
}
