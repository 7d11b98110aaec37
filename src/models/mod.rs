use serde::{Deserialize, Serialize};

/// Placeholder used whenever a value could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// Outcome of one scrape request, serialized as-is by the web facade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeResult {
    Success(ScrapeReport),
    Failure(ErrorEnvelope),
}

impl ScrapeResult {
    pub fn failure(error: impl Into<String>) -> Self {
        ScrapeResult::Failure(ErrorEnvelope {
            error: error.into(),
            stack_trace: None,
        })
    }

    pub fn failure_with_trace(error: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        ScrapeResult::Failure(ErrorEnvelope {
            error: error.into(),
            stack_trace: Some(stack_trace.into()),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResult::Success(_))
    }
}

/// Leagues scraped at a given local time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub scraped_at: String, // %Y-%m-%d %H:%M:%S, local time
    pub leagues: Vec<League>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// A competition and the fixtures listed under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub matches: Vec<Match>,
}

/// One fixture row from a league card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub date: String, // resolved "YYYY-MM-DD HH:MM", or "{date_str} {time_str}" when unparseable
    pub date_str: String,
    pub time_str: String,
    #[serde(rename = "homeTeam")]
    pub home_team: TeamOdds,
    #[serde(rename = "awayTeam")]
    pub away_team: TeamOdds,
    pub draw_odds: String,
    pub bookmakers_count: String,
    pub match_link: String,
    pub raw_odds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOdds {
    pub name: String,
    pub odds: String,
}

/// Positional view over the odds found in a row.
///
/// The row layout is assumed to be home / draw / away; nothing checks that the
/// columns really are in that order.
pub fn positional_odds(raw_odds: &[String]) -> (String, String, String) {
    let at = |i: usize| {
        raw_odds
            .get(i)
            .cloned()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    (at(0), at(1), at(2))
}
