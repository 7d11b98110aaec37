use crate::models::{League, ScrapeResult};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const CSV_HEADER: [&str; 11] = [
    "league",
    "date",
    "date_str",
    "time_str",
    "home_team",
    "home_odds",
    "draw_odds",
    "away_team",
    "away_odds",
    "bookmakers_count",
    "match_link",
];

/// Save a scrape envelope as pretty JSON
pub fn save_result_to_json(result: &ScrapeResult, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(result).context("Failed to serialize scrape result")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a saved page (for example a failure dump) for offline extraction
pub fn load_html(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// One CSV row per match, the league name repeated on each
pub fn write_matches_csv<W: Write>(leagues: &[League], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for league in leagues {
        for m in &league.matches {
            csv.write_record([
                league.name.as_str(),
                m.date.as_str(),
                m.date_str.as_str(),
                m.time_str.as_str(),
                m.home_team.name.as_str(),
                m.home_team.odds.as_str(),
                m.draw_odds.as_str(),
                m.away_team.name.as_str(),
                m.away_team.odds.as_str(),
                m.bookmakers_count.as_str(),
                m.match_link.as_str(),
            ])?;
        }
    }

    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn save_matches_to_csv(leagues: &[League], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_matches_csv(leagues, file)
}
