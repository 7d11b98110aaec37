use crate::error::{RowSkip, ScrapeError};
use crate::models::{positional_odds, League, Match, TeamOdds, NOT_AVAILABLE};
use crate::scrapers::cascade::{element_text, FieldCascade, NodeSet};
use crate::utils::dates::resolve_match_date;
use crate::utils::odds::normalize_odds;
use chrono::NaiveDateTime;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

pub const ODDSCHECKER_URL: &str = "https://www.oddschecker.com/co/futbol";
pub const ODDSCHECKER_ORIGIN: &str = "https://www.oddschecker.com";

/// Marker the browser waits for before the page counts as rendered
pub const CONTENT_MARKER: &str = "article[class*='CardWrapper']";

const CARD_FALLBACK: &[&str] = &["div[class*='league']", "div[class*='League']", "article"];
const LEAGUE_NAME: &[&str] = &[
    "a.AccordionText_aws8rxo",
    "a[class*='AccordionText']",
    "h2",
    "h3",
    "div.header",
    "div[class*='header']",
];
const MATCH_GROUPS: &[&str] = &["div[class*='GroupWrapper']", "div.matches", "div.events"];
const MATCH_ROWS: &[&str] = &[
    "div[class*='RowContent']",
    "div.match",
    "div.event",
    "tr.event",
];
const DATE: &[&str] = &["span[class*='date']", "div[class*='date']"];
const TIME: &[&str] = &[
    "a[class*='StartTimeText']",
    "span[class*='time']",
    "div[class*='time']",
];
const HOME_TEAM: &[&str] = &[
    "div[class*='TeamWrapper']:first-child p",
    "div.home-team",
    "span.home-team",
];
const AWAY_TEAM: &[&str] = &[
    "div[class*='TeamWrapper']:last-child p",
    "div.away-team",
    "span.away-team",
];
const ODDS: &[&str] = &[
    "button[class*='bestOddsButton']",
    "span[class*='odd']",
    "div[class*='odd']",
];
const BOOKMAKERS: &[&str] = &["span[class*='bookmakers']", "div[class*='bookmakers']"];
const MATCH_LINK: &[&str] = &["a[href*='/football/']"];

/// Turns a rendered Oddschecker listing page into leagues and matches.
///
/// Pure function of the HTML: no browser or network access happens here.
pub struct OddscheckerExtractor {
    link_origin: String,
    primary_cards: NodeSet,
    fallback_cards: NodeSet,
    league_name: FieldCascade,
    match_groups: NodeSet,
    match_rows: NodeSet,
    date: FieldCascade,
    time: FieldCascade,
    home_team: FieldCascade,
    away_team: FieldCascade,
    odds: NodeSet,
    bookmakers: FieldCascade,
    match_link: FieldCascade,
}

impl OddscheckerExtractor {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_link_origin(ODDSCHECKER_ORIGIN)
    }

    /// Match links are built as `link_origin` + the relative href found in the row
    pub fn with_link_origin(link_origin: impl Into<String>) -> Result<Self, ScrapeError> {
        Ok(Self {
            link_origin: link_origin.into(),
            primary_cards: NodeSet::new(&[CONTENT_MARKER])?,
            fallback_cards: NodeSet::new(CARD_FALLBACK)?,
            league_name: FieldCascade::new("league name", LEAGUE_NAME, "Unknown League")?,
            match_groups: NodeSet::new(MATCH_GROUPS)?,
            match_rows: NodeSet::new(MATCH_ROWS)?,
            date: FieldCascade::new("date", DATE, "Today")?,
            time: FieldCascade::new("time", TIME, "00:00")?,
            home_team: FieldCascade::new("home team", HOME_TEAM, "Unknown Home Team")?,
            away_team: FieldCascade::new("away team", AWAY_TEAM, "Unknown Away Team")?,
            odds: NodeSet::new(ODDS)?,
            bookmakers: FieldCascade::new("bookmakers", BOOKMAKERS, NOT_AVAILABLE)?,
            match_link: FieldCascade::new("match link", MATCH_LINK, NOT_AVAILABLE)?,
        })
    }

    /// Extract every league with at least one match.
    ///
    /// Fails only when the page has no league card at all; dates are resolved
    /// relative to `now`.
    pub fn extract(&self, html: &str, now: NaiveDateTime) -> Result<Vec<League>, ScrapeError> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let mut cards = self.primary_cards.select(root);
        if cards.is_empty() {
            cards = self.fallback_cards.select(root);
        }
        info!("Found {} league cards", cards.len());

        if cards.is_empty() {
            return Err(ScrapeError::NoLeagueCards);
        }

        let leagues = cards
            .into_iter()
            .filter_map(|card| self.extract_league(card, now))
            .collect();

        Ok(leagues)
    }

    fn extract_league(&self, card: ElementRef<'_>, now: NaiveDateTime) -> Option<League> {
        let name = self.league_name.text_or_sentinel(card);
        info!("Processing league: {}", name);

        let mut groups = self.match_groups.select(card);
        if groups.is_empty() {
            groups.push(card);
        }

        let mut matches = Vec::new();
        for group in groups {
            let rows = self.match_rows.select(group);
            debug!("Found {} matches in this group", rows.len());

            for (idx, row) in rows.into_iter().enumerate() {
                match self.extract_row(group, row, now) {
                    Ok(m) => matches.push(m),
                    Err(reason) => debug!("Skipping row {} in {}: {}", idx, name, reason),
                }
            }
        }

        if matches.is_empty() {
            debug!("Dropping league {} with no matches", name);
            return None;
        }

        Some(League { name, matches })
    }

    /// Pull one fixture out of a row of `group`; missing fields fall back to
    /// sentinels, so even a blank row yields a placeholder match
    pub fn extract_row(
        &self,
        group: ElementRef<'_>,
        row: ElementRef<'_>,
        now: NaiveDateTime,
    ) -> Result<Match, RowSkip> {
        let nested = row
            .ancestors()
            .take_while(|node| node.id() != group.id())
            .filter_map(ElementRef::wrap)
            .any(|outer| self.match_rows.contains(outer));
        if nested {
            return Err(RowSkip::NestedRow);
        }

        let date_str = self.date.text_or_sentinel(row);
        let time_str = self.time.text_or_sentinel(row);
        let date = resolve_match_date(&date_str, &time_str, now);

        let raw_odds: Vec<String> = self
            .odds
            .select(row)
            .into_iter()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .map(|text| normalize_odds(&text))
            .collect();
        let (home_odds, draw_odds, away_odds) = positional_odds(&raw_odds);

        let match_link = self
            .match_link
            .find_attr(row, "href")
            .map(|href| format!("{}{}", self.link_origin, href))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Ok(Match {
            date,
            date_str,
            time_str,
            home_team: TeamOdds {
                name: self.home_team.text_or_sentinel(row),
                odds: home_odds,
            },
            away_team: TeamOdds {
                name: self.away_team.text_or_sentinel(row),
                odds: away_odds,
            },
            draw_odds,
            bookmakers_count: self.bookmakers.text_or_sentinel(row),
            match_link,
            raw_odds,
        })
    }
}
