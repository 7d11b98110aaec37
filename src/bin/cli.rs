use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use odds_scrape::scrapers::browser::ChromeLauncher;
use odds_scrape::utils::data::{load_html, save_matches_to_csv, save_result_to_json};
use odds_scrape::{
    init_logging, OddscheckerExtractor, ScrapeOrchestrator, ScrapeReport, ScrapeResult,
    ScraperConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cli", about = "Oddschecker football odds scraper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the live page in headless Chrome and scrape it once
    Scrape {
        /// Save the full result as JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Save one row per match as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Extract matches from a saved HTML page without a browser
    Extract {
        #[arg(long)]
        html: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    init_logging();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env();

    let (result, output, csv) = match cli.command {
        Command::Scrape { output, csv } => {
            let orchestrator = ScrapeOrchestrator::new(config, Box::new(ChromeLauncher))
                .context("Failed to set up scraper")?;
            (orchestrator.scrape(), output, csv)
        }
        Command::Extract { html, output, csv } => {
            let extractor = OddscheckerExtractor::with_link_origin(config.link_origin)?;
            let now = Local::now().naive_local();
            let page = load_html(&html)?;
            let result = match extractor.extract(&page, now) {
                Ok(leagues) => ScrapeResult::Success(ScrapeReport {
                    scraped_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
                    leagues,
                }),
                Err(e) => ScrapeResult::failure(e.to_string()),
            };
            (result, output, csv)
        }
    };

    print_summary(&result);

    if let Some(path) = output {
        save_result_to_json(&result, &path)?;
        println!("\nSaved result to {}", path.display());
    }

    if let (Some(path), ScrapeResult::Success(report)) = (csv, &result) {
        save_matches_to_csv(&report.leagues, &path)?;
        println!("Saved matches to {}", path.display());
    }

    if !result.is_success() {
        anyhow::bail!("scrape did not produce any leagues");
    }

    Ok(())
}

fn print_summary(result: &ScrapeResult) {
    match result {
        ScrapeResult::Success(report) => {
            println!("Scraped at {}\n", report.scraped_at);
            if report.leagues.is_empty() {
                println!("No matches found.");
            }
            for league in &report.leagues {
                println!("{} ({} matches)", league.name, league.matches.len());
                for m in &league.matches {
                    println!(
                        "  {} | {} ({}) v {} ({}) | draw {} | {}",
                        m.date,
                        m.home_team.name,
                        m.home_team.odds,
                        m.away_team.name,
                        m.away_team.odds,
                        m.draw_odds,
                        m.bookmakers_count
                    );
                }
            }
        }
        ScrapeResult::Failure(envelope) => {
            eprintln!("Error: {}", envelope.error);
            if let Some(trace) = &envelope.stack_trace {
                eprintln!("{}", trace);
            }
        }
    }
}
