use crate::config::ScraperConfig;
use crate::diagnostics::{DiagnosticSink, FileDiagnostics};
use crate::error::{stack_trace, ScrapeError};
use crate::models::{League, ScrapeReport, ScrapeResult};
use crate::scrapers::browser::{BrowserLauncher, BrowserSession};
use crate::scrapers::oddschecker::{OddscheckerExtractor, CONTENT_MARKER};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::backtrace::BacktraceStatus;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const COOKIE_BUTTON_XPATH: &str =
    "//button[contains(text(), 'Accept') or contains(text(), 'Aceptar')]";

/// Runs one browser-backed scrape per call and always answers with an envelope
pub struct ScrapeOrchestrator {
    config: ScraperConfig,
    launcher: Box<dyn BrowserLauncher>,
    extractor: OddscheckerExtractor,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
}

impl ScrapeOrchestrator {
    /// Diagnostics go to `config.debug_dir` when one is set
    pub fn new(config: ScraperConfig, launcher: Box<dyn BrowserLauncher>) -> Result<Self, ScrapeError> {
        let diagnostics = config
            .debug_dir
            .clone()
            .map(|dir| Box::new(FileDiagnostics::new(dir)) as Box<dyn DiagnosticSink>);
        Self::with_diagnostics(config, launcher, diagnostics)
    }

    pub fn with_diagnostics(
        config: ScraperConfig,
        launcher: Box<dyn BrowserLauncher>,
        diagnostics: Option<Box<dyn DiagnosticSink>>,
    ) -> Result<Self, ScrapeError> {
        let extractor = OddscheckerExtractor::with_link_origin(config.link_origin.clone())?;
        Ok(Self {
            config,
            launcher,
            extractor,
            diagnostics,
        })
    }

    pub fn scrape(&self) -> ScrapeResult {
        self.scrape_at(Local::now().naive_local())
    }

    /// Scrape with `now` as both the report timestamp and the reference for
    /// relative match dates
    pub fn scrape_at(&self, now: NaiveDateTime) -> ScrapeResult {
        let session = match self.launcher.launch() {
            Ok(session) => session,
            Err(e) => {
                let err = ScrapeError::BrowserLaunch(e);
                error!("Error initializing browser: {:?}", err);
                return ScrapeResult::failure(err.to_string());
            }
        };

        let scraped_at = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let result = match self.run(session.as_ref(), now) {
            Ok(leagues) => ScrapeResult::Success(ScrapeReport { scraped_at, leagues }),
            Err(e) if matches!(e.downcast_ref::<ScrapeError>(), Some(ScrapeError::NoLeagueCards)) => {
                warn!("{}", e);
                ScrapeResult::failure(e.to_string())
            }
            Err(e) => {
                error!("Error during scraping: {:?}", e);
                self.capture_diagnostics(session.as_ref());
                let captured = e.backtrace().status() == BacktraceStatus::Captured;
                ScrapeResult::failure_with_trace(e.to_string(), stack_trace(&e, captured))
            }
        };

        // browser process ends here on every path
        drop(session);
        result
    }

    fn run(&self, session: &dyn BrowserSession, now: NaiveDateTime) -> Result<Vec<League>> {
        info!("Accessing: {}", self.config.target_url);
        session.navigate(&self.config.target_url)?;

        if let Err(e) = self.accept_cookies(session) {
            warn!("Cookie handling error (non-critical): {:#}", e);
        }

        match session.wait_for_element(CONTENT_MARKER, self.config.content_timeout) {
            Ok(()) => info!("Main content loaded"),
            Err(e) => warn!("Content loading warning: {:#}", e),
        }

        pause(self.config.settle_delay);

        let html = session.page_source()?;
        let leagues = self.extractor.extract(&html, now)?;
        info!("Extracted {} leagues", leagues.len());
        Ok(leagues)
    }

    fn accept_cookies(&self, session: &dyn BrowserSession) -> Result<()> {
        session.wait_for_element("body", self.config.ready_timeout)?;
        if session.click_first_by_xpath(COOKIE_BUTTON_XPATH)? {
            info!("Accepted cookies");
            pause(self.config.consent_pause);
        }
        Ok(())
    }

    fn capture_diagnostics(&self, session: &dyn BrowserSession) {
        let Some(sink) = &self.diagnostics else {
            return;
        };

        match session.screenshot() {
            Ok(png) => {
                if let Err(e) = sink.save_screenshot(&png) {
                    warn!("Could not save screenshot: {:#}", e);
                }
            }
            Err(e) => warn!("Could not capture screenshot: {:#}", e),
        }

        match session.page_source() {
            Ok(html) => {
                if let Err(e) = sink.save_page_source(&html) {
                    warn!("Could not save page HTML: {:#}", e);
                }
            }
            Err(e) => warn!("Could not read page HTML: {:#}", e),
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::Ordering;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn orchestrator(launcher: &FakeLauncher, sink: &RecordingSink) -> ScrapeOrchestrator {
        ScrapeOrchestrator::with_diagnostics(
            quick_config(),
            Box::new(launcher.clone()),
            Some(Box::new(sink.clone())),
        )
        .unwrap()
    }

    fn page_with_fixture() -> FakePage {
        FakePage {
            html: Some(FIXTURE.to_string()),
            ..FakePage::default()
        }
    }

    #[test]
    fn test_successful_scrape() {
        let launcher = FakeLauncher::new(FakePage {
            consent_button: true,
            ..page_with_fixture()
        });
        let sink = RecordingSink::default();

        let result = orchestrator(&launcher, &sink).scrape_at(now());
        let ScrapeResult::Success(report) = result else {
            panic!("expected success");
        };

        assert_eq!(report.scraped_at, "2024-03-01 09:00:00");
        assert_eq!(report.leagues.len(), 1);
        assert_eq!(report.leagues[0].matches[0].home_team.name, "Arsenal");
        assert!(launcher.clicked.load(Ordering::SeqCst));
        assert_eq!(launcher.closed(), 1);
        assert!(sink.saved().is_empty());
    }

    #[test]
    fn test_launch_failure_envelope() {
        let launcher = FakeLauncher::new(FakePage {
            fail_launch: true,
            ..FakePage::default()
        });
        let sink = RecordingSink::default();

        let result = orchestrator(&launcher, &sink).scrape_at(now());
        assert_eq!(result, ScrapeResult::failure("Failed to initialize browser"));
        assert_eq!(launcher.closed(), 0);
        assert!(sink.saved().is_empty());
    }

    #[test]
    fn test_navigation_failure_captures_artifacts_and_closes() {
        let launcher = FakeLauncher::new(FakePage {
            fail_navigate: true,
            ..page_with_fixture()
        });
        let sink = RecordingSink::default();

        let result = orchestrator(&launcher, &sink).scrape_at(now());
        let ScrapeResult::Failure(envelope) = result else {
            panic!("expected failure");
        };

        assert!(envelope.error.contains("Failed to navigate"));
        let trace = envelope.stack_trace.unwrap();
        assert!(trace.contains("ERR_NAME_NOT_RESOLVED"));
        assert!(trace.contains("Stack backtrace:"));
        assert_eq!(sink.saved(), vec!["screenshot", "page_source"]);
        assert_eq!(launcher.closed(), 1);
    }

    #[test]
    fn test_content_timeout_is_not_fatal() {
        let launcher = FakeLauncher::new(FakePage {
            content_missing: true,
            ..page_with_fixture()
        });
        let sink = RecordingSink::default();

        let result = orchestrator(&launcher, &sink).scrape_at(now());
        assert!(result.is_success());
        assert_eq!(launcher.closed(), 1);
    }

    #[test]
    fn test_consent_failure_is_not_fatal() {
        let launcher = FakeLauncher::new(FakePage {
            consent_click_fails: true,
            ..page_with_fixture()
        });
        let sink = RecordingSink::default();

        assert!(orchestrator(&launcher, &sink).scrape_at(now()).is_success());
    }

    #[test]
    fn test_page_without_cards() {
        let launcher = FakeLauncher::new(FakePage {
            html: Some("<html><body><p>Mantenimiento</p></body></html>".to_string()),
            ..FakePage::default()
        });
        let sink = RecordingSink::default();

        let result = orchestrator(&launcher, &sink).scrape_at(now());
        assert_eq!(
            result,
            ScrapeResult::failure("No leagues found. Website structure may have changed.")
        );
        assert!(sink.saved().is_empty());
        assert_eq!(launcher.closed(), 1);
    }

    #[test]
    fn test_broken_sink_is_swallowed() {
        let launcher = FakeLauncher::new(FakePage::default()); // page_source fails
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };

        let result = orchestrator(&launcher, &sink).scrape_at(now());
        let ScrapeResult::Failure(envelope) = result else {
            panic!("expected failure");
        };
        assert_eq!(envelope.error, "target closed");
        assert!(envelope.stack_trace.is_some());
        assert_eq!(launcher.closed(), 1);
    }

    #[test]
    fn test_without_diagnostics() {
        let launcher = FakeLauncher::new(FakePage {
            fail_navigate: true,
            ..FakePage::default()
        });
        let orchestrator =
            ScrapeOrchestrator::with_diagnostics(quick_config(), Box::new(launcher.clone()), None)
                .unwrap();

        assert!(!orchestrator.scrape_at(now()).is_success());
        assert_eq!(launcher.closed(), 1);
    }
}
