use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const WINDOW_SIZE: (u32, u32) = (1920, 1080);
const USER_AGENT_ARG: &str = "--user-agent=Mozilla/5.0";

/// One open page in a browser process.
///
/// Dropping the session tears the browser down.
pub trait BrowserSession {
    fn navigate(&self, url: &str) -> Result<()>;

    /// Block until `selector` is present or `timeout` runs out
    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click the first node matching `xpath`; `Ok(false)` when nothing matched
    fn click_first_by_xpath(&self, xpath: &str) -> Result<bool>;

    fn page_source(&self) -> Result<String>;

    fn screenshot(&self) -> Result<Vec<u8>>;
}

pub trait BrowserLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Launches a fresh headless Chrome for every session
#[derive(Debug, Default, Clone)]
pub struct ChromeLauncher;

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some(WINDOW_SIZE))
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new(USER_AGENT_ARG),
            ])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Box::new(ChromeSession { browser, tab }))
    }
}

pub struct ChromeSession {
    // kept alive for the tab; the Chrome process exits when this drops
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession for ChromeSession {
    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.tab
            .wait_until_navigated()
            .context("Navigation did not complete")?;
        Ok(())
    }

    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .with_context(|| format!("Timed out after {:?} waiting for {}", timeout, selector))?;
        Ok(())
    }

    fn click_first_by_xpath(&self, xpath: &str) -> Result<bool> {
        let elements = match self.tab.find_elements_by_xpath(xpath) {
            Ok(elements) => elements,
            // headless_chrome reports "no match" as an error
            Err(e) => {
                debug!("No element for {}: {}", xpath, e);
                return Ok(false);
            }
        };
        match elements.first() {
            Some(element) => {
                element.click().context("Failed to click element")?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn page_source(&self) -> Result<String> {
        self.tab.get_content().context("Failed to read page HTML")
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .context("Failed to capture screenshot")
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        info!("Closing browser");
    }
}
