//! Browser process launch with automation-detection hardening
//!
//! Launches chromiumoxide browser instances with a tracked event-handler
//! task and a per-instance temp profile directory. The handler MUST be
//! aborted when the browser goes away or it runs forever.

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::SearchError;

/// A launched browser process, its event-handler task, and its profile dir
///
/// Owned exclusively by the pool; callers borrow the inner browser for
/// the duration of one browsing context.
#[derive(Debug)]
pub struct BrowserWrapper {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser: Arc::new(browser),
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Shareable handle for the duration of one borrow
    #[must_use]
    pub fn browser_arc(&self) -> Arc<Browser> {
        Arc::clone(&self.browser)
    }

    /// Best-effort graceful termination
    ///
    /// Closing needs exclusive access to the browser; if a borrower still
    /// holds a clone, the process is killed when the last handle drops
    /// instead.
    pub async fn shutdown(&mut self) {
        if let Some(browser) = Arc::get_mut(&mut self.browser) {
            if let Err(e) = browser.close().await {
                warn!("failed to close browser cleanly: {e}");
            }
            if let Err(e) = browser.wait().await {
                warn!("failed to wait for browser exit: {e}");
            }
        } else {
            warn!("browser has outstanding borrows, skipping graceful close");
        }
        self.handler.abort();
        self.cleanup_temp_dir();
    }

    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("removing browser profile dir: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!("failed to remove profile dir {}: {e}", path.display());
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop kills the process; the profile dir still needs
        // removing if shutdown() never ran.
        self.cleanup_temp_dir();
    }
}

/// Launch a browser with the hardening flag set
///
/// Disables automation-detection signals, sandboxing (for container
/// hosts), and GPU/background throttling so rendering behaves
/// deterministically.
///
/// # Errors
///
/// `SearchError::BrowserUnavailable` when no executable can be resolved
/// or the process fails to start.
pub async fn launch_browser(
    config: &SearchConfig,
    profile_prefix: &str,
) -> Result<BrowserWrapper, SearchError> {
    let executable = resolve_executable(config)?;

    let user_data_dir = std::env::temp_dir().join(format!(
        "scour_{profile_prefix}_{}",
        uuid::Uuid::new_v4().simple()
    ));
    std::fs::create_dir_all(&user_data_dir).map_err(|e| {
        SearchError::BrowserUnavailable(format!(
            "failed to create profile dir {}: {e}",
            user_data_dir.display()
        ))
    })?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(executable);

    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    builder = builder
        .arg(format!("--user-agent={}", config.user_agent()))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-software-rasterizer")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-backgrounding-occluded-windows")
        .arg("--disable-background-networking")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-hang-monitor")
        .arg("--disable-ipc-flooding-protection")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--metrics-recording-only")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = builder
        .build()
        .map_err(|e| SearchError::BrowserUnavailable(format!("invalid browser config: {e}")))?;

    info!("launching browser (profile {profile_prefix})");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| SearchError::BrowserUnavailable(format!("browser launch failed: {e}")))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("browser handler event error: {e:?}");
            }
        }
        debug!("browser event handler finished");
    });

    Ok(BrowserWrapper::new(browser, handler_task, user_data_dir))
}

fn resolve_executable(config: &SearchConfig) -> Result<PathBuf, SearchError> {
    if let Some(path) = config.browser_executable() {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(SearchError::BrowserUnavailable(format!(
            "configured browser executable not found: {}",
            path.display()
        )));
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            debug!("found browser at {}", path.display());
            return Ok(path);
        }
    }

    Err(SearchError::BrowserUnavailable(
        "no Chrome/Chromium executable found on this system".to_string(),
    ))
}

/// Apply a realistic fingerprint profile to a fresh page
///
/// Masks the webdriver flag and pins userAgent/languages so health-check
/// and navigation pages present consistently.
pub async fn apply_fingerprint(page: &Page, user_agent: &str) -> anyhow::Result<()> {
    page.evaluate(
        r"
        Object.defineProperty(navigator, 'webdriver', {
            get: () => false
        });
    ",
    )
    .await?;

    let user_agent_js = format!(
        r"
        Object.defineProperty(navigator, 'userAgent', {{
            value: '{user_agent}'
        }});
    "
    );
    page.evaluate(user_agent_js.as_str()).await?;

    page.evaluate(
        r"
        Object.defineProperty(navigator, 'languages', {
            get: () => ['en-US', 'en']
        });
    ",
    )
    .await?;

    Ok(())
}

/// Closes its page on every exit path
///
/// Dropping spawns the async close so cleanup happens even when the
/// borrowing scope unwinds early.
pub struct PageGuard {
    page: Option<Page>,
}

impl PageGuard {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        self.page.as_ref().expect("page taken only in Drop")
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            tokio::spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}
