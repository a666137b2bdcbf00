//! Pooled browser processes, one cached instance per engine family
//!
//! Acquisition, health check, and replacement happen as a single
//! suspension-atomic step per family: the pool lock is held across the
//! whole sequence, so the map is never observed mid-swap.

use chromiumoxide::browser::Browser;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::launch::{BrowserWrapper, apply_fingerprint, launch_browser};
use crate::config::SearchConfig;
use crate::engines::EngineKind;
use crate::error::SearchError;

/// Pool key: each family gets its own process and profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    Bing,
    DuckDuckGo,
    Brave,
    /// Shared family for content-extraction rendering
    Extractor,
}

impl EngineFamily {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EngineFamily::Bing => "bing",
            EngineFamily::DuckDuckGo => "duckduckgo",
            EngineFamily::Brave => "brave",
            EngineFamily::Extractor => "extractor",
        }
    }
}

impl From<EngineKind> for EngineFamily {
    fn from(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Bing => EngineFamily::Bing,
            EngineKind::DuckDuckGo => EngineFamily::DuckDuckGo,
            EngineKind::Brave => EngineFamily::Brave,
        }
    }
}

struct PoolEntry {
    family: EngineFamily,
    wrapper: BrowserWrapper,
}

/// Lazily-launched, reusable browser processes keyed by family
///
/// At most one live instance per family; when the number of distinct
/// families exceeds the configured maximum, the least-recently-inserted
/// entry is closed and dropped (insertion-order FIFO, not LRU-by-use).
pub struct BrowserPool {
    config: Arc<SearchConfig>,
    entries: Mutex<Vec<PoolEntry>>,
}

impl BrowserPool {
    #[must_use]
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self {
            config,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Return a healthy, connected browser for `family`, reusing the
    /// cached instance when possible
    ///
    /// A cached instance that fails its health check is discarded (its
    /// process terminated best-effort) and replaced with a fresh launch.
    ///
    /// # Errors
    ///
    /// Launch failures propagate to the caller uncaught.
    pub async fn acquire(&self, family: EngineFamily) -> Result<Arc<Browser>, SearchError> {
        let mut entries = self.entries.lock().await;

        if let Some(position) = entries.iter().position(|entry| entry.family == family) {
            if self.health_check(entries[position].wrapper.browser()).await {
                debug!("reusing cached {} browser", family.label());
                return Ok(entries[position].wrapper.browser_arc());
            }

            warn!(
                "cached {} browser failed health check, discarding",
                family.label()
            );
            let mut dead = entries.remove(position);
            dead.wrapper.shutdown().await;
        }

        info!("launching fresh browser for {} family", family.label());
        let wrapper = launch_browser(&self.config, family.label()).await?;
        let browser = wrapper.browser_arc();
        entries.push(PoolEntry { family, wrapper });

        while entries.len() > self.config.max_browser_families() {
            let mut evicted = entries.remove(0);
            info!("evicting oldest browser family: {}", evicted.family.label());
            evicted.wrapper.shutdown().await;
        }

        Ok(browser)
    }

    /// Open and immediately close a throwaway page with a realistic
    /// fingerprint profile
    async fn health_check(&self, browser: &Browser) -> bool {
        match browser.new_page("about:blank").await {
            Ok(page) => {
                if let Err(e) = apply_fingerprint(&page, self.config.user_agent()).await {
                    debug!("fingerprint application failed during health check: {e}");
                }
                if let Err(e) = page.close().await {
                    debug!("health-check page close failed: {e}");
                }
                true
            }
            Err(e) => {
                debug!("health check failed to open page: {e}");
                false
            }
        }
    }

    /// Drop one family's cached browser, terminating it best-effort
    ///
    /// Used after a failed attempt so a retry never reuses the browser
    /// that just failed.
    pub async fn invalidate(&self, family: EngineFamily) {
        let mut entries = self.entries.lock().await;
        if let Some(position) = entries.iter().position(|entry| entry.family == family) {
            debug!("invalidating {} browser", family.label());
            let mut entry = entries.remove(position);
            entry.wrapper.shutdown().await;
        }
    }

    /// Terminate every cached process and clear the pool
    ///
    /// Called on graceful shutdown and after a detected session-closure
    /// error, since a stale entry would fail every later acquisition.
    pub async fn release_all(&self) {
        let mut entries = self.entries.lock().await;
        if entries.is_empty() {
            return;
        }
        info!("releasing {} pooled browser(s)", entries.len());
        for mut entry in entries.drain(..) {
            entry.wrapper.shutdown().await;
        }
    }

    /// Number of families currently cached
    pub async fn cached_families(&self) -> usize {
        self.entries.lock().await.len()
    }
}
