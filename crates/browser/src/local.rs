use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tabplanner_core::{is_web_url, Config, Error, Paths, Result};
use tokio::process::Command;
use tracing::{debug, info};

use crate::devtools::DevToolsEndpoint;
use crate::discovery::{default_profile_dir, find_browser_binary, BrowserEngine};
use crate::profile::ChromiumProfile;
use crate::{BookmarkNode, BrowserApi, HistoryItem, HistoryQuery, TabInfo};

/// The user's installed browser: profile files on disk for bookmarks and
/// history, the DevTools endpoint (when a debug port is configured) for tabs.
pub struct LocalBrowser {
    engine: BrowserEngine,
    profile: Option<ChromiumProfile>,
    devtools: Option<DevToolsEndpoint>,
    scratch_dir: PathBuf,
}

impl LocalBrowser {
    pub fn new(
        engine: BrowserEngine,
        profile: Option<ChromiumProfile>,
        devtools: Option<DevToolsEndpoint>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            profile,
            devtools,
            scratch_dir,
        }
    }

    pub fn from_config(config: &Config, paths: &Paths) -> Self {
        let engine = BrowserEngine::from_str(&config.browser.engine);
        let profile_dir = config
            .profile_dir_override()
            .or_else(|| default_profile_dir(engine));
        if profile_dir.is_none() {
            debug!(browser = engine.name(), "No browser profile directory found");
        }
        let devtools = config.browser.debug_port.map(DevToolsEndpoint::new);

        Self::new(
            engine,
            profile_dir.map(ChromiumProfile::new),
            devtools,
            paths.tmp_dir(),
        )
    }

    pub fn engine(&self) -> BrowserEngine {
        self.engine
    }

    pub fn profile(&self) -> Option<&ChromiumProfile> {
        self.profile.as_ref()
    }

    pub fn devtools(&self) -> Option<&DevToolsEndpoint> {
        self.devtools.as_ref()
    }

    fn require_profile(&self) -> Result<ChromiumProfile> {
        self.profile.clone().ok_or_else(|| {
            Error::Browser(format!(
                "No {} profile found. Set browser.profileDir in the config.",
                self.engine.name()
            ))
        })
    }
}

#[async_trait]
impl BrowserApi for LocalBrowser {
    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>> {
        let profile = self.require_profile()?;
        tokio::task::spawn_blocking(move || profile.read_bookmarks())
            .await
            .map_err(|e| Error::Other(format!("Bookmark reader panicked: {}", e)))?
    }

    async fn search_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>> {
        let profile = self.require_profile()?;
        let query = query.clone();
        let scratch = self.scratch_dir.clone();
        tokio::task::spawn_blocking(move || profile.read_history(&query, &scratch))
            .await
            .map_err(|e| Error::Other(format!("History reader panicked: {}", e)))?
    }

    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        let Some(devtools) = &self.devtools else {
            debug!("No DevTools port configured, open tabs unavailable");
            return Ok(Vec::new());
        };

        let targets = devtools.list_targets().await?;
        Ok(targets
            .into_iter()
            .filter(|t| t.is_page())
            .map(|t| TabInfo {
                title: Some(t.title),
                url: Some(t.url),
                // DevTools does not report pinned state.
                pinned: None,
            })
            .collect())
    }

    async fn create_tab(&self, url: &str) -> Result<()> {
        if !is_web_url(url) {
            return Err(Error::Browser(format!("Refusing to open non-http(s) URL: {}", url)));
        }

        if let Some(devtools) = &self.devtools {
            let target = devtools.open_tab(url).await?;
            debug!(target = %target.id, url = %url, "Opened tab via DevTools");
            return Ok(());
        }

        let binary = find_browser_binary(self.engine)
            .ok_or_else(|| Error::Browser(format!("{} not found. Please install it.", self.engine.name())))?;
        info!(browser = self.engine.name(), url = %url, "Opening tab via browser binary");
        // "--" ends switch parsing, so the URL is never read as a flag.
        Command::new(&binary)
            .arg("--")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch {}: {}", self.engine.name(), e)))?;
        Ok(())
    }
}
