use crate::page::Page;
use crate::profile::BrowserProfile;
use crate::{Error, Result};
use boarding_core::WaitConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Chrome launch settings for a booking run
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile: BrowserProfile,
    headless: bool,
    window_size: (u32, u32),
    wait: WaitConfig,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile: BrowserProfile) -> Self {
        Self {
            chrome_path,
            profile,
            headless: true,
            window_size: (1920, 1080),
            wait: WaitConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Wait settings handed to the page
    pub fn wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Extra Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            // Needed when user namespaces are unavailable (containers, CI)
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--lang=en-IE".to_string(),
        ]
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let (width, height) = self.window_size;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(self.chrome_path.clone())
            .user_data_dir(self.profile.path())
            .window_size(width, height)
            .request_timeout(self.wait.timeout.max(Duration::from_secs(30)))
            .args(self.build_args());

        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| Error::Browser(format!("Invalid browser configuration: {}", e)))
    }

    /// Launch Chrome and open a blank page
    pub async fn launch(self) -> Result<BrowserSession> {
        let config = self.browser_config()?;

        tracing::info!(
            "Launching Chrome at {} ({})",
            self.chrome_path.display(),
            if self.headless { "headless" } else { "headed" }
        );

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        // The handler must be polled for any CDP command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };

        Ok(BrowserSession {
            browser,
            handler_task,
            page: Page::new(page, self.wait),
            _profile: self.profile,
        })
    }
}

/// A running browser with the page the flow drives.
///
/// Call [`BrowserSession::close`] on every exit path; dropping the session
/// only stops the CDP handler and leaves process cleanup to chromiumoxide.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    _profile: BrowserProfile,
}

impl BrowserSession {
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Close Chrome and wait for the process to exit
    pub async fn close(mut self) -> Result<()> {
        tracing::info!("Closing browser");
        let closed = self.browser.close().await;
        let exited = self.browser.wait().await;
        self.handler_task.abort();

        closed?;
        exited?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
