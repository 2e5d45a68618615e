use crate::flow::BookingFlow;
use crate::report::Report;
use anyhow::{Result, anyhow};
use boarding_browser::{BrowserProfile, ChromeFinder, ChromeLauncher};
use boarding_core::FlowConfig;
use std::path::PathBuf;

/// Profile directory for a named persistent profile
pub fn profile_dir(name: &str) -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".boarding")
        .join("profiles")
        .join(name))
}

/// Run the booking flow end to end
pub fn execute(config: FlowConfig, profile: Option<String>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(config, profile));

    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}

async fn run(config: FlowConfig, profile: Option<String>) -> Result<()> {
    let report = Report::new();
    report.begin();
    report.stage(1, &format!("Go to {}", config.base_url));

    report.step("Launch browser");
    let chrome = ChromeFinder::new(config.browser.chrome_path.clone()).find()?;
    let profile = BrowserProfile::open(profile.as_deref().map(profile_dir).transpose()?)?;
    let (width, height) = config.browser.window_size;
    let session = ChromeLauncher::new(chrome, profile)
        .headless(config.browser.headless)
        .window_size(width, height)
        .wait(config.wait)
        .launch()
        .await?;

    let outcome = BookingFlow::new(session.page(), &config, report).run().await;

    report.step("Close browser");
    let closed = session.close().await;

    match (outcome, closed) {
        (Ok(()), Ok(())) => {
            report.end();
            Ok(())
        }
        (Ok(()), Err(e)) => Err(e.into()),
        (Err(flow), closed) => {
            if let Err(e) = closed {
                tracing::warn!("Browser did not close cleanly: {}", e);
            }
            Err(flow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_dir_is_under_home() {
        let dir = profile_dir("work").unwrap();
        assert!(dir.ends_with(".boarding/profiles/work"));
    }
}
