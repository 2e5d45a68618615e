//! Effective configuration: file, then environment and flags.

use crate::OutputFormat;
use anyhow::{Context, Result};
use boarding_core::FlowConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Values given on the command line that take precedence over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub headed: bool,
    pub timeout_secs: Option<u64>,
}

/// Load, override and validate the flow configuration
pub fn resolve(file: Option<&Path>, overrides: &Overrides) -> Result<FlowConfig> {
    let mut config = FlowConfig::load(file).with_context(|| match file {
        Some(path) => format!("Loading {}", path.display()),
        None => "Loading default configuration".to_string(),
    })?;

    if let Some(url) = &overrides.url {
        config.base_url = url.clone();
    }
    if let Some(path) = &overrides.chrome_path {
        config.browser.chrome_path = Some(path.clone());
    }
    if overrides.headed {
        config.browser.headless = false;
    }
    if let Some(secs) = overrides.timeout_secs {
        config.wait.timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

/// Print the effective configuration
pub fn execute(file: Option<&Path>, overrides: &Overrides, format: OutputFormat) -> Result<()> {
    let config = resolve(file, overrides)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Pretty => print_summary(&config),
    }
    Ok(())
}

fn print_summary(config: &FlowConfig) {
    let route = &config.route;
    println!("Site:        {}", config.base_url);
    println!(
        "Route:       {}, {} -> {}, {}",
        route.origin_city, route.origin_country, route.destination_city, route.destination_country
    );
    println!(
        "Dates:       month #{}, days #{} and #{}",
        config.dates.month_offset, config.dates.depart_day, config.dates.return_day
    );
    println!("Passengers:  {}", config.adults());
    for passenger in &config.passengers {
        println!("  - {}", passenger.full_name());
    }
    println!(
        "Seats:       outbound {:?}, inbound {:?}",
        config.seats.outbound, config.seats.inbound
    );
    println!(
        "Wait:        {:?} timeout, {:?} poll",
        config.wait.timeout, config.wait.poll_interval
    );
    println!(
        "Browser:     {}{}",
        if config.browser.headless { "headless" } else { "headed" },
        config
            .browser
            .chrome_path
            .as_ref()
            .map(|p| format!(" ({})", p.display()))
            .unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_take_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_url": "https://example.com/a"}}"#).unwrap();

        let overrides = Overrides {
            url: Some("https://example.com/b".to_string()),
            chrome_path: Some(PathBuf::from("/opt/chrome")),
            headed: true,
            timeout_secs: Some(5),
        };
        let config = resolve(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.base_url, "https://example.com/b");
        assert_eq!(config.browser.chrome_path, Some(PathBuf::from("/opt/chrome")));
        assert!(!config.browser.headless);
        assert_eq!(config.wait.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_file_value_used_without_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_url": "https://example.com/a"}}"#).unwrap();

        let config = resolve(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(config.base_url, "https://example.com/a");
        assert!(config.browser.headless);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        };
        assert!(resolve(None, &overrides).is_err());
    }
}
