//! Flow configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock Dublin to Madrid booking for two adults.

use crate::wait::WaitConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.ryanair.com/ie/en";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub base_url: String,
    pub expected_title: String,
    pub route: Route,
    pub dates: TravelDates,
    pub passengers: Vec<Passenger>,
    pub seats: SeatPlan,
    pub markers: SeatMarkers,
    pub wait: WaitConfig,
    pub browser: BrowserSettings,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            expected_title: "Ryanair".to_string(),
            route: Route::default(),
            dates: TravelDates::default(),
            passengers: vec![
                Passenger::new("Mr", "John", "Doe"),
                Passenger::new("Ms", "Jane", "Roe"),
            ],
            seats: SeatPlan::default(),
            markers: SeatMarkers::default(),
            wait: WaitConfig::default(),
            browser: BrowserSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub origin_country: String,
    pub origin_city: String,
    pub destination_country: String,
    pub destination_city: String,
    /// Label of the return leg in the seat carousel, e.g. "MAD - DUB"
    pub return_leg: String,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            origin_country: "Ireland".to_string(),
            origin_city: "Dublin".to_string(),
            destination_country: "Spain".to_string(),
            destination_city: "Madrid".to_string(),
            return_leg: "MAD - DUB".to_string(),
        }
    }
}

/// Positions in the rendered calendar, not calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelDates {
    pub month_offset: usize,
    pub depart_day: usize,
    pub return_day: usize,
}

impl Default for TravelDates {
    fn default() -> Self {
        Self {
            month_offset: 2,
            depart_day: 1,
            return_day: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
}

impl Passenger {
    pub fn new(title: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            title: title.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}. {} {}", self.title, self.first_name, self.last_name)
    }
}

/// Seat control indices per flight leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatPlan {
    pub outbound: Vec<usize>,
    pub inbound: Vec<usize>,
}

impl Default for SeatPlan {
    fn default() -> Self {
        Self {
            outbound: vec![0, 1],
            inbound: vec![2, 3],
        }
    }
}

/// CSS selectors for the seat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatMarkers {
    /// One element per selected seat
    pub selected_seat: String,
    pub seat_control: String,
}

impl Default for SeatMarkers {
    fn default() -> Self {
        Self {
            selected_seat: "div.seatmap__seat-text".to_string(),
            seat_control: "button.ng-star-inserted".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_size: (1920, 1080),
        }
    }
}

impl FlowConfig {
    /// Load a configuration file, falling back to defaults for missing fields
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FlowConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded flow configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn adults(&self) -> usize {
        self.passengers.len()
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url).map_err(|e| {
            Error::InvalidConfig(format!("base_url '{}' is not a URL: {}", self.base_url, e))
        })?;

        if self.passengers.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one passenger is required".to_string(),
            ));
        }

        for passenger in &self.passengers {
            if passenger.first_name.trim().is_empty() || passenger.last_name.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "passenger '{}' needs a first and last name",
                    passenger.full_name()
                )));
            }
        }

        for (leg, seats) in [("outbound", &self.seats.outbound), ("inbound", &self.seats.inbound)] {
            if seats.len() != self.adults() {
                return Err(Error::InvalidConfig(format!(
                    "{} seats list has {} entries but there are {} passengers",
                    leg,
                    seats.len(),
                    self.adults()
                )));
            }

            let mut seen = HashSet::new();
            if let Some(dup) = seats.iter().find(|i| !seen.insert(**i)) {
                return Err(Error::InvalidConfig(format!(
                    "{} seat index {} is listed twice",
                    leg, dup
                )));
            }
        }

        if self.dates.return_day <= self.dates.depart_day {
            return Err(Error::InvalidConfig(format!(
                "return_day ({}) must come after depart_day ({})",
                self.dates.return_day, self.dates.depart_day
            )));
        }

        if self.wait.timeout.is_zero() || self.wait.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "wait timeout_ms and poll_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
