//! Chrome driver for the booking checks: finds and launches the browser,
//! and exposes the page operations and live seat map the flow runs against.

mod chrome_finder;
mod error;
mod launcher;
mod locator;
mod page;
mod profile;
mod seat_map;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{BrowserSession, ChromeLauncher};
pub use locator::{Locator, Role, TextMatch};
pub use page::Page;
pub use profile::BrowserProfile;
pub use seat_map::LiveSeatMap;
