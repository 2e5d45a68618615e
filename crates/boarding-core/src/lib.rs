pub mod checks;
pub mod config;
pub mod error;
pub mod seat;
pub mod wait;

pub use config::FlowConfig;
pub use error::{Error, Result};
pub use seat::{SeatMap, SeatSelector, Selection, SelectionState};
pub use wait::WaitConfig;
