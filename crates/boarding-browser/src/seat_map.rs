use crate::locator::Locator;
use crate::page::Page;
use crate::Error;
use async_trait::async_trait;
use boarding_core::config::SeatMarkers;
use boarding_core::{SeatMap, WaitConfig};

/// Seat map of the page currently shown, read through CDP on every call.
pub struct LiveSeatMap<'a> {
    page: &'a Page,
    markers: SeatMarkers,
}

impl<'a> LiveSeatMap<'a> {
    pub fn new(page: &'a Page, markers: SeatMarkers) -> Self {
        Self { page, markers }
    }

    fn selected(&self) -> Locator {
        Locator::css(&self.markers.selected_seat)
    }
}

/// JS predicate: more than `baseline` elements match `selector`
fn selected_above_predicate(selector: &str, baseline: usize) -> String {
    let selector = serde_json::to_string(selector).unwrap_or_else(|_| "''".to_string());
    format!(
        "document.querySelectorAll({}).length > {}",
        selector, baseline
    )
}

/// A seat control that never rendered is reported by its index and marker
fn activation_error(err: Error, index: usize, marker: &str) -> boarding_core::Error {
    match err {
        Error::NotFound { .. } => boarding_core::Error::ElementNotFound {
            index,
            marker: marker.to_string(),
        },
        e => e.into(),
    }
}

#[async_trait]
impl SeatMap for LiveSeatMap<'_> {
    async fn selected_count(&self) -> boarding_core::Result<usize> {
        Ok(self.page.count(&self.selected()).await?)
    }

    async fn activate(&self, index: usize) -> boarding_core::Result<()> {
        let control = Locator::css(&self.markers.seat_control).nth(index);
        self.page
            .click(&control)
            .await
            .map_err(|e| activation_error(e, index, &self.markers.seat_control))
    }

    async fn wait_for_selected_above(
        &self,
        baseline: usize,
        wait: WaitConfig,
    ) -> boarding_core::Result<()> {
        self.page
            .wait_for_function_within(
                &selected_above_predicate(&self.markers.selected_seat, baseline),
                &format!("more than {} selected seats", baseline),
                wait,
            )
            .await
            .map_err(Into::into)
    }
}
