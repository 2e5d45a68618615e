//! The checkout journey: search, fare, passengers, seats, extras.
//!
//! Stages run strictly in order against one page. Any failed check or driver
//! error ends the journey; the caller owns the browser and closes it.

use crate::report::Report;
use anyhow::{Context, Result};
use boarding_browser::{LiveSeatMap, Locator, Page, Role, TextMatch};
use boarding_core::{FlowConfig, SeatSelector, checks};

pub struct BookingFlow<'a> {
    page: &'a Page,
    config: &'a FlowConfig,
    report: Report,
}

impl<'a> BookingFlow<'a> {
    pub fn new(page: &'a Page, config: &'a FlowConfig, report: Report) -> Self {
        Self {
            page,
            config,
            report,
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.open_site().await.context("Stage 1 failed")?;
        self.search().await.context("Stage 2 failed")?;
        self.select_flights().await.context("Stage 3 failed")?;
        self.log_in_later().await.context("Stage 4 failed")?;
        self.passengers().await.context("Stage 5 failed")?;
        self.outbound_seats().await.context("Stage 6 failed")?;
        self.inbound_seats().await.context("Stage 7 failed")?;
        Ok(())
    }

    async fn open_site(&self) -> Result<()> {
        let (page, report) = (self.page, self.report);
        report.step(&format!("Navigate to {}", self.config.base_url));
        let status = page.goto(&self.config.base_url).await?;

        report.step("Decline cookies if necessary");
        let decline = Locator::role_exact(Role::Button, "No, thanks");
        if page.is_visible(&decline).await? {
            page.click(&decline).await?;
        }

        report.assertions();
        report.passed(&checks::status_is(status, 200)?);
        let title = page.title().await?;
        report.passed(&checks::title_contains(&title, &self.config.expected_title)?);
        Ok(())
    }

    async fn search(&self) -> Result<()> {
        let (page, report, config) = (self.page, self.report, self.config);
        let route = &config.route;
        report.stage(2, "Search for a flight");

        report.step("Choose departure and destination locations");
        page.click(&Locator::role(Role::Textbox, "From")).await?;
        for place in [
            &route.origin_country,
            &route.origin_city,
            &route.destination_country,
            &route.destination_city,
        ] {
            page.click(&Locator::role(Role::Button, place)).await?;
        }

        report.step("Choose flight dates");
        let dates = config.dates;
        page.click(&Locator::css("div.m-toggle__month").nth(dates.month_offset))
            .await?;
        let day = |index| Locator::css("div.calendar-body__cell").nth(index);
        page.click(&day(dates.depart_day)).await?;
        page.click(&day(dates.return_day)).await?;

        let adults = config.adults();
        report.step(&format!("Increase number of passengers to {} adults", adults));
        page.click(&Locator::role(Role::Button, "Passengers 1 Adult"))
            .await?;
        for added in 0..adults.saturating_sub(1) {
            // The adult decrement is disabled at one adult, so the first enabled
            // control is the increment; afterwards the increment is second.
            let increment = if added == 0 { 0 } else { 1 };
            page.click(&Locator::css(".counter__button-wrapper--enabled").nth(increment))
                .await?;
        }
        page.click(&Locator::role_exact(Role::Button, "Done")).await?;

        report.assertions();
        let from = page.input_value(&Locator::role(Role::Textbox, "From")).await?;
        report.passed(&checks::contains("From textbox", &from, &route.origin_city)?);
        let to = page.input_value(&Locator::role(Role::Textbox, "To")).await?;
        report.passed(&checks::contains("To textbox", &to, &route.destination_city)?);

        let depart = Locator::role_matching(Role::Button, TextMatch::pattern("^Depart")?);
        let depart_text = page.inner_text(&depart).await?;
        report.passed(&checks::has_date("Depart button", &depart_text)?);
        let ret = Locator::role_matching(Role::Button, TextMatch::pattern("^Return")?);
        let return_text = page.inner_text(&ret).await?;
        report.passed(&checks::has_date("Return button", &return_text)?);

        let passengers = Locator::role(Role::Button, &format!("Passengers {} Adult", adults));
        let passengers_text = page.inner_text(&passengers).await?;
        report.passed(&checks::adult_count(&passengers_text, adults)?);

        report.step("Click 'Search' button, navigate to new page");
        page.click_and_wait_for_navigation(&Locator::role_exact(Role::Button, "Search"))
            .await?;
        Ok(())
    }

    async fn select_flights(&self) -> Result<()> {
        let (page, report) = (self.page, self.report);
        report.stage(3, "Select suggested flights");
        report.step("Select first option available for both flights");

        page.wait_for_visible(&Locator::css(".flight-card__bumper"))
            .await?;
        page.click(&Locator::css(".flight-card__bumper")).await?;
        page.click(&Locator::css("div").with_text(TextMatch::pattern("^Ryanair$")?))
            .await?;
        page.click(&Locator::css(
            ".fare-table__fare-column-border.fare-table__fare-column-border--regu",
        ))
        .await?;
        Ok(())
    }

    async fn log_in_later(&self) -> Result<()> {
        let (page, report) = (self.page, self.report);
        report.stage(4, "Choose 'Log in later'");
        report.step("Select option to log in later");

        let later = Locator::role_exact(Role::Button, "Log in later");
        page.wait_for_visible(&later).await?;
        page.click(&later).await?;
        Ok(())
    }

    async fn passengers(&self) -> Result<()> {
        let (page, report) = (self.page, self.report);
        report.stage(5, "Enter passenger details and click [Continue]");

        for (i, passenger) in self.config.passengers.iter().enumerate() {
            report.step(&format!(
                "Add details for passenger {}, {}",
                i + 1,
                passenger.full_name()
            ));
            let card = Locator::css("pax-passenger").nth(i);
            page.click(&Locator::any_role(Role::Button).within(card))
                .await?;
            page.click(&Locator::role_exact(Role::Button, &passenger.title))
                .await?;
            page.fill(&first_name_field(i), &passenger.first_name)
                .await?;
            page.fill(&last_name_field(i), &passenger.last_name)
                .await?;
        }

        report.assertions();
        for (i, passenger) in self.config.passengers.iter().enumerate() {
            let label = format!("Passenger {}", i + 1);
            let first = page.input_value(&first_name_field(i)).await?;
            let last = page.input_value(&last_name_field(i)).await?;
            report.passed(&checks::contains(
                &format!("{} name input", label),
                &first,
                &passenger.first_name,
            )?);
            report.passed(&checks::contains(
                &format!("{} surname input", label),
                &last,
                &passenger.last_name,
            )?);
        }

        report.step("Click 'Continue' button, navigate to new page");
        page.click_and_wait_for_navigation(&Locator::role_exact(Role::Button, "Continue"))
            .await?;
        Ok(())
    }

    async fn outbound_seats(&self) -> Result<()> {
        let (page, report) = (self.page, self.report);
        report.stage(6, "Choose any available seats and click [Next]");
        report.step("Select seats for the outbound flight");
        self.select_seats(&self.config.seats.outbound).await?;

        report.step("Click 'Next flight' button and allow next flight to load");
        page.click(&Locator::role_exact(Role::Button, "Next flight"))
            .await?;
        let active_leg = Locator::css(".passenger-carousel__orig-dest--active")
            .with_text(TextMatch::Contains(self.config.route.return_leg.clone()));
        page.wait_for_visible(&active_leg).await?;
        Ok(())
    }

    async fn inbound_seats(&self) -> Result<()> {
        let (page, report) = (self.page, self.report);
        report.stage(7, "Choose any available seats and click [Continue]");
        report.step("Select seats for the return flight");
        self.select_seats(&self.config.seats.inbound).await?;

        report.step("Click 'Continue' button");
        page.click(&Locator::role_exact(Role::Button, "Continue"))
            .await?;

        report.step("Click 'No, thanks' for Fast Track, navigate to new page");
        page.click_and_wait_for_navigation(&Locator::role_exact(Role::Button, "No, thanks"))
            .await?;

        report.step("Wait for page to load fully");
        page.wait_for_visible(&Locator::css("span").with_text(TextMatch::Contains(
            "Cabin Bags".to_string(),
        )))
        .await?;
        Ok(())
    }

    /// Select `indices` one after another; each selection is confirmed on
    /// the page before the next click.
    async fn select_seats(&self, indices: &[usize]) -> Result<()> {
        let map = LiveSeatMap::new(self.page, self.config.markers.clone());
        let mut selector = SeatSelector::new(map, self.config.wait);

        for &index in indices {
            let selection = selector
                .select(index)
                .await
                .with_context(|| format!("Selecting seat control {}", index))?;
            tracing::info!(
                "Seat control {} selected ({} -> {} seats)",
                selection.index,
                selection.baseline,
                selection.confirmed
            );
            self.report
                .step(&format!("Seat {} selected", selection.index));
        }
        Ok(())
    }
}

fn first_name_field(passenger: usize) -> Locator {
    Locator::css(&format!(r#"input[name="form.passengers.ADT-{}.name"]"#, passenger))
}

fn last_name_field(passenger: usize) -> Locator {
    Locator::css(&format!(r#"[id="form.passengers.ADT-{}.surname"]"#, passenger))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passenger_fields_are_indexed() {
        assert_eq!(
            first_name_field(1).to_string(),
            r#"input[name="form.passengers.ADT-1.name"]"#
        );
        assert_eq!(
            last_name_field(0).to_string(),
            r#"[id="form.passengers.ADT-0.surname"]"#
        );
    }
}
