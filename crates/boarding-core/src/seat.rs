//! Seat selection synchronized with the rendered seat map.
//!
//! Clicking a seat control does not update the page immediately: the seat
//! label for the new selection renders some time later. A click issued before
//! that render lands can be dropped by the page. [`SeatSelector`] therefore
//! captures the selected-seat count, clicks, and suspends until the count has
//! grown past the captured baseline before handing control back.

use crate::wait::{WaitConfig, wait_for_result};
use crate::{Error, Result};
use async_trait::async_trait;
use std::fmt;

/// Page capabilities the seat selector needs.
#[async_trait]
pub trait SeatMap: Send + Sync {
    /// Number of seat labels currently rendered, one per selected seat.
    async fn selected_count(&self) -> Result<usize>;

    /// Click the seat control at `index`.
    ///
    /// Returns [`Error::ElementNotFound`] without touching the page when no
    /// control exists at that position.
    async fn activate(&self, index: usize) -> Result<()>;

    /// Suspend until more than `baseline` seat labels are rendered.
    async fn wait_for_selected_above(&self, baseline: usize, wait: WaitConfig) -> Result<()> {
        wait_for_result(
            || async move { self.selected_count().await.map(|n| n > baseline) },
            wait,
            &format!("more than {} selected seats", baseline),
        )
        .await
    }
}

/// Progress of a single selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Clicked,
    WaitingForUpdate,
    Confirmed,
    Failed,
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionState::Idle => "idle",
            SelectionState::Clicked => "clicked",
            SelectionState::WaitingForUpdate => "waiting for update",
            SelectionState::Confirmed => "confirmed",
            SelectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Receipt for a confirmed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub baseline: usize,
    pub confirmed: usize,
}

/// Selects seats one at a time on a [`SeatMap`].
///
/// `select` borrows the selector mutably, so two selections through the same
/// selector cannot overlap. Callers that share one across tasks must hold a
/// lock for the whole call.
pub struct SeatSelector<M> {
    map: M,
    wait: WaitConfig,
    state: SelectionState,
}

impl<M: SeatMap> SeatSelector<M> {
    pub fn new(map: M, wait: WaitConfig) -> Self {
        Self {
            map,
            wait,
            state: SelectionState::Idle,
        }
    }

    /// State reached by the most recent selection
    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn into_inner(self) -> M {
        self.map
    }

    /// Select the seat control at `index` and wait until the page shows it.
    pub async fn select(&mut self, index: usize) -> Result<Selection> {
        self.state = SelectionState::Idle;

        let outcome = self.run(index).await;
        self.state = match outcome {
            Ok(_) => SelectionState::Confirmed,
            Err(_) => SelectionState::Failed,
        };
        outcome
    }

    async fn run(&mut self, index: usize) -> Result<Selection> {
        let baseline = self.map.selected_count().await?;
        tracing::debug!("Seat {}: baseline of {} selected seats", index, baseline);

        self.map.activate(index).await?;
        self.transition(index, SelectionState::Clicked);

        self.transition(index, SelectionState::WaitingForUpdate);
        match self.map.wait_for_selected_above(baseline, self.wait).await {
            Ok(()) => {}
            Err(Error::WaitTimeout { timeout, .. }) => {
                return Err(Error::SelectionTimeout {
                    index,
                    baseline,
                    timeout,
                });
            }
            Err(e) => return Err(e),
        }

        let confirmed = self.map.selected_count().await?;
        tracing::debug!("Seat {}: confirmed, {} seats selected", index, confirmed);

        Ok(Selection {
            index,
            baseline,
            confirmed,
        })
    }

    fn transition(&mut self, index: usize, next: SelectionState) {
        tracing::trace!("Seat {}: {} -> {}", index, self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// In-memory seat map whose labels render after a delay.
    ///
    /// While an update is pending the page ignores further clicks, which is
    /// how clicks get lost when nobody waits for the render.
    #[derive(Clone)]
    struct DelayedSeatMap {
        inner: Arc<Mutex<SeatState>>,
        latency: Duration,
        frozen: bool,
    }

    struct SeatState {
        selected: Vec<bool>,
        pending: bool,
        clicks: usize,
    }

    impl DelayedSeatMap {
        fn new(controls: usize, latency: Duration) -> Self {
            Self {
                inner: Arc::new(Mutex::new(SeatState {
                    selected: vec![false; controls],
                    pending: false,
                    clicks: 0,
                })),
                latency,
                frozen: false,
            }
        }

        /// A page that accepts clicks but never renders them.
        fn frozen(controls: usize) -> Self {
            Self {
                frozen: true,
                ..Self::new(controls, Duration::ZERO)
            }
        }

        fn selected_indices(&self) -> Vec<usize> {
            let state = self.inner.lock().unwrap();
            state
                .selected
                .iter()
                .enumerate()
                .filter(|(_, s)| **s)
                .map(|(i, _)| i)
                .collect()
        }

        fn clicks(&self) -> usize {
            self.inner.lock().unwrap().clicks
        }

        fn count(&self) -> usize {
            self.selected_indices().len()
        }

        /// Click without waiting for the render.
        fn click_now(&self, index: usize) {
            let mut state = self.inner.lock().unwrap();
            state.clicks += 1;
            if self.frozen || state.pending || state.selected[index] {
                return;
            }
            state.pending = true;
            drop(state);

            let inner = self.inner.clone();
            let latency = self.latency;
            tokio::spawn(async move {
                tokio::time::sleep(latency).await;
                let mut state = inner.lock().unwrap();
                state.selected[index] = true;
                state.pending = false;
            });
        }
    }

    #[async_trait]
    impl SeatMap for DelayedSeatMap {
        async fn selected_count(&self) -> Result<usize> {
            Ok(self.count())
        }

        async fn activate(&self, index: usize) -> Result<()> {
            let controls = self.inner.lock().unwrap().selected.len();
            if index >= controls {
                return Err(Error::ElementNotFound {
                    index,
                    marker: "button.seat".to_string(),
                });
            }
            self.click_now(index);
            Ok(())
        }
    }

    fn fast_wait() -> WaitConfig {
        WaitConfig::new(Duration::from_secs(2), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_select_increases_count_by_one() {
        let map = DelayedSeatMap::new(4, Duration::from_millis(20));
        let mut selector = SeatSelector::new(map.clone(), fast_wait());

        let selection = selector.select(2).await.unwrap();

        assert_eq!(selection.baseline, 0);
        assert_eq!(selection.confirmed, 1);
        assert_eq!(map.selected_indices(), vec![2]);
        assert_eq!(selector.state(), SelectionState::Confirmed);
    }

    #[tokio::test]
    async fn test_sequential_selections_are_not_lost() {
        let map = DelayedSeatMap::new(4, Duration::from_millis(30));
        let mut selector = SeatSelector::new(map.clone(), fast_wait());

        let first = selector.select(0).await.unwrap();
        let second = selector.select(1).await.unwrap();

        assert_eq!(second.baseline, first.confirmed);
        assert_eq!(map.count(), 2);
        assert_eq!(map.clicks(), 2);
    }

    #[tokio::test]
    async fn test_unsynchronized_clicks_lose_updates() {
        let map = DelayedSeatMap::new(4, Duration::from_millis(30));

        map.click_now(0);
        map.click_now(1);
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(map.count(), 1);
    }

    #[tokio::test]
    async fn test_select_times_out_when_page_never_updates() {
        let map = DelayedSeatMap::frozen(4);
        let mut selector = SeatSelector::new(
            map.clone(),
            WaitConfig::new(Duration::from_millis(50), Duration::from_millis(5)),
        );

        let err = selector.select(1).await.unwrap_err();

        match err {
            Error::SelectionTimeout {
                index,
                baseline,
                timeout,
            } => {
                assert_eq!(index, 1);
                assert_eq!(baseline, 0);
                assert_eq!(timeout, Duration::from_millis(50));
            }
            other => panic!("expected SelectionTimeout, got {:?}", other),
        }
        assert_eq!(map.count(), 0);
        assert_eq!(selector.state(), SelectionState::Failed);
    }

    #[tokio::test]
    async fn test_select_out_of_range_is_not_found() {
        let map = DelayedSeatMap::new(4, Duration::from_millis(5));
        let mut selector = SeatSelector::new(map.clone(), fast_wait());

        let err = selector.select(4).await.unwrap_err();

        assert!(matches!(err, Error::ElementNotFound { index: 4, .. }));
        assert!(err.to_string().contains("button.seat"));
        assert_eq!(map.clicks(), 0);
        assert_eq!(map.count(), 0);
        assert_eq!(selector.state(), SelectionState::Failed);
    }

    #[tokio::test]
    async fn test_two_seats_on_fresh_map() {
        let map = DelayedSeatMap::new(4, Duration::from_millis(10));
        let mut selector = SeatSelector::new(map, fast_wait());

        selector.select(0).await.unwrap();
        selector.select(1).await.unwrap();

        let map = selector.into_inner();
        assert_eq!(map.count(), 2);
        assert_eq!(map.selected_indices(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_selector_recovers_state_after_failure() {
        let map = DelayedSeatMap::new(2, Duration::from_millis(5));
        let mut selector = SeatSelector::new(map, fast_wait());

        assert!(selector.select(9).await.is_err());
        assert_eq!(selector.state(), SelectionState::Failed);

        selector.select(0).await.unwrap();
        assert_eq!(selector.state(), SelectionState::Confirmed);
        assert_eq!(selector.into_inner().count(), 1);
    }

    #[test]
    fn test_selection_timeout_message_names_seat() {
        let err = Error::SelectionTimeout {
            index: 3,
            baseline: 2,
            timeout: Duration::from_secs(30),
        };
        let message = err.to_string();
        assert!(message.contains("Seat 3"));
        assert!(message.contains("more than 2"));
    }
}
