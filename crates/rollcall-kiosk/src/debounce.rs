//! Duplicate-scan suppression.
//!
//! Readers report a card for as long as it sits on the antenna, and users
//! tap twice. A scan is accepted when it is a different card from the last
//! accepted one, or when more than the debounce window has passed since
//! that scan. Rejected scans do not move the window.

use std::time::Duration;

use rollcall_core::CardId;
use tokio::time::Instant;

/// Remembers the last accepted scan.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<(CardId, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Last accepted card and when it was seen.
    pub fn last_scan(&self) -> Option<(&CardId, Instant)> {
        self.last.as_ref().map(|(card, at)| (card, *at))
    }

    /// Whether a scan of `card` at `at` would be accepted. Does not record it.
    pub fn should_accept(&self, card: &CardId, at: Instant) -> bool {
        match &self.last {
            None => true,
            Some((last_card, last_at)) => {
                last_card != card || at.saturating_duration_since(*last_at) > self.window
            }
        }
    }

    /// Record `card` as accepted at `at`.
    pub fn record(&mut self, card: CardId, at: Instant) {
        self.last = Some((card, at));
    }

    /// Accept-and-record in one step. Returns `false` for a duplicate.
    pub fn accept(&mut self, card: &CardId, at: Instant) -> bool {
        if !self.should_accept(card, at) {
            return false;
        }
        self.record(card.clone(), at);
        true
    }
}
