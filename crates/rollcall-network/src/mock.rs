//! In-memory attendance backend for testing.
//!
//! [`MockBackend`] keeps a small user directory and applies toggles to it the
//! way the real backend does: signing in a user who is already signed in is
//! rejected, and so on. Individual calls can be scripted to fail, delayed to
//! simulate latency, and every call is recorded.
//!
//! The mock is cheaply cloneable; clones share state, so a test keeps one
//! clone for inspection and hands the other to the code under test.
//!
//! # Examples
//!
//! ```
//! use rollcall_core::CardId;
//! use rollcall_network::AttendanceBackend;
//! use rollcall_network::mock::{BackendCall, MockBackend};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = MockBackend::new();
//! backend.add_user("1234567890", "Alice", false);
//!
//! let card = CardId::new("1234567890").unwrap();
//! let user = backend.lookup_user(&card).await.unwrap();
//! backend.sign_in(&card).await.unwrap();
//!
//! assert_eq!(user.name, "Alice");
//! assert!(backend.user("1234567890").unwrap().logged_in);
//! assert_eq!(backend.calls().len(), 2);
//! assert!(matches!(backend.calls()[1], BackendCall::SignIn(_)));
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rollcall_core::{CardId, UserRecord};
use tracing::debug;

use crate::backend::AttendanceBackend;
use crate::error::{BackendError, Result};

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Health,
    Lookup(CardId),
    SignIn(CardId),
    SignOut(CardId),
}

/// Which operation a scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Health,
    Lookup,
    SignIn,
    SignOut,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, UserRecord>,
    healthy: bool,
    failures: HashMap<Operation, VecDeque<BackendError>>,
    calls: Vec<BackendCall>,
    latency: Duration,
}

impl State {
    fn take_failure(&mut self, op: Operation) -> Option<BackendError> {
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// Scriptable in-memory backend.
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Healthy backend with an empty directory and no latency.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                healthy: true,
                ..State::default()
            })),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register (or replace) the user owning `card`.
    pub fn add_user(&self, card: &str, name: &str, logged_in: bool) {
        self.state()
            .users
            .insert(card.trim().to_string(), UserRecord::new(name, logged_in));
    }

    /// Current directory entry for `card`.
    pub fn user(&self, card: &str) -> Option<UserRecord> {
        self.state().users.get(card.trim()).cloned()
    }

    /// Make health checks pass or fail.
    pub fn set_healthy(&self, healthy: bool) {
        self.state().healthy = healthy;
    }

    /// Delay every lookup and toggle by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    /// Fail the next call to `op` with `error`. Queued failures are consumed
    /// in order.
    pub fn fail_next(&self, op: Operation, error: BackendError) {
        self.state().failures.entry(op).or_default().push_back(error);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    /// Calls other than health checks.
    pub fn scan_calls(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != BackendCall::Health)
            .collect()
    }

    pub fn health_checks(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == BackendCall::Health)
            .count()
    }

    /// Highest number of lookups and toggles that were running at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: BackendCall) -> InFlight<'_> {
        let latency = {
            let mut state = self.state();
            state.calls.push(call);
            state.latency
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        guard
    }

    async fn toggle_to(&self, card: &CardId, op: Operation, signed_in: bool) -> Result<()> {
        let call = if signed_in {
            BackendCall::SignIn(card.clone())
        } else {
            BackendCall::SignOut(card.clone())
        };
        let _guard = self.enter(call).await;

        let mut state = self.state();
        if let Some(error) = state.take_failure(op) {
            return Err(error);
        }

        let Some(user) = state.users.get_mut(card.as_str()) else {
            return Err(BackendError::Status(404));
        };

        // Same answer as the real backend: 400 for a redundant toggle.
        if user.logged_in == signed_in {
            debug!("Mock backend refused {op:?} for card {card}");
            return Err(BackendError::Status(400));
        }

        user.logged_in = signed_in;
        Ok(())
    }
}

/// Decrements the in-flight counter when dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AttendanceBackend for MockBackend {
    async fn health(&self) -> Result<()> {
        let mut state = self.state();
        state.calls.push(BackendCall::Health);

        if let Some(error) = state.take_failure(Operation::Health) {
            return Err(error);
        }
        if state.healthy {
            Ok(())
        } else {
            Err(BackendError::connection("Connection refused"))
        }
    }

    async fn lookup_user(&self, card: &CardId) -> Result<UserRecord> {
        let _guard = self.enter(BackendCall::Lookup(card.clone())).await;

        let mut state = self.state();
        if let Some(error) = state.take_failure(Operation::Lookup) {
            return Err(error);
        }
        state
            .users
            .get(card.as_str())
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn sign_in(&self, card: &CardId) -> Result<()> {
        self.toggle_to(card, Operation::SignIn, true).await
    }

    async fn sign_out(&self, card: &CardId) -> Result<()> {
        self.toggle_to(card, Operation::SignOut, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str) -> CardId {
        CardId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_card_is_not_found() {
        let backend = MockBackend::new();
        let result = backend.lookup_user(&card("999")).await;
        assert_eq!(result, Err(BackendError::NotFound));
    }

    #[tokio::test]
    async fn test_toggle_updates_directory() {
        let backend = MockBackend::new();
        backend.add_user("42", "Bob", true);

        backend.sign_out(&card("42")).await.unwrap();
        assert!(!backend.user("42").unwrap().logged_in);

        backend.sign_in(&card("42")).await.unwrap();
        assert!(backend.user("42").unwrap().logged_in);
    }

    #[tokio::test]
    async fn test_double_sign_in_is_refused() {
        let backend = MockBackend::new();
        backend.add_user("42", "Bob", true);

        let result = backend.sign_in(&card("42")).await;
        assert_eq!(result, Err(BackendError::Status(400)));
    }

    #[tokio::test]
    async fn test_scripted_failures_are_consumed_in_order() {
        let backend = MockBackend::new();
        backend.add_user("42", "Bob", false);
        backend.fail_next(Operation::Lookup, BackendError::Timeout);
        backend.fail_next(Operation::Lookup, BackendError::connection("refused"));

        assert_eq!(backend.lookup_user(&card("42")).await, Err(BackendError::Timeout));
        assert!(matches!(
            backend.lookup_user(&card("42")).await,
            Err(BackendError::Connection(_))
        ));
        assert!(backend.lookup_user(&card("42")).await.is_ok());
    }

    #[tokio::test]
    async fn test_health_follows_flag() {
        let backend = MockBackend::new();
        assert!(backend.health().await.is_ok());

        backend.set_healthy(false);
        assert!(backend.health().await.is_err());
        assert_eq!(backend.health_checks(), 2);
        assert!(backend.scan_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_and_concurrency_tracking() {
        let backend = MockBackend::new();
        backend.add_user("1", "A", false);
        backend.add_user("2", "B", false);
        backend.set_latency(Duration::from_millis(500));

        let card1 = card("1");
        let card2 = card("2");
        let (a, b) = tokio::join!(
            backend.lookup_user(&card1),
            backend.lookup_user(&card2)
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(backend.max_concurrency(), 2);
    }
}
