//! Scan processing: one card in, one [`AttendanceOutcome`] out.
//!
//! Looks the card up, then toggles attendance in the direction the lookup
//! implies. Every backend failure is mapped to an outcome here, so nothing
//! escapes to the control loop.
//!
//! | Failure | Outcome |
//! |---|---|
//! | lookup non-2xx or `success != true` | `UserNotFound` |
//! | toggle 2xx with `success != true` | `ServerError(message or "Error")` |
//! | toggle non-2xx | `ServerError("Server Error")` |
//! | timeout | `Timeout` |
//! | connection refused / unreachable | `ConnectionFailure` |
//! | anything else | `SystemError` |

use rollcall_core::{AttendanceAction, AttendanceOutcome, CardId};
use rollcall_network::{AttendanceBackend, BackendError};
use tracing::{debug, error, warn};

/// Shown when the backend rejects a toggle without saying why.
const DEFAULT_REJECTION_MESSAGE: &str = "Error";
/// Shown when a toggle answers with a non-2xx status.
const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Look up `card` and toggle its attendance.
///
/// The toggle direction comes from the lookup. If attendance changes on the
/// backend between the two calls, the backend rejects the toggle and the
/// rejection is shown as a server error.
pub async fn process_card<B: AttendanceBackend>(backend: &B, card: &CardId) -> AttendanceOutcome {
    let user = match backend.lookup_user(card).await {
        Ok(user) => user,
        Err(e) => return lookup_failure(card, e),
    };

    let action = user.next_action();
    debug!("Card {card} belongs to {}; requesting {action}", user.name);

    match backend.toggle(card, action).await {
        Ok(()) => AttendanceOutcome::completed(action, user.name),
        Err(e) => toggle_failure(card, action, e),
    }
}

fn lookup_failure(card: &CardId, err: BackendError) -> AttendanceOutcome {
    match err {
        BackendError::NotFound | BackendError::Status(_) | BackendError::Rejected { .. } => {
            debug!("No user for card {card}: {err}");
            AttendanceOutcome::UserNotFound
        }
        other => transport_failure(other),
    }
}

fn toggle_failure(card: &CardId, action: AttendanceAction, err: BackendError) -> AttendanceOutcome {
    match err {
        BackendError::Rejected { message } => {
            warn!(
                "Backend rejected {action} for card {card}; state may have changed since lookup"
            );
            AttendanceOutcome::ServerError(
                message.unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string()),
            )
        }
        BackendError::Status(status) => {
            warn!("Backend answered HTTP {status} to {action} for card {card}");
            AttendanceOutcome::ServerError(SERVER_ERROR_MESSAGE.to_string())
        }
        BackendError::NotFound => {
            warn!("User for card {card} vanished before {action}");
            AttendanceOutcome::ServerError(SERVER_ERROR_MESSAGE.to_string())
        }
        other => transport_failure(other),
    }
}

fn transport_failure(err: BackendError) -> AttendanceOutcome {
    match err {
        BackendError::Timeout => AttendanceOutcome::Timeout,
        BackendError::Connection(_) => AttendanceOutcome::ConnectionFailure,
        other => {
            error!("Scan processing failed: {other}");
            AttendanceOutcome::SystemError(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_network::mock::{BackendCall, MockBackend, Operation};
    use rstest::rstest;

    const CARD: &str = "1234567890";

    fn card() -> CardId {
        CardId::new(CARD).unwrap()
    }

    #[tokio::test]
    async fn test_signed_out_user_is_signed_in() {
        let backend = MockBackend::new();
        backend.add_user(CARD, "Alice", false);

        let outcome = process_card(&backend, &card()).await;

        assert_eq!(outcome, AttendanceOutcome::SignedIn("Alice".into()));
        assert_eq!(
            backend.calls(),
            vec![BackendCall::Lookup(card()), BackendCall::SignIn(card())]
        );
    }

    #[tokio::test]
    async fn test_signed_in_user_is_signed_out() {
        let backend = MockBackend::new();
        backend.add_user(CARD, "Bob", true);

        let outcome = process_card(&backend, &card()).await;

        assert_eq!(outcome, AttendanceOutcome::SignedOut("Bob".into()));
        assert_eq!(
            backend.calls(),
            vec![BackendCall::Lookup(card()), BackendCall::SignOut(card())]
        );
    }

    #[tokio::test]
    async fn test_unknown_card_skips_toggle() {
        let backend = MockBackend::new();

        let outcome = process_card(&backend, &card()).await;

        assert_eq!(outcome, AttendanceOutcome::UserNotFound);
        assert_eq!(backend.calls(), vec![BackendCall::Lookup(card())]);
    }

    #[rstest]
    #[case(BackendError::NotFound, AttendanceOutcome::UserNotFound)]
    #[case(BackendError::Status(500), AttendanceOutcome::UserNotFound)]
    #[case(BackendError::Timeout, AttendanceOutcome::Timeout)]
    #[case(BackendError::connection("refused"), AttendanceOutcome::ConnectionFailure)]
    #[case(
        BackendError::decode("expected value at line 1"),
        AttendanceOutcome::SystemError("Invalid response: expected value at line 1".into())
    )]
    #[tokio::test]
    async fn test_lookup_failures(
        #[case] error: BackendError,
        #[case] expected: AttendanceOutcome,
    ) {
        let backend = MockBackend::new();
        backend.add_user(CARD, "Alice", false);
        backend.fail_next(Operation::Lookup, error);

        assert_eq!(process_card(&backend, &card()).await, expected);
        assert_eq!(backend.scan_calls().len(), 1);
    }

    #[rstest]
    #[case(
        BackendError::rejected(Some("Office closed")),
        AttendanceOutcome::ServerError("Office closed".into())
    )]
    #[case(
        BackendError::Rejected { message: None },
        AttendanceOutcome::ServerError("Error".into())
    )]
    #[case(BackendError::Status(400), AttendanceOutcome::ServerError("Server Error".into()))]
    #[case(BackendError::Status(503), AttendanceOutcome::ServerError("Server Error".into()))]
    #[case(BackendError::Timeout, AttendanceOutcome::Timeout)]
    #[case(BackendError::connection("reset"), AttendanceOutcome::ConnectionFailure)]
    #[case(
        BackendError::other("builder error"),
        AttendanceOutcome::SystemError("Request failed: builder error".into())
    )]
    #[tokio::test]
    async fn test_toggle_failures(
        #[case] error: BackendError,
        #[case] expected: AttendanceOutcome,
    ) {
        let backend = MockBackend::new();
        backend.add_user(CARD, "Alice", false);
        backend.fail_next(Operation::SignIn, error);

        assert_eq!(process_card(&backend, &card()).await, expected);
        // A failed toggle leaves the directory untouched.
        assert!(!backend.user(CARD).unwrap().logged_in);
    }

    #[tokio::test]
    async fn test_toggle_race_surfaces_as_server_error() {
        let backend = MockBackend::new();
        backend.add_user(CARD, "Alice", false);
        // Someone else signs Alice in between lookup and toggle.
        backend.fail_next(Operation::SignIn, BackendError::Status(400));

        let outcome = process_card(&backend, &card()).await;
        assert_eq!(outcome, AttendanceOutcome::ServerError("Server Error".into()));
    }
}
