use crate::{Result, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use tokio::time::Instant;

/// Opaque card identifier as reported by a reader.
///
/// The identifier is trimmed on construction and must be non-empty with no
/// control characters.
/// No other structure is assumed; the backend owns the meaning of the value.
///
/// # Security
/// Comparison is constant-time so that debounce checks do not leak how much
/// of a card id matched.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Create a new card id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardFormat` if the trimmed id is empty or
    /// contains control characters.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();

        if id.is_empty() {
            return Err(Error::InvalidCardFormat("Card id is empty".to_string()));
        }

        if id.chars().any(char::is_control) {
            return Err(Error::InvalidCardFormat(
                "Card id contains control characters".to_string(),
            ));
        }

        Ok(CardId(id.to_string()))
    }

    /// Get the card id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardId::new(s)
    }
}

impl TryFrom<String> for CardId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        CardId::new(&value)
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

impl PartialEq for CardId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for CardId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// A non-empty read from the card reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// Card that was read.
    pub card_id: CardId,

    /// Monotonic time of the read, used for debouncing.
    pub observed_at: Instant,

    /// Wall-clock time of the read, used for logging.
    pub received_at: DateTime<Utc>,
}

impl ScanEvent {
    /// Record a scan of `card_id` happening now.
    pub fn now(card_id: CardId) -> Self {
        Self {
            card_id,
            observed_at: Instant::now(),
            received_at: Utc::now(),
        }
    }
}

/// Snapshot of a directory entry returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name.
    pub name: String,

    /// Whether the backend currently has this user signed in.
    pub logged_in: bool,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, logged_in: bool) -> Self {
        Self {
            name: name.into(),
            logged_in,
        }
    }

    /// The toggle this user needs: sign-out when signed in, sign-in otherwise.
    #[must_use]
    pub fn next_action(&self) -> AttendanceAction {
        if self.logged_in {
            AttendanceAction::SignOut
        } else {
            AttendanceAction::SignIn
        }
    }
}

/// Attendance toggle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceAction {
    SignIn,
    SignOut,
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttendanceAction::SignIn => write!(f, "sign-in"),
            AttendanceAction::SignOut => write!(f, "sign-out"),
        }
    }
}

/// Result of processing one accepted scan.
///
/// Every processing attempt ends in exactly one of these; none of them is
/// fatal to the control loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AttendanceOutcome {
    SignedIn(String),
    SignedOut(String),
    UserNotFound,
    ServerError(String),
    Timeout,
    ConnectionFailure,
    SystemError(String),
}

impl AttendanceOutcome {
    /// Successful outcome for `action` performed on behalf of `name`.
    pub fn completed(action: AttendanceAction, name: impl Into<String>) -> Self {
        match action {
            AttendanceAction::SignIn => Self::SignedIn(name.into()),
            AttendanceAction::SignOut => Self::SignedOut(name.into()),
        }
    }

    /// Returns `true` for `SignedIn` and `SignedOut`.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SignedIn(_) | Self::SignedOut(_))
    }
}

impl fmt::Display for AttendanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SignedIn(name) => write!(f, "{name} signed in"),
            Self::SignedOut(name) => write!(f, "{name} signed out"),
            Self::UserNotFound => write!(f, "user not found"),
            Self::ServerError(message) => write!(f, "server error: {message}"),
            Self::Timeout => write!(f, "backend timeout"),
            Self::ConnectionFailure => write!(f, "backend unreachable"),
            Self::SystemError(message) => write!(f, "system error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1234567890", "1234567890")]
    #[case("  584190  ", "584190")]
    #[case("04ABCDEF\n", "04ABCDEF")]
    #[case("caf\u{e9}", "caf\u{e9}")]
    #[case("04:A2 7F:1C", "04:A2 7F:1C")]
    fn test_card_id_valid(#[case] input: &str, #[case] expected: &str) {
        let id = CardId::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("12\u{7}34")]
    #[case("12\u{85}34")]
    fn test_card_id_invalid(#[case] input: &str) {
        assert!(matches!(
            CardId::new(input),
            Err(Error::InvalidCardFormat(_))
        ));
    }

    #[test]
    fn test_card_id_length_is_not_limited() {
        let long = "9".repeat(256);
        assert_eq!(CardId::new(&long).unwrap().as_str(), long);
    }

    #[test]
    fn test_card_id_equality() {
        let a: CardId = "1234567890".parse().unwrap();
        let b = CardId::new(" 1234567890 ").unwrap();
        let c = CardId::new("1234567891").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_card_id_deserialize_validates() {
        let ok: std::result::Result<CardId, _> = serde_json::from_str("\"42\"");
        assert!(ok.is_ok());
        let empty: std::result::Result<CardId, _> = serde_json::from_str("\"  \"");
        assert!(empty.is_err());
    }

    #[rstest]
    #[case(false, AttendanceAction::SignIn)]
    #[case(true, AttendanceAction::SignOut)]
    fn test_next_action_follows_login_state(
        #[case] logged_in: bool,
        #[case] expected: AttendanceAction,
    ) {
        assert_eq!(UserRecord::new("Alice", logged_in).next_action(), expected);
    }

    #[test]
    fn test_completed_outcome_matches_action() {
        assert_eq!(
            AttendanceOutcome::completed(AttendanceAction::SignIn, "Alice"),
            AttendanceOutcome::SignedIn("Alice".to_string())
        );
        assert_eq!(
            AttendanceOutcome::completed(AttendanceAction::SignOut, "Bob"),
            AttendanceOutcome::SignedOut("Bob".to_string())
        );
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(AttendanceOutcome::SignedIn("a".into()).is_success());
        assert!(AttendanceOutcome::SignedOut("a".into()).is_success());
        assert!(!AttendanceOutcome::UserNotFound.is_success());
        assert!(!AttendanceOutcome::Timeout.is_success());
        assert!(!AttendanceOutcome::ServerError("x".into()).is_success());
    }

    #[test]
    fn test_scan_event_now() {
        let id = CardId::new("1").unwrap();
        let scan = ScanEvent::now(id.clone());
        assert_eq!(scan.card_id, id);
        assert!(scan.observed_at <= Instant::now());
    }
}
