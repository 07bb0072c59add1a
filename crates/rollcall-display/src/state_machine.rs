//! Display state machine for the attendance kiosk.
//!
//! Maps every phase of the kiosk's life onto a two-line screen and drives a
//! [`DisplayAdapter`] accordingly.
//!
//! # States
//!
//! - `Startup`: welcome banner while the kiosk comes up
//! - `ConnectingToBackend`: waiting for the backend health check to pass
//! - `Ready`: waiting for a card
//! - `Processing`: a card is being looked up and toggled
//! - `Success`: attendance recorded, held for the result dwell
//! - `Error`: the scan failed, held for the result dwell
//! - `ShuttingDown`: farewell banner before the adapters are closed
//!
//! # Valid Transitions
//!
//! - Startup → Ready | ConnectingToBackend
//! - ConnectingToBackend → ConnectingToBackend | Ready
//! - Ready → Ready | Processing | ConnectingToBackend
//! - Processing → Success | Error
//! - Success | Error → Ready
//! - any state → ShuttingDown
//!
//! Rendering is best-effort. A transition that was accepted stays accepted
//! even if the display refuses the write; the failure is logged.
//!
//! # Examples
//!
//! ```
//! use rollcall_core::AttendanceOutcome;
//! use rollcall_display::{DisplayAdapter, DisplayStateMachine, DwellTimes, StateKind};
//! use rollcall_hardware::mock::MockDisplay;
//! use rollcall_hardware::types::DisplayGeometry;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> rollcall_core::Result<()> {
//! let (sink, handle) = MockDisplay::new(DisplayGeometry::default());
//! let mut machine = DisplayStateMachine::new(DisplayAdapter::new(sink), DwellTimes::default());
//!
//! machine.startup().await?;
//! assert_eq!(handle.lines(), vec!["Scan RFID Card", "Please Wait..."]);
//!
//! machine.backend_connected().await?;
//! machine.show_outcome(&AttendanceOutcome::UserNotFound).await?;
//!
//! assert!(handle.was_shown(&["ERROR!", "User Not Found"]));
//! assert_eq!(machine.current_state().kind(), StateKind::Ready);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use rollcall_core::{AttendanceOutcome, CardId, Error, Result, Timings};
use rollcall_hardware::DisplaySink;

use crate::display::DisplayAdapter;

/// Maximum number of state transitions to keep in history.
const MAX_HISTORY_SIZE: usize = 100;

/// Every error screen starts with this line.
const ERROR_HEADLINE: &str = "ERROR!";

/// What the kiosk is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// Welcome banner.
    Startup,

    /// Waiting for the backend to answer its health check.
    ConnectingToBackend,

    /// Idle, waiting for a card.
    Ready,

    /// The given card is being processed.
    Processing(CardId),

    /// Attendance recorded. Holds both lines verbatim.
    Success(String, String),

    /// Scan failed. Holds the cause shown under the error headline.
    Error(String),

    /// Farewell banner.
    ShuttingDown,
}

impl DisplayState {
    /// The screen for a finished scan.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_core::AttendanceOutcome;
    /// use rollcall_display::DisplayState;
    ///
    /// assert_eq!(
    ///     DisplayState::from_outcome(&AttendanceOutcome::SignedIn("Alice".into())),
    ///     DisplayState::Success("Alice".into(), "Signed In".into())
    /// );
    /// assert_eq!(
    ///     DisplayState::from_outcome(&AttendanceOutcome::Timeout),
    ///     DisplayState::Error("Connection Timeout".into())
    /// );
    /// ```
    pub fn from_outcome(outcome: &AttendanceOutcome) -> Self {
        match outcome {
            AttendanceOutcome::SignedIn(name) => Self::Success(name.clone(), "Signed In".into()),
            AttendanceOutcome::SignedOut(name) => Self::Success(name.clone(), "Signed Out".into()),
            AttendanceOutcome::UserNotFound => Self::Error("User Not Found".into()),
            AttendanceOutcome::ServerError(message) => Self::Error(message.clone()),
            AttendanceOutcome::Timeout => Self::Error("Connection Timeout".into()),
            AttendanceOutcome::ConnectionFailure => Self::Error("No Connection".into()),
            AttendanceOutcome::SystemError(_) => Self::Error("System Error".into()),
        }
    }

    /// Discriminant without payload.
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Startup => StateKind::Startup,
            Self::ConnectingToBackend => StateKind::ConnectingToBackend,
            Self::Ready => StateKind::Ready,
            Self::Processing(_) => StateKind::Processing,
            Self::Success(..) => StateKind::Success,
            Self::Error(_) => StateKind::Error,
            Self::ShuttingDown => StateKind::ShuttingDown,
        }
    }

    /// The two lines this state renders as.
    ///
    /// `backend_online` only affects `Ready`, which asks the user to wait
    /// until the backend has been reached once.
    pub fn screen(&self, backend_online: bool) -> Screen {
        match self {
            Self::Startup => Screen::new("Attendance", "System Ready"),
            Self::ConnectingToBackend => Screen::new("Connecting to", "Server..."),
            Self::Ready if backend_online => Screen::new("Scan RFID Card", "Ready..."),
            Self::Ready => Screen::new("Scan RFID Card", "Please Wait..."),
            Self::Processing(card) => Screen::new("Processing...", format!("ID: {card}")),
            Self::Success(line1, line2) => Screen::new(line1.clone(), line2.clone()),
            Self::Error(message) => Screen::new(ERROR_HEADLINE, message.clone()),
            Self::ShuttingDown => Screen::new("System", "Shutting Down"),
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing(card) => write!(f, "Processing({card})"),
            Self::Error(message) => write!(f, "Error({message})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Payload-free state discriminant, used for transition rules and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Startup,
    ConnectingToBackend,
    Ready,
    Processing,
    Success,
    Error,
    ShuttingDown,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            StateKind::Startup => "Startup",
            StateKind::ConnectingToBackend => "ConnectingToBackend",
            StateKind::Ready => "Ready",
            StateKind::Processing => "Processing",
            StateKind::Success => "Success",
            StateKind::Error => "Error",
            StateKind::ShuttingDown => "ShuttingDown",
        };
        write!(f, "{}", state_str)
    }
}

impl StateKind {
    /// Check if transition to `target` is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_display::StateKind;
    ///
    /// assert!(StateKind::Ready.can_transition_to(StateKind::Processing));
    /// assert!(!StateKind::Ready.can_transition_to(StateKind::Success));
    /// assert!(StateKind::Processing.can_transition_to(StateKind::ShuttingDown));
    /// ```
    pub fn can_transition_to(self, target: StateKind) -> bool {
        matches!(
            (self, target),
            // Anything may shut down
            (_, StateKind::ShuttingDown)
            // From Startup
            | (StateKind::Startup, StateKind::Ready | StateKind::ConnectingToBackend)
            // From ConnectingToBackend (re-entered on each failed health check)
            | (StateKind::ConnectingToBackend, StateKind::ConnectingToBackend | StateKind::Ready)
            // From Ready
            | (
                StateKind::Ready,
                StateKind::Ready | StateKind::Processing | StateKind::ConnectingToBackend,
            )
            // From Processing
            | (StateKind::Processing, StateKind::Success | StateKind::Error)
            // Results dwell, then go back
            | (StateKind::Success | StateKind::Error, StateKind::Ready)
        )
    }
}

/// Two lines of display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub line1: String,
    pub line2: String,
}

impl Screen {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    pub fn lines(&self) -> [&str; 2] {
        [&self.line1, &self.line2]
    }
}

/// A single state transition with timestamp.
///
/// The timestamp is process-local and not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: StateKind,
    pub to: StateKind,
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: StateKind, to: StateKind) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// How long banner and result screens stay up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellTimes {
    /// Success and error screens.
    pub result: Duration,
    /// Startup banner.
    pub startup: Duration,
    /// Shutdown banner.
    pub shutdown: Duration,
}

impl Default for DwellTimes {
    fn default() -> Self {
        Self::from(&Timings::default())
    }
}

impl From<&Timings> for DwellTimes {
    fn from(timings: &Timings) -> Self {
        Self {
            result: timings.result_dwell,
            startup: timings.startup_dwell,
            shutdown: timings.shutdown_dwell,
        }
    }
}

/// Display state machine.
///
/// Owns the display adapter. Not thread-safe; the controller drives it from
/// a single task.
#[derive(Debug)]
pub struct DisplayStateMachine<S> {
    display: DisplayAdapter<S>,
    current_state: DisplayState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
    backend_online: bool,
    dwell: DwellTimes,
}

impl<S: DisplaySink> DisplayStateMachine<S> {
    /// Create a machine in the `Startup` state. Nothing is rendered until
    /// [`Self::startup`] or [`Self::render`] is called.
    pub fn new(display: DisplayAdapter<S>, dwell: DwellTimes) -> Self {
        Self {
            display,
            current_state: DisplayState::Startup,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            backend_online: false,
            dwell,
        }
    }

    pub fn current_state(&self) -> &DisplayState {
        &self.current_state
    }

    /// Whether the backend has answered a health check since startup.
    pub fn backend_online(&self) -> bool {
        self.backend_online
    }

    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    pub fn display(&self) -> &DisplayAdapter<S> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayAdapter<S> {
        &mut self.display
    }

    /// Move to `new_state` and render it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the move is not allowed
    /// from the current state. Nothing is rendered in that case. Display
    /// failures are logged, not returned.
    pub async fn transition_to(&mut self, new_state: DisplayState) -> Result<StateTransition> {
        let from = self.current_state.kind();
        let to = new_state.kind();

        if !from.can_transition_to(to) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(from, to);
        debug!("Display {} -> {}", self.current_state, new_state);

        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition.clone());

        self.render().await;
        Ok(transition)
    }

    /// Draw the current state again.
    pub async fn render(&mut self) {
        let screen = self.current_state.screen(self.backend_online);
        if let Err(e) = self.display.show_lines(&screen.lines()).await {
            warn!("Display update for {} incomplete: {e}", self.current_state);
        }
    }

    /// Show the startup banner for its dwell, then settle on `Ready`.
    ///
    /// # Errors
    ///
    /// Fails only if the machine has already left `Startup`.
    pub async fn startup(&mut self) -> Result<()> {
        if self.current_state != DisplayState::Startup {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: StateKind::Startup.to_string(),
            });
        }

        self.render().await;
        tokio::time::sleep(self.dwell.startup).await;
        self.transition_to(DisplayState::Ready).await?;
        Ok(())
    }

    /// Show the "connecting" screen.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` outside the idle states.
    pub async fn connecting(&mut self) -> Result<()> {
        self.transition_to(DisplayState::ConnectingToBackend).await?;
        Ok(())
    }

    /// Record that the backend is reachable and show the ready screen.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` outside the idle states.
    pub async fn backend_connected(&mut self) -> Result<()> {
        self.backend_online = true;
        self.transition_to(DisplayState::Ready).await?;
        Ok(())
    }

    /// Show that `card` is being processed.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` unless the machine is `Ready`.
    pub async fn processing(&mut self, card: CardId) -> Result<()> {
        self.transition_to(DisplayState::Processing(card)).await?;
        Ok(())
    }

    /// Show the result of a scan for the result dwell, then return to
    /// `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` unless the machine is
    /// `Processing`.
    pub async fn show_outcome(&mut self, outcome: &AttendanceOutcome) -> Result<()> {
        self.transition_to(DisplayState::from_outcome(outcome)).await?;
        tokio::time::sleep(self.dwell.result).await;
        self.transition_to(DisplayState::Ready).await?;
        Ok(())
    }

    /// Show the shutdown banner for its dwell.
    pub async fn shutting_down(&mut self) {
        // Every state may move to ShuttingDown.
        let _ = self.transition_to(DisplayState::ShuttingDown).await;
        tokio::time::sleep(self.dwell.shutdown).await;
    }

    /// Close the underlying display.
    ///
    /// # Errors
    ///
    /// Returns `Error::DisplayWrite` if the sink fails to close.
    pub async fn close(&mut self) -> Result<()> {
        self.display.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_hardware::mock::{MockDisplay, MockDisplayHandle};
    use rollcall_hardware::types::DisplayGeometry;
    use rstest::rstest;

    fn machine() -> (DisplayStateMachine<MockDisplay>, MockDisplayHandle) {
        let (sink, handle) = MockDisplay::new(DisplayGeometry::default());
        (
            DisplayStateMachine::new(DisplayAdapter::new(sink), DwellTimes::default()),
            handle,
        )
    }

    fn card(id: &str) -> CardId {
        CardId::new(id).unwrap()
    }

    #[rstest]
    #[case(AttendanceOutcome::SignedIn("Alice".into()), ["Alice", "Signed In"])]
    #[case(AttendanceOutcome::SignedOut("Bob".into()), ["Bob", "Signed Out"])]
    #[case(AttendanceOutcome::UserNotFound, ["ERROR!", "User Not Found"])]
    #[case(
        AttendanceOutcome::ServerError("Already signed in".into()),
        ["ERROR!", "Already signed in"]
    )]
    #[case(AttendanceOutcome::ServerError("Server Error".into()), ["ERROR!", "Server Error"])]
    #[case(AttendanceOutcome::Timeout, ["ERROR!", "Connection Timeout"])]
    #[case(AttendanceOutcome::ConnectionFailure, ["ERROR!", "No Connection"])]
    #[case(AttendanceOutcome::SystemError("bad json".into()), ["ERROR!", "System Error"])]
    fn test_outcome_screens(#[case] outcome: AttendanceOutcome, #[case] expected: [&str; 2]) {
        let screen = DisplayState::from_outcome(&outcome).screen(true);
        assert_eq!(screen.lines(), expected);
    }

    #[rstest]
    #[case(DisplayState::Startup, ["Attendance", "System Ready"])]
    #[case(DisplayState::ConnectingToBackend, ["Connecting to", "Server..."])]
    #[case(DisplayState::ShuttingDown, ["System", "Shutting Down"])]
    fn test_banner_screens(#[case] state: DisplayState, #[case] expected: [&str; 2]) {
        assert_eq!(state.screen(false).lines(), expected);
        assert_eq!(state.screen(true).lines(), expected);
    }

    #[test]
    fn test_ready_screen_depends_on_backend() {
        assert_eq!(DisplayState::Ready.screen(false).line2, "Please Wait...");
        assert_eq!(DisplayState::Ready.screen(true).line2, "Ready...");
    }

    #[test]
    fn test_processing_screen_shows_card() {
        let screen = DisplayState::Processing(card("A1B2C3")).screen(true);
        assert_eq!(screen.lines(), ["Processing...", "ID: A1B2C3"]);
    }

    #[rstest]
    #[case(StateKind::Startup, StateKind::Ready, true)]
    #[case(StateKind::Startup, StateKind::Processing, false)]
    #[case(StateKind::ConnectingToBackend, StateKind::ConnectingToBackend, true)]
    #[case(StateKind::ConnectingToBackend, StateKind::Processing, false)]
    #[case(StateKind::Ready, StateKind::Processing, true)]
    #[case(StateKind::Ready, StateKind::Error, false)]
    #[case(StateKind::Processing, StateKind::Success, true)]
    #[case(StateKind::Processing, StateKind::Ready, false)]
    #[case(StateKind::Success, StateKind::Ready, true)]
    #[case(StateKind::Error, StateKind::Processing, false)]
    #[case(StateKind::Error, StateKind::ShuttingDown, true)]
    #[case(StateKind::ShuttingDown, StateKind::Ready, false)]
    fn test_transition_rules(#[case] from: StateKind, #[case] to: StateKind, #[case] valid: bool) {
        assert_eq!(from.can_transition_to(to), valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_sequence() {
        let (mut machine, handle) = machine();
        let started = Instant::now();

        machine.startup().await.unwrap();

        assert!(handle.was_shown(&["Attendance", "System Ready"]));
        assert_eq!(handle.lines(), vec!["Scan RFID Card", "Please Wait..."]);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(machine.current_state(), &DisplayState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_twice_is_rejected() {
        let (mut machine, _handle) = machine();

        machine.startup().await.unwrap();
        assert!(machine.startup().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gating_then_ready() {
        let (mut machine, handle) = machine();
        machine.startup().await.unwrap();

        machine.connecting().await.unwrap();
        machine.connecting().await.unwrap();
        assert_eq!(handle.lines(), vec!["Connecting to", "Server..."]);
        assert!(!machine.backend_online());

        machine.backend_connected().await.unwrap();
        assert_eq!(handle.lines(), vec!["Scan RFID Card", "Ready..."]);
        assert!(machine.backend_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_dwell_then_ready() {
        let (mut machine, handle) = machine();
        machine.startup().await.unwrap();
        machine.backend_connected().await.unwrap();

        machine.processing(card("1234567890")).await.unwrap();
        assert_eq!(handle.lines(), vec!["Processing...", "ID: 1234567890"]);

        let before = Instant::now();
        machine
            .show_outcome(&AttendanceOutcome::SignedIn("Alice".into()))
            .await
            .unwrap();

        assert!(before.elapsed() >= Duration::from_secs(3));
        assert!(handle.was_shown(&["Alice", "Signed In"]));
        assert_eq!(handle.lines(), vec!["Scan RFID Card", "Ready..."]);
        assert_eq!(machine.current_state().kind(), StateKind::Ready);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_not_rendered() {
        let (mut machine, handle) = machine();

        let result = machine
            .transition_to(DisplayState::Success("x".into(), "y".into()))
            .await;

        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        assert_eq!(handle.op_count(), 0);
        assert_eq!(machine.current_state(), &DisplayState::Startup);
        assert!(machine.history().is_empty());
    }

    #[tokio::test]
    async fn test_outcome_without_processing_is_rejected() {
        let (mut machine, _handle) = machine();
        machine.transition_to(DisplayState::Ready).await.unwrap();

        let result = machine.show_outcome(&AttendanceOutcome::Timeout).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_display_failure_does_not_block_transition() {
        let (mut machine, handle) = machine();
        handle.fail_line(1);

        machine.transition_to(DisplayState::Ready).await.unwrap();

        assert_eq!(machine.current_state(), &DisplayState::Ready);
        assert_eq!(handle.lines(), vec!["Scan RFID Card", ""]);
    }

    #[tokio::test]
    async fn test_long_name_is_truncated() {
        let (mut machine, handle) = machine();
        machine.transition_to(DisplayState::Ready).await.unwrap();
        machine.processing(card("42")).await.unwrap();

        machine
            .transition_to(DisplayState::from_outcome(&AttendanceOutcome::SignedOut(
                "Maximiliana Featherstonehaugh".into(),
            )))
            .await
            .unwrap();

        assert_eq!(handle.lines(), vec!["Maximiliana Feat", "Signed Out"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutting_down_from_any_state() {
        let (mut machine, handle) = machine();
        machine.transition_to(DisplayState::Ready).await.unwrap();
        machine.processing(card("42")).await.unwrap();

        machine.shutting_down().await;
        machine.close().await.unwrap();

        assert!(handle.was_shown(&["System", "Shutting Down"]));
        assert!(handle.is_closed());
        assert_eq!(machine.current_state(), &DisplayState::ShuttingDown);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let (mut machine, _handle) = machine();
        machine.transition_to(DisplayState::Ready).await.unwrap();

        for _ in 0..(MAX_HISTORY_SIZE + 20) {
            machine.transition_to(DisplayState::Ready).await.unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        let last = machine.last_transitions(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[1].to, StateKind::Ready);
    }

    #[test]
    fn test_transition_serialization_skips_timestamp() {
        let transition = StateTransition::new(StateKind::Ready, StateKind::Processing);
        let json = serde_json::to_string(&transition).unwrap();
        assert_eq!(json, r#"{"from":"ready","to":"processing"}"#);
    }
}
