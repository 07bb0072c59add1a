//! The kiosk control loop.
//!
//! # Lifecycle
//!
//! ```text
//! startup banner (2s)
//!     │
//!     ▼
//! backend gating ──(health fails)──> "Connecting to / Server..." ── retry every 5s
//!     │ (health ok)
//!     ▼
//! poll loop: read ─> debounce ─> process ─> show outcome (3s) ─> ready
//!     │ (shutdown token cancelled)
//!     ▼
//! shutdown banner (1s), close reader and display
//! ```
//!
//! Everything runs on the caller's task. Scans are processed one at a time:
//! the reader is not polled again until the previous outcome has been shown
//! and the display is back on the ready screen.
//!
//! Shutdown is cooperative. The token is checked at the top of each loop
//! iteration and cuts idle sleeps short; a scan already being processed runs
//! to completion, including its result dwell.

use std::time::Duration;

use rollcall_core::{AttendanceOutcome, CardId, ScanEvent, Timings};
use rollcall_display::{DisplayAdapter, DisplayStateMachine, DwellTimes};
use rollcall_hardware::{CardReader, DisplaySink};
use rollcall_network::AttendanceBackend;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::debounce::Debouncer;
use crate::processing::process_card;

/// What one poll of the reader did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// No card present.
    Idle,
    /// Card seen again inside the debounce window; ignored.
    Debounced(CardId),
    /// Card processed; the outcome has been shown.
    Processed(AttendanceOutcome),
}

/// Owns the reader, display and backend client for one kiosk.
#[derive(Debug)]
pub struct AttendanceController<R, S, B> {
    reader: R,
    display: DisplayStateMachine<S>,
    backend: B,
    debouncer: Debouncer,
    timings: Timings,
    shutdown: CancellationToken,
}

impl<R, S, B> AttendanceController<R, S, B>
where
    R: CardReader,
    S: DisplaySink,
    B: AttendanceBackend,
{
    pub fn new(reader: R, sink: S, backend: B, timings: Timings) -> Self {
        let display =
            DisplayStateMachine::new(DisplayAdapter::new(sink), DwellTimes::from(&timings));

        Self {
            reader,
            display,
            backend,
            debouncer: Debouncer::new(timings.debounce_window),
            timings,
            shutdown: CancellationToken::new(),
        }
    }

    /// Use `token` instead of the controller's own shutdown token.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Token that stops [`Self::run`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn display(&self) -> &DisplayStateMachine<S> {
        &self.display
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Run the kiosk until the shutdown token is cancelled.
    ///
    /// Scan failures, reader errors and display failures are logged and
    /// the loop carries on. Both adapters are closed before returning,
    /// including when shutdown arrives while waiting for the backend.
    ///
    /// # Errors
    ///
    /// Returns an error only if the controller has already been run.
    pub async fn run(&mut self) -> Result<()> {
        let reader_info = self.reader.reader_info();
        info!(
            "Attendance kiosk starting (reader: {}{}, display: {})",
            reader_info.name,
            if reader_info.simulated { ", simulated" } else { "" },
            self.display.display().geometry()
        );

        self.display.startup().await?;

        if self.wait_for_backend().await? {
            info!("Ready for cards");
            self.poll_loop().await;
        }

        self.teardown().await;
        Ok(())
    }

    /// Block until the backend answers a health check.
    ///
    /// Returns `false` if shutdown was requested first.
    async fn wait_for_backend(&mut self) -> Result<bool> {
        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested while waiting for backend");
                return Ok(false);
            }

            match self.backend.health().await {
                Ok(()) => {
                    info!("Backend is reachable");
                    self.display.backend_connected().await?;
                    return Ok(true);
                }
                Err(e) => {
                    warn!(
                        "Backend not ready ({e}), retrying in {}ms",
                        self.timings.health_retry.as_millis()
                    );
                    self.display.connecting().await?;

                    if !self.pause(self.timings.health_retry).await {
                        info!("Shutdown requested while waiting for backend");
                        return Ok(false);
                    }
                }
            }
        }
    }

    async fn poll_loop(&mut self) {
        while !self.shutdown.is_cancelled() {
            match self.poll_once().await {
                Ok(PollResult::Idle) => {
                    self.pause(self.timings.poll_interval).await;
                }
                Ok(PollResult::Debounced(_) | PollResult::Processed(_)) => {}
                Err(e) => {
                    error!("Poll iteration failed: {e}");
                    self.pause(self.timings.iteration_backoff).await;
                }
            }
        }
    }

    /// Poll the reader once and process whatever it returns.
    ///
    /// Does not sleep when the reader is idle; the caller decides the pace.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Reader` if the reader fails, or
    /// `KioskError::Display` if the display state machine refuses to show
    /// the scan (for example when called before [`Self::run`]).
    pub async fn poll_once(&mut self) -> Result<PollResult> {
        let Some(card) = self.reader.try_read_card().await? else {
            return Ok(PollResult::Idle);
        };

        let scan = ScanEvent::now(card);
        if !self.debouncer.accept(&scan.card_id, scan.observed_at) {
            debug!("Ignoring repeated scan of card {}", scan.card_id);
            return Ok(PollResult::Debounced(scan.card_id));
        }

        let outcome = self.process_scan(scan).await?;
        Ok(PollResult::Processed(outcome))
    }

    /// Show `scan` as in progress, run it against the backend, and show the
    /// outcome for the result dwell.
    ///
    /// Does not consult the debouncer.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Display` if the display is not on the ready
    /// screen.
    pub async fn process_scan(&mut self, scan: ScanEvent) -> Result<AttendanceOutcome> {
        info!(
            "Card {} scanned at {}",
            scan.card_id,
            scan.received_at.format("%H:%M:%S")
        );
        self.display.processing(scan.card_id.clone()).await?;

        let outcome = process_card(&self.backend, &scan.card_id).await;
        if outcome.is_success() {
            info!("Card {}: {outcome}", scan.card_id);
        } else {
            warn!("Card {}: {outcome}", scan.card_id);
        }

        self.display.show_outcome(&outcome).await?;
        Ok(outcome)
    }

    async fn teardown(&mut self) {
        info!("Shutting down");
        self.display.shutting_down().await;

        if let Err(e) = self.reader.close().await {
            warn!("Failed to close card reader: {e}");
        }
        if let Err(e) = self.display.close().await {
            warn!("Failed to close display: {e}");
        }
        info!("Kiosk stopped");
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `false` if the sleep was cut short.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
