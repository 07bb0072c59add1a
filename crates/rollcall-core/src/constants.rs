//! Default values for the kiosk control loop.
//!
//! Every timing value here can be overridden through [`crate::KioskConfig`];
//! these are the values the kiosk runs with when the environment is silent.
//!
//! # Usage
//!
//! ```
//! use rollcall_core::constants::*;
//! use std::time::Duration;
//!
//! let poll = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
//! assert!(poll < Duration::from_millis(DEFAULT_DEBOUNCE_WINDOW_MS));
//! ```

// ============================================================================
// Control Loop Timing
// ============================================================================

/// Sleep between reader polls when no card is present.
///
/// Bounds both CPU usage and the latency between a card entering the field
/// and the kiosk reacting to it.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Window in which a repeated read of the same card is ignored.
pub const DEFAULT_DEBOUNCE_WINDOW_MS: u64 = 3_000;

/// Pause after a failed loop iteration before polling again.
pub const DEFAULT_ITERATION_BACKOFF_MS: u64 = 1_000;

// ============================================================================
// Backend Timing
// ============================================================================

/// Timeout for a single health check.
pub const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 5_000;

/// Interval between health checks while waiting for the backend.
pub const DEFAULT_HEALTH_RETRY_MS: u64 = 5_000;

/// Timeout for lookup and sign-in/sign-out requests.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// Display Timing
// ============================================================================

/// How long a success or error screen stays up before returning to ready.
pub const DEFAULT_RESULT_DWELL_MS: u64 = 3_000;

/// How long the startup banner stays up.
pub const DEFAULT_STARTUP_DWELL_MS: u64 = 2_000;

/// How long the shutdown banner stays up before the adapters are released.
pub const DEFAULT_SHUTDOWN_DWELL_MS: u64 = 1_000;

/// Delay between steps when scrolling text that does not fit a line.
pub const DEFAULT_SCROLL_STEP_MS: u64 = 300;

// ============================================================================
// Display Geometry
// ============================================================================

/// Columns of the standard 16x2 character LCD.
pub const DEFAULT_LCD_COLUMNS: usize = 16;

/// Rows of the standard 16x2 character LCD.
pub const DEFAULT_LCD_ROWS: usize = 2;

/// Bus address of the common PCF8574 LCD backpack.
pub const DEFAULT_LCD_I2C_ADDRESS: u8 = 0x27;

// ============================================================================
// Backend
// ============================================================================

/// Backend base URL used when `API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
