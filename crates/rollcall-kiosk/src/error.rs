use rollcall_hardware::HardwareError;
use rollcall_network::BackendError;
use thiserror::Error;

/// Kiosk error types.
///
/// Scan failures never show up here: they become an
/// [`AttendanceOutcome`](rollcall_core::AttendanceOutcome) and are shown on
/// the display. These are failures of the loop itself.
#[derive(Debug, Error)]
pub enum KioskError {
    /// Reader failed or disconnected.
    #[error("Card reader error: {0}")]
    Reader(#[from] HardwareError),

    /// Display or display state machine failure.
    #[error("Display error: {0}")]
    Display(#[from] rollcall_core::Error),

    /// Backend client could not be built.
    #[error("Backend client error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration that parsed but cannot be used.
    #[error("Initialization failed: {0}")]
    Initialization(String),
}

impl KioskError {
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization(message.into())
    }
}

/// Result type alias for kiosk operations.
pub type Result<T> = std::result::Result<T, KioskError>;
