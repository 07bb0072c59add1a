//! Error types for hardware operations.
//!
//! Covers the failure modes of card readers and display sinks: devices that
//! vanish, refuse to initialize, or hand back data the kiosk cannot use.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Card reading error.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Display write error.
    #[error("Display error: {message}")]
    DisplayError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new display error.
    pub fn display(message: impl Into<String>) -> Self {
        Self::DisplayError {
            message: message.into(),
        }
    }
}

impl From<rollcall_core::Error> for HardwareError {
    fn from(err: rollcall_core::Error) -> Self {
        match err {
            rollcall_core::Error::Io(io) => Self::Io(io),
            other => Self::invalid_data(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("MFRC522");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: MFRC522");
    }

    #[test]
    fn test_initialization_failed_error() {
        let error = HardwareError::initialization_failed("/dev/ttyUSB0: not found");
        assert_eq!(
            error.to_string(),
            "Initialization failed: /dev/ttyUSB0: not found"
        );
    }

    #[test]
    fn test_display_error() {
        let error = HardwareError::display("bus NACK");
        assert!(matches!(error, HardwareError::DisplayError { .. }));
        assert_eq!(error.to_string(), "Display error: bus NACK");
    }

    #[test]
    fn test_core_card_error_becomes_invalid_data() {
        let core = rollcall_core::Error::InvalidCardFormat("Card id is empty".into());
        let error = HardwareError::from(core);
        assert!(matches!(error, HardwareError::InvalidData { .. }));
    }
}
