//! Adapter selection from configuration.
//!
//! The only place that decides between simulated and real peripherals. The
//! rest of the kiosk sees [`AnyCardReader`] and [`AnyDisplaySink`].

use rollcall_core::{DisplayTarget, KioskConfig, ReaderSource};
use rollcall_hardware::readers::{LineCardReader, SimulatedReader};
use rollcall_hardware::sinks::{ConsoleDisplay, NullDisplay};
use rollcall_hardware::{AnyCardReader, AnyDisplaySink, DisplayGeometry};
use tracing::info;

use crate::{KioskError, Result};

/// Open the card reader named by `source`.
///
/// # Errors
///
/// Returns `KioskError::Reader` if a device path cannot be opened or the
/// line reader thread cannot be started.
pub async fn open_reader(source: &ReaderSource) -> Result<AnyCardReader> {
    let reader = match source {
        ReaderSource::Simulated => {
            info!("Card reader: simulated (no hardware)");
            AnyCardReader::Simulated(SimulatedReader::new())
        }
        ReaderSource::Stdin => {
            info!("Card reader: standard input, one card id per line");
            AnyCardReader::Line(LineCardReader::stdin()?)
        }
        ReaderSource::Device(path) => {
            info!("Card reader: {}", path.display());
            AnyCardReader::Line(LineCardReader::open(path).await?)
        }
    };
    Ok(reader)
}

/// Open the display named by `config.display`, sized from the LCD settings.
///
/// # Errors
///
/// Returns `KioskError::Initialization` if the geometry is unusable.
pub fn open_display(config: &KioskConfig) -> Result<AnyDisplaySink> {
    let geometry = DisplayGeometry::new(config.lcd_columns, config.lcd_rows)
        .map_err(|e| KioskError::initialization(format!("LCD geometry: {e}")))?;

    let display = match config.display {
        DisplayTarget::Console => {
            info!(
                "Display: console echo of a {geometry} LCD at I2C address {:#04x}",
                config.lcd_i2c_address
            );
            AnyDisplaySink::Console(ConsoleDisplay::stdout(geometry))
        }
        DisplayTarget::None => {
            info!("Display: disabled");
            AnyDisplaySink::Null(NullDisplay::new(geometry))
        }
    };
    Ok(display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_hardware::traits::{CardReader, DisplaySink};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_simulated_reader_selected() {
        let reader = open_reader(&ReaderSource::Simulated).await.unwrap();
        assert!(matches!(reader, AnyCardReader::Simulated(_)));
        assert!(reader.reader_info().simulated);
    }

    #[tokio::test]
    async fn test_missing_device_fails() {
        let source = ReaderSource::Device(PathBuf::from("/nonexistent/rfid-reader"));
        assert!(open_reader(&source).await.is_err());
    }

    #[test]
    fn test_display_geometry_from_config() {
        let config = KioskConfig {
            lcd_columns: 20,
            lcd_rows: 4,
            display: DisplayTarget::None,
            ..KioskConfig::default()
        };

        let display = open_display(&config).unwrap();
        assert!(matches!(display, AnyDisplaySink::Null(_)));
        assert_eq!(display.geometry(), DisplayGeometry::new(20, 4).unwrap());
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let config = KioskConfig {
            lcd_rows: 0,
            ..KioskConfig::default()
        };
        assert!(open_display(&config).is_err());
    }
}
