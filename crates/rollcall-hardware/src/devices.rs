//! Enum wrappers for device dispatch.
//!
//! Native `async fn` in traits are not object-safe, so `Box<dyn CardReader>`
//! is not an option. These enums give the binary one concrete type per
//! capability while still letting it choose the implementation at startup
//! from configuration.
//!
//! # Examples
//!
//! ```
//! use rollcall_hardware::devices::AnyCardReader;
//! use rollcall_hardware::readers::SimulatedReader;
//! use rollcall_hardware::traits::CardReader;
//!
//! let reader = AnyCardReader::Simulated(SimulatedReader::new());
//! assert!(reader.reader_info().simulated);
//! ```

use rollcall_core::CardId;

use crate::Result;
use crate::mock::{MockCardReader, MockDisplay};
use crate::readers::{LineCardReader, SimulatedReader};
use crate::sinks::{ConsoleDisplay, NullDisplay};
use crate::traits::{CardReader, DisplaySink};
use crate::types::{DisplayGeometry, ReaderInfo};

/// Enum wrapper for card reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// No hardware; never sees a card while polling.
    Simulated(SimulatedReader),
    /// Newline-terminated ids from stdin or a device node.
    Line(LineCardReader),
    /// Mock reader for development and testing.
    Mock(MockCardReader),
}

impl CardReader for AnyCardReader {
    async fn try_read_card(&mut self) -> Result<Option<CardId>> {
        match self {
            Self::Simulated(device) => device.try_read_card().await,
            Self::Line(device) => device.try_read_card().await,
            Self::Mock(device) => device.try_read_card().await,
        }
    }

    async fn wait_for_card(&mut self) -> Result<CardId> {
        match self {
            Self::Simulated(device) => device.wait_for_card().await,
            Self::Line(device) => device.wait_for_card().await,
            Self::Mock(device) => device.wait_for_card().await,
        }
    }

    fn reader_info(&self) -> ReaderInfo {
        match self {
            Self::Simulated(device) => device.reader_info(),
            Self::Line(device) => device.reader_info(),
            Self::Mock(device) => device.reader_info(),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Simulated(device) => device.close().await,
            Self::Line(device) => device.close().await,
            Self::Mock(device) => device.close().await,
        }
    }
}

/// Enum wrapper for display sink dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDisplaySink {
    /// Echo writes to standard output.
    Console(ConsoleDisplay),
    /// Discard writes.
    Null(NullDisplay),
    /// Mock display for development and testing.
    Mock(MockDisplay),
}

impl DisplaySink for AnyDisplaySink {
    fn geometry(&self) -> DisplayGeometry {
        match self {
            Self::Console(device) => device.geometry(),
            Self::Null(device) => device.geometry(),
            Self::Mock(device) => device.geometry(),
        }
    }

    async fn write_line(&mut self, text: &str, line: usize) -> Result<()> {
        match self {
            Self::Console(device) => device.write_line(text, line).await,
            Self::Null(device) => device.write_line(text, line).await,
            Self::Mock(device) => device.write_line(text, line).await,
        }
    }

    async fn clear(&mut self) -> Result<()> {
        match self {
            Self::Console(device) => device.clear().await,
            Self::Null(device) => device.clear().await,
            Self::Mock(device) => device.clear().await,
        }
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        match self {
            Self::Console(device) => device.set_backlight(enabled).await,
            Self::Null(device) => device.set_backlight(enabled).await,
            Self::Mock(device) => device.set_backlight(enabled).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Console(device) => device.close().await,
            Self::Null(device) => device.close().await,
            Self::Mock(device) => device.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_reader_dispatches_to_mock() {
        let (reader, handle) = MockCardReader::new();
        let mut reader = AnyCardReader::Mock(reader);

        handle.present_card("77").unwrap();
        let card = reader.try_read_card().await.unwrap().unwrap();
        assert_eq!(card.as_str(), "77");
        assert_eq!(handle.poll_count(), 1);
    }

    #[tokio::test]
    async fn test_any_display_dispatches_to_mock() {
        let (display, handle) = MockDisplay::new(DisplayGeometry::new(20, 4).unwrap());
        let mut display = AnyDisplaySink::Mock(display);

        assert_eq!(display.geometry().columns, 20);
        display.write_line("hello", 3).await.unwrap();
        assert_eq!(handle.lines()[3], "hello");
    }

    #[tokio::test]
    async fn test_any_display_null() {
        let mut display = AnyDisplaySink::Null(NullDisplay::default());
        assert!(display.write_line("x", 0).await.is_ok());
        assert!(display.close().await.is_ok());
    }
}
