//! Capability traits for kiosk peripherals.
//!
//! The control loop only ever talks to a card reader and a display through
//! these traits. Each trait has several implementations (simulated, line
//! based, console, mock) and the binary picks one at construction time.
//!
//! # Object Safety
//!
//! Like the rest of the workspace these traits use native `async fn`
//! (Edition 2024 RPITIT), so they are consumed through generics or the enum
//! wrappers in [`crate::devices`] rather than `Box<dyn Trait>`.

#![allow(async_fn_in_trait)]

use rollcall_core::CardId;

use crate::Result;
use crate::types::{DisplayGeometry, ReaderInfo};

/// Card-presence sensor.
///
/// # Examples
///
/// ```no_run
/// use rollcall_hardware::traits::CardReader;
/// use rollcall_hardware::Result;
///
/// async fn first_card<R: CardReader>(reader: &mut R) -> Result<String> {
///     let card = reader.wait_for_card().await?;
///     Ok(card.to_string())
/// }
/// ```
pub trait CardReader: Send {
    /// Check the field once and return the card in it, if any.
    ///
    /// Must not wait for a card to arrive; "no card" is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be queried.
    async fn try_read_card(&mut self) -> Result<Option<CardId>>;

    /// Wait until a card is presented and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected while waiting.
    async fn wait_for_card(&mut self) -> Result<CardId>;

    /// Describe the reader.
    fn reader_info(&self) -> ReaderInfo;

    /// Release the device. Further reads are not expected to succeed.
    async fn close(&mut self) -> Result<()>;
}

/// Fixed-grid character output device.
///
/// Sinks write exactly what they are given: fitting text to the grid is the
/// job of the display adapter layered on top.
pub trait DisplaySink: Send {
    /// Size of the character grid.
    fn geometry(&self) -> DisplayGeometry;

    /// Write `text` starting at column 0 of `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the device rejects the
    /// write.
    async fn write_line(&mut self, text: &str, line: usize) -> Result<()>;

    /// Blank every cell.
    async fn clear(&mut self) -> Result<()>;

    /// Turn the backlight on or off.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Unsupported` on sinks without a backlight.
    async fn set_backlight(&mut self, enabled: bool) -> Result<()>;

    /// Blank the display and release the device.
    async fn close(&mut self) -> Result<()>;
}
