//! Character display adapter.
//!
//! Wraps a [`DisplaySink`] and takes care of everything between "show this
//! text" and "write these exact characters": sanitizing, truncating to the
//! column count, padding to full width so stale characters are overwritten,
//! alignment, and scrolling text that does not fit.
//!
//! # Examples
//!
//! ```
//! use rollcall_display::DisplayAdapter;
//! use rollcall_hardware::mock::MockDisplay;
//! use rollcall_hardware::types::DisplayGeometry;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rollcall_core::Result<()> {
//! let (sink, handle) = MockDisplay::new(DisplayGeometry::new(16, 2).unwrap());
//! let mut display = DisplayAdapter::new(sink);
//!
//! display.write_line("Processing...", 0).await?;
//! display.write_centered("Hello", 1).await?;
//!
//! assert_eq!(handle.lines(), vec!["Processing...", "     Hello"]);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rollcall_core::{Error, Result};
use rollcall_hardware::{DisplayGeometry, DisplaySink};
use tracing::{debug, warn};

/// Text alignment options for display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Text starts at column 0, padded with spaces on the right.
    Left,
    /// Text centered; the extra space goes on the right when padding is odd.
    Center,
    /// Text ends at the last column, padded with spaces on the left.
    Right,
}

/// Display adapter over a [`DisplaySink`].
///
/// The adapter owns its sink exclusively. It is not thread-safe; the kiosk
/// drives it from a single task.
#[derive(Debug)]
pub struct DisplayAdapter<S> {
    sink: S,
    geometry: DisplayGeometry,
}

impl<S: DisplaySink> DisplayAdapter<S> {
    /// Wrap `sink`, taking its geometry.
    pub fn new(sink: S) -> Self {
        let geometry = sink.geometry();
        Self { sink, geometry }
    }

    /// Size of the underlying display.
    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    /// Borrow the underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the adapter and return the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Write `text` to `line`, left aligned.
    ///
    /// Control characters are removed and the text is truncated to the
    /// column count, then padded so the whole line is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if `line` does not exist, or
    /// `Error::DisplayWrite` if the sink rejects the write.
    pub async fn write_line(&mut self, text: &str, line: usize) -> Result<()> {
        self.write_aligned(text, line, Alignment::Left).await
    }

    /// Write `text` centered on `line`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::write_line`].
    pub async fn write_centered(&mut self, text: &str, line: usize) -> Result<()> {
        self.write_aligned(text, line, Alignment::Center).await
    }

    /// Write `text` to `line` with the given alignment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::write_line`].
    pub async fn write_aligned(&mut self, text: &str, line: usize, align: Alignment) -> Result<()> {
        self.check_line(line)?;

        let sanitized = sanitize_text(text);
        let fitted = align_text(&sanitized, self.geometry.columns, align);
        self.put(&fitted, line).await
    }

    /// Clear the display and write one entry of `lines` per row.
    ///
    /// Rows are written independently: a failed row is logged and the
    /// remaining rows are still attempted. Entries beyond the row count are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered, after every row has been tried.
    pub async fn show_lines(&mut self, lines: &[&str]) -> Result<()> {
        let mut first_error = self.clear().await.err();

        for (index, text) in lines.iter().enumerate().take(self.geometry.rows) {
            if let Err(e) = self.write_line(text, index).await {
                warn!("Display line {index} not written: {e}");
                first_error.get_or_insert(e);
            }
        }

        if lines.len() > self.geometry.rows {
            debug!(
                "Dropped {} line(s) that do not fit a {} display",
                lines.len() - self.geometry.rows,
                self.geometry
            );
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Show `text` on `line`, scrolling it one column per `step` if it is
    /// wider than the display.
    ///
    /// The text scrolls fully off the line; the line is left showing the
    /// final (blank) window.
    ///
    /// # Errors
    ///
    /// Same as [`Self::write_line`]; scrolling stops at the first failure.
    pub async fn scroll_text(&mut self, text: &str, line: usize, step: Duration) -> Result<()> {
        let columns = self.geometry.columns;
        let sanitized = sanitize_text(text);

        if sanitized.chars().count() <= columns {
            return self.write_line(&sanitized, line).await;
        }

        self.check_line(line)?;

        let padded: Vec<char> = sanitized
            .chars()
            .chain(std::iter::repeat_n(' ', columns))
            .collect();

        for start in 0..=(padded.len() - columns) {
            let window: String = padded[start..start + columns].iter().collect();
            self.put(&window, line).await?;
            tokio::time::sleep(step).await;
        }

        Ok(())
    }

    /// Blank the display.
    ///
    /// # Errors
    ///
    /// Returns `Error::DisplayWrite` if the sink fails.
    pub async fn clear(&mut self) -> Result<()> {
        self.sink
            .clear()
            .await
            .map_err(|e| Error::DisplayWrite(e.to_string()))
    }

    /// Turn the backlight on or off.
    ///
    /// # Errors
    ///
    /// Returns `Error::DisplayWrite` if the sink fails or has no backlight.
    pub async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        self.sink
            .set_backlight(enabled)
            .await
            .map_err(|e| Error::DisplayWrite(e.to_string()))
    }

    /// Blank the display and release the sink.
    ///
    /// # Errors
    ///
    /// Returns `Error::DisplayWrite` if the sink fails to close.
    pub async fn close(&mut self) -> Result<()> {
        self.sink
            .close()
            .await
            .map_err(|e| Error::DisplayWrite(e.to_string()))
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if !self.geometry.has_line(line) {
            return Err(Error::InvalidLine {
                line,
                max: self.geometry.rows - 1,
            });
        }
        Ok(())
    }

    async fn put(&mut self, text: &str, line: usize) -> Result<()> {
        self.sink
            .write_line(text, line)
            .await
            .map_err(|e| Error::DisplayWrite(e.to_string()))
    }
}

/// Truncate text to a maximum number of characters.
///
/// # Examples
///
/// ```
/// use rollcall_display::truncate_text;
///
/// assert_eq!(truncate_text("Connection Timeout", 16), "Connection Timeo");
/// assert_eq!(truncate_text("Short", 10), "Short");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Align text within a fixed width, padding with spaces.
///
/// Text wider than `width` is truncated instead.
///
/// # Examples
///
/// ```
/// use rollcall_display::{align_text, Alignment};
///
/// assert_eq!(align_text("HELLO", 10, Alignment::Left), "HELLO     ");
/// assert_eq!(align_text("HELLO", 10, Alignment::Center), "  HELLO   ");
/// assert_eq!(align_text("HELLO", 10, Alignment::Right), "     HELLO");
/// ```
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    if text.chars().count() >= width {
        return truncate_text(text, width);
    }

    match alignment {
        Alignment::Left => format!("{text:<width$}"),
        Alignment::Center => format!("{text:^width$}"),
        Alignment::Right => format!("{text:>width$}"),
    }
}

/// Remove control characters and surrounding whitespace.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
