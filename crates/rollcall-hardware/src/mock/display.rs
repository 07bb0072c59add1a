//! Mock display sink for testing and development.
//!
//! The mock keeps a character buffer like a real LCD and also records every
//! operation it receives, so tests can assert both on the final screen and on
//! the screens that were shown along the way.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::DisplaySink;
use crate::types::DisplayGeometry;
use crate::{HardwareError, Result};

/// One call received by a [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Write { line: usize, text: String },
    Backlight(bool),
    Close,
}

#[derive(Debug)]
struct Screen {
    geometry: DisplayGeometry,
    rows: Vec<String>,
    ops: Vec<DisplayOp>,
    failing_line: Option<usize>,
    backlight: bool,
    closed: bool,
}

impl Screen {
    fn blank_rows(geometry: DisplayGeometry) -> Vec<String> {
        vec![String::new(); geometry.rows]
    }
}

/// Mock display sink.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::mock::MockDisplay;
/// use rollcall_hardware::traits::DisplaySink;
/// use rollcall_hardware::types::DisplayGeometry;
///
/// #[tokio::main]
/// async fn main() -> rollcall_hardware::Result<()> {
///     let (mut display, handle) = MockDisplay::new(DisplayGeometry::default());
///
///     display.write_line("Scan RFID Card", 0).await?;
///     display.write_line("Ready...", 1).await?;
///
///     assert_eq!(handle.lines(), vec!["Scan RFID Card", "Ready..."]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    screen: Arc<Mutex<Screen>>,
    geometry: DisplayGeometry,
}

impl MockDisplay {
    /// Create a mock display with the given geometry and its handle.
    pub fn new(geometry: DisplayGeometry) -> (Self, MockDisplayHandle) {
        let screen = Arc::new(Mutex::new(Screen {
            geometry,
            rows: Screen::blank_rows(geometry),
            ops: Vec::new(),
            failing_line: None,
            backlight: true,
            closed: false,
        }));

        let display = Self {
            screen: Arc::clone(&screen),
            geometry,
        };

        (display, MockDisplayHandle { screen })
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplaySink for MockDisplay {
    fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    async fn write_line(&mut self, text: &str, line: usize) -> Result<()> {
        let mut screen = self.screen();

        if !screen.geometry.has_line(line) {
            return Err(HardwareError::display(format!("Line {line} out of range")));
        }
        if screen.failing_line == Some(line) {
            return Err(HardwareError::display(format!("Injected failure on line {line}")));
        }

        screen.rows[line] = text.to_string();
        screen.ops.push(DisplayOp::Write {
            line,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        let mut screen = self.screen();
        screen.rows = Screen::blank_rows(screen.geometry);
        screen.ops.push(DisplayOp::Clear);
        Ok(())
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        let mut screen = self.screen();
        screen.backlight = enabled;
        screen.ops.push(DisplayOp::Backlight(enabled));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut screen = self.screen();
        screen.rows = Screen::blank_rows(screen.geometry);
        screen.closed = true;
        screen.ops.push(DisplayOp::Close);
        Ok(())
    }
}

/// Handle for inspecting a mock display.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    screen: Arc<Mutex<Screen>>,
}

impl MockDisplayHandle {
    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current contents of every line, with trailing padding removed.
    pub fn lines(&self) -> Vec<String> {
        self.screen()
            .rows
            .iter()
            .map(|row| row.trim_end().to_string())
            .collect()
    }

    /// Every operation received so far, oldest first.
    pub fn ops(&self) -> Vec<DisplayOp> {
        self.screen().ops.clone()
    }

    /// Number of operations received so far.
    pub fn op_count(&self) -> usize {
        self.screen().ops.len()
    }

    /// Replay the operation log and report whether the screen ever showed
    /// exactly `expected` (compared with padding trimmed on both sides).
    pub fn was_shown(&self, expected: &[&str]) -> bool {
        let screen = self.screen();
        let mut rows = Screen::blank_rows(screen.geometry);

        let matches = |rows: &[String]| {
            rows.len() == expected.len()
                && rows
                    .iter()
                    .zip(expected)
                    .all(|(row, want)| row.trim() == want.trim())
        };

        for op in &screen.ops {
            match op {
                DisplayOp::Clear | DisplayOp::Close => {
                    rows = Screen::blank_rows(screen.geometry);
                }
                DisplayOp::Write { line, text } => rows[*line] = text.clone(),
                DisplayOp::Backlight(_) => continue,
            }
            if matches(&rows) {
                return true;
            }
        }
        false
    }

    /// Make every write to `line` fail until [`Self::heal`] is called.
    pub fn fail_line(&self, line: usize) {
        self.screen().failing_line = Some(line);
    }

    /// Stop injecting write failures.
    pub fn heal(&self) {
        self.screen().failing_line = None;
    }

    pub fn backlight(&self) -> bool {
        self.screen().backlight
    }

    pub fn is_closed(&self) -> bool {
        self.screen().closed
    }
}
