//! Display sink that echoes to a text stream.
//!
//! Used when no LCD is attached: every write shows up as a line such as
//! `LCD Line 0: Scan RFID Card`, which makes the kiosk observable from a
//! terminal or a service log.

use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

use crate::traits::DisplaySink;
use crate::types::DisplayGeometry;
use crate::{HardwareError, Result};

/// Echoing display sink.
#[derive(Debug)]
pub struct ConsoleDisplay<W = Stdout> {
    out: W,
    geometry: DisplayGeometry,
    backlight: bool,
}

impl ConsoleDisplay<Stdout> {
    /// Echo to standard output.
    pub fn stdout(geometry: DisplayGeometry) -> Self {
        Self::with_writer(tokio::io::stdout(), geometry)
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleDisplay<W> {
    /// Echo to an arbitrary writer.
    pub fn with_writer(out: W, geometry: DisplayGeometry) -> Self {
        Self {
            out,
            geometry,
            backlight: true,
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    async fn echo(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin + Send> DisplaySink for ConsoleDisplay<W> {
    fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    async fn write_line(&mut self, text: &str, line: usize) -> Result<()> {
        if !self.geometry.has_line(line) {
            return Err(HardwareError::display(format!(
                "Line {line} out of range (max: {})",
                self.geometry.rows - 1
            )));
        }
        self.echo(&format!("LCD Line {line}: {text}")).await
    }

    async fn clear(&mut self) -> Result<()> {
        self.echo("LCD: [CLEAR]").await
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        self.backlight = enabled;
        let state = if enabled { "ON" } else { "OFF" };
        self.echo(&format!("LCD Backlight: {state}")).await
    }

    async fn close(&mut self) -> Result<()> {
        self.clear().await
    }
}
