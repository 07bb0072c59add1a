//! Display sink for headless kiosks.

use tracing::trace;

use crate::traits::DisplaySink;
use crate::types::DisplayGeometry;
use crate::{HardwareError, Result};

/// Sink that accepts and discards every write.
///
/// Out-of-range lines are still rejected so that headless runs surface the
/// same rendering bugs a physical display would.
#[derive(Debug, Default)]
pub struct NullDisplay {
    geometry: DisplayGeometry,
}

impl NullDisplay {
    pub fn new(geometry: DisplayGeometry) -> Self {
        Self { geometry }
    }
}

impl DisplaySink for NullDisplay {
    fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    async fn write_line(&mut self, text: &str, line: usize) -> Result<()> {
        if !self.geometry.has_line(line) {
            return Err(HardwareError::display(format!("Line {line} out of range")));
        }
        trace!(line, text, "discarding display write");
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    async fn set_backlight(&mut self, _enabled: bool) -> Result<()> {
        Err(HardwareError::unsupported("set_backlight"))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
