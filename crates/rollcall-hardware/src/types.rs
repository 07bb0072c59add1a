//! Common types shared across device implementations.

use serde::{Deserialize, Serialize};

use crate::{HardwareError, Result};

/// Card reader information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522", "Simulated Reader").
    pub name: String,

    /// Whether a physical device backs this reader.
    pub simulated: bool,
}

impl ReaderInfo {
    /// Info for a reader backed by real hardware.
    pub fn hardware(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            simulated: false,
        }
    }

    /// Info for a reader without hardware behind it.
    pub fn simulated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            simulated: true,
        }
    }
}

/// Size of a character display in columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub columns: usize,
    pub rows: usize,
}

impl DisplayGeometry {
    /// Create a geometry, rejecting displays with no cells.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidData` if either dimension is zero.
    pub fn new(columns: usize, rows: usize) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(HardwareError::invalid_data(format!(
                "Display geometry must be non-zero, got {columns}x{rows}"
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Returns `true` if `line` addresses an existing row.
    #[inline]
    pub fn has_line(&self, line: usize) -> bool {
        line < self.rows
    }
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            columns: rollcall_core::constants::DEFAULT_LCD_COLUMNS,
            rows: rollcall_core::constants::DEFAULT_LCD_ROWS,
        }
    }
}

impl std::fmt::Display for DisplayGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}
