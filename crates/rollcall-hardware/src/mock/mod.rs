//! Mock device implementations for testing and development.
//!
//! Each mock comes paired with a handle that drives or inspects it from the
//! outside, so tests can present cards and read back what was rendered while
//! the device itself is owned by the code under test.

pub mod display;
pub mod reader;

// Re-export commonly used types
pub use display::{DisplayOp, MockDisplay, MockDisplayHandle};
pub use reader::{MockCardReader, MockCardReaderHandle};
