//! Display sink implementations.

pub mod console;
pub mod null;

pub use console::ConsoleDisplay;
pub use null::NullDisplay;
