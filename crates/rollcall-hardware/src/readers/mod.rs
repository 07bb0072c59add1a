//! Card reader implementations.

pub mod line;
pub mod simulated;

pub use line::LineCardReader;
pub use simulated::SimulatedReader;
