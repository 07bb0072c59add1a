//! Display layer for the rollcall kiosk.
//!
//! [`DisplayAdapter`] fits text to a character display; [`DisplayStateMachine`]
//! decides what the kiosk shows in each phase of its life and drives the
//! adapter accordingly.

pub mod display;
pub mod state_machine;

pub use display::{Alignment, DisplayAdapter, align_text, truncate_text};
pub use state_machine::{
    DisplayState, DisplayStateMachine, DwellTimes, Screen, StateKind, StateTransition,
};
