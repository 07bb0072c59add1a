//! Backend client for the rollcall attendance kiosk.
//!
//! The kiosk talks to a small REST backend: a health probe, a user lookup by
//! card id, and sign-in / sign-out toggles. [`AttendanceBackend`] is the
//! capability the controller depends on; [`HttpBackend`] implements it over
//! HTTP with `reqwest`, and [`mock::MockBackend`] implements it in memory for
//! tests.
//!
//! # Example
//!
//! ```no_run
//! use rollcall_core::{CardId, KioskConfig};
//! use rollcall_network::{AttendanceBackend, BackendConfig, HttpBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KioskConfig::from_env()?;
//! let backend = HttpBackend::new(BackendConfig::from(&config))?;
//!
//! backend.health().await?;
//! let card = CardId::new("1234567890")?;
//! let user = backend.lookup_user(&card).await?;
//! println!("{} is signed in: {}", user.name, user.logged_in);
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: the controller decides when to try again
//! - **Bounded calls**: every request carries its own timeout
//! - **Typed failures**: every transport and protocol failure is a distinct
//!   [`BackendError`] variant, so callers can map them without string matching

mod backend;
mod error;
mod http;
pub mod mock;

pub use backend::AttendanceBackend;
pub use error::{BackendError, Result};
pub use http::{BackendConfig, HttpBackend};
