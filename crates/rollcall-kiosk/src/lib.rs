//! Control loop for the rollcall attendance kiosk.
//!
//! An [`AttendanceController`] owns one card reader, one display and one
//! backend client. It shows a startup banner, waits for the backend to come
//! up, then polls the reader: every accepted card is looked up, toggled
//! (sign-in if the user is out, sign-out if in), and the result is shown for
//! a few seconds before the kiosk is ready for the next card.
//!
//! # Example
//!
//! ```no_run
//! use rollcall_core::KioskConfig;
//! use rollcall_kiosk::{AttendanceController, devices};
//! use rollcall_network::{BackendConfig, HttpBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KioskConfig::from_env()?;
//! let reader = devices::open_reader(&config.reader).await?;
//! let display = devices::open_display(&config)?;
//! let backend = HttpBackend::new(BackendConfig::from(&config))?;
//!
//! let mut controller = AttendanceController::new(reader, display, backend, config.timings);
//! let shutdown = controller.shutdown_token();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     shutdown.cancel();
//! });
//!
//! controller.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod debounce;
pub mod devices;
pub mod error;
pub mod processing;

pub use controller::{AttendanceController, PollResult};
pub use debounce::Debouncer;
pub use error::{KioskError, Result};
pub use processing::process_card;
