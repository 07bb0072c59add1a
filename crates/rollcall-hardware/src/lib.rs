//! Peripheral abstraction layer for the rollcall attendance kiosk.
//!
//! This crate defines the two capabilities the kiosk control loop needs from
//! the outside world, a card reader and a character display, together with
//! the implementations that can stand behind them.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all I/O goes through native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Chosen at construction**: simulated and real adapters implement the
//!   same trait; the binary picks one from configuration and wraps it in an
//!   enum from [`devices`]. Nothing inside the control loop probes for
//!   hardware at runtime.
//! - **Error-aware**: all operations return [`Result`] with a
//!   [`HardwareError`].
//!
//! # Card Readers
//!
//! ```no_run
//! use rollcall_hardware::traits::CardReader;
//! use rollcall_hardware::Result;
//!
//! async fn poll<R: CardReader>(reader: &mut R) -> Result<()> {
//!     if let Some(card) = reader.try_read_card().await? {
//!         println!("card {card}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Implementations: [`readers::SimulatedReader`], [`readers::LineCardReader`],
//! [`mock::MockCardReader`].
//!
//! # Display Sinks
//!
//! ```no_run
//! use rollcall_hardware::traits::DisplaySink;
//! use rollcall_hardware::Result;
//!
//! async fn banner<D: DisplaySink>(display: &mut D) -> Result<()> {
//!     display.clear().await?;
//!     display.write_line("Attendance", 0).await?;
//!     display.write_line("System Ready", 1).await
//! }
//! ```
//!
//! Implementations: [`sinks::ConsoleDisplay`], [`sinks::NullDisplay`],
//! [`mock::MockDisplay`].

pub mod devices;
pub mod error;
pub mod mock;
pub mod readers;
pub mod sinks;
pub mod traits;
pub mod types;

pub use devices::{AnyCardReader, AnyDisplaySink};
pub use error::{HardwareError, Result};
pub use traits::{CardReader, DisplaySink};
pub use types::{DisplayGeometry, ReaderInfo};
