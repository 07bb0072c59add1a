//! Shared fixture for control-loop tests: a controller wired to mock
//! peripherals and an in-memory backend.

#![allow(dead_code)]

use std::time::Duration;

use rollcall_core::Timings;
use rollcall_hardware::mock::{
    DisplayOp, MockCardReader, MockCardReaderHandle, MockDisplay, MockDisplayHandle,
};
use rollcall_hardware::types::DisplayGeometry;
use rollcall_kiosk::AttendanceController;
use rollcall_network::mock::MockBackend;
use tokio_util::sync::CancellationToken;

pub const ALICE_CARD: &str = "1234567890";
pub const BOB_CARD: &str = "0987654321";

pub type TestController = AttendanceController<MockCardReader, MockDisplay, MockBackend>;

pub struct Kiosk {
    pub controller: TestController,
    pub reader: MockCardReaderHandle,
    pub display: MockDisplayHandle,
    pub backend: MockBackend,
    pub shutdown: CancellationToken,
}

impl Kiosk {
    /// Kiosk with default timings and a directory holding Alice (signed
    /// out) and Bob (signed in).
    pub fn new() -> Self {
        Self::with_timings(Timings::default())
    }

    pub fn with_timings(timings: Timings) -> Self {
        let (reader, reader_handle) = MockCardReader::new();
        let (display, display_handle) = MockDisplay::new(DisplayGeometry::default());
        let backend = MockBackend::new();
        backend.add_user(ALICE_CARD, "Alice", false);
        backend.add_user(BOB_CARD, "Bob", true);

        let controller = AttendanceController::new(reader, display, backend.clone(), timings);
        let shutdown = controller.shutdown_token();

        Self {
            controller,
            reader: reader_handle,
            display: display_handle,
            backend,
            shutdown,
        }
    }
}

/// Number of times `line1` was written to the first row.
pub fn times_shown(display: &MockDisplayHandle, line1: &str) -> usize {
    display
        .ops()
        .iter()
        .filter(|op| matches!(op, DisplayOp::Write { line: 0, text } if text.trim() == line1))
        .count()
}

/// Default startup banner dwell; the backend is checked right after it.
pub const STARTUP: Duration = Duration::from_secs(2);

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
