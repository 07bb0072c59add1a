//! Reader used when no card hardware is attached.

use std::time::Duration;

use rollcall_core::CardId;
use tracing::debug;

use crate::Result;
use crate::traits::CardReader;
use crate::types::ReaderInfo;

/// Card id handed out by [`SimulatedReader::wait_for_card`].
pub const SIMULATED_CARD_ID: &str = "1234567890";

/// Delay before [`SimulatedReader::wait_for_card`] returns.
const SIMULATED_WAIT: Duration = Duration::from_secs(1);

/// Reader with no hardware behind it.
///
/// Polling never finds a card, so a kiosk running on this reader sits at the
/// ready screen. Blocking reads pretend a fixed card was presented after a
/// short delay, which is enough to exercise a display or backend by hand.
#[derive(Debug, Default)]
pub struct SimulatedReader {
    closed: bool,
}

impl SimulatedReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl CardReader for SimulatedReader {
    async fn try_read_card(&mut self) -> Result<Option<CardId>> {
        Ok(None)
    }

    async fn wait_for_card(&mut self) -> Result<CardId> {
        tokio::time::sleep(SIMULATED_WAIT).await;
        Ok(CardId::new(SIMULATED_CARD_ID)?)
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::simulated("Simulated Reader")
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Simulated reader closed");
        self.closed = true;
        Ok(())
    }
}
