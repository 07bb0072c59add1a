//! Mock card reader for testing and development.
//!
//! Cards are queued through a [`MockCardReaderHandle`]; every poll of the
//! reader takes at most one queued event. A card queued once is seen by
//! exactly one poll, so "the card stays in the field" is simulated by
//! queueing it repeatedly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rollcall_core::CardId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::traits::CardReader;
use crate::types::ReaderInfo;
use crate::{HardwareError, Result};

/// Mock card reader.
///
/// # Examples
///
/// ```
/// use rollcall_hardware::mock::MockCardReader;
/// use rollcall_hardware::traits::CardReader;
///
/// #[tokio::main]
/// async fn main() -> rollcall_hardware::Result<()> {
///     let (mut reader, handle) = MockCardReader::new();
///
///     assert_eq!(reader.try_read_card().await?, None);
///
///     handle.present_card("1234567890")?;
///     let card = reader.try_read_card().await?.unwrap();
///     assert_eq!(card.as_str(), "1234567890");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    /// Channel receiver for reader events
    event_rx: mpsc::UnboundedReceiver<ReaderEvent>,

    /// Device name
    name: String,

    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    polls: AtomicUsize,
    closed: AtomicBool,
}

/// Internal event type for mock card reader.
#[derive(Debug, Clone)]
enum ReaderEvent {
    Card(CardId),
    Fault(String),
}

impl MockCardReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns the reader and the handle used to drive it.
    pub fn new() -> (Self, MockCardReaderHandle) {
        Self::with_name("Mock Card Reader")
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockCardReaderHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::default());

        let reader = Self {
            event_rx,
            name: name.into(),
            shared: Arc::clone(&shared),
        };

        let handle = MockCardReaderHandle { event_tx, shared };

        (reader, handle)
    }

    fn resolve(&self, event: ReaderEvent) -> Result<CardId> {
        match event {
            ReaderEvent::Card(card) => Ok(card),
            ReaderEvent::Fault(message) => Err(HardwareError::card_read(message)),
        }
    }
}

impl CardReader for MockCardReader {
    async fn try_read_card(&mut self) -> Result<Option<CardId>> {
        self.shared.polls.fetch_add(1, Ordering::SeqCst);

        match self.event_rx.try_recv() {
            Ok(event) => self.resolve(event).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected(self.name.clone())),
        }
    }

    async fn wait_for_card(&mut self) -> Result<CardId> {
        let event = self
            .event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(self.name.clone()))?;
        self.resolve(event)
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::simulated(self.name.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.event_rx.close();
        Ok(())
    }
}

/// Handle for controlling a mock card reader.
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    /// Channel sender for reader events
    event_tx: mpsc::UnboundedSender<ReaderEvent>,

    shared: Arc<Shared>,
}

impl MockCardReaderHandle {
    /// Queue a card for the next poll.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid card id or the reader has been
    /// dropped.
    pub fn present_card(&self, id: &str) -> Result<()> {
        let card = CardId::new(id)?;
        self.send(ReaderEvent::Card(card))
    }

    /// Make the next poll fail with a card read error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub fn fail_next_read(&self, message: impl Into<String>) -> Result<()> {
        self.send(ReaderEvent::Fault(message.into()))
    }

    /// Number of `try_read_card` calls made so far.
    pub fn poll_count(&self) -> usize {
        self.shared.polls.load(Ordering::SeqCst)
    }

    /// Whether the reader has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .map_err(|_| HardwareError::disconnected("Mock card reader"))
    }
}
