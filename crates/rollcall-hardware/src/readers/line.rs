//! Line-oriented card reader.
//!
//! Most USB card readers present themselves as a keyboard (or a serial port)
//! and "type" the card id followed by a newline. This reader consumes such a
//! stream on a dedicated thread and buffers complete ids, so polling it never
//! waits on I/O.
//!
//! The thread is detached. A read blocked on a quiet tty or pipe cannot be
//! interrupted, so closing the reader only disconnects the channel; the
//! thread exits on its next line or end of input, or with the process.
//!
//! ```text
//! ┌──────────────┐  lines   ┌────────────┐  try_recv  ┌────────────┐
//! │ stdin / tty  │─────────►│ read thread│───────────►│ controller │
//! └──────────────┘          └────────────┘   (mpsc)   └────────────┘
//! ```

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::thread;

use rollcall_core::CardId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::traits::CardReader;
use crate::types::ReaderInfo;
use crate::{HardwareError, Result};

/// Ids buffered between the read thread and the controller.
const LINE_BUFFER: usize = 16;

/// Reader fed by newline-terminated card ids.
#[derive(Debug)]
pub struct LineCardReader {
    name: String,
    card_rx: mpsc::Receiver<CardId>,
    exhausted: bool,
}

impl LineCardReader {
    /// Start reading card ids from `source` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the thread cannot be
    /// spawned.
    pub fn spawn<R>(name: impl Into<String>, source: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let name = name.into();
        let (card_tx, card_rx) = mpsc::channel(LINE_BUFFER);

        let thread_name = name.clone();
        thread::Builder::new()
            .name(format!("card-reader-{name}"))
            .spawn(move || read_lines(&thread_name, source, &card_tx))
            .map_err(|e| {
                HardwareError::initialization_failed(format!("{name}: reader thread: {e}"))
            })?;

        Ok(Self {
            name,
            card_rx,
            exhausted: false,
        })
    }

    /// Read card ids typed on standard input.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the reader thread
    /// cannot be spawned.
    pub fn stdin() -> Result<Self> {
        Self::spawn("stdin", std::io::stdin())
    }

    /// Read card ids from a device node such as `/dev/ttyUSB0`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the device cannot be
    /// opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            HardwareError::initialization_failed(format!("{}: {e}", path.display()))
        })?;
        info!("Reading card ids from {}", path.display());
        Self::spawn(path.display().to_string(), file.into_std().await)
    }

    fn mark_exhausted(&mut self) {
        if !self.exhausted {
            warn!("Card source {} reached end of input", self.name);
            self.exhausted = true;
        }
    }
}

fn read_lines<R: Read>(name: &str, source: R, card_tx: &mpsc::Sender<CardId>) {
    for line in BufReader::new(source).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("{name}: ignoring line that is not UTF-8");
                continue;
            }
            Err(e) => {
                warn!("{name}: read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match CardId::new(&line) {
            Ok(card) => {
                debug!("{name}: read card {card}");
                if card_tx.blocking_send(card).is_err() {
                    break;
                }
            }
            Err(e) => warn!("{name}: ignoring unreadable card id: {e}"),
        }
    }
    debug!("{name}: read thread exiting");
}

impl CardReader for LineCardReader {
    async fn try_read_card(&mut self) -> Result<Option<CardId>> {
        match self.card_rx.try_recv() {
            Ok(card) => Ok(Some(card)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                // The source closed; the kiosk keeps running with no cards.
                self.mark_exhausted();
                Ok(None)
            }
        }
    }

    async fn wait_for_card(&mut self) -> Result<CardId> {
        match self.card_rx.recv().await {
            Some(card) => Ok(card),
            None => {
                self.mark_exhausted();
                Err(HardwareError::disconnected(self.name.clone()))
            }
        }
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::hardware(self.name.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.card_rx.close();
        debug!("Card source {} closed", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reads_newline_terminated_ids() {
        let source: &[u8] = b"1234567890\n04ABCDEF\r\n";
        let mut reader = LineCardReader::spawn("test", source).unwrap();

        assert_eq!(reader.wait_for_card().await.unwrap().as_str(), "1234567890");
        assert_eq!(reader.wait_for_card().await.unwrap().as_str(), "04ABCDEF");
    }

    #[tokio::test]
    async fn test_blank_and_invalid_lines_are_skipped() {
        let source: &[u8] = b"\n   \n12\x0734\n\xff\xfe\n42\n";
        let mut reader = LineCardReader::spawn("test", source).unwrap();

        assert_eq!(reader.wait_for_card().await.unwrap().as_str(), "42");
    }

    #[tokio::test]
    async fn test_non_ascii_ids_are_kept() {
        let source: &[u8] = "caf\u{e9}-7\n".as_bytes();
        let mut reader = LineCardReader::spawn("test", source).unwrap();

        assert_eq!(reader.wait_for_card().await.unwrap().as_str(), "caf\u{e9}-7");
    }

    #[tokio::test]
    async fn test_try_read_does_not_wait() {
        let (source, _writer) = std::io::pipe().unwrap();
        let mut reader = LineCardReader::spawn("test", source).unwrap();

        assert_eq!(reader.try_read_card().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_try_read_returns_buffered_card() {
        let (source, mut writer) = std::io::pipe().unwrap();
        let mut reader = LineCardReader::spawn("test", source).unwrap();

        writer.write_all(b"584190\n").unwrap();
        let card = reader.wait_for_card().await.unwrap();
        assert_eq!(card.as_str(), "584190");

        writer.write_all(b"584191\n").unwrap();
        let mut polled = None;
        for _ in 0..200 {
            polled = reader.try_read_card().await.unwrap();
            if polled.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(polled.unwrap().as_str(), "584191");
    }

    #[tokio::test]
    async fn test_end_of_input_yields_no_cards() {
        let source: &[u8] = b"";
        let mut reader = LineCardReader::spawn("test", source).unwrap();

        assert!(matches!(
            reader.wait_for_card().await,
            Err(HardwareError::Disconnected { .. })
        ));
        assert_eq!(reader.try_read_card().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_missing_device_fails() {
        let result = LineCardReader::open("/nonexistent/rollcall-reader").await;
        assert!(matches!(
            result,
            Err(HardwareError::InitializationFailed { .. })
        ));
    }

    /// A source that never produces a line must not keep the runtime alive
    /// once the reader is closed.
    #[test]
    fn test_close_with_idle_source_lets_runtime_shut_down() {
        let (source, writer) = std::io::pipe().unwrap();
        let (done_tx, done_rx) = std_mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let mut reader = LineCardReader::spawn("idle", source).unwrap();
                assert_eq!(reader.try_read_card().await.unwrap(), None);
                reader.close().await.unwrap();
            });
            drop(runtime);
            done_tx.send(()).unwrap();
        });

        let finished = done_rx.recv_timeout(Duration::from_secs(5));
        drop(writer);
        assert!(finished.is_ok(), "runtime did not shut down after close");
    }
}
