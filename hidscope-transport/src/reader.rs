//! Background input-report reader.
//!
//! A dedicated thread reads input reports from its own device handle and
//! broadcasts them, timestamped, to any number of subscribers. The thread
//! exits when the owning transport drops or when the backend read fails;
//! the failure is surfaced to subscribers as a final [`ReadEvent::Error`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hidapi::HidDevice;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::types::{ReadEvent, TimestampedEvent};

/// Broadcast capacity for input reports
const CHANNEL_CAPACITY: usize = 256;

/// Read slice in milliseconds; bounds how often the shutdown flag is checked
const READ_TIMEOUT_MS: i32 = 100;

/// Largest input report the backend can hand back
const READ_BUFFER_SIZE: usize = 0xFFFF;

/// Owns the reader thread lifecycle and its broadcast channel.
pub struct InputEvents {
    event_tx: Option<broadcast::Sender<TimestampedEvent>>,
    shutdown: Arc<AtomicBool>,
}

impl InputEvents {
    /// Spawn a reader thread for `input_device` when one is available.
    pub(crate) fn new(input_device: Option<HidDevice>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let event_tx = input_device.map(|input| {
            let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
            let tx_clone = tx.clone();
            let shutdown_clone = shutdown.clone();

            std::thread::Builder::new()
                .name("hid-report-reader".into())
                .spawn(move || run_reader_loop(input, tx_clone, shutdown_clone))
                .expect("failed to spawn HID report reader thread");

            tx
        });

        Self { event_tx, shutdown }
    }

    /// Poll one event with a millisecond deadline.
    ///
    /// `None` on timeout, or when the device exposed no input handle.
    pub fn read_event(&self, timeout_ms: u32) -> Option<TimestampedEvent> {
        let tx = self.event_tx.as_ref()?;
        let mut rx = tx.subscribe();
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        loop {
            match rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Empty) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Subscribe to the report broadcast.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<TimestampedEvent>> {
        self.event_tx.as_ref().map(|tx| tx.subscribe())
    }

    /// Whether a reader thread was started for this device.
    pub fn has_reader(&self) -> bool {
        self.event_tx.is_some()
    }

    /// Ask the reader thread to exit.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

impl Drop for InputEvents {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_reader_loop(
    input_device: HidDevice,
    tx: broadcast::Sender<TimestampedEvent>,
    shutdown: Arc<AtomicBool>,
) {
    debug!("report reader thread started");
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let start_time = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        match input_device.read_timeout(&mut buf, READ_TIMEOUT_MS) {
            Ok(len) if len > 0 => {
                let timestamp = start_time.elapsed().as_secs_f64();
                debug!(
                    "report reader got {} bytes at {:.3}s: {:02X?}",
                    len,
                    timestamp,
                    &buf[..len.min(16)]
                );
                let _ = tx.send(TimestampedEvent::new(
                    timestamp,
                    ReadEvent::Report(buf[..len].to_vec()),
                ));
            }
            Ok(_) => {
                // Timeout, no data - loop continues to check shutdown
            }
            Err(e) => {
                warn!("report reader error, stopping: {}", e);
                let timestamp = start_time.elapsed().as_secs_f64();
                let _ = tx.send(TimestampedEvent::new(
                    timestamp,
                    ReadEvent::Error(e.to_string()),
                ));
                break;
            }
        }
    }

    debug!("report reader thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_input_device_there_are_no_events() {
        let events = InputEvents::new(None);
        assert!(!events.has_reader());
        assert!(events.subscribe().is_none());
        assert!(events.read_event(0).is_none());
    }
}
