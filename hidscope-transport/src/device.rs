//! Opened-device transport: command I/O plus the background report reader.

use std::ffi::CString;
use std::sync::Mutex;

use hidapi::{HidApi, HidDevice};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::reader::InputEvents;
use crate::types::{DeviceInfo, TimestampedEvent};

/// Upper bound hidapi places on a report descriptor
pub const MAX_REPORT_DESCRIPTOR_SIZE: usize = 4096;

/// An open HID device.
///
/// The command handle is mutex-guarded for feature reports and writes. A
/// second handle on the same path, when the platform grants one, feeds a
/// dedicated reader thread whose reports arrive through
/// [`subscribe`](Self::subscribe) and [`read_event`](Self::read_event).
/// The backend identity and report descriptor are captured once at open.
pub struct DeviceTransport {
    device: Mutex<HidDevice>,
    info: Option<DeviceInfo>,
    report_descriptor: Option<Vec<u8>>,
    events: InputEvents,
}

impl DeviceTransport {
    pub(crate) fn open(api: &HidApi, path: &str) -> Result<Self, TransportError> {
        if path.is_empty() {
            return Err(TransportError::InvalidParameter(
                "empty device path".into(),
            ));
        }
        let c_path = CString::new(path).map_err(|_| {
            TransportError::InvalidParameter("device path contains a NUL byte".into())
        })?;

        let device = api.open_path(&c_path)?;

        let report_descriptor = {
            let mut buf = vec![0u8; MAX_REPORT_DESCRIPTOR_SIZE];
            match device.get_report_descriptor(&mut buf) {
                Ok(len) if len > 0 => {
                    buf.truncate(len);
                    Some(buf)
                }
                Ok(_) => None,
                Err(e) => {
                    debug!("no report descriptor for {}: {}", path, e);
                    None
                }
            }
        };

        let info = device
            .get_device_info()
            .ok()
            .map(|i| DeviceInfo::from_hid(&i));

        // Second handle on the same path for the reader thread. Streaming is
        // simply unavailable when the platform refuses another open.
        let input_device = api.open_path(&c_path).ok();
        if input_device.is_none() {
            debug!("no input handle for {}; streaming disabled", path);
        }
        let events = InputEvents::new(input_device);

        info!("opened HID device {}", path);
        Ok(Self {
            device: Mutex::new(device),
            info,
            report_descriptor,
            events,
        })
    }

    /// Write an output report. Byte 0 is the report id (0 when unnumbered).
    pub fn write(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        if bytes.is_empty() {
            return Err(TransportError::InvalidParameter("empty write".into()));
        }
        let device = self.device.lock().unwrap();
        let written = device.write(bytes)?;
        if written == 0 {
            return Err(TransportError::WriteFailed(
                "device accepted no data".into(),
            ));
        }
        debug!("wrote {} bytes", written);
        Ok(written)
    }

    /// Send a feature report. Byte 0 is the report id.
    pub fn send_feature_report(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.is_empty() {
            return Err(TransportError::InvalidParameter(
                "empty feature report".into(),
            ));
        }
        let device = self.device.lock().unwrap();
        device.send_feature_report(bytes)?;
        debug!("sent {}-byte feature report", bytes.len());
        Ok(())
    }

    /// Fetch a feature report of `size` payload bytes.
    ///
    /// The returned buffer includes the report id byte and is truncated to
    /// what the device actually produced.
    pub fn get_feature_report(
        &self,
        report_id: u8,
        size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; size + 1];
        buf[0] = report_id;
        let device = self.device.lock().unwrap();
        let len = device.get_feature_report(&mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    pub fn serial_number(&self) -> Result<Option<String>, TransportError> {
        Ok(self.device.lock().unwrap().get_serial_number_string()?)
    }

    pub fn manufacturer(&self) -> Result<Option<String>, TransportError> {
        Ok(self.device.lock().unwrap().get_manufacturer_string()?)
    }

    pub fn product(&self) -> Result<Option<String>, TransportError> {
        Ok(self.device.lock().unwrap().get_product_string()?)
    }

    /// Report descriptor captured at open time.
    pub fn report_descriptor(&self) -> Option<&[u8]> {
        self.report_descriptor.as_deref()
    }

    /// Backend identity captured at open time.
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.info.as_ref()
    }

    /// Probe the device with a string query.
    pub fn is_connected(&self) -> bool {
        self.device.lock().unwrap().get_product_string().is_ok()
    }

    /// Whether input reports can be streamed from this device.
    pub fn supports_streaming(&self) -> bool {
        self.events.has_reader()
    }

    /// Poll one input report with a millisecond deadline.
    pub fn read_event(&self, timeout_ms: u32) -> Option<TimestampedEvent> {
        self.events.read_event(timeout_ms)
    }

    /// Subscribe to the input-report broadcast.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<TimestampedEvent>> {
        self.events.subscribe()
    }

    /// Stop the reader thread. Dropping the transport does the same; the
    /// command handle closes on drop.
    pub fn close(&self) {
        self.events.stop();
    }
}
