//! Device discovery: enumeration and the open entry points.

use hidapi::HidApi;
use tracing::{debug, info};

use crate::device::DeviceTransport;
use crate::error::TransportError;
use crate::types::DeviceInfo;

/// HID device discovery over the hidapi backend.
///
/// A fresh backend handle is created per call so every operation sees the
/// current device set.
#[derive(Debug, Default, Clone, Copy)]
pub struct HidDiscovery;

impl HidDiscovery {
    pub fn new() -> Self {
        Self
    }

    /// List every HID device the backend reports (no VID/PID filter).
    pub fn enumerate(&self) -> Result<Vec<DeviceInfo>, TransportError> {
        let api = HidApi::new()?;
        let devices: Vec<DeviceInfo> = api.device_list().map(DeviceInfo::from_hid).collect();
        info!("enumerated {} HID devices", devices.len());
        Ok(devices)
    }

    /// Open a device previously returned by [`enumerate`](Self::enumerate).
    pub fn open(&self, info: &DeviceInfo) -> Result<DeviceTransport, TransportError> {
        self.open_path(&info.path)
    }

    /// Open the device at a backend path.
    pub fn open_path(&self, path: &str) -> Result<DeviceTransport, TransportError> {
        let api = HidApi::new()?;
        DeviceTransport::open(&api, path)
    }

    /// Open the first device matching a usage filter.
    pub fn open_first_by_usage(
        &self,
        usage_page: u16,
        usage: u16,
    ) -> Result<DeviceTransport, TransportError> {
        let api = HidApi::new()?;
        let info = api
            .device_list()
            .find(|d| d.usage_page() == usage_page && d.usage() == usage)
            .map(DeviceInfo::from_hid)
            .ok_or_else(|| {
                TransportError::DeviceNotFound(format!(
                    "usage {usage:#06X} on page {usage_page:#06X}"
                ))
            })?;
        debug!("usage filter matched {}", info.path);
        DeviceTransport::open(&api, &info.path)
    }

    /// Open every device matching a usage filter.
    ///
    /// Per-device failures are collected instead of aborting the sweep, so
    /// one unopenable interface doesn't hide the rest.
    pub fn open_all_by_usage(
        &self,
        usage_page: u16,
        usage: u16,
    ) -> Result<(Vec<DeviceTransport>, Vec<TransportError>), TransportError> {
        let api = HidApi::new()?;
        let matches: Vec<DeviceInfo> = api
            .device_list()
            .filter(|d| d.usage_page() == usage_page && d.usage() == usage)
            .map(DeviceInfo::from_hid)
            .collect();

        let mut transports = Vec::new();
        let mut failures = Vec::new();
        for info in &matches {
            match DeviceTransport::open(&api, &info.path) {
                Ok(transport) => transports.push(transport),
                Err(e) => failures.push(e),
            }
        }
        info!(
            "usage filter opened {}/{} devices",
            transports.len(),
            matches.len()
        );
        Ok((transports, failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_succeeds_without_devices() {
        // Passes with or without hardware attached
        let result = HidDiscovery::new().enumerate();
        assert!(result.is_ok());
    }

    #[test]
    fn open_empty_path_is_rejected() {
        let result = HidDiscovery::new().open_path("");
        assert!(matches!(result, Err(TransportError::InvalidParameter(_))));
    }

    #[test]
    fn open_missing_path_fails() {
        let result = HidDiscovery::new().open_path("/dev/hidraw-no-such-device");
        assert!(result.is_err());
    }
}
