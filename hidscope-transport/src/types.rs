//! Common types for the device access layer

use serde::Serialize;

/// Bus a HID device is attached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BusType {
    #[default]
    Unknown,
    Usb,
    Bluetooth,
    I2c,
    Spi,
}

impl From<hidapi::BusType> for BusType {
    fn from(bus: hidapi::BusType) -> Self {
        match bus {
            hidapi::BusType::Usb => Self::Usb,
            hidapi::BusType::Bluetooth => Self::Bluetooth,
            hidapi::BusType::I2c => Self::I2c,
            hidapi::BusType::Spi => Self::Spi,
            _ => Self::Unknown,
        }
    }
}

/// Identity of an enumerated HID device
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceInfo {
    /// Backend path used to open the device
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub release_number: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub usage_page: u16,
    pub usage: u16,
    pub interface_number: i32,
    pub bus_type: BusType,
}

impl DeviceInfo {
    pub(crate) fn from_hid(info: &hidapi::DeviceInfo) -> Self {
        Self {
            path: info.path().to_string_lossy().to_string(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            serial_number: info.serial_number().map(str::to_string),
            release_number: info.release_number(),
            manufacturer: info.manufacturer_string().map(str::to_string),
            product: info.product_string().map(str::to_string),
            usage_page: info.usage_page(),
            usage: info.usage(),
            interface_number: info.interface_number(),
            bus_type: info.bus_type().into(),
        }
    }
}

/// Payload delivered by the input-report reader thread
#[derive(Debug, Clone)]
pub enum ReadEvent {
    /// One input report, as read from the device
    Report(Vec<u8>),
    /// The reader hit a backend error and stopped
    Error(String),
}

/// Event stamped with seconds since the transport opened
#[derive(Debug, Clone)]
pub struct TimestampedEvent {
    pub timestamp: f64,
    pub event: ReadEvent,
}

impl TimestampedEvent {
    pub fn new(timestamp: f64, event: ReadEvent) -> Self {
        Self { timestamp, event }
    }
}
