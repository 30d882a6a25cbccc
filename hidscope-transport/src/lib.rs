//! HID device access layer
//!
//! A thin facade over the native `hidapi` backend: enumerate devices, open
//! them, stream input reports from a background reader thread, and exchange
//! output and feature reports. The native link requirements of the backend
//! are modeled in [`platform`].
//!
//! Report descriptor decoding lives in the sibling `hidscope-report` crate;
//! this crate only hands descriptors over as raw bytes.

pub mod device;
pub mod discovery;
pub mod error;
pub mod platform;
pub mod reader;
pub mod types;

pub use device::{DeviceTransport, MAX_REPORT_DESCRIPTOR_SIZE};
pub use discovery::HidDiscovery;
pub use error::TransportError;
pub use platform::{NativeLinkSpec, PlatformError, PlatformTarget};
pub use reader::InputEvents;
pub use types::{BusType, DeviceInfo, ReadEvent, TimestampedEvent};
