//! HID report machinery: descriptor parsing and field extraction
//!
//! This crate is pure data plumbing — it never talks to a device. Feed it a
//! report descriptor obtained from the transport layer and it produces the
//! per-report field layout; feed it raw report bytes and a layout and it
//! extracts bitmasks, integers, and normalized analog values.

pub mod descriptor;
pub mod fields;
pub mod hex;
pub mod usage;

pub use descriptor::{
    parse_report_descriptor, DescriptorError, DescriptorReports, Report, ReportField,
};
pub use fields::{
    locate_usage, map_range_clamped, parse_analog, parse_analog_by_usage, parse_bitmask,
    parse_signed, parse_signed_by_usage, parse_unsigned, parse_unsigned_by_usage, FieldError,
    FieldLocation,
};
pub use hex::{bytes_to_hex, hex_to_bytes, hex_to_u32, u32_to_hex, HexError};
pub use usage::usage_page_name;
