//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: read-only commands (list, info, descriptor)
//! - `io`: report exchange (read, write, feature get/set)
//! - `track`: virtual-axis tracking over parsed input reports
//! - `doctor`: platform link requirements and manifest validation

pub mod doctor;
pub mod io;
pub mod query;
pub mod track;

use anyhow::{Context, Result};
use hidscope_transport::{DeviceTransport, HidDiscovery};

/// Result type for command handlers
pub type CommandResult = Result<()>;

/// Open a device by path for a command handler.
pub fn open_device(path: &str) -> Result<DeviceTransport> {
    HidDiscovery::new()
        .open_path(path)
        .with_context(|| format!("failed to open HID device {path}"))
}

/// Parse a numeric CLI argument, accepting "0x.." hex or decimal.
pub fn parse_number(arg: &str) -> Result<u32> {
    let value = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        arg.parse()
    };
    value.with_context(|| format!("'{arg}' is not a number (use decimal or 0x-prefixed hex)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_parse_as_decimal_or_hex() {
        assert_eq!(parse_number("10").unwrap(), 10);
        assert_eq!(parse_number("0x10").unwrap(), 16);
        assert_eq!(parse_number("0X0A").unwrap(), 10);
        assert!(parse_number("ten").is_err());
        assert!(parse_number("0xZZ").is_err());
    }
}
