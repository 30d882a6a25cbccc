//! HID report descriptor parsing.
//!
//! Walks the descriptor item stream and produces, per report id, the ordered
//! field layout of every input, output, and feature report. Collections are
//! traversed but do not affect field placement.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Global item tags (prefix bits 7..4 when the item type is Global)
mod global_item {
    pub const USAGE_PAGE: u8 = 0x0;
    pub const LOGICAL_MINIMUM: u8 = 0x1;
    pub const LOGICAL_MAXIMUM: u8 = 0x2;
    pub const PHYSICAL_MINIMUM: u8 = 0x3;
    pub const PHYSICAL_MAXIMUM: u8 = 0x4;
    pub const UNIT_EXPONENT: u8 = 0x5;
    pub const UNIT: u8 = 0x6;
    pub const REPORT_SIZE: u8 = 0x7;
    pub const REPORT_ID: u8 = 0x8;
    pub const REPORT_COUNT: u8 = 0x9;
    pub const PUSH: u8 = 0xA;
    pub const POP: u8 = 0xB;
}

/// Local item tags
mod local_item {
    pub const USAGE: u8 = 0x0;
    pub const USAGE_MINIMUM: u8 = 0x1;
    pub const USAGE_MAXIMUM: u8 = 0x2;
}

/// Main item tags
mod main_item {
    pub const INPUT: u8 = 0x8;
    pub const OUTPUT: u8 = 0x9;
    pub const FEATURE: u8 = 0xB;
}

const ITEM_TYPE_MAIN: u8 = 0;
const ITEM_TYPE_GLOBAL: u8 = 1;
const ITEM_TYPE_LOCAL: u8 = 2;

/// Long item prefix (tag 0xF, type reserved, size 2)
const LONG_ITEM_PREFIX: u8 = 0xFE;

/// Errors from descriptor parsing
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor item at offset {offset} runs past the end of the data")]
    UnexpectedEnd { offset: usize },

    #[error("global state pop at offset {offset} with no pushed state")]
    GlobalStackUnderflow { offset: usize },
}

/// One Input/Output/Feature main item with the state that applied to it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportField {
    /// Bit position inside the report payload (report id byte excluded)
    pub bit_offset: u32,
    /// Width of a single element
    pub bit_size: u32,
    /// Number of elements
    pub count: u32,
    pub usage_page: u32,
    /// Explicitly listed usages, in declaration order
    pub usages: Vec<u32>,
    pub usage_minimum: u32,
    pub usage_maximum: u32,
    pub logical_minimum: i64,
    pub logical_maximum: i64,
    pub physical_minimum: i64,
    pub physical_maximum: i64,
    pub unit_exponent: i64,
    pub unit: u32,
}

/// Field layout of one report id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub report_id: u32,
    pub num_bits: u32,
    pub num_bytes: u32,
    pub fields: Vec<ReportField>,
}

/// Parsed descriptor, split by report direction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptorReports {
    pub inputs: Vec<Report>,
    pub outputs: Vec<Report>,
    pub features: Vec<Report>,
}

#[derive(Debug, Clone, Default)]
struct GlobalState {
    usage_page: u32,
    logical_minimum: i64,
    logical_maximum: i64,
    physical_minimum: i64,
    physical_maximum: i64,
    unit_exponent: i64,
    unit: u32,
    report_size: u32,
    report_id: u32,
    report_count: u32,
}

#[derive(Debug, Clone, Default)]
struct LocalState {
    usages: Vec<u32>,
    usage_minimum: u32,
    usage_maximum: u32,
}

/// Parse a report descriptor into per-report field layouts.
pub fn parse_report_descriptor(data: &[u8]) -> Result<DescriptorReports, DescriptorError> {
    let mut global_stack = vec![GlobalState::default()];
    let mut local = LocalState::default();
    let mut reports = DescriptorReports::default();

    let mut offset = 0usize;
    while offset < data.len() {
        let prefix = data[offset];
        offset += 1;

        // Long items carry their own size byte after the prefix. The HID
        // spec defines no long item tags, so the payload is skipped.
        if prefix == LONG_ITEM_PREFIX {
            if offset + 2 > data.len() {
                return Err(DescriptorError::UnexpectedEnd { offset });
            }
            let long_size = data[offset] as usize;
            if offset + 2 + long_size > data.len() {
                return Err(DescriptorError::UnexpectedEnd { offset });
            }
            debug!("skipping {}-byte long item at offset {}", long_size, offset);
            offset += 2 + long_size;
            continue;
        }

        let item_size = match prefix & 0x3 {
            3 => 4,
            n => n as usize,
        };
        let item_type = (prefix >> 2) & 0x3;
        let item_tag = (prefix >> 4) & 0xF;

        if offset + item_size > data.len() {
            return Err(DescriptorError::UnexpectedEnd { offset });
        }
        let payload = &data[offset..offset + item_size];
        offset += item_size;

        let unsigned = read_unsigned(payload);
        let signed = read_signed(payload);

        match item_type {
            ITEM_TYPE_MAIN => {
                let global = global_stack.last().expect("state stack is never empty");
                match item_tag {
                    main_item::INPUT => append_field(&mut reports.inputs, global, &local),
                    main_item::OUTPUT => append_field(&mut reports.outputs, global, &local),
                    main_item::FEATURE => append_field(&mut reports.features, global, &local),
                    // Collection / End Collection and reserved tags
                    _ => {}
                }
                local = LocalState::default();
            }
            ITEM_TYPE_GLOBAL => {
                let top = global_stack.last_mut().expect("state stack is never empty");
                match item_tag {
                    global_item::USAGE_PAGE => top.usage_page = unsigned as u32,
                    global_item::LOGICAL_MINIMUM => top.logical_minimum = signed,
                    global_item::LOGICAL_MAXIMUM => top.logical_maximum = signed,
                    global_item::PHYSICAL_MINIMUM => top.physical_minimum = signed,
                    global_item::PHYSICAL_MAXIMUM => top.physical_maximum = signed,
                    global_item::UNIT_EXPONENT => top.unit_exponent = signed,
                    global_item::UNIT => top.unit = unsigned as u32,
                    global_item::REPORT_SIZE => top.report_size = unsigned as u32,
                    global_item::REPORT_ID => top.report_id = unsigned as u32,
                    global_item::REPORT_COUNT => top.report_count = unsigned as u32,
                    global_item::PUSH => {
                        let copy = top.clone();
                        global_stack.push(copy);
                    }
                    global_item::POP => {
                        if global_stack.len() <= 1 {
                            return Err(DescriptorError::GlobalStackUnderflow { offset });
                        }
                        global_stack.pop();
                    }
                    _ => {}
                }
            }
            ITEM_TYPE_LOCAL => match item_tag {
                local_item::USAGE => local.usages.push(unsigned as u32),
                local_item::USAGE_MINIMUM => local.usage_minimum = unsigned as u32,
                local_item::USAGE_MAXIMUM => local.usage_maximum = unsigned as u32,
                // Designators, strings, and delimiters don't affect layout
                _ => {}
            },
            _ => {}
        }
    }

    Ok(reports)
}

/// Little-endian unsigned reading of a 0/1/2/4-byte item payload
fn read_unsigned(payload: &[u8]) -> u64 {
    let mut value = 0u64;
    for (index, byte) in payload.iter().enumerate() {
        value |= u64::from(*byte) << (index * 8);
    }
    value
}

/// Sign-extended reading of a 0/1/2/4-byte item payload
fn read_signed(payload: &[u8]) -> i64 {
    match payload.len() {
        1 => i64::from(payload[0] as i8),
        2 => i64::from(i16::from_le_bytes([payload[0], payload[1]])),
        4 => i64::from(i32::from_le_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        _ => 0,
    }
}

/// Append one field to the report with the current report id, creating the
/// report on first use. Fields accumulate in encounter order.
fn append_field(reports: &mut Vec<Report>, global: &GlobalState, local: &LocalState) {
    let index = match reports.iter().position(|r| r.report_id == global.report_id) {
        Some(index) => index,
        None => {
            reports.push(Report {
                report_id: global.report_id,
                ..Report::default()
            });
            reports.len() - 1
        }
    };
    let report = &mut reports[index];

    report.fields.push(ReportField {
        bit_offset: report.num_bits,
        bit_size: global.report_size,
        count: global.report_count,
        usage_page: global.usage_page,
        usages: local.usages.clone(),
        usage_minimum: local.usage_minimum,
        usage_maximum: local.usage_maximum,
        logical_minimum: global.logical_minimum,
        logical_maximum: global.logical_maximum,
        physical_minimum: global.physical_minimum,
        physical_maximum: global.physical_maximum,
        unit_exponent: global.unit_exponent,
        unit: global.unit,
    });

    report.num_bits += global.report_size * global.report_count;
    report.num_bytes = (report.num_bits + 7) / 8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::hex_to_bytes;

    /// Feature-only descriptor of a lighting controller (page 0x59) with
    /// seven numbered feature reports.
    const LAMP_ARRAY_DESCRIPTOR: &str = "
05 59 09 01 A1 01 09 02 A1 02 85 01 09 03 15 00 27 FF FF 00 00 75 10 95 01 B1 03 09 04 09 05 09
06 09 07 09 08 15 00 27 FF FF FF 7F 75 20 95 05 B1 03 C0 09 20 A1 02 85 02 09 21 15 00 27 FF FF
00 00 75 10 95 01 B1 02 C0 09 22 A1 02 85 03 09 21 15 00 27 FF FF 00 00 75 10 95 01 B1 02 09 23
09 24 09 25 09 27 09 26 15 00 27 FF FF FF 7F 75 20 95 05 B1 02 09 28 09 29 09 2A 09 2C 09 2D 15
00 26 FF 00 75 08 95 05 B1 02 C0 09 50 A1 02 85 04 09 03 09 55 15 00 25 08 75 08 95 02 B1 02 09
21 15 00 27 FF FF 00 00 75 10 95 08 B1 02 09 51 09 52 09 53 09 51 09 52 09 53 09 51 09 52 09 53
09 51 09 52 09 53 09 51 09 52 09 53 09 51 09 52 09 53 09 51 09 52 09 53 09 51 09 52 09 53 15 00
26 FF 00 75 08 95 18 B1 02 C0 09 60 A1 02 85 05 09 55 15 00 25 08 75 08 95 01 B1 02 09 61 09 62
15 00 27 FF FF 00 00 75 10 95 02 B1 02 09 51 09 52 09 53 15 00 26 FF 00 75 08 95 03 B1 02 C0 09
70 A1 02 85 06 09 71 15 00 25 01 75 08 95 01 B1 02 C0 85 07 06 00 FF 09 02 15 00 26 FF 00 75 08
95 3F B1 02 C0
";

    #[test]
    fn parses_feature_only_lamp_array_descriptor() {
        let bytes = hex_to_bytes(LAMP_ARRAY_DESCRIPTOR).unwrap();
        let reports = parse_report_descriptor(&bytes).unwrap();

        assert_eq!(reports.inputs.len(), 0);
        assert_eq!(reports.outputs.len(), 0);
        assert_eq!(reports.features.len(), 7);

        let ids: Vec<u32> = reports.features.iter().map(|r| r.report_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);

        let num_bytes: Vec<u32> = reports.features.iter().map(|r| r.num_bytes).collect();
        assert_eq!(num_bytes, vec![22, 2, 27, 42, 8, 1, 63]);
    }

    #[test]
    fn field_state_is_captured_per_main_item() {
        let bytes = hex_to_bytes(LAMP_ARRAY_DESCRIPTOR).unwrap();
        let reports = parse_report_descriptor(&bytes).unwrap();

        // Report 1, first item: usage 0x03, 16-bit, logical 0..0xFFFF
        let first = &reports.features[0].fields[0];
        assert_eq!(first.usage_page, 0x59);
        assert_eq!(first.usages, vec![0x03]);
        assert_eq!(first.bit_offset, 0);
        assert_eq!(first.bit_size, 16);
        assert_eq!(first.count, 1);
        assert_eq!(first.logical_minimum, 0);
        assert_eq!(first.logical_maximum, 0xFFFF);

        // Report 1, second item: five 32-bit values after the 16-bit field
        let second = &reports.features[0].fields[1];
        assert_eq!(second.usages, vec![0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(second.bit_offset, 16);
        assert_eq!(second.bit_size, 32);
        assert_eq!(second.count, 5);
        assert_eq!(second.logical_maximum, 0x7FFF_FFFF);

        // Report 7 switches to a vendor page
        let vendor = &reports.features[6].fields[0];
        assert_eq!(vendor.usage_page, 0xFF00);
        assert_eq!(vendor.bit_size, 8);
        assert_eq!(vendor.count, 0x3F);
    }

    #[test]
    fn unnumbered_input_report_accumulates_offsets() {
        // Usage page 1, 8-bit X and Y plus an 8-button bitmap
        let bytes = hex_to_bytes(
            "05 01 09 30 09 31 15 81 25 7F 75 08 95 02 81 02 \
             05 09 19 01 29 08 15 00 25 01 75 01 95 08 81 02",
        )
        .unwrap();
        let reports = parse_report_descriptor(&bytes).unwrap();

        assert_eq!(reports.inputs.len(), 1);
        let report = &reports.inputs[0];
        assert_eq!(report.report_id, 0);
        assert_eq!(report.num_bits, 24);
        assert_eq!(report.num_bytes, 3);

        assert_eq!(report.fields[0].usages, vec![0x30, 0x31]);
        assert_eq!(report.fields[0].logical_minimum, -127);
        assert_eq!(report.fields[0].logical_maximum, 127);
        assert_eq!(report.fields[1].bit_offset, 16);
        assert_eq!(report.fields[1].usage_minimum, 1);
        assert_eq!(report.fields[1].usage_maximum, 8);
    }

    #[test]
    fn push_duplicates_and_pop_restores_global_state() {
        // page 1, size 8, count 1; push; page 9; input; pop; input
        let bytes =
            hex_to_bytes("05 01 75 08 95 01 A4 05 09 09 01 81 02 B4 09 02 81 02").unwrap();
        let reports = parse_report_descriptor(&bytes).unwrap();

        let report = &reports.inputs[0];
        assert_eq!(report.fields.len(), 2);
        // Pushed frame kept the size/count set before the push
        assert_eq!(report.fields[0].usage_page, 0x09);
        assert_eq!(report.fields[0].bit_size, 8);
        // Pop restored the original page
        assert_eq!(report.fields[1].usage_page, 0x01);
        assert_eq!(report.num_bits, 16);
    }

    #[test]
    fn local_state_resets_after_each_main_item() {
        // Two inputs; the second declares no usages of its own
        let bytes = hex_to_bytes("05 01 09 30 75 08 95 01 81 02 81 02").unwrap();
        let reports = parse_report_descriptor(&bytes).unwrap();

        let report = &reports.inputs[0];
        assert_eq!(report.fields[0].usages, vec![0x30]);
        assert!(report.fields[1].usages.is_empty());
    }

    #[test]
    fn truncated_item_payload_is_an_error() {
        // Report Size prefix (0x75) expects one payload byte
        assert_eq!(
            parse_report_descriptor(&[0x75]),
            Err(DescriptorError::UnexpectedEnd { offset: 1 })
        );
        // Four-byte logical maximum with only two bytes left
        assert!(matches!(
            parse_report_descriptor(&[0x27, 0xFF, 0xFF]),
            Err(DescriptorError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn pop_without_push_is_an_error() {
        assert_eq!(
            parse_report_descriptor(&[0xB4]),
            Err(DescriptorError::GlobalStackUnderflow { offset: 1 })
        );
    }

    #[test]
    fn empty_descriptor_parses_to_nothing() {
        let reports = parse_report_descriptor(&[]).unwrap();
        assert!(reports.inputs.is_empty());
        assert!(reports.outputs.is_empty());
        assert!(reports.features.is_empty());
    }
}
