//! Virtual-axis tracking over parsed input reports.
//!
//! Each `--field PAGE:USAGE[:kind]` spec is located in the device's input
//! report layout once, then every incoming report is parsed and coalesced
//! through the virtual-input snapshot: one printed line per report, wide
//! fields as axes, 1-bit fields as buttons.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use tokio::sync::broadcast::error::TryRecvError;

use super::{open_device, parse_number, CommandResult};
use hidscope::vinput::{InputEvent, VirtualInputState};
use hidscope_report::{
    locate_usage, parse_analog, parse_report_descriptor, parse_signed, parse_unsigned,
    FieldLocation,
};
use hidscope_transport::{ReadEvent, TransportError};

/// How a tracked field's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FieldKind {
    #[default]
    Analog,
    Unsigned,
    Signed,
}

impl FromStr for FieldKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analog" => Ok(Self::Analog),
            "unsigned" => Ok(Self::Unsigned),
            "signed" => Ok(Self::Signed),
            other => Err(anyhow!(
                "unknown field kind '{other}' (expected analog, unsigned, or signed)"
            )),
        }
    }
}

struct TrackedField {
    kind: FieldKind,
    location: FieldLocation,
}

fn parse_field_spec(spec: &str) -> Result<(u32, u32, FieldKind), anyhow::Error> {
    let mut parts = spec.split(':');
    let page = parts.next().unwrap_or_default();
    let Some(usage) = parts.next() else {
        bail!("field spec '{spec}' is missing a usage (expected PAGE:USAGE[:kind])");
    };
    let kind = match parts.next() {
        Some(kind) => kind.parse()?,
        None => FieldKind::default(),
    };
    if parts.next().is_some() {
        bail!("field spec '{spec}' has trailing parts");
    }
    Ok((parse_number(page)?, parse_number(usage)?, kind))
}

pub fn track(path: &str, specs: &[String], out_min: f32, out_max: f32) -> CommandResult {
    let device = open_device(path)?;
    let Some(descriptor) = device.report_descriptor() else {
        return Err(TransportError::DescriptorUnavailable.into());
    };
    let reports = parse_report_descriptor(descriptor)?;

    let mut fields = Vec::with_capacity(specs.len());
    for (slot, spec) in specs.iter().enumerate() {
        let (usage_page, usage, kind) = parse_field_spec(spec)?;
        let location = locate_usage(&reports.inputs, usage_page, usage).ok_or_else(|| {
            anyhow!("usage {usage:#06X} on page {usage_page:#06X} not found in input reports")
        })?;
        println!(
            "Field {slot}: page={usage_page:#06X} usage={usage:#06X} -> bit {} width {}",
            location.bit_offset, location.bit_size
        );
        fields.push(TrackedField { kind, location });
    }

    let Some(mut rx) = device.subscribe() else {
        eprintln!("Device does not expose an input handle for streaming");
        return Ok(());
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let mut snapshot = VirtualInputState::new();
    println!("Tracking {} fields (Ctrl-C to stop)...", fields.len());

    while running.load(Ordering::SeqCst) {
        match rx.try_recv() {
            Ok(timestamped) => {
                let timestamp = timestamped.timestamp;
                match timestamped.event {
                    ReadEvent::Report(bytes) => {
                        apply_report(&bytes, &fields, &mut snapshot, out_min, out_max);
                        let events = snapshot.drain();
                        if !events.is_empty() {
                            let line = events
                                .iter()
                                .map(format_event)
                                .collect::<Vec<_>>()
                                .join("  ");
                            println!("[{timestamp:10.3}] {line}");
                        }
                    }
                    ReadEvent::Error(message) => {
                        eprintln!("read error: {message}");
                        break;
                    }
                }
            }
            Err(TryRecvError::Empty) => std::thread::sleep(Duration::from_millis(1)),
            Err(TryRecvError::Lagged(n)) => eprintln!("(lagged by {n} reports)"),
            Err(TryRecvError::Closed) => break,
        }
    }
    device.close();
    Ok(())
}

/// Parse every tracked field out of one report into the snapshot.
fn apply_report(
    bytes: &[u8],
    fields: &[TrackedField],
    snapshot: &mut VirtualInputState,
    out_min: f32,
    out_max: f32,
) {
    for (slot, field) in fields.iter().enumerate() {
        let slot = slot as u8;
        let location = field.location;

        // 1-bit fields are buttons regardless of the requested kind
        if location.bit_size == 1 {
            if parse_unsigned(bytes, location.bit_offset, 1) != 0 {
                snapshot.press_button(0, slot);
            } else {
                snapshot.release_button(0, slot);
            }
            continue;
        }

        let value = match field.kind {
            FieldKind::Analog => parse_analog(
                bytes,
                location.bit_offset,
                location.bit_size,
                location.logical_minimum,
                location.logical_maximum,
                out_min,
                out_max,
            ),
            FieldKind::Unsigned => {
                parse_unsigned(bytes, location.bit_offset, location.bit_size) as f32
            }
            FieldKind::Signed => parse_signed(bytes, location.bit_offset, location.bit_size) as f32,
        };
        snapshot.set_axis(0, slot, value);
    }
}

fn format_event(event: &InputEvent) -> String {
    match event {
        InputEvent::Axis { slot, value, .. } => format!("axis{slot}={value:+.3}"),
        InputEvent::ButtonPressed { slot, .. } => format!("button{slot}+"),
        InputEvent::ButtonReleased { slot, .. } => format!("button{slot}-"),
    }
}
