//! Report exchange command handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::TryRecvError;

use super::{open_device, parse_number, CommandResult};
use hidscope_report::{bytes_to_hex, hex_to_bytes};
use hidscope_transport::{ReadEvent, TimestampedEvent};

/// Stream input reports until Ctrl-C, or wait once when `timeout` is given.
pub fn read(path: &str, timeout: Option<u64>) -> CommandResult {
    let device = open_device(path)?;

    if let Some(ms) = timeout {
        match device.read_event(u32::try_from(ms).context("timeout too large")?) {
            Some(event) => print_event(&event),
            None => println!("(no report within {ms} ms)"),
        }
        return Ok(());
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

    println!("Reading input reports (Ctrl-C to stop)...");
    while running.load(Ordering::SeqCst) {
        match rx.try_recv() {
            Ok(event) => {
                let failed = matches!(event.event, ReadEvent::Error(_));
                print_event(&event);
                if failed {
                    break;
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

fn print_event(event: &TimestampedEvent) {
    match &event.event {
        ReadEvent::Report(bytes) => {
            println!("[{:10.3}] {}", event.timestamp, bytes_to_hex(bytes));
        }
        ReadEvent::Error(message) => {
            eprintln!("[{:10.3}] read error: {message}", event.timestamp);
        }
    }
}

/// Write an output report parsed from a hex string.
pub fn write(path: &str, hex: &str) -> CommandResult {
    let bytes = hex_to_bytes(hex)?;
    let device = open_device(path)?;
    let written = device.write(&bytes)?;
    println!("Wrote {written} bytes");
    Ok(())
}

/// Read a feature report.
pub fn feature_get(path: &str, report_id: &str, size: usize, json: bool) -> CommandResult {
    let report_id = u8::try_from(parse_number(report_id)?).context("report id must fit a byte")?;
    let device = open_device(path)?;
    let bytes = device.get_feature_report(report_id, size)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "report_id": report_id, "data": bytes })
        );
    } else {
        println!(
            "Feature report {report_id:#04X} ({} bytes): {}",
            bytes.len(),
            bytes_to_hex(&bytes)
        );
    }
    Ok(())
}

/// Send a feature report parsed from a hex string.
pub fn feature_set(path: &str, hex: &str) -> CommandResult {
    let bytes = hex_to_bytes(hex)?;
    let device = open_device(path)?;
    device.send_feature_report(&bytes)?;
    println!("Sent {} bytes", bytes.len());
    Ok(())
}
