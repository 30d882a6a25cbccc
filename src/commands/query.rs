//! Read-only command handlers.

use super::{open_device, parse_number, CommandResult};
use hidscope_report::{bytes_to_hex, parse_report_descriptor, usage_page_name, Report};
use hidscope_transport::{DeviceInfo, HidDiscovery, TransportError};

/// List HID devices, optionally filtered by usage page/usage.
pub fn list(json: bool, usage_page: Option<&str>, usage: Option<&str>) -> CommandResult {
    let page_filter = usage_page.map(parse_number).transpose()?;
    let usage_filter = usage.map(parse_number).transpose()?;

    let devices: Vec<DeviceInfo> = HidDiscovery::new()
        .enumerate()?
        .into_iter()
        .filter(|d| page_filter.map_or(true, |p| u32::from(d.usage_page) == p))
        .filter(|d| usage_filter.map_or(true, |u| u32::from(d.usage) == u))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    println!("{} HID devices:", devices.len());
    for d in &devices {
        println!(
            "  {:04X}:{:04X} page={:04X} usage={:04X} ({}) if={} bus={:?} {} {}",
            d.vendor_id,
            d.product_id,
            d.usage_page,
            d.usage,
            usage_page_name(u32::from(d.usage_page)),
            d.interface_number,
            d.bus_type,
            d.product.as_deref().unwrap_or("-"),
            d.path,
        );
    }
    Ok(())
}

/// Show identity and strings for a single device.
pub fn info(path: &str, json: bool) -> CommandResult {
    let device = open_device(path)?;

    if json {
        let value = serde_json::json!({
            "info": device.device_info(),
            "serial_number": device.serial_number().ok().flatten(),
            "manufacturer": device.manufacturer().ok().flatten(),
            "product": device.product().ok().flatten(),
            "report_descriptor_len": device.report_descriptor().map(<[u8]>::len),
            "streaming": device.supports_streaming(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match device.device_info() {
        Some(info) => {
            println!(
                "Device: VID={:04X} PID={:04X} bus={:?}",
                info.vendor_id, info.product_id, info.bus_type
            );
            println!(
                "  Usage:      {:04X}/{:04X} ({})",
                info.usage_page,
                info.usage,
                usage_page_name(u32::from(info.usage_page))
            );
            println!("  Interface:  {}", info.interface_number);
            println!("  Release:    {:04X}", info.release_number);
        }
        None => println!("Device: {path} (no backend identity available)"),
    }

    if let Some(serial) = device.serial_number()? {
        println!("  Serial:     {serial}");
    }
    if let Some(manufacturer) = device.manufacturer()? {
        println!("  Maker:      {manufacturer}");
    }
    if let Some(product) = device.product()? {
        println!("  Product:    {product}");
    }
    match device.report_descriptor() {
        Some(descriptor) => println!("  Descriptor: {} bytes", descriptor.len()),
        None => println!("  Descriptor: unavailable"),
    }
    Ok(())
}

/// Dump and decode the report descriptor.
pub fn descriptor(path: &str, raw: bool, json: bool) -> CommandResult {
    let device = open_device(path)?;
    let Some(bytes) = device.report_descriptor() else {
        return Err(TransportError::DescriptorUnavailable.into());
    };

    let reports = parse_report_descriptor(bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if raw {
        println!("Raw descriptor ({} bytes):", bytes.len());
        for chunk in bytes.chunks(16) {
            println!("  {}", bytes_to_hex(chunk));
        }
    }

    print_report_group("Input", &reports.inputs);
    print_report_group("Output", &reports.outputs);
    print_report_group("Feature", &reports.features);
    Ok(())
}

fn print_report_group(label: &str, reports: &[Report]) {
    if reports.is_empty() {
        return;
    }
    println!("{label} reports:");
    for report in reports {
        println!(
            "  id={} bits={} bytes={}",
            report.report_id, report.num_bits, report.num_bytes
        );
        for field in &report.fields {
            let usages = if field.usages.is_empty() {
                format!("{:#04X}..{:#04X}", field.usage_minimum, field.usage_maximum)
            } else {
                field
                    .usages
                    .iter()
                    .map(|u| format!("{u:#04X}"))
                    .collect::<Vec<_>>()
                    .join(",")
            };
            println!(
                "    @{:<5} {:2}bit x{:<3} page={:#06X} ({}) usages={} logical={}..{}",
                field.bit_offset,
                field.bit_size,
                field.count,
                field.usage_page,
                usage_page_name(field.usage_page),
                usages,
                field.logical_minimum,
                field.logical_maximum,
            );
        }
    }
}
