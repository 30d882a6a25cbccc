// CLI definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hidscope")]
#[command(author, version, about = "HID device inspection and access tool")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit machine-readable JSON where supported
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List HID devices
    #[command(visible_aliases = ["ls", "enumerate"])]
    List {
        /// Only devices with this usage page (hex or decimal)
        #[arg(long)]
        usage_page: Option<String>,

        /// Only devices with this usage (hex or decimal)
        #[arg(long)]
        usage: Option<String>,
    },

    /// Show identity and strings for one device
    #[command(visible_alias = "i")]
    Info {
        /// Device path as shown by `list`
        path: String,
    },

    /// Dump and decode a device's report descriptor
    #[command(visible_aliases = ["desc", "d"])]
    Descriptor {
        /// Device path as shown by `list`
        path: String,

        /// Also print the raw descriptor bytes as hex
        #[arg(long)]
        raw: bool,
    },

    /// Stream input reports until Ctrl-C
    #[command(visible_aliases = ["monitor", "r"])]
    Read {
        /// Device path as shown by `list`
        path: String,

        /// Wait for a single report for this many milliseconds, then exit
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Write an output report from a hex string
    #[command(visible_alias = "w")]
    Write {
        /// Device path as shown by `list`
        path: String,

        /// Payload, e.g. "00 01 FF" or "0x0001ff" (byte 0 is the report id)
        hex: String,
    },

    /// Exchange feature reports
    #[command(subcommand)]
    Feature(FeatureCommands),

    /// Track usages across input reports as virtual axes and buttons
    #[command(visible_alias = "t")]
    Track {
        /// Device path as shown by `list`
        path: String,

        /// Field spec PAGE:USAGE[:analog|unsigned|signed], repeatable
        /// (hex or decimal, e.g. "0x01:0x30:analog")
        #[arg(long = "field", required = true)]
        fields: Vec<String>,

        /// Analog output minimum
        #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
        min: f32,

        /// Analog output maximum
        #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
        max: f32,
    },

    /// Show native backend requirements and validate the module manifest
    Doctor {
        /// Platform target to describe (defaults to the host)
        #[arg(long)]
        target: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum FeatureCommands {
    /// Read a feature report
    #[command(visible_alias = "g")]
    Get {
        /// Device path as shown by `list`
        path: String,

        /// Report id (hex or decimal)
        report_id: String,

        /// Payload size in bytes (a report id byte is added on top)
        size: usize,
    },

    /// Send a feature report
    #[command(visible_alias = "s")]
    Set {
        /// Device path as shown by `list`
        path: String,

        /// Payload, e.g. "01 A0 00" (byte 0 is the report id)
        hex: String,
    },
}
