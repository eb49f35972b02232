//! CLI argument parsing for the bench tools.

use crate::probe::{ProbeConfig, DEFAULT_DEVICE, DEFAULT_PAYLOAD};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array on a single line
    Json,
    /// Tab-separated, one device per line
    Table,
}

#[derive(Parser, Debug)]
#[command(name = "mmc-probe")]
#[command(about = "Write a test string to a raw device, read it back and compare")]
#[command(long_about = "Write a test string to a raw device, read it back and compare.\n\n\
    DESTRUCTIVE: the first bytes of the target device are overwritten.\n\
    Prints \"ok\" and exits 0 when the data reads back intact.")]
pub struct ProbeCli {
    /// Raw device to probe (e.g. /dev/sdb, /dev/mmcblk0, \\.\PhysicalDrive1)
    #[arg(long, default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,

    /// Test string written at offset 0
    #[arg(long, default_value = DEFAULT_PAYLOAD)]
    pub payload: String,

    /// Zero-pad the payload to whole 512-byte sectors
    #[arg(long)]
    pub pad_to_sector: bool,

    /// Check the device and log the plan without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProbeCli {
    pub fn config(&self) -> ProbeConfig {
        ProbeConfig {
            device: self.device.clone(),
            payload: self.payload.as_bytes().to_vec(),
            pad_to_sector: self.pad_to_sector,
            dry_run: self.dry_run,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "usb-enum")]
#[command(about = "List removable USB storage on this host")]
pub struct UsbEnumCli {
    /// Listing strategy: auto, windows, linux or sysfs
    #[arg(long, default_value = "auto")]
    pub platform: String,

    /// Output format for collected records
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_defaults_match_bench_script() {
        let cli = ProbeCli::try_parse_from(["mmc-probe"]).unwrap();
        assert_eq!(cli.config(), ProbeConfig::default());
    }

    #[test]
    fn probe_accepts_overrides() {
        let cli = ProbeCli::try_parse_from([
            "mmc-probe",
            "--device",
            "/dev/mmcblk0",
            "--payload",
            "xyz",
            "--pad-to-sector",
            "--dry-run",
        ])
        .unwrap();
        let cfg = cli.config();
        assert_eq!(cfg.device, PathBuf::from("/dev/mmcblk0"));
        assert_eq!(cfg.payload, b"xyz".to_vec());
        assert!(cfg.pad_to_sector);
        assert!(cfg.dry_run);
    }

    #[test]
    fn usb_enum_defaults() {
        let cli = UsbEnumCli::try_parse_from(["usb-enum"]).unwrap();
        assert_eq!(cli.platform, "auto");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.verbose);
    }

    #[test]
    fn usb_enum_rejects_unknown_format() {
        assert!(UsbEnumCli::try_parse_from(["usb-enum", "--format", "xml"]).is_err());
    }
}
