use mmc_error::ToolError;
use mmc_hal::{DriveType, FakeHal};
use mmc_tools::cli::OutputFormat;
use mmc_tools::platform::Platform;
use mmc_tools::usb::listers::{self, RemovableDriveLister, UsbBusLister, LSUSB};
use mmc_tools::usb::{self, DeviceLister, Listing};
use std::process::Command;

const LSUSB_OUTPUT: &str = "\
Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub
Bus 001 Device 004: ID 0781:5567 SanDisk Corp. Cruzer Blade

Bus 002 Device 004 ID 1234:5678 Generic USB Device
";

fn enumerate_to_string(lister: &dyn DeviceLister, format: OutputFormat) -> (Listing, String) {
    let mut out = Vec::new();
    let listing = usb::enumerate(lister, format, &mut out).unwrap();
    (listing, String::from_utf8(out).unwrap())
}

#[test]
fn lsusb_records_are_printed_at_once_as_json() {
    let hal = FakeHal::new().with_command_output(LSUSB, LSUSB_OUTPUT);
    let (listing, out) = enumerate_to_string(&UsbBusLister::new(hal), OutputFormat::Json);

    assert_eq!(listing.len(), 3);
    assert_eq!(out.lines().count(), 1);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[2]["device"], "/dev/bus/usb/002/004");
    assert_eq!(parsed[2]["id"], "1234:5678");
    assert_eq!(parsed[2]["tag"], "Generic USB Device");
}

#[test]
fn lsusb_failure_halts_without_a_list() {
    let hal = FakeHal::new().with_command_failure(LSUSB, 1, "unable to initialize libusb: -99");
    let mut out = Vec::new();

    let err = usb::enumerate(&UsbBusLister::new(hal), OutputFormat::Json, &mut out).unwrap_err();

    assert!(err.is_os_error());
    assert!(out.is_empty());
}

#[test]
fn removable_drives_are_printed_under_a_header() {
    let hal = FakeHal::new()
        .with_drive('C', DriveType::Fixed)
        .with_drive('D', DriveType::CdRom)
        .with_drive('E', DriveType::Removable)
        .with_drive('G', DriveType::Removable);
    let (listing, out) =
        enumerate_to_string(&RemovableDriveLister::new(hal), OutputFormat::Json);

    assert_eq!(out, "Windows USB devices:\nE:\\\nG:\\\n");
    assert_eq!(
        listing,
        Listing::Drives(vec!["E:\\".to_string(), "G:\\".to_string()])
    );
}

#[test]
fn listing_twice_gives_identical_output() {
    let hal = FakeHal::new().with_command_output(LSUSB, LSUSB_OUTPUT);
    let lister = UsbBusLister::new(hal.clone());

    let (_, first) = enumerate_to_string(&lister, OutputFormat::Table);
    let (_, second) = enumerate_to_string(&lister, OutputFormat::Table);

    assert_eq!(first, second);
    assert_eq!(hal.operation_count(), 2);
}

#[test]
fn unsupported_platform_has_no_lister() {
    let err = listers::lister_for(&Platform::from_selector("amiga"))
        .err()
        .unwrap();
    assert!(matches!(err, ToolError::UnsupportedPlatform(_)));
    assert!(err.to_string().starts_with("Unknown OS, exiting"));
}

#[test]
fn binary_exits_non_zero_on_unknown_platform() {
    let output = Command::new(env!("CARGO_BIN_EXE_usb-enum"))
        .args(["--platform", "amiga"])
        .output()
        .expect("failed to run usb-enum binary");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown OS, exiting"), "stderr was: {stderr}");
}
