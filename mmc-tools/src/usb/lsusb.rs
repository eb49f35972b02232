//! Parser for `lsusb` output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `Bus 002 Device 004: ID 1234:5678 Generic USB Device`
static LSUSB_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^Bus\s+(?P<bus>\d+)\s+Device\s+(?P<device>\d+).+ID\s(?P<id>\w+:\w+)\s(?P<tag>.+)$",
    )
    .expect("lsusb line pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbDevice {
    /// Device node, `/dev/bus/usb/<bus>/<device>`.
    pub device: String,
    /// `vendor:product`, as printed.
    pub id: String,
    pub tag: String,
}

pub fn parse_line(line: &str) -> Option<UsbDevice> {
    let caps = LSUSB_LINE.captures(line)?;
    Some(UsbDevice {
        device: format!("/dev/bus/usb/{}/{}", &caps["bus"], &caps["device"]),
        id: caps["id"].to_string(),
        tag: caps["tag"].to_string(),
    })
}

/// Parse every line of `lsusb` output, silently skipping lines that don't
/// have the bus/device/ID shape.
pub fn parse_lsusb(output: &str) -> Vec<UsbDevice> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                log::debug!("skipping lsusb line {:?}", line);
            }
            parsed
        })
        .collect()
}
