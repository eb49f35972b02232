//! Removable USB storage enumeration.
//!
//! A [`DeviceLister`] is chosen once per run from the host [`Platform`]
//! (see [`listers::lister_for`]) and driven by [`enumerate`].
//!
//! [`Platform`]: crate::platform::Platform

pub mod listers;
pub mod lsusb;

use crate::cli::OutputFormat;
use lsusb::UsbDevice;
use mmc_error::ToolResult;
use mmc_hal::sysfs::block::BlockDeviceInfo;
use serde::Serialize;
use std::io::{self, Write};

/// Called with each entry a streaming lister finds, in order.
pub type FoundFn<'a> = &'a mut dyn FnMut(&str) -> io::Result<()>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    /// Drive roots such as `E:\`, already reported through the callback.
    Drives(Vec<String>),
    Usb(Vec<UsbDevice>),
    Block(Vec<BlockDeviceInfo>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Drives(v) => v.len(),
            Listing::Usb(v) => v.len(),
            Listing::Block(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every entry was printed while listing.
    pub fn is_streamed(&self) -> bool {
        matches!(self, Listing::Drives(_))
    }
}

pub trait DeviceLister {
    /// Line printed before anything else.
    fn header(&self) -> Option<&'static str> {
        None
    }

    fn list(&self, on_found: FoundFn<'_>) -> ToolResult<Listing>;
}

/// Run `lister` and print its results on `out`.
///
/// Streaming listers print each entry as it is found; the others print the
/// whole collection at once, after listing has finished.
pub fn enumerate(
    lister: &dyn DeviceLister,
    format: OutputFormat,
    out: &mut dyn Write,
) -> ToolResult<Listing> {
    if let Some(header) = lister.header() {
        writeln!(out, "{header}")?;
    }
    let listing = lister.list(&mut |entry| writeln!(out, "{entry}"))?;
    if !listing.is_streamed() {
        render(&listing, format, out)?;
    }
    Ok(listing)
}

pub fn render(listing: &Listing, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, listing)?;
            writeln!(out)
        }
        OutputFormat::Table => {
            match listing {
                Listing::Drives(roots) => {
                    for root in roots {
                        writeln!(out, "{root}")?;
                    }
                }
                Listing::Usb(devices) => {
                    for dev in devices {
                        writeln!(out, "{}\t{}\t{}", dev.device, dev.id, dev.tag)?;
                    }
                }
                Listing::Block(disks) => {
                    for disk in disks {
                        let label = [disk.vendor.as_deref(), disk.model.as_deref()]
                            .into_iter()
                            .flatten()
                            .collect::<Vec<_>>()
                            .join(" ");
                        writeln!(
                            out,
                            "{}\t{}\t{}",
                            disk.dev_path.display(),
                            disk.size_bytes,
                            label
                        )?;
                    }
                }
            }
            Ok(())
        }
    }
}
