//! Raw block device write/read round-trip.
//!
//! The probe writes a short payload at offset 0, rewinds, reads the same
//! number of bytes back and compares. The first bytes of the target are
//! destroyed, so point it at a scratch card only.

use mmc_error::{ToolError, ToolResult};
use mmc_hal::{is_raw_windows_drive, BlockOps, DeviceIo, DeviceKind};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

pub const DEFAULT_DEVICE: &str = "/dev/sdb";
pub const DEFAULT_PAYLOAD: &str = "Testing again, 1, 2, 3, 4...";
pub const SECTOR_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub device: PathBuf,
    pub payload: Vec<u8>,
    pub pad_to_sector: bool,
    pub dry_run: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            payload: DEFAULT_PAYLOAD.as_bytes().to_vec(),
            pad_to_sector: false,
            dry_run: false,
        }
    }
}

impl ProbeConfig {
    /// Bytes actually written: the payload, zero-padded to whole sectors if
    /// asked. Raw Windows drives reject partial sectors, so they are always
    /// padded.
    pub fn effective_payload(&self) -> Vec<u8> {
        let mut payload = self.payload.clone();
        let pad = self.pad_to_sector || is_raw_windows_drive(&self.device);
        if pad && !payload.is_empty() {
            let padded = payload.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
            payload.resize(padded, 0);
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Match,
    Mismatch { written: usize, read: usize },
    DryRun,
}

/// Write `payload` at offset 0, rewind and read it back.
///
/// A short read (device ended early) is a mismatch, not an error.
pub fn round_trip<D: DeviceIo + ?Sized>(dev: &mut D, payload: &[u8]) -> io::Result<ProbeOutcome> {
    dev.seek(SeekFrom::Start(0))?;
    dev.write_all(payload)?;
    dev.flush()?;
    dev.seek(SeekFrom::Start(0))?;

    let mut back = Vec::with_capacity(payload.len());
    (&mut *dev)
        .take(payload.len() as u64)
        .read_to_end(&mut back)?;

    if back == payload {
        Ok(ProbeOutcome::Match)
    } else {
        Ok(ProbeOutcome::Mismatch {
            written: payload.len(),
            read: back.len(),
        })
    }
}

pub fn probe<H: BlockOps + ?Sized>(hal: &H, cfg: &ProbeConfig) -> ToolResult<ProbeOutcome> {
    let payload = cfg.effective_payload();
    if payload.is_empty() {
        return Err(ToolError::ValidationFailed(
            "payload must not be empty".to_string(),
        ));
    }

    match hal.device_kind(&cfg.device)? {
        DeviceKind::Block => log::debug!("{} is a block device", cfg.device.display()),
        DeviceKind::Regular => log::warn!(
            "{} is a regular file, not a block device",
            cfg.device.display()
        ),
        DeviceKind::Other => log::warn!(
            "{} is neither a block device nor a regular file",
            cfg.device.display()
        ),
    }

    if cfg.dry_run {
        log::info!(
            "DRY RUN: would write {} bytes to {} and read them back",
            payload.len(),
            cfg.device.display()
        );
        return Ok(ProbeOutcome::DryRun);
    }

    let capacity = hal.capacity(&cfg.device)?;
    log::info!("{} has {} bytes", cfg.device.display(), capacity);
    if payload.len() as u64 > capacity {
        return Err(ToolError::ValidationFailed(format!(
            "payload of {} bytes does not fit on {} ({} bytes)",
            payload.len(),
            cfg.device.display(),
            capacity
        )));
    }

    let mut dev = hal.open_rw(&cfg.device)?;
    let outcome = round_trip(dev.as_mut(), &payload)?;
    log::debug!("round trip on {}: {:?}", cfg.device.display(), outcome);
    Ok(outcome)
}

/// Run the probe and report on `out`: `ok` on success, an error naming the
/// device otherwise.
pub fn run<H: BlockOps + ?Sized>(hal: &H, cfg: &ProbeConfig, out: &mut dyn Write) -> ToolResult<()> {
    match probe(hal, cfg)? {
        ProbeOutcome::Match => writeln!(out, "ok")?,
        ProbeOutcome::DryRun => writeln!(out, "dry run: {} left untouched", cfg.device.display())?,
        ProbeOutcome::Mismatch { written, read } => {
            return Err(ToolError::ProbeMismatch {
                device: cfg.device.display().to_string(),
                written,
                read,
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn default_config_matches_bench_setup() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.device, PathBuf::from("/dev/sdb"));
        assert_eq!(cfg.payload, b"Testing again, 1, 2, 3, 4...".to_vec());
        assert!(!cfg.dry_run);
    }

    #[test]
    fn effective_payload_pads_to_sector() {
        let cfg = ProbeConfig {
            pad_to_sector: true,
            ..ProbeConfig::default()
        };
        let payload = cfg.effective_payload();
        assert_eq!(payload.len(), SECTOR_SIZE);
        assert!(payload.starts_with(DEFAULT_PAYLOAD.as_bytes()));
        assert!(payload[DEFAULT_PAYLOAD.len()..].iter().all(|b| *b == 0));
    }

    #[test]
    fn effective_payload_keeps_whole_sectors() {
        let cfg = ProbeConfig {
            payload: vec![0xA5; SECTOR_SIZE * 2],
            pad_to_sector: true,
            ..ProbeConfig::default()
        };
        assert_eq!(cfg.effective_payload().len(), SECTOR_SIZE * 2);
    }

    #[test]
    fn raw_windows_drive_is_always_padded() {
        let cfg = ProbeConfig {
            device: PathBuf::from(r"\\.\PhysicalDrive1"),
            ..ProbeConfig::default()
        };
        assert!(!cfg.pad_to_sector);
        assert_eq!(cfg.effective_payload().len(), SECTOR_SIZE);
        assert_eq!(ProbeConfig::default().effective_payload().len(), DEFAULT_PAYLOAD.len());
    }

    #[test]
    fn round_trip_on_echoing_device_matches() {
        let mut dev = Cursor::new(vec![0u8; 64]);
        let outcome = round_trip(&mut dev, b"hello").unwrap();
        assert_eq!(outcome, ProbeOutcome::Match);
        assert_eq!(&dev.get_ref()[..5], b"hello");
    }

    #[test]
    fn round_trip_rewinds_before_writing() {
        let mut dev = Cursor::new(vec![0u8; 16]);
        dev.set_position(10);
        round_trip(&mut dev, b"abc").unwrap();
        assert_eq!(&dev.get_ref()[..3], b"abc");
    }

    #[test]
    fn round_trip_short_read_is_mismatch() {
        // Reads hit end-of-device after `limit` bytes.
        struct Short {
            inner: Cursor<Vec<u8>>,
            limit: u64,
        }
        impl Read for Short {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                let left = self.limit.saturating_sub(self.inner.position()) as usize;
                let n = buf.len().min(left);
                self.inner.read(&mut buf[..n])
            }
        }
        impl Write for Short {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.inner.write(buf)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        impl Seek for Short {
            fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
                self.inner.seek(pos)
            }
        }

        let mut dev = Short {
            inner: Cursor::new(vec![0u8; 8]),
            limit: 2,
        };
        let outcome = round_trip(&mut dev, b"abcd").unwrap();
        assert_eq!(
            outcome,
            ProbeOutcome::Mismatch {
                written: 4,
                read: 2
            }
        );
    }
}
