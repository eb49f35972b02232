use clap::Parser;
use mmc_tools::cli::UsbEnumCli;
use mmc_tools::logging;
use mmc_tools::platform::Platform;
use mmc_tools::usb::{self, listers};

fn main() -> anyhow::Result<()> {
    let cli = UsbEnumCli::parse();
    logging::init(cli.verbose);

    let platform = Platform::from_selector(&cli.platform);
    log::info!("Listing removable devices: {}", platform);

    let lister = listers::lister_for(&platform)?;
    let mut stdout = std::io::stdout().lock();
    let listing = usb::enumerate(lister.as_ref(), cli.format, &mut stdout)?;
    log::debug!("{} entries listed", listing.len());
    Ok(())
}
