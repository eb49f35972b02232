use clap::Parser;
use mmc_tools::cli::ProbeCli;
use mmc_tools::{logging, probe, HostHal};

fn main() -> anyhow::Result<()> {
    let cli = ProbeCli::parse();
    logging::init(cli.verbose);

    let cfg = cli.config();
    let hal = HostHal::new();
    let mut stdout = std::io::stdout().lock();

    if let Err(err) = probe::run(&hal, &cfg, &mut stdout) {
        if err.is_os_error() {
            log::error!("OS error while probing {}", cfg.device.display());
        }
        return Err(err.into());
    }
    Ok(())
}
