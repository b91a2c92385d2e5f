use log::{error, info};
use std::error::Error;
use viosock::config::{Config, ProbeConfig, find_config_file};
use viosock::logger;

/// Opens the viosock device, prints the guest CID, and exits.
fn main() -> Result<(), Box<dyn Error>> {
    let config_path = find_config_file();
    let cfg = Config::load(&config_path)?;

    // Keep logger alive for the duration of the process.
    let _logger = logger::init_logger(&cfg.logging)?;
    info!("Configuration resolved from {}", config_path.display());

    run(&cfg.probe)
}

#[cfg(windows)]
fn run(settings: &ProbeConfig) -> Result<(), Box<dyn Error>> {
    use viosock::VioSockDevice;
    use viosock::probe::run_probe;

    let device = VioSockDevice::native();
    match run_probe(&device, settings) {
        Ok(report) => {
            println!("open status: {}", report.open_status);
            println!("guest CID:   {}", report.config.guest_cid);
            Ok(())
        }
        Err(e) => {
            error!("Probe failed: {e}");
            Err(e.into())
        }
    }
}

#[cfg(not(windows))]
fn run(_settings: &ProbeConfig) -> Result<(), Box<dyn Error>> {
    error!("The viosock device only exists on Windows guests");
    Err("viosock device is not available on this platform".into())
}
