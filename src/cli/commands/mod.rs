pub mod backup;
pub mod daemon;
pub mod offsite;
pub mod purge;

use std::path::Path;

use crate::config::{load_config, print_config, RuntimeConfig};
use crate::device::SystemDevices;
use crate::error::{BackuperError, DeviceError, Result};
use crate::notify::NtfyNotifier;
use crate::scheduler::clock::{SystemClock, ThreadSleeper};
use crate::scheduler::Services;
use crate::types::RunMode;
use crate::util::command::SystemRunner;

pub fn exit_for_error(err: &BackuperError) -> ! {
    let code = match err {
        BackuperError::Config(_) => 2,
        BackuperError::Device(DeviceError::NotPresent(_)) => 10,
        _ => 1,
    };
    println!("{}", err);
    std::process::exit(code);
}

/// Wires the real collaborators and hands them to `f`.
pub fn with_services<T>(
    cfg: &RuntimeConfig,
    run_mode: RunMode,
    skip_delays: bool,
    f: impl FnOnce(Services<'_>) -> Result<T>,
) -> Result<T> {
    let runner = SystemRunner::new(run_mode);
    let devices = SystemDevices::new(&runner);
    let notifier = NtfyNotifier::new(&cfg.notify, run_mode)?;
    let clock = SystemClock;
    let sleeper = ThreadSleeper::new(skip_delays);
    f(Services {
        runner: &runner,
        devices: &devices,
        notifier: &notifier,
        clock: &clock,
        sleeper: &sleeper,
        run_mode,
    })
}

pub fn show_config(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    println!("config: {}", config_path.display());
    print_config(&cfg);
    Ok(())
}
