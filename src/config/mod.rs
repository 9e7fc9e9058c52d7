pub mod load;
pub mod model;

pub use load::{check_purge_days, load_config, parse_config};
pub use model::{BackupTarget, Delays, Destination, RuntimeConfig};

pub fn print_config(cfg: &RuntimeConfig) {
    let print_destination = |name: &str, dest: &Destination| {
        println!("{}:", name);
        println!("  fs uuid: {}", dest.volume);
        println!("  mount point: {}", dest.mount_point.display());
        println!("  backup dir: {}", dest.backup_root().display());
    };
    println!("backup at: {}", cfg.backup_at.format("%H:%M"));
    println!("backup every: {} day(s)", cfg.backup_days);
    println!("keep snapshots: {} day(s)", cfg.purge_days);
    print_destination("local", &cfg.local);
    match &cfg.offsite {
        Some(offsite) => print_destination("offsite", offsite),
        None => println!("offsite: <disabled>"),
    }
    println!(
        "notify: {}",
        cfg.notify.url.as_deref().unwrap_or("<log only>")
    );
    for device in &cfg.spindown_devices {
        println!("spindown: {}", device.display());
    }
    for target in &cfg.targets {
        let excludes = if target.excludes.is_empty() {
            "<none>".to_string()
        } else {
            target.excludes.join(", ")
        };
        println!("storage: {}", target.source);
        println!("  excludes: {}", excludes);
    }
}
