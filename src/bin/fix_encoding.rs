use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{encoding, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting encoding fix");

    println!("Fix Page Encoding");
    println!("=================\n");
    println!("Source root: {:?}\n", cfg.source_root);

    let (stats, tracker) = encoding::run(&cfg)?;
    tracker.print();
    stats.print();

    println!("\nFixed {} out of {} files", stats.changed, stats.scanned);
    println!("\nDone.");
    Ok(())
}
