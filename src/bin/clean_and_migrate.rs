use anyhow::{Context, Result};
use site_migrate::utils::init_tracing;
use site_migrate::{migrate, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting migration");

    println!("Clean and Migrate");
    println!("=================\n");
    println!("Layout: {:?}", cfg.layout_path);
    println!("Output: {:?}\n", cfg.output_root);

    let (stats, tracker) = migrate::run(&cfg).context("migration aborted")?;
    tracker.print();
    stats.print();

    println!("\nDone.");
    Ok(())
}
