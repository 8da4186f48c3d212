use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{minify, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting minification");

    println!("Minify HTML");
    println!("===========\n");

    let (stats, tracker) = minify::run(&cfg)?;
    tracker.print();
    stats.print();

    println!("\nDone.");
    Ok(())
}
