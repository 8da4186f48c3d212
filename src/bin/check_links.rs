use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{links, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting link check");

    println!("Link Check");
    println!("==========\n");

    let (stats, broken) = links::run(&cfg)?;
    stats.print();
    if !broken.is_empty() {
        info!(broken = broken.len(), "marked broken links");
    }

    println!("\nDone.");
    Ok(())
}
