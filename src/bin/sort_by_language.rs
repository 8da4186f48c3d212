use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{language, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting language sort");

    println!("Sort by Language");
    println!("================\n");

    let stats = language::run(&cfg)?;
    stats.print();

    println!("\nDone.");
    Ok(())
}
