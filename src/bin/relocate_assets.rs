use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{assets, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting asset relocation");

    println!("Page Asset Relocation");
    println!("=====================\n");
    println!("Source root: {:?}", cfg.source_root);
    println!("Destination: {:?}\n", cfg.source_root.join(&cfg.page_assets_dir));

    let (stats, _) = assets::run(&cfg)?;
    stats.print();

    println!("\nDone.");
    Ok(())
}
