use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{styling, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting styling");

    println!("Apply Modern Styling");
    println!("====================\n");

    let (stats, tracker) = styling::run(&cfg)?;
    tracker.print();
    stats.print();

    println!(
        "\nCompleted! Updated {} files with modern styling ({}).",
        stats.changed, cfg.stylesheet_path
    );
    Ok(())
}
