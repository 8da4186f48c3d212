use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{images, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting image extraction");

    println!("Image Extraction");
    println!("================\n");
    println!("Images directory: {:?}\n", cfg.images_dir);

    let stats = images::run(&cfg)?;
    stats.print();

    println!("\nDone.");
    Ok(())
}
