use anyhow::Result;
use site_migrate::utils::init_tracing;
use site_migrate::{sitemap, MigrateConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cfg = MigrateConfig::load()?;
    info!(settings = ?cfg, msg = "Starting sitemap generation");

    println!("Sitemap Generation");
    println!("==================\n");
    println!("Base URL: {}\n", cfg.base_url);

    let sitemap = sitemap::run(&cfg)?;
    println!("  -> {} urls", sitemap.urls.len());

    println!("\nDone.");
    Ok(())
}
