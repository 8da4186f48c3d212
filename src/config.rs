use std::path::PathBuf;

use config::Config;
use serde::Deserialize;

use crate::error::Result;

const CONFIG_FILE: &str = "site_migrate";
const ENV_PREFIX: &str = "SITE";

/// Every location and canonical reference the scripts rely on.
///
/// Defaults match the layout of the migrated site, so a script run with no
/// `site_migrate.toml` and no `SITE_*` variables works from the repository root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub layout_path: PathBuf,
    pub default_title: String,
    pub title_placeholder: String,
    pub content_placeholder: String,
    pub exclude_prefixes: Vec<String>,
    pub stylesheet_path: String,
    pub script_path: String,
    pub images_dir: PathBuf,
    pub images_url: String,
    pub base_url: String,
    pub sitemap_path: PathBuf,
    pub styling_roots: Vec<PathBuf>,
    pub page_assets_dir: PathBuf,
    pub document_lang: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        MigrateConfig {
            source_root: PathBuf::from("."),
            output_root: PathBuf::from("content/auto-migrated"),
            layout_path: PathBuf::from("layouts/base.html"),
            default_title: "DNA Decoding Science Alliance".to_string(),
            title_placeholder: "{% block title %}DNA Decoding Science Alliance{% endblock %}"
                .to_string(),
            content_placeholder: "{% block content %}{% endblock %}".to_string(),
            exclude_prefixes: ["assets", "layouts", "content", "node_modules", "tools"]
                .into_iter()
                .map(String::from)
                .collect(),
            stylesheet_path: "/assets/css/main.css".to_string(),
            script_path: "/assets/js/main.js".to_string(),
            images_dir: PathBuf::from("assets/images"),
            images_url: "/assets/images".to_string(),
            base_url: "https://bydnacoding.org".to_string(),
            sitemap_path: PathBuf::from("content/auto-migrated/sitemap.xml"),
            styling_roots: [
                "content/auto-migrated",
                "content/chinese",
                "content/english",
                "content/multilingual",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            page_assets_dir: PathBuf::from("src/page-assets"),
            document_lang: "zh".to_string(),
        }
    }
}

impl MigrateConfig {
    /// Layer `site_migrate.toml` (optional) under `SITE_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Reference written into HTML for an image copied into `images_dir`.
    pub fn image_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.images_url.trim_end_matches('/'), file_name)
    }
}
