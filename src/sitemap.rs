use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::error::{MigrateError, Result};
use crate::utils::relative_display;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Absolute page URLs in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap {
    pub urls: Vec<String>,
}

impl Sitemap {
    /// `base_url + "/" + path relative to root`, forward slashes.
    pub fn from_paths<P: AsRef<Path>>(root: &Path, paths: &[P], base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let urls = paths
            .iter()
            .map(|p| format!("{}/{}", base, relative_display(root, p.as_ref())))
            .collect();
        Sitemap { urls }
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(render)?;
        writer
            .write_event(Event::Start(
                BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
            ))
            .map_err(render)?;
        for url in &self.urls {
            writer
                .write_event(Event::Start(BytesStart::new("url")))
                .map_err(render)?;
            writer
                .write_event(Event::Start(BytesStart::new("loc")))
                .map_err(render)?;
            writer
                .write_event(Event::Text(BytesText::new(url)))
                .map_err(render)?;
            writer
                .write_event(Event::End(BytesEnd::new("loc")))
                .map_err(render)?;
            writer
                .write_event(Event::End(BytesEnd::new("url")))
                .map_err(render)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("urlset")))
            .map_err(render)?;

        String::from_utf8(writer.into_inner()).map_err(render)
    }
}

fn render<E: std::fmt::Display>(e: E) -> MigrateError {
    MigrateError::Sitemap(e.to_string())
}

pub fn run(cfg: &MigrateConfig) -> Result<Sitemap> {
    let files = discover(&cfg.output_root, &FileFilter::html_only())?;
    let sitemap = Sitemap::from_paths(&cfg.output_root, &files, &cfg.base_url);
    info!(urls = sitemap.urls.len(), "rendering sitemap");

    let xml = sitemap.to_xml()?;
    if let Some(parent) = cfg.sitemap_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MigrateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&cfg.sitemap_path, xml).map_err(|source| MigrateError::Write {
        path: cfg.sitemap_path.clone(),
        source,
    })?;
    println!("Sitemap generated at {}", cfg.sitemap_path.display());
    Ok(sitemap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn one_url_per_document() {
        let root = Path::new("content/auto-migrated");
        let paths = [
            root.join("index.html"),
            root.join("english").join("intro.html"),
            root.join("chinese").join("物种起源.html"),
        ];
        let sitemap = Sitemap::from_paths(root, &paths, "https://bydnacoding.org/");
        let xml = sitemap.to_xml().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert_eq!(xml.matches("<url>").count(), 3);
        for loc in [
            "https://bydnacoding.org/index.html",
            "https://bydnacoding.org/english/intro.html",
            "https://bydnacoding.org/chinese/物种起源.html",
        ] {
            assert!(xml.contains(&format!("<loc>{loc}</loc>")), "{loc}");
        }
    }

    #[test]
    fn special_characters_are_escaped() {
        let sitemap = Sitemap {
            urls: vec!["https://x.org/a&b.html".to_string()],
        };
        assert!(sitemap.to_xml().unwrap().contains("<loc>https://x.org/a&amp;b.html</loc>"));
    }

    #[test]
    fn run_writes_sitemap_file() {
        let tmp = TempDir::new().unwrap();
        let cfg = MigrateConfig {
            output_root: tmp.path().join("out"),
            sitemap_path: tmp.path().join("out/sitemap.xml"),
            ..MigrateConfig::default()
        };
        fs::create_dir_all(cfg.output_root.join("other")).unwrap();
        fs::write(cfg.output_root.join("other/p.html"), "<p>x</p>").unwrap();
        fs::write(cfg.output_root.join("legacy.htm"), "<p>y</p>").unwrap();

        let sitemap = run(&cfg).unwrap();
        assert_eq!(sitemap.urls, vec!["https://bydnacoding.org/other/p.html"]);
        let xml = fs::read_to_string(&cfg.sitemap_path).unwrap();
        assert!(xml.contains("<loc>https://bydnacoding.org/other/p.html</loc>"));
    }
}
