use std::path::Path;

/// Install the fmt subscriber, honouring `RUST_LOG` and falling back to `info`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

/// Lowercase ASCII slug: every run of characters outside `[a-z0-9]` becomes one `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Display form of `path` relative to `root`, with forward slashes.
pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Origin of Species_files"), "origin-of-species-files");
        assert_eq!(slugify("--H2  Chapter__3--"), "h2-chapter-3");
        assert_eq!(slugify("物种起源"), "");
    }

    #[test]
    fn relative_display_uses_forward_slashes() {
        let root = Path::new("content/auto-migrated");
        let path = root.join("english").join("intro.html");
        assert_eq!(relative_display(root, &path), "english/intro.html");
    }
}
