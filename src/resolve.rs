//! Tolerant scanning of `<a href>` and `<img src>` references.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

static ANCHOR_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*>").unwrap());
static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\s[^>]*>").unwrap());
static HREF_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\shref\s*=\s*(?:"([^">]*)"|'([^'>]*)')"#).unwrap());
static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^">]*)"|'([^'>]*)')"#).unwrap());
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// One attribute value found inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub value: String,
    /// Byte range of the whole opening tag in the scanned text.
    pub tag: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub source: PathBuf,
    pub raw: String,
    pub target: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub source: PathBuf,
    pub raw: String,
    pub target: Option<PathBuf>,
}

pub fn anchor_hrefs(html: &str) -> Vec<Reference> {
    scan(html, &ANCHOR_TAG_RE, &HREF_ATTR_RE)
}

pub fn image_srcs(html: &str) -> Vec<Reference> {
    scan(html, &IMG_TAG_RE, &SRC_ATTR_RE)
}

/// First quoted attribute of every matching tag. Unquoted values are ignored.
fn scan(html: &str, tag_re: &Regex, attr_re: &Regex) -> Vec<Reference> {
    tag_re
        .find_iter(html)
        .filter_map(|tag| {
            let caps = attr_re.captures(tag.as_str())?;
            let value = caps.get(1).or_else(|| caps.get(2))?;
            Some(Reference {
                value: value.as_str().to_string(),
                tag: tag.range(),
            })
        })
        .collect()
}

/// Scheme-prefixed (`http:`, `mailto:`, `javascript:`, `data:`),
/// protocol-relative, fragment-only and empty references never touch the
/// local filesystem.
pub fn is_external(reference: &str) -> bool {
    let reference = reference.trim();
    reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("//")
        || SCHEME_RE.is_match(reference)
}

pub fn strip_query_and_fragment(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

/// Local path a relative reference points at, seen from `dir`.
///
/// Percent-escapes are decoded; a reference that does not decode to UTF-8 is
/// used as written.
pub fn resolve(dir: &Path, reference: &str) -> Option<PathBuf> {
    if is_external(reference) {
        return None;
    }
    let stripped = strip_query_and_fragment(reference.trim());
    if stripped.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(stripped)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stripped.to_string());
    Some(dir.join(decoded.replace('\\', "/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_first_quoted_attribute() {
        let html = r#"<p><a class="x" href="b.html" href="c.html">b</a> <A HREF='d.htm#top'>d</A> <a name=x>n</a></p>"#;
        let refs = anchor_hrefs(html);
        let values: Vec<_> = refs.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["b.html", "d.htm#top"]);
        assert_eq!(&html[refs[0].tag.clone()], r#"<a class="x" href="b.html" href="c.html">"#);
    }

    #[test]
    fn abbr_and_area_are_not_anchors() {
        assert!(anchor_hrefs(r#"<abbr title="x">y</abbr><area href="z.html">"#).is_empty());
    }

    #[test]
    fn unquoted_values_are_ignored() {
        assert!(image_srcs("<img src=logo.png>").is_empty());
        assert_eq!(image_srcs(r#"<IMG width=3 SRC="a%20b.png">"#)[0].value, "a%20b.png");
    }

    #[test]
    fn external_references() {
        for r in ["http://x.org/a.html", "https://x", "mailto:a@b", "javascript:void(0)", "#top", "//cdn/x.png", "data:image/png;base64,AA", ""] {
            assert!(is_external(r), "{r}");
        }
        for r in ["a.html", "../up/b.htm", "img/c.png", "./d.html?x=1"] {
            assert!(!is_external(r), "{r}");
        }
    }

    #[test]
    fn resolves_against_document_dir() {
        let dir = Path::new("site/books");
        assert_eq!(resolve(dir, "ch%201.html#s2"), Some(PathBuf::from("site/books/ch 1.html")));
        assert_eq!(resolve(dir, "./img/logo.png?v=3"), Some(dir.join("./img/logo.png")));
        assert_eq!(resolve(dir, "pics\\a.gif"), Some(dir.join("pics/a.gif")));
        assert_eq!(resolve(dir, "https://x.org/a.png"), None);
        assert_eq!(resolve(dir, "?only=query"), None);
    }
}
