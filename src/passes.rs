//! Text-level rewrite passes over loosely structured HTML.
//!
//! Every pass is a pure `&str -> Cow<str>` rule that borrows when it has
//! nothing to do. Passes never fail: a missing anchor (no `<head>`, no
//! `<body>`) leaves the input untouched. Applying any pass twice gives the
//! same result as applying it once, since scripts re-run over their own
//! output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex, Replacer};

use crate::config::MigrateConfig;

const VIEWPORT_MARKER: &str = "viewport";
const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;
const CONTAINER_MARKERS: [&str; 2] = [r#"class="container""#, r#"class="main""#];
const IMAGE_ALT: &str = r#"alt="Image""#;

static XML_PROLOG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<\?xml[^>]*>").unwrap());
static CONDITIONAL_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<!--\[if[^\]]*\]>.*?<!\[endif\]-->").unwrap());
static REVEALED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!\[(?:if\s[^\]]*|endif)\]>").unwrap());
static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static INLINE_STYLE_PROBE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z][^>]*\sstyle\s*=").unwrap());
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z][^>]*>").unwrap());
static STYLE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+style\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)"#).unwrap());
static LEGACY_META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta\b[^>]*\b(?:ProgId|Generator|Originator)\b[^>]*>").unwrap());
static LEGACY_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<link\b[^>]*\b(?:File-List|themeData|colorSchemeMapping|Edit-Time-Data)\b[^>]*>").unwrap());
static OFFICE_XML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<xml\b[^>]*>.*?</xml\s*>").unwrap());
static OFFICE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?[ovwm]:[a-z][^>]*>").unwrap());
static FONT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?font\b[^>]*>").unwrap());
static MARQUEE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)marquee\b[^>]*>").unwrap());
static LIST_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\[if !support[A-Za-z]*\]-->|<!--\[endif\]-->").unwrap());
static EMPTY_PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>\s*</p\s*>").unwrap());
static TABLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)(table|tr|td)\b[^>]*>").unwrap());
static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b([^>]*)>").unwrap());
static ALT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\salt\s*=").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\r?\n){3,}").unwrap());
static LEGACY_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)charset\s*=\s*(?:gb2312|gbk|gb18030|big5)\b").unwrap());
static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").unwrap());
static BODY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());
static HTML5_DOCTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype\s+html\s*>").unwrap());
static ANY_DOCTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype[^>]*>").unwrap());
static HTML_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html\b([^>]*)>").unwrap());
static LANG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\slang\s*=").unwrap());
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b([^>]*)>(.*)</body\s*>").unwrap());
static CSS_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<link\b[^>]*\shref\s*=\s*["']([^"']*\.css(?:\?[^"']*)?)["'][^>]*>"#).unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\n\x0C\r ]+").unwrap());
static INTER_TAG_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[\t\n\x0C\r ]+<").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    StripProcessingInstructions,
    StripStyles,
    StripStyleBlocks,
    StripLegacyMetadata,
    StripOfficeMarkup,
    StripDeprecatedElements,
    StripListComments,
    CollapseEmptyParagraphs,
    ConvertTableLayout,
    EnsureImageAlt,
    CollapseBlankLines,
    NormalizeCharset,
    EnsureViewport,
    EnsureStylesheet,
    EnsureScript,
    EnsureDoctype,
    WrapLayoutGrid,
    RemoveDeadCssLinks,
    Minify,
}

impl Pass {
    pub const ALL: [Pass; 19] = [
        Pass::StripProcessingInstructions,
        Pass::StripStyles,
        Pass::StripStyleBlocks,
        Pass::StripLegacyMetadata,
        Pass::StripOfficeMarkup,
        Pass::StripDeprecatedElements,
        Pass::StripListComments,
        Pass::CollapseEmptyParagraphs,
        Pass::ConvertTableLayout,
        Pass::EnsureImageAlt,
        Pass::CollapseBlankLines,
        Pass::NormalizeCharset,
        Pass::EnsureViewport,
        Pass::EnsureStylesheet,
        Pass::EnsureScript,
        Pass::EnsureDoctype,
        Pass::WrapLayoutGrid,
        Pass::RemoveDeadCssLinks,
        Pass::Minify,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::StripProcessingInstructions => "strip_processing_instructions",
            Pass::StripStyles => "strip_styles",
            Pass::StripStyleBlocks => "strip_style_blocks",
            Pass::StripLegacyMetadata => "strip_legacy_metadata",
            Pass::StripOfficeMarkup => "strip_office_markup",
            Pass::StripDeprecatedElements => "strip_deprecated_elements",
            Pass::StripListComments => "strip_list_comments",
            Pass::CollapseEmptyParagraphs => "collapse_empty_paragraphs",
            Pass::ConvertTableLayout => "convert_table_layout",
            Pass::EnsureImageAlt => "ensure_image_alt",
            Pass::CollapseBlankLines => "collapse_blank_lines",
            Pass::NormalizeCharset => "normalize_charset",
            Pass::EnsureViewport => "ensure_viewport",
            Pass::EnsureStylesheet => "ensure_stylesheet",
            Pass::EnsureScript => "ensure_script",
            Pass::EnsureDoctype => "ensure_doctype",
            Pass::WrapLayoutGrid => "wrap_layout_grid",
            Pass::RemoveDeadCssLinks => "remove_dead_css_links",
            Pass::Minify => "minify",
        }
    }

    /// Removal passes can splice two fragments into a fresh match, so they
    /// run until the text stops changing.
    fn is_subtractive(self) -> bool {
        matches!(
            self,
            Pass::StripProcessingInstructions
                | Pass::StripStyles
                | Pass::StripStyleBlocks
                | Pass::StripLegacyMetadata
                | Pass::StripOfficeMarkup
                | Pass::StripDeprecatedElements
                | Pass::StripListComments
                | Pass::CollapseEmptyParagraphs
                | Pass::RemoveDeadCssLinks
        )
    }

    pub fn apply<'a>(self, html: &'a str, cfg: &MigrateConfig) -> Cow<'a, str> {
        if self.is_subtractive() {
            to_fixpoint(html, |text| self.rule(text, cfg))
        } else {
            self.rule(html, cfg)
        }
    }

    fn rule<'a>(self, html: &'a str, cfg: &MigrateConfig) -> Cow<'a, str> {
        match self {
            Pass::StripProcessingInstructions => strip_processing_instructions(html),
            Pass::StripStyles => strip_inline_styles(STYLE_BLOCK_RE.replace_all(html, "")),
            Pass::StripStyleBlocks => STYLE_BLOCK_RE.replace_all(html, ""),
            Pass::StripLegacyMetadata => {
                rewrite(LEGACY_META_RE.replace_all(html, ""), &LEGACY_LINK_RE, "")
            }
            Pass::StripOfficeMarkup => {
                rewrite(OFFICE_XML_RE.replace_all(html, ""), &OFFICE_TAG_RE, "")
            }
            Pass::StripDeprecatedElements => {
                rewrite(strip_marquees(html), &FONT_TAG_RE, "")
            }
            Pass::StripListComments => LIST_COMMENT_RE.replace_all(html, ""),
            Pass::CollapseEmptyParagraphs => EMPTY_PARAGRAPH_RE.replace_all(html, ""),
            Pass::ConvertTableLayout => convert_table_layout(html),
            Pass::EnsureImageAlt => ensure_image_alt(html),
            Pass::CollapseBlankLines => BLANK_LINES_RE.replace_all(html, "\n\n"),
            Pass::NormalizeCharset => LEGACY_CHARSET_RE.replace_all(html, "charset=utf-8"),
            Pass::EnsureViewport => {
                if html.contains(VIEWPORT_MARKER) {
                    return Cow::Borrowed(html);
                }
                insert_after_head(html, VIEWPORT_META)
            }
            Pass::EnsureStylesheet => {
                if html.contains(cfg.stylesheet_path.as_str()) {
                    return Cow::Borrowed(html);
                }
                let link = format!(r#"<link rel="stylesheet" href="{}">"#, cfg.stylesheet_path);
                insert_after_head(html, &link)
            }
            Pass::EnsureScript => ensure_script(html, &cfg.script_path),
            Pass::EnsureDoctype => ensure_doctype(html, &cfg.document_lang),
            Pass::WrapLayoutGrid => wrap_layout_grid(html),
            Pass::RemoveDeadCssLinks => remove_dead_css_links(html, &cfg.stylesheet_path),
            Pass::Minify => minify(html),
        }
    }
}

/// Re-apply `step` until it stops changing the text.
///
/// Only used with rules that shrink the text whenever they change it, so the
/// loop always ends.
fn to_fixpoint<'a>(html: &'a str, step: impl Fn(&str) -> Cow<'_, str>) -> Cow<'a, str> {
    let mut current = match step(html) {
        Cow::Borrowed(_) => return Cow::Borrowed(html),
        Cow::Owned(text) => text,
    };
    loop {
        let next = match step(&current) {
            Cow::Borrowed(_) => break,
            Cow::Owned(next) => next,
        };
        if next == current {
            break;
        }
        current = next;
    }
    Cow::Owned(current)
}

/// Run one more replacement over text that may already be owned.
fn rewrite<'a, R: Replacer>(text: Cow<'a, str>, re: &Regex, rep: R) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => re.replace_all(s, rep),
        Cow::Owned(s) => {
            let next = match re.replace_all(&s, rep) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            Cow::Owned(next.unwrap_or(s))
        }
    }
}

/// Hidden conditional blocks go with their content; the `<![if …]>` and
/// `<![endif]>` markers around revealed content go on their own.
fn strip_processing_instructions(html: &str) -> Cow<'_, str> {
    let text = rewrite(XML_PROLOG_RE.replace_all(html, ""), &CONDITIONAL_BLOCK_RE, "");
    rewrite(text, &REVEALED_MARKER_RE, "")
}

/// Drop `style` attributes from opening tags, leaving text content alone.
fn strip_inline_styles(html: Cow<'_, str>) -> Cow<'_, str> {
    if !INLINE_STYLE_PROBE_RE.is_match(&html) {
        return html;
    }
    rewrite(html, &OPEN_TAG_RE, |caps: &Captures<'_>| {
        STYLE_ATTR_RE.replace_all(&caps[0], "").into_owned()
    })
}

/// Remove every balanced `<marquee>` element with its content, matching
/// nested ones to their outermost close. Unclosed openers and stray closers
/// stay.
fn strip_marquees(html: &str) -> Cow<'_, str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for caps in MARQUEE_TAG_RE.captures_iter(html) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        if caps[1].is_empty() {
            if depth == 0 {
                start = tag.start();
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                spans.push(start..tag.end());
            }
        }
    }
    if spans.is_empty() {
        return Cow::Borrowed(html);
    }
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&html[last..span.start]);
        last = span.end;
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

fn convert_table_layout(html: &str) -> Cow<'_, str> {
    TABLE_TAG_RE.replace_all(html, |caps: &Captures<'_>| {
        let tag = if caps[2].eq_ignore_ascii_case("table") {
            "section"
        } else {
            "div"
        };
        format!("<{}{}>", &caps[1], tag)
    })
}

fn ensure_image_alt(html: &str) -> Cow<'_, str> {
    let missing = IMG_TAG_RE
        .captures_iter(html)
        .any(|caps| !ALT_ATTR_RE.is_match(&caps[1]));
    if !missing {
        return Cow::Borrowed(html);
    }
    IMG_TAG_RE.replace_all(html, |caps: &Captures<'_>| {
        if ALT_ATTR_RE.is_match(&caps[1]) {
            caps[0].to_string()
        } else {
            format!("<img {}{}>", IMAGE_ALT, &caps[1])
        }
    })
}

fn insert_after_head<'a>(html: &'a str, fragment: &str) -> Cow<'a, str> {
    let Some(head) = HEAD_OPEN_RE.find(html) else {
        return Cow::Borrowed(html);
    };
    let mut out = String::with_capacity(html.len() + fragment.len() + 5);
    out.push_str(&html[..head.end()]);
    out.push_str("\n    ");
    out.push_str(fragment);
    out.push_str(&html[head.end()..]);
    Cow::Owned(out)
}

fn ensure_script<'a>(html: &'a str, script_path: &str) -> Cow<'a, str> {
    if html.contains(script_path) {
        return Cow::Borrowed(html);
    }
    let Some(close) = BODY_CLOSE_RE.find(html) else {
        return Cow::Borrowed(html);
    };
    let tag = format!("    <script src=\"{script_path}\"></script>\n");
    let mut out = String::with_capacity(html.len() + tag.len());
    out.push_str(&html[..close.start()]);
    out.push_str(&tag);
    out.push_str(&html[close.start()..]);
    Cow::Owned(out)
}

fn ensure_doctype<'a>(html: &'a str, lang: &str) -> Cow<'a, str> {
    if HTML5_DOCTYPE_RE.is_match(html) {
        return Cow::Borrowed(html);
    }
    // A legacy doctype is replaced, never stacked under the new one.
    let without_legacy = ANY_DOCTYPE_RE.replacen(html, 1, "");
    let html_tag = HTML_OPEN_RE
        .captures(&without_legacy)
        .filter(|caps| !LANG_ATTR_RE.is_match(&caps[1]))
        .map(|caps| format!("<html{} lang=\"{}\">", &caps[1], lang));
    let annotated = match html_tag {
        Some(tag) => HTML_OPEN_RE
            .replacen(&without_legacy, 1, NoExpand(&tag))
            .into_owned(),
        None => without_legacy.into_owned(),
    };
    let body = annotated.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
    Cow::Owned(format!("<!DOCTYPE html>\n{body}"))
}

fn wrap_layout_grid(html: &str) -> Cow<'_, str> {
    if CONTAINER_MARKERS.iter().any(|m| html.contains(m)) {
        return Cow::Borrowed(html);
    }
    let Some(caps) = BODY_RE.captures(html) else {
        return Cow::Borrowed(html);
    };
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(2)) else {
        return Cow::Borrowed(html);
    };
    let wrapped = format!(
        "<body{attrs}>\n    <main class=\"main\">\n        <div class=\"container\">\n            \
         <div class=\"content-grid\">\n                <section class=\"main-content\">\n                    \
         {inner}\n                </section>\n            </div>\n        </div>\n    </main>\n</body>",
        attrs = &caps[1],
        inner = inner.as_str(),
    );
    let mut out = String::with_capacity(html.len() + wrapped.len());
    out.push_str(&html[..whole.start()]);
    out.push_str(&wrapped);
    out.push_str(&html[whole.end()..]);
    Cow::Owned(out)
}

fn remove_dead_css_links<'a>(html: &'a str, stylesheet_path: &str) -> Cow<'a, str> {
    let dead = CSS_LINK_RE
        .captures_iter(html)
        .any(|caps| &caps[1] != stylesheet_path);
    if !dead {
        return Cow::Borrowed(html);
    }
    CSS_LINK_RE.replace_all(html, |caps: &Captures<'_>| {
        if &caps[1] == stylesheet_path {
            caps[0].to_string()
        } else {
            String::new()
        }
    })
}

/// Comments first, so removing one never leaves a double space behind.
fn minify(html: &str) -> Cow<'_, str> {
    let text = to_fixpoint(html, |s| COMMENT_RE.replace_all(s, ""));
    let text = rewrite(text, &WHITESPACE_RUN_RE, " ");
    let text = rewrite(text, &INTER_TAG_SPACE_RE, "><");
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.len() == text.len() {
        return text;
    }
    Cow::Owned(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MigrateConfig {
        MigrateConfig::default()
    }

    fn run(pass: Pass, html: &str) -> String {
        pass.apply(html, &cfg()).into_owned()
    }

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/word_export.html").unwrap()
    }

    #[test]
    fn every_pass_is_idempotent_on_word_export() {
        let html = fixture();
        for pass in Pass::ALL {
            let once = run(pass, &html);
            let twice = run(pass, &once);
            assert_eq!(once, twice, "{} is not idempotent", pass.name());
        }
    }

    #[test]
    fn every_pass_is_idempotent_on_tricky_input() {
        let html = "<!-<!---->-> <p> <p></p> </p>\n\n\n\n<font><font></font>x</font>\
                    <sty<style></style>le>a</style> <!--[if !supp<!--[endif]-->ortLists]-->";
        for pass in Pass::ALL {
            let once = run(pass, html);
            assert_eq!(once, run(pass, &once), "{} is not idempotent", pass.name());
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Pass::ALL.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Pass::ALL.len());
    }

    #[test]
    fn untouched_input_is_borrowed() {
        let html = "<p>plain text</p>";
        for pass in [
            Pass::StripStyles,
            Pass::StripProcessingInstructions,
            Pass::ConvertTableLayout,
            Pass::EnsureImageAlt,
            Pass::EnsureViewport,
            Pass::WrapLayoutGrid,
        ] {
            assert!(matches!(pass.apply(html, &cfg()), Cow::Borrowed(_)), "{}", pass.name());
        }
    }

    #[test]
    fn strips_prolog_and_conditional_blocks() {
        let html = "<?xml version=\"1.0\"?><html><!--[if gte mso 9]><xml><o:DocumentProperties/></xml><![endif]-->\
                    <p>keep</p><!--[if gte mso 10]>\n<style>x</style>\n<![endif]--></html>";
        let out = run(Pass::StripProcessingInstructions, html);
        assert_eq!(out, "<html><p>keep</p></html>");
    }

    #[test]
    fn revealed_conditional_markers_keep_content() {
        let html = "<p><![if !vml]><img src=\"a.jpg\"><![endif]></p><!--[if gte vml 1]><v:shape/><![endif]-->";
        assert_eq!(run(Pass::StripProcessingInstructions, html), "<p><img src=\"a.jpg\"></p>");
    }

    #[test]
    fn strips_all_style_blocks_and_attributes() {
        let html = "<style>p{}</style><p style=\"color:red\">a</p><STYLE type=text/css>\n</STYLE>\
                    <span class=x style='mso-bidi:1'>b</span><td style=width:3px>c</td>";
        let out = run(Pass::StripStyles, html);
        assert!(!out.to_lowercase().contains("style"));
        assert_eq!(out, "<p>a</p><span class=x>b</span><td>c</td>");
    }

    #[test]
    fn style_word_in_text_survives() {
        let out = run(Pass::StripStyles, "<p style=\"x\">a style = b</p>");
        assert_eq!(out, "<p>a style = b</p>");
    }

    #[test]
    fn style_blocks_pass_keeps_inline_styles() {
        let out = run(Pass::StripStyleBlocks, "<style>a</style><p style=\"x\">y</p>");
        assert_eq!(out, "<p style=\"x\">y</p>");
    }

    #[test]
    fn strips_vendor_metadata_only() {
        let html = "<meta name=ProgId content=Word.Document>\
                    <meta name=Generator content=\"Microsoft Word 11\">\
                    <meta name=Originator content=\"Microsoft Word 11\">\
                    <meta charset=\"utf-8\">\
                    <link rel=File-List href=\"a_files/filelist.xml\">\
                    <link rel=themeData href=\"a_files/themedata.thmx\">\
                    <link rel=colorSchemeMapping href=\"a_files/colorschememapping.xml\">\
                    <link rel=\"icon\" href=\"/favicon.ico\">";
        let out = run(Pass::StripLegacyMetadata, html);
        assert_eq!(out, "<meta charset=\"utf-8\"><link rel=\"icon\" href=\"/favicon.ico\">");
    }

    #[test]
    fn strips_office_namespace_tags_keeping_text() {
        let html = "<p>a<o:p>&nbsp;</o:p></p><xml><w:WordDocument>x</w:WordDocument></xml><v:shape id=1>b</v:shape>";
        assert_eq!(run(Pass::StripOfficeMarkup, html), "<p>a&nbsp;</p>b");
    }

    #[test]
    fn font_keeps_text_marquee_loses_it() {
        let html = "<FONT face=\"SimSun\" color=red>文字</FONT><marquee behavior=scroll>news\nflash</marquee>!";
        assert_eq!(run(Pass::StripDeprecatedElements, html), "文字!");
    }

    #[test]
    fn nested_marquee_goes_whole() {
        let html = "<p>a<marquee><MARQUEE>x</marquee>y</marquee>b</p>";
        assert_eq!(run(Pass::StripDeprecatedElements, html), "<p>ab</p>");
    }

    #[test]
    fn unbalanced_marquee_tags_are_left() {
        let html = "</marquee><p>x</p><marquee>open";
        assert_eq!(run(Pass::StripDeprecatedElements, html), html);
    }

    #[test]
    fn list_support_comments_go() {
        let html = "<p><!--[if !supportLists]-->1.<!--[endif]-->Item</p>";
        assert_eq!(run(Pass::StripListComments, html), "<p>1.Item</p>");
    }

    #[test]
    fn empty_paragraphs_collapse_including_nested() {
        let html = "<p class=MsoNormal> \n </p><p>x</p><p><p></p></p>";
        assert_eq!(run(Pass::CollapseEmptyParagraphs, html), "<p>x</p>");
    }

    #[test]
    fn deep_nesting_is_removed_in_one_application() {
        let html = format!("{}{}", "<p>".repeat(41), "</p>".repeat(41));
        let once = run(Pass::CollapseEmptyParagraphs, &html);
        assert_eq!(once, "");
        assert_eq!(run(Pass::CollapseEmptyParagraphs, &once), once);
    }

    #[test]
    fn tables_become_sections_and_divs() {
        let html = "<table border=1><tr><td>a</td><td><TABLE><tr><td>b</td></tr></TABLE></td></tr></table><track>";
        let out = run(Pass::ConvertTableLayout, html);
        assert_eq!(
            out,
            "<section><div><div>a</div><div><section><div><div>b</div></div></section></div></div></section><track>"
        );
        assert_eq!(out.matches("<section>").count(), out.matches("</section>").count());
        assert_eq!(out.matches("<div>").count(), out.matches("</div>").count());
    }

    #[test]
    fn images_without_alt_get_one() {
        let html = "<img src=\"a.png\"><img alt=\"Logo\" src=\"b.png\"><IMG src=c.png />";
        let out = run(Pass::EnsureImageAlt, html);
        assert_eq!(
            out,
            "<img alt=\"Image\" src=\"a.png\"><img alt=\"Logo\" src=\"b.png\"><img alt=\"Image\" src=c.png />"
        );
    }

    #[test]
    fn blank_lines_collapse_to_one() {
        assert_eq!(run(Pass::CollapseBlankLines, "a\n\n\n\nb\r\n\r\n\r\nc\n\nd"), "a\n\nb\n\nc\n\nd");
    }

    #[test]
    fn legacy_charset_declarations_become_utf8() {
        let html = "<meta http-equiv=Content-Type content=\"text/html; charset=GB2312\">";
        assert_eq!(
            run(Pass::NormalizeCharset, html),
            "<meta http-equiv=Content-Type content=\"text/html; charset=utf-8\">"
        );
    }

    #[test]
    fn viewport_inserted_once_after_head() {
        let html = "<html><head lang=zh><title>t</title></head><body></body></html>";
        let out = run(Pass::EnsureViewport, html);
        assert!(out.starts_with("<html><head lang=zh>\n    <meta name=\"viewport\""));
        assert_eq!(out.matches("viewport").count(), 1);
        assert_eq!(run(Pass::EnsureViewport, &out), out);
    }

    #[test]
    fn insertions_skip_documents_without_anchor() {
        let html = "<p>fragment</p>";
        assert_eq!(run(Pass::EnsureViewport, html), html);
        assert_eq!(run(Pass::EnsureStylesheet, html), html);
        assert_eq!(run(Pass::EnsureScript, html), html);
        assert_eq!(run(Pass::WrapLayoutGrid, html), html);
    }

    #[test]
    fn header_is_not_head() {
        let html = "<header>x</header>";
        assert_eq!(run(Pass::EnsureStylesheet, html), html);
    }

    #[test]
    fn stylesheet_and_script_present_exactly_once() {
        let html = "<html><head></head><body><p>x</p></body></html>";
        let styled = run(Pass::EnsureStylesheet, html);
        let scripted = run(Pass::EnsureScript, &styled);
        assert_eq!(scripted.matches("/assets/css/main.css").count(), 1);
        assert_eq!(scripted.matches("/assets/js/main.js").count(), 1);
        assert!(scripted.contains("<head>\n    <link rel=\"stylesheet\" href=\"/assets/css/main.css\"></head>"));
        assert!(scripted.contains("    <script src=\"/assets/js/main.js\"></script>\n</body>"));
    }

    #[test]
    fn doctype_prepended_and_lang_added() {
        let out = run(Pass::EnsureDoctype, "\n<html xmlns:o=\"urn:office\"><body></body></html>");
        assert_eq!(out, "<!DOCTYPE html>\n<html xmlns:o=\"urn:office\" lang=\"zh\"><body></body></html>");
    }

    #[test]
    fn legacy_doctype_replaced_not_stacked() {
        let html = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.0 Transitional//EN\">\n<html lang=en><p>x</p></html>";
        let out = run(Pass::EnsureDoctype, html);
        assert_eq!(out, "<!DOCTYPE html>\n<html lang=en><p>x</p></html>");
        assert_eq!(out.to_lowercase().matches("<!doctype").count(), 1);
    }

    #[test]
    fn existing_html5_doctype_is_a_no_op() {
        let html = "<!doctype html><html><p>x</p></html>";
        assert!(matches!(Pass::EnsureDoctype.apply(html, &cfg()), Cow::Borrowed(_)));
    }

    #[test]
    fn body_wrapped_in_grid() {
        let html = "<html><body class=\"page\"><p>$1 text</p></body></html>";
        let out = run(Pass::WrapLayoutGrid, html);
        assert!(out.starts_with("<html><body class=\"page\">\n    <main class=\"main\">"));
        assert!(out.contains("<section class=\"main-content\">\n                    <p>$1 text</p>"));
        assert!(out.ends_with("</main>\n</body></html>"));
        assert_eq!(out.matches("<main").count(), 1);
    }

    #[test]
    fn recognised_container_blocks_wrap() {
        let html = "<body><div class=\"container\">x</div></body>";
        assert_eq!(run(Pass::WrapLayoutGrid, html), html);
    }

    #[test]
    fn only_canonical_stylesheet_link_survives() {
        let html = "<link rel=stylesheet href=\"infant/text.css\">\
                    <link rel=\"stylesheet\" href=\"/assets/css/main.css\">\
                    <link href='old.css?v=2' rel=stylesheet><link rel=icon href=\"x.ico\">";
        assert_eq!(
            run(Pass::RemoveDeadCssLinks, html),
            "<link rel=\"stylesheet\" href=\"/assets/css/main.css\"><link rel=icon href=\"x.ico\">"
        );
    }

    #[test]
    fn minify_strips_comments_and_whitespace() {
        let html = "  <html>\n  <!-- note -->\n  <body>\n    <p>a  <!--x-->  b</p>\n  </body>\n</html>\n";
        assert_eq!(run(Pass::Minify, html), "<html><body><p>a b</p></body></html>");
    }

    #[test]
    fn minify_keeps_fullwidth_spaces() {
        let out = run(Pass::Minify, "<p>\u{3000}\u{3000}第一章</p>");
        assert_eq!(out, "<p>\u{3000}\u{3000}第一章</p>");
    }

    #[test]
    fn legacy_constructs_fully_removed_from_fixture() {
        let mut html = fixture();
        for pass in [
            Pass::StripProcessingInstructions,
            Pass::StripStyles,
            Pass::StripLegacyMetadata,
            Pass::StripOfficeMarkup,
            Pass::StripDeprecatedElements,
            Pass::StripListComments,
            Pass::ConvertTableLayout,
        ] {
            html = run(pass, &html);
        }
        let lower = html.to_lowercase();
        for needle in [
            "<?xml", "<!--[if", "<style", " style=", "progid", "file-list", "<font", "<marquee",
            "supportlists", "<table", "<tr", "<td", "<o:p",
        ] {
            assert!(!lower.contains(needle), "{needle} survived");
        }
    }
}
