//! HTML input detection: full document or fragment.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Shape of an HTML input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlKind {
    /// Complete document (doctype, `<html>` or `<body>` present)
    Document,
    /// Markup fragment
    Fragment,
}

impl std::fmt::Display for HtmlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HtmlKind::Document => f.write_str("HTML document"),
            HtmlKind::Fragment => f.write_str("HTML fragment"),
        }
    }
}

const UTF8_BOM: &str = "\u{feff}";
/// Bytes inspected when sniffing a file.
const SNIFF_LEN: u64 = 1024;

/// Detect whether `html` is a full document or a fragment.
///
/// Leading whitespace, a byte-order mark and comments are skipped; the
/// input is a document if it then starts with a doctype or `<html`, or if
/// a `<body` tag appears anywhere.
///
/// # Example
/// ```
/// use htmldoc::detect::{detect_kind, HtmlKind};
///
/// assert_eq!(detect_kind("<!doctype html><p>x</p>"), HtmlKind::Document);
/// assert_eq!(detect_kind("<p>x</p>"), HtmlKind::Fragment);
/// ```
pub fn detect_kind(html: &str) -> HtmlKind {
    let head = skip_preamble(html);
    let lower: String = head.chars().take(16).collect::<String>().to_ascii_lowercase();
    if lower.starts_with("<!doctype") || lower.starts_with("<html") {
        return HtmlKind::Document;
    }
    if contains_tag(html, "<body") {
        return HtmlKind::Document;
    }
    HtmlKind::Fragment
}

/// Check if `html` is a full document.
pub fn is_full_document(html: &str) -> bool {
    detect_kind(html) == HtmlKind::Document
}

/// Detect the kind of HTML held in `data`.
///
/// # Returns
/// * `Ok(HtmlKind)` for UTF-8 input
/// * `Err(Error::Other)` if the data is not UTF-8
pub fn detect_kind_from_bytes(data: &[u8]) -> Result<HtmlKind> {
    // A truncated read may split a multi-byte character at the end.
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&data[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return Err(Error::Other("input is not valid UTF-8".to_string())),
    };
    Ok(detect_kind(text))
}

/// Detect the kind of HTML stored in a file, reading only its head.
///
/// # Example
/// ```no_run
/// use htmldoc::detect::detect_kind_from_path;
///
/// let kind = detect_kind_from_path("page.html").unwrap();
/// println!("{}", kind);
/// ```
pub fn detect_kind_from_path<P: AsRef<Path>>(path: P) -> Result<HtmlKind> {
    let file = File::open(path)?;
    let mut head = Vec::new();
    BufReader::new(file).take(SNIFF_LEN).read_to_end(&mut head)?;
    detect_kind_from_bytes(&head)
}

fn skip_preamble(html: &str) -> &str {
    let mut rest = html.trim_start_matches(UTF8_BOM).trim_start();
    while let Some(comment) = rest.strip_prefix("<!--") {
        rest = match comment.find("-->") {
            Some(end) => comment[end + 3..].trim_start(),
            None => "",
        };
    }
    rest
}

fn contains_tag(html: &str, open: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    lower.match_indices(open).any(|(i, _)| {
        matches!(
            lower[i + open.len()..].chars().next(),
            Some('>' | ' ' | '\t' | '\n' | '\r' | '/')
        )
    })
}
