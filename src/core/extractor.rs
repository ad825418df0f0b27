//! Regex-based contact field detection.
//!
//! The rules are intentionally loose: the phone pattern will happily match a
//! postal code or any other digit-heavy line, and the name rule is a shape
//! check, not a name classifier. Callers rely on this exact behavior, so the
//! patterns must not be tightened here.
//!
//! Word and digit classes are ASCII-only. Whitespace is Unicode-aware and
//! also covers U+FEFF, which OCR output sometimes starts with.

use crate::domain::model::ContactFields;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+?[0-9]{1,3}[\s\x{FEFF}-]?)?(\(?[0-9]{3}\)?[\s\x{FEFF}-]?)?[0-9]{2,4}[\s\x{FEFF}-]?[0-9]{2,4}[\s\x{FEFF}-]?[0-9]{2,4}").unwrap()
});

static WEB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(www\.|https?://)[^\s\x{FEFF}]+").unwrap());

/// Maps raw OCR text to the fields the rules can detect.
///
/// Only `name`, `tel`, `email` and `web` are ever set; `title`, `company`
/// and `address` are left for an annotator to fill.
pub fn extract(text: &str) -> ContactFields {
    ContactFields {
        name: detect_name(text),
        tel: first_match(&PHONE_RE, text),
        email: first_match(&EMAIL_RE, text),
        web: first_match(&WEB_RE, text),
        ..Default::default()
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}

fn detect_name(text: &str) -> Option<String> {
    text.split('\n')
        .map(|line| line.trim_matches(is_blank))
        .find(|line| looks_like_name(line))
        .map(str::to_string)
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn looks_like_name(line: &str) -> bool {
    if line.is_empty()
        || line.contains('@')
        || line.contains("www")
        || line.contains(".com")
        || line.chars().any(|c| c.is_ascii_digit())
    {
        return false;
    }

    // Single-space split, so doubled spaces count as extra tokens.
    let tokens = line.split(' ').count();
    (2..=4).contains(&tokens)
}
