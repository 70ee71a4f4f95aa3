//! Markup to plain text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// An unterminated comment hides everything after it.
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").unwrap());

static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?is)<script\b(?:"[^"]*"|'[^']*'|[^'">])*>.*?</script\s*>"#,
        r#"|<style\b(?:"[^"]*"|'[^']*'|[^'">])*>.*?</style\s*>"#,
    ))
    .unwrap()
});

// Quoted attribute values may contain `>`.
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<[A-Za-z!?/](?:"[^"]*"|'[^']*'|[^'">])*>"#).unwrap());

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").unwrap());

/// Reduce markup to its visible text.
///
/// Text nodes are concatenated in document order without added whitespace.
/// Comments, tags and attributes are dropped, as is the content of `script`
/// and `style` elements. Character references are decoded after tags are
/// removed, so escaped markup stays literal text.
pub fn html_to_text(html: &str) -> String {
    let text = COMMENT_RE.replace_all(html, "");
    let text = SCRIPT_STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    ENTITY_RE
        .replace_all(&text, |caps: &Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        _ => return None,
    };
    Some(decoded.to_string())
}
