//! SQL dump sanitizer.
//!
//! Dumps produced against some engines wrap non-ASCII string content in
//! `unistr('...')` calls whose bodies hold `\XXXX` / `\uXXXX` escapes. That
//! form is not portable across engines, so before execution every call is
//! rewritten into a plain single-quoted literal with the escapes decoded to
//! UTF-8. This is a pure text transform, engine-agnostic and idempotent:
//! calls whose bodies cannot be decoded are left untouched.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn unistr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)unistr\('([^']*)'\)").expect("unistr pattern is valid")
    })
}

/// Rewrites every decodable `unistr('...')` call in `sql` into a literal.
pub fn sanitize_dump(sql: &str) -> String {
    unistr_pattern()
        .replace_all(sql, |caps: &Captures| {
            let body = caps.get(1).unwrap().as_str();
            match decode_escapes(body) {
                // Single quotes inside the decoded text must stay escaped in
                // the resulting SQL literal.
                Some(decoded) => format!("'{}'", decoded.replace('\'', "''")),
                None => caps.get(0).unwrap().as_str().to_string(),
            }
        })
        .into_owned()
}

/// Decodes `\XXXX`, `\uXXXX` and `\\` escapes, pairing UTF-16 surrogates.
/// Returns `None` on any malformed escape.
fn decode_escapes(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        if chars.peek() == Some(&'\\') {
            chars.next();
            out.push('\\');
            continue;
        }

        let unit = read_escape_unit(&mut chars)?;
        if (0xD800..0xDC00).contains(&unit) {
            // High surrogate: the low half must follow as another escape.
            if chars.next() != Some('\\') {
                return None;
            }
            let low = read_escape_unit(&mut chars)?;
            if !(0xDC00..0xE000).contains(&low) {
                return None;
            }
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            out.push(char::from_u32(combined)?);
        } else {
            out.push(char::from_u32(unit)?);
        }
    }

    Some(out)
}

/// Reads the four hex digits of one escape, past an optional leading `u`.
fn read_escape_unit(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<u32> {
    if chars.peek() == Some(&'u') {
        chars.next();
    }
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    Some(value)
}
