//! Lexical primitives over UTF-16 code units: separators, numbers, string
//! literals and keywords. The parser drives these. `scan_string` allocates the
//! decoded string and `scan_number` copies the literal out for `f64` parsing;
//! the separator and keyword helpers never allocate.

use crate::error::{Error, Result, SyntaxErrorKind};
use crate::value::JsString;

pub(crate) const QUOTE: u16 = b'"' as u16;
pub(crate) const BACKSLASH: u16 = b'\\' as u16;
pub(crate) const COLON: u16 = b':' as u16;
pub(crate) const COMMA: u16 = b',' as u16;
pub(crate) const MINUS: u16 = b'-' as u16;
pub(crate) const LEFT_BRACE: u16 = b'{' as u16;
pub(crate) const RIGHT_BRACE: u16 = b'}' as u16;
pub(crate) const LEFT_BRACKET: u16 = b'[' as u16;
pub(crate) const RIGHT_BRACKET: u16 = b']' as u16;

const PLUS: u16 = b'+' as u16;
const DOT: u16 = b'.' as u16;
const ZERO: u16 = b'0' as u16;

/// Unicode whitespace that must not separate tokens.
const EXCLUDED_SEPARATORS: &[u16] = &[
    0x000b, 0x000c, 0x00a0, 0x1680, 0x180e, 0x2000, 0x2001, 0x2002, 0x2003, 0x2004, 0x2005,
    0x2006, 0x2007, 0x2008, 0x2009, 0x200a, 0x2028, 0x2029, 0x202f, 0x205f, 0x3000,
];

/// True for code units that may appear between tokens.
pub(crate) fn is_separator(unit: u16) -> bool {
    if EXCLUDED_SEPARATORS.contains(&unit) {
        return false;
    }
    char::from_u32(u32::from(unit)).is_some_and(char::is_whitespace)
}

/// Returns the first position at or after `pos` that is not a separator.
pub(crate) fn skip_separators(units: &[u16], mut pos: usize) -> usize {
    while units.get(pos).is_some_and(|&u| is_separator(u)) {
        pos += 1;
    }
    pos
}

pub(crate) fn is_digit(unit: u16) -> bool {
    (u16::from(b'0')..=u16::from(b'9')).contains(&unit)
}

fn skip_digits(units: &[u16], mut pos: usize) -> usize {
    while units.get(pos).is_some_and(|&u| is_digit(u)) {
        pos += 1;
    }
    pos
}

/// Scans `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?` starting at `start`.
/// Returns the value and the position just past the literal.
pub(crate) fn scan_number(units: &[u16], start: usize) -> Result<(f64, usize)> {
    let invalid = |pos| Error::syntax(SyntaxErrorKind::InvalidNumber, pos);
    let mut pos = start;

    if units.get(pos) == Some(&MINUS) {
        pos += 1;
    }
    match units.get(pos) {
        Some(&ZERO) => {
            pos += 1;
            if units.get(pos).is_some_and(|&u| is_digit(u)) {
                return Err(invalid(pos));
            }
        }
        Some(&u) if is_digit(u) => pos = skip_digits(units, pos),
        _ => return Err(invalid(pos)),
    }

    if units.get(pos) == Some(&DOT) {
        pos += 1;
        if !units.get(pos).is_some_and(|&u| is_digit(u)) {
            return Err(invalid(pos));
        }
        pos = skip_digits(units, pos);
    }

    if matches!(units.get(pos), Some(&u) if u == u16::from(b'e') || u == u16::from(b'E')) {
        pos += 1;
        if matches!(units.get(pos), Some(&PLUS) | Some(&MINUS)) {
            pos += 1;
        }
        if !units.get(pos).is_some_and(|&u| is_digit(u)) {
            return Err(invalid(pos));
        }
        pos = skip_digits(units, pos);
    }

    // Every unit in range is ASCII by construction.
    let literal: String = units[start..pos]
        .iter()
        .map(|&u| char::from(u as u8))
        .collect();
    let value = literal.parse::<f64>().map_err(|_| invalid(start))?;
    Ok((value, pos))
}

fn hex_value(unit: u16) -> Option<u16> {
    char::from_u32(u32::from(unit))
        .and_then(|c| c.to_digit(16))
        .map(|d| d as u16)
}

/// Scans a string literal whose opening quote is at `start`, decoding escapes.
/// Returns the decoded string and the position just past the closing quote.
pub(crate) fn scan_string(units: &[u16], start: usize) -> Result<(JsString, usize)> {
    let mut pos = start + 1;
    let mut out = Vec::new();

    loop {
        let Some(&unit) = units.get(pos) else {
            return Err(Error::syntax(SyntaxErrorKind::UnexpectedEnd, units.len()));
        };
        match unit {
            QUOTE => return Ok((JsString::from(out), pos + 1)),
            BACKSLASH => {
                let Some(&escape) = units.get(pos + 1) else {
                    return Err(Error::syntax(SyntaxErrorKind::UnexpectedEnd, units.len()));
                };
                let decoded = match u8::try_from(escape).unwrap_or(0) {
                    b'"' => QUOTE,
                    b'\\' => BACKSLASH,
                    b'/' => u16::from(b'/'),
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'n' => 0x0a,
                    b'r' => 0x0d,
                    b't' => 0x09,
                    b'u' => {
                        out.push(scan_unicode_escape(units, pos)?);
                        pos += 6;
                        continue;
                    }
                    _ => return Err(Error::syntax(SyntaxErrorKind::InvalidEscape, pos)),
                };
                out.push(decoded);
                pos += 2;
            }
            u if u <= 0x1f => {
                return Err(Error::syntax(SyntaxErrorKind::InvalidStringChar(u), pos));
            }
            u => {
                out.push(u);
                pos += 1;
            }
        }
    }
}

/// Decodes the four hex digits of a `\uXXXX` escape starting at `pos` (the backslash).
fn scan_unicode_escape(units: &[u16], pos: usize) -> Result<u16> {
    let mut code = 0u16;
    for offset in 2..6 {
        let Some(&unit) = units.get(pos + offset) else {
            return Err(Error::syntax(SyntaxErrorKind::UnexpectedEnd, units.len()));
        };
        let digit =
            hex_value(unit).ok_or_else(|| Error::syntax(SyntaxErrorKind::InvalidEscape, pos))?;
        code = (code << 4) | digit;
    }
    Ok(code)
}

/// True when `word` occurs at `pos`.
pub(crate) fn match_keyword(units: &[u16], pos: usize, word: &str) -> bool {
    word.encode_utf16()
        .enumerate()
        .all(|(i, w)| units.get(pos + i) == Some(&w))
}
