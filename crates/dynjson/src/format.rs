//! Escape table and number formatting shared by the serializer.
//!
//! # Escape table
//!
//! | code unit            | output        |
//! |----------------------|---------------|
//! | `"`                  | `\"`          |
//! | `\`                  | `\\`          |
//! | U+0008 U+0009 U+000A U+000C U+000D | `\b \t \n \f \r` |
//! | other U+0000..U+001F | `\u00xx`      |
//! | lone surrogate       | `\udxxx`      |
//!
//! Everything else is copied verbatim.

use std::fmt::Write;

/// Appends `units` to `out`, escaped per the table above (no surrounding quotes).
pub fn escape_into(out: &mut String, units: &[u16]) {
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(ch) => escape_char(out, ch),
            // A Rust string cannot hold it raw; the escape reads back as the same unit.
            Err(lone) => push_unicode_escape(out, lone.unpaired_surrogate()),
        }
    }
}

/// Appends `units` as a quoted, escaped string literal.
pub fn quote_into(out: &mut String, units: &[u16]) {
    out.push('"');
    escape_into(out, units);
    out.push('"');
}

fn escape_char(out: &mut String, ch: char) {
    match ch {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\u{08}' => out.push_str("\\b"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\u{0c}' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        c if u32::from(c) <= 0x1f => push_unicode_escape(out, c as u16),
        c => out.push(c),
    }
}

fn push_unicode_escape(out: &mut String, unit: u16) {
    // Writing into a String cannot fail.
    let _ = write!(out, "\\u{:04x}", unit);
}

/// Formats a number the way the runtime's Number-to-String conversion does:
/// shortest round-trip digits, plain notation for decimal exponents in
/// (-6, 21], exponent notation (`1e+21`, `1.5e-7`) outside it, and `-0` as `0`.
///
/// Non-finite values give `NaN`/`Infinity`/`-Infinity`; the serializer writes
/// those as `null` instead.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` renders the shortest round-trip digits as `d.ddde±x`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let n = exponent + 1;
    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (integer, fraction) = digits.split_at(n as usize);
        format!("{integer}.{fraction}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let e_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{e_sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{e_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(s: &str) -> String {
        let units: Vec<u16> = s.encode_utf16().collect();
        let mut out = String::new();
        escape_into(&mut out, &units);
        out
    }

    #[test]
    fn short_escapes() {
        assert_eq!(escaped("a\"b\\c"), r#"a\"b\\c"#);
        assert_eq!(escaped("\u{8}\t\n\u{c}\r"), r"\b\t\n\f\r");
    }

    #[test]
    fn other_controls_use_lowercase_hex() {
        assert_eq!(escaped("\u{0}\u{1f}\u{b}"), r"\u0000\u001f\u000b");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(escaped("café ☕ 𝄞 /"), "café ☕ 𝄞 /");
        assert_eq!(escaped("\u{7f}\u{2028}"), "\u{7f}\u{2028}");
    }

    #[test]
    fn lone_surrogates_are_escaped() {
        let mut out = String::new();
        escape_into(&mut out, &[0x61, 0xd800, 0x62, 0xdfff]);
        assert_eq!(out, r"a\ud800b\udfff");
    }

    #[test]
    fn integers_and_fractions() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(2.75), "2.75");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(123.456), "123.456");
    }

    #[test]
    fn exponent_thresholds() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e22), "1.5e+22");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-10), "-2.5e-10");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
