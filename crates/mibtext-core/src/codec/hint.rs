//! Display-hint interpreter.
//!
//! A hint string is an ordered list of field clauses, each describing how a
//! run of bytes renders as text: an optional repeat flag (a leading count
//! byte in the data), an optional field length (implicit length means
//! "consume the remaining bytes"), a format letter, and an optional
//! separator/terminator character. Formatting walks the clauses against a
//! byte buffer big-endian, reusing the final clause while data remains.
//!
//! Integer hints (`d`, `d-N`, `x`, `o`, `b`) apply to the numeric value
//! directly; `d-N` renders a fixed-point decimal with N implied fractional
//! digits.
//!
//! Parsing text back into bytes is supported for clauses with explicit
//! lengths, which covers the common textual conventions (DateAndTime, fixed
//! hex and ASCII fields). Repeat and implicit-length clauses are
//! format-only; see [`MibError::UnsupportedHintParse`].

use crate::error::MibError;
use std::fmt::Write;

/// Field rendering mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HintRadix {
    /// `d` — decimal, optionally fixed-point.
    Decimal,
    /// `x` — lowercase hexadecimal.
    Hex,
    /// `o` — octal.
    Octal,
    /// `b` — binary.
    Binary,
    /// `a` — ASCII text.
    Ascii,
    /// `t` — UTF-8 text.
    Utf8,
    /// `h` — hex dump (zero-padded pairs, space separated).
    Dump,
}

/// One parsed hint clause.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintClause {
    /// Repeat flag: the current data byte holds the repetition count.
    pub repeat: bool,
    /// Field length in bytes; `None` consumes the remaining buffer.
    pub length: Option<usize>,
    /// Rendering mode.
    pub radix: HintRadix,
    /// Implied fractional digits for fixed-point decimal.
    pub fraction: u32,
    /// Character appended after each rendered field.
    pub separator: Option<char>,
    /// Character appended after a repeat block.
    pub terminator: Option<char>,
}

/// A compiled display hint.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayHint {
    raw: String,
    clauses: Vec<HintClause>,
}

/// Numeric fields wider than this are folded into their low 16 bytes.
const MAX_NUMERIC_FIELD: usize = 16;

fn is_clause_start(c: char) -> bool {
    c == '*' || c.is_ascii_digit()
}

impl DisplayHint {
    /// Compile a hint string.
    pub fn parse(hint: &str) -> Result<Self, MibError> {
        let malformed = |reason: &'static str| MibError::MalformedDisplayHint {
            hint: hint.to_owned(),
            reason,
        };
        if hint.is_empty() {
            return Err(malformed("empty hint"));
        }

        let chars: Vec<char> = hint.chars().collect();
        let mut clauses = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let repeat = chars[i] == '*';
            if repeat {
                i += 1;
            }

            let digits_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let length = if i > digits_start {
                let n: usize = chars[digits_start..i]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .map_err(|_| malformed("field length out of range"))?;
                if n == 0 {
                    return Err(malformed("zero field length"));
                }
                Some(n)
            } else {
                None
            };

            let radix = match chars.get(i) {
                Some('d') => HintRadix::Decimal,
                Some('x') => HintRadix::Hex,
                Some('o') => HintRadix::Octal,
                Some('b') => HintRadix::Binary,
                Some('a') => HintRadix::Ascii,
                Some('t') => HintRadix::Utf8,
                Some('h') => HintRadix::Dump,
                Some(_) => return Err(malformed("unknown format letter")),
                None => return Err(malformed("missing format letter")),
            };
            i += 1;

            // `d-N`: implied decimal point, only in the integer (lengthless)
            // form. With a length present, `-` is an ordinary separator.
            let mut fraction = 0u32;
            if radix == HintRadix::Decimal
                && length.is_none()
                && chars.get(i) == Some(&'-')
            {
                i += 1;
                let f_start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i == f_start {
                    return Err(malformed("missing fraction digits"));
                }
                fraction = chars[f_start..i]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .map_err(|_| malformed("fraction out of range"))?;
            }

            let mut separator = None;
            if let Some(&c) = chars.get(i) {
                if !is_clause_start(c) {
                    separator = Some(c);
                    i += 1;
                }
            }
            let mut terminator = None;
            if repeat {
                if let Some(&c) = chars.get(i) {
                    if !is_clause_start(c) {
                        terminator = Some(c);
                        i += 1;
                    }
                }
            }

            clauses.push(HintClause {
                repeat,
                length,
                radix,
                fraction,
                separator,
                terminator,
            });
        }

        Ok(Self {
            raw: hint.to_owned(),
            clauses,
        })
    }

    /// The original hint string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed clauses.
    #[must_use]
    pub fn clauses(&self) -> &[HintClause] {
        &self.clauses
    }

    /// Render a byte buffer.
    #[must_use]
    pub fn format_bytes(&self, data: &[u8]) -> String {
        let mut out = String::new();
        let mut i = 0;
        let mut next_clause = 0;

        while i < data.len() {
            let clause = &self.clauses[next_clause.min(self.clauses.len() - 1)];
            next_clause += 1;

            if clause.repeat {
                let reps = data[i] as usize;
                i += 1;
                for r in 0..reps {
                    if i >= data.len() {
                        break;
                    }
                    let take = clause.length.unwrap_or(data.len() - i).min(data.len() - i);
                    format_field(&mut out, clause, &data[i..i + take]);
                    i += take;
                    if r + 1 < reps {
                        if let Some(sep) = clause.separator {
                            out.push(sep);
                        }
                    }
                }
                if let Some(term) = clause.terminator {
                    out.push(term);
                }
            } else {
                let take = clause.length.unwrap_or(data.len() - i).min(data.len() - i);
                format_field(&mut out, clause, &data[i..i + take]);
                i += take;
                if let Some(sep) = clause.separator {
                    out.push(sep);
                }
            }
        }
        out
    }

    /// Render an integer through the first clause.
    #[must_use]
    pub fn format_int(&self, v: i64) -> String {
        let clause = &self.clauses[0];
        let mut out = String::new();
        if v < 0 {
            out.push('-');
        }
        let mag = u128::from(v.unsigned_abs());
        match clause.radix {
            HintRadix::Decimal => push_decimal(&mut out, mag, clause.fraction),
            HintRadix::Hex => {
                let _ = write!(out, "{mag:x}");
            }
            HintRadix::Octal => {
                let _ = write!(out, "{mag:o}");
            }
            HintRadix::Binary => {
                let _ = write!(out, "{mag:b}");
            }
            // Text modes make no sense for an integer hint; fall back to
            // plain decimal.
            HintRadix::Ascii | HintRadix::Utf8 | HintRadix::Dump => {
                let _ = write!(out, "{mag}");
            }
        }
        out
    }

    /// Parse hinted text back into the integer it renders.
    pub fn parse_int(&self, text: &str) -> Result<i64, MibError> {
        let clause = &self.clauses[0];
        let bad = || MibError::BadValue {
            text: text.to_owned(),
            expected: "hinted integer",
        };

        let mut t = text.trim();
        if let Some(sep) = clause.separator {
            if let Some(stripped) = t.strip_suffix(sep) {
                t = stripped;
            }
        }
        let negative = t.starts_with('-');
        if negative {
            t = &t[1..];
        }

        let mag: i64 = match clause.radix {
            HintRadix::Decimal if clause.fraction > 0 => {
                let digits: String = t.chars().filter(|&c| c != '.').collect();
                if t.chars().filter(|&c| c == '.').count() > 1 || digits.is_empty() {
                    return Err(bad());
                }
                digits.parse().map_err(|_| bad())?
            }
            HintRadix::Decimal => t.parse().map_err(|_| bad())?,
            HintRadix::Hex => i64::from_str_radix(t, 16).map_err(|_| bad())?,
            HintRadix::Octal => i64::from_str_radix(t, 8).map_err(|_| bad())?,
            HintRadix::Binary => i64::from_str_radix(t, 2).map_err(|_| bad())?,
            HintRadix::Ascii | HintRadix::Utf8 | HintRadix::Dump => t.parse().map_err(|_| bad())?,
        };
        Ok(if negative { -mag } else { mag })
    }

    /// Parse hinted text back into bytes.
    ///
    /// Requires every clause to carry an explicit length and no repeat flag;
    /// anything else is reported as [`MibError::UnsupportedHintParse`]. The
    /// text may stop short of the clause list (fixed conventions with
    /// optional suffix fields) and may carry the final separator.
    pub fn parse_bytes(&self, text: &str) -> Result<Vec<u8>, MibError> {
        if self
            .clauses
            .iter()
            .any(|c| c.repeat || c.length.is_none() || c.radix == HintRadix::Dump)
        {
            return Err(MibError::UnsupportedHintParse {
                hint: self.raw.clone(),
            });
        }

        let bad = |what: &'static str, at: &str| MibError::BadValue {
            text: at.to_owned(),
            expected: what,
        };

        let mut out = Vec::new();
        let mut rest = text;
        for clause in &self.clauses {
            if rest.is_empty() {
                break;
            }
            let n = clause.length.expect("checked above");

            match clause.radix {
                HintRadix::Ascii | HintRadix::Utf8 => {
                    let mut take = n.min(rest.len());
                    while take < rest.len() && !rest.is_char_boundary(take) {
                        take += 1;
                    }
                    let (segment, tail) = rest.split_at(take);
                    out.extend_from_slice(segment.as_bytes());
                    rest = tail;
                    if let Some(sep) = clause.separator {
                        rest = rest.strip_prefix(sep).unwrap_or(rest);
                    }
                }
                HintRadix::Decimal | HintRadix::Hex | HintRadix::Octal | HintRadix::Binary => {
                    let segment;
                    if let Some(sep) = clause.separator {
                        match rest.find(sep) {
                            Some(pos) => {
                                segment = &rest[..pos];
                                rest = &rest[pos + sep.len_utf8()..];
                            }
                            None => {
                                segment = rest;
                                rest = "";
                            }
                        }
                    } else {
                        let end = rest
                            .find(|c: char| !c.is_ascii_hexdigit() && c != '.')
                            .unwrap_or(rest.len());
                        segment = &rest[..end];
                        rest = &rest[end..];
                    }
                    if segment.is_empty() {
                        return Err(bad("hinted field", rest));
                    }
                    let digits: String = segment.chars().filter(|&c| c != '.').collect();
                    let radix = match clause.radix {
                        HintRadix::Decimal => 10,
                        HintRadix::Hex => 16,
                        HintRadix::Octal => 8,
                        _ => 2,
                    };
                    let value =
                        u128::from_str_radix(&digits, radix).map_err(|_| bad("number", segment))?;
                    if n < MAX_NUMERIC_FIELD && value >> (8 * n) != 0 {
                        return Err(bad("field-sized number", segment));
                    }
                    for k in (0..n).rev() {
                        out.push((value >> (8 * k)) as u8);
                    }
                }
                HintRadix::Dump => unreachable!("rejected above"),
            }
        }

        if !rest.is_empty() {
            return Err(bad("end of hinted text", rest));
        }
        Ok(out)
    }
}

/// Render one field.
fn format_field(out: &mut String, clause: &HintClause, field: &[u8]) {
    match clause.radix {
        HintRadix::Decimal | HintRadix::Hex | HintRadix::Octal | HintRadix::Binary => {
            let slice = &field[field.len().saturating_sub(MAX_NUMERIC_FIELD)..];
            let value = slice.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
            match clause.radix {
                HintRadix::Decimal => push_decimal(out, value, clause.fraction),
                HintRadix::Hex => {
                    let _ = write!(out, "{value:x}");
                }
                HintRadix::Octal => {
                    let _ = write!(out, "{value:o}");
                }
                _ => {
                    let _ = write!(out, "{value:b}");
                }
            }
        }
        HintRadix::Ascii => {
            for &b in field {
                out.push(b as char);
            }
        }
        HintRadix::Utf8 => out.push_str(&String::from_utf8_lossy(field)),
        HintRadix::Dump => {
            for (k, &b) in field.iter().enumerate() {
                if k > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{b:02x}");
            }
        }
    }
}

/// Decimal with `fraction` implied fractional digits, zero-padded so the
/// point lands `fraction` digits from the right.
fn push_decimal(out: &mut String, value: u128, fraction: u32) {
    let mut s = value.to_string();
    let f = fraction as usize;
    if f > 0 {
        while s.len() < f {
            s.insert(0, '0');
        }
        s.insert(s.len() - f, '.');
    }
    out.push_str(&s);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_decimal() {
        let hint = DisplayHint::parse("d").unwrap();
        assert_eq!(hint.format_bytes(&[10]), "10");
        assert_eq!(hint.format_int(10), "10");
    }

    #[test]
    fn test_two_byte_hex() {
        let hint = DisplayHint::parse("2x").unwrap();
        assert_eq!(hint.format_bytes(&[0xFF, 0xFF]), "ffff");
    }

    #[test]
    fn test_multi_clause_with_separators() {
        let hint = DisplayHint::parse("1d.1d.1d.1d:2d:").unwrap();
        assert_eq!(hint.format_bytes(&[1, 2, 3, 4, 5, 6]), "1.2.3.4:1286:");
    }

    #[test]
    fn test_fixed_point() {
        let hint = DisplayHint::parse("d-3").unwrap();
        assert_eq!(hint.format_int(1), ".001");
        assert_eq!(hint.format_int(1234), "1.234");
        assert_eq!(hint.format_int(-45), "-.045");
    }

    #[test]
    fn test_fixed_point_round_trip() {
        let hint = DisplayHint::parse("d-2").unwrap();
        for v in [0, 1, 99, 100, 12345, -7] {
            assert_eq!(hint.parse_int(&hint.format_int(v)).unwrap(), v);
        }
    }

    #[test]
    fn test_mac_address_style() {
        let hint = DisplayHint::parse("1x:").unwrap();
        assert_eq!(
            hint.format_bytes(&[0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]),
            "0:1a:2b:3c:4d:5e:"
        );
    }

    #[test]
    fn test_display_string_consumes_all() {
        let hint = DisplayHint::parse("255a").unwrap();
        assert_eq!(hint.format_bytes(b"hello"), "hello");
    }

    #[test]
    fn test_last_clause_repeats() {
        let hint = DisplayHint::parse("1d.").unwrap();
        assert_eq!(hint.format_bytes(&[1, 2, 3]), "1.2.3.");
    }

    #[test]
    fn test_date_and_time() {
        let hint = DisplayHint::parse("2d-1d-1d,1d:1d:1d.1d,1a1d:1d").unwrap();
        let bytes = [0x07, 0xD7, 12, 31, 14, 30, 15, 0];
        assert_eq!(hint.format_bytes(&bytes), "2007-12-31,14:30:15.0,");

        let parsed = hint.parse_bytes("2007-12-31,14:30:15.0").unwrap();
        assert_eq!(parsed, bytes);
        // The emitted trailing separator is tolerated on the way back in.
        assert_eq!(hint.parse_bytes("2007-12-31,14:30:15.0,").unwrap(), bytes);
    }

    #[test]
    fn test_parse_bytes_fixed_hex() {
        let hint = DisplayHint::parse("2x").unwrap();
        assert_eq!(hint.parse_bytes("ffff").unwrap(), vec![0xFF, 0xFF]);
        assert!(hint.parse_bytes("10000").is_err(), "overflows two bytes");
    }

    #[test]
    fn test_parse_bytes_rejects_implicit_length() {
        let hint = DisplayHint::parse("d").unwrap();
        assert!(matches!(
            hint.parse_bytes("10"),
            Err(MibError::UnsupportedHintParse { .. })
        ));
    }

    #[test]
    fn test_parse_bytes_rejects_repeat() {
        let hint = DisplayHint::parse("*1d.").unwrap();
        assert!(matches!(
            hint.parse_bytes("1.2"),
            Err(MibError::UnsupportedHintParse { .. })
        ));
    }

    #[test]
    fn test_repeat_formatting() {
        let hint = DisplayHint::parse("*1d.").unwrap();
        // Leading count byte controls repetitions.
        assert_eq!(hint.format_bytes(&[3, 7, 8, 9]), "7.8.9");
    }

    #[test]
    fn test_repeat_with_terminator() {
        let hint = DisplayHint::parse("*1d.;").unwrap();
        assert_eq!(hint.format_bytes(&[2, 7, 8]), "7.8;");
    }

    #[test]
    fn test_malformed_hints() {
        assert!(DisplayHint::parse("").is_err());
        assert!(DisplayHint::parse("5").is_err());
        assert!(DisplayHint::parse("q").is_err());
        assert!(DisplayHint::parse("0d").is_err());
        assert!(DisplayHint::parse("d-").is_err());
    }

    #[test]
    fn test_hex_dump() {
        let hint = DisplayHint::parse("h").unwrap();
        assert_eq!(hint.format_bytes(&[0xDE, 0xAD, 0x01]), "de ad 01");
    }

    #[test]
    fn test_int_hex_hint() {
        let hint = DisplayHint::parse("x").unwrap();
        assert_eq!(hint.format_int(255), "ff");
        assert_eq!(hint.parse_int("ff").unwrap(), 255);
    }
}
