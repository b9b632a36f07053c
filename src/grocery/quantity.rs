//! Ingredient line parsing
//!
//! Splits a free-text ingredient line such as `"1 1/2 cups flour, sifted"`
//! into an amount, a unit, and the item name.

use std::sync::LazyLock;

use fraction::{BigFraction, BigUint, ToPrimitive, Zero};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::units::normalize_unit;

/// Vulgar fraction glyphs and their textual form
const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Quantity, then optional unit, then the rest of the line as the name.
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\d\s/½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞.]+)\s*([a-zA-Z.]+)?\s*(.*)")
        .expect("ingredient line pattern is valid")
});

/// Separators trimmed from both ends of a parsed name
const NAME_SEPARATORS: &[char] = &[' ', ',', '.', '-', '\t'];

/// One parsed ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuantity {
    /// Amount in `unit`; 0 when no quantity could be read
    pub amount: f64,
    /// Canonical unit symbol, a lowercased unknown unit, or empty
    pub unit: String,
    /// Item name as written (trimmed)
    pub name: String,
    /// A leading quantity was read; false when the whole line became the name
    pub quantified: bool,
}

impl ParsedQuantity {
    fn whole_line(line: &str) -> Self {
        Self {
            amount: 0.0,
            unit: String::new(),
            name: line.to_string(),
            quantified: false,
        }
    }

    /// Whether parsing fell back to treating the whole line as the name
    pub fn is_unquantified(&self) -> bool {
        !self.quantified
    }
}

/// Parse an ingredient line.
///
/// Never fails: a line without a leading quantity, or with a quantity that
/// does not read as an exact number, becomes `(0, "", line)`.
pub fn parse_ingredient(line: &str) -> ParsedQuantity {
    let text = line.trim();

    let Some(caps) = LINE_RE.captures(text) else {
        return ParsedQuantity::whole_line(text);
    };

    let raw_qty = caps.get(1).map_or("", |m| m.as_str()).trim();
    let raw_unit = caps
        .get(2)
        .map_or("", |m| m.as_str())
        .trim()
        .trim_end_matches('.');
    let raw_name = caps.get(3).map_or("", |m| m.as_str()).trim();

    let Some(amount) = parse_amount(raw_qty) else {
        return ParsedQuantity::whole_line(text);
    };

    let mut unit = normalize_unit(raw_unit);
    let mut name = raw_name.trim_matches(NAME_SEPARATORS).to_string();

    // "2 eggs": the only word was taken as the unit
    if name.is_empty() && !raw_unit.is_empty() {
        name = raw_unit.to_string();
        unit.clear();
    }

    ParsedQuantity {
        amount,
        unit,
        name,
        quantified: true,
    }
}

/// Evaluate a quantity token such as `"1 1/2"`, `"0.75"` or `"¼"`.
///
/// Glyphs are replaced by their `n/d` text in place, so `"1½"` reads as
/// `"11/2"`. Parts separated by whitespace are then summed as exact big
/// rationals and converted to `f64`. Returns `None` if any part is not a
/// plain integer, decimal or `a/b` fraction, or if the sum has no finite
/// `f64` value.
pub fn parse_amount(token: &str) -> Option<f64> {
    let expanded = VULGAR_FRACTIONS
        .iter()
        .fold(token.to_string(), |text, (glyph, ascii)| {
            text.replace(*glyph, ascii)
        });

    let mut total = BigFraction::new(0u8, 1u8);
    for part in expanded.split_whitespace() {
        total = total + parse_rational(part)?;
    }
    total.to_f64().filter(|amount| amount.is_finite())
}

/// Parse one integer, decimal (`"1.5"`, `".5"`, `"2."`) or `a/b` part exactly
fn parse_rational(part: &str) -> Option<BigFraction> {
    if let Some((num, den)) = part.split_once('/') {
        let num = parse_digits(num)?;
        let den = parse_digits(den)?;
        if den.is_zero() {
            return None;
        }
        return Some(BigFraction::new(num, den));
    }

    let (whole, decimals) = part.split_once('.').unwrap_or((part, ""));
    if whole.is_empty() && decimals.is_empty() {
        return None;
    }
    let whole = if whole.is_empty() {
        BigUint::zero()
    } else {
        parse_digits(whole)?
    };
    if decimals.is_empty() {
        return Some(BigFraction::new(whole, 1u8));
    }

    let scale = BigUint::from(10u8).pow(u32::try_from(decimals.len()).ok()?);
    let numerator = whole * &scale + parse_digits(decimals)?;
    Some(BigFraction::new(numerator, scale))
}

fn parse_digits(s: &str) -> Option<BigUint> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
