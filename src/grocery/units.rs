//! Unit normalization and conversion
//!
//! Maps raw unit tokens onto canonical symbols and converts between the few
//! unit pairs with a fixed, directly tabulated ratio.

/// Canonical unit symbols recognised by the normalizer
pub const CANONICAL_UNITS: &[&str] = &[
    "tbsp", "tsp", "cup", "oz", "lb", "g", "kg", "ml", "l", "pinch", "clove", "can", "bunch",
    "slice", "piece",
];

/// `(smaller, larger, factor)`: `factor` smaller units make one larger unit.
///
/// Only these direct pairs convert; tsp never reaches cup through tbsp.
pub const CONVERSIONS: &[(&str, &str, f64)] = &[
    ("tsp", "tbsp", 3.0),
    ("tbsp", "cup", 16.0),
    ("g", "kg", 1000.0),
    ("ml", "l", 1000.0),
    ("oz", "lb", 16.0),
];

/// Look up a raw token in the alias table (exact match, case-sensitive)
fn alias(raw: &str) -> Option<&'static str> {
    let canonical = match raw {
        "tbsp" | "tablespoon" | "tablespoons" | "tbsps" | "tbs" | "T" => "tbsp",
        "tsp" | "teaspoon" | "teaspoons" | "tsps" | "t" => "tsp",
        "cup" | "cups" | "c" => "cup",
        "oz" | "ounce" | "ounces" => "oz",
        "lb" | "pound" | "pounds" | "lbs" => "lb",
        "g" | "gram" | "grams" => "g",
        "kg" | "kilogram" | "kilograms" => "kg",
        "ml" | "milliliter" | "milliliters" | "millilitres" => "ml",
        "l" | "liter" | "liters" | "litres" | "litre" => "l",
        "pinch" | "pinches" => "pinch",
        "clove" | "cloves" => "clove",
        "can" | "cans" => "can",
        "bunch" | "bunches" => "bunch",
        "slice" | "slices" => "slice",
        "piece" | "pieces" => "piece",
        _ => return None,
    };
    Some(canonical)
}

/// Normalize a raw unit token to its canonical symbol.
///
/// The exact token is tried first so that `T` (tablespoon) and `t`
/// (teaspoon) stay distinct; then its lowercase form. Unknown units come
/// back lowercased rather than rejected.
pub fn normalize_unit(raw: &str) -> String {
    if let Some(canonical) = alias(raw) {
        return canonical.to_string();
    }
    let lower = raw.to_lowercase();
    match alias(&lower) {
        Some(canonical) => canonical.to_string(),
        None => lower,
    }
}

/// Whether a unit is one of the canonical symbols
pub fn is_canonical(unit: &str) -> bool {
    CANONICAL_UNITS.contains(&unit)
}

/// Convert `amount` from one unit to another.
///
/// Returns `None` when no direct conversion exists; that is an ordinary
/// outcome, not an error.
pub fn convert(amount: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
    if from_unit == to_unit {
        return Some(amount);
    }

    CONVERSIONS.iter().find_map(|&(smaller, larger, factor)| {
        if (smaller, larger) == (from_unit, to_unit) {
            Some(amount / factor)
        } else if (smaller, larger) == (to_unit, from_unit) {
            Some(amount * factor)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plurals_and_case() {
        assert_eq!(normalize_unit("Tablespoons"), "tbsp");
        assert_eq!(normalize_unit("tbsp"), "tbsp");
        assert_eq!(normalize_unit("CUPS"), "cup");
        assert_eq!(normalize_unit("Grams"), "g");
        assert_eq!(normalize_unit("lbs"), "lb");
        assert_eq!(normalize_unit("litre"), "l");
        assert_eq!(normalize_unit("cloves"), "clove");
    }

    #[test]
    fn test_normalize_single_letter_case_sensitive() {
        assert_eq!(normalize_unit("T"), "tbsp");
        assert_eq!(normalize_unit("t"), "tsp");
        assert_eq!(normalize_unit("c"), "cup");
        assert_eq!(normalize_unit("C"), "cup");
    }

    #[test]
    fn test_normalize_unknown_is_lowercased() {
        assert_eq!(normalize_unit("Handful"), "handful");
        assert_eq!(normalize_unit("large"), "large");
        assert!(!is_canonical("handful"));
    }

    #[test]
    fn test_every_canonical_unit_maps_to_itself() {
        for unit in CANONICAL_UNITS {
            assert_eq!(normalize_unit(unit), *unit);
            assert!(is_canonical(unit));
        }
    }

    #[test]
    fn test_convert_identity() {
        assert_eq!(convert(2.5, "pinch", "pinch"), Some(2.5));
    }

    #[test]
    fn test_convert_direct_pairs() {
        assert_eq!(convert(3.0, "tsp", "tbsp"), Some(1.0));
        assert_eq!(convert(1.0, "tbsp", "tsp"), Some(3.0));
        assert_eq!(convert(500.0, "g", "kg"), Some(0.5));
        assert_eq!(convert(2.0, "lb", "oz"), Some(32.0));
        assert_eq!(convert(8.0, "tbsp", "cup"), Some(0.5));
    }

    #[test]
    fn test_convert_is_not_transitive() {
        assert_eq!(convert(5.0, "tsp", "cup"), None);
        assert_eq!(convert(1.0, "cup", "tsp"), None);
    }

    #[test]
    fn test_convert_incompatible() {
        assert_eq!(convert(1.0, "cup", "g"), None);
        assert_eq!(convert(1.0, "clove", "bunch"), None);
    }
}
