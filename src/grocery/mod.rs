//! Grocery list engine
//!
//! Parses ingredient lines, normalizes and converts units, and merges
//! quantities across recipes into a single list.

pub mod aggregate;
pub mod format;
pub mod quantity;
pub mod units;

pub use aggregate::{
    aggregate, combine_ingredients, grouping_key, AggregatedItem, IngredientSource,
};
pub use format::format_quantity;
pub use quantity::{parse_amount, parse_ingredient, ParsedQuantity};
pub use units::{convert, is_canonical, normalize_unit, CANONICAL_UNITS, CONVERSIONS};
