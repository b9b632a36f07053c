//! Ingredient aggregation
//!
//! Merges ingredient lines from many recipes into one shopping list,
//! converting between units where a direct conversion exists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::format::format_quantity;
use super::quantity::parse_ingredient;
use super::units::convert;

/// Anything that carries raw ingredient lines (a stored recipe, an imported one)
pub trait IngredientSource {
    fn ingredient_lines(&self) -> &[String];
}

impl IngredientSource for Vec<String> {
    fn ingredient_lines(&self) -> &[String] {
        self
    }
}

/// One line of the combined grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedItem {
    /// Name as written by the first line that introduced this item
    pub name: String,
    /// Summed amount, in `unit`
    pub qty: f64,
    /// Canonical unit, empty, or `"a+b"` when incompatible units were summed
    /// as raw numbers (the amount is then only indicative)
    pub unit: String,
    /// Raw lines that contributed, in encounter order
    pub sources: Vec<String>,
}

impl AggregatedItem {
    /// Grouping key shared by every line that merges into this item
    pub fn key(&self) -> String {
        grouping_key(&self.name)
    }

    /// Whether the unit records an unreconciled mix of units
    pub fn is_composite(&self) -> bool {
        self.unit.contains('+')
    }

    /// Formatted amount with its unit, e.g. `"1 1/2 cup"`; empty when the
    /// amount formats empty
    pub fn display_amount(&self) -> String {
        let qty = format_quantity(self.qty);
        if qty.is_empty() {
            return qty;
        }
        if self.unit.is_empty() {
            qty
        } else {
            format!("{} {}", qty, self.unit)
        }
    }

    /// Human-readable list entry, e.g. `"2 tbsp olive oil"` or `"salt"`
    pub fn label(&self) -> String {
        let amount = self.display_amount();
        if amount.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", amount, self.name)
        }
    }

    fn merge(&mut self, qty: f64, unit: &str) {
        if unit.is_empty() || self.unit.is_empty() {
            // A unitless amount is taken to share the other side's unit
            self.qty += qty;
            if self.unit.is_empty() {
                self.unit = unit.to_string();
            }
            return;
        }

        if let Some(converted) = convert(qty, unit, &self.unit) {
            self.qty += converted;
        } else if let Some(existing) = convert(self.qty, &self.unit, unit) {
            self.qty = existing + qty;
            self.unit = unit.to_string();
        } else {
            tracing::debug!(
                "No conversion between '{}' and '{}' for '{}'; summing raw amounts",
                self.unit,
                unit,
                self.name
            );
            self.qty += qty;
            if unit != self.unit {
                self.unit = format!("{}+{}", self.unit, unit);
            }
        }
    }
}

/// Normalized grouping key for an ingredient name
pub fn grouping_key(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}

/// Aggregate raw ingredient lines into grocery items sorted by name.
///
/// Lines whose parsed name is empty (blank lines, a bare number) name
/// nothing to buy and are skipped.
pub fn aggregate<I, S>(lines: I) -> Vec<AggregatedItem>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items: Vec<AggregatedItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        let line = line.as_ref();
        let parsed = parse_ingredient(line);
        let key = grouping_key(&parsed.name);
        if key.is_empty() {
            continue;
        }

        match index.get(&key) {
            Some(&i) => {
                let item = &mut items[i];
                item.merge(parsed.amount, &parsed.unit);
                item.sources.push(line.to_string());
            }
            None => {
                index.insert(key, items.len());
                items.push(AggregatedItem {
                    name: parsed.name,
                    qty: parsed.amount,
                    unit: parsed.unit,
                    sources: vec![line.to_string()],
                });
            }
        }
    }

    items.sort_by_cached_key(|item| item.name.to_lowercase());
    items
}

/// Aggregate the ingredients of several recipes, in recipe order
pub fn combine_ingredients<R: IngredientSource>(recipes: &[R]) -> Vec<AggregatedItem> {
    aggregate(
        recipes
            .iter()
            .flat_map(|recipe| recipe.ingredient_lines().iter()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(items: &'a [AggregatedItem], name: &str) -> &'a AggregatedItem {
        items
            .iter()
            .find(|i| i.key() == name)
            .unwrap_or_else(|| panic!("no item named {}", name))
    }

    #[test]
    fn test_merge_compatible_units() {
        let items = aggregate(["1 tbsp olive oil", "2 tsp olive oil"]);
        assert_eq!(items.len(), 1);
        let oil = &items[0];
        assert_eq!(oil.name, "olive oil");
        assert_eq!(oil.unit, "tbsp");
        assert!((oil.qty - (1.0 + 2.0 / 3.0)).abs() < 1e-9);
        assert_eq!(oil.display_amount(), "1 2/3 tbsp");
    }

    #[test]
    fn test_merge_converts_into_existing_unit() {
        let items = aggregate(["1 cup butter", "2 tbsp butter"]);
        let butter = &items[0];
        assert_eq!(butter.unit, "cup");
        assert!((butter.qty - 1.125).abs() < 1e-9);

        let items = aggregate(["500 g rice", "1 kg rice"]);
        let rice = &items[0];
        assert_eq!(rice.unit, "g");
        assert!((rice.qty - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_units_become_composite() {
        let items = aggregate(["1 cup flour", "200 g flour"]);
        assert_eq!(items.len(), 1);
        let flour = &items[0];
        assert_eq!(flour.unit, "cup+g");
        assert_eq!(flour.qty, 201.0);
        assert!(flour.is_composite());
    }

    #[test]
    fn test_no_transitive_conversion() {
        let items = aggregate(["1 cup sugar", "3 tsp sugar"]);
        assert_eq!(items[0].unit, "cup+tsp");
        assert_eq!(items[0].qty, 4.0);
    }

    #[test]
    fn test_same_unknown_unit_sums_without_composite() {
        let items = aggregate(["2 sprigs thyme", "1 sprigs thyme"]);
        assert_eq!(items[0].unit, "sprigs");
        assert_eq!(items[0].qty, 3.0);
    }

    #[test]
    fn test_unitless_adopts_other_unit() {
        let items = aggregate(["2 lemons", "1 lemons"]);
        assert_eq!(items[0].unit, "");
        assert_eq!(items[0].qty, 3.0);

        let items = aggregate(["salt", "1 tsp salt"]);
        let salt = &items[0];
        assert_eq!(salt.unit, "tsp");
        assert_eq!(salt.qty, 1.0);
        assert_eq!(salt.name, "salt");
    }

    #[test]
    fn test_grouping_is_case_insensitive_not_synonym_aware() {
        let items = aggregate(["1 Tomato", "2 tomato ", "3 tomatoes"]);
        assert_eq!(items.len(), 2);
        let tomato = find(&items, "tomato");
        assert_eq!(tomato.name, "Tomato");
        assert_eq!(tomato.qty, 3.0);
        assert_eq!(find(&items, "tomatoes").qty, 3.0);
    }

    #[test]
    fn test_sources_kept_in_encounter_order() {
        let lines = ["1 cup milk", "garlic", "2 cups milk", "1 cup flour", "1/2 cup milk"];
        let items = aggregate(lines);
        let milk = find(&items, "milk");
        assert_eq!(milk.sources, vec!["1 cup milk", "2 cups milk", "1/2 cup milk"]);
        assert_eq!(milk.qty, 3.5);
    }

    #[test]
    fn test_sorted_by_name_for_any_order() {
        let lines = vec!["1 cup Zucchini", "2 eggs", "1 tsp Basil", "salt"];
        let expected = vec!["Basil", "eggs", "salt", "Zucchini"];

        let forward: Vec<String> = aggregate(&lines).into_iter().map(|i| i.name).collect();
        let mut reversed_lines = lines.clone();
        reversed_lines.reverse();
        let backward: Vec<String> = aggregate(&reversed_lines).into_iter().map(|i| i.name).collect();

        assert_eq!(forward, expected);
        assert_eq!(backward, expected);
    }

    #[test]
    fn test_blank_and_bare_number_lines_skipped() {
        let items = aggregate(["", "   ", "2", "1 cup rice"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "rice");
    }

    #[test]
    fn test_unparseable_line_still_listed() {
        let items = aggregate(["a pinch of love"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label(), "a pinch of love");
        assert_eq!(items[0].display_amount(), "");
    }

    #[test]
    fn test_combine_ingredients_across_recipes() {
        let pancakes = vec!["1 1/2 cups flour".to_string(), "2 eggs".to_string()];
        let bread = vec!["½ cup flour".to_string(), "1 tsp salt".to_string()];
        let items = combine_ingredients(&[pancakes, bread]);

        let flour = find(&items, "flour");
        assert_eq!(flour.qty, 2.0);
        assert_eq!(flour.label(), "2 cup flour");
        assert_eq!(flour.sources, vec!["1 1/2 cups flour", "½ cup flour"]);
        assert_eq!(find(&items, "eggs").label(), "2 eggs");
    }

    #[test]
    fn test_rerun_is_independent() {
        let lines = ["1 cup flour", "1 cup flour"];
        assert_eq!(aggregate(lines), aggregate(lines));
    }
}
