//! Loading/empty rendering helpers, and nutrient tables.
use crate::{
    model::{NutrientAmount, NutrientMap},
    view::Node,
};

/// Macronutrients (and energy), in display order.
pub const MACRO_KEYS: [&str; 4] = ["Energy", "Protein", "Carbohydrate, by difference", "Total lipid (fat)"];

/// Combines a "loading" and a "loaded" renderer: the result renders `loaded` once the props are
/// available, `loading` before that.
pub fn with_loading<P, V>(loading: impl Fn() -> V, loaded: impl Fn(&P) -> V) -> impl Fn(Option<&P>) -> V {
    move |props| match props {
        Some(props) => loaded(props),
        None => loading(),
    }
}

/// Renders `render()` only if `condition` holds.
pub fn enable_if(condition: bool, render: impl FnOnce() -> Node) -> Node {
    if condition {
        render()
    } else {
        Node::Empty
    }
}

/// Keeps only the macronutrients. Keys missing from `nutrients` stay missing.
pub fn only_macros(nutrients: &NutrientMap) -> NutrientMap {
    MACRO_KEYS
        .iter()
        .filter_map(|&key| nutrients.get(key).map(|amount| (key.to_string(), amount.clone())))
        .collect()
}

/// A displayed line of a nutrient table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NutrientRow {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

/// The lines of a nutrient table: nutrients of at least one unit, amounts rounded to integers.
pub fn nutrient_rows(nutrients: &NutrientMap) -> Vec<NutrientRow> {
    nutrients
        .iter()
        .filter(|(_, NutrientAmount(amount, _))| *amount >= 1.0)
        .map(|(name, NutrientAmount(amount, unit))| NutrientRow {
            name: name.clone(),
            amount: format!("{amount:.0}"),
            unit: unit.clone(),
        })
        .collect()
}

/// Renders a nutrient table, or nothing if no nutrient is worth showing.
pub fn nutrient_details(nutrients: &NutrientMap) -> Node {
    let rows = nutrient_rows(nutrients);
    if rows.is_empty() {
        return Node::Empty;
    }
    Node::group(
        "nutrient-list",
        rows.into_iter()
            .map(|row| {
                Node::group(
                    "nutrient-list-item",
                    vec![Node::text(row.name), Node::text(row.amount), Node::text(row.unit)],
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64, &str)]) -> NutrientMap {
        entries
            .iter()
            .map(|(name, amount, unit)| (name.to_string(), NutrientAmount(*amount, unit.to_string())))
            .collect()
    }

    #[test]
    fn only_macros_filters_without_inserting() {
        let nutrients = map(&[("Energy", 52.0, "kcal"), ("Vitamin C", 4.6, "mg"), ("Protein", 0.3, "g")]);
        let macros = only_macros(&nutrients);
        assert_eq!(macros.keys().collect::<Vec<_>>(), ["Energy", "Protein"]);
        assert!(only_macros(&NutrientMap::new()).is_empty());
    }

    #[test]
    fn rows_skip_trace_amounts() {
        let rows = nutrient_rows(&map(&[("Energy", 52.4, "kcal"), ("Protein", 0.3, "g")]));
        assert_eq!(
            rows,
            vec![NutrientRow {
                name: "Energy".into(),
                amount: "52".into(),
                unit: "kcal".into()
            }]
        );
        assert!(nutrient_details(&map(&[("Protein", 0.3, "g")])).is_empty());
    }

    #[test]
    fn loading_then_loaded() {
        let render = with_loading(|| "loading".to_string(), |units: &Vec<&str>| units.join("/"));
        assert_eq!(render(None), "loading");
        assert_eq!(render(Some(&vec!["gram", "cup"])), "gram/cup");
    }

    #[test]
    fn enable_if_renders_nothing_when_disabled() {
        assert!(enable_if(false, || Node::text("hidden")).is_empty());
        assert!(enable_if(true, || Node::text("shown")).contains_text("shown"));
    }
}
