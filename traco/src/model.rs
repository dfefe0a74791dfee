//! Records exchanged with the backend, and the drafts edited by the forms.
use crate::{lens::Field, list::KeyedVec};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use traco_common::impl_data_simple;

/// Unit code of the gram unit, available for every edible.
pub const GRAM: i64 = 0;
/// Unit code of the "fraction of the whole recipe" unit.
pub const FRACTION: i64 = -1;

/// Weight options of recipes, which have no units of their own.
pub static RECIPE_WEIGHTS: Lazy<Vec<Unit>> = Lazy::new(|| {
    vec![
        Unit {
            seq_num: GRAM,
            name: "grams".to_string(),
            grams: None,
        },
        Unit {
            seq_num: FRACTION,
            name: "fraction".to_string(),
            grams: None,
        },
    ]
});

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdibleKind {
    Food,
    Recipe,
}

impl EdibleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdibleKind::Food => "food",
            EdibleKind::Recipe => "recipe",
        }
    }
}

impl fmt::Display for EdibleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A food or a recipe.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Edible {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: EdibleKind,
    pub name: String,
}

impl Edible {
    /// Edibles are identified by kind and id; names are only for display.
    pub fn identity(&self) -> (EdibleKind, i64) {
        (self.kind, self.id)
    }
}

/// A quantity of an edible: an amount (as typed) of one of its units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub amount: String,
    pub seq_num: i64,
}

impl Default for Weight {
    fn default() -> Self {
        Weight {
            amount: String::new(),
            seq_num: GRAM,
        }
    }
}

impl Weight {
    pub const AMOUNT: Field<Weight, String> = Field::new(|w| &w.amount, |w| &mut w.amount);
    pub const SEQ_NUM: Field<Weight, i64> = Field::new(|w| &w.seq_num, |w| &mut w.seq_num);

    /// The amount, if it is a finite, strictly positive number.
    pub fn positive_amount(&self) -> Option<f64> {
        self.amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
    }
}

/// A weight option of an edible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub seq_num: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams: Option<f64>,
}

impl Unit {
    /// The gram unit that leads the weight options of every food.
    pub fn gram() -> Unit {
        Unit {
            seq_num: GRAM,
            name: "gram".to_string(),
            grams: Some(1.0),
        }
    }
}

/// An edible with a quantity (recipe ingredient, or the "what" of an eaten record).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedFood {
    pub edible: Option<Edible>,
    pub weight: Weight,
}

impl WeightedFood {
    pub const EDIBLE: Field<WeightedFood, Option<Edible>> = Field::new(|w| &w.edible, |w| &mut w.edible);
    pub const WEIGHT: Field<WeightedFood, Weight> = Field::new(|w| &w.weight, |w| &mut w.weight);

    /// The key nutrient totals are derived from.
    pub fn nutrient_key(&self) -> Option<(Edible, Weight)> {
        self.edible.clone().map(|edible| (edible, self.weight.clone()))
    }
}

/// Consumption event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EatenRecord {
    #[serde(flatten)]
    pub food: WeightedFood,
    pub consumer: String,
}

impl EatenRecord {
    pub const FOOD: Field<EatenRecord, WeightedFood> = Field::new(|e| &e.food, |e| &mut e.food);
    pub const CONSUMER: Field<EatenRecord, String> = Field::new(|e| &e.consumer, |e| &mut e.consumer);

    /// Whether the record can be submitted.
    pub fn is_complete(&self) -> bool {
        self.food.edible.is_some() && !self.consumer.trim().is_empty()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Nutrient {
    pub id: i64,
    pub name: String,
    pub unit: String,
}

/// A unit of a food, with its weight in grams.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub name: String,
    #[serde(rename = "gramEquivalent")]
    pub gram_equivalent: f64,
}

impl UnitEntry {
    pub const NAME: Field<UnitEntry, String> = Field::new(|u| &u.name, |u| &mut u.name);
    pub const GRAM_EQUIVALENT: Field<UnitEntry, f64> =
        Field::new(|u| &u.gram_equivalent, |u| &mut u.gram_equivalent);
}

/// Amount of a nutrient in a food. `nutrient` is `None` until one is selected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedNutrient {
    pub nutrient: Option<Nutrient>,
    pub amount: f64,
}

impl WeightedNutrient {
    pub const NUTRIENT: Field<WeightedNutrient, Option<Nutrient>> = Field::new(|n| &n.nutrient, |n| &mut n.nutrient);
    pub const AMOUNT: Field<WeightedNutrient, f64> = Field::new(|n| &n.amount, |n| &mut n.amount);
}

/// A food being created or edited.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodDraft {
    pub id: Option<i64>,
    pub name: String,
    pub units: KeyedVec<UnitEntry>,
    pub nutrients: KeyedVec<WeightedNutrient>,
}

impl FoodDraft {
    pub const NAME: Field<FoodDraft, String> = Field::new(|f| &f.name, |f| &mut f.name);
    pub const UNITS: Field<FoodDraft, KeyedVec<UnitEntry>> = Field::new(|f| &f.units, |f| &mut f.units);
    pub const NUTRIENTS: Field<FoodDraft, KeyedVec<WeightedNutrient>> =
        Field::new(|f| &f.nutrients, |f| &mut f.nutrients);

    /// Draft for editing an existing food. Units and nutrients start empty.
    pub fn existing(edible: &Edible) -> FoodDraft {
        FoodDraft {
            id: Some(edible.id),
            name: edible.name.clone(),
            ..FoodDraft::default()
        }
    }
}

/// Body of a food write: the food, and the reference quantity its nutrient amounts are given for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodSubmission {
    pub food: FoodDraft,
    pub amount: f64,
}

impl FoodSubmission {
    pub const FOOD: Field<FoodSubmission, FoodDraft> = Field::new(|s| &s.food, |s| &mut s.food);
    pub const AMOUNT: Field<FoodSubmission, f64> = Field::new(|s| &s.amount, |s| &mut s.amount);
}

/// Which recipe a recipe draft writes to.
#[derive(Clone, Debug, PartialEq)]
pub enum RecipeTarget {
    /// A new recipe with the given name.
    New(String),
    /// An existing recipe, once selected.
    Existing(Option<Edible>),
}

impl Default for RecipeTarget {
    fn default() -> Self {
        RecipeTarget::New(String::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipeDraft {
    pub target: RecipeTarget,
    pub ingredients: KeyedVec<WeightedFood>,
}

impl RecipeDraft {
    pub const TARGET: Field<RecipeDraft, RecipeTarget> = Field::new(|r| &r.target, |r| &mut r.target);
    pub const INGREDIENTS: Field<RecipeDraft, KeyedVec<WeightedFood>> =
        Field::new(|r| &r.ingredients, |r| &mut r.ingredients);

    /// The body of the recipe write, or `None` if the draft names no recipe yet.
    pub fn submission(&self) -> Option<RecipeSubmission> {
        let recipe = match &self.target {
            RecipeTarget::New(name) if !name.trim().is_empty() => RecipeRef::Name { name: name.clone() },
            RecipeTarget::Existing(Some(edible)) => RecipeRef::Id { id: edible.id },
            _ => return None,
        };
        Some(RecipeSubmission {
            recipe,
            ingredients: self.ingredients.to_vec(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecipeRef {
    Name { name: String },
    Id { id: i64 },
}

/// Body of a recipe write: `{name, ingredients}` or `{id, ingredients}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeSubmission {
    #[serde(flatten)]
    pub recipe: RecipeRef,
    pub ingredients: Vec<WeightedFood>,
}

/// Amount of a nutrient and its unit, serialized as `[amount, unit]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutrientAmount(pub f64, pub String);

/// Nutrient name to amount.
pub type NutrientMap = BTreeMap<String, NutrientAmount>;

impl_data_simple!(
    EdibleKind,
    Edible,
    Weight,
    Unit,
    WeightedFood,
    EatenRecord,
    Nutrient,
    UnitEntry,
    WeightedNutrient,
    FoodDraft,
    FoodSubmission,
    RecipeTarget,
    RecipeDraft,
    NutrientAmount,
);
