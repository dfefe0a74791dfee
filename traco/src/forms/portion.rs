//! Picking an edible and a quantity of it.
use crate::{
    backend::Api,
    fetch::{Derived, Fetch},
    helpers::{enable_if, nutrient_details, with_loading},
    lens::{lens, lenses},
    model::{Edible, EdibleKind, NutrientMap, Unit, Weight, WeightedFood, GRAM, RECIPE_WEIGHTS},
    selector::{DynamicSelector, Select, SelectorConfig},
    state::{Setter, State},
    view::{Button, Choice, Input, Node},
};
use futures::FutureExt;
use tracing::trace;

pub const EDIBLE_PLACEHOLDER: &str = "Type to find a food or recipe...";

/// Search selector over edibles, optionally restricted to foods or recipes.
pub fn edible_selector(
    api: &Api,
    restrict_to: Option<EdibleKind>,
    min_query_len: usize,
) -> DynamicSelector<Edible, Node> {
    let api = api.clone();
    DynamicSelector::new(
        SelectorConfig::new(
            EDIBLE_PLACEHOLDER,
            move |query: &str| {
                let api = api.clone();
                let query = query.to_string();
                async move { api.search(&query, restrict_to).await }.boxed_local()
            },
            |edible: &Edible, _, select: Select<Edible>| Node::from(Button::new(&edible.name, move || select.select())),
        )
        .min_query_len(min_query_len),
    )
}

/// Editor of a [`WeightedFood`]: an edible selector until an edible is picked, then a weight
/// picker for it.
///
/// The weight options and the nutrient totals of the current selection are derived
/// asynchronously; the owner must call [`PortionEditor::sync`] whenever the edited value changes.
/// Both are cleared as soon as the selection changes, and stay cleared if their request fails.
#[derive(Clone)]
pub struct PortionEditor {
    api: Api,
    selector: DynamicSelector<Edible, Node>,
    /// `None` until the options of the current edible are known.
    weights: Derived<Option<Edible>, Option<Vec<Unit>>>,
    nutrients: Derived<Option<(Edible, Weight)>, NutrientMap>,
    details_focus: State<bool>,
}

impl PortionEditor {
    pub fn new(api: Api, restrict_to: Option<EdibleKind>, min_query_len: usize) -> PortionEditor {
        PortionEditor {
            selector: edible_selector(&api, restrict_to, min_query_len),
            api,
            weights: Derived::invalidating(None),
            nutrients: Derived::invalidating(NutrientMap::new()),
            details_focus: State::new(false),
        }
    }

    pub fn selector(&self) -> &DynamicSelector<Edible, Node> {
        &self.selector
    }

    /// Weight options of the current edible, if known.
    pub fn weights(&self) -> Option<Vec<Unit>> {
        self.weights.get()
    }

    /// Nutrients in the current selection.
    pub fn nutrients(&self) -> NutrientMap {
        self.nutrients.get()
    }

    pub fn is_loading(&self) -> bool {
        self.weights.is_pending() || self.nutrients.is_pending()
    }

    /// Re-derives weight options and nutrient totals if the selection changed.
    pub fn sync(&self, food: &WeightedFood) {
        let api = &self.api;
        self.weights.refresh(food.edible.clone(), |edible| match edible {
            None => Fetch::Ready(None),
            Some(edible) if edible.kind == EdibleKind::Recipe => Fetch::Ready(Some(RECIPE_WEIGHTS.clone())),
            Some(edible) => {
                let api = api.clone();
                let id = edible.id;
                Fetch::Request(async move { api.food_weights(id).await.map(Some) }.boxed_local())
            }
        });
        self.nutrients.refresh(food.nutrient_key(), |key| match key {
            Some((edible, weight)) if weight.positive_amount().is_some() => {
                let api = api.clone();
                let (edible, weight) = (edible.clone(), weight.clone());
                Fetch::Request(async move { api.nutrients(&edible, &weight).await }.boxed_local())
            }
            _ => {
                trace!("no positive amount, skipping nutrient request");
                Fetch::Ready(NutrientMap::new())
            }
        });
    }

    /// Selects an edible. The unit goes back to grams, which every edible has.
    pub fn select(&self, set_food: &Setter<WeightedFood>, edible: Edible) {
        set_food.modify(move |food| WeightedFood {
            edible: Some(edible),
            weight: Weight {
                amount: food.weight.amount.clone(),
                seq_num: GRAM,
            },
        });
        self.selector.reset();
    }

    pub fn view(&self, food: &WeightedFood, set_food: &Setter<WeightedFood>) -> Node {
        let Some(edible) = &food.edible else {
            let this = self.clone();
            let set_food = set_food.clone();
            return self.selector.view(move |edible| this.select(&set_food, edible));
        };

        let cancel = {
            let set_food = set_food.clone();
            Button::new("X", move || set_food.set(WeightedFood::default()))
        };
        let (weight, set_weight) = lens(food, set_food, WeightedFood::WEIGHT);
        let set_focus = self.details_focus.setter();
        let picker = with_loading(
            || Node::Spinner,
            |units: &Vec<Unit>| weight_picker(&weight, &set_weight, units, &set_focus),
        );
        let units = self.weights.get();
        let show_details = self.details_focus.get() && !self.nutrients.is_pending();

        Node::group(
            "edible-selector",
            vec![
                Node::group("selected-edible", vec![cancel.into(), Node::text(edible.name.clone())]),
                picker(units.as_ref()),
                enable_if(show_details, || nutrient_details(&self.nutrients.get())),
            ],
        )
    }
}

/// Amount field and unit drop-down. Focusing either shows the nutrient details.
fn weight_picker(weight: &Weight, set_weight: &Setter<Weight>, units: &[Unit], set_focus: &Setter<bool>) -> Node {
    let ((amount, set_amount), (seq_num, set_seq_num)) = lenses(weight, set_weight, (Weight::AMOUNT, Weight::SEQ_NUM));
    let on_focus = || {
        let set_focus = set_focus.clone();
        move |focused: bool| set_focus.set(focused)
    };
    let amount = Input::new("amount", amount)
        .on_value_changed(move |text| set_amount.set(text))
        .on_focus_changed(on_focus());
    let options = units.iter().map(|unit| (unit.seq_num, unit.name.clone())).collect();
    let unit = Choice::new("seq_num", seq_num, options, move |seq_num| set_seq_num.set(seq_num))
        .on_focus_changed(on_focus());
    Node::group("weight-picker", vec![amount.into(), unit.into()])
}
