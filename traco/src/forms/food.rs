//! Creating and editing foods.
use crate::{
    backend::Api,
    config::Config,
    forms::{portion::edible_selector, Submission},
    helpers::enable_if,
    lens::{lens, lenses},
    list::{ItemComponents, ItemSetter, ListEditor},
    model::{Edible, EdibleKind, FoodDraft, FoodSubmission, Nutrient, UnitEntry, WeightedNutrient},
    selector::{DynamicSelector, Select, SelectorConfig},
    state::{Setter, State, Watcher},
    view::{Button, Checkbox, Input, Node},
};
use futures::FutureExt;
use std::rc::Rc;
use tracing::debug;

pub const FOOD_ERROR: &str = "Oops, something went wrong.";
pub const NUTRIENT_PLACEHOLDER: &str = "Type the name of a nutrient";

/// Search selector over nutrients.
pub fn nutrient_selector(api: &Api, min_query_len: usize) -> DynamicSelector<Nutrient, Node> {
    let api = api.clone();
    DynamicSelector::new(
        SelectorConfig::new(
            NUTRIENT_PLACEHOLDER,
            move |query: &str| {
                let api = api.clone();
                let query = query.to_string();
                async move { api.search_nutrients(&query).await }.boxed_local()
            },
            |nutrient: &Nutrient, _, select: Select<Nutrient>| {
                let label = format!("{} ({})", nutrient.name, nutrient.unit);
                Node::from(Button::new(&label, move || select.select()))
            },
        )
        .min_query_len(min_query_len),
    )
}

fn unit_list() -> ListEditor<UnitEntry, Node> {
    ListEditor::new(
        |unit: &UnitEntry, _, set_unit: ItemSetter<UnitEntry>| {
            let ((name, set_name), (grams, set_grams)) =
                lenses(unit, &set_unit.as_setter(), (UnitEntry::NAME, UnitEntry::GRAM_EQUIVALENT));
            Node::group(
                "unit-editor-item",
                vec![
                    Button::new("X", move || set_unit.remove()).into(),
                    Input::new("unit-name", name)
                        .placeholder("Unit name")
                        .on_value_changed(move |text| set_name.set(text))
                        .into(),
                    Input::number("unit-gram", grams, move |grams| set_grams.set(grams))
                        .placeholder("Gram equivalent")
                        .into(),
                ],
            )
        },
        |add| Button::new("Add another unit", move || add.add(UnitEntry::default())).into(),
        |items| Node::group("unit-editor-list", items.into_iter().map(|(_, item)| item).collect()),
    )
    .on_empty(|| Node::text("No units in this food."))
}

fn nutrient_list(selectors: ItemComponents<DynamicSelector<Nutrient, Node>>) -> ListEditor<WeightedNutrient, Node> {
    ListEditor::new(
        move |entry: &WeightedNutrient, index, set_entry: ItemSetter<WeightedNutrient>| {
            let ((nutrient, set_nutrient), (amount, set_amount)) = lenses(
                entry,
                &set_entry.as_setter(),
                (WeightedNutrient::NUTRIENT, WeightedNutrient::AMOUNT),
            );
            let editor = match nutrient {
                None => {
                    let selector = selectors.get_or_insert(set_entry.key());
                    Node::group(
                        "nutrient-selector",
                        vec![selector.view(move |nutrient| set_nutrient.set(Some(nutrient)))],
                    )
                }
                Some(nutrient) => Node::group(
                    "nutrient-selector",
                    vec![
                        Node::text(format!("{} ({})", nutrient.name, nutrient.unit)),
                        Input::number("nutrient-amount", amount, move |amount| set_amount.set(amount))
                            .placeholder(format!("Amount in {}", nutrient.unit))
                            .into(),
                    ],
                ),
            };
            Node::group(
                "food-nutrient-list-item",
                vec![
                    Button::new("X", move || set_entry.remove()).into(),
                    Node::text(format!("Nutrient #{}", index + 1)),
                    editor,
                ],
            )
        },
        |add| Button::new("Add another nutrient", move || add.add(WeightedNutrient::default())).into(),
        |items| Node::group("food-nutrient-list", items.into_iter().map(|(_, item)| item).collect()),
    )
    .on_empty(|| Node::text("No nutrients in this food."))
}

/// The food form: create a new food, or pick an existing one, and edit its units and nutrients.
pub struct FoodForm {
    api: Api,
    is_new: State<bool>,
    draft: State<FoodSubmission>,
    submission: Submission,
    selector: DynamicSelector<Edible, Node>,
    nutrient_selectors: ItemComponents<DynamicSelector<Nutrient, Node>>,
    units: ListEditor<UnitEntry, Node>,
    nutrients: ListEditor<WeightedNutrient, Node>,
    _draft_watcher: Rc<dyn Watcher<FoodSubmission>>,
}

impl FoodForm {
    pub fn new(api: Api, config: &Config) -> FoodForm {
        let nutrient_selectors = {
            let api = api.clone();
            let min_query_len = config.min_query_len;
            ItemComponents::new(move |_| nutrient_selector(&api, min_query_len))
        };
        let draft = State::new(FoodSubmission::default());
        // drops the selectors of removed nutrients
        let draft_watcher = {
            let nutrient_selectors = nutrient_selectors.clone();
            draft.watch(move |submission: &FoodSubmission| {
                nutrient_selectors.sync(&submission.food.nutrients, |_, _, _| {})
            })
        };
        FoodForm {
            selector: edible_selector(&api, Some(EdibleKind::Food), config.min_query_len),
            api,
            is_new: State::new(true),
            draft,
            submission: Submission::new(),
            units: unit_list(),
            nutrients: nutrient_list(nutrient_selectors.clone()),
            nutrient_selectors,
            _draft_watcher: draft_watcher,
        }
    }

    pub fn draft(&self) -> &State<FoodSubmission> {
        &self.draft
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_new(&self) -> bool {
        self.is_new.get()
    }

    /// Number of live nutrient selectors.
    pub fn nutrient_selector_count(&self) -> usize {
        self.nutrient_selectors.len()
    }

    /// Switches between creating a new food and editing an existing one. Switching to a new
    /// food discards the draft.
    pub fn set_is_new(&self, is_new: bool) {
        set_is_new(&self.is_new, &self.draft.setter(), is_new)
    }

    pub fn submit(&self) -> bool {
        submit_food(&self.api, &self.is_new, &self.draft, &self.submission)
    }

    pub fn view(&self) -> Node {
        let submission = self.draft.get();
        let set_submission = self.draft.setter();
        let ((food, set_food), (amount, set_amount)) =
            lenses(&submission, &set_submission, (FoodSubmission::FOOD, FoodSubmission::AMOUNT));
        let is_new = self.is_new.get();

        let new_food = {
            let state = self.is_new.clone();
            let set_submission = set_submission.clone();
            Checkbox::new("New food?", is_new, move |is_new| set_is_new(&state, &set_submission, is_new))
        };
        let existing = enable_if(!is_new, || {
            let selector = self.selector.clone();
            let set_food = set_food.clone();
            self.selector.view(move |edible| {
                set_food.set(FoodDraft::existing(&edible));
                selector.reset();
            })
        });
        let editor = enable_if(is_new || food.id.is_some(), || {
            Node::group(
                "food-editor",
                vec![
                    self.food_editor(&food, &set_food),
                    Node::group(
                        "reference-quantity",
                        vec![
                            Node::text("Reference quantity"),
                            Input::number("reference-amount", amount, move |amount| set_amount.set(amount)).into(),
                        ],
                    ),
                ],
            )
        });
        let submit = if self.submission.is_submitting() {
            Node::Spinner
        } else {
            let (api, is_new_state, draft, submission) = (
                self.api.clone(),
                self.is_new.clone(),
                self.draft.clone(),
                self.submission.clone(),
            );
            Button::new("Submit", move || {
                submit_food(&api, &is_new_state, &draft, &submission);
            })
            .enabled(can_submit(is_new, &food))
            .into()
        };

        Node::group(
            "food-editor-manager",
            vec![
                Node::text("Add or edit a food"),
                enable_if(self.submission.has_error(), || Node::text(FOOD_ERROR)),
                new_food.into(),
                existing,
                editor,
                submit,
            ],
        )
    }

    fn food_editor(&self, food: &FoodDraft, set_food: &Setter<FoodDraft>) -> Node {
        let (name, set_name) = lens(food, set_food, FoodDraft::NAME);
        let (units, set_units) = lens(food, set_food, FoodDraft::UNITS);
        let (nutrients, set_nutrients) = lens(food, set_food, FoodDraft::NUTRIENTS);
        let units = self.units.render(&units, &set_units);
        let nutrients = self.nutrients.render(&nutrients, &set_nutrients);
        Node::group(
            "food-editor-fields",
            vec![
                Input::new("food-name", name)
                    .placeholder("Name of food")
                    .on_value_changed(move |text| set_name.set(text))
                    .into(),
                Node::text("Units"),
                units.content,
                units.add,
                Node::text("Nutrients"),
                nutrients.content,
                nutrients.add,
            ],
        )
    }
}

fn set_is_new(state: &State<bool>, set_submission: &Setter<FoodSubmission>, is_new: bool) {
    if is_new {
        set_submission.focus(FoodSubmission::FOOD).set(FoodDraft::default());
    }
    state.set(is_new);
}

/// A food can be written once it has a name, and is either new or a picked existing food.
fn can_submit(is_new: bool, food: &FoodDraft) -> bool {
    !food.name.trim().is_empty() && (is_new || food.id.is_some())
}

fn submit_food(api: &Api, is_new: &State<bool>, draft: &State<FoodSubmission>, submission: &Submission) -> bool {
    let body = draft.get();
    if !can_submit(is_new.get(), &body.food) {
        debug!("no food to submit");
        return false;
    }
    let api = api.clone();
    let set_draft = draft.setter();
    submission.submit(async move { api.create_food(&body).await }, move |created| {
        debug!(%created, "food saved");
        set_draft.set(FoodSubmission::default());
    })
}
