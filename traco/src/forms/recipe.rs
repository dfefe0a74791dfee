//! Creating and editing recipes.
use crate::{
    backend::Api,
    config::Config,
    forms::{portion::edible_selector, PortionEditor, Submission},
    helpers::enable_if,
    lens::lens,
    list::{ItemComponents, ItemSetter, ListEditor},
    model::{Edible, EdibleKind, RecipeDraft, RecipeTarget, WeightedFood},
    selector::DynamicSelector,
    state::{Setter, State, Watcher},
    view::{Button, Checkbox, Input, Node},
};
use std::rc::Rc;
use tracing::debug;

pub const RECIPE_ERROR: &str = "Oops, something went wrong.";
pub const RECIPE_SUBMIT: &str = "Add this recipe";

fn ingredient_list(portions: ItemComponents<PortionEditor>) -> ListEditor<WeightedFood, Node> {
    ListEditor::new(
        move |food: &WeightedFood, index, set_food: ItemSetter<WeightedFood>| {
            let portion = portions.get_or_insert(set_food.key());
            let editor = portion.view(food, &set_food.as_setter());
            Node::group(
                "weighted-foods-list-item",
                vec![
                    Button::new("X", move || set_food.remove()).into(),
                    Node::text(format!("Ingredient #{}", index + 1)),
                    editor,
                ],
            )
        },
        |add| Button::new("Add another ingredient", move || add.add(WeightedFood::default())).into(),
        |items| Node::group("weighted-foods-list", items.into_iter().map(|(_, item)| item).collect()),
    )
    .on_empty(|| Node::text("No foods in this recipe."))
}

/// The recipe form: name a new recipe or pick an existing one, and list its ingredients.
pub struct RecipeForm {
    api: Api,
    draft: State<RecipeDraft>,
    submission: Submission,
    selector: DynamicSelector<Edible, Node>,
    portions: ItemComponents<PortionEditor>,
    ingredients: ListEditor<WeightedFood, Node>,
    _draft_watcher: Rc<dyn Watcher<RecipeDraft>>,
}

impl RecipeForm {
    pub fn new(api: Api, config: &Config) -> RecipeForm {
        let portions = {
            let api = api.clone();
            let min_query_len = config.min_query_len;
            // ingredients are foods only
            ItemComponents::new(move |_| PortionEditor::new(api.clone(), Some(EdibleKind::Food), min_query_len))
        };
        let draft = State::new(RecipeDraft::default());
        let draft_watcher = {
            let portions = portions.clone();
            draft.watch(move |draft: &RecipeDraft| {
                portions.sync(&draft.ingredients, |portion, _, food| portion.sync(food))
            })
        };
        RecipeForm {
            selector: edible_selector(&api, Some(EdibleKind::Recipe), config.min_query_len),
            api,
            draft,
            submission: Submission::new(),
            ingredients: ingredient_list(portions.clone()),
            portions,
            _draft_watcher: draft_watcher,
        }
    }

    pub fn draft(&self) -> &State<RecipeDraft> {
        &self.draft
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Portion editor of an ingredient, if the ingredient exists.
    pub fn portion(&self, index: usize) -> Option<PortionEditor> {
        let key = self.draft.with(|draft| draft.ingredients.get_index(index).map(|(key, _)| key))?;
        self.portions.get(key)
    }

    pub fn submit(&self) -> bool {
        submit_recipe(&self.api, &self.draft, &self.submission)
    }

    pub fn view(&self) -> Node {
        let draft = self.draft.get();
        let set_draft = self.draft.setter();
        let (target, set_target) = lens(&draft, &set_draft, RecipeDraft::TARGET);
        let (ingredients, set_ingredients) = lens(&draft, &set_draft, RecipeDraft::INGREDIENTS);
        let is_new = matches!(target, RecipeTarget::New(_));

        let new_recipe = {
            let set_target = set_target.clone();
            Checkbox::new("New recipe?", is_new, move |is_new| {
                set_target.set(if is_new {
                    RecipeTarget::New(String::new())
                } else {
                    RecipeTarget::Existing(None)
                })
            })
        };
        let target = self.target_view(&target, &set_target);
        let ingredients = self.ingredients.render(&ingredients, &set_ingredients);
        let submit = if self.submission.is_submitting() {
            Node::Spinner
        } else {
            let (api, draft_state, submission) = (self.api.clone(), self.draft.clone(), self.submission.clone());
            Button::new(RECIPE_SUBMIT, move || {
                submit_recipe(&api, &draft_state, &submission);
            })
            .enabled(draft.submission().is_some())
            .into()
        };

        Node::group(
            "recipe-editor",
            vec![
                Node::text("Add or edit recipe"),
                enable_if(self.submission.has_error(), || Node::text(RECIPE_ERROR)),
                new_recipe.into(),
                target,
                ingredients.content,
                ingredients.add,
                submit,
            ],
        )
    }

    fn target_view(&self, target: &RecipeTarget, set_target: &Setter<RecipeTarget>) -> Node {
        let set_target = set_target.clone();
        match target {
            RecipeTarget::New(name) => Input::new("recipe-name", name.clone())
                .placeholder("Recipe name")
                .on_value_changed(move |name| set_target.set(RecipeTarget::New(name)))
                .into(),
            RecipeTarget::Existing(None) => {
                let selector = self.selector.clone();
                self.selector.view(move |recipe| {
                    set_target.set(RecipeTarget::Existing(Some(recipe)));
                    selector.reset();
                })
            }
            RecipeTarget::Existing(Some(recipe)) => Node::group(
                "selected-edible",
                vec![
                    Button::new("X", move || set_target.set(RecipeTarget::Existing(None))).into(),
                    Node::text(recipe.name.clone()),
                ],
            ),
        }
    }
}

fn submit_recipe(api: &Api, draft: &State<RecipeDraft>, submission: &Submission) -> bool {
    let Some(body) = draft.with(RecipeDraft::submission) else {
        debug!("recipe has no name, not submitting");
        return false;
    };
    let api = api.clone();
    let set_draft = draft.setter();
    submission.submit(async move { api.create_recipe(&body).await }, move |()| {
        set_draft.set(RecipeDraft::default())
    })
}
