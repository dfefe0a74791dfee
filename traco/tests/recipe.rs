mod common;

use common::{api, grocery, run, settle};
use serde_json::json;
use traco::{
    backend::Method,
    forms::{RecipeForm, RECIPE_SUBMIT},
    model::{RecipeDraft, RecipeTarget},
    Config,
};

#[test]
fn new_recipe_with_an_ingredient() {
    run(async {
        let transport = grocery();
        let form = RecipeForm::new(api(&transport), &Config::default());

        let view = form.view();
        assert!(view.find_checkbox("New recipe?").unwrap().checked);
        assert!(view.contains_text("No foods in this recipe."));
        // no name yet
        assert!(!view.find_button(RECIPE_SUBMIT).unwrap().enabled);

        view.find_input("recipe-name").unwrap().input("crumble");
        form.view().find_button("Add another ingredient").unwrap().click();
        let view = form.view();
        assert_eq!(view.groups("weighted-foods-list-item").len(), 1);
        assert!(view.contains_text("Ingredient #1"));

        view.find_input("search").unwrap().input("apple");
        settle().await;
        // ingredients are foods only
        let search = transport.last(Method::Get, "/search").unwrap();
        assert_eq!(search.query_param("restrictTo"), Some("food"));
        let view = form.view();
        assert!(view.find_button("apple pie").is_none());
        view.find_button("apple").unwrap().click();
        settle().await;

        let portion = form.portion(0).unwrap();
        assert_eq!(portion.weights().unwrap().len(), 2);
        form.view().find_input("amount").unwrap().input("250");
        settle().await;
        assert_eq!(transport.count(Method::Get, "/macros"), 1);

        let submit = form.view();
        let submit = submit.find_button(RECIPE_SUBMIT).unwrap();
        assert!(submit.enabled);
        submit.click();
        assert!(form.submission().is_submitting());
        settle().await;

        let posted = transport.last(Method::Post, "/recipes").unwrap().body.unwrap();
        assert_eq!(posted["name"], "crumble");
        assert_eq!(posted["ingredients"][0]["edible"]["id"], 2);
        assert_eq!(posted["ingredients"][0]["weight"], json!({"amount": "250", "seq_num": 0}));
        assert_eq!(form.draft().get(), RecipeDraft::default());
        assert!(form.portion(0).is_none());
    })
}

#[test]
fn edit_an_existing_recipe() {
    run(async {
        let transport = grocery();
        let form = RecipeForm::new(api(&transport), &Config::default());

        form.view().find_checkbox("New recipe?").unwrap().toggle();
        assert_eq!(form.draft().get().target, RecipeTarget::Existing(None));
        assert!(!form.view().find_button(RECIPE_SUBMIT).unwrap().enabled);

        form.view().find_input("search").unwrap().input("pie");
        settle().await;
        let search = transport.last(Method::Get, "/search").unwrap();
        assert_eq!(search.query_param("restrictTo"), Some("recipe"));
        form.view().find_button("apple pie").unwrap().click();

        let view = form.view();
        assert!(view.find_group("selected-edible").unwrap().contains_text("apple pie"));
        assert!(view.find_button(RECIPE_SUBMIT).unwrap().enabled);
        assert!(form.submit());
        settle().await;
        let posted = transport.last(Method::Post, "/recipes").unwrap().body.unwrap();
        assert_eq!(posted, json!({"id": 9, "ingredients": []}));
    })
}

#[test]
fn removing_an_ingredient_keeps_the_others() {
    run(async {
        let transport = grocery();
        let form = RecipeForm::new(api(&transport), &Config::default());
        for _ in 0..3 {
            form.view().find_button("Add another ingredient").unwrap().click();
        }
        let first = form.portion(0).unwrap();
        let third = form.portion(2).unwrap();
        assert!(third.selector().query().is_empty());
        first.selector().set_query("banana");
        third.selector().set_query("apple");
        settle().await;
        assert_eq!(first.selector().results().len(), 1);

        let view = form.view();
        let items = view.groups("weighted-foods-list-item");
        assert_eq!(items.len(), 3);
        items[1].find_button("X").unwrap().click();

        let view = form.view();
        assert_eq!(view.groups("weighted-foods-list-item").len(), 2);
        assert!(view.contains_text("Ingredient #2"));
        assert!(!view.contains_text("Ingredient #3"));
        // per-ingredient state follows the ingredient, not its position
        assert_eq!(form.portion(0).unwrap().selector().query(), "banana");
        assert_eq!(form.portion(1).unwrap().selector().query(), "apple");
        assert!(form.portion(2).is_none());
    })
}
