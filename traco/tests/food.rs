mod common;

use common::{api, grocery, run, settle};
use traco::{
    backend::Method,
    forms::{FoodForm, FOOD_ERROR},
    model::FoodSubmission,
    Config, Response,
};

#[test]
fn create_a_food() {
    run(async {
        let transport = grocery();
        let form = FoodForm::new(api(&transport), &Config::default());
        assert!(form.is_new());

        let view = form.view();
        assert!(view.contains_text("No units in this food."));
        assert!(view.contains_text("No nutrients in this food."));
        assert!(!view.find_button("Submit").unwrap().enabled);

        view.find_input("food-name").unwrap().input("kiwi");
        form.view().find_button("Add another unit").unwrap().click();
        form.view().find_input("unit-name").unwrap().input("slice");
        form.view().find_input("unit-gram").unwrap().input("12.5");
        // not a number: ignored
        form.view().find_input("unit-gram").unwrap().input("twelve");

        form.view().find_button("Add another nutrient").unwrap().click();
        let view = form.view();
        assert!(view.contains_text("Nutrient #1"));
        view.find_input("search").unwrap().input("ener");
        settle().await;
        assert_eq!(
            transport.last(Method::Get, "/nutrients").unwrap().query_param("search"),
            Some("ener")
        );
        form.view().find_button("Energy (kcal)").unwrap().click();
        form.view().find_input("nutrient-amount").unwrap().input("61");
        form.view().find_input("reference-amount").unwrap().input("100");

        let submit = form.view();
        let submit = submit.find_button("Submit").unwrap();
        assert!(submit.enabled);
        submit.click();
        settle().await;

        let posted = transport.last(Method::Post, "/food").unwrap().body.unwrap();
        assert_eq!(posted["food"]["name"], "kiwi");
        assert_eq!(posted["food"]["units"][0]["name"], "slice");
        assert_eq!(posted["food"]["units"][0]["gramEquivalent"], 12.5);
        assert_eq!(posted["food"]["nutrients"][0]["nutrient"]["id"], 1008);
        assert_eq!(posted["food"]["nutrients"][0]["amount"], 61.0);
        assert_eq!(posted["amount"], 100.0);
        assert_eq!(form.draft().get(), FoodSubmission::default());
        assert!(!form.submission().has_error());
    })
}

#[test]
fn edit_an_existing_food() {
    run(async {
        let transport = grocery();
        let form = FoodForm::new(api(&transport), &Config::default());
        form.view().find_checkbox("New food?").unwrap().toggle();
        assert!(!form.is_new());
        // nothing to edit until a food is picked
        assert!(form.view().find_group("food-editor").is_none());

        form.view().find_input("search").unwrap().input("ban");
        settle().await;
        let search = transport.last(Method::Get, "/search").unwrap();
        assert_eq!(search.query_param("restrictTo"), Some("food"));
        form.view().find_button("banana").unwrap().click();

        let food = form.draft().get().food;
        assert_eq!(food.id, Some(3));
        assert_eq!(food.name, "banana");
        let view = form.view();
        assert!(view.find_group("food-editor").is_some());
        assert_eq!(view.find_input("food-name").unwrap().value, "banana");

        // back to a new food: the draft is discarded
        form.set_is_new(true);
        assert_eq!(form.draft().get().food, Default::default());
    })
}

#[test]
fn removed_nutrients_drop_their_selectors() {
    run(async {
        let transport = grocery();
        let form = FoodForm::new(api(&transport), &Config::default());
        form.view().find_input("food-name").unwrap().input("kiwi");
        form.view().find_button("Add another nutrient").unwrap().click();
        form.view().find_button("Add another nutrient").unwrap().click();
        form.view();
        assert_eq!(form.nutrient_selector_count(), 2);

        let view = form.view();
        let items = view.groups("food-nutrient-list-item");
        items[0].find_button("X").unwrap().click();
        assert_eq!(form.nutrient_selector_count(), 1);
        assert_eq!(form.draft().get().food.nutrients.len(), 1);
    })
}

#[test]
fn failed_write_shows_an_error() {
    run(async {
        let transport = grocery();
        transport.reply(Method::Post, "/food", |_| Response {
            status: 400,
            body: serde_json::Value::Null,
        });
        let form = FoodForm::new(api(&transport), &Config::default());
        form.view().find_input("food-name").unwrap().input("kiwi");
        assert!(form.submit());
        settle().await;
        assert!(form.submission().has_error());
        assert!(form.view().contains_text(FOOD_ERROR));
        assert_eq!(form.draft().get().food.name, "kiwi");
    })
}

#[test]
fn existing_mode_without_a_picked_food_cannot_submit() {
    run(async {
        let transport = grocery();
        let form = FoodForm::new(api(&transport), &Config::default());
        form.view().find_input("food-name").unwrap().input("kiwi");
        form.view().find_checkbox("New food?").unwrap().toggle();

        // the draft still has a name, but no editor is shown for it
        assert_eq!(form.draft().get().food.name, "kiwi");
        let view = form.view();
        assert!(view.find_group("food-editor").is_none());
        assert!(!view.find_button("Submit").unwrap().enabled);
        assert!(!form.submit());
        settle().await;
        assert_eq!(transport.count(Method::Post, "/food"), 0);
    })
}
