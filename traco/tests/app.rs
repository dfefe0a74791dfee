mod common;

use common::{api, grocery, run, settle};
use traco::{backend::Method, App, Config, Error};

#[test]
fn all_forms_side_by_side() {
    run(async {
        let transport = grocery();
        let config = Config::from_toml("consumers = [\"ada\", \"grace\"]").unwrap();
        let app = App::new(api(&transport), &config);
        settle().await;
        assert_eq!(transport.count(Method::Get, "/eat"), 2);

        let view = app.view();
        assert!(view.find_group("macro-traco").is_some());
        assert!(view.find_group("recipe-editor").is_some());
        assert!(view.find_group("food-editor-manager").is_some());
        assert!(transport.requests().iter().all(|r| r.method == Method::Get));
    })
}

#[test]
fn connect_rejects_bad_urls() {
    let config = Config {
        base_url: "not a url".to_string(),
        ..Config::default()
    };
    assert!(matches!(App::connect(&config), Err(Error::Url(_))));
}
