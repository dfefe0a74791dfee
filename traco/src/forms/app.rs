use crate::{
    backend::{Api, HttpTransport},
    config::Config,
    forms::{EatForm, FoodForm, RecipeForm},
    view::Node,
    Error,
};
use std::rc::Rc;
use tracing::info;

/// All the forms of the application.
pub struct App {
    pub eat: EatForm,
    pub recipe: RecipeForm,
    pub food: FoodForm,
}

impl App {
    pub fn new(api: Api, config: &Config) -> App {
        App {
            eat: EatForm::new(api.clone(), config),
            recipe: RecipeForm::new(api.clone(), config),
            food: FoodForm::new(api, config),
        }
    }

    /// Creates the application, talking to the backend over HTTP.
    pub fn connect(config: &Config) -> Result<App, Error> {
        let transport = HttpTransport::new(&config.base_url)?;
        info!(base_url = %config.base_url, "connecting to backend");
        Ok(App::new(Api::new(Rc::new(transport)), config))
    }

    pub fn view(&self) -> Node {
        Node::group("app", vec![self.eat.view(), self.recipe.view(), self.food.view()])
    }
}
