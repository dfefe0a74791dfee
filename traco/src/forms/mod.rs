//! The screens of the application.
//!
//! Each form owns its draft in a [`State`](crate::state::State), edits it through lens setters,
//! and writes it to the backend with a [`Submission`]. Forms spawn their requests on the current
//! `tokio::task::LocalSet`, so they must be created and driven from within one.
mod app;
mod eat;
mod food;
mod portion;
mod recipe;
mod submission;

pub use app::App;
pub use eat::{DayTotals, EatForm, EAT_ERROR, EAT_SUBMIT};
pub use food::{nutrient_selector, FoodForm, FOOD_ERROR, NUTRIENT_PLACEHOLDER};
pub use portion::{edible_selector, PortionEditor, EDIBLE_PLACEHOLDER};
pub use recipe::{RecipeForm, RECIPE_ERROR, RECIPE_SUBMIT};
pub use submission::Submission;
