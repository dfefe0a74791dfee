//! Food and recipe logging, as a headless UI.
//!
//! The building blocks:
//! * [`lens`]: get/set pairs into nested state
//! * [`state`]: shared state slots with watchers
//! * [`fetch`]: asynchronous values that only keep the latest response
//! * [`selector`]: search-as-you-type selectors
//! * [`list`]: editors of dynamic lists
//!
//! and the [`forms`] built from them, which talk to the backend through [`backend::Api`].
mod error;

pub mod backend;
pub mod config;
pub mod fetch;
pub mod forms;
pub mod helpers;
pub mod lens;
pub mod list;
pub mod model;
pub mod selector;
pub mod state;
pub mod view;

pub use crate::{
    backend::{Api, HttpTransport, Request, Response, Transport},
    config::Config,
    error::Error,
    forms::App,
    state::{Setter, State, Update},
};
pub use traco_common::Data;
