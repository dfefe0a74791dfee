//! Search-as-you-type selectors.
//!
//! A [`DynamicSelector`] owns a query and the results of the search for that query. Queries
//! shorter than the configured minimum resolve to no results without a request; longer ones issue
//! one request per distinct query, and only the response to the latest query is ever shown.
use crate::{
    fetch::{Derived, Fetch},
    state::State,
    view::{Input, Node},
    Error,
};
use futures::future::LocalBoxFuture;
use std::{fmt, rc::Rc};
use tracing::debug;
use traco_common::Data;

/// Queries shorter than this (in characters) don't hit the backend.
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// How a selector searches and renders its results.
pub struct SelectorConfig<T, V> {
    pub placeholder: String,
    pub min_query_len: usize,
    pub fetch_results: Rc<dyn Fn(&str) -> LocalBoxFuture<'static, Result<Vec<T>, Error>>>,
    pub render_result: Rc<dyn Fn(&T, usize, Select<T>) -> V>,
}

impl<T, V> SelectorConfig<T, V> {
    pub fn new(
        placeholder: &str,
        fetch_results: impl Fn(&str) -> LocalBoxFuture<'static, Result<Vec<T>, Error>> + 'static,
        render_result: impl Fn(&T, usize, Select<T>) -> V + 'static,
    ) -> SelectorConfig<T, V> {
        SelectorConfig {
            placeholder: placeholder.to_string(),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            fetch_results: Rc::new(fetch_results),
            render_result: Rc::new(render_result),
        }
    }

    pub fn min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }
}

/// Selection callback for one result.
pub struct Select<T> {
    item: T,
    on_select: Rc<dyn Fn(T)>,
}

// #26925
impl<T: Clone> Clone for Select<T> {
    fn clone(&self) -> Self {
        Select {
            item: self.item.clone(),
            on_select: self.on_select.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Select<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Select").field(&self.item).finish()
    }
}

impl<T: Clone> Select<T> {
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Passes the item to the selection callback. The query is left as is.
    pub fn select(&self) {
        (self.on_select)(self.item.clone())
    }
}

pub struct DynamicSelector<T: Data, V> {
    config: Rc<SelectorConfig<T, V>>,
    query: State<String>,
    results: Derived<String, Vec<T>>,
}

// #26925
impl<T: Data, V> Clone for DynamicSelector<T, V> {
    fn clone(&self) -> Self {
        DynamicSelector {
            config: self.config.clone(),
            query: self.query.clone(),
            results: self.results.clone(),
        }
    }
}

impl<T: Data, V: 'static> DynamicSelector<T, V> {
    pub fn new(config: SelectorConfig<T, V>) -> DynamicSelector<T, V> {
        DynamicSelector {
            config: Rc::new(config),
            query: State::new(String::new()),
            results: Derived::new(Vec::new()),
        }
    }

    pub fn query(&self) -> String {
        self.query.get()
    }

    /// Updates the query, and searches for it if it changed.
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.query.set(text.clone());
        let config = &self.config;
        self.results.refresh(text, |query| {
            if query.chars().count() < config.min_query_len {
                Fetch::Ready(Vec::new())
            } else {
                debug!(query = %query, "searching");
                Fetch::Request((config.fetch_results)(query.as_str()))
            }
        });
    }

    /// Results of the latest query.
    pub fn results(&self) -> Vec<T> {
        self.results.get()
    }

    pub fn results_state(&self) -> &State<Vec<T>> {
        self.results.state()
    }

    /// Whether the results of the latest query are still being fetched.
    pub fn is_pending(&self) -> bool {
        self.results.is_pending()
    }

    /// Clears the query and the results.
    pub fn reset(&self) {
        self.query.set(String::new());
        self.results.reset(Vec::new());
    }

    /// Renders the current results; selecting one calls `on_select` with it.
    pub fn render_results(&self, on_select: Rc<dyn Fn(T)>) -> Vec<V> {
        self.results
            .get()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                (self.config.render_result)(
                    item,
                    index,
                    Select {
                        item: item.clone(),
                        on_select: on_select.clone(),
                    },
                )
            })
            .collect()
    }
}

impl<T: Data> DynamicSelector<T, Node> {
    /// Search field followed by the list of results.
    pub fn view(&self, on_select: impl Fn(T) + 'static) -> Node {
        let results = self.render_results(Rc::new(on_select));
        let class = if results.is_empty() {
            "dropdown-values dropdown-values-empty"
        } else {
            "dropdown-values"
        };
        let this = self.clone();
        let search = Input::new("search", self.query())
            .placeholder(self.config.placeholder.clone())
            .on_value_changed(move |text| this.set_query(text));
        Node::group(
            "dynamic-selector",
            vec![Node::group("dropdown", vec![search.into()]), Node::group(class, results)],
        )
    }
}
