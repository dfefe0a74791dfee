//! Scripted backend and runtime helpers shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::{json, Value};
use std::{cell::RefCell, future::Future, rc::Rc};
use traco::{backend::Method, Api, Error, Request, Response, Transport};

type Reply = Rc<dyn Fn(&Request) -> Response>;

/// Backend that answers from a table of routes, records every request, and can hold responses
/// back until released.
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<Vec<(Method, String, Reply)>>,
    held_paths: RefCell<Vec<String>>,
    held: RefCell<Vec<(Request, oneshot::Sender<()>)>>,
    requests: RefCell<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Rc<MockTransport> {
        Rc::new(MockTransport::default())
    }

    /// Answers requests to `path` with the response computed by `reply`.
    pub fn reply(&self, method: Method, path: &str, reply: impl Fn(&Request) -> Response + 'static) {
        self.routes
            .borrow_mut()
            .push((method, path.to_string(), Rc::new(reply)));
    }

    /// Answers requests to `path` with a fixed body.
    pub fn reply_json(&self, method: Method, path: &str, body: Value) {
        self.reply(method, path, move |_| Response::ok(body.clone()));
    }

    /// Holds back responses to `path` until [`MockTransport::release`] is called.
    pub fn hold(&self, path: &str) {
        self.held_paths.borrow_mut().push(path.to_string());
    }

    /// Lets through the held requests matching `filter`.
    pub fn release(&self, filter: impl Fn(&Request) -> bool) {
        let mut held = self.held.borrow_mut();
        let (released, kept): (Vec<_>, Vec<_>) = held.drain(..).partition(|(request, _)| filter(request));
        *held = kept;
        for (_, tx) in released {
            let _ = tx.send(());
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    /// Number of requests sent to `path` with `method`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<Request> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn exchange(&self, request: Request) -> Result<Response, Error> {
        self.requests.borrow_mut().push(request.clone());
        let hold = self.held_paths.borrow().iter().any(|p| *p == request.path);
        if hold {
            let (tx, rx) = oneshot::channel();
            self.held.borrow_mut().push((request.clone(), tx));
            rx.await.map_err(|_| Error::Cancelled)?;
        }
        let reply = self
            .routes
            .borrow()
            .iter()
            .rev()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map(|(_, _, reply)| reply.clone());
        Ok(match reply {
            Some(reply) => reply(&request),
            None => Response {
                status: 404,
                body: Value::Null,
            },
        })
    }
}

/// A backend knowing about apples, bananas and a pie.
pub fn grocery() -> Rc<MockTransport> {
    let transport = MockTransport::new();
    transport.reply(Method::Get, "/search", |request| {
        let text = request.query_param("for").unwrap_or("").to_lowercase();
        let restrict = request.query_param("restrictTo").map(str::to_string);
        let all = [
            json!({"id": 2, "type": "food", "name": "apple"}),
            json!({"id": 3, "type": "food", "name": "banana"}),
            json!({"id": 9, "type": "recipe", "name": "apple pie"}),
        ];
        let results: Vec<Value> = all
            .into_iter()
            .filter(|e| e["name"].as_str().unwrap().contains(&text))
            .filter(|e| restrict.as_deref().map_or(true, |kind| e["type"] == kind))
            .collect();
        Response::ok(json!({ "results": results }))
    });
    transport.reply_json(
        Method::Get,
        "/food/2/weights",
        json!({"weights": [{"seq_num": 1, "name": "medium apple", "grams": 182.0}]}),
    );
    transport.reply(Method::Get, "/macros", |request| {
        let amount: f64 = request.query_param("amount").unwrap().parse().unwrap();
        Response::ok(json!({
            "Energy": [amount * 0.52, "kcal"],
            "Protein": [amount * 0.01, "g"],
            "Vitamin C": [amount * 0.05, "mg"],
        }))
    });
    transport.reply_json(Method::Get, "/eat", json!({}));
    transport.reply_json(Method::Post, "/eat", json!({"ok": true}));
    transport.reply(Method::Post, "/food", |request| {
        Response::ok(request.body.clone().unwrap_or(Value::Null))
    });
    transport.reply_json(Method::Post, "/recipes", json!({}));
    transport.reply_json(
        Method::Get,
        "/nutrients",
        json!([{"id": 1008, "name": "Energy", "unit": "kcal"}, {"id": 1003, "name": "Protein", "unit": "g"}]),
    );
    transport
}

pub fn api(transport: &Rc<MockTransport>) -> Api {
    Api::new(transport.clone())
}

/// Runs a test body on a single-threaded runtime, inside a `LocalSet`.
pub fn run<F: Future>(f: F) -> F::Output {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");
    tokio::task::LocalSet::new().block_on(&rt, f)
}

/// Lets spawned requests run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
