//! Asynchronous values that tolerate out-of-order responses.
//!
//! Requests are spawned on the current `LocalSet` and may complete in any order. [`Latest`]
//! numbers every request it issues and only lets the most recently issued one publish its
//! result; responses to superseded requests are dropped. There is no cancellation: stale
//! requests run to completion and are ignored.
//!
//! [`Derived`] builds on top of that to re-derive a value whenever its key changes (e.g. the
//! nutrient totals of an `(edible, weight)` pair).
use crate::{state::State, Error};
use futures::future::LocalBoxFuture;
use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
};
use tracing::{debug, warn};
use traco_common::Data;

/// Sequence number of a request issued by a [`Latest`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RequestId(u64);

/// A value that is the result of the most recently issued request.
pub struct Latest<T: Data> {
    value: State<T>,
    issued: Rc<Cell<u64>>,
    completed: Rc<Cell<u64>>,
}

// #26925
impl<T: Data> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Latest {
            value: self.value.clone(),
            issued: self.issued.clone(),
            completed: self.completed.clone(),
        }
    }
}

impl<T: Data> Latest<T> {
    pub fn new(initial: T) -> Latest<T> {
        Latest {
            value: State::new(initial),
            issued: Rc::new(Cell::new(0)),
            completed: Rc::new(Cell::new(0)),
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// The state slot holding the value, for watching.
    pub fn state(&self) -> &State<T> {
        &self.value
    }

    /// Whether the most recently issued request has not completed yet.
    pub fn is_pending(&self) -> bool {
        self.completed.get() < self.issued.get()
    }

    fn next_id(&self) -> u64 {
        let id = self.issued.get() + 1;
        self.issued.set(id);
        id
    }

    /// Supersedes every in-flight request without issuing a new one.
    pub fn invalidate(&self) -> RequestId {
        let id = self.next_id();
        self.completed.set(id);
        RequestId(id)
    }

    /// Supersedes every in-flight request and publishes `value` immediately.
    pub fn ready(&self, value: T) -> RequestId {
        let id = self.invalidate();
        self.value.set(value);
        id
    }

    /// Issues a request. Its result is published only if no other request (or `ready` value) was
    /// issued in the meantime.
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn request(&self, request: impl Future<Output = Result<T, Error>> + 'static) -> RequestId {
        let id = self.next_id();
        let latest = self.clone();
        tokio::task::spawn_local(async move {
            let result = request.await;
            latest.complete(id, result);
        });
        RequestId(id)
    }

    fn complete(&self, id: u64, result: Result<T, Error>) {
        let issued = self.issued.get();
        if id != issued {
            debug!(id, latest = issued, "discarding stale response");
            return;
        }
        self.completed.set(id);
        match result {
            Ok(value) => self.value.set(value),
            Err(err) => warn!("request failed: {err}"),
        }
    }
}

/// How to obtain a derived value for a key.
pub enum Fetch<T> {
    /// The value is known without a request.
    Ready(T),
    /// The value must be requested.
    Request(LocalBoxFuture<'static, Result<T, Error>>),
}

/// A value derived asynchronously from a key, re-derived whenever the key changes.
pub struct Derived<K, T: Data> {
    key: Rc<RefCell<Option<K>>>,
    latest: Latest<T>,
    /// Published when the key changes, before the new value is requested.
    placeholder: Option<T>,
}

// #26925
impl<K, T: Data> Clone for Derived<K, T> {
    fn clone(&self) -> Self {
        Derived {
            key: self.key.clone(),
            latest: self.latest.clone(),
            placeholder: self.placeholder.clone(),
        }
    }
}

impl<K: Clone + PartialEq + 'static, T: Data> Derived<K, T> {
    pub fn new(initial: T) -> Derived<K, T> {
        Derived {
            key: Rc::new(RefCell::new(None)),
            latest: Latest::new(initial),
            placeholder: None,
        }
    }

    /// A derived value that is reset to `placeholder` as soon as its key changes, so that a value
    /// is never shown for a key it wasn't derived from. A failed request leaves the placeholder
    /// in place.
    pub fn invalidating(placeholder: T) -> Derived<K, T> {
        Derived {
            key: Rc::new(RefCell::new(None)),
            latest: Latest::new(placeholder.clone()),
            placeholder: Some(placeholder),
        }
    }

    /// Re-derives the value if `key` differs from the key of the last derivation.
    ///
    /// Returns whether a new derivation was started.
    pub fn refresh(&self, key: K, fetch: impl FnOnce(&K) -> Fetch<T>) -> bool {
        if self.key.borrow().as_ref() == Some(&key) {
            return false;
        }
        let fetch = fetch(&key);
        self.key.replace(Some(key));
        match fetch {
            Fetch::Ready(value) => {
                self.latest.ready(value);
            }
            Fetch::Request(request) => {
                if let Some(placeholder) = &self.placeholder {
                    self.latest.ready(placeholder.clone());
                }
                self.latest.request(request);
            }
        }
        true
    }

    /// Forgets the current key and publishes `value`; the next `refresh` always re-derives.
    pub fn reset(&self, value: T) {
        self.key.replace(None);
        self.latest.ready(value);
    }

    pub fn get(&self) -> T {
        self.latest.get()
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_pending()
    }

    pub fn state(&self) -> &State<T> {
        self.latest.state()
    }
}
