//! # State
//! The "source of truth" of a form.
//!
//! A [`State`] is a single slot holding a value. Every write goes through [`State::update`],
//! which applies an [`Update`] (a replacement or a pure transform) to the _latest_ value, so
//! two writes issued back-to-back are applied in order and none of them is lost.
//!
//! Watchers registered on the slot are called back whenever the value changes (as decided by
//! [`Data::same`]). They receive a snapshot, and are free to write to the state again.
use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};
use tracing::trace;
use traco_common::Data;

/// A pending write to a value: either a literal replacement, or a pure transform of the current
/// value.
pub enum Update<T> {
    Replace(T),
    Modify(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// Creates a transform update.
    pub fn with(f: impl FnOnce(&T) -> T + 'static) -> Update<T> {
        Update::Modify(Box::new(f))
    }

    /// Computes the new value from the current one.
    pub fn apply(self, current: &T) -> T {
        match self {
            Update::Replace(value) => value,
            Update::Modify(f) => f(current),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Update::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Modify(_) => f.write_str("Modify(..)"),
        }
    }
}

//--------------------------------------------------------------------------------------------------

/// A cloneable handle that writes to some value.
///
/// Setters are obtained from a [`State`] with [`State::setter`], and narrowed down to parts of
/// the value with [`Setter::focus`] (see also [`crate::lens::lens`]).
pub struct Setter<T>(Rc<dyn Fn(Update<T>)>);

// #26925
impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Setter(self.0.clone())
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Setter")
    }
}

impl<T: 'static> Setter<T> {
    pub fn new(f: impl Fn(Update<T>) + 'static) -> Setter<T> {
        Setter(Rc::new(f))
    }

    pub fn apply(&self, update: Update<T>) {
        (self.0)(update)
    }

    /// Replaces the value.
    pub fn set(&self, value: T) {
        self.apply(Update::Replace(value))
    }

    /// Replaces the value by the result of `f` applied to the latest value.
    pub fn modify(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.apply(Update::with(f))
    }
}

//--------------------------------------------------------------------------------------------------

/// Something that wants to know when a state slot changes.
pub trait Watcher<T> {
    /// Called by the state when its value has changed.
    fn on_change(&self, data: &T);
}

impl<T, F: Fn(&T)> Watcher<T> for F {
    fn on_change(&self, data: &T) {
        self(data)
    }
}

struct StateInner<T> {
    data: RefCell<T>,
    revision: Cell<u64>,
    watchers: RefCell<Vec<Weak<dyn Watcher<T>>>>,
}

/// Shared state slot.
pub struct State<T: Data>(Rc<StateInner<T>>);

// #26925
impl<T: Data> Clone for State<T> {
    fn clone(&self) -> Self {
        State(self.0.clone())
    }
}

impl<T: Data + fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("State")
            .field("data", &*self.0.data.borrow())
            .field("revision", &self.0.revision.get())
            .finish()
    }
}

impl<T: Data + Default> Default for State<T> {
    fn default() -> Self {
        State::new(T::default())
    }
}

impl<T: Data> State<T> {
    /// Creates a new state slot holding `data`.
    pub fn new(data: T) -> State<T> {
        State(Rc::new(StateInner {
            data: RefCell::new(data),
            revision: Cell::new(0),
            watchers: RefCell::new(Vec::new()),
        }))
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.0.data.borrow().clone()
    }

    pub fn with<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
        let data = self.0.data.borrow();
        f(&*data)
    }

    /// Number of effective changes since the slot was created.
    pub fn revision(&self) -> u64 {
        self.0.revision.get()
    }

    /// Applies an update to the latest value, and notifies watchers if the value changed.
    pub fn update(&self, update: Update<T>) {
        let next = {
            let data = self.0.data.borrow();
            update.apply(&*data)
        };
        let changed = {
            let mut data = self.0.data.borrow_mut();
            if data.same(&next) {
                false
            } else {
                *data = next;
                true
            }
        };
        if changed {
            self.0.revision.set(self.0.revision.get() + 1);
            self.notify();
        }
    }

    pub fn set(&self, value: T) {
        self.update(Update::Replace(value))
    }

    pub fn modify(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.update(Update::with(f))
    }

    /// Returns a setter that writes to this slot.
    ///
    /// The setter does not keep the slot alive: writes through a setter that outlived its slot are
    /// dropped.
    pub fn setter(&self) -> Setter<T> {
        let weak = Rc::downgrade(&self.0);
        Setter::new(move |update| match weak.upgrade() {
            Some(inner) => State(inner).update(update),
            None => trace!("state dropped, discarding update"),
        })
    }

    /// Adds a watcher that will be called back immediately and whenever the state changes.
    ///
    /// Only a weak reference is kept: the watcher is removed once the caller drops it.
    pub fn add_watcher(&self, watcher: &Rc<dyn Watcher<T>>) {
        let snapshot = self.get();
        watcher.on_change(&snapshot);
        self.0.watchers.borrow_mut().push(Rc::downgrade(watcher));
    }

    /// Convenience wrapper over `add_watcher` for closures. Keep the returned handle alive for as
    /// long as the closure should be called.
    pub fn watch(&self, f: impl Fn(&T) + 'static) -> Rc<dyn Watcher<T>> {
        let watcher: Rc<dyn Watcher<T>> = Rc::new(f);
        self.add_watcher(&watcher);
        watcher
    }

    fn notify(&self) {
        let watchers: Vec<Rc<dyn Watcher<T>>> = {
            let mut watchers = self.0.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            watchers.iter().filter_map(|w| w.upgrade()).collect()
        };
        if watchers.is_empty() {
            return;
        }
        // watchers may write to the state again: hand them a snapshot, never a borrow
        let snapshot = self.get();
        for w in watchers {
            w.on_change(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_applies_transforms_in_order() {
        let state = State::new(1u32);
        let setter = state.setter();
        setter.modify(|x| x * 10);
        setter.modify(|x| x + 1);
        assert_eq!(state.get(), 11);
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn same_value_does_not_notify() {
        let state = State::new(String::from("apple"));
        let calls = Rc::new(Cell::new(0));
        let _watcher = {
            let calls = calls.clone();
            state.watch(move |_: &String| calls.set(calls.get() + 1))
        };
        // called once on registration
        assert_eq!(calls.get(), 1);
        state.set("apple".to_string());
        assert_eq!(calls.get(), 1);
        assert_eq!(state.revision(), 0);
        state.set("pear".to_string());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn dropped_watchers_are_not_called() {
        let state = State::new(0u32);
        let calls = Rc::new(Cell::new(0));
        let watcher = {
            let calls = calls.clone();
            state.watch(move |_: &u32| calls.set(calls.get() + 1))
        };
        drop(watcher);
        state.set(3);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn watchers_can_write_back() {
        // clamp the value from a watcher
        let state = State::new(0i32);
        let setter = state.setter();
        let _watcher = state.watch(move |value: &i32| {
            if *value > 10 {
                setter.set(10);
            }
        });
        state.set(42);
        assert_eq!(state.get(), 10);
    }

    #[test]
    fn setter_outliving_state_is_inert() {
        let state = State::new(0u32);
        let setter = state.setter();
        drop(state);
        setter.set(5);
    }
}
