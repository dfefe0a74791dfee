//! Dynamic list editors.
//!
//! A [`KeyedVec`] is an ordered collection where each element is tagged with an [`ItemKey`]
//! allocated when the element is inserted. The visible order is the order of the entries; keys
//! only serve to find an element again. Item setters handed out by a [`ListEditor`] resolve
//! their element by key, so a setter created before an earlier element was deleted still
//! edits its own element (or does nothing if its element is gone).
//!
//! Every edit is a transform of the latest collection, applied through the setter of the whole
//! list.
use crate::state::{Setter, Update};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{cell::RefCell, collections::HashMap, fmt, num::NonZeroU64, rc::Rc};
use tracing::trace;
use traco_common::{Counter, Data};

static ITEM_KEYS: Counter = Counter::new();

/// Synthetic key of a list element, unique for the lifetime of the process.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ItemKey(NonZeroU64);

impl ItemKey {
    /// Allocates a new key.
    pub fn next() -> ItemKey {
        ItemKey(ITEM_KEYS.next_nonzero())
    }

    pub fn to_u64(self) -> u64 {
        self.0.get()
    }
}

traco_common::impl_data_simple!(ItemKey);

/// Ordered collection of keyed elements.
///
/// Serialized as a plain array of elements; keys are reassigned on deserialization.
#[derive(Clone)]
pub struct KeyedVec<T> {
    entries: Vec<(ItemKey, T)>,
}

impl<T> Default for KeyedVec<T> {
    fn default() -> Self {
        KeyedVec { entries: Vec::new() }
    }
}

impl<T: fmt::Debug> fmt::Debug for KeyedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(k, v)| (k.to_u64(), v))).finish()
    }
}

impl<T: PartialEq> PartialEq for KeyedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T: Data> Data for KeyedVec<T> {
    fn same(&self, other: &Self) -> bool {
        self.entries.same(&other.entries)
    }
}

impl<T> From<Vec<T>> for KeyedVec<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> FromIterator<T> for KeyedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        KeyedVec {
            entries: iter.into_iter().map(|item| (ItemKey::next(), item)).collect(),
        }
    }
}

impl<T: Serialize> Serialize for KeyedVec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyedVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(KeyedVec::from)
    }
}

impl<T> KeyedVec<T> {
    pub fn new() -> KeyedVec<T> {
        KeyedVec::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an element and returns its new key.
    pub fn push(&mut self, item: T) -> ItemKey {
        let key = ItemKey::next();
        self.entries.push((key, item));
        key
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKey, &T)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn position(&self, key: ItemKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    pub fn contains_key(&self, key: ItemKey) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: ItemKey) -> Option<&T> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Returns the key and element at `index`.
    pub fn get_index(&self, index: usize) -> Option<(ItemKey, &T)> {
        self.entries.get(index).map(|(k, v)| (*k, v))
    }

    /// Removes the element with the given key. Trailing elements shift down by one position.
    pub fn remove(&mut self, key: ItemKey) -> Option<T> {
        let index = self.position(key)?;
        Some(self.entries.remove(index).1)
    }

    /// Applies an edit to the element with the given key: `None` removes it, otherwise the
    /// update replaces or transforms it in place.
    ///
    /// Returns `false` (and does nothing) if there is no such element.
    pub fn apply(&mut self, key: ItemKey, update: Option<Update<T>>) -> bool {
        match self.position(key) {
            Some(index) => self.apply_at(index, update),
            None => false,
        }
    }

    /// Same as [`KeyedVec::apply`], but addresses the element by position.
    pub fn apply_at(&mut self, index: usize, update: Option<Update<T>>) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        match update {
            None => {
                self.entries.remove(index);
            }
            Some(update) => {
                let item = &mut self.entries[index].1;
                *item = update.apply(item);
            }
        }
        true
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.values().cloned().collect()
    }
}

//--------------------------------------------------------------------------------------------------

impl<T: Clone + 'static> Setter<KeyedVec<T>> {
    /// Appends an element to the latest list.
    pub fn push(&self, item: T) {
        self.modify(move |items| {
            let mut next = items.clone();
            next.push(item);
            next
        })
    }

    /// Edits the element currently at `index` of the latest list. `None` removes it.
    pub fn apply_at(&self, index: usize, update: Option<Update<T>>) {
        self.modify(move |items| {
            let mut next = items.clone();
            if !next.apply_at(index, update) {
                trace!(index, "no list element at this position");
            }
            next
        })
    }

    /// Returns a setter bound to the element with the given key.
    pub fn item(&self, key: ItemKey) -> ItemSetter<T> {
        ItemSetter {
            key,
            list: self.clone(),
        }
    }
}

/// Setter for one element of a list, bound to the element's key.
pub struct ItemSetter<T> {
    key: ItemKey,
    list: Setter<KeyedVec<T>>,
}

// #26925
impl<T> Clone for ItemSetter<T> {
    fn clone(&self) -> Self {
        ItemSetter {
            key: self.key,
            list: self.list.clone(),
        }
    }
}

impl<T> fmt::Debug for ItemSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ItemSetter").field(&self.key).finish()
    }
}

impl<T: Clone + 'static> ItemSetter<T> {
    pub fn key(&self) -> ItemKey {
        self.key
    }

    /// Replaces, transforms or (with `None`) removes the element.
    pub fn apply(&self, update: Option<Update<T>>) {
        let key = self.key;
        self.list.modify(move |items| {
            let mut next = items.clone();
            if !next.apply(key, update) {
                trace!(key = key.to_u64(), "list element is gone, ignoring edit");
            }
            next
        })
    }

    pub fn set(&self, item: T) {
        self.apply(Some(Update::Replace(item)))
    }

    pub fn modify(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.apply(Some(Update::with(f)))
    }

    pub fn remove(&self) {
        self.apply(None)
    }

    /// Returns a plain setter for the element, for use with lenses.
    pub fn as_setter(&self) -> Setter<T> {
        let this = self.clone();
        Setter::new(move |update| this.apply(Some(update)))
    }
}

/// Appends elements to a list.
pub struct AddItem<T> {
    list: Setter<KeyedVec<T>>,
}

// #26925
impl<T> Clone for AddItem<T> {
    fn clone(&self) -> Self {
        AddItem { list: self.list.clone() }
    }
}

impl<T: Clone + 'static> AddItem<T> {
    pub fn add(&self, item: T) {
        self.list.push(item)
    }
}

//--------------------------------------------------------------------------------------------------

/// Output of [`ListEditor::render`].
#[derive(Clone, Debug)]
pub struct ListView<V> {
    /// The rendered elements (inside the wrapper), or the empty placeholder.
    pub content: V,
    /// The add affordance. Always present.
    pub add: V,
}

/// Renders an editable list.
///
/// The element type `T` and the view type `V` are free; the editor only decides what to render
/// and hands out the setters.
pub struct ListEditor<T, V> {
    render_empty: Option<Rc<dyn Fn() -> V>>,
    render_item: Rc<dyn Fn(&T, usize, ItemSetter<T>) -> V>,
    render_add: Rc<dyn Fn(AddItem<T>) -> V>,
    render_wrapper: Rc<dyn Fn(Vec<(ItemKey, V)>) -> V>,
}

// #26925
impl<T, V> Clone for ListEditor<T, V> {
    fn clone(&self) -> Self {
        ListEditor {
            render_empty: self.render_empty.clone(),
            render_item: self.render_item.clone(),
            render_add: self.render_add.clone(),
            render_wrapper: self.render_wrapper.clone(),
        }
    }
}

impl<T: Clone + 'static, V: 'static> ListEditor<T, V> {
    /// Creates a list editor.
    ///
    /// * `render_item(item, index, set_item)` renders one element
    /// * `render_add(add_item)` renders the affordance used to append elements
    /// * `render_wrapper(items)` wraps the rendered elements, in order, with their keys
    pub fn new(
        render_item: impl Fn(&T, usize, ItemSetter<T>) -> V + 'static,
        render_add: impl Fn(AddItem<T>) -> V + 'static,
        render_wrapper: impl Fn(Vec<(ItemKey, V)>) -> V + 'static,
    ) -> ListEditor<T, V> {
        ListEditor {
            render_empty: None,
            render_item: Rc::new(render_item),
            render_add: Rc::new(render_add),
            render_wrapper: Rc::new(render_wrapper),
        }
    }

    /// Sets what to render instead of the wrapper when the list is empty.
    pub fn on_empty(mut self, render_empty: impl Fn() -> V + 'static) -> Self {
        self.render_empty = Some(Rc::new(render_empty));
        self
    }

    pub fn render(&self, items: &KeyedVec<T>, set_items: &Setter<KeyedVec<T>>) -> ListView<V> {
        let content = match &self.render_empty {
            Some(render_empty) if items.is_empty() => render_empty(),
            _ => {
                let rendered = items
                    .iter()
                    .enumerate()
                    .map(|(index, (key, item))| (key, (self.render_item)(item, index, set_items.item(key))))
                    .collect();
                (self.render_wrapper)(rendered)
            }
        };
        let add = (self.render_add)(AddItem {
            list: set_items.clone(),
        });
        ListView { content, add }
    }
}

//--------------------------------------------------------------------------------------------------

/// Per-element stateful sub-components of a list (e.g. one search selector per element).
///
/// Components are created the first time their element is seen and dropped when it disappears
/// from the list.
pub struct ItemComponents<C> {
    components: Rc<RefCell<HashMap<ItemKey, C>>>,
    make: Rc<dyn Fn(ItemKey) -> C>,
}

// #26925
impl<C> Clone for ItemComponents<C> {
    fn clone(&self) -> Self {
        ItemComponents {
            components: self.components.clone(),
            make: self.make.clone(),
        }
    }
}

impl<C: Clone + 'static> ItemComponents<C> {
    pub fn new(make: impl Fn(ItemKey) -> C + 'static) -> ItemComponents<C> {
        ItemComponents {
            components: Rc::new(RefCell::new(HashMap::new())),
            make: Rc::new(make),
        }
    }

    pub fn len(&self) -> usize {
        self.components.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.borrow().is_empty()
    }

    pub fn get(&self, key: ItemKey) -> Option<C> {
        self.components.borrow().get(&key).cloned()
    }

    /// Returns the component of the element, creating it if needed.
    pub fn get_or_insert(&self, key: ItemKey) -> C {
        if let Some(component) = self.get(key) {
            return component;
        }
        let component = (self.make)(key);
        self.components.borrow_mut().insert(key, component.clone());
        component
    }

    /// Brings the components in line with `items`, then calls `f` on every (component, element)
    /// pair in list order.
    pub fn sync<T>(&self, items: &KeyedVec<T>, mut f: impl FnMut(&C, ItemKey, &T)) {
        {
            let mut components = self.components.borrow_mut();
            let before = components.len();
            components.retain(|key, _| items.contains_key(*key));
            if components.len() != before {
                trace!(dropped = before - components.len(), "dropped list item components");
            }
        }
        for (key, item) in items.iter() {
            // `f` may call back into this collection
            let component = self.get_or_insert(key);
            f(&component, key, item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use std::cell::Cell;

    fn letters() -> State<KeyedVec<String>> {
        State::new(KeyedVec::from(vec!["a".to_string(), "b".to_string(), "c".to_string()]))
    }

    fn values(state: &State<KeyedVec<String>>) -> Vec<String> {
        state.get().to_vec()
    }

    fn editor() -> ListEditor<String, String> {
        ListEditor::new(
            |item: &String, index, _| format!("{index}:{item}"),
            |_| "+".to_string(),
            |items: Vec<(ItemKey, String)>| {
                items.into_iter().map(|(_, v)| v).collect::<Vec<_>>().join(",")
            },
        )
    }

    #[test]
    fn delete_by_position_shifts_trailing_elements() {
        let state = letters();
        let setter = state.setter();
        setter.apply_at(1, None);
        assert_eq!(values(&state), ["a", "c"]);
        setter.apply_at(1, Some(Update::with(|s: &String| s.to_uppercase())));
        assert_eq!(values(&state), ["a", "C"]);
    }

    #[test]
    fn add_preserves_order() {
        let state = letters();
        state.setter().push("d".to_string());
        assert_eq!(values(&state), ["a", "b", "c", "d"]);
    }

    #[test]
    fn item_setter_follows_its_element_across_deletions() {
        let state = letters();
        let setter = state.setter();
        let items = state.get();
        let (key_b, _) = items.get_index(1).unwrap();
        let (key_c, _) = items.get_index(2).unwrap();
        let set_b = setter.item(key_b);
        let set_c = setter.item(key_c);

        set_b.remove();
        set_c.modify(|c| format!("{c}!"));
        assert_eq!(values(&state), ["a", "c!"]);

        // b is gone: its setter no longer does anything
        let revision = state.revision();
        set_b.set("zombie".to_string());
        assert_eq!(values(&state), ["a", "c!"]);
        assert_eq!(state.revision(), revision);
    }

    #[test]
    fn back_to_back_edits_are_not_lost() {
        let state = letters();
        let items = state.get();
        let setter = state.setter();
        let (key_a, _) = items.get_index(0).unwrap();
        // both edits captured from the same snapshot
        setter.item(key_a).modify(|a| format!("{a}1"));
        setter.item(key_a).modify(|a| format!("{a}2"));
        setter.push("d".to_string());
        assert_eq!(values(&state), ["a12", "b", "c", "d"]);
    }

    #[test]
    fn item_setter_as_plain_setter() {
        let state = letters();
        let (key, _) = state.get().get_index(2).unwrap();
        state.setter().item(key).as_setter().set("z".to_string());
        assert_eq!(values(&state), ["a", "b", "z"]);
    }

    #[test]
    fn render_passes_items_in_order() {
        let state = letters();
        let view = editor().render(&state.get(), &state.setter());
        assert_eq!(view.content, "0:a,1:b,2:c");
        assert_eq!(view.add, "+");
    }

    #[test]
    fn empty_list_renders_placeholder_and_add_affordance() {
        let state = State::new(KeyedVec::<String>::new());
        let view = editor().render(&state.get(), &state.setter());
        // no placeholder configured: the wrapper is rendered with no items
        assert_eq!(view.content, "");
        assert_eq!(view.add, "+");

        let editor = editor().on_empty(|| "nothing here".to_string());
        let view = editor.render(&state.get(), &state.setter());
        assert_eq!(view.content, "nothing here");
        assert_eq!(view.add, "+");
    }

    #[test]
    fn add_affordance_appends() {
        let state = State::new(KeyedVec::<String>::new());
        let added = Rc::new(RefCell::new(None));
        let editor: ListEditor<String, ()> = {
            let added = added.clone();
            ListEditor::new(|_, _, _| (), move |add| *added.borrow_mut() = Some(add), |_| ())
        };
        editor.render(&state.get(), &state.setter());
        let add = added.borrow_mut().take().unwrap();
        add.add("x".to_string());
        add.add("y".to_string());
        assert_eq!(values(&state), ["x", "y"]);
    }

    #[test]
    fn item_components_follow_the_list() {
        let created = Rc::new(Cell::new(0));
        let components = {
            let created = created.clone();
            ItemComponents::new(move |key: ItemKey| {
                created.set(created.get() + 1);
                Rc::new(key)
            })
        };
        let state = letters();
        components.sync(&state.get(), |_, _, _| {});
        assert_eq!(components.len(), 3);
        assert_eq!(created.get(), 3);

        let (key_b, _) = state.get().get_index(1).unwrap();
        let before = components.get(key_b).unwrap();
        state.setter().apply_at(0, None);
        components.sync(&state.get(), |_, _, _| {});
        assert_eq!(components.len(), 2);
        // b kept its component
        assert!(Rc::ptr_eq(&before, &components.get(key_b).unwrap()));
        assert_eq!(created.get(), 3);
    }

    #[test]
    fn serializes_as_plain_array() {
        let items = KeyedVec::from(vec![1, 2, 3]);
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json, serde_json::json!([1, 2, 3]));
        let back: KeyedVec<i32> = serde_json::from_value(json).unwrap();
        assert_eq!(back.to_vec(), vec![1, 2, 3]);
        // fresh keys
        assert!(!back.contains_key(items.get_index(0).unwrap().0));
    }
}
