//! Lenses.
//!
//! A lens is an object that represents a way to access a component of some aggregate type `A`.
//! Given a reference to an aggregate of type `A` (the _source_), it provides access to an object
//! of type `B` (the _target_) stored within the aggregate, potentially deep within its structure.
//! For all intents and purposes, you can see lenses as a reified sequence of field accesses and
//! indexing operations (e.g. `.food.weight.amount`, `.ingredients[2]`).
//!
//! Lenses never mutate shared state: paired with a [`Setter`], they produce a _copy_ of the
//! source with the target replaced, and route that copy through the setter of the source.
use crate::state::{Setter, Update};
use std::{fmt, marker::PhantomData};

/// Trait implemented by "lens" types, which act like a reified accessor for
/// some "child" part of type `Target` of a "parent" object of type `Source`.
// Accessors use the closure-passing style so that lenses that synthesize their target
// (instead of borrowing it from the source) can be added later without changing the trait.
pub trait Lens: Clone + 'static {
    type Source;
    type Target;

    // --- Accessors ---
    fn with<R, F: FnOnce(&Self::Target) -> R>(&self, data: &Self::Source, f: F) -> R;
    fn with_mut<R, F: FnOnce(&mut Self::Target) -> R>(&self, data: &mut Self::Source, f: F) -> R;

    /// Returns a copy of the target.
    fn get(&self, data: &Self::Source) -> Self::Target
    where
        Self::Target: Clone,
    {
        self.with(data, |x| x.clone())
    }

    /// Returns a copy of `data` with the target replaced by `value`.
    fn put(&self, data: &Self::Source, value: Self::Target) -> Self::Source
    where
        Self::Source: Clone,
    {
        let mut next = data.clone();
        self.with_mut(&mut next, |target| *target = value);
        next
    }

    // --- Composition ---

    /// Lens composition.
    fn compose<K>(self, rhs: K) -> LensCompose<Self, K>
    where
        K: Lens<Source = Self::Target>,
    {
        LensCompose(self, rhs)
    }
}

/// Lens over a field of a struct.
///
/// Usually declared as an associated constant of the struct:
/// ```ignore
/// impl Weight {
///     pub const AMOUNT: Field<Weight, String> = Field::new(|w| &w.amount, |w| &mut w.amount);
/// }
/// ```
pub struct Field<A, B> {
    get: fn(&A) -> &B,
    get_mut: fn(&mut A) -> &mut B,
}

impl<A, B> Field<A, B> {
    pub const fn new(get: fn(&A) -> &B, get_mut: fn(&mut A) -> &mut B) -> Field<A, B> {
        Field { get, get_mut }
    }
}

// #26925
impl<A, B> Clone for Field<A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, B> Copy for Field<A, B> {}

impl<A, B> fmt::Debug for Field<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Field<{}, {}>", std::any::type_name::<A>(), std::any::type_name::<B>())
    }
}

impl<A: 'static, B: 'static> Lens for Field<A, B> {
    type Source = A;
    type Target = B;

    fn with<R, F: FnOnce(&B) -> R>(&self, data: &A, f: F) -> R {
        f((self.get)(data))
    }

    fn with_mut<R, F: FnOnce(&mut B) -> R>(&self, data: &mut A, f: F) -> R {
        f((self.get_mut)(data))
    }
}

/// A lens that looks at a particular item in a vector.
///
/// Panics on access if the index is out of bounds.
pub struct Index<T> {
    index: usize,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Index<T> {
    pub fn new(index: usize) -> Index<T> {
        Index {
            index,
            _phantom: PhantomData,
        }
    }
}

// #26925
impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        Index::new(self.index)
    }
}

impl<T> fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

impl<T: 'static> Lens for Index<T> {
    type Source = Vec<T>;
    type Target = T;

    fn with<R, F: FnOnce(&T) -> R>(&self, data: &Vec<T>, f: F) -> R {
        f(&data[self.index])
    }

    fn with_mut<R, F: FnOnce(&mut T) -> R>(&self, data: &mut Vec<T>, f: F) -> R {
        f(&mut data[self.index])
    }
}

/// Lens composition: combines `Lens<U,V>` and `Lens<V,W>` to `Lens<U,W>`.
///
/// Equivalent to applying two lenses in succession.
#[derive(Clone, Debug)]
pub struct LensCompose<K, L>(pub K, pub L);

impl<K, L> Lens for LensCompose<K, L>
where
    K: Lens,
    L: Lens<Source = K::Target>,
{
    type Source = K::Source;
    type Target = L::Target;

    fn with<R, F: FnOnce(&L::Target) -> R>(&self, data: &K::Source, f: F) -> R {
        self.0.with(data, |data| self.1.with(data, f))
    }

    fn with_mut<R, F: FnOnce(&mut L::Target) -> R>(&self, data: &mut K::Source, f: F) -> R {
        self.0.with_mut(data, |data| self.1.with_mut(data, f))
    }
}

//--------------------------------------------------------------------------------------------------

/// Derives a `(value, setter)` pair for the part of `container` that `key` looks at.
///
/// The returned setter accepts either a replacement value or a transform, and produces a new
/// container that is routed through `set_container`. It closes over `set_container`, not over
/// `container`, so transforms always apply to the latest state.
pub fn lens<L>(container: &L::Source, set_container: &Setter<L::Source>, key: L) -> (L::Target, Setter<L::Target>)
where
    L: Lens,
    L::Source: Clone + 'static,
    L::Target: Clone + 'static,
{
    (key.get(container), set_container.focus(key))
}

/// Derives one `(value, setter)` pair per lens of a tuple of lenses over the same container.
///
/// Each setter is wired independently to `set_container`, so editing sibling fields back-to-back
/// does not lose any of the edits.
pub fn lenses<A, K>(container: &A, set_container: &Setter<A>, keys: K) -> K::Output
where
    K: Lenses<A>,
{
    keys.project(container, set_container)
}

/// Tuples of lenses over the same source. See [`lenses`].
pub trait Lenses<A> {
    type Output;
    fn project(self, container: &A, set_container: &Setter<A>) -> Self::Output;
}

macro_rules! impl_lenses_tuple {
    ($($L:ident $i:tt),*) => {
        impl<A, $($L),*> Lenses<A> for ($($L,)*)
        where
            A: Clone + 'static,
            $($L: Lens<Source = A>, $L::Target: Clone + 'static,)*
        {
            type Output = ($(($L::Target, Setter<$L::Target>),)*);

            fn project(self, container: &A, set_container: &Setter<A>) -> Self::Output {
                ($(lens(container, set_container, self.$i),)*)
            }
        }
    };
}

impl_lenses_tuple!(L0 0, L1 1);
impl_lenses_tuple!(L0 0, L1 1, L2 2);
impl_lenses_tuple!(L0 0, L1 1, L2 2, L3 3);

impl<T: 'static> Setter<T> {
    /// Returns a setter for the part of `T` that `lens` looks at.
    ///
    /// Updates sent to the returned setter become transforms of the whole `T`: the latest `T` is
    /// copied, the focused part is updated in the copy, and the copy replaces `T`.
    pub fn focus<L>(&self, lens: L) -> Setter<L::Target>
    where
        L: Lens<Source = T>,
        T: Clone,
        L::Target: 'static,
    {
        let parent = self.clone();
        Setter::new(move |update: Update<L::Target>| {
            let lens = lens.clone();
            parent.modify(move |container: &T| {
                let mut next = container.clone();
                lens.with_mut(&mut next, |target| {
                    let value = update.apply(target);
                    *target = value;
                });
                next
            });
        })
    }
}
