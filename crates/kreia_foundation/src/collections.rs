//! Persistent containers for scope frames.
//!
//! Grammar iterators fork constantly while a decision is computed, and each
//! fork carries its own scope stack. Both containers here wrap `im` types so
//! a fork is a reference-count bump rather than a deep copy.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

/// An immutable stack. Pushing and popping return new stacks that share
/// structure with the old one.
#[derive(Clone)]
pub struct SharedStack<T: Clone>(im::Vector<T>);

impl<T: Clone> SharedStack<T> {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Depth of the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The stack with `frame` on top.
    #[must_use]
    pub fn push(&self, frame: T) -> Self {
        let mut next = self.0.clone();
        next.push_back(frame);
        Self(next)
    }

    /// Splits off the top frame, or `None` when empty.
    #[must_use]
    pub fn pop(&self) -> Option<(Self, T)> {
        let mut rest = self.0.clone();
        let top = rest.pop_back()?;
        Some((Self(rest), top))
    }
}

impl<T: Clone> Default for SharedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for SharedStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T: Clone + PartialEq> PartialEq for SharedStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// An immutable name-keyed lookup table.
#[derive(Clone)]
pub struct SharedMap<K: Clone + Eq + Hash, V: Clone>(im::HashMap<K, V>);

impl<K: Clone + Eq + Hash, V: Clone> SharedMap<K, V> {
    /// Looks up `key`, accepting any borrowed form of it.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.get(key)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Default for SharedMap<K, V> {
    fn default() -> Self {
        Self(im::HashMap::new())
    }
}

impl<K: Clone + Eq + Hash + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug for SharedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> PartialEq for SharedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K: Clone + Eq + Hash, V: Clone> FromIterator<(K, V)> for SharedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
