use core::hash::Hash;
use core::ops::Deref;

use crate::hash::HashSet;

// -----------------------------------------------------------------------------
// UniqueVec

/// A list that keeps the first insertion of every distinct item.
///
/// Lookups are O(1) through an internal set, iteration follows
/// insertion order.
///
/// # Examples
///
/// ```
/// use sc_utils::UniqueVec;
///
/// let mut list = UniqueVec::new();
/// assert!(list.push("a"));
/// assert!(list.push("b"));
/// assert!(!list.push("a"));
///
/// assert_eq!(&*list, &["a", "b"]);
/// ```
#[derive(Clone, Debug)]
pub struct UniqueVec<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T> Default for UniqueVec<T> {
    #[inline]
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::default(),
        }
    }
}

impl<T: Eq + Hash + Clone> UniqueVec<T> {
    /// Create an empty [`UniqueVec`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` if it is not present yet.
    ///
    /// Returns `true` if the item was inserted.
    pub fn push(&mut self, item: T) -> bool {
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    /// Returns `true` if an equal item has been pushed.
    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    /// Consumes the list, returning the items in insertion order.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for UniqueVec<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for UniqueVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        iter.into_iter().for_each(|item| {
            list.push(item);
        });
        list
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::UniqueVec;

    #[test]
    fn keeps_first_insertion_order() {
        let list: UniqueVec<_> = ["b", "a", "b", "c", "a"].into_iter().collect();
        assert_eq!(list.into_vec(), vec!["b", "a", "c"]);
    }
}
