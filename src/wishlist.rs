//! Wishlist
//!
//! Ordered sets of product ids, used for both the wishlist and the comparison list.

use serde::{Deserialize, Deserializer, Serialize};

/// Product ids without duplicates, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductSet {
    ids: Vec<String>,
}

impl ProductSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is now a member.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Add `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }

        self.ids.push(id.to_string());

        true
    }

    /// Remove `id`. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();

        self.ids.retain(|existing| existing != id);

        self.ids.len() != before
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Iterate over ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl<S: AsRef<str>> FromIterator<S> for ProductSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ProductSet::new();

        for id in iter {
            set.insert(id.as_ref());
        }

        set
    }
}

impl<'a> IntoIterator for &'a ProductSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for ProductSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(|ids| ids.into_iter().collect())
    }
}
