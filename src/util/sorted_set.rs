//! Sorted, deduplicated set backed by a vector.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered set with binary-search lookups and linear-time merges.
///
/// Serialized as a plain array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortedSet<T> {
    elements: Vec<T>,
}

impl<T> Default for SortedSet<T> {
    fn default() -> Self {
        SortedSet {
            elements: Vec::new(),
        }
    }
}

impl<T: Ord> SortedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary elements, sorting and removing duplicates.
    pub fn load(mut elements: Vec<T>) -> Self {
        elements.sort();
        elements.dedup();
        SortedSet { elements }
    }

    /// Insert `element`. Returns false when it was already present.
    pub fn add(&mut self, element: T) -> bool {
        match self.elements.binary_search(&element) {
            Ok(_) => false,
            Err(pos) => {
                self.elements.insert(pos, element);
                true
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        for element in elements {
            self.add(element);
        }
    }

    /// Position of `element`, if present.
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.elements.binary_search(element).ok()
    }

    /// Position at which `element` is or would be inserted.
    pub fn location_for(&self, element: &T) -> usize {
        match self.elements.binary_search(element) {
            Ok(pos) | Err(pos) => pos,
        }
    }

    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }
}

impl<T: Ord + Clone> SortedSet<T> {
    /// Elements present in both sets.
    pub fn intersect(&self, other: &SortedSet<T>) -> SortedSet<T> {
        let (a, b) = (&self.elements, &other.elements);
        let mut elements = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    elements.push(a[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }

        SortedSet { elements }
    }

    /// Elements present in either set.
    pub fn union(&self, other: &SortedSet<T>) -> SortedSet<T> {
        let (a, b) = (&self.elements, &other.elements);
        let mut elements = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    elements.push(a[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    elements.push(b[j].clone());
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    elements.push(a[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        elements.extend_from_slice(&a[i..]);
        elements.extend_from_slice(&b[j..]);

        SortedSet { elements }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.elements.clone()
    }
}

impl<T: Ord> FromIterator<T> for SortedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        SortedSet::load(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a SortedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: Serialize> Serialize for SortedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.elements.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Ord> Deserialize<'de> for SortedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(SortedSet::load)
    }
}
