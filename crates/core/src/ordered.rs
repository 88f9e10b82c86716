use std::collections::HashSet;
use std::hash::Hash;

/// Insertion-ordered set: the first occurrence of a value wins, later
/// duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSet<T: Eq + Hash + Clone> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns `true` if the value was not already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Eq + Hash + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_occurrence_order() {
        let set: OrderedSet<&str> = ["AAC", "FLAC", "AAC", "DTS", "FLAC"].into_iter().collect();
        assert_eq!(set.as_slice(), &["AAC", "FLAC", "DTS"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn insert_reports_novelty() {
        let mut set = OrderedSet::new();
        assert!(set.insert("EN".to_string()));
        assert!(!set.insert("EN".to_string()));
        assert!(set.contains(&"EN".to_string()));
    }
}
