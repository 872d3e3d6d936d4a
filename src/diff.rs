use std::collections::HashSet;
use std::hash::Hash;

/// Keyed join between the keys currently on screen and the keys of a new
/// aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<K> {
    /// New keys, in next order
    pub enter: Vec<K>,
    /// Keys present on both sides, in next order
    pub update: Vec<K>,
    /// Keys that disappear, in previous order
    pub exit: Vec<K>,
}

impl<K> KeyedDiff<K> {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }
}

/// Split `previous` and `next` keys into enter / update / exit
pub fn diff_keys<K>(previous: &[K], next: &[K]) -> KeyedDiff<K>
where
    K: Eq + Hash + Clone,
{
    let prev_set: HashSet<&K> = previous.iter().collect();
    let next_set: HashSet<&K> = next.iter().collect();

    let mut enter = Vec::new();
    let mut update = Vec::new();
    for k in next {
        if prev_set.contains(k) {
            update.push(k.clone());
        } else {
            enter.push(k.clone());
        }
    }

    let exit = previous
        .iter()
        .filter(|k| !next_set.contains(k))
        .cloned()
        .collect();

    KeyedDiff {
        enter,
        update,
        exit,
    }
}
