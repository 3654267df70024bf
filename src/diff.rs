use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Outcome of diffing a working set against a baseline snapshot. Every
/// baseline or working key lands in exactly one bucket; working rows with
/// no key at all always land in `to_create`.
#[derive(Debug, Clone)]
pub struct DiffPlan<K, R> {
    pub to_delete: Vec<K>,
    pub to_create: Vec<R>,
    pub to_update: Vec<(K, R)>,
    pub unchanged: Vec<K>,
}

impl<K, R> DiffPlan<K, R> {
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty() && self.to_update.is_empty()
    }
}

/// Classifies working rows against the baseline.
///
/// Identity decides create-vs-update: a row without a key is created even if
/// some baseline row happens to hold identical content. `equals` decides
/// update-vs-unchanged for keys present on both sides; what "equal" means
/// (which fields are comparable, nested sub-structures) is the caller's call.
pub fn diff_collections<K, R, F>(
    baseline: &HashMap<K, R>,
    working: &[(Option<K>, R)],
    equals: F,
) -> DiffPlan<K, R>
where
    K: Eq + Hash + Clone,
    R: Clone,
    F: Fn(&R, &R) -> bool,
{
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    let mut unchanged = Vec::new();
    let mut seen: HashSet<K> = HashSet::with_capacity(working.len());

    for (key, record) in working {
        match key {
            None => to_create.push(record.clone()),
            Some(key) => {
                seen.insert(key.clone());
                match baseline.get(key) {
                    None => to_create.push(record.clone()),
                    Some(base) if equals(base, record) => unchanged.push(key.clone()),
                    Some(_) => to_update.push((key.clone(), record.clone())),
                }
            }
        }
    }

    let to_delete = baseline
        .keys()
        .filter(|key| !seen.contains(*key))
        .cloned()
        .collect();

    DiffPlan {
        to_delete,
        to_create,
        to_update,
        unchanged,
    }
}
