//! Integrity Pruner
//!
//! Keeps tasks consistent with the current person set after any roster
//! mutation: assignments referencing a deleted person are removed, and a
//! task left with zero assignments is dropped rather than persisted empty.

use std::collections::HashSet;

use crate::engine::normalize;
use crate::model::{Person, Task};

/// Remove dangling assignments and empty tasks.
///
/// For every task the assignment list is filtered to people present in
/// `people`, the projection is recomputed, and tasks whose filtered list
/// is empty are dropped. Idempotent: pruning an already-pruned set is a
/// no-op. Callers must run this after every write that could invalidate
/// references (person deletion, bulk roster replace) before persisting.
pub fn prune_orphans(people: &[Person], tasks: Vec<Task>) -> Vec<Task> {
    let valid_ids: HashSet<&str> = people.iter().map(|p| p.id.as_str()).collect();

    tasks
        .into_iter()
        .filter_map(|task| {
            let kept: Vec<_> = task
                .assignments
                .iter()
                .filter(|a| valid_ids.contains(a.person_id.as_str()))
                .cloned()
                .collect();
            if kept.is_empty() {
                return None;
            }
            Some(normalize::apply_to_task(task, kept, None))
        })
        .collect()
}
