//! Walks over the parent and predecessor links used for display grouping.
//!
//! Both walks keep a visited set and stop on the first repeat, so a cyclic
//! table still yields an answer.

use std::collections::HashSet;

use crate::model::TaskTable;

/// First task of the unbroken predecessor chain `id` belongs to.
///
/// The walk follows `predecessor_id` while the predecessor exists and shares
/// the task's parent. It stops at the first task whose predecessor is absent
/// or sits under a different parent, and at the current node on a repeat.
pub fn chain_root<'a>(table: &'a TaskTable, id: &'a str) -> &'a str {
    let mut visited = HashSet::new();
    let mut current = id;
    loop {
        if !visited.insert(current) {
            return current;
        }
        let Some(pred) = table.effective_predecessor(current) else {
            return current;
        };
        if table.effective_parent(pred) != table.effective_parent(current) {
            return current;
        }
        current = pred;
    }
}

/// Ancestors of `id` from the top-level task down to `id` itself.
///
/// A parent cycle ends the path at the first repeated task.
pub fn lineage<'a>(table: &'a TaskTable, id: &'a str) -> Vec<&'a str> {
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current {
        if !visited.insert(node) {
            break;
        }
        path.push(node);
        current = table.effective_parent(node);
    }
    path.reverse();
    path
}
