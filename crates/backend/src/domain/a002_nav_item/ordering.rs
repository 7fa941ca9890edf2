//! Pure helpers that keep `order_index` dense and zero based within a group.

use std::collections::HashSet;

use contracts::domain::a002_nav_item::aggregate::{NavItem, NavItemId};

/// Target index for every position of `ids`: `0..len`.
pub fn dense_indexes(ids: &[NavItemId]) -> Vec<(NavItemId, i32)> {
    ids.iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx as i32))
        .collect()
}

/// Only the rows whose stored index differs from its dense position.
pub fn changed_indexes(items: &[NavItem], ordered: &[NavItemId]) -> Vec<(NavItemId, i32)> {
    dense_indexes(ordered)
        .into_iter()
        .filter(|(id, idx)| {
            items
                .iter()
                .find(|item| item.id == *id)
                .map_or(true, |item| item.order_index != *idx)
        })
        .collect()
}

/// Requested order must name every member of the group exactly once.
pub fn check_permutation(current: &[NavItemId], requested: &[NavItemId]) -> Result<(), String> {
    let requested_set: HashSet<_> = requested.iter().collect();
    if requested_set.len() != requested.len() {
        return Err("Список содержит повторяющиеся пункты".into());
    }
    let current_set: HashSet<_> = current.iter().collect();
    if requested_set != current_set {
        return Err(format!(
            "Список должен содержать ровно {} пункт(ов) группы, получено {}",
            current.len(),
            requested.len()
        ));
    }
    Ok(())
}

/// Insert at `index`, clamped to the end. Returns the effective position.
pub fn insert_clamped(ids: &mut Vec<NavItemId>, id: NavItemId, index: usize) -> usize {
    let position = index.min(ids.len());
    ids.insert(position, id);
    position
}
