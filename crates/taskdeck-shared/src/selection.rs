use std::collections::BTreeSet;

use uuid::Uuid;

use crate::TaskDto;

/// Flip membership of one task id in the bulk-selection set.
pub fn toggle(selection: &mut BTreeSet<Uuid>, id: Uuid) {
    if !selection.remove(&id) {
        selection.insert(id);
    }
}

/// Drop selected ids that no longer exist in the rendered list, keeping
/// the selection a subset of what the user can see.
pub fn retain_present(selection: &mut BTreeSet<Uuid>, tasks: &[TaskDto]) {
    selection.retain(|id| tasks.iter().any(|task| task.id == *id));
}

/// Ids for a bulk call, or None when nothing is selected (the caller
/// reports "No tasks selected" and must not hit the backend).
pub fn bulk_ids(selection: &BTreeSet<Uuid>) -> Option<Vec<Uuid>> {
    if selection.is_empty() {
        None
    } else {
        Some(selection.iter().copied().collect())
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;
    use crate::reorder::renumber;
    use crate::TaskPriority;

    fn task(title: &str) -> TaskDto {
        TaskDto {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            completed: false,
            priority: TaskPriority::Medium,
            due_date: None,
            category: None,
            tags: vec![],
            is_pinned: false,
            is_archived: false,
            is_shared: false,
            is_recurring: false,
            recurrence_pattern: Default::default(),
            recurrence_end_date: None,
            estimated_minutes: None,
            comment_count: 0,
            attachment_count: 0,
            position: 0,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = BTreeSet::new();
        let id = Uuid::new_v4();

        toggle(&mut selection, id);
        assert!(selection.contains(&id));

        toggle(&mut selection, id);
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_selection_yields_no_bulk_ids() {
        let selection = BTreeSet::new();
        assert!(bulk_ids(&selection).is_none());
    }

    #[test]
    fn bulk_ids_cover_the_whole_selection() {
        let mut selection = BTreeSet::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        toggle(&mut selection, a);
        toggle(&mut selection, b);

        let ids = bulk_ids(&selection).expect("two selected ids");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));
    }

    #[test]
    fn retain_present_enforces_the_subset_invariant() {
        let mut tasks = vec![task("kept"), task("dropped")];
        renumber(&mut tasks);

        let mut selection = BTreeSet::new();
        toggle(&mut selection, tasks[0].id);
        toggle(&mut selection, tasks[1].id);

        let removed = tasks.pop().expect("second task");
        retain_present(&mut selection, &tasks);

        assert!(selection.contains(&tasks[0].id));
        assert!(!selection.contains(&removed.id));
    }
}
