use std::collections::BTreeMap;

use uuid::Uuid;

use crate::TaskDto;

/// Move the dragged task so it occupies the drop target's slot, shifting
/// the rest. Returns false (and leaves the list untouched) when either id
/// is missing or the ids are equal.
pub fn move_task(tasks: &mut Vec<TaskDto>, dragged: Uuid, target: Uuid) -> bool {
    if dragged == target {
        return false;
    }

    let Some(from) = tasks.iter().position(|task| task.id == dragged) else {
        return false;
    };
    let Some(to) = tasks.iter().position(|task| task.id == target) else {
        return false;
    };

    let moved = tasks.remove(from);
    tasks.insert(to, moved);
    true
}

/// Rewrite every `position` to the zero-based list index so the persisted
/// ordering is contiguous.
pub fn renumber(tasks: &mut [TaskDto]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.position = index as u32;
    }
}

/// Full id → position map submitted to the reorder endpoint.
pub fn position_map(tasks: &[TaskDto]) -> BTreeMap<Uuid, u32> {
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| (task.id, index as u32))
        .collect()
}

#[cfg(test)]
mod reorder_tests {
    use std::collections::BTreeSet;

    use super::*;
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

    fn sample(n: usize) -> Vec<TaskDto> {
        let mut tasks: Vec<TaskDto> = (0..n).map(|i| task(&format!("task {i}"))).collect();
        renumber(&mut tasks);
        tasks
    }

    #[test]
    fn move_preserves_id_set_and_renumbers_contiguously() {
        let mut tasks = sample(5);
        let before: BTreeSet<Uuid> = tasks.iter().map(|t| t.id).collect();
        let dragged = tasks[4].id;
        let target = tasks[1].id;

        assert!(move_task(&mut tasks, dragged, target));
        renumber(&mut tasks);

        let after: BTreeSet<Uuid> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(before, after);
        assert_eq!(tasks[1].id, dragged);
        for (index, task) in tasks.iter().enumerate() {
            assert_eq!(task.position, index as u32);
        }
    }

    #[test]
    fn position_map_matches_visual_order() {
        let mut tasks = sample(4);
        let dragged = tasks[0].id;
        let target = tasks[3].id;
        assert!(move_task(&mut tasks, dragged, target));

        let map = position_map(&tasks);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(&dragged), Some(&3));

        let mut seen: Vec<u32> = map.values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn dropping_on_itself_is_a_no_op() {
        let mut tasks = sample(3);
        let snapshot = tasks.clone();
        let id = tasks[1].id;
        assert!(!move_task(&mut tasks, id, id));
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn unknown_ids_leave_the_list_untouched() {
        let mut tasks = sample(3);
        let snapshot = tasks.clone();
        let first = tasks[0].id;
        assert!(!move_task(&mut tasks, Uuid::new_v4(), first));
        assert!(!move_task(&mut tasks, first, Uuid::new_v4()));
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn moving_down_lands_before_later_items_shift() {
        let mut tasks = sample(4);
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();

        assert!(move_task(&mut tasks, ids[1], ids[2]));
        let order: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[1], ids[3]]);
    }
}
