//! Static role-to-task-type permission table and the visibility filter.
//!
//! The permission table is process-wide constant configuration: which task
//! types each role is allowed to see and act on. It is never derived from
//! data and never mutated at runtime.

use crate::fields::{Role, TaskType};
use crate::roster::Viewer;
use crate::task::Task;

/// Task types an admin may see: everything.
const ADMIN_TYPES: [TaskType; 6] = [
    TaskType::Feeding,
    TaskType::Cleaning,
    TaskType::HealthCheck,
    TaskType::Vaccination,
    TaskType::Monitoring,
    TaskType::Other,
];

/// Task types a regular employee may see.
const EMPLOYEE_TYPES: [TaskType; 2] = [TaskType::Feeding, TaskType::Cleaning];

/// Task types a veterinarian may see.
const VET_TYPES: [TaskType; 2] = [TaskType::HealthCheck, TaskType::Vaccination];

/// The task types a role is allowed to see.
///
/// An unknown role gets the empty set: a task is never shown to a role the
/// table does not recognise.
pub fn allowed_task_types(role: Role) -> &'static [TaskType] {
    match role {
        Role::Admin => &ADMIN_TYPES,
        Role::Employee => &EMPLOYEE_TYPES,
        Role::Veterinarian => &VET_TYPES,
        Role::Unknown => &[],
    }
}

/// Whether `role` covers tasks of type `task_type`.
pub fn role_covers(role: Role, task_type: TaskType) -> bool {
    allowed_task_types(role).contains(&task_type)
}

/// Filter the task list down to what `viewer` may see.
///
/// In the team view only the role filter applies. In the personal
/// ("my schedule") view a task must additionally be assigned to the viewer —
/// a deliberate double filter: an admin looking at their own schedule still
/// only sees task types their role covers.
pub fn visible_tasks<'a>(tasks: &'a [Task], viewer: &Viewer, personal: bool) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| role_covers(viewer.role, t.task_type))
        .filter(|t| !personal || t.worker_id == viewer.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Shift, Status};
    use chrono::NaiveDate;

    fn task(id: &str, worker_id: &str, task_type: TaskType) -> Task {
        Task {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
            shift: Shift::Morning,
            barn_id: "B1".into(),
            barn_name: "Barn 1".into(),
            worker_id: worker_id.to_string(),
            worker_name: worker_id.to_string(),
            task_type,
            status: Status::Pending,
            notes: None,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_admin_covers_all_types() {
        for tt in [
            TaskType::Feeding,
            TaskType::Cleaning,
            TaskType::HealthCheck,
            TaskType::Vaccination,
            TaskType::Monitoring,
            TaskType::Other,
        ] {
            assert!(role_covers(Role::Admin, tt));
        }
    }

    #[test]
    fn test_vet_never_sees_feeding() {
        let tasks = vec![task("T1", "W1", TaskType::Feeding), task("T2", "W1", TaskType::Vaccination)];
        let viewer = Viewer::new("W1", Role::Veterinarian);
        let visible = visible_tasks(&tasks, &viewer, false);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "T2");
    }

    #[test]
    fn test_unknown_role_sees_nothing() {
        let tasks = vec![task("T1", "W1", TaskType::Feeding)];
        let viewer = Viewer::new("W1", Role::Unknown);
        assert!(visible_tasks(&tasks, &viewer, false).is_empty());
        assert!(allowed_task_types(Role::Unknown).is_empty());
    }

    #[test]
    fn test_personal_view_applies_ownership_and_role() {
        // Matches the "my schedule" scenario: employee W1 sees their own
        // feeding task but not another worker's vaccination task.
        let tasks = vec![task("T1", "W1", TaskType::Feeding), task("T2", "W2", TaskType::Vaccination)];
        let viewer = Viewer::new("W1", Role::Employee);
        let visible = visible_tasks(&tasks, &viewer, true);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "T1");
    }

    #[test]
    fn test_admin_personal_view_still_restricted_by_role() {
        // Admin covers every type, so personal view reduces to ownership.
        let tasks = vec![
            task("T1", "W9", TaskType::Monitoring),
            task("T2", "W9", TaskType::Feeding),
            task("T3", "W5", TaskType::Feeding),
        ];
        let viewer = Viewer::new("W9", Role::Admin);
        let visible = visible_tasks(&tasks, &viewer, true);
        assert_eq!(visible.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["T1", "T2"]);
    }

    #[test]
    fn test_team_view_ignores_ownership() {
        let tasks = vec![task("T1", "W1", TaskType::Cleaning), task("T2", "W2", TaskType::Cleaning)];
        let viewer = Viewer::new("W1", Role::Employee);
        assert_eq!(visible_tasks(&tasks, &viewer, false).len(), 2);
    }
}
