//! Status Synchronizer
//!
//! Applies a status transition to all assignments of one task uniformly,
//! or to a single assignment when editing from a person-centric view.

use crate::engine::normalize;
use crate::model::{AssignmentStatus, Task};
use crate::{Error, Result};

/// Which assignments of the task a status write targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusScope {
    /// Every assignment of the task, plus the projected task status
    Task,
    /// Only the named person's assignment; the projected task status is
    /// recomputed (conductor's status, else assistant's, else `assigned`),
    /// so changing a non-conductor may leave the projection unchanged.
    Assignment { person_id: String },
}

/// Apply a status transition to a task.
///
/// Any state may be set directly (administrative override); forward-only
/// transitions are a UI concern, not enforced here. Returns
/// `Error::NotFound` when an assignment-scope write names a person without
/// an assignment on this task.
pub fn apply_status(task: Task, scope: StatusScope, new_status: AssignmentStatus) -> Result<Task> {
    match scope {
        StatusScope::Task => {
            let mut task = task;
            for a in &mut task.assignments {
                a.status = Some(new_status);
            }
            task.status = new_status;
            Ok(task)
        }
        StatusScope::Assignment { person_id } => {
            if !task.assignments.iter().any(|a| a.person_id == person_id) {
                return Err(Error::NotFound(format!(
                    "no assignment for person {person_id} on task {}",
                    task.id
                )));
            }
            let assignments = task
                .assignments
                .iter()
                .cloned()
                .map(|mut a| {
                    if a.person_id == person_id {
                        a.status = Some(new_status);
                    }
                    a
                })
                .collect();
            Ok(normalize::apply_to_task(task, assignments, None))
        }
    }
}
