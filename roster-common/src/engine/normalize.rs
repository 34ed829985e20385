//! Assignment Normalizer
//!
//! Converts a loosely-shaped assignment input (absent, single object, or
//! list; possibly role-incomplete; possibly only legacy scalar fields) into
//! the canonical `{assignments, conductor_id, assistant_id, status}`
//! projection used by storage and the UI.

use crate::model::{Assignment, AssignmentStatus, RawAssignments, Role, Task};

/// Legacy scalar fields consulted only when the assignment list is empty.
/// Some integrations write only this projection, never the list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFields<'a> {
    pub conductor_id: Option<&'a str>,
    pub assistant_id: Option<&'a str>,
    pub status: Option<AssignmentStatus>,
}

impl<'a> LegacyFields<'a> {
    /// The legacy fields of an existing task record
    pub fn of_task(task: &'a Task) -> Self {
        LegacyFields {
            conductor_id: task.conductor_id.as_deref(),
            assistant_id: task.assistant_id.as_deref(),
            status: Some(task.status),
        }
    }
}

/// The canonical projection of an assignment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub assignments: Vec<Assignment>,
    pub conductor_id: Option<String>,
    pub assistant_id: Option<String>,
    pub status: AssignmentStatus,
}

/// Normalize an arbitrary assignment input into the canonical projection.
///
/// - The input is coerced to a list (absent input becomes an empty list).
/// - Non-empty list: the first entry with each role wins (duplicate-role
///   input beyond that tie-break is not contractually guaranteed);
///   the projected status is the conductor's, else the assistant's, else
///   `assigned`.
/// - Empty list: the legacy scalar fields are used instead, and the
///   canonical assignment list is synthesized from them.
/// - Pair rule: exactly two assignments with no conductor among them
///   promote the entry that is not `viewpoint_person_id` to `Conductor`
///   (repairs partner-selection flows where only a partner role was
///   chosen). Without a viewpoint the roles are left unchanged.
///
/// Never fails: malformed-but-plausible input degrades to an empty
/// projection with status `assigned`. Callers enforce "at least one
/// assignee" before persisting.
pub fn normalize_assignments(
    raw: Option<RawAssignments>,
    viewpoint_person_id: Option<&str>,
    legacy: LegacyFields<'_>,
) -> Projection {
    let list = RawAssignments::into_vec(raw);
    let list = normalize_pair_roles(list, viewpoint_person_id);

    if list.is_empty() {
        let status = legacy.status.unwrap_or_default();
        let mut assignments = Vec::new();
        if let Some(cid) = legacy.conductor_id {
            assignments.push(Assignment::new(cid, Role::Conductor, status));
        }
        if let Some(aid) = legacy.assistant_id {
            assignments.push(Assignment::new(aid, Role::Assistant, status));
        }
        return Projection {
            assignments,
            conductor_id: legacy.conductor_id.map(str::to_string),
            assistant_id: legacy.assistant_id.map(str::to_string),
            status,
        };
    }

    let conductor = list.iter().find(|a| a.role == Role::Conductor);
    let assistant = list.iter().find(|a| a.role == Role::Assistant);
    let status = conductor
        .and_then(|a| a.status)
        .or_else(|| assistant.and_then(|a| a.status))
        .unwrap_or_default();
    let conductor_id = conductor.map(|a| a.person_id.clone());
    let assistant_id = assistant.map(|a| a.person_id.clone());

    // Canonical assignments always carry a concrete status
    let assignments = list
        .into_iter()
        .map(|a| Assignment {
            status: Some(a.status.unwrap_or_default()),
            ..a
        })
        .collect();

    Projection {
        assignments,
        conductor_id,
        assistant_id,
        status,
    }
}

/// Apply an assignment list to a task, recomputing the projection fields.
/// The task's own scalar fields serve as the legacy fallback.
pub fn apply_to_task(mut task: Task, assignments: Vec<Assignment>, viewpoint: Option<&str>) -> Task {
    let projection = normalize_assignments(
        Some(RawAssignments::Many(assignments)),
        viewpoint,
        LegacyFields::of_task(&task),
    );
    task.assignments = projection.assignments;
    task.conductor_id = projection.conductor_id;
    task.assistant_id = projection.assistant_id;
    task.status = projection.status;
    task
}

/// Promote one of a conductor-less pair to `Conductor`.
///
/// Applies only when exactly two assignments exist and neither holds the
/// conductor role: the entry whose person is not the viewpoint person is
/// promoted (first such entry by list order; the first entry if both match
/// the viewpoint). No viewpoint means no change.
fn normalize_pair_roles(list: Vec<Assignment>, viewpoint: Option<&str>) -> Vec<Assignment> {
    if list.len() != 2 || list.iter().any(|a| a.role == Role::Conductor) {
        return list;
    }
    let Some(me) = viewpoint else {
        return list;
    };
    let mut list = list;
    let idx = list
        .iter()
        .position(|a| a.person_id != me)
        .unwrap_or(0);
    list[idx].role = Role::Conductor;
    list
}
