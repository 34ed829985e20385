//! Domain model: people, tasks and their role assignments
//!
//! Wire shapes use camelCase field names; the scalar `conductorId` /
//! `assistantId` / `status` fields on a task are a projection of its
//! assignment list and are recomputed by the engine whenever the list
//! changes.

use serde::{Deserialize, Serialize};

/// Person gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "M" => Some(Gender::M),
            "F" => Some(Gender::F),
            _ => None,
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::M
    }
}

/// Boolean-like enum used for the person status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        matches!(self, YesNo::Yes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(YesNo::Yes),
            "No" => Some(YesNo::No),
            _ => None,
        }
    }
}

impl Default for YesNo {
    fn default() -> Self {
        YesNo::No
    }
}

fn participation_default() -> YesNo {
    YesNo::Yes
}

fn group_number_default() -> i64 {
    1
}

/// The two fixed roles a task's assignments may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Conductor,
    Assistant,
}

/// Per-assignment lifecycle status.
///
/// Ordered `assigned < sent < confirmed`; `done` and `failed` are both
/// terminal, mutually exclusive outcomes. The data layer does not enforce
/// forward-only transitions (administrative override is allowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Assigned,
    Sent,
    Confirmed,
    Done,
    Failed,
}

impl AssignmentStatus {
    /// Terminal states admit no further transitions in the UI
    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Done | AssignmentStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Sent => "sent",
            AssignmentStatus::Confirmed => "confirmed",
            AssignmentStatus::Done => "done",
            AssignmentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "assigned" => Some(AssignmentStatus::Assigned),
            "sent" => Some(AssignmentStatus::Sent),
            "confirmed" => Some(AssignmentStatus::Confirmed),
            "done" => Some(AssignmentStatus::Done),
            "failed" => Some(AssignmentStatus::Failed),
            _ => None,
        }
    }
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        AssignmentStatus::Assigned
    }
}

/// A roster member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "group_number_default")]
    pub group_number: i64,
    #[serde(default)]
    pub study_status: YesNo,
    #[serde(default)]
    pub impromptu_status: YesNo,
    #[serde(default)]
    pub limitations_status: YesNo,
    #[serde(default = "participation_default")]
    pub participation_status: YesNo,
    #[serde(default)]
    pub notes: String,
}

/// A (person, role, status) triple attached to a task.
///
/// `status` is optional on the wire; the normalizer resolves missing
/// statuses to `assigned` when producing the canonical list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub person_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
}

impl Assignment {
    pub fn new(person_id: impl Into<String>, role: Role, status: AssignmentStatus) -> Self {
        Assignment {
            person_id: person_id.into(),
            role,
            status: Some(status),
        }
    }
}

/// A dated task carrying one or two role assignments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub task_date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub is_impromptu: YesNo,
    #[serde(default)]
    pub task_number: i64,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub conductor_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// Loosely-shaped assignment input: external collaborators may send a
/// single assignment object or a list. This is the only place the
/// permissive shape is accepted; everything downstream consumes `Vec`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAssignments {
    Many(Vec<Assignment>),
    One(Assignment),
}

impl RawAssignments {
    /// Coerce to a list; absent input (a `None` on the caller side)
    /// coerces to an empty list.
    pub fn into_vec(raw: Option<Self>) -> Vec<Assignment> {
        match raw {
            None => Vec::new(),
            Some(RawAssignments::One(a)) => vec![a],
            Some(RawAssignments::Many(list)) => list,
        }
    }
}

/// Person create/update payload: everything but the name is optional and
/// falls back to a sensible default, matching the permissive write API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "group_number_default")]
    pub group_number: i64,
    #[serde(default)]
    pub study_status: YesNo,
    #[serde(default)]
    pub impromptu_status: YesNo,
    #[serde(default)]
    pub limitations_status: YesNo,
    #[serde(default = "participation_default")]
    pub participation_status: YesNo,
    #[serde(default)]
    pub notes: String,
}

/// Task create/update payload. The assignment list is the loosely-shaped
/// boundary form; the legacy scalar fields are honored when it is absent.
/// `viewpointPersonId` drives pair-normalization and is never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub task_date: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub is_impromptu: YesNo,
    #[serde(default)]
    pub task_number: i64,
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub conductor_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub assignments: Option<RawAssignments>,
    #[serde(default)]
    pub viewpoint_person_id: Option<String>,
}

/// Collapse internal whitespace and trim. Names compare case-insensitively
/// after this normalization.
pub fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering_follows_lifecycle() {
        assert!(AssignmentStatus::Assigned < AssignmentStatus::Sent);
        assert!(AssignmentStatus::Sent < AssignmentStatus::Confirmed);
        assert!(AssignmentStatus::Confirmed < AssignmentStatus::Done);
        assert!(AssignmentStatus::Done.is_terminal());
        assert!(AssignmentStatus::Failed.is_terminal());
        assert!(!AssignmentStatus::Confirmed.is_terminal());
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            AssignmentStatus::Assigned,
            AssignmentStatus::Sent,
            AssignmentStatus::Confirmed,
            AssignmentStatus::Done,
            AssignmentStatus::Failed,
        ] {
            assert_eq!(AssignmentStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(AssignmentStatus::parse("bogus"), None);
    }

    #[test]
    fn raw_assignments_accepts_single_object() {
        let raw: RawAssignments =
            serde_json::from_str(r#"{"personId":"p_001","role":"Conductor"}"#).unwrap();
        let list = RawAssignments::into_vec(Some(raw));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].person_id, "p_001");
        assert_eq!(list[0].status, None);
    }

    #[test]
    fn raw_assignments_accepts_list() {
        let raw: RawAssignments = serde_json::from_str(
            r#"[{"personId":"p_001","role":"Conductor","status":"sent"},
                {"personId":"p_002","role":"Assistant"}]"#,
        )
        .unwrap();
        let list = RawAssignments::into_vec(Some(raw));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].status, Some(AssignmentStatus::Sent));
    }

    #[test]
    fn absent_raw_assignments_coerce_to_empty() {
        assert!(RawAssignments::into_vec(None).is_empty());
    }

    #[test]
    fn normalize_name_collapses_whitespace() {
        assert_eq!(normalize_name("  Anna   Maria  Lee "), "Anna Maria Lee");
        assert_eq!(normalize_name("\t\n"), "");
    }
}
