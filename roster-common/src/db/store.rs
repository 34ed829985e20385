//! Storage operations for people and tasks
//!
//! Every multi-row write runs inside a single transaction: on any failure
//! the whole batch rolls back and the caller sees one error. Tasks are
//! stored with their projection columns; the assignment list is
//! reconstructed on load (conductor first).

use sqlx::{FromRow, SqlitePool};

use crate::dates::normalize_date_only;
use crate::engine::normalize::{normalize_assignments, LegacyFields, Projection};
use crate::engine::prune_orphans;
use crate::model::{
    normalize_name, Assignment, AssignmentStatus, Gender, Person, PersonInput, Role, Task,
    TaskInput, YesNo,
};
use crate::{Error, Result};

#[derive(FromRow)]
struct PersonRow {
    id: String,
    name: String,
    gender: String,
    group_number: i64,
    study_status: String,
    impromptu_status: String,
    limitations_status: String,
    participation_status: String,
    notes: String,
}

impl PersonRow {
    fn into_person(self) -> Person {
        Person {
            id: self.id,
            name: self.name,
            gender: Gender::parse(&self.gender).unwrap_or_default(),
            group_number: self.group_number,
            study_status: YesNo::parse(&self.study_status).unwrap_or_default(),
            impromptu_status: YesNo::parse(&self.impromptu_status).unwrap_or_default(),
            limitations_status: YesNo::parse(&self.limitations_status).unwrap_or_default(),
            participation_status: YesNo::parse(&self.participation_status).unwrap_or(YesNo::Yes),
            notes: self.notes,
        }
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: String,
    task_date: String,
    title: String,
    situation: Option<String>,
    is_impromptu: String,
    task_number: i64,
    status: String,
    conductor_id: Option<String>,
    assistant_id: Option<String>,
}

impl TaskRow {
    fn into_task(self) -> Task {
        let status = AssignmentStatus::parse(&self.status).unwrap_or_default();
        let mut assignments = Vec::new();
        if let Some(cid) = &self.conductor_id {
            assignments.push(Assignment::new(cid.clone(), Role::Conductor, status));
        }
        if let Some(aid) = &self.assistant_id {
            assignments.push(Assignment::new(aid.clone(), Role::Assistant, status));
        }
        Task {
            id: self.id,
            task_date: self.task_date,
            title: self.title,
            situation: self.situation,
            is_impromptu: YesNo::parse(&self.is_impromptu).unwrap_or_default(),
            task_number: self.task_number,
            status,
            conductor_id: self.conductor_id,
            assistant_id: self.assistant_id,
            assignments,
        }
    }
}

/// Load the full people and task sets. Tasks come back ordered by
/// `(task_date, task_number, id)`, the order every consumer relies on.
pub async fn load_snapshot(pool: &SqlitePool) -> Result<(Vec<Person>, Vec<Task>)> {
    let people: Vec<PersonRow> = sqlx::query_as("SELECT * FROM people ORDER BY id")
        .fetch_all(pool)
        .await?;
    let tasks: Vec<TaskRow> =
        sqlx::query_as("SELECT * FROM tasks ORDER BY task_date, task_number, id")
            .fetch_all(pool)
            .await?;

    Ok((
        people.into_iter().map(PersonRow::into_person).collect(),
        tasks.into_iter().map(TaskRow::into_task).collect(),
    ))
}

/// Replace both sets wholesale, atomically.
///
/// The incoming tasks are pruned against the incoming people before any
/// write, and the SQL pass additionally deletes tasks referencing people
/// missing from the payload. Both layers enforce the cascade independently
/// so the outcome does not depend on which caller is a stale mirror.
pub async fn replace_snapshot(pool: &SqlitePool, people: &[Person], tasks: &[Task]) -> Result<()> {
    let tasks = prune_orphans(people, tasks.to_vec());

    let mut tx = pool.begin().await?;

    let people_ids: Vec<&str> = people.iter().map(|p| p.id.as_str()).collect();
    let task_ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();

    if task_ids.is_empty() {
        sqlx::query("DELETE FROM tasks").execute(&mut *tx).await?;
    } else {
        let sql = format!(
            "DELETE FROM tasks WHERE id NOT IN ({})",
            placeholders(task_ids.len())
        );
        let mut q = sqlx::query(&sql);
        for id in &task_ids {
            q = q.bind(*id);
        }
        q.execute(&mut *tx).await?;
    }

    if people_ids.is_empty() {
        sqlx::query("DELETE FROM tasks").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM people").execute(&mut *tx).await?;
    } else {
        let ph = placeholders(people_ids.len());
        let sql = format!(
            "DELETE FROM tasks WHERE conductor_id NOT IN ({ph}) \
             OR (assistant_id IS NOT NULL AND assistant_id NOT IN ({ph}))"
        );
        let mut q = sqlx::query(&sql);
        for id in people_ids.iter().chain(people_ids.iter()) {
            q = q.bind(*id);
        }
        q.execute(&mut *tx).await?;

        let sql = format!("DELETE FROM people WHERE id NOT IN ({ph})");
        let mut q = sqlx::query(&sql);
        for id in &people_ids {
            q = q.bind(*id);
        }
        q.execute(&mut *tx).await?;
    }

    for p in people {
        sqlx::query(
            r#"
            INSERT INTO people (
                id, name, gender, group_number, study_status, impromptu_status,
                limitations_status, participation_status, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                gender = excluded.gender,
                group_number = excluded.group_number,
                study_status = excluded.study_status,
                impromptu_status = excluded.impromptu_status,
                limitations_status = excluded.limitations_status,
                participation_status = excluded.participation_status,
                notes = excluded.notes
            "#,
        )
        .bind(&p.id)
        .bind(&p.name)
        .bind(p.gender.as_str())
        .bind(p.group_number)
        .bind(p.study_status.as_str())
        .bind(p.impromptu_status.as_str())
        .bind(p.limitations_status.as_str())
        .bind(p.participation_status.as_str())
        .bind(&p.notes)
        .execute(&mut *tx)
        .await?;
    }

    for t in &tasks {
        let task_date = normalize_date_only(&t.task_date)
            .ok_or_else(|| Error::InvalidData(format!("task {} has no valid date", t.id)))?;
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, task_date, title, situation, is_impromptu, task_number,
                status, conductor_id, assistant_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                task_date = excluded.task_date,
                title = excluded.title,
                situation = excluded.situation,
                is_impromptu = excluded.is_impromptu,
                task_number = excluded.task_number,
                status = excluded.status,
                conductor_id = excluded.conductor_id,
                assistant_id = excluded.assistant_id
            "#,
        )
        .bind(&t.id)
        .bind(&task_date)
        .bind(&t.title)
        .bind(&t.situation)
        .bind(t.is_impromptu.as_str())
        .bind(t.task_number)
        .bind(t.status.as_str())
        .bind(&t.conductor_id)
        .bind(&t.assistant_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Create a person with a server-assigned `p_NNN` id.
///
/// The name is whitespace-normalized and must not collide
/// case-insensitively with an existing person.
pub async fn insert_person(pool: &SqlitePool, input: &PersonInput) -> Result<Person> {
    let name = normalize_name(&input.name);
    if name.is_empty() {
        return Err(Error::InvalidData("missing name".to_string()));
    }

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM people WHERE lower(name) = lower(?) LIMIT 1")
            .bind(&name)
            .fetch_optional(pool)
            .await?;
    if exists.is_some() {
        return Err(Error::DuplicateName(name));
    }

    let max_id: Option<i64> =
        sqlx::query_scalar("SELECT MAX(CAST(substr(id, 3) AS INTEGER)) FROM people")
            .fetch_one(pool)
            .await?;
    let id = format!("p_{:03}", max_id.unwrap_or(0) + 1);

    let person = Person {
        id,
        name,
        gender: input.gender,
        group_number: input.group_number,
        study_status: input.study_status,
        impromptu_status: input.impromptu_status,
        limitations_status: input.limitations_status,
        participation_status: input.participation_status,
        notes: input.notes.clone(),
    };

    sqlx::query(
        r#"
        INSERT INTO people (
            id, name, gender, group_number, study_status, impromptu_status,
            limitations_status, participation_status, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&person.id)
    .bind(&person.name)
    .bind(person.gender.as_str())
    .bind(person.group_number)
    .bind(person.study_status.as_str())
    .bind(person.impromptu_status.as_str())
    .bind(person.limitations_status.as_str())
    .bind(person.participation_status.as_str())
    .bind(&person.notes)
    .execute(pool)
    .await?;

    Ok(person)
}

/// Update a person's profile. A blank name falls back to the stored name;
/// a name that still cannot be resolved is `InvalidData`.
pub async fn update_person(pool: &SqlitePool, id: &str, input: &PersonInput) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidData("missing id".to_string()));
    }

    let mut name = normalize_name(&input.name);
    if name.is_empty() {
        let current: Option<String> = sqlx::query_scalar("SELECT name FROM people WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        name = normalize_name(current.as_deref().unwrap_or(""));
    }
    if name.is_empty() {
        return Err(Error::InvalidData("missing name".to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE people SET
            name = ?,
            gender = ?,
            group_number = ?,
            study_status = ?,
            impromptu_status = ?,
            limitations_status = ?,
            participation_status = ?,
            notes = ?
        WHERE id = ?
        "#,
    )
    .bind(&name)
    .bind(input.gender.as_str())
    .bind(input.group_number)
    .bind(input.study_status.as_str())
    .bind(input.impromptu_status.as_str())
    .bind(input.limitations_status.as_str())
    .bind(input.participation_status.as_str())
    .bind(&input.notes)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("person {id}")));
    }
    Ok(())
}

/// Delete a person and cascade to every task referencing them, in one
/// transaction: the person's assignment is removed, and tasks left with
/// no assignee at all are deleted. This is the server-side half of the
/// cascade contract; the in-memory pruner enforces the same rule
/// independently, so the outcome holds even when one caller is stale.
pub async fn delete_person(pool: &SqlitePool, id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    // Tasks where this person was the only assignee
    sqlx::query(
        "DELETE FROM tasks WHERE (conductor_id = ?1 AND (assistant_id IS NULL OR assistant_id = ?1)) \
         OR (assistant_id = ?1 AND conductor_id IS NULL)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // Remaining references: drop just this person's side of the pair
    sqlx::query("UPDATE tasks SET assistant_id = NULL WHERE assistant_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE tasks SET conductor_id = NULL WHERE conductor_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM people WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("person {id}")));
    }

    tx.commit().await?;
    Ok(())
}

/// Create a task. Requires an id, a normalizable date, and at least one
/// assignee after normalization.
pub async fn insert_task(pool: &SqlitePool, input: &TaskInput) -> Result<()> {
    if input.id.is_empty() {
        return Err(Error::InvalidData("missing id".to_string()));
    }
    let task_date = input
        .task_date
        .as_deref()
        .and_then(normalize_date_only)
        .ok_or_else(|| Error::InvalidData("missing taskDate".to_string()))?;

    let projection = project_input(input);
    if projection.conductor_id.is_none() && projection.assistant_id.is_none() {
        return Err(Error::InvalidData("missing assignee".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO tasks (
            id, task_date, title, situation, is_impromptu, task_number,
            status, conductor_id, assistant_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.id)
    .bind(&task_date)
    .bind(&input.title)
    .bind(&input.situation)
    .bind(input.is_impromptu.as_str())
    .bind(input.task_number)
    .bind(projection.status.as_str())
    .bind(&projection.conductor_id)
    .bind(&projection.assistant_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update a task. A missing date falls back to the stored date.
pub async fn update_task(pool: &SqlitePool, id: &str, input: &TaskInput) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidData("missing id".to_string()));
    }

    let mut task_date = input.task_date.as_deref().and_then(normalize_date_only);
    if task_date.is_none() {
        task_date = sqlx::query_scalar("SELECT task_date FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    }
    let task_date =
        task_date.ok_or_else(|| Error::InvalidData("missing taskDate".to_string()))?;

    let projection = project_input(input);
    if projection.conductor_id.is_none() && projection.assistant_id.is_none() {
        return Err(Error::InvalidData("missing assignee".to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE tasks SET
            task_date = ?,
            title = ?,
            situation = ?,
            is_impromptu = ?,
            task_number = ?,
            status = ?,
            conductor_id = ?,
            assistant_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&task_date)
    .bind(&input.title)
    .bind(&input.situation)
    .bind(input.is_impromptu.as_str())
    .bind(input.task_number)
    .bind(projection.status.as_str())
    .bind(&projection.conductor_id)
    .bind(&projection.assistant_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("task {id}")));
    }
    Ok(())
}

pub async fn delete_task(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("task {id}")));
    }
    Ok(())
}

/// Fetch one task with its reconstructed assignment list
pub async fn get_task(pool: &SqlitePool, id: &str) -> Result<Option<Task>> {
    let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(TaskRow::into_task))
}

/// Persist a task's projection columns after an in-memory engine edit
pub async fn save_task_projection(pool: &SqlitePool, task: &Task) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tasks SET status = ?, conductor_id = ?, assistant_id = ? WHERE id = ?",
    )
    .bind(task.status.as_str())
    .bind(&task.conductor_id)
    .bind(&task.assistant_id)
    .bind(&task.id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("task {}", task.id)));
    }
    Ok(())
}

/// Task-level status write: the stored projection is the status of every
/// assignment, so one column update covers the whole task.
pub async fn set_task_status(
    pool: &SqlitePool,
    task_id: &str,
    status: AssignmentStatus,
) -> Result<()> {
    let result = sqlx::query("UPDATE tasks SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(task_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("task {task_id}")));
    }
    Ok(())
}

fn project_input(input: &TaskInput) -> Projection {
    normalize_assignments(
        input.assignments.clone(),
        input.viewpoint_person_id.as_deref(),
        LegacyFields {
            conductor_id: input.conductor_id.as_deref(),
            assistant_id: input.assistant_id.as_deref(),
            status: input.status,
        },
    )
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
