//! Partner Ranking Engine
//!
//! Given a requesting person and the full task history, produce an ordered
//! list of eligible partner candidates, best-first.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::parse_date;
use crate::model::{Person, Role, Task, YesNo};

/// Candidate-list mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Same-gender candidates, partitioned into compatibility tiers
    Matching,
    /// Every eligible candidate, alphabetically, no tiering
    All,
}

/// Rank partner candidates for `requester`.
///
/// Hard exclusions in both modes: the requester themself, anyone with
/// `limitations_status == Yes`, anyone with `participation_status == No`.
///
/// `Matching` mode further restricts to the requester's gender and orders
/// candidates into three tiers:
/// 1. never assigned to any task, alphabetical;
/// 2. experienced but never paired with the requester, last seen as
///    conductor, alphabetical;
/// 3. previously paired with the requester and last seen as conductor,
///    longest-since-paired first, ties alphabetical.
///
/// Candidates matching none of the tiers (last seen only as assistant) are
/// omitted from the matching view entirely; the recommendation favors
/// people with experience leading.
///
/// History only counts tasks whose date parses. An optional free-text
/// `query` filters by case-insensitive substring on name without altering
/// relative order.
pub fn rank_partners(
    requester: &Person,
    roster: &[Person],
    tasks: &[Task],
    mode: RankMode,
    query: Option<&str>,
) -> Vec<Person> {
    let eligible: Vec<&Person> = roster
        .iter()
        .filter(|p| {
            p.id != requester.id
                && !p.limitations_status.is_yes()
                && p.participation_status.is_yes()
        })
        .collect();

    let ordered: Vec<&Person> = match mode {
        RankMode::All => {
            let mut all = eligible;
            sort_by_name(&mut all);
            all
        }
        RankMode::Matching => rank_matching(requester, eligible, tasks),
    };

    let ordered = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let q = q.to_lowercase();
            ordered
                .into_iter()
                .filter(|p| p.name.to_lowercase().contains(&q))
                .collect()
        }
        None => ordered,
    };

    ordered.into_iter().cloned().collect()
}

struct History {
    last_any: HashMap<String, NaiveDate>,
    last_role: HashMap<String, Role>,
    last_together: HashMap<String, NaiveDate>,
}

/// Walk the task history once, recording per person the latest assignment
/// date, the role held on that date, and the latest date shared with the
/// requester. On equal dates the first task in list order wins (tasks are
/// kept sorted by date, number, id upstream).
fn collect_history(requester_id: &str, tasks: &[Task]) -> History {
    let mut history = History {
        last_any: HashMap::new(),
        last_role: HashMap::new(),
        last_together: HashMap::new(),
    };

    for task in tasks {
        let Some(date) = parse_date(&task.task_date) else {
            continue;
        };

        for a in &task.assignments {
            let newer = history
                .last_any
                .get(&a.person_id)
                .map_or(true, |prev| date > *prev);
            if newer {
                history.last_any.insert(a.person_id.clone(), date);
                history.last_role.insert(a.person_id.clone(), a.role);
            }
        }

        let has_requester = task.assignments.iter().any(|a| a.person_id == requester_id);
        if !has_requester {
            continue;
        }
        for a in &task.assignments {
            if a.person_id == requester_id {
                continue;
            }
            let newer = history
                .last_together
                .get(&a.person_id)
                .map_or(true, |prev| date > *prev);
            if newer {
                history.last_together.insert(a.person_id.clone(), date);
            }
        }
    }

    history
}

fn rank_matching<'a>(
    requester: &Person,
    eligible: Vec<&'a Person>,
    tasks: &[Task],
) -> Vec<&'a Person> {
    let candidates: Vec<&Person> = eligible
        .into_iter()
        .filter(|p| p.gender == requester.gender)
        .collect();

    let history = collect_history(&requester.id, tasks);

    let mut tier1: Vec<&Person> = Vec::new();
    let mut tier2: Vec<&Person> = Vec::new();
    let mut tier3: Vec<&Person> = Vec::new();

    for p in candidates {
        let never_together = !history.last_together.contains_key(&p.id);
        let has_any = history.last_any.contains_key(&p.id);
        let led_last = history.last_role.get(&p.id) == Some(&Role::Conductor);

        if never_together && !has_any {
            tier1.push(p);
        } else if never_together && led_last {
            tier2.push(p);
        } else if !never_together && led_last {
            tier3.push(p);
        }
        // Last seen only as assistant: not offered in the matching view
    }

    sort_by_name(&mut tier1);
    sort_by_name(&mut tier2);
    tier3.sort_by(|a, b| {
        let ta = history.last_together.get(&a.id);
        let tb = history.last_together.get(&b.id);
        ta.cmp(&tb).then_with(|| name_key(a).cmp(&name_key(b)))
    });

    tier1.into_iter().chain(tier2).chain(tier3).collect()
}

fn name_key(p: &Person) -> String {
    p.name.to_lowercase()
}

fn sort_by_name(people: &mut [&Person]) {
    people.sort_by(|a, b| name_key(a).cmp(&name_key(b)));
}
