//! Category partitioner.
//!
//! Splits a [`History`] into the skill view (categories in
//! [`SKILL_NAMES`](crate::skills::SKILL_NAMES)) and the activity view
//! (everything else, relabeled as kill counts), and sums activity kill
//! counts per timestamp.
//!
//! The two views are disjoint and together cover every history row. Row
//! order within each view follows history write order.

use std::collections::BTreeMap;

use crate::error::{HiscoresError, Result};
use crate::models::{ActivityRow, ActivityTotal, History, SnapshotRow, Timestamp};
use crate::skills::{is_skill, skill_order, OVERALL};

/// The three derived views of a history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub skills: Vec<SnapshotRow>,
    pub activities: Vec<ActivityRow>,
    /// One entry per distinct activity timestamp, ascending.
    pub activity_totals: Vec<ActivityTotal>,
}

/// Partition `history` into skill and activity views.
///
/// Fails with [`HiscoresError::EmptyHistory`] when there are no rows; the
/// error is informational and callers show an empty result.
pub fn partition(history: &History) -> Result<Partition> {
    if history.is_empty() {
        return Err(HiscoresError::EmptyHistory);
    }

    let mut skills = Vec::new();
    let mut activities = Vec::new();
    let mut totals: BTreeMap<Timestamp, u64> = BTreeMap::new();

    for row in history.rows() {
        if is_skill(&row.category) {
            skills.push(row.clone());
        } else {
            let total = totals.entry(row.timestamp).or_default();
            *total = total.saturating_add(row.experience);
            activities.push(ActivityRow {
                timestamp: row.timestamp,
                activity: row.category.clone(),
                rank: row.rank,
                kill_count: row.experience,
            });
        }
    }

    let activity_totals = totals
        .into_iter()
        .map(|(timestamp, kill_count)| ActivityTotal {
            timestamp,
            kill_count,
        })
        .collect();

    tracing::debug!(
        skills = skills.len(),
        activities = activities.len(),
        "partitioned history"
    );

    Ok(Partition {
        skills,
        activities,
        activity_totals,
    })
}

impl Partition {
    /// Skill names present in the view, in skill panel order.
    pub fn skill_names(&self) -> Vec<&'static str> {
        let mut present: Vec<usize> = self
            .skills
            .iter()
            .filter_map(|r| skill_order(&r.category))
            .collect();
        present.sort_unstable();
        present.dedup();
        present
            .into_iter()
            .map(|i| crate::skills::SKILL_NAMES[i])
            .collect()
    }

    /// Activity names in order of first appearance.
    pub fn activity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.activities {
            if !names.contains(&row.activity.as_str()) {
                names.push(&row.activity);
            }
        }
        names
    }

    /// Time series of one skill, in history order.
    pub fn skill_series<'a>(&'a self, skill: &'a str) -> impl Iterator<Item = &'a SnapshotRow> {
        self.skills.iter().filter(move |r| r.category == skill)
    }

    /// Time series of one activity, in history order.
    pub fn activity_series<'a>(
        &'a self,
        activity: &'a str,
    ) -> impl Iterator<Item = &'a ActivityRow> {
        self.activities.iter().filter(move |r| r.activity == activity)
    }

    pub fn overall(&self) -> impl Iterator<Item = &SnapshotRow> {
        self.skill_series(OVERALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Snapshot;
    use chrono::{TimeZone, Utc};

    fn ts(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 7, day, 18, 0, 0).unwrap()
    }

    fn history() -> History {
        let mut h = History::new();
        let mut first = Snapshot::new(ts(1));
        first.push("Overall", Some(1), 2277, 500_000_000);
        first.push("Zulrah", Some(500), 0, 300);
        first.push("Attack", Some(9), 99, 13_034_431);
        first.push("Vorkath", None, 0, 20);
        h.append(&first);

        let mut second = Snapshot::new(ts(2));
        second.push("Overall", Some(1), 2277, 500_100_000);
        second.push("Zulrah", Some(480), 0, 310);
        second.push("Attack", Some(9), 99, 13_100_000);
        second.push("Vorkath", None, 0, 25);
        h.append(&second);
        h
    }

    #[test]
    fn single_snapshot_scenario() {
        let mut h = History::new();
        let mut snap = Snapshot::new(ts(3));
        snap.push("Overall", Some(1), 2277, 500_000_000);
        snap.push("Zulrah", Some(500), 0, 300);
        h.append(&snap);

        let p = partition(&h).unwrap();
        assert_eq!(p.skills.len(), 1);
        assert_eq!(p.skills[0].category, "Overall");
        assert_eq!(p.activities.len(), 1);
        assert_eq!(p.activities[0].activity, "Zulrah");
        assert_eq!(p.activities[0].kill_count, 300);
        assert_eq!(
            p.activity_totals,
            vec![ActivityTotal {
                timestamp: ts(3),
                kill_count: 300
            }]
        );
    }

    #[test]
    fn views_cover_history_without_overlap() {
        let h = history();
        let p = partition(&h).unwrap();
        assert_eq!(p.skills.len() + p.activities.len(), h.len());

        for row in h.rows() {
            let in_skills = p.skills.contains(row);
            let in_activities = p
                .activities
                .iter()
                .any(|a| a.timestamp == row.timestamp && a.activity == row.category);
            assert!(in_skills ^ in_activities, "{} misplaced", row.category);
        }
    }

    #[test]
    fn totals_sum_per_timestamp() {
        let p = partition(&history()).unwrap();
        assert_eq!(p.activity_totals.len(), 2);
        for total in &p.activity_totals {
            let expected: u64 = p
                .activities
                .iter()
                .filter(|a| a.timestamp == total.timestamp)
                .map(|a| a.kill_count)
                .sum();
            assert_eq!(total.kill_count, expected);
        }
        assert_eq!(p.activity_totals[0].kill_count, 320);
        assert_eq!(p.activity_totals[1].kill_count, 335);
    }

    #[test]
    fn totals_are_sorted_even_if_history_is_not() {
        let mut h = History::new();
        let mut late = Snapshot::new(ts(9));
        late.push("Zulrah", None, 0, 5);
        let mut early = Snapshot::new(ts(2));
        early.push("Zulrah", None, 0, 1);
        h.append(&late);
        h.append(&early);

        let p = partition(&h).unwrap();
        let stamps: Vec<Timestamp> = p.activity_totals.iter().map(|t| t.timestamp).collect();
        assert_eq!(stamps, vec![ts(2), ts(9)]);
    }

    #[test]
    fn skill_only_history_has_no_totals() {
        let mut h = History::new();
        let mut snap = Snapshot::new(ts(1));
        snap.push("Overall", None, 32, 1_154);
        h.append(&snap);
        let p = partition(&h).unwrap();
        assert!(p.activities.is_empty());
        assert!(p.activity_totals.is_empty());
    }

    #[test]
    fn empty_history_is_reported() {
        assert!(matches!(
            partition(&History::new()),
            Err(HiscoresError::EmptyHistory)
        ));
    }

    #[test]
    fn partition_is_deterministic() {
        let h = history();
        assert_eq!(partition(&h).unwrap(), partition(&h).unwrap());
    }

    #[test]
    fn names_follow_presentation_order() {
        let p = partition(&history()).unwrap();
        assert_eq!(p.skill_names(), vec!["Overall", "Attack"]);
        assert_eq!(p.activity_names(), vec!["Zulrah", "Vorkath"]);
        assert_eq!(p.overall().count(), 2);
        assert_eq!(p.activity_series("Vorkath").last().unwrap().kill_count, 25);
    }

    #[test]
    fn huge_kill_counts_saturate_the_total() {
        let mut snap = Snapshot::new(ts(3));
        snap.push("Zulrah", None, 0, u64::MAX / 2 + 1);
        snap.push("Vorkath", None, 0, u64::MAX / 2 + 1);
        let mut h = History::new();
        h.append(&snap);

        let p = partition(&h).unwrap();
        assert_eq!(p.activities.len(), 2);
        assert_eq!(p.activity_totals[0].kill_count, u64::MAX);
    }
}
