//! Team seeding from qualifier scores.
//!
//! For every map a team's score is the sum of its best `grouping_size`
//! member scores. Each map is standardised into z-scores across all teams
//! (a team with no score on a map counts as 0) and a team's metric is the sum
//! of its z-scores. Teams are placed by descending metric, ties broken by id,
//! with equal metrics sharing a placement.

use std::collections::{BTreeMap, BTreeSet};

use infra::models::TeamRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupScore {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub map_id: i64,
    pub score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEntry {
    pub team_id: Uuid,
    pub metric: f64,
    pub placement: i32,
}

/// Rank every team referenced in `scores`.
pub fn rank_teams(scores: &[MatchupScore], grouping_size: usize) -> Vec<SeedEntry> {
    let grouping_size = grouping_size.max(1);

    // map -> team -> user -> best score
    let mut best: BTreeMap<i64, BTreeMap<Uuid, BTreeMap<Uuid, i64>>> = BTreeMap::new();
    let mut teams = BTreeSet::new();
    for s in scores {
        teams.insert(s.team_id);
        let user_best = best
            .entry(s.map_id)
            .or_default()
            .entry(s.team_id)
            .or_default()
            .entry(s.user_id)
            .or_insert(s.score);
        *user_best = (*user_best).max(s.score);
    }

    let mut metrics: BTreeMap<Uuid, f64> = teams.iter().map(|&t| (t, 0.0)).collect();
    for members_by_team in best.values() {
        let map_scores: Vec<(Uuid, f64)> = teams
            .iter()
            .map(|&team_id| {
                let total = members_by_team
                    .get(&team_id)
                    .map(|members| grouped_total(members.values().copied(), grouping_size))
                    .unwrap_or(0);
                (team_id, total as f64)
            })
            .collect();

        let n = map_scores.len() as f64;
        let mean = map_scores.iter().map(|(_, v)| v).sum::<f64>() / n;
        let variance = map_scores.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
        let sd = variance.sqrt();

        for (team_id, value) in map_scores {
            let z = if sd > 0.0 { (value - mean) / sd } else { 0.0 };
            if let Some(metric) = metrics.get_mut(&team_id) {
                *metric += z;
            }
        }
    }

    let mut ordered: Vec<(Uuid, f64)> = metrics.into_iter().collect();
    ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut entries: Vec<SeedEntry> = Vec::with_capacity(ordered.len());
    for (index, (team_id, metric)) in ordered.into_iter().enumerate() {
        let placement = match entries.last() {
            Some(prev) if prev.metric == metric => prev.placement,
            _ => index as i32 + 1,
        };
        entries.push(SeedEntry {
            team_id,
            metric,
            placement,
        });
    }

    entries
}

/// Store `team`'s placement in `team.seed`. Teams with no scores keep their
/// current seed and `None` is returned.
pub fn compute_seed(
    team: &mut TeamRow,
    scores: &[MatchupScore],
    grouping_size: usize,
) -> Option<i32> {
    let placement = rank_teams(scores, grouping_size)
        .into_iter()
        .find(|entry| entry.team_id == team.id)?
        .placement;
    team.seed = Some(placement);
    Some(placement)
}

fn grouped_total(member_scores: impl Iterator<Item = i64>, grouping_size: usize) -> i64 {
    let mut member_scores: Vec<i64> = member_scores.collect();
    member_scores.sort_unstable_by(|a, b| b.cmp(a));
    member_scores.into_iter().take(grouping_size).sum()
}
