//! Group standings with recursive tie-breaking.
//!
//! Teams are sorted by the first level of the competition profile. Every run of
//! teams that still compare equal shares a position ("1,1,3" ranking) and is then
//! sorted again by the next level, restricted to its own members when that level
//! is head-to-head. The restriction travels as an explicit argument and is never
//! stored on a standing.

use crate::outcome::is_complete;
use crate::profile::{Profile, Scope};
use crate::{Group, GoalPair, TeamId, Tournament};
use std::collections::HashSet;

pub const POINTS_FOR_WIN: u16 = 3;
pub const POINTS_FOR_DRAW: u16 = 1;

/// A finished group match reduced to what the ranking needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedMatch {
    pub team1: TeamId,
    pub team2: TeamId,
    pub goals: GoalPair,
}

impl PlayedMatch {
    /// Goals (scored, conceded) by `team_id` against its opponent, if it played.
    fn goals_of(&self, team_id: TeamId) -> Option<(TeamId, u8, u8)> {
        if self.team1 == team_id {
            Some((self.team2, self.goals.team1, self.goals.team2))
        } else if self.team2 == team_id {
            Some((self.team1, self.goals.team2, self.goals.team1))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamRecord {
    pub played: u16,
    pub won: u16,
    pub drawn: u16,
    pub lost: u16,
    pub goals_for: u16,
    pub goals_against: u16,
    pub points: u16,
}

impl TeamRecord {
    /// Totals of `team_id`, counting only opponents in `opponents` when given.
    pub fn compute(
        team_id: TeamId,
        results: &[PlayedMatch],
        opponents: Option<&HashSet<TeamId>>,
    ) -> Self {
        let mut record = TeamRecord::default();
        for result in results {
            let Some((opponent, scored, conceded)) = result.goals_of(team_id) else {
                continue;
            };
            if opponents.is_some_and(|set| !set.contains(&opponent)) {
                continue;
            }
            record.played += 1;
            record.goals_for += u16::from(scored);
            record.goals_against += u16::from(conceded);
            match scored.cmp(&conceded) {
                std::cmp::Ordering::Greater => {
                    record.won += 1;
                    record.points += POINTS_FOR_WIN;
                }
                std::cmp::Ordering::Equal => {
                    record.drawn += 1;
                    record.points += POINTS_FOR_DRAW;
                }
                std::cmp::Ordering::Less => record.lost += 1,
            }
        }
        record
    }

    pub fn goal_difference(&self) -> i32 {
        i32::from(self.goals_for) - i32::from(self.goals_against)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStanding {
    pub team_id: TeamId,
    pub record: TeamRecord,
    /// 1-based, shared by teams the profile cannot separate.
    pub position: u8,
    /// The team has played all of its group matches.
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRanking {
    pub group: String,
    pub standings: Vec<GroupStanding>,
    /// Some teams are still level after every comparator level.
    pub has_equal_rankings: bool,
}

impl GroupRanking {
    pub fn is_finished(&self) -> bool {
        !self.standings.is_empty() && self.standings.iter().all(|s| s.completed)
    }

    /// The team holding `position`, unless nobody or several teams hold it.
    pub fn team_at_position(&self, position: u8) -> Option<&GroupStanding> {
        let mut holders = self.standings.iter().filter(|s| s.position == position);
        let first = holders.next()?;
        holders.next().is_none().then_some(first)
    }

    pub fn standing(&self, team_id: TeamId) -> Option<&GroupStanding> {
        self.standings.iter().find(|s| s.team_id == team_id)
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank the members of one group from their finished matches.
pub fn rank_group(
    profile: &Profile,
    group: &str,
    team_ids: &[TeamId],
    results: &[PlayedMatch],
) -> GroupRanking {
    let mut order: Vec<TeamId> = team_ids.to_vec();
    let mut positions: Vec<(TeamId, u8)> = team_ids.iter().map(|&id| (id, 1)).collect();

    let has_equal_rankings = if order.len() > 1 {
        sort_cluster(profile, results, &mut order, &mut positions, 0, 1)
    } else {
        false
    };

    let matches_per_team = team_ids.len().saturating_sub(1);
    let standings = order
        .into_iter()
        .map(|team_id| {
            let record = TeamRecord::compute(team_id, results, None);
            let position = positions
                .iter()
                .find(|(id, _)| *id == team_id)
                .map(|(_, p)| *p)
                .unwrap_or(1);
            GroupStanding {
                team_id,
                record,
                position,
                completed: usize::from(record.played) >= matches_per_team,
            }
        })
        .collect();

    GroupRanking { group: group.to_owned(), standings, has_equal_rankings }
}

/// Rank a group of the tournament from its complete group matches.
pub fn rank_tournament_group(profile: &Profile, tournament: &Tournament, group: &Group) -> GroupRanking {
    let results = played_matches(tournament, group);
    rank_group(profile, &group.name, &group.team_ids, &results)
}

pub fn played_matches(tournament: &Tournament, group: &Group) -> Vec<PlayedMatch> {
    tournament
        .group_matches(group)
        .filter(|m| is_complete(true, &m.goals))
        .filter_map(|m| {
            Some(PlayedMatch { team1: m.team1?, team2: m.team2?, goals: m.goals.normal? })
        })
        .collect()
}

/// Sort `cluster` at `level` and recurse into ties. Returns true while ties remain.
fn sort_cluster(
    profile: &Profile,
    results: &[PlayedMatch],
    cluster: &mut [TeamId],
    positions: &mut [(TeamId, u8)],
    level: usize,
    first_position: u8,
) -> bool {
    let Some(current) = profile.level(level) else {
        return true;
    };

    let members: HashSet<TeamId> = cluster.iter().copied().collect();
    let restriction = (current.scope == Scope::HeadToHead).then_some(&members);
    let mut ranked: Vec<(TeamId, TeamRecord)> = cluster
        .iter()
        .map(|&id| (id, TeamRecord::compute(id, results, restriction)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| current.criteria.compare(a, b));
    for (slot, (id, _)) in cluster.iter_mut().zip(&ranked) {
        *slot = *id;
    }

    let mut has_equal_rankings = false;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && current.criteria.compare(&ranked[start].1, &ranked[end].1).is_eq() {
            end += 1;
        }

        let position = first_position.saturating_add(start as u8);
        for id in &cluster[start..end] {
            if let Some(entry) = positions.iter_mut().find(|(team, _)| team == id) {
                entry.1 = position;
            }
        }

        if end - start > 1 {
            let next_level = if current.repeat_on_partial_tie && end - start < cluster.len() {
                level
            } else {
                level + 1
            };
            has_equal_rankings |=
                sort_cluster(profile, results, &mut cluster[start..end], positions, next_level, position);
        }
        start = end;
    }
    has_equal_rankings
}
