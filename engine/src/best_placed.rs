use crate::profile::Profile;
use crate::standings::{GroupRanking, TeamRecord};
use crate::{EngineResult, TeamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestPlacedTeam {
    pub team_id: TeamId,
    pub group: String,
    pub record: TeamRecord,
    /// 1-based rank among the candidates, shared on ties.
    pub rank: u8,
}

/// The best `count` teams holding `position` across `rankings`.
///
/// Empty until every group has finished. A group whose `position` is shared by
/// tied teams contributes no candidate.
pub fn best_placed_teams(
    profile: &Profile,
    code: &str,
    rankings: &[GroupRanking],
    position: u8,
    count: usize,
) -> EngineResult<Vec<BestPlacedTeam>> {
    let criteria = profile.best_placed_criteria(code)?;

    if rankings.is_empty() || !rankings.iter().all(GroupRanking::is_finished) {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<BestPlacedTeam> = rankings
        .iter()
        .filter_map(|ranking| {
            let standing = ranking.team_at_position(position)?;
            Some(BestPlacedTeam {
                team_id: standing.team_id,
                group: ranking.group.clone(),
                record: standing.record,
                rank: 1,
            })
        })
        .collect();

    candidates.sort_by(|a, b| criteria.compare(&a.record, &b.record));
    for i in 1..candidates.len() {
        candidates[i].rank = if criteria.compare(&candidates[i - 1].record, &candidates[i].record).is_eq() {
            candidates[i - 1].rank
        } else {
            (i + 1) as u8
        };
    }

    candidates.truncate(count);
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use crate::standings::rank_tournament_group;
    use crate::testing::{complete_group_stage, set_result, three_group_tournament};
    use crate::{Goals, Tournament};

    fn rankings(tournament: &Tournament) -> Vec<GroupRanking> {
        let profile = Profile::for_code(&tournament.code).expect("fixture profile");
        tournament
            .groups
            .iter()
            .map(|g| rank_tournament_group(profile, tournament, g))
            .collect()
    }

    fn profile() -> &'static Profile {
        Profile::for_code("EC2016").expect("known competition")
    }

    #[test]
    fn best_third_placed_teams() {
        let mut tournament = three_group_tournament();
        complete_group_stage(&mut tournament);
        let best = best_placed_teams(profile(), "EC2016", &rankings(&tournament), 3, 2)
            .expect("supported");
        let ids: Vec<TeamId> = best.iter().map(|b| b.team_id).collect();
        // France (B, 4 pts, +0) ahead of Croatia (A, 4 pts, -2); Korea (C, 3 pts) misses out
        assert_eq!(ids, vec![6, 3]);
        assert_eq!(best[0].group, "B");
        assert_eq!(best.iter().map(|b| b.rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn nothing_before_every_group_finished() {
        let mut tournament = three_group_tournament();
        complete_group_stage(&mut tournament);
        set_result(&mut tournament, 18, Goals::default());
        let best = best_placed_teams(profile(), "EC2016", &rankings(&tournament), 3, 2)
            .expect("supported");
        assert!(best.is_empty());
    }

    #[test]
    fn tied_position_gives_no_candidate() {
        let mut tournament = three_group_tournament();
        complete_group_stage(&mut tournament);
        // Croatia-Denmark 2-0 leaves Belgium and Croatia level on everything, sharing 2nd place
        set_result(&mut tournament, 4, Goals::full_time(2, 0));
        let all = rankings(&tournament);
        assert!(all[0].has_equal_rankings);
        let best = best_placed_teams(profile(), "EC2016", &all, 3, 3).expect("supported");
        let groups: Vec<&str> = best.iter().map(|b| b.group.as_str()).collect();
        assert_eq!(groups, vec!["B", "C"]);
    }

    #[test]
    fn equal_candidates_share_rank() {
        let record = TeamRecord { points: 4, goals_for: 3, goals_against: 3, ..Default::default() };
        let ranking = |group: &str, team_id| GroupRanking {
            group: group.to_owned(),
            standings: vec![crate::standings::GroupStanding {
                team_id,
                record,
                position: 3,
                completed: true,
            }],
            has_equal_rankings: false,
        };
        let best = best_placed_teams(profile(), "EC2016", &[ranking("A", 1), ranking("B", 2)], 3, 4)
            .expect("supported");
        assert_eq!(best.iter().map(|b| b.rank).collect::<Vec<_>>(), vec![1, 1]);
    }

    #[test]
    fn unsupported_competition_is_rejected() {
        let profile = Profile::for_code("WC2018").expect("known competition");
        assert_eq!(
            best_placed_teams(profile, "WC2018", &[], 3, 2),
            Err(EngineError::UnsupportedRanking("WC2018".into()))
        );
    }
}
