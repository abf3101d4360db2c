use crate::best_placed::best_placed_teams;
use crate::outcome::{ResultViolation, validate_result};
use crate::profile::Profile;
use crate::rule::{ParticipantReference, ParticipantRule, PositionMap};
use crate::standings::{GroupRanking, rank_tournament_group};
use crate::timeline::end_time;
use crate::{EngineError, EngineResult, Goals, MatchId, MatchNumber, TeamId, Tournament};
use chrono::NaiveDateTime;
use log::debug;
use std::collections::HashSet;

/// Participants of a match after a pass filled at least one of its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantUpdate {
    pub match_id: MatchId,
    pub match_number: MatchNumber,
    pub team1: Option<TeamId>,
    pub team2: Option<TeamId>,
}

/// Read-only view over one tournament snapshot with its groups ranked.
pub struct BracketEngine<'a> {
    tournament: &'a Tournament,
    profile: &'static Profile,
    rankings: Vec<GroupRanking>,
}

impl<'a> BracketEngine<'a> {
    pub fn new(tournament: &'a Tournament) -> EngineResult<Self> {
        let profile = Profile::for_code(&tournament.code)?;
        let rankings = tournament
            .groups
            .iter()
            .map(|group| rank_tournament_group(profile, tournament, group))
            .collect();
        Ok(Self { tournament, profile, rankings })
    }

    pub fn rankings(&self) -> &[GroupRanking] {
        &self.rankings
    }

    pub fn ranking(&self, group: &str) -> Option<&GroupRanking> {
        self.rankings.iter().find(|r| r.group == group)
    }

    /// Participant rules of all matches in ordinal order.
    pub fn rules(&self) -> EngineResult<Vec<(MatchNumber, ParticipantRule)>> {
        let mut rules = Vec::new();
        for m in &self.tournament.matches {
            if let Some(text) = m.rule() {
                rules.push((m.number, text.parse::<ParticipantRule>()?));
            }
        }
        rules.sort_by_key(|(number, _)| *number);
        Ok(rules)
    }

    /// Teams behind every group-form reference that can be determined now.
    ///
    /// A single-group reference needs its group finished and the position held
    /// by exactly one team. Multi-group references draw distinct teams from the
    /// best `groups - letters + 1` teams on that position across all groups.
    pub fn position_map(&self) -> EngineResult<PositionMap> {
        let mut references: Vec<(String, u8)> = Vec::new();
        for (_, rule) in self.rules()? {
            for reference in [rule.team1, rule.team2] {
                if let ParticipantReference::GroupPosition { groups, position } = reference
                    && let Ok(position) = u8::try_from(position)
                    && !references.contains(&(groups.clone(), position))
                {
                    references.push((groups, position));
                }
            }
        }

        let mut positions = PositionMap::new();
        for (groups, position) in references.iter().filter(|(g, _)| g.len() == 1) {
            let Some(ranking) = self.ranking(groups) else {
                return Err(EngineError::InconsistentSnapshot(format!(
                    "participant rule names unknown group {groups}"
                )));
            };
            if !ranking.is_finished() {
                continue;
            }
            if let Some(standing) = ranking.team_at_position(*position) {
                positions.insert(format!("{groups}{position}"), standing.team_id);
            }
        }

        let mut slots = Vec::new();
        for (groups, position) in references.iter().filter(|(g, _)| g.len() > 1) {
            let count = (self.rankings.len() + 1).saturating_sub(groups.len());
            let candidates: Vec<TeamId> = best_placed_teams(
                self.profile,
                &self.tournament.code,
                &self.rankings,
                *position,
                count,
            )?
            .into_iter()
            .filter(|best| groups.contains(best.group.as_str()))
            .map(|best| best.team_id)
            .collect();
            slots.push((format!("{groups}{position}"), candidates));
        }

        let taken: HashSet<TeamId> = positions.values().copied().collect();
        let candidates: Vec<Vec<TeamId>> = slots.iter().map(|(_, c)| c.clone()).collect();
        for ((key, _), team) in slots.into_iter().zip(assign_slots(&candidates, &taken)) {
            if let Some(team) = team {
                positions.insert(key, team);
            }
        }
        Ok(positions)
    }

    /// Slots the current snapshot can fill, without applying them.
    pub fn pending_updates(&self) -> EngineResult<Vec<ParticipantUpdate>> {
        let positions = self.position_map()?;
        let mut matches: Vec<_> = self.tournament.matches.iter().filter(|m| !m.has_teams()).collect();
        matches.sort_by_key(|m| m.number);

        let mut updates = Vec::new();
        for m in matches {
            let Some(text) = m.rule() else {
                continue;
            };
            let rule: ParticipantRule = text.parse()?;
            let team1 = match m.team1 {
                Some(team) => Some(team),
                None => rule.team1.resolve(&positions, self.tournament)?,
            };
            let team2 = match m.team2 {
                Some(team) => Some(team),
                None => rule.team2.resolve(&positions, self.tournament)?,
            };
            if (team1, team2) != (m.team1, m.team2) {
                updates.push(ParticipantUpdate {
                    match_id: m.id,
                    match_number: m.number,
                    team1,
                    team2,
                });
            }
        }
        Ok(updates)
    }
}

/// Pick a distinct team for every slot, preferring earlier candidates and
/// earlier slots. Slots without an available candidate stay empty.
fn assign_slots(candidates: &[Vec<TeamId>], taken: &HashSet<TeamId>) -> Vec<Option<TeamId>> {
    fn search(
        candidates: &[Vec<TeamId>],
        index: usize,
        used: &mut Vec<TeamId>,
        current: &mut Vec<Option<TeamId>>,
        best: &mut (usize, Vec<Option<TeamId>>),
    ) {
        let filled = current.iter().filter(|t| t.is_some()).count();
        if index == candidates.len() {
            if filled > best.0 {
                *best = (filled, current.clone());
            }
            return;
        }
        // even filling every remaining slot cannot beat the best so far
        if filled + (candidates.len() - index) <= best.0 {
            return;
        }
        for &team in &candidates[index] {
            if used.contains(&team) {
                continue;
            }
            used.push(team);
            current.push(Some(team));
            search(candidates, index + 1, used, current, best);
            current.pop();
            used.pop();
            if best.0 == candidates.len() {
                return;
            }
        }
        current.push(None);
        search(candidates, index + 1, used, current, best);
        current.pop();
    }

    let mut used: Vec<TeamId> = taken.iter().copied().collect();
    let mut best = (0, vec![None; candidates.len()]);
    search(candidates, 0, &mut used, &mut Vec::new(), &mut best);
    best.1
}

// ---------------------------------------------------------------------------
// Mutating passes
// ---------------------------------------------------------------------------

/// Run one progression pass and store the filled slots.
pub fn progress(tournament: &mut Tournament) -> EngineResult<Vec<ParticipantUpdate>> {
    let updates = BracketEngine::new(tournament)?.pending_updates()?;
    for update in &updates {
        if let Some(m) = tournament.find_match_mut(update.match_number) {
            m.team1 = update.team1;
            m.team2 = update.team2;
            debug!(
                "Match #{} participants set to {:?} - {:?}",
                update.match_number, update.team1, update.team2
            );
        }
    }
    Ok(updates)
}

/// Repeat [`progress`] until a pass changes nothing.
pub fn progress_until_stable(tournament: &mut Tournament) -> EngineResult<Vec<ParticipantUpdate>> {
    let mut all = Vec::new();
    loop {
        let updates = progress(tournament)?;
        if updates.is_empty() {
            return Ok(all);
        }
        all.extend(updates);
    }
}

/// Validate and store the final result of a match, then propagate it through the bracket.
pub fn record_result(
    tournament: &mut Tournament,
    number: MatchNumber,
    goals: Goals,
    now: NaiveDateTime,
) -> EngineResult<Vec<ParticipantUpdate>> {
    let m = tournament.match_by_number(number).ok_or(EngineError::UnknownMatch(number))?;
    let is_group = tournament.is_group_match(m);

    if now < end_time(m.start_time) {
        return Err(EngineError::InvalidResult(number, vec![ResultViolation::MatchNotFinishedYet]));
    }
    let violations = validate_result(is_group, tournament.is_overtime_match(m), &goals);
    if !violations.is_empty() {
        return Err(EngineError::InvalidResult(number, violations));
    }
    if !m.has_teams() {
        return Err(EngineError::InvalidResult(number, vec![ResultViolation::MissingTeams]));
    }

    if let Some(m) = tournament.find_match_mut(number) {
        m.goals = if is_group { Goals { normal: goals.normal, ..Goals::default() } } else { goals };
    }
    progress_until_stable(tournament)
}

/// Clear the stored result of a match. Participants filled from it are kept.
pub fn reset_result(tournament: &mut Tournament, number: MatchNumber) -> EngineResult<()> {
    let m = tournament.find_match_mut(number).ok_or(EngineError::UnknownMatch(number))?;
    if !m.has_teams() {
        return Err(EngineError::InvalidResult(number, vec![ResultViolation::MissingTeams]));
    }
    m.goals = Goals::default();
    Ok(())
}
