use crate::scoring::score;
use crate::timeline::completion_percent;
use crate::{EngineError, EngineResult, GoalPair, Match, MatchId, TeamId, Tournament};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user's prediction of the normal-time result of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub match_id: MatchId,
    #[serde(default)]
    pub goals: Option<GoalPair>,
}

/// Teams whose matches score double: one for the group stage, one for the knockout stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourites {
    #[serde(default)]
    pub group_team: Option<TeamId>,
    #[serde(default)]
    pub knockout_team: Option<TeamId>,
}

impl Favourites {
    pub fn for_match(&self, tournament: &Tournament, m: &Match) -> Option<TeamId> {
        if tournament.is_group_match(m) { self.group_team } else { self.knockout_team }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetSlip {
    pub user: String,
    #[serde(default)]
    pub favourites: Favourites,
    #[serde(default)]
    pub bets: Vec<Bet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetViolation {
    MissingTip,
    MatchAlreadyStarted,
}

/// Check a new prediction before it is accepted.
pub fn check_bet(m: &Match, goals: Option<GoalPair>, now: NaiveDateTime) -> Result<(), BetViolation> {
    if goals.is_none() {
        return Err(BetViolation::MissingTip);
    }
    if now > m.start_time {
        return Err(BetViolation::MatchAlreadyStarted);
    }
    Ok(())
}

fn bet_score(tournament: &Tournament, favourites: &Favourites, m: &Match, bet: &Bet) -> u32 {
    score(favourites.for_match(tournament, m), m.team1, m.team2, m.goals.normal, bet.goals)
}

/// Bets paired with their matches in kick-off order; bets on unknown matches are skipped.
fn bets_by_start_time<'a>(tournament: &'a Tournament, slip: &'a BetSlip) -> Vec<(&'a Match, &'a Bet)> {
    let mut paired: Vec<(&Match, &Bet)> = slip
        .bets
        .iter()
        .filter_map(|bet| Some((tournament.match_by_id(bet.match_id)?, bet)))
        .collect();
    paired.sort_by_key(|(m, _)| (m.start_time, m.number));
    paired
}

pub fn user_score(tournament: &Tournament, slip: &BetSlip) -> u32 {
    bets_by_start_time(tournament, slip)
        .into_iter()
        .map(|(m, bet)| bet_score(tournament, &slip.favourites, m, bet))
        .sum()
}

/// Running total at the end of every match day the user placed a bet on.
pub fn user_scores_by_day(tournament: &Tournament, slip: &BetSlip) -> BTreeMap<NaiveDate, u32> {
    let mut by_day = BTreeMap::new();
    let mut total = 0;
    for (m, bet) in bets_by_start_time(tournament, slip) {
        total += bet_score(tournament, &slip.favourites, m, bet);
        by_day.insert(m.start_time.date(), total);
    }
    by_day
}

/// Score of a perfect prediction on every match, the final's first team as favourite.
pub fn maximum_score(tournament: &Tournament) -> EngineResult<u32> {
    let percent = completion_percent(tournament);
    if percent < 100 {
        return Err(EngineError::TournamentIncomplete(percent));
    }
    let final_match = tournament.final_match().ok_or_else(|| {
        EngineError::InconsistentSnapshot("tournament has no final".to_owned())
    })?;
    let favourite = final_match.team1;
    Ok(tournament
        .matches
        .iter()
        .map(|m| score(favourite, m.team1, m.team2, m.goals.normal, m.goals.normal))
        .sum())
}

/// Users ordered by total score, best first, ties by name.
pub fn leaderboard<'a>(tournament: &Tournament, slips: &'a [BetSlip]) -> Vec<(&'a str, u32)> {
    let mut rows: Vec<(&str, u32)> = slips
        .iter()
        .map(|slip| (slip.user.as_str(), user_score(tournament, slip)))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rows
}
