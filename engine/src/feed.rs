use crate::bracket::progress_until_stable;
use crate::outcome::{Side, is_complete};
use crate::rule::{ParticipantReference, ParticipantRule};
use crate::timeline::{escalated_incomplete_matches, is_match_complete};
use crate::{EngineError, EngineResult, GoalPair, Goals, Match, MatchNumber, TeamId, Tournament};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct Matchdata {
    #[serde(rename = "MatchID", alias = "matchID")]
    pub match_id: u64,
    #[serde(rename = "MatchDateTimeUTC", alias = "matchDateTimeUTC")]
    pub start_time_utc: DateTime<Utc>,
    #[serde(rename = "Team1", alias = "team1")]
    pub team1: FeedTeam,
    #[serde(rename = "Team2", alias = "team2")]
    pub team2: FeedTeam,
    #[serde(rename = "MatchIsFinished", alias = "matchIsFinished", default)]
    pub is_finished: bool,
    #[serde(rename = "MatchResults", alias = "matchResults", default)]
    pub results: Vec<FeedResult>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FeedTeam {
    #[serde(rename = "TeamId", alias = "teamId")]
    pub team_id: u64,
    #[serde(rename = "TeamName", alias = "teamName", default)]
    pub team_name: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FeedResult {
    #[serde(rename = "ResultName", alias = "resultName", default)]
    pub result_name: String,
    /// Missing while a result is still being entered on the feed side.
    #[serde(rename = "PointsTeam1", alias = "pointsTeam1", default)]
    pub points_team1: Option<u8>,
    #[serde(rename = "PointsTeam2", alias = "pointsTeam2", default)]
    pub points_team2: Option<u8>,
}

impl FeedResult {
    fn pair(&self) -> Option<GoalPair> {
        GoalPair::from_parts(self.points_team1, self.points_team2)
    }
}

pub fn parse_matchdata(text: &str) -> serde_json::Result<Vec<Matchdata>> {
    serde_json::from_str(text)
}

/// Which `ResultName` of a feed stands for which phase.
///
/// `normal_extra` is for feeds that report the 90-minute score under its own
/// name and put the after-extra-time (or after-penalties) score under the
/// `normal` name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ResultLabels {
    pub normal: String,
    pub normal_extra: Option<String>,
    pub extra: Option<String>,
    pub penalty: Option<String>,
}

impl Default for ResultLabels {
    fn default() -> Self {
        ResultLabels {
            normal: "Endergebnis".to_owned(),
            normal_extra: None,
            extra: Some("Verlängerung".to_owned()),
            penalty: Some("Elfmeterschießen".to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// What a feed record contributes to one snapshot match, already oriented to
/// the match's team order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdate {
    pub match_number: MatchNumber,
    /// Feed ids for participants the match is still missing.
    pub team1_feed_id: Option<u64>,
    pub team2_feed_id: Option<u64>,
    pub goals: Goals,
}

fn feed_id_of(tournament: &Tournament, team_id: TeamId) -> Option<u64> {
    tournament.team(team_id).and_then(|t| t.feed_id)
}

/// The feed record kicking off with `m` and carrying its teams in either order.
/// Any record at the right time matches a match still missing a participant.
pub fn find_matchdata<'a>(feed: &'a [Matchdata], tournament: &Tournament, m: &Match) -> Option<&'a Matchdata> {
    feed.iter()
        .filter(|data| data.start_time_utc.naive_utc() == m.start_time)
        .find(|data| {
            let (Some(team1), Some(team2)) = (m.team1, m.team2) else {
                return true;
            };
            let ids = (feed_id_of(tournament, team1), feed_id_of(tournament, team2));
            let (feed1, feed2) = (Some(data.team1.team_id), Some(data.team2.team_id));
            ids == (feed1, feed2) || ids == (feed2, feed1)
        })
}

/// Whether the feed team can play on `side` of `m`.
pub fn is_candidate_match_team(
    tournament: &Tournament,
    m: &Match,
    feed_id: u64,
    side: Side,
) -> EngineResult<bool> {
    let present = match side {
        Side::Team1 => m.team1,
        Side::Team2 => m.team2,
    };
    if let Some(team_id) = present {
        return Ok(feed_id_of(tournament, team_id) == Some(feed_id));
    }

    if tournament.is_group_match(m) {
        return Err(EngineError::InconsistentSnapshot(format!(
            "group match #{} has no participants",
            m.number
        )));
    }
    let team = tournament
        .team_by_feed_id(feed_id)
        .ok_or(EngineError::UnknownFeedTeam(feed_id))?;
    let Some(text) = m.rule() else {
        return Ok(false);
    };
    let rule: ParticipantRule = text.parse()?;

    let reference = rule.reference(side);
    let candidate = match reference {
        ParticipantReference::GroupPosition { .. } => team
            .group
            .as_ref()
            .is_some_and(|group| reference.group_names().contains(group)),
        ParticipantReference::MatchOutcome { .. } => reference
            .parent_match(tournament)?
            .is_some_and(|parent| parent.team1 == Some(team.id) || parent.team2 == Some(team.id)),
    };
    Ok(candidate)
}

/// Map a feed record onto `m`. `None` when the feed teams fit neither order.
pub fn extract_update(
    tournament: &Tournament,
    m: &Match,
    data: &Matchdata,
    labels: &ResultLabels,
) -> EngineResult<Option<FeedUpdate>> {
    let (feed1, feed2) = (data.team1.team_id, data.team2.team_id);
    let straight = is_candidate_match_team(tournament, m, feed1, Side::Team1)?
        && is_candidate_match_team(tournament, m, feed2, Side::Team2)?;
    // a record fitting both orders is taken as delivered, never swapped
    let reversed = !straight
        && is_candidate_match_team(tournament, m, feed1, Side::Team2)?
        && is_candidate_match_team(tournament, m, feed2, Side::Team1)?;
    if !straight && !reversed {
        warn!("Feed record {} does not fit the teams of match #{}", data.match_id, m.number);
        return Ok(None);
    }
    let orient = |pair: GoalPair| if reversed { pair.reversed() } else { pair };

    let mut normal = None;
    let mut normal_extra = None;
    let mut extra = None;
    let mut penalty = None;
    for result in &data.results {
        let Some(pair) = result.pair().map(orient) else {
            continue;
        };
        let name = Some(result.result_name.as_str());
        if result.result_name == labels.normal {
            normal = Some(pair);
        } else if name == labels.normal_extra.as_deref() {
            normal_extra = Some(pair);
        } else if name == labels.extra.as_deref() {
            extra = Some(pair);
        } else if name == labels.penalty.as_deref() {
            penalty = Some(pair);
        }
    }

    // the "normal" label carries the last score played, the 90-minute one comes separately
    if let Some(after_ninety) = normal_extra {
        if extra.is_some() {
            penalty = normal;
        } else {
            extra = normal;
        }
        normal = Some(after_ninety);
    }

    let (team1_feed_id, team2_feed_id) = if reversed { (feed2, feed1) } else { (feed1, feed2) };
    Ok(Some(FeedUpdate {
        match_number: m.number,
        team1_feed_id: m.team1.is_none().then_some(team1_feed_id),
        team2_feed_id: m.team2.is_none().then_some(team2_feed_id),
        goals: Goals { normal, extra, penalty },
    }))
}

/// Store what the update adds: missing participants, and the result if it
/// completes a match that was incomplete. Returns whether anything changed.
pub fn apply_update(tournament: &mut Tournament, update: &FeedUpdate) -> EngineResult<bool> {
    let team_of = |feed_id: Option<u64>| -> EngineResult<Option<TeamId>> {
        let Some(feed_id) = feed_id else {
            return Ok(None);
        };
        let team = tournament
            .team_by_feed_id(feed_id)
            .ok_or(EngineError::UnknownFeedTeam(feed_id))?;
        Ok(Some(team.id))
    };
    let team1 = team_of(update.team1_feed_id)?;
    let team2 = team_of(update.team2_feed_id)?;
    let m = tournament
        .match_by_number(update.match_number)
        .ok_or(EngineError::UnknownMatch(update.match_number))?;
    let is_group = tournament.is_group_match(m);
    let store_goals = !is_match_complete(tournament, m) && is_complete(is_group, &update.goals);

    let m = tournament
        .find_match_mut(update.match_number)
        .ok_or(EngineError::UnknownMatch(update.match_number))?;
    let mut updated = false;
    if let Some(team) = team1 {
        m.team1 = Some(team);
        updated = true;
    }
    if let Some(team) = team2 {
        m.team2 = Some(team);
        updated = true;
    }
    if store_goals {
        m.goals = update.goals;
        updated = true;
    }
    Ok(updated)
}

/// Apply finished feed records to every incomplete match overdue at `now`,
/// progressing the bracket after each change. Returns the number of matches updated.
pub fn update_match_results(
    tournament: &mut Tournament,
    feed: &[Matchdata],
    labels: &ResultLabels,
    now: NaiveDateTime,
) -> EngineResult<usize> {
    let overdue: Vec<MatchNumber> = escalated_incomplete_matches(tournament, now)?
        .into_iter()
        .map(|m| m.number)
        .collect();
    debug!("{} escalated incomplete matches at {now}", overdue.len());

    let mut updated = 0;
    for number in overdue {
        let Some(m) = tournament.match_by_number(number) else {
            continue;
        };
        let Some(data) = find_matchdata(feed, tournament, m).filter(|data| data.is_finished) else {
            continue;
        };
        info!("Match #{number} is incomplete but escalated");
        let Some(update) = extract_update(tournament, m, data, labels)? else {
            continue;
        };
        if apply_update(tournament, &update)? {
            updated += 1;
            info!("Escalated match #{number} is updated");
            progress_until_stable(tournament)?;
        }
    }
    Ok(updated)
}
