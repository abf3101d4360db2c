pub mod best_placed;
pub mod bets;
pub mod bracket;
pub mod error;
pub mod feed;
pub mod outcome;
pub mod profile;
pub mod rule;
pub mod scoring;
pub mod standings;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{EngineError, EngineResult};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub type TeamId = u64;
pub type MatchId = u64;
pub type RoundId = u32;
/// Stable ordinal of a match inside its tournament, referenced by `W`/`L` rules.
pub type MatchNumber = u16;

// ---------------------------------------------------------------------------
// Domain types: one tournament snapshot, independent of any feed format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u32,
    pub name: String,
    /// Competition code ("WC2018", "EC2020", ...) selecting the tie-break profile.
    pub code: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl Tournament {
    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn team_name(&self, team_id: TeamId) -> &str {
        self.team(team_id).map(|t| t.name.as_str()).unwrap_or("?")
    }

    /// Look up a team by the identifier an external result feed uses for it.
    pub fn team_by_feed_id(&self, feed_id: u64) -> Option<&Team> {
        self.teams.iter().find(|t| t.feed_id == Some(feed_id))
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn round(&self, round_id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    pub fn is_group_match(&self, m: &Match) -> bool {
        self.round(m.round_id).is_some_and(|r| r.is_group)
    }

    pub fn is_overtime_match(&self, m: &Match) -> bool {
        self.round(m.round_id).is_some_and(|r| r.is_overtime)
    }

    pub fn match_by_number(&self, number: MatchNumber) -> Option<&Match> {
        self.matches.iter().find(|m| m.number == number)
    }

    pub fn match_by_id(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Find a match by its ordinal number for in-place updates.
    pub fn find_match_mut(&mut self, number: MatchNumber) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.number == number)
    }

    /// Group-stage matches played by the members of the named group.
    pub fn group_matches<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a Match> + 'a {
        self.matches.iter().filter(move |m| {
            self.is_group_match(m) && m.team1.is_some_and(|t| group.team_ids.contains(&t))
        })
    }

    /// The final is the knockout match with the highest ordinal.
    pub fn final_match(&self) -> Option<&Match> {
        self.matches
            .iter()
            .filter(|m| !self.is_group_match(m))
            .max_by_key(|m| m.number)
    }

    /// Matches in kick-off order, ties broken by ordinal.
    pub fn matches_by_start_time(&self) -> Vec<&Match> {
        let mut matches: Vec<&Match> = self.matches.iter().collect();
        matches.sort_by(|a, b| match a.start_time.cmp(&b.start_time) {
            Ordering::Equal => a.number.cmp(&b.number),
            other => other,
        });
        matches
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Home group name, unset until the draw assigns one.
    #[serde(default)]
    pub group: Option<String>,
    /// Identifier used by the external result feed.
    #[serde(default)]
    pub feed_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String, // "A", "B", ...
    pub team_ids: Vec<TeamId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    #[serde(default)]
    pub is_group: bool,
    /// Knockout round that goes to extra time before penalties.
    #[serde(default)]
    pub is_overtime: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub number: MatchNumber,
    pub round_id: RoundId,
    #[serde(default)]
    pub team1: Option<TeamId>,
    #[serde(default)]
    pub team2: Option<TeamId>,
    /// Participant rule such as "A1-B2", "ABCD3" or "W49-W50"; empty for fixed pairings.
    #[serde(default)]
    pub participants_rule: Option<String>,
    pub start_time: NaiveDateTime,
    #[serde(default)]
    pub goals: Goals,
}

impl Match {
    pub fn has_teams(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    pub fn rule(&self) -> Option<&str> {
        self.participants_rule
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Goals scored in one phase of a match by (team1, team2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalPair {
    pub team1: u8,
    pub team2: u8,
}

impl GoalPair {
    pub fn new(team1: u8, team2: u8) -> Self {
        Self { team1, team2 }
    }

    /// A phase only counts once both tallies are known.
    pub fn from_parts(team1: Option<u8>, team2: Option<u8>) -> Option<Self> {
        Some(Self::new(team1?, team2?))
    }

    pub fn difference(&self) -> i16 {
        i16::from(self.team1) - i16::from(self.team2)
    }

    pub fn sign(&self) -> i8 {
        outcome::sign(self.team1, self.team2)
    }

    pub fn reversed(self) -> Self {
        Self::new(self.team2, self.team1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default)]
    pub normal: Option<GoalPair>,
    #[serde(default)]
    pub extra: Option<GoalPair>,
    #[serde(default)]
    pub penalty: Option<GoalPair>,
}

impl Goals {
    pub fn full_time(team1: u8, team2: u8) -> Self {
        Self { normal: Some(GoalPair::new(team1, team2)), ..Default::default() }
    }

    pub fn with_extra(mut self, team1: u8, team2: u8) -> Self {
        self.extra = Some(GoalPair::new(team1, team2));
        self
    }

    pub fn with_penalty(mut self, team1: u8, team2: u8) -> Self {
        self.penalty = Some(GoalPair::new(team1, team2));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_none() && self.extra.is_none() && self.penalty.is_none()
    }
}
