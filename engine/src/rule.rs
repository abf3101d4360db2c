use crate::outcome::{Outcome, Side, is_complete, match_result};
use crate::{EngineError, EngineResult, Match, MatchNumber, TeamId, Tournament};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static GROUP_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)([0-9]+)-([A-Z]+)([0-9]+)$").unwrap());
static KNOCKOUT_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([WL])([0-9]+)-([WL])([0-9]+)$").unwrap());

/// Resolved group-form references keyed by their text ("A1", "BCD3").
pub type PositionMap = BTreeMap<String, TeamId>;

/// One side of a rule: group form `A1`, `BCD3` or knockout form `W49`, `L61`.
///
/// Numbers are read as written, saturating at `u32::MAX`. One too large to
/// name a position or a match never resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParticipantReference {
    /// `groups` holds more than one letter for best-placed slots.
    GroupPosition { groups: String, position: u32 },
    MatchOutcome { match_number: u32, winner: bool },
}

impl ParticipantReference {
    pub fn is_multi_group(&self) -> bool {
        matches!(self, ParticipantReference::GroupPosition { groups, .. } if groups.len() > 1)
    }

    /// Group names this reference draws from.
    pub fn group_names(&self) -> Vec<String> {
        match self {
            ParticipantReference::GroupPosition { groups, .. } => {
                groups.chars().map(String::from).collect()
            }
            ParticipantReference::MatchOutcome { .. } => Vec::new(),
        }
    }

    /// The earlier match a `W`/`L` reference reads from. `None` for group
    /// references and for numbers beyond any match number.
    pub fn parent_match<'a>(&self, tournament: &'a Tournament) -> EngineResult<Option<&'a Match>> {
        let ParticipantReference::MatchOutcome { match_number, .. } = self else {
            return Ok(None);
        };
        let Ok(number) = MatchNumber::try_from(*match_number) else {
            return Ok(None);
        };
        tournament
            .match_by_number(number)
            .map(Some)
            .ok_or(EngineError::UnknownMatch(number))
    }

    /// The concrete team behind this reference, `None` while it is not determined yet.
    pub fn resolve(&self, positions: &PositionMap, tournament: &Tournament) -> EngineResult<Option<TeamId>> {
        match self {
            ParticipantReference::GroupPosition { .. } => Ok(positions.get(&self.to_string()).copied()),
            ParticipantReference::MatchOutcome { winner, .. } => {
                let Some(parent) = self.parent_match(tournament)? else {
                    return Ok(None);
                };
                let (Some(team1), Some(team2)) = (parent.team1, parent.team2) else {
                    return Ok(None);
                };
                if !is_complete(tournament.is_group_match(parent), &parent.goals) {
                    return Ok(None);
                }
                let team = match match_result(Side::Team1, &parent.goals) {
                    Some(Outcome::Win) => Some(if *winner { team1 } else { team2 }),
                    Some(Outcome::Loss) => Some(if *winner { team2 } else { team1 }),
                    Some(Outcome::Draw) | None => None,
                };
                Ok(team)
            }
        }
    }
}

impl fmt::Display for ParticipantReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantReference::GroupPosition { groups, position } => write!(f, "{groups}{position}"),
            ParticipantReference::MatchOutcome { match_number, winner } => {
                write!(f, "{}{match_number}", if *winner { 'W' } else { 'L' })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantRule {
    pub team1: ParticipantReference,
    pub team2: ParticipantReference,
}

impl ParticipantRule {
    pub fn reference(&self, side: Side) -> &ParticipantReference {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn is_knockout(&self) -> bool {
        matches!(self.team1, ParticipantReference::MatchOutcome { .. })
    }

    /// Distinct group names named by either side, in order of appearance.
    pub fn group_names(&self) -> Vec<String> {
        let mut names = self.team1.group_names();
        for name in self.team2.group_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Digits matched by the rule grammar. Past `u32::MAX` the value saturates.
fn number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

impl FromStr for ParticipantRule {
    type Err = EngineError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        if let Some(caps) = KNOCKOUT_RULE.captures(rule) {
            let reference = |kind: usize, digits: usize| ParticipantReference::MatchOutcome {
                match_number: number(&caps[digits]),
                winner: &caps[kind] == "W",
            };
            return Ok(ParticipantRule { team1: reference(1, 2), team2: reference(3, 4) });
        }

        if let Some(caps) = GROUP_RULE.captures(rule) {
            let reference = |groups: usize, digits: usize| ParticipantReference::GroupPosition {
                groups: caps[groups].to_owned(),
                position: number(&caps[digits]),
            };
            return Ok(ParticipantRule { team1: reference(1, 2), team2: reference(3, 4) });
        }

        Err(EngineError::MalformedRule(rule.to_owned()))
    }
}

impl fmt::Display for ParticipantRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.team1, self.team2)
    }
}
