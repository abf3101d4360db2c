use crate::{EngineError, EngineResult, Goals};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Perspective a result is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn from_index(index: u8) -> EngineResult<Self> {
        match index {
            1 => Ok(Side::Team1),
            2 => Ok(Side::Team2),
            other => Err(EngineError::InvalidSide(other)),
        }
    }

    fn factor(self) -> i8 {
        match self {
            Side::Team1 => 1,
            Side::Team2 => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Loss,
    Draw,
    Win,
}

impl Outcome {
    pub fn from_sign(sign: i8) -> Self {
        match sign {
            s if s > 0 => Outcome::Win,
            0 => Outcome::Draw,
            _ => Outcome::Loss,
        }
    }

    pub fn sign(self) -> i8 {
        match self {
            Outcome::Loss => -1,
            Outcome::Draw => 0,
            Outcome::Win => 1,
        }
    }
}

pub fn sign(a: u8, b: u8) -> i8 {
    match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// Result of a match from the given side's perspective, `None` while normal time is unknown.
///
/// A level penalty pair reads as a draw; it never passes [`validate_result`].
pub fn match_result(side: Side, goals: &Goals) -> Option<Outcome> {
    let normal = goals.normal?;
    let mut result = normal.sign();
    if result == 0
        && let Some(extra) = goals.extra
    {
        result = extra.sign();
    }
    if result == 0
        && let Some(penalty) = goals.penalty
    {
        result = penalty.sign();
    }
    Some(Outcome::from_sign(result * side.factor()))
}

/// Same as [`match_result`] with a numeric side selector (1 or 2).
pub fn match_result_by_index(side: u8, goals: &Goals) -> EngineResult<Option<Outcome>> {
    Ok(match_result(Side::from_index(side)?, goals))
}

/// Group matches are complete with a normal-time result; knockout matches need a winner.
pub fn is_complete(is_group_match: bool, goals: &Goals) -> bool {
    let Some(normal) = goals.normal else {
        return false;
    };
    if is_group_match || normal.sign() != 0 {
        return true;
    }
    if goals.extra.is_some_and(|extra| extra.sign() != 0) {
        return true;
    }
    goals.penalty.is_some_and(|penalty| penalty.sign() != 0)
}

// ---------------------------------------------------------------------------
// Result validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultViolation {
    MatchNotFinishedYet,
    MissingTeams,
    MissingResult,
    GroupMatchWithOvertime,
    GroupMatchWithPenalty,
    DisallowedOvertime,
    DecidedInNormalTimeWithOvertime,
    DecidedInNormalTimeWithPenalty,
    MissingOvertimeResult,
    DecidedInOvertimeWithPenalty,
    MissingPenaltyResult,
    DrawnPenalties,
}

impl fmt::Display for ResultViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResultViolation::MatchNotFinishedYet => "match is not finished yet",
            ResultViolation::MissingTeams => "match participants are not known yet",
            ResultViolation::MissingResult => "normal time result is missing",
            ResultViolation::GroupMatchWithOvertime => "group match cannot have extra time",
            ResultViolation::GroupMatchWithPenalty => "group match cannot have penalties",
            ResultViolation::DisallowedOvertime => "round is played without extra time",
            ResultViolation::DecidedInNormalTimeWithOvertime => {
                "match was decided in normal time, no extra time allowed"
            }
            ResultViolation::DecidedInNormalTimeWithPenalty => {
                "match was decided in normal time, no penalties allowed"
            }
            ResultViolation::MissingOvertimeResult => "extra time result is missing",
            ResultViolation::DecidedInOvertimeWithPenalty => {
                "match was decided in extra time, no penalties allowed"
            }
            ResultViolation::MissingPenaltyResult => "penalty shoot-out result is missing",
            ResultViolation::DrawnPenalties => "penalty shoot-out cannot end level",
        };
        f.write_str(text)
    }
}

/// Every rule the given final result breaks; empty when the result can be stored.
pub fn validate_result(is_group_match: bool, is_overtime: bool, goals: &Goals) -> Vec<ResultViolation> {
    let mut violations = Vec::new();
    let Some(normal) = goals.normal else {
        violations.push(ResultViolation::MissingResult);
        return violations;
    };

    if is_group_match {
        if goals.extra.is_some() {
            violations.push(ResultViolation::GroupMatchWithOvertime);
        }
        if goals.penalty.is_some() {
            violations.push(ResultViolation::GroupMatchWithPenalty);
        }
        return violations;
    }

    if !is_overtime && goals.extra.is_some() {
        violations.push(ResultViolation::DisallowedOvertime);
    } else if normal.sign() != 0 {
        if goals.extra.is_some() {
            violations.push(ResultViolation::DecidedInNormalTimeWithOvertime);
        }
        if goals.penalty.is_some() {
            violations.push(ResultViolation::DecidedInNormalTimeWithPenalty);
        }
    } else if is_overtime && goals.extra.is_none() {
        violations.push(ResultViolation::MissingOvertimeResult);
    } else if is_overtime && goals.extra.is_some_and(|extra| extra.sign() != 0) {
        if goals.penalty.is_some() {
            violations.push(ResultViolation::DecidedInOvertimeWithPenalty);
        }
    } else {
        match goals.penalty {
            None => violations.push(ResultViolation::MissingPenaltyResult),
            Some(penalty) if penalty.sign() == 0 => violations.push(ResultViolation::DrawnPenalties),
            Some(_) => {}
        }
    }
    violations
}
