use crate::outcome::ResultViolation;
use crate::MatchNumber;
use std::fmt;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    MalformedRule(String),
    UnknownProfile(String),
    InvalidSide(u8),
    UnsupportedRanking(String),
    InvalidResult(MatchNumber, Vec<ResultViolation>),
    UnknownMatch(MatchNumber),
    UnknownFeedTeam(u64),
    InconsistentSnapshot(String),
    TournamentIncomplete(u8),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MalformedRule(rule) => write!(f, "Malformed participant rule: {rule:?}"),
            EngineError::UnknownProfile(code) => write!(f, "Unknown competition: {code}"),
            EngineError::InvalidSide(index) => {
                write!(f, "Side must be either 1 or 2, got {index}")
            }
            EngineError::UnsupportedRanking(code) => {
                write!(f, "Best placed teams ranking is not supported by {code}")
            }
            EngineError::InvalidResult(number, violations) => {
                write!(f, "Invalid result for match #{number}: ")?;
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            EngineError::UnknownMatch(number) => write!(f, "No match with number {number}"),
            EngineError::UnknownFeedTeam(feed_id) => write!(f, "No team with feed id {feed_id}"),
            EngineError::InconsistentSnapshot(msg) => write!(f, "Inconsistent snapshot: {msg}"),
            EngineError::TournamentIncomplete(percent) => {
                write!(f, "Tournament is only {percent}% complete")
            }
        }
    }
}

impl std::error::Error for EngineError {}
