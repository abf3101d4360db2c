use crate::{GoalPair, TeamId};

pub const EXACT_SCORE: u32 = 3;
pub const GOAL_DIFFERENCE: u32 = 2;
pub const OUTCOME: u32 = 1;
/// Multiplier when the favourite team plays in the match.
pub const FAVOURITE_MULTIPLIER: u32 = 2;

/// Points a prediction earns against the normal-time result of a match.
///
/// Nothing is awarded while a participant, the result or the prediction is unknown.
pub fn score(
    favourite: Option<TeamId>,
    team1: Option<TeamId>,
    team2: Option<TeamId>,
    actual: Option<GoalPair>,
    predicted: Option<GoalPair>,
) -> u32 {
    let (Some(team1), Some(team2), Some(actual), Some(predicted)) = (team1, team2, actual, predicted)
    else {
        return 0;
    };

    let base = if actual == predicted {
        EXACT_SCORE
    } else if actual.difference() == predicted.difference() {
        GOAL_DIFFERENCE
    } else if actual.sign() == predicted.sign() {
        OUTCOME
    } else {
        0
    };

    if favourite.is_some_and(|fav| fav == team1 || fav == team2) {
        base * FAVOURITE_MULTIPLIER
    } else {
        base
    }
}
