use crate::standings::TeamRecord;
use crate::{EngineError, EngineResult};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criteria {
    Points,
    PointsGoalDifferenceGoalsFor,
    GoalDifferenceGoalsFor,
}

impl Criteria {
    /// `Less` when `a` ranks ahead of `b`.
    pub fn compare(self, a: &TeamRecord, b: &TeamRecord) -> Ordering {
        let points = || b.points.cmp(&a.points);
        let goal_difference = || b.goal_difference().cmp(&a.goal_difference());
        let goals_for = || b.goals_for.cmp(&a.goals_for);
        match self {
            Criteria::Points => points(),
            Criteria::PointsGoalDifferenceGoalsFor => {
                points().then_with(goal_difference).then_with(goals_for)
            }
            Criteria::GoalDifferenceGoalsFor => goal_difference().then_with(goals_for),
        }
    }
}

/// Which matches a level counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every match of the group.
    Group,
    /// Only matches played among the tied teams.
    HeadToHead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub criteria: Criteria,
    pub scope: Scope,
    /// A smaller tied cluster is broken again at this level before moving on.
    pub repeat_on_partial_tie: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub codes: &'static [&'static str],
    pub levels: &'static [Level],
    /// Comparator for ranking same-position teams across groups, if the competition has such slots.
    pub best_placed: Option<Criteria>,
}

impl Profile {
    pub fn for_code(code: &str) -> EngineResult<&'static Profile> {
        PROFILES
            .iter()
            .find(|p| p.codes.contains(&code))
            .ok_or_else(|| EngineError::UnknownProfile(code.to_owned()))
    }

    pub fn level(&self, index: usize) -> Option<&'static Level> {
        self.levels.get(index)
    }

    pub fn best_placed_criteria(&self, code: &str) -> EngineResult<Criteria> {
        self.best_placed
            .ok_or_else(|| EngineError::UnsupportedRanking(code.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Profile table
// ---------------------------------------------------------------------------

const POINTS_THEN_HEAD_TO_HEAD: &[Level] = &[
    Level { criteria: Criteria::Points, scope: Scope::Group, repeat_on_partial_tie: false },
    Level {
        criteria: Criteria::PointsGoalDifferenceGoalsFor,
        scope: Scope::HeadToHead,
        repeat_on_partial_tie: true,
    },
    Level {
        criteria: Criteria::GoalDifferenceGoalsFor,
        scope: Scope::Group,
        repeat_on_partial_tie: false,
    },
];

const OVERALL_THEN_HEAD_TO_HEAD: &[Level] = &[
    Level {
        criteria: Criteria::PointsGoalDifferenceGoalsFor,
        scope: Scope::Group,
        repeat_on_partial_tie: false,
    },
    Level {
        criteria: Criteria::PointsGoalDifferenceGoalsFor,
        scope: Scope::HeadToHead,
        repeat_on_partial_tie: true,
    },
];

pub static PROFILES: &[Profile] = &[
    Profile {
        name: "head-to-head after points",
        codes: &["WC2014", "WC2018", "WC2022"],
        levels: POINTS_THEN_HEAD_TO_HEAD,
        best_placed: None,
    },
    Profile {
        name: "head-to-head after points, best placed slots",
        codes: &["EC2016", "EC2020", "AFC2019", "CAF2019", "AFC2023", "CAF2023"],
        levels: POINTS_THEN_HEAD_TO_HEAD,
        best_placed: Some(Criteria::PointsGoalDifferenceGoalsFor),
    },
    Profile {
        name: "head-to-head after overall record",
        codes: &["CA2016", "ABC2021"],
        levels: OVERALL_THEN_HEAD_TO_HEAD,
        best_placed: None,
    },
    Profile {
        name: "head-to-head after overall record, best placed slots",
        codes: &["CA2019", "CA2021"],
        levels: OVERALL_THEN_HEAD_TO_HEAD,
        best_placed: Some(Criteria::PointsGoalDifferenceGoalsFor),
    },
];
