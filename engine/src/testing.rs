use crate::standings::PlayedMatch;
use crate::{GoalPair, Goals, Group, Match, MatchNumber, Round, Team, TeamId, Tournament};
use chrono::{NaiveDate, NaiveDateTime};

pub const GROUP_ROUND: u32 = 1;
pub const QUARTER_FINALS: u32 = 2;
pub const SEMI_FINALS: u32 = 3;
pub const THIRD_PLACE: u32 = 4;
pub const FINAL: u32 = 5;

const TEAM_NAMES: [&str; 12] = [
    "Austria", "Belgium", "Croatia", "Denmark", "England", "France", "Germany", "Hungary", "Italy",
    "Japan", "Korea", "Mexico",
];

const PAIRINGS: [(usize, usize); 6] = [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];

pub fn played(team1: TeamId, team2: TeamId, goals1: u8, goals2: u8) -> PlayedMatch {
    PlayedMatch { team1, team2, goals: GoalPair::new(goals1, goals2) }
}

/// June 2024 at the given day and hour.
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid fixture date")
}

fn knockout(number: MatchNumber, round_id: u32, rule: &str, start_time: NaiveDateTime) -> Match {
    Match {
        id: u64::from(number) + 1000,
        number,
        round_id,
        team1: None,
        team2: None,
        participants_rule: Some(rule.to_owned()),
        start_time,
        goals: Goals::default(),
    }
}

/// Groups A (1-4), B (5-8) and C (9-12); group matches 1-18 three per slot from
/// June 10th, quarter-finals 19-22, semi-finals 23-24, third place 25, final 26.
pub fn three_group_tournament() -> Tournament {
    let names = ["A", "B", "C"];
    let teams = TEAM_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Team {
            id: i as TeamId + 1,
            name: (*name).to_owned(),
            group: Some(names[i / 4].to_owned()),
            feed_id: Some(i as u64 + 101),
        })
        .collect();
    let groups: Vec<Group> = names
        .iter()
        .enumerate()
        .map(|(g, name)| Group {
            name: (*name).to_owned(),
            team_ids: (1..=4).map(|t| (g * 4 + t) as TeamId).collect(),
        })
        .collect();

    let mut matches = Vec::new();
    for (p, (first, second)) in PAIRINGS.iter().enumerate() {
        for (g, group) in groups.iter().enumerate() {
            let index = p * 3 + g;
            let number = index as MatchNumber + 1;
            matches.push(Match {
                id: u64::from(number) + 1000,
                number,
                round_id: GROUP_ROUND,
                team1: Some(group.team_ids[*first]),
                team2: Some(group.team_ids[*second]),
                participants_rule: None,
                start_time: at(10 + index as u32 / 3, 15 + (index as u32 % 3) * 3),
                goals: Goals::default(),
            });
        }
    }
    matches.push(knockout(19, QUARTER_FINALS, "A1-BC3", at(17, 18)));
    matches.push(knockout(20, QUARTER_FINALS, "B1-AC3", at(17, 21)));
    matches.push(knockout(21, QUARTER_FINALS, "C1-A2", at(18, 18)));
    matches.push(knockout(22, QUARTER_FINALS, "B2-C2", at(18, 21)));
    matches.push(knockout(23, SEMI_FINALS, "W19-W20", at(21, 21)));
    matches.push(knockout(24, SEMI_FINALS, "W21-W22", at(22, 21)));
    matches.push(knockout(25, THIRD_PLACE, "L23-L24", at(25, 18)));
    matches.push(knockout(26, FINAL, "W23-W24", at(26, 21)));

    let round = |id, name: &str, is_group, is_overtime| Round {
        id,
        name: name.to_owned(),
        is_group,
        is_overtime,
    };

    Tournament {
        id: 1,
        name: "Test Cup 2016".to_owned(),
        code: "EC2016".to_owned(),
        teams,
        groups,
        rounds: vec![
            round(GROUP_ROUND, "Group stage", true, false),
            round(QUARTER_FINALS, "Quarter-finals", false, true),
            round(SEMI_FINALS, "Semi-finals", false, true),
            round(THIRD_PLACE, "Third place", false, false),
            round(FINAL, "Final", false, true),
        ],
        matches,
    }
}

/// Group standings after these results:
/// A: Austria, Belgium, Croatia (3rd, 4 pts), Denmark
/// B: England, Germany, France (3rd, 4 pts), Hungary
/// C: Italy, Mexico, Korea (3rd, 3 pts), Japan
pub fn group_results() -> Vec<(MatchNumber, Goals)> {
    let by_group = [
        [(2, 0), (1, 0), (3, 0), (2, 1), (1, 0), (1, 1)],
        [(1, 0), (2, 0), (2, 1), (1, 0), (0, 0), (2, 2)],
        [(3, 1), (0, 1), (1, 0), (2, 0), (2, 2), (0, 1)],
    ];
    let mut results = Vec::new();
    for p in 0..PAIRINGS.len() {
        for (g, group) in by_group.iter().enumerate() {
            let (goals1, goals2) = group[p];
            results.push(((p * 3 + g) as MatchNumber + 1, Goals::full_time(goals1, goals2)));
        }
    }
    results
}

/// Quarter-finals Austria-France, England-Croatia, Italy-Belgium, Germany-Mexico;
/// Austria beat Belgium in the final, England took third place.
pub fn knockout_results() -> Vec<(MatchNumber, Goals)> {
    vec![
        (19, Goals::full_time(2, 1)),
        (20, Goals::full_time(1, 1).with_extra(1, 1).with_penalty(4, 3)),
        (21, Goals::full_time(0, 1)),
        (22, Goals::full_time(0, 0).with_extra(2, 0)),
        (23, Goals::full_time(1, 0)),
        (24, Goals::full_time(2, 2).with_extra(3, 2)),
        (25, Goals::full_time(1, 1).with_penalty(5, 4)),
        (26, Goals::full_time(1, 0)),
    ]
}

pub fn set_result(tournament: &mut Tournament, number: MatchNumber, goals: Goals) {
    tournament
        .find_match_mut(number)
        .expect("fixture match exists")
        .goals = goals;
}

pub fn complete_group_stage(tournament: &mut Tournament) {
    for (number, goals) in group_results() {
        set_result(tournament, number, goals);
    }
}
