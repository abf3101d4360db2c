use chrono::{NaiveDate, NaiveDateTime};
use cupcast_engine::{Goals, Group, Match, MatchNumber, Round, Team, Tournament};

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 6, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid fixture date")
}

fn fixture_match(number: MatchNumber, round_id: u32, teams: Option<(u64, u64)>, start_time: NaiveDateTime) -> Match {
    Match {
        id: u64::from(number) + 500,
        number,
        round_id,
        team1: teams.map(|(t, _)| t),
        team2: teams.map(|(_, t)| t),
        participants_rule: None,
        start_time,
        goals: Goals::default(),
    }
}

/// Group A (Austria, Belgium, Croatia, Denmark), matches 1-6 two a day from
/// June 10th, final #7 "A1-A2" on June 15th.
pub fn mini_tournament() -> Tournament {
    let names = ["Austria", "Belgium", "Croatia", "Denmark"];
    let teams = names
        .iter()
        .enumerate()
        .map(|(i, name)| Team {
            id: i as u64 + 1,
            name: (*name).to_owned(),
            group: Some("A".to_owned()),
            feed_id: Some(i as u64 + 101),
        })
        .collect();
    let pairings = [(1, 2), (3, 4), (1, 3), (2, 4), (1, 4), (2, 3)];
    let mut matches: Vec<Match> = pairings
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let number = i as MatchNumber + 1;
            fixture_match(number, 1, Some(*pair), at(10 + i as u32 / 2, 15 + (i as u32 % 2) * 3))
        })
        .collect();
    let mut final_match = fixture_match(7, 2, None, at(15, 20));
    final_match.participants_rule = Some("A1-A2".to_owned());
    matches.push(final_match);

    Tournament {
        id: 1,
        name: "Mini Cup 2018".to_owned(),
        code: "WC2018".to_owned(),
        teams,
        groups: vec![Group { name: "A".to_owned(), team_ids: vec![1, 2, 3, 4] }],
        rounds: vec![
            Round { id: 1, name: "Group stage".to_owned(), is_group: true, is_overtime: false },
            Round { id: 2, name: "Final".to_owned(), is_group: false, is_overtime: true },
        ],
        matches,
    }
}

/// Austria 9 pts, Belgium and Croatia 4 pts (level head-to-head, Belgium ahead
/// on goal difference), Denmark 0.
pub fn play_group(tournament: &mut Tournament) {
    let results = [(2, 0), (1, 0), (3, 0), (2, 1), (1, 0), (1, 1)];
    for (i, (goals1, goals2)) in results.into_iter().enumerate() {
        tournament
            .find_match_mut(i as MatchNumber + 1)
            .expect("fixture match")
            .goals = Goals::full_time(goals1, goals2);
    }
}
