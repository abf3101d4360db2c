use chrono::NaiveDateTime;
use cupcast_engine::bracket::ParticipantUpdate;
use cupcast_engine::outcome::Side;
use cupcast_engine::rule::ParticipantRule;
use cupcast_engine::standings::{GroupRanking, GroupStanding};
use cupcast_engine::timeline::{
    completion_percent, escalated_incomplete_matches, first_incomplete_match, trigger_start_time,
};
use cupcast_engine::{EngineResult, Goals, Match, TeamId, Tournament};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Columns reserved for a team name; longer names are cut.
const NAME_WIDTH: usize = 14;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

fn fit(name: &str, width: usize) -> String {
    let cut: String = name.chars().take(width).collect();
    format!("{cut:<width$}")
}

/// Team name, or the rule reference that will decide the slot ("A1", "W49").
fn participant(tournament: &Tournament, m: &Match, side: Side) -> String {
    let team = match side {
        Side::Team1 => m.team1,
        Side::Team2 => m.team2,
    };
    if let Some(team_id) = team {
        return tournament.team_name(team_id).to_owned();
    }
    m.rule()
        .and_then(|text| text.parse::<ParticipantRule>().ok())
        .map(|rule| rule.reference(side).to_string())
        .unwrap_or_else(|| "TBD".to_owned())
}

/// `2-1`, `1-1 aet 2-1`, `1-1 aet 1-1 pen 4-3`; empty before kick-off.
pub fn format_goals(goals: &Goals) -> String {
    let Some(normal) = goals.normal else {
        return String::new();
    };
    let mut out = format!("{}-{}", normal.team1, normal.team2);
    if let Some(extra) = goals.extra {
        out.push_str(&format!(" aet {}-{}", extra.team1, extra.team2));
    }
    if let Some(penalty) = goals.penalty {
        out.push_str(&format!(" pen {}-{}", penalty.team1, penalty.team2));
    }
    out
}

pub fn format_match_line(tournament: &Tournament, m: &Match) -> String {
    let line = format!(
        "#{:<3} {} - {} {}",
        m.number,
        fit(&participant(tournament, m, Side::Team1), NAME_WIDTH),
        fit(&participant(tournament, m, Side::Team2), NAME_WIDTH),
        format_goals(&m.goals)
    );
    line.trim_end().to_owned()
}

fn format_standing_row(tournament: &Tournament, standing: &GroupStanding) -> String {
    let r = &standing.record;
    format!(
        "{:>2}. {} {:>2} {:>2} {:>2} {:>2} {:>3}:{:<3} {:>+4} {:>3}",
        standing.position,
        fit(tournament.team_name(standing.team_id), NAME_WIDTH),
        r.played,
        r.won,
        r.drawn,
        r.lost,
        r.goals_for,
        r.goals_against,
        r.goal_difference(),
        r.points
    )
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Every line newline-terminated.
fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

pub fn standings_report(tournament: &Tournament, rankings: &[GroupRanking]) -> String {
    let mut lines = Vec::new();
    for ranking in rankings {
        let mut title = format!("Group {}", ranking.group);
        if !ranking.is_finished() {
            title.push_str(" (in progress)");
        }
        if ranking.has_equal_rankings {
            title.push_str(" (tied positions)");
        }
        lines.push(title);
        lines.push(format!(
            "    {} {:>2} {:>2} {:>2} {:>2} {:>7} {:>4} {:>3}",
            fit("Team", NAME_WIDTH),
            "P",
            "W",
            "D",
            "L",
            "Goals",
            "GD",
            "Pts"
        ));
        lines.extend(ranking.standings.iter().map(|s| format_standing_row(tournament, s)));
        lines.push(String::new());
    }
    join_lines(&lines)
}

pub fn updates_report(tournament: &Tournament, updates: &[ParticipantUpdate]) -> String {
    if updates.is_empty() {
        return "No participant updates\n".to_owned();
    }
    let name = |team: Option<TeamId>| team.map_or("TBD", |id| tournament.team_name(id)).to_owned();
    let lines: Vec<String> = updates
        .iter()
        .map(|update| {
            let rule = tournament
                .match_by_number(update.match_number)
                .and_then(Match::rule)
                .unwrap_or("");
            format!(
                "#{:<3} {:<8} {} - {}",
                update.match_number,
                rule,
                fit(&name(update.team1), NAME_WIDTH),
                name(update.team2)
            )
        })
        .collect();
    join_lines(&lines)
}

/// Users with their totals, already ordered best first. Equal totals share a rank.
pub fn scores_report(rows: &[(&str, u32)], maximum: Option<u32>) -> String {
    let mut lines = Vec::new();
    let mut rank = 0;
    for (i, (user, points)) in rows.iter().enumerate() {
        if i == 0 || rows[i - 1].1 != *points {
            rank = i + 1;
        }
        lines.push(format!("{rank:>3}. {} {points:>4}", fit(user, NAME_WIDTH)));
    }
    if let Some(maximum) = maximum {
        lines.push(format!("Maximum reachable: {maximum}"));
    }
    join_lines(&lines)
}

pub fn status_report(tournament: &Tournament, now: NaiveDateTime) -> EngineResult<String> {
    let mut lines = vec![
        format!("{} ({})", tournament.name, tournament.code),
        format!("Now:        {}", now.format(TIME_FORMAT)),
        format!("Completion: {}%", completion_percent(tournament)),
    ];

    match first_incomplete_match(tournament, now)? {
        Some(m) => {
            let due = trigger_start_time(tournament, m, now)?
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default();
            lines.push(format!("Next due:   {} (at {due})", format_match_line(tournament, m)));
        }
        None => lines.push("Next due:   none".to_owned()),
    }

    let escalated = escalated_incomplete_matches(tournament, now)?;
    if escalated.is_empty() {
        lines.push("Overdue:    none".to_owned());
    } else {
        lines.push("Overdue:".to_owned());
        lines.extend(escalated.into_iter().map(|m| format!("  {}", format_match_line(tournament, m))));
    }
    Ok(join_lines(&lines))
}
