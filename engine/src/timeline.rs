use crate::outcome::is_complete;
use crate::rule::ParticipantRule;
use crate::{EngineError, EngineResult, Match, Tournament};
use chrono::{Duration, NaiveDateTime};

pub const NORMAL_TIME_MINUTES: i64 = 105;
pub const EXTRA_TIME_MINUTES: i64 = 140;
pub const PENALTIES_MINUTES: i64 = 150;
pub const PENALTIES_WITHOUT_EXTRA_TIME_MINUTES: i64 = 115;

pub fn end_time(start: NaiveDateTime) -> NaiveDateTime {
    start + Duration::minutes(NORMAL_TIME_MINUTES)
}

pub fn extra_time_end(start: NaiveDateTime) -> NaiveDateTime {
    start + Duration::minutes(EXTRA_TIME_MINUTES)
}

pub fn penalties_end(start: NaiveDateTime) -> NaiveDateTime {
    start + Duration::minutes(PENALTIES_MINUTES)
}

pub fn penalties_without_extra_time_end(start: NaiveDateTime) -> NaiveDateTime {
    start + Duration::minutes(PENALTIES_WITHOUT_EXTRA_TIME_MINUTES)
}

pub fn is_match_complete(tournament: &Tournament, m: &Match) -> bool {
    is_complete(tournament.is_group_match(m), &m.goals)
}

/// End of a complete match according to the phases it went through.
pub fn finished_match_end_time(tournament: &Tournament, m: &Match) -> Option<NaiveDateTime> {
    if !is_match_complete(tournament, m) {
        return None;
    }
    if tournament.is_group_match(m) {
        return Some(end_time(m.start_time));
    }
    let end = if m.goals.penalty.is_some() {
        if tournament.is_overtime_match(m) {
            penalties_end(m.start_time)
        } else {
            penalties_without_extra_time_end(m.start_time)
        }
    } else if m.goals.extra.is_some() {
        extra_time_end(m.start_time)
    } else {
        end_time(m.start_time)
    };
    Some(end)
}

/// When the next missing result phase of a match is due, `None` once nothing is missing.
pub fn result_escalation_time(tournament: &Tournament, m: &Match) -> Option<NaiveDateTime> {
    let Some(normal) = m.goals.normal else {
        return Some(end_time(m.start_time));
    };
    if tournament.is_group_match(m) || normal.sign() != 0 {
        return None;
    }

    let overtime = tournament.is_overtime_match(m);
    match (m.goals.extra, m.goals.penalty) {
        (None, _) if overtime => Some(extra_time_end(m.start_time)),
        (Some(extra), None) if overtime && extra.sign() == 0 => Some(penalties_end(m.start_time)),
        (_, None) if !overtime => Some(penalties_without_extra_time_end(m.start_time)),
        _ => None,
    }
}

fn due_time(tournament: &Tournament, m: &Match) -> Option<NaiveDateTime> {
    if is_match_complete(tournament, m) {
        finished_match_end_time(tournament, m)
    } else {
        result_escalation_time(tournament, m)
    }
}

/// When a knockout match missing participants should have both of them.
///
/// That is the latest due time of its parent matches, or of every group match
/// of the groups its rule names.
pub fn participants_escalation_time(tournament: &Tournament, m: &Match) -> EngineResult<Option<NaiveDateTime>> {
    if m.has_teams() {
        return Ok(None);
    }
    if tournament.is_group_match(m) {
        return Err(EngineError::InconsistentSnapshot(format!(
            "group match #{} has no participants",
            m.number
        )));
    }
    let Some(text) = m.rule() else {
        return Ok(None);
    };
    let rule: ParticipantRule = text.parse()?;

    let mut latest: Option<NaiveDateTime> = None;
    if rule.is_knockout() {
        for reference in [&rule.team1, &rule.team2] {
            if let Some(parent) = reference.parent_match(tournament)? {
                latest = latest.max(due_time(tournament, parent));
            }
        }
    } else {
        for name in rule.group_names() {
            let group = tournament.group(&name).ok_or_else(|| {
                EngineError::InconsistentSnapshot(format!("participant rule names unknown group {name}"))
            })?;
            for group_match in tournament.group_matches(group) {
                latest = latest.max(due_time(tournament, group_match));
            }
        }
    }
    Ok(latest)
}

/// When a match should next be looked at, clamped to `now` once overdue.
pub fn trigger_start_time(
    tournament: &Tournament,
    m: &Match,
    now: NaiveDateTime,
) -> EngineResult<Option<NaiveDateTime>> {
    let trigger = if m.has_teams() {
        result_escalation_time(tournament, m)
    } else {
        participants_escalation_time(tournament, m)?
    };
    Ok(trigger.map(|t| t.max(now)))
}

/// Matches missing a participant or a final result, in kick-off order.
pub fn incomplete_matches(tournament: &Tournament) -> Vec<&Match> {
    tournament
        .matches_by_start_time()
        .into_iter()
        .filter(|m| !m.has_teams() || !is_match_complete(tournament, m))
        .collect()
}

/// Incomplete matches that are overdue at `now`.
pub fn escalated_incomplete_matches(tournament: &Tournament, now: NaiveDateTime) -> EngineResult<Vec<&Match>> {
    let mut escalated = Vec::new();
    for m in tournament.matches_by_start_time() {
        if trigger_start_time(tournament, m, now)? == Some(now) {
            escalated.push(m);
        }
    }
    Ok(escalated)
}

/// The incomplete match with the earliest trigger time.
pub fn first_incomplete_match(tournament: &Tournament, now: NaiveDateTime) -> EngineResult<Option<&Match>> {
    let mut first: Option<(NaiveDateTime, &Match)> = None;
    for m in tournament.matches_by_start_time() {
        if let Some(trigger) = trigger_start_time(tournament, m, now)?
            && first.is_none_or(|(earliest, _)| trigger < earliest)
        {
            first = Some((trigger, m));
        }
    }
    Ok(first.map(|(_, m)| m))
}

/// Share of matches with both participants and a final result, in whole percent.
pub fn completion_percent(tournament: &Tournament) -> u8 {
    let all = tournament.matches.len();
    if all == 0 {
        return 0;
    }
    let incomplete = incomplete_matches(tournament).len();
    ((all - incomplete) * 100 / all) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Goals;
    use crate::bracket::progress_until_stable;
    use crate::testing::*;

    fn match_no(tournament: &Tournament, number: u16) -> &Match {
        tournament.match_by_number(number).expect("fixture match")
    }

    fn with_teams(tournament: &mut Tournament, number: u16, team1: u64, team2: u64) {
        let m = tournament.find_match_mut(number).expect("fixture match");
        m.team1 = Some(team1);
        m.team2 = Some(team2);
    }

    #[test]
    fn phase_end_offsets() {
        let start = at(10, 18);
        assert_eq!(end_time(start), start + Duration::minutes(105));
        assert_eq!(extra_time_end(start), start + Duration::minutes(140));
        assert_eq!(penalties_end(start), start + Duration::minutes(150));
        assert_eq!(penalties_without_extra_time_end(start), start + Duration::minutes(115));
    }

    #[test]
    fn finished_end_time_follows_played_phases() {
        let mut t = three_group_tournament();
        with_teams(&mut t, 20, 5, 3);
        with_teams(&mut t, 25, 5, 7);
        let qf_start = match_no(&t, 20).start_time;

        assert_eq!(finished_match_end_time(&t, match_no(&t, 20)), None);
        set_result(&mut t, 20, Goals::full_time(2, 0));
        assert_eq!(finished_match_end_time(&t, match_no(&t, 20)), Some(end_time(qf_start)));
        set_result(&mut t, 20, Goals::full_time(1, 1).with_extra(2, 1));
        assert_eq!(finished_match_end_time(&t, match_no(&t, 20)), Some(extra_time_end(qf_start)));
        set_result(&mut t, 20, Goals::full_time(1, 1).with_extra(1, 1).with_penalty(4, 3));
        assert_eq!(finished_match_end_time(&t, match_no(&t, 20)), Some(penalties_end(qf_start)));

        let third_start = match_no(&t, 25).start_time;
        set_result(&mut t, 25, Goals::full_time(0, 0).with_penalty(4, 3));
        assert_eq!(
            finished_match_end_time(&t, match_no(&t, 25)),
            Some(penalties_without_extra_time_end(third_start))
        );
    }

    #[test]
    fn result_escalation_by_missing_phase() {
        let mut t = three_group_tournament();
        with_teams(&mut t, 20, 5, 3);
        with_teams(&mut t, 25, 5, 7);
        let start = match_no(&t, 20).start_time;

        assert_eq!(result_escalation_time(&t, match_no(&t, 1)), Some(end_time(match_no(&t, 1).start_time)));
        set_result(&mut t, 1, Goals::full_time(0, 0));
        assert_eq!(result_escalation_time(&t, match_no(&t, 1)), None);

        set_result(&mut t, 20, Goals::full_time(1, 1));
        assert_eq!(result_escalation_time(&t, match_no(&t, 20)), Some(extra_time_end(start)));
        set_result(&mut t, 20, Goals::full_time(1, 1).with_extra(2, 2));
        assert_eq!(result_escalation_time(&t, match_no(&t, 20)), Some(penalties_end(start)));
        set_result(&mut t, 20, Goals::full_time(1, 1).with_extra(3, 2));
        assert_eq!(result_escalation_time(&t, match_no(&t, 20)), None);

        let third_start = match_no(&t, 25).start_time;
        set_result(&mut t, 25, Goals::full_time(2, 2));
        assert_eq!(
            result_escalation_time(&t, match_no(&t, 25)),
            Some(penalties_without_extra_time_end(third_start))
        );
    }

    #[test]
    fn participants_escalation_waits_for_group_stage() {
        let t = three_group_tournament();
        // "A1-BC3" depends on every match of groups A, B and C; the last one kicks off June 15th 21:00
        let due = participants_escalation_time(&t, match_no(&t, 19)).expect("valid rule");
        assert_eq!(due, Some(end_time(at(15, 21))));
        // "C1-A2": last match of A is June 15th 15:00, of C June 15th 21:00
        let due = participants_escalation_time(&t, match_no(&t, 21)).expect("valid rule");
        assert_eq!(due, Some(end_time(at(15, 21))));
    }

    #[test]
    fn participants_escalation_follows_parent_matches() {
        let mut t = three_group_tournament();
        complete_group_stage(&mut t);
        progress_until_stable(&mut t).expect("valid rules");
        set_result(&mut t, 19, Goals::full_time(1, 1).with_extra(1, 1).with_penalty(3, 2));
        // W19-W20: 19 finished after penalties, 20 still due after normal time
        let due = participants_escalation_time(&t, match_no(&t, 23)).expect("valid rule");
        let m19 = match_no(&t, 19).start_time;
        let m20 = match_no(&t, 20).start_time;
        assert_eq!(due, Some(penalties_end(m19).max(end_time(m20))));
        assert_eq!(participants_escalation_time(&t, match_no(&t, 19)), Ok(None));
    }

    #[test]
    fn group_match_without_teams_is_inconsistent() {
        let mut t = three_group_tournament();
        t.find_match_mut(1).expect("group match").team1 = None;
        assert!(matches!(
            participants_escalation_time(&t, match_no(&t, 1)),
            Err(EngineError::InconsistentSnapshot(_))
        ));
    }

    #[test]
    fn trigger_is_clamped_to_now() {
        let t = three_group_tournament();
        let first = match_no(&t, 1);
        let early = at(1, 12);
        let late = at(20, 12);
        assert_eq!(trigger_start_time(&t, first, early), Ok(Some(end_time(first.start_time))));
        assert_eq!(trigger_start_time(&t, first, late), Ok(Some(late)));
    }

    #[test]
    fn escalated_and_first_incomplete_matches() {
        let mut t = three_group_tournament();
        let now = at(10, 20);
        // first match ended 16:45 and second 19:45 without results; the third ends 22:45
        let escalated: Vec<u16> = escalated_incomplete_matches(&t, now)
            .expect("valid rules")
            .iter()
            .map(|m| m.number)
            .collect();
        assert_eq!(escalated, vec![1, 2]);
        assert_eq!(first_incomplete_match(&t, now).expect("valid rules").map(|m| m.number), Some(1));

        set_result(&mut t, 1, Goals::full_time(1, 0));
        set_result(&mut t, 2, Goals::full_time(1, 0));
        assert!(escalated_incomplete_matches(&t, now).expect("valid rules").is_empty());
        assert_eq!(first_incomplete_match(&t, now).expect("valid rules").map(|m| m.number), Some(3));
    }

    #[test]
    fn completion_grows_with_results() {
        let mut t = three_group_tournament();
        assert_eq!(completion_percent(&t), 0);
        assert_eq!(incomplete_matches(&t).len(), 26);

        complete_group_stage(&mut t);
        // 18 of 26
        assert_eq!(completion_percent(&t), 69);

        for (number, goals) in knockout_results() {
            set_result(&mut t, number, goals);
        }
        progress_until_stable(&mut t).expect("valid rules");
        assert_eq!(completion_percent(&t), 100);
        assert!(first_incomplete_match(&t, at(30, 0)).expect("valid rules").is_none());
        assert_eq!(completion_percent(&Tournament::default()), 0);
    }
}
