use crate::loader::{load_bet_slips, load_feed, load_tournament, save_tournament};
use crate::report::{scores_report, standings_report, status_report, updates_report};
use crate::settings::AppSettings;
use anyhow::{Context, bail};
use cupcast_engine::Tournament;
use cupcast_engine::bets::{leaderboard, maximum_score};
use cupcast_engine::bracket::{BracketEngine, progress_until_stable};
use cupcast_engine::feed::update_match_results;
use cupcast_engine::{EngineError, EngineResult};
use log::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Standings { snapshot: String },
    Progress { snapshot: String, write: bool },
    Scores { snapshot: String, bets: String },
    Feed { snapshot: String, feed: String, write: bool },
    Status { snapshot: String },
}

impl Command {
    /// Parse `<command> [args]`, falling back to the configured snapshot where one may be omitted.
    pub fn parse(args: &[String], settings: &AppSettings) -> anyhow::Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("missing command");
        };
        let write = rest.iter().any(|a| a == "--write");
        let positional: Vec<&str> = rest.iter().map(String::as_str).filter(|a| *a != "--write").collect();
        if let Some(flag) = positional.iter().find(|a| a.starts_with('-')) {
            bail!("unknown option {flag}");
        }
        if write && !matches!(name.as_str(), "progress" | "feed") {
            bail!("--write is only accepted by progress and feed");
        }

        let snapshot_or_default = |given: Option<&&str>| -> anyhow::Result<String> {
            given
                .map(|s| (*s).to_owned())
                .or_else(|| settings.snapshot.clone())
                .context("no snapshot given (pass one or set CUPCAST_SNAPSHOT)")
        };
        let at_most = |count: usize| -> anyhow::Result<()> {
            if positional.len() > count {
                bail!("too many arguments for {name}");
            }
            Ok(())
        };

        let command = match name.as_str() {
            "standings" => {
                at_most(1)?;
                Command::Standings { snapshot: snapshot_or_default(positional.first())? }
            }
            "progress" => {
                at_most(1)?;
                Command::Progress { snapshot: snapshot_or_default(positional.first())?, write }
            }
            "status" => {
                at_most(1)?;
                Command::Status { snapshot: snapshot_or_default(positional.first())? }
            }
            "scores" => {
                at_most(2)?;
                let [snapshot, bets] = positional.as_slice() else {
                    bail!("usage: scores <snapshot> <bets.json>");
                };
                Command::Scores { snapshot: (*snapshot).to_owned(), bets: (*bets).to_owned() }
            }
            "feed" => {
                at_most(2)?;
                let [snapshot, feed] = positional.as_slice() else {
                    bail!("usage: feed <snapshot> <matchdata.json> [--write]");
                };
                Command::Feed { snapshot: (*snapshot).to_owned(), feed: (*feed).to_owned(), write }
            }
            other => bail!("unknown command {other:?}"),
        };
        Ok(command)
    }
}

pub struct App {
    settings: AppSettings,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self { settings }
    }

    /// Run a command and return the text to print.
    pub fn run(&self, command: &Command) -> anyhow::Result<String> {
        debug!("Running {command:?}");
        match command {
            Command::Standings { snapshot } => {
                let tournament = load_tournament(snapshot)?;
                Ok(self.standings(&tournament)?)
            }
            Command::Progress { snapshot, write } => {
                let mut tournament = load_tournament(snapshot)?;
                let output = self.progress(&mut tournament)?;
                if *write {
                    save_tournament(snapshot, &tournament)?;
                    info!("Snapshot written to {snapshot}");
                }
                Ok(output)
            }
            Command::Scores { snapshot, bets } => {
                let tournament = load_tournament(snapshot)?;
                let slips = load_bet_slips(bets)?;
                let maximum = match maximum_score(&tournament) {
                    Ok(maximum) => Some(maximum),
                    Err(EngineError::TournamentIncomplete(percent)) => {
                        debug!("No maximum score yet, tournament {percent}% complete");
                        None
                    }
                    Err(e) => return Err(e.into()),
                };
                Ok(scores_report(&leaderboard(&tournament, &slips), maximum))
            }
            Command::Feed { snapshot, feed, write } => {
                let mut tournament = load_tournament(snapshot)?;
                let records = load_feed(feed)?;
                let output = self.apply_feed(&mut tournament, &records)?;
                if *write {
                    save_tournament(snapshot, &tournament)?;
                    info!("Snapshot written to {snapshot}");
                }
                Ok(output)
            }
            Command::Status { snapshot } => {
                let tournament = load_tournament(snapshot)?;
                Ok(status_report(&tournament, self.settings.now())?)
            }
        }
    }

    fn standings(&self, tournament: &Tournament) -> EngineResult<String> {
        let engine = BracketEngine::new(tournament)?;
        Ok(standings_report(tournament, engine.rankings()))
    }

    fn progress(&self, tournament: &mut Tournament) -> EngineResult<String> {
        let updates = progress_until_stable(tournament)?;
        Ok(updates_report(tournament, &updates))
    }

    fn apply_feed(
        &self,
        tournament: &mut Tournament,
        records: &[cupcast_engine::feed::Matchdata],
    ) -> EngineResult<String> {
        let now = self.settings.now();
        let updated = update_match_results(tournament, records, &self.settings.feed_labels, now)?;
        let updates = progress_until_stable(tournament)?;
        let mut output = format!("{updated} matches updated from the feed\n");
        if !updates.is_empty() {
            output.push_str(&updates_report(tournament, &updates));
        }
        Ok(output)
    }
}
