use anyhow::{Context, bail};
use cupcast_engine::Tournament;
use cupcast_engine::bets::BetSlip;
use cupcast_engine::feed::{Matchdata, parse_matchdata};
use serde::de::DeserializeOwned;
use std::path::Path;

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn read_source(source: &str) -> anyhow::Result<String> {
    if is_remote(source) {
        reqwest::blocking::get(source)
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("{source}: fetch failed"))?
            .text()
            .with_context(|| format!("{source}: read body failed"))
    } else {
        std::fs::read_to_string(source).with_context(|| format!("{source}: read failed"))
    }
}

fn load_json<T: DeserializeOwned>(source: &str, what: &str) -> anyhow::Result<T> {
    let content = read_source(source)?;
    serde_json::from_str(&content).with_context(|| format!("{source}: invalid {what} json"))
}

pub fn load_tournament(source: &str) -> anyhow::Result<Tournament> {
    load_json(source, "tournament")
}

pub fn load_bet_slips(source: &str) -> anyhow::Result<Vec<BetSlip>> {
    load_json(source, "bets")
}

pub fn load_feed(source: &str) -> anyhow::Result<Vec<Matchdata>> {
    let content = read_source(source)?;
    parse_matchdata(&content).with_context(|| format!("{source}: invalid matchdata json"))
}

pub fn save_tournament(target: &str, tournament: &Tournament) -> anyhow::Result<()> {
    if is_remote(target) {
        bail!("{target}: cannot write a snapshot back to a URL");
    }
    let path = Path::new(target);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("{target}: create dir failed"))?;
    }
    let payload = serde_json::to_string_pretty(tournament).context("serialize snapshot failed")?;
    std::fs::write(path, payload).with_context(|| format!("{target}: write failed"))
}
