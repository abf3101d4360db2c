use anyhow::{Context, bail};
use chrono::{Local, NaiveDateTime};
use cupcast_engine::feed::ResultLabels;
use log::LevelFilter;

pub const NOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    /// Overrides `RUST_LOG` when set.
    pub log_level: Option<LevelFilter>,
    /// Snapshot used when a command is given none.
    pub snapshot: Option<String>,
    /// Fixed "actual date-time"; the local clock when unset.
    pub now: Option<NaiveDateTime>,
    pub feed_labels: ResultLabels,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: None,
            snapshot: None,
            now: None,
            feed_labels: ResultLabels::default(),
        }
    }
}

impl AppSettings {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(level) = value("CUPCAST_LOG") {
            settings.log_level = Some(
                level
                    .parse()
                    .with_context(|| format!("CUPCAST_LOG: unknown log level {level:?}"))?,
            );
        }
        settings.snapshot = value("CUPCAST_SNAPSHOT");
        if let Some(now) = value("CUPCAST_NOW") {
            settings.now = Some(
                NaiveDateTime::parse_from_str(&now, NOW_FORMAT)
                    .with_context(|| format!("CUPCAST_NOW: expected YYYY-MM-DDTHH:MM:SS, got {now:?}"))?,
            );
        }
        if let Some(labels) = value("CUPCAST_FEED_LABELS") {
            settings.feed_labels = parse_feed_labels(&labels)?;
        }
        Ok(settings)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// `normal,normal_extra,extra,penalty`, empty entries for labels the feed does not use.
fn parse_feed_labels(text: &str) -> anyhow::Result<ResultLabels> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [normal, normal_extra, extra, penalty] = parts.as_slice() else {
        bail!("CUPCAST_FEED_LABELS: expected 4 comma-separated labels, got {}", parts.len());
    };
    if normal.is_empty() {
        bail!("CUPCAST_FEED_LABELS: the normal time label cannot be empty");
    }
    let optional = |label: &str| (!label.is_empty()).then(|| label.to_owned());
    Ok(ResultLabels {
        normal: (*normal).to_owned(),
        normal_extra: optional(normal_extra),
        extra: optional(extra),
        penalty: optional(penalty),
    })
}
