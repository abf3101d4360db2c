mod app;
mod loader;
mod report;
mod settings;
#[cfg(test)]
mod testing;

use crate::app::{App, Command};
use crate::settings::AppSettings;
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = AppSettings::load()?;
    logger(std::env::var("RUST_LOG").ok().as_deref(), settings.log_level).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args, &settings) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    let output = App::new(settings).run(&command)?;
    print!("{output}");
    Ok(())
}

/// `RUST_LOG` filters (default warn) unless `CUPCAST_LOG` gave a level, which wins.
fn logger(rust_log: Option<&str>, level: Option<LevelFilter>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(rust_log.unwrap_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        println!("{}", usage_text());
        return true;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("cupcast {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => false,
    }
}

fn usage_text() -> &'static str {
    "cupcast - football tournament brackets, standings and bet scores

Usage:
  cupcast standings [snapshot]
  cupcast progress [snapshot] [--write]
  cupcast scores <snapshot> <bets.json>
  cupcast feed <snapshot> <matchdata.json> [--write]
  cupcast status [snapshot]
  cupcast --help
  cupcast --version

Snapshots, bets and feeds may be local paths or http(s) URLs.

Environment:
  CUPCAST_SNAPSHOT     Snapshot used when a command is given none
  CUPCAST_NOW          Actual date-time as YYYY-MM-DDTHH:MM:SS (default: local clock)
  CUPCAST_LOG          Log level: off, error, warn, info, debug, trace (default warn)
  CUPCAST_FEED_LABELS  Feed result names: normal,normal-extra,extra,penalty"
}
