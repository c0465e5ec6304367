use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ofxkit_core::{DateTimeNormalizer, Zone, create_amount_from_str};
use std::io::{self, Write};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

use config::{Config, LoggingSection};

#[derive(Parser, Debug)]
#[command(
    name = "ofxkit",
    version,
    about = "Normalize raw OFX amount and date field values"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize raw amount strings such as `1.000,00` or `-1,000.00`
    Amount {
        #[arg(required = true, allow_hyphen_values = true)]
        raw: Vec<String>,
    },

    /// Normalize raw OFX dates such as `20081005082200.124[-5:EST]`
    Date {
        /// Zone for values without an offset (default: config `dates.timezone`)
        #[arg(long)]
        zone: Option<Zone>,

        #[arg(required = true)]
        raw: Vec<String>,
    },

    /// Manage ~/.ofxkit/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,

    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::Amount { raw } => {
            for r in &raw {
                println!("{r} -> {}", create_amount_from_str(r));
            }
        }

        Command::Date { zone, raw } => {
            let zone = effective_zone(zone, &config::load_config()?);
            debug!(%zone, "normalizing dates");
            let normalizer = DateTimeNormalizer::with_zone(zone);
            normalize_dates(&normalizer, &raw, &mut io::stdout().lock())?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!(
                    "{}",
                    toml::to_string_pretty(&cfg).context("serialize config")?
                );
            }
        },
    }

    Ok(())
}

fn init_logging() {
    let logging = logging_or_default(config::load_config());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Falls back to default logging when the config file can't be read.
fn logging_or_default(loaded: Result<Config>) -> LoggingSection {
    match loaded {
        Ok(cfg) => cfg.logging,
        Err(e) => {
            eprintln!("warning: {e:#}; using default logging");
            LoggingSection::default()
        }
    }
}

/// `--zone` wins over `dates.timezone`.
fn effective_zone(flag: Option<Zone>, cfg: &Config) -> Zone {
    flag.unwrap_or(cfg.dates.timezone)
}

/// Prints one line per input and fails afterwards if any of them did not normalize.
fn normalize_dates(
    normalizer: &DateTimeNormalizer,
    raw: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut failed = 0;
    for r in raw {
        match normalizer.normalize(r) {
            Ok(Some(dt)) => writeln!(out, "{r} -> {}", dt.to_rfc3339())?,
            Ok(None) => writeln!(out, "{r:?} -> (none)")?,
            Err(e) => {
                error!(raw = %r, "{e}");
                writeln!(out, "{r} -> error: {e}")?;
                failed += 1;
            }
        }
    }

    if failed > 0 {
        warn!(failed, total = raw.len(), "some dates were rejected");
        bail!("{failed} of {} dates could not be normalized", raw.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatesSection;

    fn cfg_with(zone: &str) -> Config {
        Config {
            dates: DatesSection {
                timezone: zone.parse().unwrap(),
            },
            ..Config::default()
        }
    }

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zone_flag_overrides_config() {
        let cfg = cfg_with("America/Chicago");
        assert_eq!(effective_zone(Some(Zone::Utc), &cfg), Zone::Utc);
        assert_eq!(
            effective_zone(None, &cfg),
            "America/Chicago".parse::<Zone>().unwrap()
        );
        assert_eq!(effective_zone(None, &Config::default()), Zone::Local);
    }

    #[test]
    fn test_broken_config_keeps_default_logging() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        std::fs::write(&p, "[dates\ntimezone = ").unwrap();

        let loaded = crate::config::load_config_from(&p);
        assert!(loaded.is_err());
        assert_eq!(logging_or_default(loaded), LoggingSection::default());
    }

    #[test]
    fn test_config_logging_filter_is_used() {
        let mut cfg = Config::default();
        cfg.logging.filter = "ofxkit_core=trace".to_string();
        assert_eq!(logging_or_default(Ok(cfg)).filter, "ofxkit_core=trace");
    }

    #[test]
    fn test_all_dates_normalized() {
        let normalizer = DateTimeNormalizer::with_zone(Zone::Utc);
        let mut out = Vec::new();
        normalize_dates(
            &normalizer,
            &raw(&["20081005082200.124[-5:EST]", "20081005"]),
            &mut out,
        )
        .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "20081005082200.124[-5:EST] -> 2008-10-05T13:22:00.124+00:00\n\
             20081005 -> 2008-10-05T00:00:00+00:00\n"
        );
    }

    #[test]
    fn test_mixed_batch_prints_every_row_then_fails() {
        let normalizer = DateTimeNormalizer::with_zone(Zone::Utc);
        let mut out = Vec::new();
        let err = normalize_dates(
            &normalizer,
            &raw(&["20081005132200", "", "2008-10-05", "20081305"]),
            &mut out,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "2 of 4 dates could not be normalized");

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "20081005132200 -> 2008-10-05T13:22:00+00:00");
        assert_eq!(lines[1], "\"\" -> (none)");
        assert!(lines[2].starts_with("2008-10-05 -> error: unrecognized OFX date"));
        assert!(lines[3].starts_with("20081305 -> error: date components out of range"));
    }
}
