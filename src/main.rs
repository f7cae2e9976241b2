mod config;
mod engine;
mod ephemeris;
mod events;
mod frames;
mod propagate;
mod time;

#[cfg(test)]
mod testing;

use chrono::{Datelike, NaiveDateTime, Timelike};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{Config, EphemerisConfig, SearchSettings, TimeConfig};
use crate::engine::Engine;
use crate::ephemeris::{load, Format, LoadOptions, Source};
use crate::events::EventError;
use crate::frames::{Observer, TopocentricView};
use crate::time::{localize, to_epoch, CalendarFields, CivilTimestamp, Epoch, Zone};

const NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "sat-sightings")]
#[command(about = "Satellite visibility: sub-points, look angles and passes")]
struct Cli {
    /// Config file; optional when --ephemeris is given
    #[arg(long, short, default_value = "config.yaml")]
    config: PathBuf,
    /// Ephemeris file, overrides the config
    #[arg(long, short)]
    ephemeris: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an ephemeris file and print its summary
    Validate {
        path: PathBuf,
        #[arg(long)]
        format: Option<Format>,
    },
    /// Point on the ground beneath the satellite
    Subpoint {
        /// Seconds from now
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
        /// Absolute time instead of now + offset
        #[arg(long)]
        at: Option<String>,
    },
    /// Azimuth, elevation and range from an observer
    Look {
        #[command(flatten)]
        site: SiteArgs,
        #[arg(long)]
        at: Option<String>,
    },
    /// Next complete pass over an observer
    NextPass {
        #[command(flatten)]
        site: SiteArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Every complete pass in the window
    Passes {
        #[command(flatten)]
        site: SiteArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args)]
struct SiteArgs {
    /// "lat,lon" or "lat,lon,elevation_m"; defaults to the configured observer
    #[arg(long, allow_hyphen_values = true)]
    observer: Option<String>,
    /// IANA zone for local times
    #[arg(long)]
    zone: Option<Zone>,
}

#[derive(Args)]
struct SearchArgs {
    /// Search window, e.g. 24h or 90m
    #[arg(long)]
    window: Option<humantime::Duration>,
    /// Minimum elevation in degrees
    #[arg(long, allow_hyphen_values = true)]
    threshold: Option<f64>,
    /// Window start: RFC 3339, or "YYYY-MM-DD HH:MM[:SS]" in the zone
    #[arg(long)]
    from: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Validate { path, format } => validate(path, *format),
        command => load_config(&cli).and_then(|config| run(&config, command)),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path, format: Option<Format>) -> Result<ExitCode, String> {
    let options = LoadOptions {
        format,
        norad_id: None,
    };
    let ephemeris = load(Source::Path(path), &options).map_err(|e| e.to_string())?;
    print_json(&ephemeris.summary())
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match (cli.config.exists(), &cli.ephemeris) {
        (true, _) => Config::from_file(&cli.config).map_err(|e| e.to_string())?,
        (false, Some(path)) => Config {
            ephemeris: EphemerisConfig {
                path: path.clone(),
                format: None,
                norad_id: None,
            },
            observer: None,
            search: SearchSettings::default(),
            time: TimeConfig::default(),
        },
        (false, None) => {
            return Err(format!(
                "config file {} not found and no --ephemeris given",
                cli.config.display()
            ))
        }
    };
    if let Some(path) = &cli.ephemeris {
        config.ephemeris.path = path.clone();
        config.ephemeris.format = None;
    }
    Ok(config)
}

fn run(config: &Config, command: &Commands) -> Result<ExitCode, String> {
    let engine = Engine::load_ephemeris(
        Source::Path(&config.ephemeris.path),
        &config.load_options(),
        config.search.finder,
    )
    .map_err(|e| e.to_string())?;

    match command {
        Commands::Validate { path, format } => validate(path, *format),
        Commands::Subpoint { offset, at } => {
            let sub_point = match at {
                Some(text) => engine.sub_point_at(parse_time(text, config.time.zone)?),
                None => engine.sub_point_now(*offset),
            }
            .map_err(|e| e.to_string())?;
            print_json(&sub_point)
        }
        Commands::Look { site, at } => {
            let zone = site.zone.unwrap_or(config.time.zone);
            let observer = resolve_observer(config, site)?;
            let epoch = match at {
                Some(text) => parse_time(text, zone)?,
                None => Epoch::now(),
            };
            let view = engine.look_at(&observer, epoch).map_err(|e| e.to_string())?;
            print_json(&LookOutput {
                observer,
                local: localize(view.at, zone),
                view,
            })
        }
        Commands::NextPass { site, search } => {
            let query = PassQuery::resolve(config, site, search)?;
            let (observer, hours, threshold) =
                (&query.observer, query.window_hours, query.threshold_deg);
            let result = match query.start {
                Some(start) => engine.next_pass_from(start, observer, hours, threshold),
                None => engine.next_pass(observer, hours, threshold),
            };
            match result {
                Ok(pass) => print_json(&Engine::localize_pass(&pass, query.zone)),
                Err(EventError::NoPassFound) => Ok(query.not_found()),
                Err(e) => Err(e.to_string()),
            }
        }
        Commands::Passes { site, search } => {
            let query = PassQuery::resolve(config, site, search)?;
            let (observer, hours, threshold) =
                (&query.observer, query.window_hours, query.threshold_deg);
            let passes = match query.start {
                Some(start) => engine.passes_from(start, observer, hours, threshold),
                None => engine.passes(observer, hours, threshold),
            }
            .map_err(|e| e.to_string())?;
            if passes.is_empty() {
                return Ok(query.not_found());
            }
            let localized: Vec<_> = passes
                .iter()
                .map(|pass| Engine::localize_pass(pass, query.zone))
                .collect();
            print_json(&localized)
        }
    }
}

#[derive(Serialize)]
struct LookOutput {
    observer: Observer,
    view: TopocentricView,
    local: CivilTimestamp,
}

struct PassQuery {
    observer: Observer,
    zone: Zone,
    /// `None` searches from now.
    start: Option<Epoch>,
    window_hours: f64,
    threshold_deg: f64,
}

impl PassQuery {
    fn resolve(config: &Config, site: &SiteArgs, search: &SearchArgs) -> Result<Self, String> {
        let zone = site.zone.unwrap_or(config.time.zone);
        let start = match &search.from {
            Some(text) => Some(parse_time(text, zone)?),
            None => None,
        };
        let window = search
            .window
            .as_deref()
            .copied()
            .unwrap_or(config.search.window);
        Ok(Self {
            observer: resolve_observer(config, site)?,
            zone,
            start,
            window_hours: window.as_secs_f64() / 3600.0,
            threshold_deg: search
                .threshold
                .unwrap_or(config.search.finder.threshold_deg),
        })
    }

    fn not_found(&self) -> ExitCode {
        eprintln!(
            "No pass above {} deg within {} hours of {}",
            self.threshold_deg,
            self.window_hours,
            localize(self.start.unwrap_or_else(Epoch::now), self.zone)
        );
        ExitCode::from(NOT_FOUND)
    }
}

fn resolve_observer(config: &Config, site: &SiteArgs) -> Result<Observer, String> {
    match &site.observer {
        Some(text) => Observer::from_coordinates(text)
            .ok_or_else(|| format!("invalid observer coordinates '{}'", text)),
        None => config
            .observer()
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "no observer configured; pass --observer lat,lon".to_string()),
    }
}

/// RFC 3339 / UTC first, then a civil time in `zone`.
fn parse_time(text: &str, zone: Zone) -> Result<Epoch, String> {
    if let Ok(epoch) = Epoch::parse_utc(text) {
        return Ok(epoch);
    }
    let local = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
        .ok_or_else(|| format!("cannot parse time '{}'", text))?;
    let fields = CalendarFields {
        year: local.year(),
        month: local.month(),
        day: local.day(),
        hour: local.hour(),
        minute: local.minute(),
        second: f64::from(local.second()),
    };
    to_epoch(fields, zone).map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode, String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(ExitCode::SUCCESS)
}
