//! WPStats CLI Application
//!
//! Command-line front end for the wpstats facade. It uses the wpstats library
//! and adds:
//! - Configuration loading (TOML)
//! - Concrete backends (log lines, JSON lines)
//! - Taxonomy listing

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use wpstats::{ClientRegistry, FeatureArea, Properties, PropertyValue, Stat, Stats};

mod backends;
mod config;
mod properties;

/// WPStats - Emit and inspect analytics stats
#[derive(Parser, Debug)]
#[command(name = "wpstats-cli")]
#[command(about = "Emit and inspect analytics stats", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (stats.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every stat with its ordinal and feature area
    List {
        /// Only list stats of this feature area
        #[arg(long)]
        area: Option<FeatureArea>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Track a stat through the configured backends
    Track {
        /// Stat name (see `list`)
        stat: Stat,

        /// Property to attach (can be repeated)
        #[arg(short = 'p', long = "prop", value_name = "KEY=VALUE", value_parser = properties::parse_property)]
        properties: Vec<(String, PropertyValue)>,

        /// Number of times to track the stat
        #[arg(long, default_value_t = 1)]
        repeat: usize,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("WPStats CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using wpstats library v{}", wpstats::VERSION);

    match &args.command {
        Some(Command::List { area, json }) => list_mode(*area, *json)?,
        Some(Command::Track {
            stat,
            properties,
            repeat,
        }) => track_mode(&args, *stat, properties, *repeat)?,
        None => {
            // No subcommand - show quick start
            println!("WPStats - No command specified");
            println!("\nQuick Start:");
            println!("  wpstats-cli list");
            println!("  wpstats-cli track reader_opened_article -p source=freshly_pressed");
            println!("\nWith a configuration file:");
            println!("  wpstats-cli --config stats.toml track application_opened");
            println!("\nUse --help for more options");
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StatRow {
    ordinal: u32,
    name: &'static str,
    area: FeatureArea,
}

/// List mode - print the taxonomy
fn list_mode(area: Option<FeatureArea>, json: bool) -> Result<()> {
    let rows: Vec<StatRow> = Stat::ALL
        .iter()
        .filter(|stat| area.map_or(true, |area| stat.area() == area))
        .map(|stat| StatRow {
            ordinal: stat.ordinal(),
            name: stat.name(),
            area: stat.area(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>4}  {:<42} {}", "#", "STAT", "AREA");
    for row in &rows {
        println!("{:>4}  {:<42} {}", row.ordinal, row.name, row.area);
    }
    println!("\n{} stat(s)", rows.len());

    Ok(())
}

/// Track mode - register the configured backend and dispatch
fn track_mode(
    args: &Args,
    stat: Stat,
    properties: &[(String, PropertyValue)],
    repeat: usize,
) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };
    log::debug!("Configuration: {:?}", config);

    let registry = Arc::new(ClientRegistry::new());
    match config::build_client(&config.backends)? {
        Some(client) => registry.register(client),
        None => log::warn!("No backends enabled, stats will be dropped"),
    }

    let stats = Stats::with_config(registry, config.stats);

    // No -p flags means no property bag at all, not an empty one
    let bag: Option<Properties> = if properties.is_empty() {
        None
    } else {
        Some(properties.iter().cloned().collect())
    };

    for _ in 0..repeat {
        match &bag {
            Some(bag) => stats.track_with_properties(stat, bag),
            None => stats.track(stat),
        }
    }

    log::info!("Tracked {} x{}", stat, repeat);
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_command() {
        let args = Args::try_parse_from([
            "wpstats-cli",
            "-v",
            "track",
            "reader_opened_article",
            "-p",
            "source=freshly_pressed",
            "--prop",
            "position=3",
            "--repeat",
            "2",
        ])
        .unwrap();

        assert_eq!(args.verbose, 1);
        match args.command {
            Some(Command::Track {
                stat,
                properties,
                repeat,
            }) => {
                assert_eq!(stat, Stat::ReaderOpenedArticle);
                assert_eq!(repeat, 2);
                assert_eq!(properties.len(), 2);
                assert_eq!(properties[1], ("position".to_string(), PropertyValue::Int(3)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_stat_is_rejected() {
        let result = Args::try_parse_from(["wpstats-cli", "track", "reader_disliked_article"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stat_and_area_names_ignore_case() {
        let args = Args::try_parse_from(["wpstats-cli", "track", "Reader_Opened_Article"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Track { stat: Stat::ReaderOpenedArticle, .. })
        ));

        let args = Args::try_parse_from(["wpstats-cli", "list", "--area", "Reader"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::List { area: Some(FeatureArea::Reader), .. })
        ));
    }

    #[test]
    fn test_parse_list_command() {
        let args =
            Args::try_parse_from(["wpstats-cli", "list", "--area", "reader", "--json"]).unwrap();
        match args.command {
            Some(Command::List { area, json }) => {
                assert_eq!(area, Some(FeatureArea::Reader));
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
