use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_bridge::config::{BridgeConfig, ConfigError};
use transit_bridge::graph::{GraphError, Identity, MemoryGraph};
use transit_bridge::schedule::{Network, ScheduleError, ScheduleExtractor, TransitSchedule};

#[derive(Parser, Debug)]
#[command(
    name = "transit-bridge",
    version,
    about = "Export a trip-planner graph as a simulation network and transit schedule",
    long_about = "Reads a planning graph, keeps the trips that run on the configured day \
                  and writes the schedule and network as JSON to stdout.\n\n\
                  Set RUST_LOG to change the log level (default info)."
)]
struct Args {
    /// Planning graph JSON file
    graph: PathBuf,

    /// Bridge configuration JSON file; without one, today is simulated in UTC
    config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid graph {}: {source}", .path.display())]
    Graph { path: PathBuf, source: GraphError },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("extraction failed: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// What goes to stdout.
#[derive(Serialize)]
struct Output<'a> {
    schedule: &'a TransitSchedule,
    network: &'a Network,
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_graph(path: &Path) -> Result<MemoryGraph, CliError> {
    MemoryGraph::from_json_str(&read(path)?).map_err(|source| CliError::Graph {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the config file, or simulates today in UTC without one.
fn load_config(path: Option<&Path>) -> Result<BridgeConfig, CliError> {
    match path {
        Some(path) => Ok(BridgeConfig::from_json_str(&read(path)?)?),
        None => {
            let today = chrono::Utc::now().date_naive();
            let config = BridgeConfig::new(today.format("%Y-%m-%d").to_string(), "UTC");
            config.validate()?;
            Ok(config)
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let graph = load_graph(&args.graph)?;
    let filter = config.calendar_filter()?;
    let active = filter.active_services(&graph);
    info!(
        date = %config.date,
        time_zone = %config.time_zone,
        current = active.current.len(),
        following = active.following.len(),
        previous = active.previous.len(),
        "active services"
    );

    let extraction = ScheduleExtractor::new(&graph, Identity, active, config.pseudo_network).run()?;
    let report = &extraction.report;
    info!(
        nodes = report.nodes,
        links = report.links,
        facilities = report.facilities,
        lines = report.lines,
        routes = report.routes,
        departures = report.departures,
        skipped_patterns = report.skipped_patterns.len(),
        skipped_trips = report.skipped_trips.len(),
        "extraction finished"
    );

    let output = Output {
        schedule: &extraction.schedule,
        network: &extraction.network,
    };
    serde_json::to_writer(std::io::stdout().lock(), &output)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "transit-bridge failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use transit_bridge::domain::TransitMode;
    use transit_bridge::graph::{GraphBuilder, PatternSpec, PlanningGraph};

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_graph_from_file() {
        let mut b = GraphBuilder::new();
        b.transit_stop("A", 0.0, 0.0).unwrap();
        b.transit_stop("B", 500.0, 0.0).unwrap();
        b.pattern(PatternSpec::new("P1", "L1", TransitMode::Bus, &["A", "B"]))
            .unwrap();
        b.trip("P1", "T1", "wk", &[0, 300], &[0, 300]).unwrap();
        let json = b.build().unwrap().to_json_string().unwrap();

        let file = write_temp(&json);
        let graph = load_graph(file.path()).unwrap();
        assert_eq!(graph.pattern(&"P1".into()).unwrap().trips.len(), 1);
    }

    #[test]
    fn reports_bad_graph_and_missing_file() {
        let file = write_temp("{not json");
        assert!(matches!(load_graph(file.path()), Err(CliError::Graph { .. })));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("graph.json");
        assert!(matches!(load_graph(&missing), Err(CliError::Read { .. })));
    }

    #[test]
    fn loads_config_from_file() {
        let file = write_temp(r#"{"date": "2024-05-02", "time_zone": "Europe/Berlin"}"#);
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.date, "2024-05-02");

        let file = write_temp(r#"{"date": "2024-05-02", "alternatives": 0}"#);
        assert!(matches!(
            load_config(Some(file.path())),
            Err(CliError::Config(ConfigError::NoAlternatives))
        ));
        assert!(load_config(None).is_ok());
    }

    #[test]
    fn parses_graph_and_optional_config() {
        let args = Args::try_parse_from(["transit-bridge", "graph.json"]).unwrap();
        assert_eq!(args.graph, PathBuf::from("graph.json"));
        assert_eq!(args.config, None);

        let args = Args::try_parse_from(["transit-bridge", "graph.json", "day.json"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("day.json")));
    }

    #[test]
    fn rejects_wrong_argument_count() {
        assert!(Args::try_parse_from(["transit-bridge"]).is_err());
        assert!(Args::try_parse_from(["transit-bridge", "a", "b", "c"]).is_err());
    }

    #[test]
    fn run_reports_missing_graph() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            graph: dir.path().join("graph.json"),
            config: None,
        };
        assert!(matches!(run(&args), Err(CliError::Read { .. })));
    }
}
