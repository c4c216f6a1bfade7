use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{RecoveryMode, SimulationConfig, REFERENCE_VACCINATION_ORDER};
use crate::error::SimulationError;
use crate::log::{info, set_log_level, warn, LevelFilter};
use crate::report::{PoolReport, Reports};
use crate::simulation::{DailyTotals, Simulation};
use clap::{Args, Command, FromArgMatches as _};

/// Default cli arguments for the vaxpool runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Optional path for a JSON simulation config. Runs the reference scenario when omitted
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional path for report output. No CSV files are written when omitted
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Number of days to simulate. Defaults to the config's `max_days`
    #[arg(short, long)]
    pub days: Option<usize>,

    /// Age bands to vaccinate in priority order, e.g. `70,0,10,20`
    #[arg(short, long, value_delimiter = ',')]
    pub vaccination_order: Option<Vec<u32>>,

    /// Where recovered unvaccinated people end up
    #[arg(short, long, value_enum)]
    pub recovery_mode: Option<RecoveryMode>,

    /// Also write one row per pool per day to `pool_report.csv`
    #[arg(long)]
    pub pool_report: bool,

    /// Enable logging at the given level (off, error, warn, info, debug, trace)
    #[arg(short, long)]
    pub log_level: Option<LevelFilter>,
}

fn create_vaxpool_cli() -> Command {
    let cli = Command::new("vaxpool").about("Deterministic vaccination and infection pool model");
    BaseArgs::augment_args(cli)
}

/// Parses the command line, runs the simulation and prints the daily report to stdout.
///
/// # Errors
/// Returns an error if argument parsing, configuration or report output fails
pub fn run_with_args() -> Result<Simulation, Box<dyn std::error::Error>> {
    let cli = create_vaxpool_cli();
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    let mut stdout = std::io::stdout().lock();
    Ok(run_with_args_internal(&base_args_matches, &mut stdout)?)
}

/// Resolves the configuration the arguments describe: the config file (or the reference
/// scenario) with command line overrides applied.
///
/// # Errors
/// Returns a `SimulationError` if the file cannot be loaded or the result does not validate
pub fn build_config(args: &BaseArgs) -> Result<SimulationConfig, SimulationError> {
    let mut config = if args.config.is_empty() {
        SimulationConfig::reference_scenario(REFERENCE_VACCINATION_ORDER.to_vec())
    } else {
        info!("Loading configuration from: {}", args.config);
        SimulationConfig::load(Path::new(&args.config))?
    };

    if let Some(order) = &args.vaccination_order {
        config.vaccination_order.clone_from(order);
    }
    if let Some(recovery_mode) = args.recovery_mode {
        config.recovery_mode = recovery_mode;
    }
    if let Some(days) = args.days {
        config.max_days = days;
    }

    config.validate()?;
    Ok(config)
}

fn run_with_args_internal<W: Write>(
    args: &BaseArgs,
    out: &mut W,
) -> Result<Simulation, SimulationError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let config = build_config(args)?;
    let mut simulation = Simulation::new(&config)?;

    // Optionally set output dir for reports
    let mut reports = Reports::new();
    if args.output_dir.is_empty() {
        if args.pool_report {
            warn!("--pool-report has no effect without --output-dir");
        }
    } else {
        reports.directory(PathBuf::from(&args.output_dir));
        reports.add_report::<DailyTotals>("daily_totals")?;
        if args.pool_report {
            reports.add_report::<PoolReport>("pool_report")?;
        }
    }

    let start = Instant::now();
    for _ in 0..config.max_days {
        let totals = simulation.step();
        writeln!(
            out,
            "Day: {}\tInfected: {}\tDead: {}",
            totals.day, totals.infected, totals.dead
        )?;
        info!(
            "Day {}: {} infected, {} dead, {} doses given",
            totals.day, totals.infected, totals.dead, totals.doses
        );

        if reports.has_report::<DailyTotals>() {
            reports.send_report(&totals)?;
        }
        if reports.has_report::<PoolReport>() {
            for row in PoolReport::from_groups(totals.day, simulation.groups()) {
                reports.send_report(&row)?;
            }
        }
    }

    info!(
        "Simulated {} days in {}",
        config.max_days,
        humantime::format_duration(start.elapsed())
    );
    let instabilities = simulation.instabilities().len();
    if instabilities > 0 {
        warn!("{instabilities} numeric instabilities were detected");
    }
    Ok(simulation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use tempfile::tempdir;

    fn default_args() -> BaseArgs {
        BaseArgs {
            config: String::new(),
            output_dir: String::new(),
            days: None,
            vaccination_order: None,
            recovery_mode: None,
            pool_report: false,
            log_level: None,
        }
    }

    #[test]
    fn test_run_reference_scenario() {
        let test_args = BaseArgs {
            days: Some(3),
            ..default_args()
        };
        let mut out = Vec::new();
        let simulation = run_with_args_internal(&test_args, &mut out).unwrap();
        assert_eq!(simulation.day(), 3);
        assert_eq!(simulation.vaccination_order(), &REFERENCE_VACCINATION_ORDER);

        let stdout = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Day: 1\tInfected: "));
        assert!(lines[2].starts_with("Day: 3\tInfected: "));
    }

    #[test]
    fn test_run_with_config_path() {
        let test_args = BaseArgs {
            config: "tests/data/reference_scenario.json".to_string(),
            days: Some(1),
            ..default_args()
        };
        let mut out = Vec::new();
        let simulation = run_with_args_internal(&test_args, &mut out).unwrap();
        assert_almost_eq!(simulation.get_total_infections(), 117.893_838_054, 1e-6);
        assert_almost_eq!(simulation.get_total_deaths(), 0.1774, 1e-6);
    }

    #[test]
    fn test_days_default_to_config() {
        let config = build_config(&default_args()).unwrap();
        assert_eq!(config.max_days, 100);
        assert_eq!(config.recovery_mode, RecoveryMode::Overwrite);
    }

    #[test]
    fn test_overrides_are_applied() {
        let test_args = BaseArgs {
            days: Some(7),
            vaccination_order: Some(vec![0, 10, 70, 20]),
            recovery_mode: Some(RecoveryMode::Accumulate),
            ..default_args()
        };
        let config = build_config(&test_args).unwrap();
        assert_eq!(config.max_days, 7);
        assert_eq!(config.vaccination_order, vec![0, 10, 70, 20]);
        assert_eq!(config.recovery_mode, RecoveryMode::Accumulate);
    }

    #[test]
    fn test_unknown_band_in_override() {
        let test_args = BaseArgs {
            vaccination_order: Some(vec![70, 15]),
            ..default_args()
        };
        assert!(matches!(
            build_config(&test_args),
            Err(SimulationError::UnknownAgeBand(15))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let test_args = BaseArgs {
            config: "tests/data/does_not_exist.json".to_string(),
            ..default_args()
        };
        let mut out = Vec::new();
        assert!(matches!(
            run_with_args_internal(&test_args, &mut out),
            Err(SimulationError::IoError(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_with_output_dir() {
        let temp_dir = tempdir().unwrap();
        let test_args = BaseArgs {
            output_dir: temp_dir.path().to_string_lossy().into_owned(),
            days: Some(2),
            pool_report: true,
            ..default_args()
        };
        let mut out = Vec::new();
        run_with_args_internal(&test_args, &mut out).unwrap();

        let daily = csv::Reader::from_path(temp_dir.path().join("daily_totals.csv"))
            .unwrap()
            .records()
            .count();
        assert_eq!(daily, 2);
        let pools = csv::Reader::from_path(temp_dir.path().join("pool_report.csv"))
            .unwrap()
            .records()
            .count();
        assert_eq!(pools, 2 * 8);
    }

    #[test]
    fn test_cli_parses_order_list() {
        let matches = create_vaxpool_cli().get_matches_from([
            "vaxpool",
            "--vaccination-order",
            "0,70,10,20",
            "--recovery-mode",
            "accumulate",
            "--log-level",
            "warn",
        ]);
        let args = BaseArgs::from_arg_matches(&matches).unwrap();
        assert_eq!(args.vaccination_order, Some(vec![0, 70, 10, 20]));
        assert_eq!(args.recovery_mode, Some(RecoveryMode::Accumulate));
        assert_eq!(args.log_level, Some(LevelFilter::Warn));
        assert!(args.config.is_empty());
    }
}
