//! CSV reports of the simulation's trajectory.
//!
//! Each report type is a `Serialize` row struct bound to exactly one CSV file. Register it with
//! [`Reports::add_report`], then write rows with [`Reports::send_report`]:
//!
//! * [`DailyTotals`]: one row per day with the aggregate counters.
//! * [`PoolReport`]: one row per pool per day.

use std::any::TypeId;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use serde::Serialize;

use crate::error::SimulationError;
use crate::log::debug;
use crate::pool::{PoolGroup, VaccinationStatus};
use crate::simulation::DailyTotals;

pub trait Report: Serialize + 'static {}

/// Use this macro to mark a row type as a report
#[macro_export]
macro_rules! define_report {
    ($name:ty) => {
        impl $crate::report::Report for $name {}
    };
}

define_report!(DailyTotals);

/// The state of one pool at the end of a day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoolReport {
    pub day: usize,
    pub min_age: u32,
    pub status: VaccinationStatus,
    pub uninfected: f64,
    pub infected: f64,
    pub dead: f64,
}

define_report!(PoolReport);

impl PoolReport {
    /// One row for every pool in `groups`.
    #[must_use]
    pub fn from_groups(day: usize, groups: &[PoolGroup]) -> Vec<PoolReport> {
        groups
            .iter()
            .flat_map(|group| {
                VaccinationStatus::ALL.map(|status| {
                    let pool = group.pool(status);
                    PoolReport {
                        day,
                        min_age: group.min_age,
                        status,
                        uninfected: pool.uninfected,
                        infected: pool.infected,
                        dead: pool.dead,
                    }
                })
            })
            .collect()
    }
}

// Checks that the path is a CSV file. Creates the file and all parent directories if they do not
// exist.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, SimulationError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if !overwrite && path.exists() {
                return Err(SimulationError::ReportError(format!(
                    "report file {} already exists",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(SimulationError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

pub struct Reports {
    directory: PathBuf,
    overwrite: bool,
    file_writers: HashMap<TypeId, Writer<File>>,
}

impl Default for Reports {
    fn default() -> Self {
        Self::new()
    }
}

impl Reports {
    #[must_use]
    pub fn new() -> Reports {
        Reports {
            directory: PathBuf::from("."),
            overwrite: true,
            file_writers: HashMap::new(),
        }
    }

    /// Sets the directory that report names passed to `add_report` are resolved against.
    pub fn directory(&mut self, directory: PathBuf) -> &mut Self {
        self.directory = directory;
        self
    }

    /// Whether existing report files may be replaced. Defaults to true.
    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    /// Binds report type `T` to `<directory>/<short_name>.csv`.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if the file cannot be created, or if it exists and
    /// overwriting is disabled.
    pub fn add_report<T: Report>(&mut self, short_name: &str) -> Result<PathBuf, SimulationError> {
        let path = self.directory.join(format!("{short_name}.csv"));
        self.add_report_at::<T>(&path)?;
        Ok(path)
    }

    /// Binds report type `T` to the given CSV path.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if the path is not a `.csv` file or cannot be created.
    pub fn add_report_at<T: Report>(&mut self, path: &Path) -> Result<(), SimulationError> {
        let file = generate_validate_filepath(path, self.overwrite)?;
        debug!("Writing report to {}", path.display());
        self.file_writers
            .insert(TypeId::of::<T>(), Writer::from_writer(file));
        Ok(())
    }

    #[must_use]
    pub fn has_report<T: Report>(&self) -> bool {
        self.file_writers.contains_key(&TypeId::of::<T>())
    }

    /// Writes a row to the file bound to the report's type.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if no file was registered for `T` or the write fails.
    pub fn send_report<T: Report>(&mut self, report: &T) -> Result<(), SimulationError> {
        let writer = self
            .file_writers
            .get_mut(&TypeId::of::<T>())
            .ok_or_else(|| {
                SimulationError::ReportError("No writer found for the report type".to_string())
            })?;
        writer.serialize(report)?;
        writer.flush()?;
        Ok(())
    }
}
