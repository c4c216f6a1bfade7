use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimulationError` and maps to other errors to
/// convert to a `SimulationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimulationError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// The configuration is internally inconsistent or out of range.
    ConfigurationError(String),
    /// A vaccination policy entry names an age band that is not configured.
    UnknownAgeBand(u32),
    ReportError(String),
}

impl From<io::Error> for SimulationError {
    fn from(error: io::Error) -> Self {
        SimulationError::IoError(error)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::JsonError(error)
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::CSVError(error)
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::IoError(error) => Some(error),
            SimulationError::JsonError(error) => Some(error),
            SimulationError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::IoError(error) => write!(f, "I/O error: {error}"),
            SimulationError::JsonError(error) => write!(f, "invalid configuration file: {error}"),
            SimulationError::CSVError(error) => write!(f, "report error: {error}"),
            SimulationError::ConfigurationError(message) => {
                write!(f, "configuration error: {message}")
            }
            SimulationError::UnknownAgeBand(min_age) => write!(
                f,
                "configuration error: vaccination order names unknown age band {min_age}"
            ),
            SimulationError::ReportError(message) => write!(f, "report error: {message}"),
        }
    }
}
