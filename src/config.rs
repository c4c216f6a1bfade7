//! Simulation configuration.
//!
//! All model parameters live in an immutable [`SimulationConfig`] that is handed to
//! [`Simulation::new`](crate::simulation::Simulation::new). Configurations are usually read from
//! a JSON file:
//!
//! ```json
//! {
//!   "base_rate": 0.3257142857142857,
//!   "recovery_rate": 0.07,
//!   "vaccination_rate": 116.66666666666667,
//!   "vaccination_order": [70, 0, 10, 20],
//!   "groups": [
//!     {
//!       "min_age": 70,
//!       "contact_rate": 0.5,
//!       "vaccinated": { "intra_rate": 0.15, "inter_rate": 0.15, "death_rate": 0.001,
//!                       "population": 0.0, "initial_infection_rate": 0.001 },
//!       "unvaccinated": { "intra_rate": 0.8, "inter_rate": 0.8, "death_rate": 0.01,
//!                         "population": 11000.0, "initial_infection_rate": 0.001 }
//!     }
//!   ]
//! }
//! ```
//!
//! `recovery_mode` (`"accumulate"` or `"overwrite"`) and `max_days` are optional.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde_derive::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::log::debug;

/// How much the vaccine reduces transmission and mortality.
pub const VACCINATION_EFFICIENCY: f64 = 0.1;
/// Vaccinated people mix more since they know they are protected.
pub const VACCINATED_HANGOUT_RATE: f64 = 1.5;
/// Unvaccinated people mix less to protect themselves.
pub const UNVACCINATED_HANGOUT_RATE: f64 = 0.8;
/// Daily probability that an infected person dies.
pub const MORTALITY_RATE: f64 = 0.001;
/// Starting fraction of each pool that is infected.
pub const INITIAL_INFECTION_RATE: f64 = 0.001;
/// Base contact rate between the two pools of a group.
pub const CONTACT_RATE: f64 = 0.5;
/// Expected infections per infected person per day.
pub const BASE_RATE: f64 = 2.28 / 14.0 * 2.0;
/// Vaccine doses available per day.
pub const VACCINATION_RATE: f64 = 3500.0 / 30.0;
/// Fraction of the infected who recover each day.
pub const RECOVERY_RATE: f64 = 0.07;

pub const DEFAULT_MAX_DAYS: usize = 100;
/// Oldest first, then children, then adults.
pub const REFERENCE_VACCINATION_ORDER: [u32; 4] = [70, 0, 10, 20];

/// Where recovered people from the unvaccinated pool end up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    /// Unvaccinated recoveries replace the vaccinated pool's uninfected count. This discards
    /// whatever the pool held before, including that day's vaccinations, and reproduces the
    /// historical trajectories exactly.
    Overwrite,
    /// Unvaccinated recoveries are added to the vaccinated pool's uninfected count, conserving
    /// the total population.
    #[default]
    Accumulate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    pub intra_rate: f64,
    pub inter_rate: f64,
    pub death_rate: f64,
    pub population: f64,
    pub initial_infection_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolGroupConfig {
    pub min_age: u32,
    pub contact_rate: f64,
    pub vaccinated: PoolConfig,
    pub unvaccinated: PoolConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub base_rate: f64,
    pub recovery_rate: f64,
    pub vaccination_rate: f64,
    pub vaccination_order: Vec<u32>,
    #[serde(default)]
    pub recovery_mode: RecoveryMode,
    #[serde(default = "default_max_days")]
    pub max_days: usize,
    pub groups: Vec<PoolGroupConfig>,
}

fn default_max_days() -> usize {
    DEFAULT_MAX_DAYS
}

fn check_rate(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::ConfigurationError(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}

impl PoolConfig {
    fn validate(&self, label: &str) -> Result<(), SimulationError> {
        check_rate(&format!("{label} intra_rate"), self.intra_rate)?;
        check_rate(&format!("{label} inter_rate"), self.inter_rate)?;
        check_rate(&format!("{label} death_rate"), self.death_rate)?;
        check_rate(&format!("{label} population"), self.population)?;
        if !(0.0..=1.0).contains(&self.initial_infection_rate) {
            return Err(SimulationError::ConfigurationError(format!(
                "{label} initial_infection_rate must be within [0, 1], got {}",
                self.initial_infection_rate
            )));
        }
        Ok(())
    }
}

impl SimulationConfig {
    /// Reads a configuration from a JSON file and validates it.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if the file cannot be read, is not valid JSON for this
    /// schema, or fails [`SimulationConfig::validate`].
    pub fn load(path: &Path) -> Result<SimulationConfig, SimulationError> {
        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;
        SimulationConfig::from_json_str(&contents)
    }

    /// Parses and validates a configuration held in memory.
    ///
    /// # Errors
    ///
    /// See [`SimulationConfig::load`].
    pub fn from_json_str(contents: &str) -> Result<SimulationConfig, SimulationError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration before any simulation state is built.
    ///
    /// # Errors
    ///
    /// - `UnknownAgeBand` if the vaccination order names a band with no group
    /// - `ConfigurationError` for negative or non-finite parameters, duplicated bands or
    ///   policy entries, or a starting population that is not positive
    pub fn validate(&self) -> Result<(), SimulationError> {
        check_rate("base_rate", self.base_rate)?;
        check_rate("recovery_rate", self.recovery_rate)?;
        check_rate("vaccination_rate", self.vaccination_rate)?;

        if self.groups.is_empty() {
            return Err(SimulationError::ConfigurationError(
                "at least one pool group is required".to_string(),
            ));
        }

        let mut bands = HashSet::new();
        for group in &self.groups {
            if !bands.insert(group.min_age) {
                return Err(SimulationError::ConfigurationError(format!(
                    "age band {} is configured more than once",
                    group.min_age
                )));
            }
            check_rate(&format!("group {} contact_rate", group.min_age), group.contact_rate)?;
            group
                .vaccinated
                .validate(&format!("group {} vaccinated", group.min_age))?;
            group
                .unvaccinated
                .validate(&format!("group {} unvaccinated", group.min_age))?;
        }

        let mut seen = HashSet::new();
        for min_age in &self.vaccination_order {
            if !bands.contains(min_age) {
                return Err(SimulationError::UnknownAgeBand(*min_age));
            }
            if !seen.insert(*min_age) {
                return Err(SimulationError::ConfigurationError(format!(
                    "age band {min_age} appears more than once in the vaccination order"
                )));
            }
        }

        let population: f64 = self
            .groups
            .iter()
            .map(|group| group.vaccinated.population + group.unvaccinated.population)
            .sum();
        if population <= 0.0 {
            return Err(SimulationError::ConfigurationError(
                "the total starting population must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The four-band scenario the model was originally calibrated against. Every vaccinated
    /// pool starts empty; vaccination and recovery fill them.
    #[must_use]
    pub fn reference_scenario(vaccination_order: Vec<u32>) -> SimulationConfig {
        let vaccinated = |intra_rate: f64, death_rate: f64| PoolConfig {
            intra_rate,
            inter_rate: VACCINATION_EFFICIENCY * VACCINATED_HANGOUT_RATE,
            death_rate,
            population: 0.0,
            initial_infection_rate: INITIAL_INFECTION_RATE,
        };
        let unvaccinated = |intra_rate: f64, death_rate: f64, population: f64| PoolConfig {
            intra_rate,
            inter_rate: UNVACCINATED_HANGOUT_RATE,
            death_rate,
            population,
            initial_infection_rate: INITIAL_INFECTION_RATE,
        };

        // Children mix more among themselves but are less likely to die.
        let child_band = |min_age: u32, population: f64| PoolGroupConfig {
            min_age,
            contact_rate: CONTACT_RATE * 2.0,
            vaccinated: vaccinated(
                VACCINATION_EFFICIENCY * VACCINATED_HANGOUT_RATE * 2.0,
                VACCINATION_EFFICIENCY * MORTALITY_RATE,
            ),
            unvaccinated: unvaccinated(
                UNVACCINATED_HANGOUT_RATE * 2.0,
                MORTALITY_RATE / 10.0,
                population,
            ),
        };

        let groups = vec![
            child_band(0, 6000.0),
            child_band(10, 18000.0),
            PoolGroupConfig {
                min_age: 20,
                contact_rate: CONTACT_RATE,
                vaccinated: vaccinated(
                    VACCINATION_EFFICIENCY * VACCINATED_HANGOUT_RATE,
                    VACCINATION_EFFICIENCY * MORTALITY_RATE,
                ),
                unvaccinated: unvaccinated(UNVACCINATED_HANGOUT_RATE, MORTALITY_RATE, 65000.0),
            },
            // The elderly are more likely to die.
            PoolGroupConfig {
                min_age: 70,
                contact_rate: CONTACT_RATE,
                vaccinated: vaccinated(
                    VACCINATION_EFFICIENCY * VACCINATED_HANGOUT_RATE,
                    VACCINATION_EFFICIENCY * MORTALITY_RATE * 10.0,
                ),
                unvaccinated: unvaccinated(
                    UNVACCINATED_HANGOUT_RATE,
                    MORTALITY_RATE * 10.0,
                    11000.0,
                ),
            },
        ];

        SimulationConfig {
            base_rate: BASE_RATE,
            recovery_rate: RECOVERY_RATE,
            vaccination_rate: VACCINATION_RATE,
            vaccination_order,
            recovery_mode: RecoveryMode::Overwrite,
            max_days: DEFAULT_MAX_DAYS,
            groups,
        }
    }
}
