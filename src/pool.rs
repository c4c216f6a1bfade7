//! Compartments of the population.
//!
//! A [`Pool`] holds the continuous uninfected, infected and dead counts for one age band and one
//! vaccination status. Counts are expected values, so fractional people are normal. A
//! [`PoolGroup`] pairs the vaccinated and unvaccinated pools of one age band.

use std::fmt::{self, Display};

use serde_derive::{Deserialize, Serialize};

use crate::config::{PoolConfig, PoolGroupConfig};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccinationStatus {
    Vaccinated,
    Unvaccinated,
}

impl VaccinationStatus {
    pub const ALL: [VaccinationStatus; 2] =
        [VaccinationStatus::Vaccinated, VaccinationStatus::Unvaccinated];

    /// The status of the cross-status partner pool within the same band.
    #[must_use]
    pub fn other(self) -> VaccinationStatus {
        match self {
            VaccinationStatus::Vaccinated => VaccinationStatus::Unvaccinated,
            VaccinationStatus::Unvaccinated => VaccinationStatus::Vaccinated,
        }
    }
}

impl Display for VaccinationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VaccinationStatus::Vaccinated => write!(f, "vaccinated"),
            VaccinationStatus::Unvaccinated => write!(f, "unvaccinated"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pool {
    pub uninfected: f64,
    pub infected: f64,
    pub dead: f64,
    /// Contact multiplier for transmission within this pool.
    pub intra_rate: f64,
    /// Contact multiplier for transmission from the rest of the population.
    pub inter_rate: f64,
    /// Fraction of the infected who die each day.
    pub death_rate: f64,
}

impl Pool {
    #[must_use]
    pub fn new(config: &PoolConfig) -> Pool {
        Pool {
            uninfected: config.population * (1.0 - config.initial_infection_rate),
            infected: config.population * config.initial_infection_rate,
            dead: 0.0,
            intra_rate: config.intra_rate,
            inter_rate: config.inter_rate,
            death_rate: config.death_rate,
        }
    }

    /// Returns the living population of the pool. An empty pool reports `1` so that rate
    /// formulas dividing by it stay defined; the sentinel is not a real population.
    #[must_use]
    pub fn get_population(&self) -> f64 {
        let living = self.uninfected + self.infected;
        if living == 0.0 {
            return 1.0;
        }
        living
    }

    /// Everyone the pool has ever held, living or dead.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.uninfected + self.infected + self.dead
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoolGroup {
    pub vaccinated: Pool,
    pub unvaccinated: Pool,
    /// Identifies the age band; also the lookup key used by the vaccination policy.
    pub min_age: u32,
    /// Contact multiplier between the vaccinated and unvaccinated pools of this band.
    pub contact_rate: f64,
}

impl PoolGroup {
    #[must_use]
    pub fn new(config: &PoolGroupConfig) -> PoolGroup {
        PoolGroup {
            vaccinated: Pool::new(&config.vaccinated),
            unvaccinated: Pool::new(&config.unvaccinated),
            min_age: config.min_age,
            contact_rate: config.contact_rate,
        }
    }

    /// Sum of both pools' populations, sentinels included.
    #[must_use]
    pub fn get_population(&self) -> f64 {
        self.vaccinated.get_population() + self.unvaccinated.get_population()
    }

    #[must_use]
    pub fn pool(&self, status: VaccinationStatus) -> &Pool {
        match status {
            VaccinationStatus::Vaccinated => &self.vaccinated,
            VaccinationStatus::Unvaccinated => &self.unvaccinated,
        }
    }

    pub fn pool_mut(&mut self, status: VaccinationStatus) -> &mut Pool {
        match status {
            VaccinationStatus::Vaccinated => &mut self.vaccinated,
            VaccinationStatus::Unvaccinated => &mut self.unvaccinated,
        }
    }

    #[must_use]
    pub fn infected(&self) -> f64 {
        self.vaccinated.infected + self.unvaccinated.infected
    }

    #[must_use]
    pub fn dead(&self) -> f64 {
        self.vaccinated.dead + self.unvaccinated.dead
    }
}
