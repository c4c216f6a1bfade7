//! The daily stepping algorithm.
//!
//! Each call to [`Simulation::step`] runs three phases in strict order:
//!
//! 1. **Vaccinate**: the daily dose budget is spent on unvaccinated, uninfected people, band
//!    by band in policy order, until it runs out. Unused doses are lost.
//! 2. **Infect and kill**: a [`Snapshot`] of every pool is taken and all force-of-infection
//!    terms are computed from it, so the order in which bands are processed cannot bias the
//!    result. Only the live pools are mutated.
//! 3. **Recover**: a fixed fraction of each pool's infected become immune and move into the
//!    band's vaccinated pool.
//!
//! The force of infection on a pool has three additive terms, each of the form
//! `base_rate * contact_rate * susceptible_fraction * contacted_infected * pool_population /
//! population`: contact within the pool (`intra_rate`), contact with the other vaccination
//! status of the same band (the group's `contact_rate`), and contact with everyone else
//! (`inter_rate`). `population` is the total living population at construction and is never
//! recomputed.

use serde_derive::Serialize;

use crate::config::{RecoveryMode, SimulationConfig};
use crate::diagnostics::{check_conservation, check_counts, NumericInstability};
use crate::error::SimulationError;
use crate::log::{debug, info, trace, warn};
use crate::pool::{PoolGroup, VaccinationStatus};

/// Aggregate counters after one day.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DailyTotals {
    pub day: usize,
    pub infected: f64,
    pub dead: f64,
    pub population: f64,
    pub doses: f64,
}

/// A frozen copy of every pool group, taken after vaccination and read by the infection phase.
#[derive(Clone, Debug)]
pub struct Snapshot {
    groups: Vec<PoolGroup>,
    total_infected: f64,
}

/// Infections and deaths computed for one pool from a snapshot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transmission {
    pub infections: f64,
    pub deaths: f64,
}

impl Snapshot {
    #[must_use]
    pub fn capture(groups: &[PoolGroup]) -> Snapshot {
        Snapshot {
            groups: groups.to_vec(),
            total_infected: groups.iter().map(PoolGroup::infected).sum(),
        }
    }

    #[must_use]
    pub fn total_infected(&self) -> f64 {
        self.total_infected
    }

    #[must_use]
    pub fn groups(&self) -> &[PoolGroup] {
        &self.groups
    }

    /// Computes the day's infections and deaths for one pool of the band starting at `min_age`.
    /// `normalization` is the simulation's fixed starting population.
    ///
    /// Returns `None` if the snapshot holds no such band.
    #[must_use]
    pub fn transmission(
        &self,
        min_age: u32,
        status: VaccinationStatus,
        base_rate: f64,
        normalization: f64,
    ) -> Option<Transmission> {
        let index = find_group_index(&self.groups, min_age).ok()?;
        Some(self.transmission_at(index, status, base_rate, normalization))
    }

    // `index` must address a group of this snapshot.
    fn transmission_at(
        &self,
        index: usize,
        status: VaccinationStatus,
        base_rate: f64,
        normalization: f64,
    ) -> Transmission {
        let group = &self.groups[index];
        let pool = group.pool(status);
        let cross_infected = group.pool(status.other()).infected;
        let outside_infected = self.total_infected - pool.infected - cross_infected;

        let deaths = pool.infected * pool.death_rate;

        let population = pool.get_population();
        let percentage = pool.uninfected / population;

        let mut infections = 0.0;
        infections +=
            base_rate * pool.intra_rate * percentage * pool.infected * population / normalization;
        infections += base_rate * group.contact_rate * percentage * cross_infected * population
            / normalization;
        infections += base_rate * pool.inter_rate * percentage * outside_infected * population
            / normalization;

        Transmission { infections, deaths }
    }
}

#[derive(Clone, Debug)]
pub struct Simulation {
    /// Sorted by `min_age`.
    groups: Vec<PoolGroup>,
    base_rate: f64,
    recovery_rate: f64,
    vaccination_rate: f64,
    vaccination_order: Vec<u32>,
    /// `vaccination_order` resolved to positions in `groups`.
    vaccination_indices: Vec<usize>,
    /// Policy bands first, then any configured band the policy leaves out.
    processing_indices: Vec<usize>,
    recovery_mode: RecoveryMode,
    population: f64,
    initial_total: f64,
    day: usize,
    total_vaccinated: f64,
    instabilities: Vec<NumericInstability>,
}

fn find_group_index(groups: &[PoolGroup], min_age: u32) -> Result<usize, SimulationError> {
    groups
        .binary_search_by_key(&min_age, |group| group.min_age)
        .map_err(|_| SimulationError::UnknownAgeBand(min_age))
}

impl Simulation {
    /// Builds the simulation state described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if the configuration fails validation, in particular
    /// `UnknownAgeBand` when the vaccination order names a band that is not configured.
    pub fn new(config: &SimulationConfig) -> Result<Simulation, SimulationError> {
        config.validate()?;

        let mut groups: Vec<PoolGroup> = config.groups.iter().map(PoolGroup::new).collect();
        groups.sort_by_key(|group| group.min_age);

        let vaccination_indices = config
            .vaccination_order
            .iter()
            .map(|&min_age| find_group_index(&groups, min_age))
            .collect::<Result<Vec<_>, _>>()?;
        let mut processing_indices = vaccination_indices.clone();
        processing_indices.extend((0..groups.len()).filter(|i| !vaccination_indices.contains(i)));

        let mut simulation = Simulation {
            groups,
            base_rate: config.base_rate,
            recovery_rate: config.recovery_rate,
            vaccination_rate: config.vaccination_rate,
            vaccination_order: config.vaccination_order.clone(),
            vaccination_indices,
            processing_indices,
            recovery_mode: config.recovery_mode,
            population: 0.0,
            initial_total: 0.0,
            day: 0,
            total_vaccinated: 0.0,
            instabilities: Vec::new(),
        };
        simulation.population = simulation.get_total_population();
        simulation.initial_total = simulation.get_total_count();

        info!(
            "Initialized {} age bands, population {}, vaccination order {:?}, recovery mode {:?}",
            simulation.groups.len(),
            simulation.population,
            simulation.vaccination_order,
            simulation.recovery_mode
        );
        Ok(simulation)
    }

    /// Spends the daily dose budget in policy order and returns the doses administered.
    pub fn vaccinate(&mut self) -> f64 {
        let mut remaining = self.vaccination_rate;
        let mut administered = 0.0;
        for &index in &self.vaccination_indices {
            let group = &mut self.groups[index];
            let doses = remaining.min(group.unvaccinated.uninfected).max(0.0);
            remaining -= doses;
            administered += doses;
            group.unvaccinated.uninfected -= doses;
            group.vaccinated.uninfected += doses;
            trace!("Vaccinated {} in age band {}", doses, group.min_age);
            if remaining == 0.0 {
                break;
            }
        }
        self.total_vaccinated += administered;
        administered
    }

    /// Applies the day's infections and deaths, computed entirely from `snapshot`, to the live
    /// pools.
    pub fn infect_and_kill(&mut self, snapshot: &Snapshot) {
        for &index in &self.processing_indices {
            for status in VaccinationStatus::ALL {
                let Transmission { infections, deaths } =
                    snapshot.transmission_at(index, status, self.base_rate, self.population);
                let pool = self.groups[index].pool_mut(status);
                pool.uninfected -= infections;
                pool.infected += infections - deaths;
                pool.dead += deaths;
            }
        }
    }

    /// Moves `recovery_rate` of each pool's infected into the band's vaccinated uninfected
    /// count.
    pub fn recover(&mut self) {
        for &index in &self.processing_indices {
            let group = &mut self.groups[index];

            let unvaccinated_recoveries = group.unvaccinated.infected * self.recovery_rate;
            group.unvaccinated.infected -= unvaccinated_recoveries;
            match self.recovery_mode {
                RecoveryMode::Overwrite => group.vaccinated.uninfected = unvaccinated_recoveries,
                RecoveryMode::Accumulate => group.vaccinated.uninfected += unvaccinated_recoveries,
            }

            let vaccinated_recoveries = group.vaccinated.infected * self.recovery_rate;
            group.vaccinated.infected -= vaccinated_recoveries;
            group.vaccinated.uninfected += vaccinated_recoveries;
        }
    }

    /// Advances the simulation by one day and returns the day's aggregate counters.
    pub fn step(&mut self) -> DailyTotals {
        let doses = self.vaccinate();
        let snapshot = Snapshot::capture(&self.groups);
        self.infect_and_kill(&snapshot);
        self.recover();

        self.day += 1;
        self.check_stability();

        let totals = DailyTotals {
            day: self.day,
            infected: self.get_total_infections(),
            dead: self.get_total_deaths(),
            population: self.get_total_population(),
            doses,
        };
        debug!(
            "Day {}: infected {}, dead {}, doses {}",
            totals.day, totals.infected, totals.dead, totals.doses
        );
        totals
    }

    /// Steps `days` times, collecting each day's totals.
    pub fn run(&mut self, days: usize) -> Vec<DailyTotals> {
        (0..days).map(|_| self.step()).collect()
    }

    fn check_stability(&mut self) {
        let mut found = check_counts(&self.groups, self.day);
        if self.recovery_mode == RecoveryMode::Accumulate {
            found.extend(check_conservation(
                self.initial_total,
                self.get_total_count(),
                self.day,
            ));
        }
        for instability in &found {
            warn!("Numeric instability: {}", instability);
        }
        self.instabilities.extend(found);
    }

    #[must_use]
    pub fn get_total_infections(&self) -> f64 {
        self.groups.iter().map(PoolGroup::infected).sum()
    }

    #[must_use]
    pub fn get_total_deaths(&self) -> f64 {
        self.groups.iter().map(PoolGroup::dead).sum()
    }

    /// The living population: every uninfected and infected person. The dead are excluded.
    #[must_use]
    pub fn get_total_population(&self) -> f64 {
        let uninfected: f64 = self
            .groups
            .iter()
            .map(|group| group.vaccinated.uninfected + group.unvaccinated.uninfected)
            .sum();
        uninfected + self.get_total_infections()
    }

    /// Living plus dead, summed over every pool.
    #[must_use]
    pub fn get_total_count(&self) -> f64 {
        self.groups
            .iter()
            .map(|group| group.vaccinated.total() + group.unvaccinated.total())
            .sum()
    }

    /// Doses administered since the simulation started.
    #[must_use]
    pub fn get_total_vaccinated(&self) -> f64 {
        self.total_vaccinated
    }

    /// The normalization constant of the force of infection, fixed at construction.
    #[must_use]
    pub fn population(&self) -> f64 {
        self.population
    }

    /// Number of completed steps.
    #[must_use]
    pub fn day(&self) -> usize {
        self.day
    }

    #[must_use]
    pub fn get_group(&self, min_age: u32) -> Option<&PoolGroup> {
        find_group_index(&self.groups, min_age)
            .ok()
            .map(|index| &self.groups[index])
    }

    #[must_use]
    pub fn groups(&self) -> &[PoolGroup] {
        &self.groups
    }

    #[must_use]
    pub fn vaccination_order(&self) -> &[u32] {
        &self.vaccination_order
    }

    #[must_use]
    pub fn recovery_mode(&self) -> RecoveryMode {
        self.recovery_mode
    }

    /// Every instability observed so far, oldest first.
    #[must_use]
    pub fn instabilities(&self) -> &[NumericInstability] {
        &self.instabilities
    }
}
