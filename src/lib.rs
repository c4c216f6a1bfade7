//! A deterministic model of vaccination and infection in an age-banded population
//!
//! Vaxpool does not track individuals. The population is divided into age bands, each band
//! holding two pools (vaccinated and unvaccinated) of continuous counts of uninfected, infected
//! and dead people. Time advances in whole days, and every day runs three phases:
//! * Vaccination moves uninfected people from the unvaccinated to the vaccinated pool of each
//!   band, in the priority order of the vaccination policy, until the day's doses run out.
//! * Infection and death are computed for every pool from a frozen snapshot of all pools, so
//!   the order the bands are processed in never changes the result.
//! * Recovery returns a fixed fraction of each pool's infected to the uninfected compartment.
//!
//! The central object is the [`Simulation`], built from a validated [`SimulationConfig`]:
//!
//! ```rust
//! use vaxpool::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::reference_scenario(vec![70, 0, 10, 20]);
//! let mut simulation = Simulation::new(&config).unwrap();
//! for totals in simulation.run(10) {
//!     println!("Day: {} Infected: {} Dead: {}", totals.day, totals.infected, totals.dead);
//! }
//! ```
//!
//! The `vaxpool` binary wraps the same loop with a command line interface (see [`runner`]) and
//! optional CSV output (see [`report`]).
pub mod config;
pub use config::{RecoveryMode, SimulationConfig};

pub mod diagnostics;
pub mod error;
pub use error::SimulationError;

pub mod log;
pub mod numeric;

pub mod pool;
pub use pool::{Pool, PoolGroup, VaccinationStatus};

pub mod prelude;
pub mod report;
pub mod runner;
pub use runner::{run_with_args, BaseArgs};

pub mod simulation;
pub use simulation::{DailyTotals, Simulation, Snapshot};

