//! Detection of numerically unstable trajectories.
//!
//! The model is a continuous approximation and does not clamp its compartments. Extreme
//! parameter combinations can drive a count below zero (more infections than susceptible
//! people, for instance) or to a non-finite value. Such states are reported, never corrected:
//! the simulation keeps stepping and the caller decides whether the trajectory is usable.

use std::fmt::{self, Display};

use serde_derive::Serialize;

use crate::numeric::{is_valid_count, relative_eq, CONSERVATION_TOLERANCE};
use crate::pool::{PoolGroup, VaccinationStatus};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compartment {
    Uninfected,
    Infected,
    Dead,
}

impl Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Compartment::Uninfected => write!(f, "uninfected"),
            Compartment::Infected => write!(f, "infected"),
            Compartment::Dead => write!(f, "dead"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NumericInstability {
    /// A compartment count became negative or non-finite.
    InvalidCount {
        day: usize,
        min_age: u32,
        status: VaccinationStatus,
        compartment: Compartment,
        value: f64,
    },
    /// Living plus dead no longer adds up to the starting population.
    ConservationDrift {
        day: usize,
        expected: f64,
        actual: f64,
    },
}

impl Display for NumericInstability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NumericInstability::InvalidCount {
                day,
                min_age,
                status,
                compartment,
                value,
            } => write!(
                f,
                "day {day}: {status} {compartment} count of age band {min_age} is {value}"
            ),
            NumericInstability::ConservationDrift {
                day,
                expected,
                actual,
            } => write!(
                f,
                "day {day}: total population drifted from {expected} to {actual}"
            ),
        }
    }
}

/// Returns one record for every compartment in `groups` holding a negative or non-finite count.
#[must_use]
pub fn check_counts(groups: &[PoolGroup], day: usize) -> Vec<NumericInstability> {
    let mut found = Vec::new();
    for group in groups {
        for status in VaccinationStatus::ALL {
            let pool = group.pool(status);
            for (compartment, value) in [
                (Compartment::Uninfected, pool.uninfected),
                (Compartment::Infected, pool.infected),
                (Compartment::Dead, pool.dead),
            ] {
                if !is_valid_count(value) {
                    found.push(NumericInstability::InvalidCount {
                        day,
                        min_age: group.min_age,
                        status,
                        compartment,
                        value,
                    });
                }
            }
        }
    }
    found
}

#[must_use]
pub fn check_conservation(expected: f64, actual: f64, day: usize) -> Option<NumericInstability> {
    if relative_eq(expected, actual, CONSERVATION_TOLERANCE) {
        None
    } else {
        Some(NumericInstability::ConservationDrift {
            day,
            expected,
            actual,
        })
    }
}
