//! Floating point comparison helpers, thin wrappers around the `approx` crate.
//!
//! Compartment counts are continuous expected values, so exact comparisons are rarely what we
//! want. These helpers give the rest of the crate (and its tests) a single place to decide what
//! "close enough" means.

use approx::{AbsDiffEq, RelativeEq};

/// Counts below `-COUNT_TOLERANCE` are treated as genuinely negative rather than rounding noise.
pub const COUNT_TOLERANCE: f64 = 1e-9;

/// Relative tolerance used when checking that the total population is conserved.
pub const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Compares if two floats are within `max_relative` of each other, relative to the larger
/// magnitude.
#[must_use]
pub fn relative_eq(a: f64, b: f64, max_relative: f64) -> bool {
    a.relative_eq(&b, f64::EPSILON, max_relative)
}

/// Returns true if `value` is a usable compartment count: finite and not meaningfully negative.
#[must_use]
pub fn is_valid_count(value: f64) -> bool {
    value.is_finite() && value >= -COUNT_TOLERANCE
}

#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, $a, $b
            );
        }
    };
}
