pub use crate::config::{PoolConfig, PoolGroupConfig, RecoveryMode, SimulationConfig};
pub use crate::error::SimulationError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::pool::{Pool, PoolGroup, VaccinationStatus};
pub use crate::report::{PoolReport, Reports};
pub use crate::runner::{run_with_args, BaseArgs};
pub use crate::simulation::{DailyTotals, Simulation, Snapshot};
pub use crate::{assert_almost_eq, define_report};
