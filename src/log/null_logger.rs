/*!

Used when the `logging` feature is disabled: nothing is written anywhere, but the public API
still works and `log::max_level()` follows the configured level.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        let max_level = self
            .module_levels
            .values()
            .copied()
            .fold(self.global_log_level, std::cmp::max);
        log::set_max_level(max_level);
    }
}
