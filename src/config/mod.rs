//! Configuration module.
//!
//! Defaults → config file → env vars → CLI flags, resolved once at startup
//! into a [`ResolvedConfig`] that the host turns into engine options.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

use crate::engine::{EstimatorMetrics, HeightEstimator};
use crate::state::{LogRowsOptions, PopoverSize};

impl ResolvedConfig {
    /// Estimator metrics in terminal cells.
    pub fn estimator_metrics(&self) -> EstimatorMetrics {
        EstimatorMetrics {
            line_height: self.row_height.max(1),
            char_width: self.char_width,
            margins: self.margins,
        }
    }

    /// Construction options for the log-rows component.
    pub fn log_rows_options(&self) -> LogRowsOptions {
        LogRowsOptions {
            estimator: HeightEstimator::new(self.estimator_metrics()),
            overscan: self.overscan,
            popover: PopoverSize::new(self.popover_width, self.popover_height),
        }
    }
}
