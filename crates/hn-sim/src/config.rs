//! Run configuration.

use hn_hydraulics::SolverSettings;
use hn_results::HistoryMode;

use crate::consumer::DemandMode;
use crate::error::{SimError, SimResult};
use crate::ground::GroundProfile;

/// Settings of one transient run. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub stop_time: f64,
    /// Thermal timestep.
    pub timestep: f64,
    /// Spacing of the demand and ground samples; hydraulics are re-solved
    /// whenever a new sample starts.
    pub sample_interval: f64,
    /// Uniform initial temperature (K); defaults to the reference plant's
    /// flow and return temperatures.
    pub initial_temperature: Option<f64>,
    pub ground: GroundProfile,
    pub demand_mode: DemandMode,
    pub history: HistoryMode,
    /// Advance the pipes of one layer on the rayon pool.
    pub parallel: bool,
    /// Smallest layer worth splitting across threads.
    pub parallel_threshold: usize,
    pub snap_to_catalog: bool,
    pub solver: SolverSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stop_time: 86_400.0,
            timestep: 900.0,
            sample_interval: 3_600.0,
            initial_temperature: None,
            ground: GroundProfile::default(),
            demand_mode: DemandMode::default(),
            history: HistoryMode::default(),
            parallel: true,
            parallel_threshold: 64,
            snap_to_catalog: false,
            solver: SolverSettings::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(SimError::InvalidArg {
                what: "timestep must be positive",
            });
        }
        if !self.stop_time.is_finite() || self.stop_time < self.timestep {
            return Err(SimError::InvalidArg {
                what: "stop time must be at least one timestep",
            });
        }
        if !(self.sample_interval.is_finite() && self.sample_interval > 0.0) {
            return Err(SimError::InvalidArg {
                what: "sample interval must be positive",
            });
        }
        if self.parallel_threshold == 0 {
            return Err(SimError::InvalidArg {
                what: "parallel threshold must be at least 1",
            });
        }
        if let Some(t) = self.initial_temperature
            && !(t.is_finite() && t > 0.0)
        {
            return Err(SimError::InvalidArg {
                what: "initial temperature must be a positive kelvin value",
            });
        }
        self.ground
            .check(self.samples())
            .map_err(|reason| SimError::config("ground", reason))?;
        Ok(())
    }

    /// Number of thermal timesteps.
    pub fn steps(&self) -> usize {
        // Small slack so 86400 / 900 does not round down to 95.
        (self.stop_time / self.timestep + 1e-9).floor() as usize
    }

    /// Start time of step `step`.
    pub fn time_of(&self, step: usize) -> f64 {
        step as f64 * self.timestep
    }

    /// Demand sample active at the start of step `step`.
    pub fn sample_of(&self, step: usize) -> usize {
        (self.time_of(step) / self.sample_interval + 1e-9).floor() as usize
    }

    /// Number of demand samples the run reads.
    pub fn samples(&self) -> usize {
        match self.steps() {
            0 => 0,
            n => self.sample_of(n - 1) + 1,
        }
    }
}
