//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

/// A recorded quantity. Each variable is stored as one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// Pa, one column per junction (supply and return).
    JunctionPressure,
    /// K
    JunctionTemperature,
    /// kg/s, signed relative to the pipe's nominal orientation.
    PipeMassFlow,
    /// m/s
    PipeVelocity,
    /// Pa
    PipePressureFrom,
    /// Pa
    PipePressureTo,
    /// K
    PipeOutletTemperature,
    /// kg/s
    ConsumerMassFlow,
    /// K
    ConsumerOutletTemperature,
    /// W
    ConsumerDemand,
    /// kg/s
    PumpMassFlow,
    /// K
    PumpReturnTemperature,
    /// W
    PumpHeatFlow,
}

/// Which component family a variable's columns belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSet {
    Junctions,
    Pipes,
    Consumers,
    Pumps,
}

impl Variable {
    pub const ALL: [Variable; 13] = [
        Variable::JunctionPressure,
        Variable::JunctionTemperature,
        Variable::PipeMassFlow,
        Variable::PipeVelocity,
        Variable::PipePressureFrom,
        Variable::PipePressureTo,
        Variable::PipeOutletTemperature,
        Variable::ConsumerMassFlow,
        Variable::ConsumerOutletTemperature,
        Variable::ConsumerDemand,
        Variable::PumpMassFlow,
        Variable::PumpReturnTemperature,
        Variable::PumpHeatFlow,
    ];

    /// File stem in the run store, also accepted by [`Variable::parse`].
    pub fn key(self) -> &'static str {
        match self {
            Variable::JunctionPressure => "junction_pressure",
            Variable::JunctionTemperature => "junction_temperature",
            Variable::PipeMassFlow => "pipe_mass_flow",
            Variable::PipeVelocity => "pipe_velocity",
            Variable::PipePressureFrom => "pipe_pressure_from",
            Variable::PipePressureTo => "pipe_pressure_to",
            Variable::PipeOutletTemperature => "pipe_outlet_temperature",
            Variable::ConsumerMassFlow => "consumer_mass_flow",
            Variable::ConsumerOutletTemperature => "consumer_outlet_temperature",
            Variable::ConsumerDemand => "consumer_demand",
            Variable::PumpMassFlow => "pump_mass_flow",
            Variable::PumpReturnTemperature => "pump_return_temperature",
            Variable::PumpHeatFlow => "pump_heat_flow",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.key() == key)
    }

    pub fn unit(self) -> &'static str {
        match self {
            Variable::JunctionPressure | Variable::PipePressureFrom | Variable::PipePressureTo => {
                "Pa"
            }
            Variable::JunctionTemperature
            | Variable::PipeOutletTemperature
            | Variable::ConsumerOutletTemperature
            | Variable::PumpReturnTemperature => "K",
            Variable::PipeMassFlow | Variable::ConsumerMassFlow | Variable::PumpMassFlow => "kg/s",
            Variable::PipeVelocity => "m/s",
            Variable::ConsumerDemand | Variable::PumpHeatFlow => "W",
        }
    }

    pub fn columns(self) -> ColumnSet {
        match self {
            Variable::JunctionPressure | Variable::JunctionTemperature => ColumnSet::Junctions,
            Variable::PipeMassFlow
            | Variable::PipeVelocity
            | Variable::PipePressureFrom
            | Variable::PipePressureTo
            | Variable::PipeOutletTemperature => ColumnSet::Pipes,
            Variable::ConsumerMassFlow
            | Variable::ConsumerOutletTemperature
            | Variable::ConsumerDemand => ColumnSet::Consumers,
            Variable::PumpMassFlow | Variable::PumpReturnTemperature | Variable::PumpHeatFlow => {
                ColumnSet::Pumps
            }
        }
    }
}

/// How much of the pipe temperature profiles is kept during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Every profile of every recorded step.
    Full,
    /// Only the most recent profile per pipe.
    #[default]
    Latest,
}

/// Columnar time series: one row per recorded step, one column per component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub time: Vec<f64>,
    /// `values[column][row]`
    pub values: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let values = vec![Vec::new(); columns.len()];
        Self {
            name: name.into(),
            columns,
            time: Vec::new(),
            values,
        }
    }

    pub fn push_row(&mut self, time: f64, row: &[f64]) -> crate::ResultsResult<()> {
        if row.len() != self.columns.len() {
            return Err(crate::ResultsError::Shape {
                table: self.name.clone(),
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.time.push(time);
        for (col, v) in self.values.iter_mut().zip(row) {
            col.push(*v);
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.time.len()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let i = self.columns.iter().position(|c| c == name)?;
        Some(&self.values[i])
    }

    /// Row `i` across all columns.
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.rows() {
            return None;
        }
        Some(self.values.iter().map(|c| c[i]).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub network: String,
    pub timestamp: String,
    pub solver_version: String,
    pub timestep_s: f64,
    pub stop_time_s: f64,
    pub steps: usize,
    pub history: HistoryMode,
    pub variables: Vec<Variable>,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time, listing every variable.
    pub fn now(
        run_id: impl Into<RunId>,
        network: impl Into<String>,
        solver_version: impl Into<String>,
        timestep_s: f64,
        stop_time_s: f64,
        steps: usize,
        history: HistoryMode,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            network: network.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.into(),
            timestep_s,
            stop_time_s,
            steps,
            history,
            variables: Variable::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_keys_round_trip() {
        for v in Variable::ALL {
            assert_eq!(Variable::parse(v.key()), Some(v));
        }
        assert_eq!(Variable::parse("nope"), None);
    }

    #[test]
    fn serde_uses_keys() {
        let json = serde_json::to_string(&Variable::PipeMassFlow).unwrap();
        assert_eq!(json, "\"pipe_mass_flow\"");
    }

    #[test]
    fn table_rejects_wrong_width() {
        let mut t = Table::new("t", vec!["a".into(), "b".into()]);
        t.push_row(0.0, &[1.0, 2.0]).unwrap();
        assert!(t.push_row(1.0, &[1.0]).is_err());
        assert_eq!(t.column("b"), Some(&[2.0][..]));
        assert_eq!(t.row(0), Some(vec![1.0, 2.0]));
        assert_eq!(t.row(1), None);
    }
}
