//! In-memory result recorder.

use std::collections::BTreeMap;

use crate::types::{ColumnSet, HistoryMode, Table, Variable};
use crate::{ResultsError, ResultsResult};

/// Column names of every component family.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecorderLayout {
    pub junctions: Vec<String>,
    pub pipes: Vec<String>,
    pub consumers: Vec<String>,
    pub pumps: Vec<String>,
}

impl RecorderLayout {
    fn columns(&self, set: ColumnSet) -> &[String] {
        match set {
            ColumnSet::Junctions => &self.junctions,
            ColumnSet::Pipes => &self.pipes,
            ColumnSet::Consumers => &self.consumers,
            ColumnSet::Pumps => &self.pumps,
        }
    }
}

/// Values of one recorded step, indexed like the network arenas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub junction_pressure: Vec<f64>,
    pub junction_temperature: Vec<f64>,
    pub pipe_mass_flow: Vec<f64>,
    pub pipe_velocity: Vec<f64>,
    pub pipe_pressure_from: Vec<f64>,
    pub pipe_pressure_to: Vec<f64>,
    pub pipe_outlet_temperature: Vec<f64>,
    pub consumer_mass_flow: Vec<f64>,
    pub consumer_outlet_temperature: Vec<f64>,
    pub consumer_demand: Vec<f64>,
    pub pump_mass_flow: Vec<f64>,
    pub pump_return_temperature: Vec<f64>,
    pub pump_heat_flow: Vec<f64>,
}

impl Frame {
    pub fn get(&self, variable: Variable) -> &[f64] {
        match variable {
            Variable::JunctionPressure => &self.junction_pressure,
            Variable::JunctionTemperature => &self.junction_temperature,
            Variable::PipeMassFlow => &self.pipe_mass_flow,
            Variable::PipeVelocity => &self.pipe_velocity,
            Variable::PipePressureFrom => &self.pipe_pressure_from,
            Variable::PipePressureTo => &self.pipe_pressure_to,
            Variable::PipeOutletTemperature => &self.pipe_outlet_temperature,
            Variable::ConsumerMassFlow => &self.consumer_mass_flow,
            Variable::ConsumerOutletTemperature => &self.consumer_outlet_temperature,
            Variable::ConsumerDemand => &self.consumer_demand,
            Variable::PumpMassFlow => &self.pump_mass_flow,
            Variable::PumpReturnTemperature => &self.pump_return_temperature,
            Variable::PumpHeatFlow => &self.pump_heat_flow,
        }
    }
}

/// Retained pipe temperature profiles.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileHistory {
    /// `steps[step][pipe][sample]`
    Full(Vec<Vec<Vec<f64>>>),
    /// `latest[pipe][sample]`
    Latest(Vec<Vec<f64>>),
}

/// Collects one row per step into one table per [`Variable`].
#[derive(Debug, Clone)]
pub struct Recorder {
    layout: RecorderLayout,
    tables: BTreeMap<Variable, Table>,
    profiles: ProfileHistory,
}

impl Recorder {
    pub fn new(layout: RecorderLayout, history: HistoryMode) -> Self {
        let tables = Variable::ALL
            .into_iter()
            .map(|v| (v, Table::new(v.key(), layout.columns(v.columns()).to_vec())))
            .collect();
        let profiles = match history {
            HistoryMode::Full => ProfileHistory::Full(Vec::new()),
            HistoryMode::Latest => ProfileHistory::Latest(Vec::new()),
        };
        Self {
            layout,
            tables,
            profiles,
        }
    }

    pub fn layout(&self) -> &RecorderLayout {
        &self.layout
    }

    pub fn history(&self) -> HistoryMode {
        match self.profiles {
            ProfileHistory::Full(_) => HistoryMode::Full,
            ProfileHistory::Latest(_) => HistoryMode::Latest,
        }
    }

    /// Append one step. Every table grows by one row or none does.
    pub fn record(&mut self, time: f64, frame: &Frame) -> ResultsResult<()> {
        for (variable, table) in &self.tables {
            let got = frame.get(*variable).len();
            if got != table.columns.len() {
                return Err(ResultsError::Shape {
                    table: table.name.clone(),
                    expected: table.columns.len(),
                    got,
                });
            }
        }
        for (variable, table) in self.tables.iter_mut() {
            table.push_row(time, frame.get(*variable))?;
        }
        Ok(())
    }

    /// Store the current profiles of all pipes.
    pub fn record_profiles<'a>(&mut self, profiles: impl IntoIterator<Item = &'a [f64]>) {
        let snapshot: Vec<Vec<f64>> = profiles.into_iter().map(<[f64]>::to_vec).collect();
        match &mut self.profiles {
            ProfileHistory::Full(steps) => steps.push(snapshot),
            ProfileHistory::Latest(latest) => *latest = snapshot,
        }
    }

    pub fn profiles(&self) -> &ProfileHistory {
        &self.profiles
    }

    /// Most recent profile of pipe `index`.
    pub fn latest_profile(&self, index: usize) -> Option<&[f64]> {
        let latest = match &self.profiles {
            ProfileHistory::Full(steps) => steps.last()?,
            ProfileHistory::Latest(latest) => latest,
        };
        latest.get(index).map(Vec::as_slice)
    }

    pub fn table(&self, variable: Variable) -> &Table {
        // Every variable gets a table in `new`.
        &self.tables[&variable]
    }

    pub fn tables(&self) -> impl Iterator<Item = (Variable, &Table)> {
        self.tables.iter().map(|(v, t)| (*v, t))
    }

    /// Number of recorded steps.
    pub fn steps(&self) -> usize {
        self.tables.values().next().map(Table::rows).unwrap_or(0)
    }

    pub fn times(&self) -> &[f64] {
        self.tables
            .values()
            .next()
            .map(|t| t.time.as_slice())
            .unwrap_or(&[])
    }
}
