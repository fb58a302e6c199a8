//! Heat extraction at consumer substations.

use hn_network::HeatConsumer;

/// Which demand series drive the consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemandMode {
    /// Space heating only.
    #[default]
    Heating,
    /// Space heating plus domestic hot water.
    HeatingAndDhw,
}

/// Demand of `consumer` for demand sample `sample`, W.
///
/// Series shorter than the run are rejected when the simulation is built, so
/// a missing sample only happens for an absent hot water series and counts as
/// zero.
pub fn demand_at(consumer: &HeatConsumer, sample: usize, mode: DemandMode) -> f64 {
    let heat = consumer.heat.get(sample).copied().unwrap_or(0.0);
    match mode {
        DemandMode::Heating => heat,
        DemandMode::HeatingAndDhw => heat + consumer.dhw.get(sample).copied().unwrap_or(0.0),
    }
}

/// Outlet temperature after extracting `demand` W from `mass_flow` kg/s
/// entering at `t_in` K.
///
/// Without flow or without demand the water passes unchanged. The function is
/// pure, so applying it twice in one step gives the same result.
pub fn outlet_temperature(
    t_in: f64,
    demand: f64,
    mass_flow: f64,
    cp: f64,
    min_mass_flow: f64,
) -> f64 {
    if mass_flow <= min_mass_flow || demand <= 0.0 {
        return t_in;
    }
    t_in - demand / (mass_flow * cp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hn_core::JunctionId;
    use hn_core::units::dk;

    fn consumer() -> HeatConsumer {
        HeatConsumer {
            name: "H".into(),
            supply_junction: JunctionId::from_index(0),
            return_junction: JunctionId::from_index(1),
            design_delta_t: dk(30.0),
            heat: vec![1000.0, 2000.0],
            dhw: vec![100.0],
            demand: 0.0,
            mass_flow: 0.0,
            outlet_temperature: 0.0,
        }
    }

    #[test]
    fn balance_removes_demand() {
        let t = outlet_temperature(353.15, 41_800.0, 1.0, 4180.0, 1e-9);
        assert_relative_eq!(t, 343.15, epsilon = 1e-9);
    }

    #[test]
    fn no_flow_or_no_demand_passes_through() {
        assert_eq!(outlet_temperature(350.0, 1e4, 0.0, 4180.0, 1e-9), 350.0);
        assert_eq!(outlet_temperature(350.0, 0.0, 1.0, 4180.0, 1e-9), 350.0);
        assert_eq!(outlet_temperature(350.0, -5.0, 1.0, 4180.0, 1e-9), 350.0);
    }

    #[test]
    fn balance_is_idempotent() {
        let once = outlet_temperature(350.0, 5e3, 0.2, 4180.0, 1e-9);
        let twice = outlet_temperature(350.0, 5e3, 0.2, 4180.0, 1e-9);
        assert_eq!(once, twice);
    }

    #[test]
    fn demand_modes() {
        let c = consumer();
        assert_eq!(demand_at(&c, 0, DemandMode::Heating), 1000.0);
        assert_eq!(demand_at(&c, 0, DemandMode::HeatingAndDhw), 1100.0);
        assert_eq!(demand_at(&c, 1, DemandMode::HeatingAndDhw), 2000.0);
    }
}
