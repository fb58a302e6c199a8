//! Adiabatic mixing of the streams entering a junction.

use tracing::{debug, warn};

/// A stream entering a junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inflow {
    /// kg/s, must be positive to take part in the mix.
    pub mass_flow: f64,
    /// K
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixOutcome {
    pub temperature: f64,
    /// Inflows left out (no flow, backflow or non-finite values).
    pub excluded: usize,
}

/// Flow-weighted mean temperature of `inflows`.
///
/// A single valid inflow passes its temperature through unchanged; with no
/// valid inflow the junction keeps `current`.
pub fn mix(current: f64, inflows: &[Inflow]) -> MixOutcome {
    let mut excluded = 0;
    let mut total = 0.0;
    let mut weighted = 0.0;
    let mut valid = 0;
    let mut single = current;

    for inflow in inflows {
        if !(inflow.mass_flow.is_finite() && inflow.temperature.is_finite()) {
            warn!(
                mass_flow = inflow.mass_flow,
                temperature = inflow.temperature,
                "non-finite inflow excluded from mixing"
            );
            excluded += 1;
        } else if inflow.mass_flow < 0.0 {
            warn!(mass_flow = inflow.mass_flow, "backflow excluded from mixing");
            excluded += 1;
        } else if inflow.mass_flow == 0.0 {
            debug!("zero inflow excluded from mixing");
            excluded += 1;
        } else {
            valid += 1;
            single = inflow.temperature;
            total += inflow.mass_flow;
            weighted += inflow.mass_flow * inflow.temperature;
        }
    }

    let temperature = match valid {
        0 => current,
        1 => single,
        _ => weighted / total,
    };
    MixOutcome {
        temperature,
        excluded,
    }
}
