//! Constant fluid properties.
//!
//! District heating water stays single phase and nearly incompressible over
//! the operating range, so one set of properties is used for the whole run.

use crate::units::{DynVisc, Density, SpecHeat, j_per_kg_k, kg_per_m3, pa_s};

/// Water properties shared by the hydraulic and thermal models.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidProperties {
    pub density: Density,
    pub cp: SpecHeat,
    pub viscosity: DynVisc,
}

impl FluidProperties {
    pub fn new(density_kg_m3: f64, cp_j_kg_k: f64, viscosity_pa_s: f64) -> Self {
        Self {
            density: kg_per_m3(density_kg_m3),
            cp: j_per_kg_k(cp_j_kg_k),
            viscosity: pa_s(viscosity_pa_s),
        }
    }

    /// Density in kg/m3.
    pub fn rho(&self) -> f64 {
        self.density.value
    }

    /// Specific heat capacity in J/(kg K).
    pub fn cp(&self) -> f64 {
        self.cp.value
    }

    /// Dynamic viscosity in Pa s.
    pub fn mu(&self) -> f64 {
        self.viscosity.value
    }
}

impl Default for FluidProperties {
    /// Water at roughly 60 degC.
    fn default() -> Self {
        Self::new(983.0, 4180.0, 4.7e-4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_water() {
        let fluid = FluidProperties::default();
        assert_eq!(fluid.rho(), 983.0);
        assert_eq!(fluid.cp(), 4180.0);
        assert!(fluid.mu() > 0.0);
    }
}
