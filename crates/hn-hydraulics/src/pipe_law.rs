//! Pressure drop law of a straight pipe.

use std::f64::consts::PI;

use hn_core::FluidProperties;
use hn_network::Pipe;

/// `dp = r_lin * m + r_quad * m * |m|` with `dp` in Pa and `m` in kg/s.
///
/// The linear part is the Hagen-Poiseuille resistance, the quadratic part the
/// fully rough Colebrook friction plus minor losses. Keeping a laminar term
/// makes the law strictly monotone and its derivative finite at zero flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeLaw {
    pub r_lin: f64,
    pub r_quad: f64,
}

impl PipeLaw {
    pub fn new(
        length: f64,
        diameter: f64,
        roughness: f64,
        minor_loss: f64,
        fluid: &FluidProperties,
    ) -> Self {
        let rho = fluid.rho();
        let d4 = diameter.powi(4);
        let r_lin = 128.0 * fluid.mu() * length / (rho * PI * d4);
        let f = rough_friction_factor(roughness, diameter);
        let r_quad = (f * length / diameter + minor_loss) * 8.0 / (rho * PI * PI * d4);
        Self { r_lin, r_quad }
    }

    pub fn for_pipe(pipe: &Pipe, fluid: &FluidProperties) -> Self {
        Self::new(
            pipe.length.value,
            pipe.inner_diameter.value,
            pipe.roughness.value,
            pipe.minor_loss,
            fluid,
        )
    }

    pub fn pressure_drop(&self, mass_flow: f64) -> f64 {
        self.r_lin * mass_flow + self.r_quad * mass_flow * mass_flow.abs()
    }

    /// Inverse of [`pressure_drop`](Self::pressure_drop).
    pub fn mass_flow(&self, dp: f64) -> f64 {
        let a = self.r_lin;
        let root = (a * a + 4.0 * self.r_quad * dp.abs()).sqrt();
        // Rationalized root of b m^2 + a m - |dp| = 0, also valid for b = 0.
        2.0 * dp / (a + root)
    }

    /// `d mass_flow / d dp` at pressure difference `dp`.
    pub fn conductance(&self, dp: f64) -> f64 {
        let m = self.mass_flow(dp);
        1.0 / (self.r_lin + 2.0 * self.r_quad * m.abs())
    }
}

/// Darcy friction factor in the fully rough regime, `0.25 / log10(e / 3.7 d)^2`.
/// A smooth wall yields zero.
pub fn rough_friction_factor(roughness: f64, diameter: f64) -> f64 {
    if roughness <= 0.0 {
        return 0.0;
    }
    0.25 / (roughness / (3.7 * diameter)).log10().powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn law() -> PipeLaw {
        PipeLaw::new(100.0, 0.1071, 2.5e-5, 1.2, &FluidProperties::default())
    }

    #[test]
    fn friction_factor_of_typical_steel_pipe() {
        let f = rough_friction_factor(2.5e-5, 0.1);
        assert!(f > 0.01 && f < 0.02, "f = {f}");
        assert_eq!(rough_friction_factor(0.0, 0.1), 0.0);
    }

    #[test]
    fn zero_flow_has_laminar_conductance() {
        let law = law();
        assert_eq!(law.mass_flow(0.0), 0.0);
        assert_relative_eq!(law.conductance(0.0), 1.0 / law.r_lin);
    }

    #[test]
    fn linear_law_without_quadratic_part() {
        let law = PipeLaw {
            r_lin: 2.0,
            r_quad: 0.0,
        };
        assert_relative_eq!(law.mass_flow(10.0), 5.0);
    }

    proptest! {
        #[test]
        fn inverse_recovers_mass_flow(m in -50.0_f64..50.0) {
            let law = law();
            let dp = law.pressure_drop(m);
            prop_assert!((law.mass_flow(dp) - m).abs() <= 1e-9 * (1.0 + m.abs()));
        }

        #[test]
        fn conductance_matches_finite_difference(mag in 1.0_f64..2.0e5, negative in any::<bool>()) {
            let law = law();
            let dp = if negative { -mag } else { mag };
            let h = 1e-3;
            let fd = (law.mass_flow(dp + h) - law.mass_flow(dp - h)) / (2.0 * h);
            prop_assert!((law.conductance(dp) - fd).abs() <= 1e-5 * law.conductance(dp));
        }
    }
}
