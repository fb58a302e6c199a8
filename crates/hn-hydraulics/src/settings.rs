/// Convergence controls passed to every hydraulic solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub max_iterations: usize,
    /// Absolute tolerance on the junction mass imbalance norm, kg/s.
    pub tolerance: f64,
    /// Line search backtracking factor.
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
    /// Lowest admissible junction pressure, Pa.
    pub min_pressure: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            min_pressure: 1.0,
        }
    }
}

impl SolverSettings {
    /// Looser settings for the single retry after a failed solve.
    pub fn relaxed(&self) -> Self {
        Self {
            max_iterations: self.max_iterations * 2,
            tolerance: self.tolerance * 10.0,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_loosens_tolerance_and_iterations() {
        let base = SolverSettings::default();
        let relaxed = base.relaxed();
        assert_eq!(relaxed.max_iterations, 100);
        assert!((relaxed.tolerance - 1e-7).abs() < 1e-20);
        assert_eq!(relaxed.min_pressure, base.min_pressure);
    }
}
