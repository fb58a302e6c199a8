//! Undisturbed ground temperature around buried pipes.

/// Ground temperature series at one burial depth, K per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthSeries {
    pub depth: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroundProfile {
    /// Same temperature everywhere and always, K.
    Constant(f64),
    /// Series per depth. A pipe uses the series closest to its burial depth.
    ByDepth(Vec<DepthSeries>),
}

impl Default for GroundProfile {
    fn default() -> Self {
        GroundProfile::Constant(283.15)
    }
}

impl GroundProfile {
    /// Temperature at `depth` (m) for demand sample `sample`.
    ///
    /// Samples past the end of a series reuse its last value.
    pub fn temperature(&self, depth: f64, sample: usize) -> f64 {
        match self {
            GroundProfile::Constant(t) => *t,
            GroundProfile::ByDepth(series) => {
                let Some(nearest) = series.iter().min_by(|a, b| {
                    (a.depth - depth).abs().total_cmp(&(b.depth - depth).abs())
                }) else {
                    return f64::NAN;
                };
                nearest
                    .values
                    .get(sample)
                    .or(nearest.values.last())
                    .copied()
                    .unwrap_or(f64::NAN)
            }
        }
    }

    /// Checks that every value is a finite positive temperature and that each
    /// series covers `samples` samples.
    pub fn check(&self, samples: usize) -> Result<(), String> {
        match self {
            GroundProfile::Constant(t) => check_temperature(*t),
            GroundProfile::ByDepth(series) => {
                if series.is_empty() {
                    return Err("no ground temperature series given".to_string());
                }
                for s in series {
                    if s.values.len() < samples {
                        return Err(format!(
                            "series at depth {} m has {} samples, run needs {samples}",
                            s.depth,
                            s.values.len()
                        ));
                    }
                    if !s.depth.is_finite() {
                        return Err(format!("invalid depth {}", s.depth));
                    }
                    s.values.iter().try_for_each(|t| check_temperature(*t))?;
                }
                Ok(())
            }
        }
    }
}

fn check_temperature(t: f64) -> Result<(), String> {
    if t.is_finite() && t > 0.0 {
        Ok(())
    } else {
        Err(format!("invalid ground temperature {t} K"))
    }
}
