use crate::sim::rng::RandomSource;

/// Battery state of charge modelled as a bounded random walk.
///
/// Each tick the level moves by a uniform step in `[-step_pct, +step_pct]`
/// and is clamped to `[min_pct, max_pct]`.
#[derive(Debug, Clone)]
pub struct Battery {
    /// State of charge in percent.
    pub level_pct: f64,

    /// Lower clamp in percent.
    pub min_pct: f64,

    /// Upper clamp in percent.
    pub max_pct: f64,

    /// Half-width of the per-tick step in percent.
    pub step_pct: f64,
}

impl Battery {
    /// Creates a new battery.
    ///
    /// # Arguments
    ///
    /// * `level_pct` - Initial state of charge (%), clamped into bounds
    /// * `min_pct` - Lower bound (%)
    /// * `max_pct` - Upper bound (%)
    /// * `step_pct` - Half-width of the random walk step (%)
    ///
    /// # Panics
    ///
    /// Panics if `min_pct > max_pct`.
    pub fn new(level_pct: f64, min_pct: f64, max_pct: f64, step_pct: f64) -> Self {
        assert!(min_pct <= max_pct);
        Self {
            level_pct: level_pct.clamp(min_pct, max_pct),
            min_pct,
            max_pct,
            step_pct: step_pct.max(0.0),
        }
    }

    /// Advances the walk by one tick and returns the new level.
    pub fn advance(&mut self, rng: &mut dyn RandomSource) -> f64 {
        let step = rng.uniform(-self.step_pct, self.step_pct);
        self.level_pct = (self.level_pct + step).clamp(self.min_pct, self.max_pct);
        self.level_pct
    }
}
