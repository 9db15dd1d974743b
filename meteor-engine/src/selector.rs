use meteor_common::{Target, DEFAULT_WEIGHT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks a target per dispatch tick in proportion to its weight.
///
/// Weights are normalized once at construction; a weight that is not a
/// positive finite number counts as `DEFAULT_WEIGHT`. The selector owns its
/// RNG, so a seeded instance produces a reproducible draw sequence.
///
/// | Weights     | Cumulative   | Roll `r` in `[0, 1)` picks |
/// |-------------|--------------|----------------------------|
/// | `[1, 1]`    | `[0.5, 1.0]` | first iff `r <= 0.5`       |
/// | `[3, 1]`    | `[0.75, 1.0]`| first iff `r <= 0.75`      |
#[derive(Debug, Clone)]
pub struct TargetSelector<R = StdRng> {
    targets: Vec<Target>,
    cumulative: Vec<f64>,
    rng: R,
}

impl TargetSelector<StdRng> {
    pub fn new(targets: &[Target]) -> Self {
        Self::with_rng(targets, StdRng::from_entropy())
    }

    pub fn seeded(targets: &[Target], seed: u64) -> Self {
        Self::with_rng(targets, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TargetSelector<R> {
    /// Panics if `targets` is empty; callers validate the config first.
    pub fn with_rng(targets: &[Target], rng: R) -> Self {
        assert!(!targets.is_empty(), "TargetSelector needs at least one target");

        let weights: Vec<f64> = targets
            .iter()
            .map(|t| if t.weight > 0.0 && t.weight.is_finite() { t.weight } else { DEFAULT_WEIGHT })
            .collect();
        let total: f64 = weights.iter().sum();

        let normalized: Vec<Target> = targets
            .iter()
            .zip(&weights)
            .map(|(t, w)| Target::new(t.url.clone(), w / total))
            .collect();

        let mut running = 0.0;
        let cumulative = normalized
            .iter()
            .map(|t| {
                running += t.weight;
                running
            })
            .collect();

        Self { targets: normalized, cumulative, rng }
    }

    /// Draw the next target URL.
    pub fn select(&mut self) -> &str {
        let roll: f64 = self.rng.gen();
        self.target_for_roll(roll)
    }

    /// Map a roll in `[0, 1)` to the first target whose cumulative weight is
    /// `>= roll`. Falls back to the last target when rounding leaves the final
    /// cumulative sum below the roll. Exposed for deterministic testing.
    pub fn target_for_roll(&self, roll: f64) -> &str {
        let idx = self
            .cumulative
            .iter()
            .position(|c| *c >= roll)
            .unwrap_or(self.targets.len() - 1);
        &self.targets[idx].url
    }

    /// Targets carrying their normalized weights, in configuration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn cumulative_weights(&self) -> &[f64] {
        &self.cumulative
    }
}
