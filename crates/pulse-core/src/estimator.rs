use rand::Rng;

/// Source of the bounded random variation layered onto derived metrics.
///
/// The dashboard deliberately prefers a number that moves over one that is
/// frozen, so both the gateway aggregator and the watcher synthesize small
/// perturbations. Routing every draw through this trait lets tests inject
/// [`FixedEstimator`] and assert exact outputs.
pub trait Estimator: Send + Sync {
    /// Uniform sample in `[0, 1)`.
    fn sample(&self) -> f64;
}

/// Production estimator backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngEstimator;

impl Estimator for ThreadRngEstimator {
    fn sample(&self) -> f64 {
        rand::rng().random()
    }
}

/// Deterministic estimator for tests; every sample returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedEstimator(pub f64);

impl Estimator for FixedEstimator {
    fn sample(&self) -> f64 {
        self.0
    }
}
