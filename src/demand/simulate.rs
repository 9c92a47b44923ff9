use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use tracing::warn;

/// Draw `runs` delivery counts from a Poisson distribution with rate `lambda`.
/// The same seed always yields the same counts; a rate Poisson cannot take (non-positive,
/// NaN or above `Poisson::MAX_LAMBDA`) yields zeros.
pub fn simulate_deliveries(lambda: f64, runs: usize, seed: u64) -> Vec<u64> {
    let poisson = match Poisson::new(lambda) {
        Ok(poisson) => poisson,
        Err(e) => {
            warn!("[simulate] rate {lambda} rejected ({e}); returning {runs} zero counts");
            return vec![0; runs];
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    (0..runs).map(|_| poisson.sample(&mut rng) as u64).collect()
}
