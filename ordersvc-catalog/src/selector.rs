use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses which catalog entry a request works on.
pub trait OrderSelector: Send + Sync {
    /// Index in `[0, len)`. Callers never pass `len == 0`.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform selection backed by a single generator shared by all requests.
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sequence, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}
