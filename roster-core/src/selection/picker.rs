//! Random reviewer picking without replacement

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{seq::index, RngCore, SeedableRng};

use crate::model::User;

/// Picks up to `k` distinct reviewers from a candidate pool
///
/// The generator is supplied at construction. Seed it explicitly to get
/// reproducible picks; [`ReviewerPicker::from_time`] seeds from the clock.
pub struct ReviewerPicker<R = StdRng> {
    rng: Mutex<R>,
}

impl ReviewerPicker<StdRng> {
    /// Picker seeded from the current time
    pub fn from_time() -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::seeded(nanos as u64)
    }

    /// Picker with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded picker when `seed` is set, time-seeded otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_time(),
        }
    }
}

impl<R: RngCore> ReviewerPicker<R> {
    /// Picker drawing from the given generator
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick `min(k, candidates.len())` distinct user ids
    ///
    /// When the pool is no larger than `k` every candidate is returned in
    /// pool order and the generator is left untouched.
    pub fn pick(&self, candidates: &[&User], k: usize) -> Vec<String> {
        if candidates.len() <= k {
            return candidates.iter().map(|u| u.user_id.clone()).collect();
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        index::sample(&mut *rng, candidates.len(), k)
            .into_iter()
            .map(|i| candidates[i].user_id.clone())
            .collect()
    }
}

impl Default for ReviewerPicker<StdRng> {
    fn default() -> Self {
        Self::from_time()
    }
}
