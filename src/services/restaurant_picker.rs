// src/services/restaurant_picker.rs
// DOCUMENTATION: Second-stage pick of a restaurant within the winning category
// PURPOSE: Uniform random pick that avoids repeating the most recent results

use crate::models::PickCandidate;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Anti-repeat restaurant picker
/// DOCUMENTATION: Remembers the last `history_len` picked ids (1 = "not the
/// same one twice in a row"). Owned by the service instance; state is
/// best-effort and shared by every caller of that instance.
pub struct RestaurantPicker {
    history_len: usize,
    recent: Mutex<VecDeque<String>>,
}

impl RestaurantPicker {
    pub fn new(history_len: usize) -> Self {
        Self {
            history_len,
            recent: Mutex::new(VecDeque::with_capacity(history_len)),
        }
    }

    /// Most recently picked id
    pub fn last_picked(&self) -> Option<String> {
        self.recent
            .lock()
            .ok()
            .and_then(|recent| recent.back().cloned())
    }

    /// Pick one candidate
    /// DOCUMENTATION: Recently picked ids are excluded while alternatives
    /// remain. When every candidate is recent, only the very last pick is
    /// excluded; a single candidate is always allowed to repeat.
    pub fn pick<'a, R: Rng + ?Sized>(
        &self,
        candidates: &'a [PickCandidate],
        rng: &mut R,
    ) -> Option<&'a PickCandidate> {
        if candidates.is_empty() {
            return None;
        }

        let mut recent = self
            .recent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let fresh: Vec<&PickCandidate> = candidates
            .iter()
            .filter(|c| !recent.contains(&c.id))
            .collect();

        let pool: Vec<&PickCandidate> = if !fresh.is_empty() {
            fresh
        } else if candidates.len() > 1 {
            let last = recent.back().cloned();
            candidates
                .iter()
                .filter(|c| Some(&c.id) != last.as_ref())
                .collect()
        } else {
            candidates.iter().collect()
        };

        // every candidate shares the last id (duplicated ids)
        let pool = if pool.is_empty() {
            candidates.iter().collect()
        } else {
            pool
        };

        let chosen = pool[rng.random_range(0..pool.len())];

        if self.history_len > 0 {
            recent.push_back(chosen.id.clone());
            while recent.len() > self.history_len {
                recent.pop_front();
            }
        }

        log::debug!(
            "Picked restaurant {} from {} candidates ({} eligible)",
            chosen.id,
            candidates.len(),
            pool.len()
        );

        Some(chosen)
    }
}
