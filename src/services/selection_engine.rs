// src/services/selection_engine.rs
// DOCUMENTATION: Spin wheel selection
// PURPOSE: Turn a spin trigger into a rotation and a winning category

use crate::errors::ServiceError;
use crate::models::{CategorySegment, Cuisine, SpinOutcome, WheelFilter, WheelState};
use crate::services::segment_builder::{build_segments, SynonymTable};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpinError {
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("no segments to spin")]
    EmptyWheel,
}

impl From<SpinError> for ServiceError {
    fn from(e: SpinError) -> Self {
        match e {
            SpinError::AlreadySpinning => ServiceError::SpinInProgress,
            SpinError::EmptyWheel => ServiceError::EmptyWheel,
        }
    }
}

/// Angle covered by one wedge
pub fn segment_angle(count: usize) -> f64 {
    360.0 / count as f64
}

/// Map any angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Index of the wedge under the fixed top pointer
/// DOCUMENTATION: Wedges are drawn clockwise from 12 o'clock, shifted back by
/// half a wedge so each wedge's centre (not its edge) sits under the pointer
/// at rest. The inverse mapping therefore adds half a wedge before dividing,
/// which keeps exact wedge-boundary rotations deterministic.
pub fn winning_index(rotation_degrees: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }

    let angle = segment_angle(count);
    let normalized = normalize_degrees(rotation_degrees);
    let under_pointer = (360.0 - normalized + angle / 2.0).rem_euclid(360.0);

    Some((under_pointer / angle).floor() as usize % count)
}

/// Deterministic core of a spin
/// DOCUMENTATION: `draw` is the random extra rotation in [0, 360); it is
/// ignored when a category is forced. A forced spin instead adds whatever
/// brings the wheel back upright (a multiple of 360°), so repeated forced
/// spins add exactly `full_rotations` turns.
pub fn spin_with_draw(
    current_rotation: f64,
    segments: &[CategorySegment],
    filter: &WheelFilter,
    draw: f64,
    full_rotations: u32,
) -> Result<SpinOutcome, SpinError> {
    let full_turns = f64::from(full_rotations.max(1)) * 360.0;

    match filter {
        WheelFilter::All => {
            if segments.is_empty() {
                return Err(SpinError::EmptyWheel);
            }

            let final_rotation = current_rotation + full_turns + normalize_degrees(draw);
            let index = winning_index(final_rotation, segments.len()).ok_or(SpinError::EmptyWheel)?;

            Ok(SpinOutcome {
                selected_category: segments[index].display_name.clone(),
                final_rotation_degrees: final_rotation,
                segment_index: Some(index),
            })
        }
        WheelFilter::Category(category) => {
            let to_upright = (360.0 - normalize_degrees(current_rotation)).rem_euclid(360.0);

            Ok(SpinOutcome {
                selected_category: category.clone(),
                final_rotation_degrees: current_rotation + full_turns + to_upright,
                segment_index: None,
            })
        }
    }
}

/// Wheel tuning
#[derive(Debug, Clone)]
pub struct WheelSettings {
    pub full_rotations: u32,
    pub forced_segments: usize,
    pub spin_duration: Duration,
    pub synonyms: SynonymTable,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            full_rotations: 5,
            forced_segments: 6,
            spin_duration: Duration::from_millis(4000),
            synonyms: SynonymTable::builtin(),
        }
    }
}

/// Wheel used when a caller does not identify itself
pub const DEFAULT_WHEEL: &str = "default";

/// Idle wheels are forgotten once this many are tracked
const MAX_WHEELS: usize = 10_000;

/// Stateful wheels, one per caller: rotation carried across spins plus the
/// idle/spinning guard
/// DOCUMENTATION: The outcome is computed when the spin starts but handed to
/// the caller only once the animation window has elapsed. Each caller key has
/// its own rotation and its own guard, so one caller's spin never blocks or
/// moves another caller's wheel.
pub struct SelectionEngine {
    settings: WheelSettings,
    wheels: Mutex<HashMap<String, WheelState>>,
}

/// Proof of an in-flight spin. Dropping it returns that wheel to idle.
pub struct SpinTicket<'a> {
    engine: &'a SelectionEngine,
    wheel: String,
    outcome: SpinOutcome,
}

impl SpinTicket<'_> {
    /// Outcome to reveal once the animation is over
    pub fn reveal(self) -> SpinOutcome {
        self.outcome.clone()
    }
}

impl Drop for SpinTicket<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.engine.lock_wheels().get_mut(&self.wheel) {
            state.is_spinning = false;
        }
    }
}

impl SelectionEngine {
    pub fn new(settings: WheelSettings) -> Self {
        Self {
            settings,
            wheels: Mutex::new(HashMap::new()),
        }
    }

    fn lock_wheels(&self) -> MutexGuard<'_, HashMap<String, WheelState>> {
        self.wheels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }

    /// State of one caller's wheel (an unseen caller is idle and upright)
    pub fn state(&self, wheel: &str) -> WheelState {
        self.lock_wheels().get(wheel).copied().unwrap_or_default()
    }

    pub fn is_spinning(&self, wheel: &str) -> bool {
        self.state(wheel).is_spinning
    }

    /// Number of wheels currently mid-spin
    pub fn spinning_count(&self) -> usize {
        self.lock_wheels().values().filter(|s| s.is_spinning).count()
    }

    pub fn build_segments(&self, cuisines: &[Cuisine], filter: &WheelFilter) -> Vec<CategorySegment> {
        build_segments(
            cuisines,
            filter,
            &self.settings.synonyms,
            self.settings.forced_segments,
        )
    }

    /// Start a spin on one caller's wheel: idle → spinning
    /// DOCUMENTATION: Rejected while that wheel already has a spin in flight.
    /// `current_rotation` is the caller's own rotation; when absent the
    /// rotation stored for the wheel is used. The new absolute rotation is
    /// stored immediately so the next spin continues from it.
    pub fn begin_spin<R: Rng + ?Sized>(
        &self,
        wheel: &str,
        current_rotation: Option<f64>,
        segments: &[CategorySegment],
        filter: &WheelFilter,
        rng: &mut R,
    ) -> Result<SpinTicket<'_>, SpinError> {
        let mut wheels = self.lock_wheels();
        let stored = wheels.get(wheel).copied().unwrap_or_default();
        if stored.is_spinning {
            return Err(SpinError::AlreadySpinning);
        }

        let draw = if filter.is_all() {
            rng.random_range(0.0..360.0)
        } else {
            0.0
        };

        let outcome = spin_with_draw(
            current_rotation.unwrap_or(stored.rotation_degrees),
            segments,
            filter,
            draw,
            self.settings.full_rotations,
        )?;

        if wheels.len() >= MAX_WHEELS && !wheels.contains_key(wheel) {
            wheels.retain(|_, state| state.is_spinning);
            log::warn!("Wheel table full, forgot idle wheels ({} still spinning)", wheels.len());
        }

        wheels.insert(
            wheel.to_string(),
            WheelState {
                is_spinning: true,
                rotation_degrees: outcome.final_rotation_degrees,
            },
        );
        drop(wheels);

        log::debug!(
            "Spin started on {}: category={}, rotation={:.1}",
            wheel,
            outcome.selected_category,
            outcome.final_rotation_degrees
        );

        Ok(SpinTicket {
            engine: self,
            wheel: wheel.to_string(),
            outcome,
        })
    }

    /// Full spin: build segments, start, wait out the animation, reveal
    pub async fn spin(
        &self,
        wheel: &str,
        current_rotation: Option<f64>,
        cuisines: &[Cuisine],
        filter: &WheelFilter,
    ) -> Result<SpinOutcome, SpinError> {
        let segments = self.build_segments(cuisines, filter);
        let ticket = {
            let mut rng = rand::rng();
            self.begin_spin(wheel, current_rotation, &segments, filter, &mut rng)?
        };

        tokio::time::sleep(self.settings.spin_duration).await;

        let outcome = ticket.reveal();
        log::info!("Spin on {} landed on: {}", wheel, outcome.selected_category);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn segments(names: &[&str]) -> Vec<CategorySegment> {
        names
            .iter()
            .map(|n| CategorySegment {
                display_name: n.to_string(),
                icon: "🍽️".to_string(),
                color: "#000000".to_string(),
            })
            .collect()
    }

    fn quick_engine() -> SelectionEngine {
        SelectionEngine::new(WheelSettings {
            spin_duration: Duration::from_millis(5),
            ..WheelSettings::default()
        })
    }

    #[test]
    fn test_winning_index_at_rest() {
        // upright wheel: wedge 0 is centred under the pointer
        assert_eq!(winning_index(0.0, 6), Some(0));
        assert_eq!(winning_index(1800.0, 6), Some(0));
        assert_eq!(winning_index(10.0, 0), None);
    }

    #[test]
    fn test_every_index_reachable_at_exact_multiples() {
        for count in 1..=12usize {
            let angle = segment_angle(count);
            for k in 0..count {
                let rotation = ((count - k) % count) as f64 * angle;
                assert_eq!(
                    winning_index(rotation, count),
                    Some(k),
                    "count={} k={}",
                    count,
                    k
                );
                // the same boundary rotation after extra full turns
                assert_eq!(winning_index(rotation + 1800.0, count), Some(k));
            }
        }
    }

    #[test]
    fn test_boundary_rotation_is_stable() {
        let count = 6;
        let angle = segment_angle(count);
        for k in 0..count {
            let edge = k as f64 * angle + angle / 2.0;
            let first = winning_index(edge, count);
            let second = winning_index(edge, count);
            assert_eq!(first, second);
            assert!(first.is_some());
        }
    }

    #[test]
    fn test_forced_category_always_wins() {
        let filter = WheelFilter::Category("burger".to_string());
        let wedges = segments(&["burger"; 6]);

        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let current: f64 = rng.random_range(0.0..100_000.0);
            let draw: f64 = rng.random_range(0.0..360.0);

            let outcome = spin_with_draw(current, &wedges, &filter, draw, 5).unwrap();
            assert_eq!(outcome.selected_category, "burger");
            assert_eq!(normalize_degrees(outcome.final_rotation_degrees).round() % 360.0, 0.0);
        }
    }

    #[test]
    fn test_all_filter_uses_geometry() {
        let wedges = segments(&["a", "b", "c", "d"]);
        // 5 turns + 270° leaves wedge 1 under the pointer
        let outcome = spin_with_draw(0.0, &wedges, &WheelFilter::All, 270.0, 5).unwrap();

        assert_eq!(outcome.final_rotation_degrees, 2070.0);
        assert_eq!(outcome.segment_index, Some(1));
        assert_eq!(outcome.selected_category, "b");
    }

    #[test]
    fn test_empty_wheel_refuses() {
        let result = spin_with_draw(0.0, &[], &WheelFilter::All, 10.0, 5);
        assert_eq!(result, Err(SpinError::EmptyWheel));
    }

    #[test]
    fn test_rotation_is_monotonic() {
        let engine = quick_engine();
        let wedges = segments(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut previous = engine.state(DEFAULT_WHEEL).rotation_degrees;

        for _ in 0..20 {
            let ticket = engine
                .begin_spin(DEFAULT_WHEEL, None, &wedges, &WheelFilter::All, &mut rng)
                .unwrap();
            let outcome = ticket.reveal();
            assert!(outcome.final_rotation_degrees > previous);
            previous = outcome.final_rotation_degrees;
        }
    }

    #[test]
    fn test_second_spin_rejected_while_spinning() {
        let engine = quick_engine();
        let wedges = segments(&["a", "b"]);
        let mut rng = StdRng::seed_from_u64(1);

        let ticket = engine
            .begin_spin("alice", None, &wedges, &WheelFilter::All, &mut rng)
            .unwrap();
        assert!(engine.is_spinning("alice"));
        assert!(matches!(
            engine.begin_spin("alice", None, &wedges, &WheelFilter::All, &mut rng),
            Err(SpinError::AlreadySpinning)
        ));

        drop(ticket);
        assert!(!engine.is_spinning("alice"));
        assert!(engine
            .begin_spin("alice", None, &wedges, &WheelFilter::All, &mut rng)
            .is_ok());
    }

    #[test]
    fn test_wheels_are_independent_per_caller() {
        let engine = quick_engine();
        let wedges = segments(&["a", "b"]);
        let burger = WheelFilter::Category("burger".to_string());
        let mut rng = StdRng::seed_from_u64(3);

        let alice = engine
            .begin_spin("alice", None, &wedges, &WheelFilter::All, &mut rng)
            .unwrap();
        let bob = engine
            .begin_spin("bob", None, &wedges, &burger, &mut rng)
            .unwrap();

        assert_eq!(engine.spinning_count(), 2);
        assert_eq!(bob.reveal().final_rotation_degrees, 1800.0);
        assert!(engine.is_spinning("alice"));
        assert!(!engine.is_spinning("bob"));

        // a caller seen for the first time starts upright
        assert_eq!(engine.state("carol"), WheelState::default());
        drop(alice);
        assert_eq!(engine.spinning_count(), 0);
    }

    #[test]
    fn test_supplied_rotation_overrides_stored() {
        let engine = quick_engine();
        let burger = WheelFilter::Category("burger".to_string());
        let mut rng = StdRng::seed_from_u64(5);

        let first = engine
            .begin_spin("alice", None, &[], &burger, &mut rng)
            .unwrap()
            .reveal();
        assert_eq!(first.final_rotation_degrees, 1800.0);

        let resumed = engine
            .begin_spin("alice", Some(90.0), &[], &burger, &mut rng)
            .unwrap()
            .reveal();
        assert_eq!(resumed.final_rotation_degrees, 90.0 + 1800.0 + 270.0);
        assert_eq!(engine.state("alice").rotation_degrees, 2160.0);
    }

    #[tokio::test]
    async fn test_forced_spins_chain_rotation() {
        let engine = quick_engine();
        let cuisines = vec![Cuisine::new("burger", "🍔"), Cuisine::new("sushi", "🍣")];
        let filter = WheelFilter::Category("burger".to_string());

        let first = engine.spin(DEFAULT_WHEEL, None, &cuisines, &filter).await.unwrap();
        let second = engine.spin(DEFAULT_WHEEL, None, &cuisines, &filter).await.unwrap();
        let third = engine.spin(DEFAULT_WHEEL, None, &cuisines, &filter).await.unwrap();

        for outcome in [&first, &second, &third] {
            assert_eq!(outcome.selected_category, "burger");
        }
        assert_eq!(first.final_rotation_degrees, 1800.0);
        assert_eq!(second.final_rotation_degrees - first.final_rotation_degrees, 1800.0);
        assert_eq!(third.final_rotation_degrees - second.final_rotation_degrees, 1800.0);
        assert_eq!(engine.state(DEFAULT_WHEEL).rotation_degrees, third.final_rotation_degrees);
        assert!(!engine.is_spinning(DEFAULT_WHEEL));
    }

    #[tokio::test]
    async fn test_spin_holds_result_until_animation_ends() {
        let engine = SelectionEngine::new(WheelSettings {
            spin_duration: Duration::from_secs(60),
            ..WheelSettings::default()
        });
        let cuisines = vec![Cuisine::new("burger", "🍔")];

        let mut spin =
            tokio_test::task::spawn(engine.spin(DEFAULT_WHEEL, None, &cuisines, &WheelFilter::All));
        tokio_test::assert_pending!(spin.poll());
        assert!(engine.is_spinning(DEFAULT_WHEEL));

        // abandoning the spin returns the wheel to idle
        drop(spin);
        assert!(!engine.is_spinning(DEFAULT_WHEEL));
    }

    #[tokio::test]
    async fn test_spin_with_no_cuisines_is_refused() {
        let engine = quick_engine();
        let result = engine.spin(DEFAULT_WHEEL, None, &[], &WheelFilter::All).await;

        assert_eq!(result, Err(SpinError::EmptyWheel));
        assert!(!engine.is_spinning(DEFAULT_WHEEL));
    }
}
