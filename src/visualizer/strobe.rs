//! Random band inversion episodes with a square-wave flicker.

use log::debug;
use rand::Rng;

use super::Band;
use crate::params::EffectsConfig;

/// Current strobe episode, if any
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StrobeState {
    #[default]
    Idle,
    Active {
        /// Clock time (seconds) after which the episode ends
        ends_at: f64,
        /// Distinct band indices inverted for the whole episode
        selected: Vec<usize>,
    },
}

impl StrobeState {
    pub fn is_active(&self) -> bool {
        matches!(self, StrobeState::Active { .. })
    }
}

/// Two-state machine deciding which bands render inverted each frame
#[derive(Debug, Clone)]
pub struct StrobeController {
    state: StrobeState,
    chance: f64,
    duration_s: f64,
    band_count: (usize, usize),
    flicker_hz: f64,
}

impl StrobeController {
    pub fn new(effects: &EffectsConfig) -> Self {
        Self {
            state: StrobeState::Idle,
            chance: effects.invert_chance,
            duration_s: effects.invert_duration_s,
            band_count: effects.invert_band_count,
            flicker_hz: effects.invert_strobe_hz,
        }
    }

    pub fn state(&self) -> &StrobeState {
        &self.state
    }

    /// Flicker phase at `now`: inverted on even half-periods
    pub fn flicker_on(&self, now: f64) -> bool {
        (now * self.flicker_hz).floor() as i64 % 2 == 0
    }

    /// Start an episode over `selected` lasting the configured duration
    pub fn activate(&mut self, now: f64, selected: Vec<usize>) {
        debug!(
            "[STROBE] Inverting bands {:?} for {:.1}s",
            selected, self.duration_s
        );
        self.state = StrobeState::Active {
            ends_at: now + self.duration_s,
            selected,
        };
    }

    /// Advance one frame and write every band's inverted flag
    ///
    /// Order: expire a finished episode, roll for a new one while idle, then
    /// apply the flicker phase to the selected set.
    pub fn update<R: Rng + ?Sized>(&mut self, now: f64, bands: &mut [Band], rng: &mut R) {
        if let StrobeState::Active { ends_at, .. } = self.state {
            if now > ends_at {
                debug!("[STROBE] Episode over");
                self.state = StrobeState::Idle;
                for band in bands.iter_mut() {
                    band.inverted = false;
                }
            }
        }

        if !self.state.is_active() && rng.gen::<f64>() < self.chance {
            let selected = self.pick_bands(bands.len(), rng);
            self.activate(now, selected);
        }

        if let StrobeState::Active { selected, .. } = &self.state {
            let phase = self.flicker_on(now);
            for band in bands.iter_mut() {
                band.inverted = phase && selected.contains(&band.index);
            }
        }
    }

    /// Sample a band count from the configured range, then that many distinct bands
    fn pick_bands<R: Rng + ?Sized>(&self, total: usize, rng: &mut R) -> Vec<usize> {
        let (min, max) = self.band_count;
        let max = max.min(total);
        let min = min.min(max);
        let count = rng.gen_range(min..=max);
        rand::seq::index::sample(rng, total, count).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BandRange;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bands(count: usize) -> Vec<Band> {
        (0..count)
            .map(|i| Band::new(i, BandRange::new(i as f64 * 100.0, (i + 1) as f64 * 100.0)))
            .collect()
    }

    fn controller(chance: f64, band_count: (usize, usize)) -> StrobeController {
        let effects = EffectsConfig {
            invert_chance: chance,
            invert_band_count: band_count,
            ..EffectsConfig::default()
        };
        StrobeController::new(&effects)
    }

    fn inverted(bands: &[Band]) -> Vec<usize> {
        bands.iter().filter(|b| b.inverted).map(|b| b.index).collect()
    }

    #[test]
    fn test_forced_episode_flicker_phase() {
        let mut strobe = controller(0.0, (1, 2));
        let mut bands = bands(6);
        let mut rng = StepRng::new(u64::MAX, 0);

        strobe.activate(0.0, vec![0, 2]);

        // floor(0.1 * 3) = 0 -> on
        strobe.update(0.1, &mut bands, &mut rng);
        assert_eq!(inverted(&bands), vec![0, 2]);

        // floor(0.5 * 3) = 1 -> off
        strobe.update(0.5, &mut bands, &mut rng);
        assert!(inverted(&bands).is_empty());
        assert!(strobe.state().is_active());

        // floor(0.7 * 3) = 2 -> on again
        strobe.update(0.7, &mut bands, &mut rng);
        assert_eq!(inverted(&bands), vec![0, 2]);
    }

    #[test]
    fn test_episode_expiry_resets_all_flags() {
        let mut strobe = controller(0.0, (1, 2));
        let mut bands = bands(6);
        let mut rng = StepRng::new(u64::MAX, 0);

        strobe.activate(0.0, vec![1, 4]);
        strobe.update(2.4, &mut bands, &mut rng);
        // Still active at exactly the end time
        assert!(strobe.state().is_active());

        bands[3].inverted = true;
        strobe.update(2.41, &mut bands, &mut rng);
        assert_eq!(strobe.state(), &StrobeState::Idle);
        assert!(inverted(&bands).is_empty());
    }

    #[test]
    fn test_no_new_roll_while_active() {
        let mut strobe = controller(1.0, (1, 1));
        let mut bands = bands(6);
        let mut rng = StdRng::seed_from_u64(3);

        strobe.update(0.0, &mut bands, &mut rng);
        let first = strobe.state().clone();
        assert!(first.is_active());

        for frame in 1..100 {
            strobe.update(frame as f64 * 0.016, &mut bands, &mut rng);
            assert_eq!(strobe.state(), &first);
        }
    }

    #[test]
    fn test_zero_chance_never_activates() {
        let mut strobe = controller(0.0, (1, 2));
        let mut bands = bands(6);
        let mut always = StepRng::new(0, 0);

        for frame in 0..100 {
            strobe.update(frame as f64 * 0.016, &mut bands, &mut always);
        }
        assert!(!strobe.state().is_active());
        assert!(inverted(&bands).is_empty());
    }

    #[test]
    fn test_episode_selection_within_range_and_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        for seed_frame in 0..200 {
            let mut strobe = controller(1.0, (2, 4));
            let mut bands = bands(6);
            strobe.update(seed_frame as f64, &mut bands, &mut rng);

            let StrobeState::Active { selected, .. } = strobe.state() else {
                panic!("strobe should have activated");
            };
            assert!((2..=4).contains(&selected.len()));
            let mut unique = selected.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), selected.len());
            assert!(selected.iter().all(|&i| i < 6));
        }
    }

    #[test]
    fn test_full_invert_episode() {
        let mut strobe = controller(1.0, (6, 6));
        let mut bands = bands(6);
        let mut rng = StdRng::seed_from_u64(9);

        // floor(0.0 * 3) = 0 -> phase on
        strobe.update(0.0, &mut bands, &mut rng);
        assert_eq!(inverted(&bands), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_new_episode_after_expiry() {
        let mut strobe = controller(1.0, (1, 1));
        let mut bands = bands(3);
        let mut rng = StdRng::seed_from_u64(11);

        strobe.update(0.0, &mut bands, &mut rng);
        let StrobeState::Active { ends_at, .. } = strobe.state().clone() else {
            panic!("strobe should have activated");
        };
        assert!((ends_at - 2.4).abs() < 1e-9);

        // Expires and immediately re-rolls with chance 1.0
        strobe.update(3.0, &mut bands, &mut rng);
        let StrobeState::Active { ends_at, selected } = strobe.state().clone() else {
            panic!("strobe should have re-activated");
        };
        assert!((ends_at - 5.4).abs() < 1e-9);
        assert_eq!(selected.len(), 1);
        // floor(3.0 * 3) = 9 -> phase off
        assert!(inverted(&bands).is_empty());
    }
}
