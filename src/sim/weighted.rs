//! Weighted choice over a small list of variants
//!
//! Options are walked in order against cumulative thresholds; the first
//! threshold above the roll wins, so list order is part of the distribution.

use rand::Rng;

/// Pick from `(weight, value)` pairs using a uniform `roll` in [0, 1).
///
/// Non-positive weights are skipped. Returns `None` when nothing has weight.
pub fn choose_with_roll<T: Copy>(options: &[(f32, T)], roll: f32) -> Option<T> {
    let total: f32 = options.iter().map(|(w, _)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let target = roll.clamp(0.0, 1.0) * total;
    let mut threshold = 0.0;
    let mut last = None;
    for &(weight, value) in options {
        if weight <= 0.0 {
            continue;
        }
        threshold += weight;
        if target < threshold {
            return Some(value);
        }
        last = Some(value);
    }
    // roll == 1.0 or float drift past the final threshold
    last
}

/// Pick from `(weight, value)` pairs with a fresh roll from `rng`
pub fn choose<T: Copy, R: Rng>(rng: &mut R, options: &[(f32, T)]) -> Option<T> {
    let roll: f32 = rng.random();
    choose_with_roll(options, roll)
}
