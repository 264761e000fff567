//! Session preferences
//!
//! Lives beside the run state rather than inside it: a restart keeps the
//! player's preferences. Nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Extra spawn spacing applied in accessibility mode
const ACCESSIBLE_SPACING_SCALE: f32 = 1.25;
/// Hazard pattern weight applied in accessibility mode
const ACCESSIBLE_HAZARD_WEIGHT: f32 = 0.5;

/// Player preferences that influence the simulation or its presentation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // === Accessibility ===
    /// Gentler content: wider spawn spacing, fewer hazards
    pub accessibility_mode: bool,
    /// Reduced motion (collaborators minimise shake and flashes)
    pub reduced_motion: bool,
    /// High contrast mode (display hint only)
    pub high_contrast: bool,
}

impl Settings {
    /// Flip accessibility mode, returning the new value
    pub fn toggle_accessibility_mode(&mut self) -> bool {
        self.accessibility_mode = !self.accessibility_mode;
        log::info!(
            "Accessibility mode {}",
            if self.accessibility_mode { "on" } else { "off" }
        );
        self.accessibility_mode
    }

    /// Multiplier on the minimum gap between spawn events
    pub fn spawn_spacing_scale(&self) -> f32 {
        if self.accessibility_mode {
            ACCESSIBLE_SPACING_SCALE
        } else {
            1.0
        }
    }

    /// Multiplier on hazard pattern weights
    pub fn hazard_weight_scale(&self) -> f32 {
        if self.accessibility_mode {
            ACCESSIBLE_HAZARD_WEIGHT
        } else {
            1.0
        }
    }

    /// Effective screen shake for collaborators (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.reduced_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_accessibility() {
        let mut settings = Settings::default();
        assert_eq!(settings.spawn_spacing_scale(), 1.0);
        assert!(settings.toggle_accessibility_mode());
        assert_eq!(settings.spawn_spacing_scale(), ACCESSIBLE_SPACING_SCALE);
        assert_eq!(settings.hazard_weight_scale(), ACCESSIBLE_HAZARD_WEIGHT);
        assert!(!settings.toggle_accessibility_mode());
        assert_eq!(settings.hazard_weight_scale(), 1.0);
    }
}
