//! Data-driven game balance
//!
//! Every number a designer is expected to tweak lives here. Fixed geometry
//! (lane width, spawn horizon, ...) stays in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to load a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Balance knobs. Missing fields in a JSON file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Forward speed at run start (units/s)
    pub base_run_speed: f32,
    /// Speed added per collected letter, as a fraction of base speed
    pub letter_speed_step: f32,
    /// Speed added per level-up, as a fraction of base speed
    pub level_speed_step: f32,
    /// Forward speed multiplier while the Speed buff is active
    pub speed_boost_factor: f32,
    /// Missile pursuit speed: base + per-level
    pub missile_base_speed: f32,
    pub missile_level_speed: f32,

    // === Score ===
    pub letter_score: u64,
    pub victory_bonus: u64,
    pub gem_points: u32,
    pub frenzy_multiplier: u64,

    // === Lives ===
    pub starting_lives: u32,
    /// Damage immunity after losing a life (seconds)
    pub hit_recovery: f32,

    // === Letters ===
    pub base_letter_interval: f32,
    pub letter_interval_growth: f32,

    // === Buff durations (seconds, before the duration modifier) ===
    pub speed_buff_duration: f32,
    pub frenzy_buff_duration: f32,
    pub shield_buff_duration: f32,

    // === Abilities ===
    pub immortality_duration: f32,
    pub dash_duration: f32,
    pub sonic_pulse_cooldown: f32,
    /// How far ahead of the player the sonic pulse clears hazards
    pub sonic_pulse_range: f32,
    pub chrono_cooldown: f32,
    pub chrono_duration: f32,
    /// Global time dilation while the chrono-driver runs
    pub chrono_time_scale: f32,
    pub shield_recharge: f32,

    // === Spawning ===
    /// Chance that a due spawn slot is left empty
    pub spawn_skip_chance: f32,
    pub spawn_gap_base: f32,
    pub spawn_gap_speed_factor: f32,
    /// Fraction of the gap removed at difficulty 1.0
    pub spawn_gap_compression: f32,

    // === Shop ===
    pub shop_offer_size: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_run_speed: 22.5,
            letter_speed_step: 0.10,
            level_speed_step: 0.40,
            speed_boost_factor: 1.5,
            missile_base_speed: 30.0,
            missile_level_speed: 2.5,

            letter_score: 500,
            victory_bonus: 10_000,
            gem_points: 50,
            frenzy_multiplier: 3,

            starting_lives: 3,
            hit_recovery: 1.5,

            base_letter_interval: 150.0,
            letter_interval_growth: 1.3,

            speed_buff_duration: 4.0,
            frenzy_buff_duration: 8.0,
            shield_buff_duration: 6.0,

            immortality_duration: 5.0,
            dash_duration: 0.8,
            sonic_pulse_cooldown: 30.0,
            sonic_pulse_range: 40.0,
            chrono_cooldown: 45.0,
            chrono_duration: 5.0,
            chrono_time_scale: 0.5,
            shield_recharge: 20.0,

            spawn_skip_chance: 0.08,
            spawn_gap_base: 10.0,
            spawn_gap_speed_factor: 0.35,
            spawn_gap_compression: 0.3,

            shop_offer_size: 3,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a tuning file, falling back to defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {:?}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Tuning at {:?} unusable ({}), using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.base_run_speed <= 0.0 {
            return Err(TuningError::Invalid("base_run_speed must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.spawn_skip_chance) {
            return Err(TuningError::Invalid("spawn_skip_chance must be in [0, 1)".into()));
        }
        if !(0.0..1.0).contains(&self.spawn_gap_compression) {
            return Err(TuningError::Invalid(
                "spawn_gap_compression must be in [0, 1)".into(),
            ));
        }
        if self.chrono_time_scale <= 0.0 || self.chrono_time_scale > 1.0 {
            return Err(TuningError::Invalid(
                "chrono_time_scale must be in (0, 1]".into(),
            ));
        }
        if self.starting_lives == 0 {
            return Err(TuningError::Invalid("starting_lives must be at least 1".into()));
        }
        if self.letter_interval_growth < 1.0 || self.base_letter_interval <= 0.0 {
            return Err(TuningError::Invalid("letter interval must grow from a positive base".into()));
        }
        Ok(())
    }

    /// Forward speed gained per collected letter
    pub fn letter_speed_increase(&self) -> f32 {
        self.base_run_speed * self.letter_speed_step
    }

    /// Forward speed gained per level-up
    pub fn level_speed_increase(&self) -> f32 {
        self.base_run_speed * self.level_speed_step
    }

    /// Missile pursuit speed on a given level
    pub fn missile_speed(&self, level: u32) -> f32 {
        self.missile_base_speed + level as f32 * self.missile_level_speed
    }

    /// Distance between letter spawns on a given level
    pub fn letter_interval(&self, level: u32) -> f32 {
        self.base_letter_interval
            * self
                .letter_interval_growth
                .powi(level.saturating_sub(1) as i32)
    }
}
