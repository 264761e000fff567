//! Scalar HUD telemetry
//!
//! A flat snapshot collaborators can render without reaching into the run.

use serde::Serialize;

use super::abilities::PowerUpBuff;
use super::state::{GameState, GameStatus};
use crate::LETTER_TARGET;

/// Remaining cooldown per triggered ability (seconds, 0 when ready)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CooldownReadout {
    pub sonic_pulse: f32,
    pub chrono_driver: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub status: GameStatus,
    pub score: u64,
    pub lives: u32,
    pub max_lives: u32,
    pub level: u32,
    pub lane_count: u32,
    pub distance: f32,
    pub gems: u32,
    pub speed: f32,
    /// Target word with uncollected letters as '_'
    pub letters: String,
    pub buffs: Vec<PowerUpBuff>,
    pub cooldowns: CooldownReadout,
    pub shield_active: bool,
    pub chrono_active: bool,
    pub entity_count: usize,
}

impl Telemetry {
    pub fn capture(state: &GameState) -> Self {
        let run = &state.run;
        let abilities = &run.abilities;
        let letters = LETTER_TARGET
            .iter()
            .enumerate()
            .map(|(i, c)| if run.letters.contains(i as u8) { *c } else { '_' })
            .collect();

        Self {
            status: run.status,
            score: run.score,
            lives: run.lives,
            max_lives: run.max_lives,
            level: run.level,
            lane_count: run.lane_count,
            distance: run.distance,
            gems: run.gems,
            speed: run.effective_speed(&state.tuning),
            letters,
            buffs: abilities.buffs.iter().copied().collect(),
            cooldowns: CooldownReadout {
                sonic_pulse: abilities.cooldowns.sonic_pulse,
                chrono_driver: abilities.cooldowns.chrono,
            },
            shield_active: abilities.shield_active,
            chrono_active: abilities.is_chrono_active(),
            entity_count: state.entities.active().count(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::PowerUpKind;

    #[test]
    fn test_capture_reflects_run() {
        let mut state = GameState::new(5);
        state.start();
        state.collect_letter(0);
        state.collect_letter(3);
        state.run.abilities.activate_buff(PowerUpKind::Frenzy, 8.0);

        let telemetry = Telemetry::capture(&state);
        assert_eq!(telemetry.status, GameStatus::Playing);
        assert_eq!(telemetry.letters, "G__I__");
        assert_eq!(telemetry.score, 1000);
        assert_eq!(telemetry.buffs.len(), 1);
        assert_eq!(telemetry.lives, 3);
    }

    #[test]
    fn test_json_has_hud_fields() {
        let state = GameState::new(5);
        let json = Telemetry::capture(&state).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "Menu");
        assert_eq!(value["lives"], 3);
        assert_eq!(value["letters"], "______");
        assert_eq!(value["cooldowns"]["sonic_pulse"], 0.0);
    }
}
