//! Abilities, timed buffs and cooldowns
//!
//! Every delayed effect is a countdown advanced by [`AbilityState::update`],
//! so freezing the tick (pause, shop) freezes them too.

use serde::{Deserialize, Serialize};

use super::entity::PowerUpKind;

/// Score multiplier cap
pub const MAX_SCORE_MULTIPLIER: u64 = 2;
/// Buff duration modifier: step per upgrade and upgrade cap (1.0 -> 2.0)
pub const DURATION_MOD_STEP: f32 = 0.25;
pub const MAX_DURATION_UPGRADES: u8 = 4;
/// Cooldown modifier: step per upgrade and upgrade cap (1.0 -> 0.55)
pub const COOLDOWN_MOD_STEP: f32 = 0.15;
pub const MAX_COOLDOWN_UPGRADES: u8 = 3;

/// Player-owned abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    DoubleJump,
    Immortality,
    Magnet,
    Shield,
    Dash,
    SonicPulse,
    Rebirth,
    ChronoDriver,
}

/// What the player has bought this run. Only ever improves until restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub double_jump: bool,
    pub immortality: bool,
    pub magnet: bool,
    pub shield: bool,
    pub dash: bool,
    pub sonic_pulse: bool,
    pub rebirth: bool,
    pub chrono_driver: bool,
    pub score_multiplier: u64,
    /// Duration boosts bought; see [`Inventory::duration_mod`]
    pub duration_upgrades: u8,
    /// Cooldown tuners bought; see [`Inventory::cooldown_mod`]
    pub cooldown_upgrades: u8,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            double_jump: false,
            immortality: false,
            magnet: false,
            shield: false,
            dash: false,
            sonic_pulse: false,
            rebirth: false,
            chrono_driver: false,
            score_multiplier: 1,
            duration_upgrades: 0,
            cooldown_upgrades: 0,
        }
    }
}

impl Inventory {
    pub fn owns(&self, ability: Ability) -> bool {
        match ability {
            Ability::DoubleJump => self.double_jump,
            Ability::Immortality => self.immortality,
            Ability::Magnet => self.magnet,
            Ability::Shield => self.shield,
            Ability::Dash => self.dash,
            Ability::SonicPulse => self.sonic_pulse,
            Ability::Rebirth => self.rebirth,
            Ability::ChronoDriver => self.chrono_driver,
        }
    }

    /// Set an ownership flag; returns false if it was already owned
    pub fn grant(&mut self, ability: Ability) -> bool {
        let flag = match ability {
            Ability::DoubleJump => &mut self.double_jump,
            Ability::Immortality => &mut self.immortality,
            Ability::Magnet => &mut self.magnet,
            Ability::Shield => &mut self.shield,
            Ability::Dash => &mut self.dash,
            Ability::SonicPulse => &mut self.sonic_pulse,
            Ability::Rebirth => &mut self.rebirth,
            Ability::ChronoDriver => &mut self.chrono_driver,
        };
        let newly = !*flag;
        *flag = true;
        newly
    }

    pub fn multiplier_maxed(&self) -> bool {
        self.score_multiplier >= MAX_SCORE_MULTIPLIER
    }

    pub fn duration_maxed(&self) -> bool {
        self.duration_upgrades >= MAX_DURATION_UPGRADES
    }

    pub fn cooldown_maxed(&self) -> bool {
        self.cooldown_upgrades >= MAX_COOLDOWN_UPGRADES
    }

    /// Scales buff durations
    pub fn duration_mod(&self) -> f32 {
        1.0 + DURATION_MOD_STEP * self.duration_upgrades as f32
    }

    /// Scales ability cooldowns
    pub fn cooldown_mod(&self) -> f32 {
        1.0 - COOLDOWN_MOD_STEP * self.cooldown_upgrades as f32
    }

    pub fn upgrade_multiplier(&mut self) {
        self.score_multiplier = MAX_SCORE_MULTIPLIER;
    }

    pub fn upgrade_duration(&mut self) {
        self.duration_upgrades = (self.duration_upgrades + 1).min(MAX_DURATION_UPGRADES);
    }

    pub fn upgrade_cooldown(&mut self) {
        self.cooldown_upgrades = (self.cooldown_upgrades + 1).min(MAX_COOLDOWN_UPGRADES);
    }
}

/// One active timed buff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpBuff {
    pub kind: PowerUpKind,
    pub time_left: f32,
}

/// Active timed buffs, at most one per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    active: Vec<PowerUpBuff>,
    speed_boosted: bool,
    frenzy_active: bool,
    temp_invincible: bool,
}

impl Buffs {
    /// Start a buff, or reset its clock if already running
    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) {
        match self.active.iter_mut().find(|b| b.kind == kind) {
            Some(buff) => buff.time_left = duration,
            None => self.active.push(PowerUpBuff {
                kind,
                time_left: duration,
            }),
        }
        self.recompute();
    }

    pub fn update(&mut self, dt: f32) {
        for buff in &mut self.active {
            buff.time_left -= dt;
        }
        self.active.retain(|b| b.time_left > 0.0);
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        let has = |kind: PowerUpKind| self.active.iter().any(|b| b.kind == kind);
        let (speed, frenzy, shield) = (
            has(PowerUpKind::Speed),
            has(PowerUpKind::Frenzy),
            has(PowerUpKind::Shield),
        );
        self.speed_boosted = speed;
        self.frenzy_active = frenzy;
        self.temp_invincible = shield;
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerUpBuff> {
        self.active.iter()
    }

    pub fn time_left(&self, kind: PowerUpKind) -> Option<f32> {
        self.active.iter().find(|b| b.kind == kind).map(|b| b.time_left)
    }

    pub fn is_speed_boosted(&self) -> bool {
        self.speed_boosted
    }

    pub fn is_frenzy_active(&self) -> bool {
        self.frenzy_active
    }

    pub fn is_temp_invincible(&self) -> bool {
        self.temp_invincible
    }
}

/// Remaining cooldowns of the triggered abilities (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub sonic_pulse: f32,
    pub chrono: f32,
}

impl Cooldowns {
    pub fn update(&mut self, dt: f32) {
        self.sonic_pulse = (self.sonic_pulse - dt).max(0.0);
        self.chrono = (self.chrono - dt).max(0.0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Ability ownership plus every ability/buff timer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    pub inventory: Inventory,
    pub buffs: Buffs,
    pub cooldowns: Cooldowns,
    pub immortality_left: f32,
    pub dash_left: f32,
    pub chrono_left: f32,
    /// Grace period after losing a life
    pub recovery_left: f32,
    pub shield_active: bool,
    /// Countdown to re-arming the plasma shield after it absorbed a hit
    pub shield_recharge_left: Option<f32>,
    pub rebirth_used: bool,
}

impl AbilityState {
    pub fn is_immortal(&self) -> bool {
        self.immortality_left > 0.0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_left > 0.0
    }

    pub fn is_chrono_active(&self) -> bool {
        self.chrono_left > 0.0
    }

    /// Damage is dropped before shield or lives are considered
    pub fn ignores_damage(&self) -> bool {
        self.is_immortal()
            || self.is_dashing()
            || self.buffs.is_temp_invincible()
            || self.buffs.is_speed_boosted()
            || self.recovery_left > 0.0
    }

    /// Global time dilation for this tick
    pub fn time_scale(&self, chrono_scale: f32) -> f32 {
        if self.is_chrono_active() { chrono_scale } else { 1.0 }
    }

    /// Start a pickup buff scaled by the owned duration modifier
    pub fn activate_buff(&mut self, kind: PowerUpKind, base_duration: f32) {
        self.buffs
            .activate(kind, base_duration * self.inventory.duration_mod());
    }

    pub fn activate_immortality(&mut self, duration: f32) -> bool {
        if !self.inventory.immortality || self.is_immortal() {
            return false;
        }
        self.immortality_left = duration;
        true
    }

    pub fn activate_dash(&mut self, duration: f32) -> bool {
        if !self.inventory.dash || self.is_dashing() {
            return false;
        }
        self.dash_left = duration;
        true
    }

    /// Arm the sonic pulse cooldown; the sweep itself is the resolver's job
    pub fn activate_sonic_pulse(&mut self, base_cooldown: f32) -> bool {
        if !self.inventory.sonic_pulse || self.cooldowns.sonic_pulse > 0.0 {
            return false;
        }
        self.cooldowns.sonic_pulse = base_cooldown * self.inventory.cooldown_mod();
        true
    }

    pub fn activate_chrono(&mut self, base_cooldown: f32, duration: f32) -> bool {
        if !self.inventory.chrono_driver || self.cooldowns.chrono > 0.0 {
            return false;
        }
        self.cooldowns.chrono = base_cooldown * self.inventory.cooldown_mod();
        self.chrono_left = duration;
        true
    }

    /// Spend the plasma shield on a hit. Returns false if it was down.
    pub fn absorb_hit(&mut self, recharge: f32) -> bool {
        if !self.shield_active {
            return false;
        }
        self.shield_active = false;
        self.shield_recharge_left = Some(recharge);
        true
    }

    /// Re-arm the shield immediately if owned (purchase, level-up)
    pub fn rearm_shield(&mut self) {
        if self.inventory.shield {
            self.shield_active = true;
            self.shield_recharge_left = None;
        }
    }

    /// Advance all timers. Buffs and ability windows run on dilated time;
    /// cooldowns, the chrono window itself and the shield recharge run on real time.
    ///
    /// Returns true if the shield re-armed this tick.
    pub fn update(&mut self, scaled_dt: f32, raw_dt: f32) -> bool {
        self.buffs.update(scaled_dt);
        self.immortality_left = (self.immortality_left - scaled_dt).max(0.0);
        self.dash_left = (self.dash_left - scaled_dt).max(0.0);
        self.recovery_left = (self.recovery_left - scaled_dt).max(0.0);

        self.cooldowns.update(raw_dt);
        self.chrono_left = (self.chrono_left - raw_dt).max(0.0);

        if let Some(left) = self.shield_recharge_left {
            let left = left - raw_dt;
            if left > 0.0 {
                self.shield_recharge_left = Some(left);
            } else {
                self.shield_recharge_left = None;
                if self.inventory.shield {
                    self.shield_active = true;
                    return true;
                }
            }
        }
        false
    }
}
