//! Game status transitions and run progression
//!
//! Every transition checks its precondition and is a no-op (returning false)
//! when it does not hold. Damage, letters and ability triggers funnel through
//! here so the status machine stays the single exit point from Playing.

use glam::Vec3;

use super::abilities::Ability;
use super::economy::{self, PurchaseError, ShopItem};
use super::entity::{EntityKind, PowerUpKind};
use super::registry::EntityRegistry;
use super::resolver;
use super::runner::Runner;
use super::spawner::Spawner;
use super::state::{GameEvent, GameState, GameStatus, RunState};
use crate::consts::*;

/// Entities further ahead than this are discarded on level-up
const LEVEL_UP_KEEP_DEPTH: f32 = -80.0;
/// Where the shop portal appears after a level-up
const SHOP_PORTAL_DEPTH: f32 = -100.0;

/// How an incoming hit was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Immortality, dash, an invincibility buff or recovery
    Ignored,
    /// Plasma shield took it
    Absorbed,
    LifeLost,
    /// Last life saved by the rebirth core
    Reborn,
    GameOver,
}

/// Lane count for a level: two more per level, capped
pub fn lanes_for_level(level: u32) -> u32 {
    (BASE_LANE_COUNT + level.saturating_sub(1) * 2).min(MAX_LANE_COUNT)
}

impl GameState {
    /// Menu -> Playing
    pub fn start(&mut self) -> bool {
        if self.run.status != GameStatus::Menu {
            return false;
        }
        self.reset_run();
        log::info!("Run started (seed {})", self.seed);
        true
    }

    /// GameOver/Victory -> Playing with a fresh run
    pub fn restart(&mut self) -> bool {
        if !matches!(self.run.status, GameStatus::GameOver | GameStatus::Victory) {
            return false;
        }
        self.reset_run();
        log::info!("Run restarted");
        true
    }

    fn reset_run(&mut self) {
        self.run = RunState::new(&self.tuning);
        self.run.status = GameStatus::Playing;
        self.entities = EntityRegistry::new();
        self.runner = Runner::default();
        self.spawner = Spawner::new(&self.tuning);
        self.player = Vec3::ZERO;
        self.shop_offer.clear();
        self.elapsed = 0.0;
    }

    pub fn pause(&mut self) -> bool {
        if self.run.status != GameStatus::Playing {
            return false;
        }
        self.run.status = GameStatus::Paused;
        log::info!("Paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.run.status != GameStatus::Paused {
            return false;
        }
        self.run.status = GameStatus::Playing;
        log::info!("Resumed");
        true
    }

    /// Playing -> Shop, drawing a fresh offer
    pub fn open_shop(&mut self) -> bool {
        if self.run.status != GameStatus::Playing {
            return false;
        }
        self.run.status = GameStatus::Shop;
        self.shop_offer = economy::draw_offer(&mut self.rng, &self.run, self.tuning.shop_offer_size);
        self.emit(GameEvent::ShopOpened);
        log::info!(
            "Shop opened with {} points, offering {:?}",
            self.run.score,
            self.shop_offer
        );
        true
    }

    pub fn close_shop(&mut self) -> bool {
        if self.run.status != GameStatus::Shop {
            return false;
        }
        self.run.status = GameStatus::Playing;
        self.shop_offer.clear();
        log::info!("Shop closed");
        true
    }

    /// Buy an item from the current offer. A successful purchase redraws the
    /// offer from the items still eligible.
    pub fn buy(&mut self, item: ShopItem) -> Result<(), PurchaseError> {
        let result = if self.run.status != GameStatus::Shop {
            Err(PurchaseError::NotInShop)
        } else if !self.shop_offer.contains(&item) {
            Err(PurchaseError::Unavailable(item))
        } else {
            economy::purchase(&mut self.run, item)
        };

        match result {
            Ok(()) => {
                self.shop_offer =
                    economy::draw_offer(&mut self.rng, &self.run, self.tuning.shop_offer_size);
                Ok(())
            }
            Err(e) => {
                log::warn!("Purchase of {} rejected: {}", item.name(), e);
                Err(e)
            }
        }
    }

    /// Apply one incoming hit, in precedence order: full immunity, shield,
    /// lives, rebirth, game over.
    pub fn apply_damage(&mut self) -> DamageOutcome {
        if !self.run.is_playing() || self.run.abilities.ignores_damage() {
            return DamageOutcome::Ignored;
        }
        if self.run.abilities.absorb_hit(self.tuning.shield_recharge) {
            self.emit(GameEvent::ShieldAbsorbed);
            return DamageOutcome::Absorbed;
        }

        self.run.distance_since_damage = 0.0;
        let abilities = &mut self.run.abilities;

        if self.run.lives > 1 {
            self.run.lives -= 1;
            abilities.recovery_left = self.tuning.hit_recovery;
            DamageOutcome::LifeLost
        } else if abilities.inventory.rebirth && !abilities.rebirth_used {
            abilities.rebirth_used = true;
            abilities.recovery_left = self.tuning.hit_recovery;
            self.run.lives = 1;
            self.emit(GameEvent::RebirthTriggered);
            log::info!("Rebirth core spent, continuing on one life");
            DamageOutcome::Reborn
        } else {
            self.run.lives = 0;
            self.run.speed = 0.0;
            self.run.status = GameStatus::GameOver;
            self.emit(GameEvent::GameOver {
                score: self.run.score,
            });
            log::info!(
                "Game over: score {}, level {}, distance {:.0}",
                self.run.score,
                self.run.level,
                self.run.distance
            );
            DamageOutcome::GameOver
        }
    }

    pub fn collect_gem(&mut self, points: u32) -> u64 {
        self.run.gems += 1;
        economy::credit(&mut self.run, points as u64, self.tuning.frenzy_multiplier)
    }

    pub fn collect_power_up(&mut self, kind: PowerUpKind) {
        let duration = match kind {
            PowerUpKind::Speed => self.tuning.speed_buff_duration,
            PowerUpKind::Frenzy => self.tuning.frenzy_buff_duration,
            PowerUpKind::Shield => self.tuning.shield_buff_duration,
        };
        self.run.abilities.activate_buff(kind, duration);
    }

    /// Record a letter. Duplicates are ignored. Completing the set levels up,
    /// or wins the run on the final level.
    pub fn collect_letter(&mut self, index: u8) -> bool {
        if !self.run.letters.insert(index) {
            return false;
        }
        economy::credit(&mut self.run, self.tuning.letter_score, self.tuning.frenzy_multiplier);
        self.run.speed += self.tuning.letter_speed_increase();

        if self.run.letters.is_complete() {
            if self.run.level < MAX_LEVEL {
                self.level_up();
            } else {
                self.win();
            }
        }
        true
    }

    fn level_up(&mut self) {
        let run = &mut self.run;
        run.level += 1;
        run.lane_count = lanes_for_level(run.level);
        run.letters.clear();
        run.speed += self.tuning.level_speed_increase();
        run.abilities.rearm_shield();
        self.runner.clamp_to_lanes(run.lane_count);

        self.entities.retain_nearer_than(LEVEL_UP_KEEP_DEPTH);
        self.entities
            .spawn(EntityKind::ShopPortal, Vec3::new(0.0, 0.0, SHOP_PORTAL_DEPTH));
        self.spawner.reschedule_letters(
            self.run.distance,
            self.tuning.letter_interval(self.run.level),
        );

        self.emit(GameEvent::LevelUp {
            level: self.run.level,
        });
        log::info!(
            "Level {}: {} lanes, speed {:.1}",
            self.run.level,
            self.run.lane_count,
            self.run.speed
        );
    }

    fn win(&mut self) {
        economy::credit(&mut self.run, self.tuning.victory_bonus, self.tuning.frenzy_multiplier);
        self.run.status = GameStatus::Victory;
        self.emit(GameEvent::Victory {
            score: self.run.score,
        });
        log::info!("Victory with score {}", self.run.score);
    }

    fn ability_used(&mut self, ability: Ability) {
        self.emit(GameEvent::AbilityActivated(ability));
        log::info!("{:?} activated", ability);
    }

    pub fn activate_immortality(&mut self) -> bool {
        if !self.run.is_playing()
            || !self
                .run
                .abilities
                .activate_immortality(self.tuning.immortality_duration)
        {
            return false;
        }
        self.ability_used(Ability::Immortality);
        true
    }

    pub fn activate_dash(&mut self) -> bool {
        if !self.run.is_playing() || !self.run.abilities.activate_dash(self.tuning.dash_duration) {
            return false;
        }
        self.ability_used(Ability::Dash);
        true
    }

    /// Clear every hazard in the forward window at once
    pub fn activate_sonic_pulse(&mut self) -> bool {
        if !self.run.is_playing()
            || !self
                .run
                .abilities
                .activate_sonic_pulse(self.tuning.sonic_pulse_cooldown)
        {
            return false;
        }
        let cleared =
            resolver::sonic_pulse(&mut self.entities, self.player.z, self.tuning.sonic_pulse_range);
        self.emit(GameEvent::SonicPulseFired {
            position: self.player,
            cleared,
        });
        log::debug!("Sonic pulse cleared {} hazards", cleared);
        self.ability_used(Ability::SonicPulse);
        true
    }

    pub fn activate_chrono_driver(&mut self) -> bool {
        if !self.run.is_playing()
            || !self
                .run
                .abilities
                .activate_chrono(self.tuning.chrono_cooldown, self.tuning.chrono_duration)
        {
            return false;
        }
        self.ability_used(Ability::ChronoDriver);
        true
    }

    pub fn toggle_accessibility_mode(&mut self) -> bool {
        self.settings.toggle_accessibility_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::new(7);
        assert!(state.start());
        state
    }

    #[test]
    fn test_only_valid_transitions_apply() {
        let mut state = GameState::new(1);
        assert!(!state.pause());
        assert!(!state.resume());
        assert!(!state.restart());
        assert!(!state.close_shop());
        assert!(state.start());
        assert!(!state.start());
        assert!(!state.resume());
        assert!(state.pause());
        assert_eq!(state.status(), GameStatus::Paused);
        assert!(!state.open_shop());
        assert!(state.resume());
        assert!(state.open_shop());
        assert!(!state.pause());
        assert!(state.close_shop());
        assert_eq!(state.status(), GameStatus::Playing);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut state = playing();
        state.run.lives = 1;
        state.run.distance_since_damage = 300.0;
        assert_eq!(state.apply_damage(), DamageOutcome::GameOver);
        assert_eq!(state.status(), GameStatus::GameOver);
        assert_eq!(state.run.speed, 0.0);
        assert_eq!(state.run.lives, 0);
        assert_eq!(state.run.distance_since_damage, 0.0);
    }

    #[test]
    fn test_rebirth_saves_last_life_once() {
        let mut state = playing();
        state.run.lives = 1;
        state.run.abilities.inventory.rebirth = true;
        assert_eq!(state.apply_damage(), DamageOutcome::Reborn);
        assert!(state.run.abilities.rebirth_used);
        assert_eq!(state.run.lives, 1);
        assert_eq!(state.status(), GameStatus::Playing);
        assert!(state.events().contains(&GameEvent::RebirthTriggered));

        state.run.abilities.recovery_left = 0.0;
        assert_eq!(state.apply_damage(), DamageOutcome::GameOver);
    }

    #[test]
    fn test_invincibility_beats_shield() {
        let mut state = playing();
        state.run.abilities.inventory.shield = true;
        state.run.abilities.rearm_shield();
        state.run.abilities.activate_buff(PowerUpKind::Speed, 4.0);
        state.run.distance_since_damage = 100.0;

        assert_eq!(state.apply_damage(), DamageOutcome::Ignored);
        assert!(state.run.abilities.shield_active);
        assert_eq!(state.run.distance_since_damage, 100.0);
    }

    #[test]
    fn test_shield_absorbs_then_lives_drop() {
        let mut state = playing();
        state.run.abilities.inventory.shield = true;
        state.run.abilities.rearm_shield();
        state.run.distance_since_damage = 100.0;

        assert_eq!(state.apply_damage(), DamageOutcome::Absorbed);
        assert_eq!(state.run.lives, 3);
        assert_eq!(state.run.distance_since_damage, 100.0);

        assert_eq!(state.apply_damage(), DamageOutcome::LifeLost);
        assert_eq!(state.run.lives, 2);
        assert_eq!(state.run.distance_since_damage, 0.0);
        // Grace period right after
        assert_eq!(state.apply_damage(), DamageOutcome::Ignored);
    }

    #[test]
    fn test_duplicate_letter_ignored() {
        let mut state = playing();
        assert!(state.collect_letter(4));
        let score = state.run.score;
        let speed = state.run.speed;
        assert!(!state.collect_letter(4));
        assert_eq!(state.run.score, score);
        assert_eq!(state.run.speed, speed);
        assert_eq!(state.run.letters.len(), 1);
    }

    #[test]
    fn test_full_set_levels_up() {
        let mut state = playing();
        let base = state.tuning.base_run_speed;
        state.entities.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -10.0));
        state.entities.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -110.0));
        state.run.distance = 900.0;

        for i in 0..LETTER_COUNT as u8 {
            assert!(state.collect_letter(i));
        }
        assert_eq!(state.run.level, 2);
        assert_eq!(state.run.lane_count, 5);
        assert!(state.run.letters.is_empty());
        assert_eq!(state.run.score, 3000);
        assert!((state.run.speed - base * (1.0 + 0.6 + 0.4)).abs() < 1e-3);

        // Far content dropped, portal placed ahead
        assert_eq!(state.entities.len(), 2);
        assert!(state.entities.iter().any(|e| e.kind == EntityKind::ShopPortal && e.pos.z == SHOP_PORTAL_DEPTH));
        assert!((state.spawner.next_letter_distance - (900.0 - 120.0 + 195.0)).abs() < 1e-2);
        assert!(state.events().contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_final_level_set_wins() {
        let mut state = playing();
        state.run.level = MAX_LEVEL;
        for i in 0..LETTER_COUNT as u8 {
            state.collect_letter(i);
        }
        assert_eq!(state.status(), GameStatus::Victory);
        assert_eq!(state.run.score, 6 * 500 + 10_000);
        assert_eq!(state.run.level, MAX_LEVEL);
    }

    #[test]
    fn test_lane_count_caps() {
        assert_eq!(lanes_for_level(1), 3);
        assert_eq!(lanes_for_level(2), 5);
        assert_eq!(lanes_for_level(4), 9);
        assert_eq!(lanes_for_level(7), 9);
    }

    #[test]
    fn test_restart_reinitialises_everything() {
        let mut state = playing();
        state.run.score = 9000;
        state.run.abilities.inventory.magnet = true;
        state.entities.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -30.0));
        state.run.lives = 1;
        state.apply_damage();
        assert!(state.restart());
        assert_eq!(state.run.score, 0);
        assert_eq!(state.run.lives, 3);
        assert!(!state.run.abilities.inventory.magnet);
        assert!(state.entities.is_empty());
        assert_eq!(state.status(), GameStatus::Playing);
    }

    #[test]
    fn test_abilities_need_playing_status() {
        let mut state = playing();
        state.run.abilities.inventory.dash = true;
        assert!(state.pause());
        assert!(!state.activate_dash());
        assert!(state.resume());
        assert!(state.activate_dash());
        assert!(state.events().contains(&GameEvent::AbilityActivated(Ability::Dash)));
    }

    #[test]
    fn test_shop_purchase_flow() {
        let mut state = playing();
        state.run.score = 2000;
        assert!(state.open_shop());
        assert_eq!(state.shop_offer.len(), 3);
        state.shop_offer = vec![ShopItem::Shield, ShopItem::DoubleJump, ShopItem::Magnet];
        assert_eq!(
            state.buy(ShopItem::Shield),
            Err(PurchaseError::InsufficientScore { cost: 3000, score: 2000 })
        );
        assert_eq!(state.run.score, 2000);
        assert!(!state.run.abilities.inventory.shield);

        state.buy(ShopItem::DoubleJump).unwrap();
        assert_eq!(state.run.score, 1000);
        assert_eq!(state.shop_offer.len(), 3);
        assert!(!state.shop_offer.contains(&ShopItem::DoubleJump));
        assert!(state.shop_offer.iter().all(|item| economy::is_eligible(*item, &state.run)));
    }

    #[test]
    fn test_only_offered_items_sell() {
        let mut state = playing();
        state.run.score = 10_000;
        assert_eq!(state.buy(ShopItem::Magnet), Err(PurchaseError::NotInShop));

        assert!(state.open_shop());
        state.shop_offer = vec![ShopItem::Rebirth, ShopItem::Immortality, ShopItem::SonicPulse];
        assert_eq!(
            state.buy(ShopItem::DoubleJump),
            Err(PurchaseError::Unavailable(ShopItem::DoubleJump))
        );
        assert_eq!(state.run.score, 10_000);
        assert!(!state.run.abilities.inventory.double_jump);

        state.buy(ShopItem::Rebirth).unwrap();
        assert!(state.run.abilities.inventory.rebirth);
        assert_eq!(state.shop_offer.len(), 3);
        assert!(!state.shop_offer.contains(&ShopItem::Rebirth));
    }

    #[test]
    fn test_level_up_rearms_spent_shield() {
        let mut state = playing();
        state.run.abilities.inventory.shield = true;
        state.run.abilities.rearm_shield();
        assert_eq!(state.apply_damage(), DamageOutcome::Absorbed);
        assert!(!state.run.abilities.shield_active);
        assert!(state.run.abilities.shield_recharge_left.is_some());

        for i in 0..LETTER_COUNT as u8 {
            state.collect_letter(i);
        }
        assert_eq!(state.run.level, 2);
        assert!(state.run.abilities.shield_active);
    }

    #[test]
    fn test_level_up_leaves_unowned_shield_down() {
        let mut state = playing();
        for i in 0..LETTER_COUNT as u8 {
            state.collect_letter(i);
        }
        assert_eq!(state.run.level, 2);
        assert!(!state.run.abilities.shield_active);
    }

    #[test]
    fn test_restart_after_victory() {
        let mut state = playing();
        state.run.level = MAX_LEVEL;
        state.run.lane_count = MAX_LANE_COUNT;
        state.run.abilities.inventory.rebirth = true;
        state.run.abilities.inventory.upgrade_cooldown();
        state.runner.lane = 3;
        state.entities.spawn(EntityKind::Gem { points: 50 }, Vec3::new(0.0, 1.2, -40.0));
        for i in 0..LETTER_COUNT as u8 {
            state.collect_letter(i);
        }
        assert_eq!(state.status(), GameStatus::Victory);
        assert!(!state.pause());

        assert!(state.restart());
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.run, {
            let mut fresh = RunState::new(&state.tuning);
            fresh.status = GameStatus::Playing;
            fresh
        });
        assert_eq!(state.runner.lane, 0);
        assert!(state.entities.is_empty());
        assert!(state.shop_offer.is_empty());
        assert_eq!(state.elapsed, 0.0);
    }
}
