//! Game state and core simulation types
//!
//! [`GameState`] is the single simulation context: the run, the track, the
//! runner and the RNG all live here and are mutated only through the tick and
//! the transition methods in [`super::status`].

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::abilities::{Ability, AbilityState};
use super::economy::ShopItem;
use super::entity::{EntityId, EntityKind};
use super::registry::EntityRegistry;
use super::runner::Runner;
use super::spawner::Spawner;
use crate::consts::*;
use crate::{Settings, Tuning};

/// Top-level game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Title screen, nothing simulated
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen by the player
    Paused,
    /// Frozen while the upgrade shop is open
    Shop,
    /// Run ended by losing the last life
    GameOver,
    /// Final level's letter set completed
    Victory,
}

/// Collected letter indices (0..LETTER_COUNT) as a bit set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSet(u8);

impl LetterSet {
    /// Add a letter; false if out of range or already collected
    pub fn insert(&mut self, index: u8) -> bool {
        if index as usize >= LETTER_COUNT || self.contains(index) {
            return false;
        }
        self.0 |= 1 << index;
        true
    }

    pub fn contains(&self, index: u8) -> bool {
        (index as usize) < LETTER_COUNT && self.0 & (1 << index) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len() == LETTER_COUNT
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Collected indices, ascending
    pub fn iter(&self) -> impl Iterator<Item = u8> {
        let set = *self;
        (0..LETTER_COUNT as u8).filter(move |&i| set.contains(i))
    }

    /// Indices not yet collected, ascending
    pub fn missing(&self) -> impl Iterator<Item = u8> {
        let set = *self;
        (0..LETTER_COUNT as u8).filter(move |&i| !set.contains(i))
    }
}

/// Per-run state. Replaced wholesale on start/restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub status: GameStatus,
    pub lives: u32,
    pub max_lives: u32,
    /// Score, also spent as shop currency
    pub score: u64,
    pub gems: u32,
    pub distance: f32,
    pub distance_since_damage: f32,
    /// Difficulty tier, 1..=MAX_LEVEL
    pub level: u32,
    pub lane_count: u32,
    /// Base forward speed before the speed buff
    pub speed: f32,
    pub letters: LetterSet,
    pub abilities: AbilityState,
}

impl RunState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            status: GameStatus::Menu,
            lives: tuning.starting_lives,
            max_lives: tuning.starting_lives,
            score: 0,
            gems: 0,
            distance: 0.0,
            distance_since_damage: 0.0,
            level: 1,
            lane_count: BASE_LANE_COUNT,
            speed: tuning.base_run_speed,
            letters: LetterSet::default(),
            abilities: AbilityState::default(),
        }
    }

    /// Forward speed this tick, including the speed buff
    pub fn effective_speed(&self, tuning: &Tuning) -> f32 {
        if self.abilities.buffs.is_speed_boosted() {
            self.speed * tuning.speed_boost_factor
        } else {
            self.speed
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

/// Discrete signals for rendering/audio/UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A hazard connected (whether or not it cost a life)
    PlayerHit { position: Vec3, color: u32 },
    ItemCollected {
        kind: EntityKind,
        position: Vec3,
        color: u32,
    },
    SonicPulseFired { position: Vec3, cleared: usize },
    RebirthTriggered,
    ShieldAbsorbed,
    ShieldRecharged,
    AlienFired { missile: EntityId, position: Vec3 },
    LevelUp { level: u32 },
    ShopOpened,
    AbilityActivated(Ability),
    GameOver { score: u64 },
    Victory { score: u64 },
}

/// The simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed
    pub seed: u64,
    pub run: RunState,
    pub entities: EntityRegistry,
    pub runner: Runner,
    pub spawner: Spawner,
    /// Player position used for collision this tick (runner or external override)
    pub player: Vec3,
    /// Items offered while the shop is open
    pub shop_offer: Vec<ShopItem>,
    /// Simulated seconds since the run started (drives time-varying hazards)
    pub elapsed: f32,
    pub settings: Settings,
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session in the menu with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            run: RunState::new(&tuning),
            entities: EntityRegistry::new(),
            runner: Runner::default(),
            spawner: Spawner::new(&tuning),
            player: Vec3::ZERO,
            shop_offer: Vec::new(),
            elapsed: 0.0,
            settings: Settings::default(),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            events: Vec::new(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.run.status
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Signals produced since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending signals
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
