//! Score economy and the upgrade shop
//!
//! Score doubles as currency: gems and letters credit it, purchases spend it.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::abilities::Ability;
use super::state::{GameStatus, RunState};

/// Everything the shop can sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    DoubleJump,
    MaxLife,
    Heal,
    Immortality,
    Magnet,
    Shield,
    ScoreMultiplier,
    Dash,
    SonicPulse,
    ChronoDriver,
    Rebirth,
    DurationBoost,
    CooldownTuner,
    CooldownReset,
}

impl ShopItem {
    pub const ALL: [ShopItem; 14] = [
        ShopItem::DoubleJump,
        ShopItem::MaxLife,
        ShopItem::Heal,
        ShopItem::Immortality,
        ShopItem::Magnet,
        ShopItem::Shield,
        ShopItem::ScoreMultiplier,
        ShopItem::Dash,
        ShopItem::SonicPulse,
        ShopItem::ChronoDriver,
        ShopItem::Rebirth,
        ShopItem::DurationBoost,
        ShopItem::CooldownTuner,
        ShopItem::CooldownReset,
    ];

    /// Stable identifier used by UI collaborators
    pub fn id(self) -> &'static str {
        match self {
            ShopItem::DoubleJump => "DOUBLE_JUMP",
            ShopItem::MaxLife => "MAX_LIFE",
            ShopItem::Heal => "HEAL",
            ShopItem::Immortality => "IMMORTAL",
            ShopItem::Magnet => "MAGNET",
            ShopItem::Shield => "SHIELD",
            ShopItem::ScoreMultiplier => "MULTIPLIER",
            ShopItem::Dash => "DASH",
            ShopItem::SonicPulse => "SONIC_PULSE",
            ShopItem::ChronoDriver => "CHRONO_DRIVER",
            ShopItem::Rebirth => "REBIRTH",
            ShopItem::DurationBoost => "DURATION_BOOST",
            ShopItem::CooldownTuner => "COOLDOWN_TUNER",
            ShopItem::CooldownReset => "COOLDOWN_RESET",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShopItem::DoubleJump => "Double Jump",
            ShopItem::MaxLife => "Max Life Up",
            ShopItem::Heal => "Repair Kit",
            ShopItem::Immortality => "Immortality",
            ShopItem::Magnet => "Gem Magnet",
            ShopItem::Shield => "Plasma Shield",
            ShopItem::ScoreMultiplier => "Score Overdrive",
            ShopItem::Dash => "Dash Thrusters",
            ShopItem::SonicPulse => "Sonic Pulse",
            ShopItem::ChronoDriver => "Chrono Driver",
            ShopItem::Rebirth => "Rebirth Core",
            ShopItem::DurationBoost => "Power Cell",
            ShopItem::CooldownTuner => "Cooldown Tuner",
            ShopItem::CooldownReset => "Cooldown Reset",
        }
    }

    pub fn cost(self) -> u64 {
        match self {
            ShopItem::DoubleJump => 1000,
            ShopItem::MaxLife => 1500,
            ShopItem::Heal => 1000,
            ShopItem::Immortality => 3000,
            ShopItem::Magnet => 2500,
            ShopItem::Shield => 3000,
            ShopItem::ScoreMultiplier => 5000,
            ShopItem::Dash => 4000,
            ShopItem::SonicPulse => 3500,
            ShopItem::ChronoDriver => 4500,
            ShopItem::Rebirth => 6000,
            ShopItem::DurationBoost => 2000,
            ShopItem::CooldownTuner => 2500,
            ShopItem::CooldownReset => 500,
        }
    }

    /// The ability a one-time item unlocks
    pub fn ability(self) -> Option<Ability> {
        match self {
            ShopItem::DoubleJump => Some(Ability::DoubleJump),
            ShopItem::Immortality => Some(Ability::Immortality),
            ShopItem::Magnet => Some(Ability::Magnet),
            ShopItem::Shield => Some(Ability::Shield),
            ShopItem::Dash => Some(Ability::Dash),
            ShopItem::SonicPulse => Some(Ability::SonicPulse),
            ShopItem::ChronoDriver => Some(Ability::ChronoDriver),
            ShopItem::Rebirth => Some(Ability::Rebirth),
            ShopItem::MaxLife
            | ShopItem::Heal
            | ShopItem::ScoreMultiplier
            | ShopItem::DurationBoost
            | ShopItem::CooldownTuner
            | ShopItem::CooldownReset => None,
        }
    }
}

/// Why a purchase was refused. Nothing is mutated on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("the shop is not open")]
    NotInShop,
    #[error("{0:?} is not available")]
    Unavailable(ShopItem),
    #[error("costs {cost}, only {score} available")]
    InsufficientScore { cost: u64, score: u64 },
}

/// Can this item be offered to (and bought by) the current run?
pub fn is_eligible(item: ShopItem, run: &RunState) -> bool {
    let inventory = &run.abilities.inventory;
    if let Some(ability) = item.ability() {
        return !inventory.owns(ability);
    }
    match item {
        ShopItem::Heal => run.lives < run.max_lives,
        ShopItem::ScoreMultiplier => !inventory.multiplier_maxed(),
        ShopItem::DurationBoost => !inventory.duration_maxed(),
        ShopItem::CooldownTuner => !inventory.cooldown_maxed(),
        ShopItem::CooldownReset => inventory.sonic_pulse || inventory.chrono_driver,
        _ => true,
    }
}

/// Draw a random offer of up to `size` eligible items
pub fn draw_offer<R: Rng>(rng: &mut R, run: &RunState, size: usize) -> Vec<ShopItem> {
    let mut pool: Vec<ShopItem> = ShopItem::ALL
        .into_iter()
        .filter(|item| is_eligible(*item, run))
        .collect();
    pool.shuffle(rng);
    pool.truncate(size);
    pool
}

/// Credit score with the owned multiplier and, while frenzy runs, the frenzy factor.
/// Returns the amount actually added.
pub fn credit(run: &mut RunState, amount: u64, frenzy_multiplier: u64) -> u64 {
    let mut gained = amount * run.abilities.inventory.score_multiplier;
    if run.abilities.buffs.is_frenzy_active() {
        gained *= frenzy_multiplier;
    }
    run.score += gained;
    gained
}

/// Buy an item from the open shop, deducting its catalogue cost
pub fn purchase(run: &mut RunState, item: ShopItem) -> Result<(), PurchaseError> {
    if run.status != GameStatus::Shop {
        return Err(PurchaseError::NotInShop);
    }
    if !is_eligible(item, run) {
        return Err(PurchaseError::Unavailable(item));
    }
    let cost = item.cost();
    if run.score < cost {
        return Err(PurchaseError::InsufficientScore {
            cost,
            score: run.score,
        });
    }

    run.score -= cost;
    apply(run, item);
    log::info!("Purchased {} for {} ({} left)", item.name(), cost, run.score);
    Ok(())
}

fn apply(run: &mut RunState, item: ShopItem) {
    let abilities = &mut run.abilities;
    if let Some(ability) = item.ability() {
        abilities.inventory.grant(ability);
        if ability == Ability::Shield {
            abilities.rearm_shield();
        }
        return;
    }
    match item {
        ShopItem::MaxLife => {
            run.max_lives += 1;
            run.lives += 1;
        }
        ShopItem::Heal => run.lives = (run.lives + 1).min(run.max_lives),
        ShopItem::ScoreMultiplier => abilities.inventory.upgrade_multiplier(),
        ShopItem::DurationBoost => abilities.inventory.upgrade_duration(),
        ShopItem::CooldownTuner => abilities.inventory.upgrade_cooldown(),
        ShopItem::CooldownReset => abilities.cooldowns.reset(),
        _ => {}
    }
}
