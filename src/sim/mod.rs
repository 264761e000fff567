//! Simulation core
//!
//! All gameplay logic lives here:
//! - Frame-stepped: one `tick` per rendered frame, step clamped
//! - Seeded RNG only
//! - Stable iteration order (insertion order in the registry)
//! - No rendering, audio or platform dependencies

pub mod abilities;
pub mod collision;
pub mod economy;
pub mod entity;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod spawner;
pub mod state;
pub mod status;
pub mod telemetry;
pub mod tick;
pub mod weighted;

pub use abilities::{Ability, AbilityState, Buffs, Cooldowns, Inventory, PowerUpBuff};
pub use economy::{PurchaseError, ShopItem};
pub use entity::{EntityId, EntityKind, PowerUpKind, WorldEntity};
pub use registry::EntityRegistry;
pub use runner::Runner;
pub use spawner::{SpawnPattern, Spawner, difficulty_factor};
pub use state::{GameEvent, GameState, GameStatus, LetterSet, RunState};
pub use status::DamageOutcome;
pub use telemetry::Telemetry;
pub use tick::{Command, TickInput, apply_command, tick};
