//! Frame-stepped simulation tick
//!
//! Order within a tick: commands, runner, travel, entity movement, collision,
//! commit of mid-tick emissions, pruning, spawning, timers. A newly spawned
//! entity is therefore never collision-tested in the tick that created it.

use glam::Vec3;

use super::economy::ShopItem;
use super::registry::{MagnetPull, Motion};
use super::resolver;
use super::spawner::SpawnContext;
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Discrete commands from input and UI collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move by ±1 lane (clamped to the track)
    ChangeLane(i32),
    Jump,
    /// Mid-air jump only, if owned
    DoubleJump,
    ActivateImmortality,
    ActivateDash,
    ActivateSonicPulse,
    ActivateChronoDriver,
    Pause,
    Resume,
    Start,
    Restart,
    BuyItem(ShopItem),
    CloseShop,
    ToggleAccessibilityMode,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Applied in order before the simulation step
    pub commands: Vec<Command>,
    /// External player position; overrides the runner for this tick
    pub player_position: Option<Vec3>,
}

impl TickInput {
    pub fn with_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            player_position: None,
        }
    }
}

/// Apply one command. Returns true if it changed anything.
pub fn apply_command(state: &mut GameState, command: Command) -> bool {
    match command {
        Command::Start => state.start(),
        Command::Restart => state.restart(),
        Command::Pause => state.pause(),
        Command::Resume => state.resume(),
        Command::CloseShop => state.close_shop(),
        Command::BuyItem(item) => state.buy(item).is_ok(),
        Command::ToggleAccessibilityMode => {
            state.toggle_accessibility_mode();
            true
        }
        Command::ActivateImmortality => state.activate_immortality(),
        Command::ActivateDash => state.activate_dash(),
        Command::ActivateSonicPulse => state.activate_sonic_pulse(),
        Command::ActivateChronoDriver => state.activate_chrono_driver(),
        Command::ChangeLane(delta) => {
            if !state.run.is_playing() {
                return false;
            }
            let before = state.runner.lane;
            state.runner.change_lane(delta.signum(), state.run.lane_count);
            state.runner.lane != before
        }
        Command::Jump => {
            state.run.is_playing()
                && state.runner.jump(state.run.abilities.inventory.double_jump)
        }
        Command::DoubleJump => {
            state.run.is_playing()
                && state
                    .runner
                    .air_jump(state.run.abilities.inventory.double_jump)
        }
    }
}

/// Advance the simulation by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    for command in &input.commands {
        apply_command(state, *command);
    }

    // Only Playing advances; everything else is frozen, timers included
    if !state.run.is_playing() {
        return;
    }

    let raw_dt = dt.clamp(0.0, MAX_FRAME_DT);
    let scaled_dt = raw_dt * state.run.abilities.time_scale(state.tuning.chrono_time_scale);
    state.elapsed += scaled_dt;

    // Runner
    let abilities = &state.run.abilities;
    let lean = abilities.is_dashing() || abilities.buffs.is_speed_boosted();
    state.runner.update(scaled_dt, lean);
    state.player = input.player_position.unwrap_or(state.runner.pos);

    // Travel
    let world_step = state.run.effective_speed(&state.tuning) * scaled_dt;
    state.run.distance += world_step;
    state.run.distance_since_damage += world_step;

    // Entity movement; missiles pursue on real time
    let magnet = state.run.abilities.inventory.magnet.then(|| MagnetPull {
        target: state.player + Vec3::Y * 0.5,
        blend: scaled_dt * MAGNET_BLEND_RATE,
    });
    let motion = Motion {
        world_step,
        missile_step: state.tuning.missile_speed(state.run.level) * raw_dt,
        magnet,
    };
    state.entities.advance(&motion, &mut state.events);

    // Collision
    resolver::resolve(state);
    state.entities.commit_pending();
    state.entities.prune();

    // Spawning
    if state.run.is_playing() {
        let ctx = SpawnContext {
            tuning: &state.tuning,
            settings: &state.settings,
            level: state.run.level,
            lane_count: state.run.lane_count,
            speed: state.run.speed,
            distance: state.run.distance,
            distance_since_damage: state.run.distance_since_damage,
            letters: state.run.letters,
        };
        state.spawner.fill(&ctx, &mut state.entities, &mut state.rng);
    }

    // Timers
    if state.run.abilities.update(scaled_dt, raw_dt) {
        state.emit(GameEvent::ShieldRecharged);
        log::debug!("Plasma shield re-armed");
    }
}
