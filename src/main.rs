//! Neon Runner headless harness
//!
//! Development harness, not part of the simulation's interface. Drives a
//! session with a simple autopilot at a fixed frame rate and logs HUD
//! telemetry. Usage: `neon-runner [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use neon_runner::consts::*;
    use neon_runner::sim::{Command, EntityKind, GameState, GameStatus, ShopItem};
    use neon_runner::{lane_to_x, max_lane};

    /// How far ahead the autopilot looks for trouble
    const LOOKAHEAD: f32 = 14.0;

    fn lane_blocked(state: &GameState, lane: i32) -> bool {
        let x = lane_to_x(lane);
        state.entities.active().any(|e| {
            e.kind.is_damage_source()
                && (e.pos.x - x).abs() < LANE_WIDTH / 2.0
                && e.pos.z < state.player.z
                && e.pos.z > state.player.z - LOOKAHEAD
        })
    }

    /// Commands for this frame
    pub fn commands(state: &GameState) -> Vec<Command> {
        match state.status() {
            GameStatus::Menu => return vec![Command::Start],
            GameStatus::Shop => return shop(state),
            GameStatus::Playing => {}
            _ => return Vec::new(),
        }

        let mut commands = Vec::new();
        let lane = state.runner.lane;
        if lane_blocked(state, lane) {
            let max = max_lane(state.run.lane_count);
            let escape = [1, -1, 2, -2]
                .into_iter()
                .map(|d| lane + d)
                .filter(|l| l.abs() <= max)
                .find(|l| !lane_blocked(state, *l));
            match escape {
                Some(target) => commands.push(Command::ChangeLane((target - lane).signum())),
                None => {
                    commands.push(Command::Jump);
                    commands.push(Command::ActivateSonicPulse);
                    commands.push(Command::ActivateDash);
                }
            }
        } else if let Some(pickup) = state
            .entities
            .active()
            .filter(|e| matches!(e.kind, EntityKind::Letter { .. } | EntityKind::PowerUp(_)))
            .filter(|e| e.pos.z > state.player.z - LOOKAHEAD * 2.0 && e.pos.z < state.player.z)
            .max_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
        {
            let target = (pickup.pos.x / LANE_WIDTH).round() as i32;
            if target != lane {
                commands.push(Command::ChangeLane((target - lane).signum()));
            }
        }

        if state.run.lives == 1 {
            commands.push(Command::ActivateImmortality);
        }
        commands
    }

    /// Buy the most expensive affordable item, then leave
    fn shop(state: &GameState) -> Vec<Command> {
        let best: Option<ShopItem> = state
            .shop_offer
            .iter()
            .copied()
            .filter(|item| item.cost() <= state.run.score)
            .max_by_key(|item| item.cost());
        match best {
            Some(item) => vec![Command::BuyItem(item)],
            None => vec![Command::CloseShop],
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_runner::Tuning;
    use neon_runner::sim::{GameEvent, GameState, GameStatus, Telemetry, TickInput, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };

    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    const REPORT_EVERY: u32 = 60 * 10;

    log::info!("Neon Runner (headless) starting, seed {}", seed);
    let mut state = GameState::with_tuning(seed, tuning);
    let mut hits = 0u32;

    for frame in 0..MAX_FRAMES {
        let input = TickInput::with_commands(autopilot::commands(&state));
        tick(&mut state, &input, FRAME_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::PlayerHit { .. } => hits += 1,
                GameEvent::LevelUp { level } => log::info!("Reached level {}", level),
                _ => {}
            }
        }

        if frame % REPORT_EVERY == 0 || matches!(state.status(), GameStatus::GameOver | GameStatus::Victory) {
            match Telemetry::capture(&state).to_json() {
                Ok(json) => log::info!("{}", json),
                Err(e) => log::warn!("Telemetry serialization failed: {}", e),
            }
        }
        if matches!(state.status(), GameStatus::GameOver | GameStatus::Victory) {
            break;
        }
    }

    log::info!(
        "Session over: {:?}, score {}, level {}, {:.0} units, {} hits",
        state.status(),
        state.run.score,
        state.run.level,
        state.run.distance,
        hits
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no standalone wasm entry
}
