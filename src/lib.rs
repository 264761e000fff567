//! Neon Runner - simulation core of a lane-based endless runner
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, collisions, spawning, abilities, game flow)
//! - `tuning`: Data-driven game balance
//! - `settings`: Session preferences (accessibility)
//!
//! Rendering, audio, camera and input polling live outside this crate. They read
//! [`sim::GameState`] and the drained [`sim::GameEvent`] queue, and feed
//! [`sim::Command`]s back in through [`sim::TickInput`].

pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Fixed world geometry. Balance values that designers tweak live in [`Tuning`].
pub mod consts {
    /// Largest frame step the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Track layout
    pub const LANE_WIDTH: f32 = 2.2;
    pub const BASE_LANE_COUNT: u32 = 3;
    pub const MAX_LANE_COUNT: u32 = 9;

    /// Depth at which new content is placed (distance ahead of the player)
    pub const SPAWN_DISTANCE: f32 = 120.0;
    /// Entities further behind the camera than this are pruned
    pub const REMOVE_DISTANCE: f32 = 20.0;
    /// Half-depth of the collision/pickup engagement window
    pub const ENGAGEMENT_DEPTH: f32 = 2.0;

    /// Player body
    pub const PLAYER_HEIGHT: f32 = 1.8;
    pub const GRAVITY: f32 = 50.0;
    pub const JUMP_FORCE: f32 = 16.0;
    /// Lateral easing rate toward the target lane (per second)
    pub const LANE_EASE_RATE: f32 = 15.0;
    /// Forward lean while dashing or speed boosted
    pub const LEAN_DEPTH: f32 = -3.0;
    pub const LEAN_EASE_RATE: f32 = 5.0;

    /// Hazard geometry
    pub const OBSTACLE_HEIGHT: f32 = 1.6;
    /// Aliens launch their missile once they pass this depth
    pub const ALIEN_FIRE_DEPTH: f32 = -90.0;

    /// Magnet pull
    pub const MAGNET_RADIUS: f32 = 12.0;
    pub const MAGNET_BLEND_RATE: f32 = 8.0;

    /// Progression
    pub const LETTER_COUNT: usize = 6;
    pub const MAX_LEVEL: u32 = 10;
}

/// The word spelled by the letter pickups, indexed by `letter_index`
pub const LETTER_TARGET: [char; consts::LETTER_COUNT] = ['G', 'E', 'M', 'I', 'N', 'I'];

/// Highest lane index reachable on either side of the centre lane
#[inline]
pub fn max_lane(lane_count: u32) -> i32 {
    (lane_count / 2) as i32
}

/// Clamp a lane index into the track for the given lane count
#[inline]
pub fn clamp_lane(lane: i32, lane_count: u32) -> i32 {
    let max = max_lane(lane_count);
    lane.clamp(-max, max)
}

/// World X of a lane centre
#[inline]
pub fn lane_to_x(lane: i32) -> f32 {
    lane as f32 * consts::LANE_WIDTH
}

/// Linear blend, with `t` clamped to [0, 1]
#[inline]
pub fn approach(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t.clamp(0.0, 1.0)
}
