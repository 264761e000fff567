//! Player avatar kinematics: lane easing, jumping, forward lean

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{approach, clamp_lane, lane_to_x};

/// The runner. Position is at the feet; the world moves, the runner only
/// shifts laterally, jumps, and leans forward while dashing or boosted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    /// Target lane (0 is the centre)
    pub lane: i32,
    pub pos: Vec3,
    pub vel_y: f32,
    /// Jumps used since last touching the ground
    pub jumps: u32,
}

impl Runner {
    pub fn is_grounded(&self) -> bool {
        self.jumps == 0
    }

    /// Move by `delta` lanes, clamped to the track
    pub fn change_lane(&mut self, delta: i32, lane_count: u32) {
        self.lane = clamp_lane(self.lane + delta, lane_count);
    }

    /// Re-clamp after the lane count changed
    pub fn clamp_to_lanes(&mut self, lane_count: u32) {
        self.lane = clamp_lane(self.lane, lane_count);
    }

    /// Jump from the ground, or a second time in the air if `double_jump` is owned
    pub fn jump(&mut self, double_jump: bool) -> bool {
        if self.is_grounded() {
            self.launch();
            true
        } else {
            self.air_jump(double_jump)
        }
    }

    /// Mid-air jump only
    pub fn air_jump(&mut self, double_jump: bool) -> bool {
        if !double_jump || self.is_grounded() || self.jumps >= 2 {
            return false;
        }
        self.launch();
        true
    }

    fn launch(&mut self) {
        self.vel_y = JUMP_FORCE;
        self.jumps += 1;
    }

    pub fn update(&mut self, dt: f32, lean: bool) {
        self.pos.x = approach(self.pos.x, lane_to_x(self.lane), dt * LANE_EASE_RATE);

        if !self.is_grounded() {
            self.vel_y -= GRAVITY * dt;
            self.pos.y += self.vel_y * dt;
            if self.pos.y <= 0.0 {
                self.pos.y = 0.0;
                self.vel_y = 0.0;
                self.jumps = 0;
            }
        }

        let target_z = if lean { LEAN_DEPTH } else { 0.0 };
        self.pos.z = approach(self.pos.z, target_z, dt * LEAN_EASE_RATE);
    }
}
