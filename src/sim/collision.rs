//! Hit-test rules per entity kind
//!
//! Pure predicates of (entity, player position, elapsed time, level). The
//! player's body is a vertical interval `[y, y + PLAYER_HEIGHT)` anchored at
//! the feet; most hazards are an axis-aligned lateral tolerance plus a vertical
//! band. Pulsers, spinners and laser grids change shape over time.

use glam::Vec3;

use super::entity::{EntityKind, WorldEntity};
use crate::consts::*;

/// Pickup reach without the magnet
pub const PICKUP_RADIUS: f32 = 0.9;
/// Pickup reach with the magnet, and for power-ups
pub const PICKUP_RADIUS_WIDE: f32 = 1.5;
/// Vertical reach for pickups
pub const PICKUP_HEIGHT_REACH: f32 = 2.5;

/// Pulser field radius before oscillation
pub const PULSER_BASE_RADIUS: f32 = 1.1;

/// Laser grids cycle every 2 seconds and are live for the first 0.8
pub const LASER_CYCLE: f32 = 2.0;
pub const LASER_ACTIVE: f32 = 0.8;
/// Flicker warning before the grid goes live
pub const LASER_WARNING: f32 = 0.4;

/// Lateral tolerance and vertical band of a simple hazard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub half_width: f32,
    pub bottom: f32,
    pub top: f32,
}

impl HitBox {
    pub const fn new(half_width: f32, bottom: f32, top: f32) -> Self {
        Self {
            half_width,
            bottom,
            top,
        }
    }

    /// Overlap test against the player body at `player`
    pub fn hits(&self, dx: f32, player: Vec3) -> bool {
        dx < self.half_width && body_overlaps(player.y, self.bottom, self.top)
    }
}

pub const OBSTACLE_BOX: HitBox = HitBox::new(0.9, 0.0, OBSTACLE_HEIGHT);
pub const MISSILE_BOX: HitBox = HitBox::new(0.6, 0.5, 1.5);
pub const ALIEN_BOX: HitBox = HitBox::new(1.0, 1.0, 2.5);
pub const SPINNER_POLE_BOX: HitBox = HitBox::new(0.3, 0.0, 3.0);
pub const LASER_GRID_BOX: HitBox = HitBox::new(1.1, 0.2, 2.0);
/// Spinner arms reach across neighbouring lanes; the band is relative to the hub
const SPINNER_ARM_HALF_WIDTH: f32 = 2.2;
const SPINNER_ARM_HALF_HEIGHT: f32 = 0.4;

/// Phase of a laser grid's cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserPhase {
    /// Beams live
    Active,
    /// Off
    Idle,
    /// Off, flickering just before going live
    Warning,
}

/// Player's vertical extent `[feet, feet + PLAYER_HEIGHT)` against `[bottom, top)`
#[inline]
pub fn body_overlaps(player_y: f32, bottom: f32, top: f32) -> bool {
    player_y < top && player_y + PLAYER_HEIGHT > bottom
}

/// Swept depth test: did the entity pass within ±ENGAGEMENT_DEPTH of the player this tick?
#[inline]
pub fn in_engagement_window(prev_z: f32, z: f32, player_z: f32) -> bool {
    prev_z < player_z + ENGAGEMENT_DEPTH && z > player_z - ENGAGEMENT_DEPTH
}

/// Oscillating pulser field radius
pub fn pulser_radius(elapsed: f32) -> f32 {
    PULSER_BASE_RADIUS * (1.0 + (elapsed * 6.0).sin() * 0.4)
}

/// Spinner arms are dangerous only while sweeping near horizontal
pub fn spinner_arms_sweeping(elapsed: f32, level: u32) -> bool {
    let rotation = elapsed * (3.0 + level as f32 * 0.2);
    rotation.cos().abs() > 0.8
}

/// Where a laser grid is in its cycle
pub fn laser_phase(elapsed: f32) -> LaserPhase {
    let t = elapsed.rem_euclid(LASER_CYCLE);
    if t < LASER_ACTIVE {
        LaserPhase::Active
    } else if t >= LASER_CYCLE - LASER_WARNING {
        LaserPhase::Warning
    } else {
        LaserPhase::Idle
    }
}

/// Does a damage source hit the player? Non-hazards never hit.
///
/// Assumes the caller already checked the engagement window.
pub fn damage_hit(entity: &WorldEntity, player: Vec3, elapsed: f32, level: u32) -> bool {
    let dx = (entity.pos.x - player.x).abs();
    match entity.kind {
        EntityKind::Obstacle => OBSTACLE_BOX.hits(dx, player),
        EntityKind::Missile => MISSILE_BOX.hits(dx, player),
        EntityKind::Alien { .. } => ALIEN_BOX.hits(dx, player),
        // Field is a sphere around the core, measured to the player's feet
        EntityKind::Pulser => player.distance(entity.pos) < pulser_radius(elapsed),
        EntityKind::Spinner => {
            let hit_pole = SPINNER_POLE_BOX.hits(dx, player);
            let hit_arms = spinner_arms_sweeping(elapsed, level)
                && dx < SPINNER_ARM_HALF_WIDTH
                && body_overlaps(
                    player.y,
                    entity.pos.y - SPINNER_ARM_HALF_HEIGHT,
                    entity.pos.y + SPINNER_ARM_HALF_HEIGHT,
                );
            hit_pole || hit_arms
        }
        EntityKind::LaserGrid => {
            laser_phase(elapsed) == LaserPhase::Active && LASER_GRID_BOX.hits(dx, player)
        }
        EntityKind::Gem { .. }
        | EntityKind::Letter { .. }
        | EntityKind::PowerUp(_)
        | EntityKind::ShopPortal => false,
    }
}

/// Lateral pickup reach for a kind
pub fn pickup_radius(kind: &EntityKind, has_magnet: bool) -> f32 {
    if has_magnet || matches!(kind, EntityKind::PowerUp(_)) {
        PICKUP_RADIUS_WIDE
    } else {
        PICKUP_RADIUS
    }
}

/// Is a pickup close enough to collect? Non-pickups are never collected.
pub fn pickup_reach(entity: &WorldEntity, player: Vec3, has_magnet: bool) -> bool {
    if !entity.kind.is_pickup() {
        return false;
    }
    let dx = (entity.pos.x - player.x).abs();
    let dy = (entity.pos.y - player.y).abs();
    dx < pickup_radius(&entity.kind, has_magnet) && dy < PICKUP_HEIGHT_REACH
}

/// The shop portal spans the whole track: only depth matters
pub fn portal_contact(entity: &WorldEntity, player: Vec3) -> bool {
    entity.kind == EntityKind::ShopPortal
        && in_engagement_window(entity.prev_z, entity.pos.z, player.z)
}
