//! World entities: everything that travels down the track toward the player

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Unique handle of a world entity (never reused within a session)
pub type EntityId = u32;

/// Display colours (0xRRGGBB), passed through to collaborators untouched
pub mod colors {
    pub const OBSTACLE: u32 = 0xff0054;
    pub const MISSILE: u32 = 0xff0000;
    pub const ALIEN: u32 = 0x00ff66;
    pub const SPINNER: u32 = 0x00ffff;
    pub const PULSER: u32 = 0xaa00ff;
    pub const LASER_GRID: u32 = 0xff2200;
    pub const GEM: u32 = 0x00ffff;
    pub const SPEED: u32 = 0x00ffff;
    pub const FRENZY: u32 = 0xffcc00;
    pub const SHIELD: u32 = 0xffffff;
    pub const SHOP_PORTAL: u32 = 0xff00ff;
    /// One colour per letter of the target word
    pub const LETTERS: [u32; 6] = [0x2979ff, 0x448aff, 0x651fff, 0x7c4dff, 0xd500f9, 0xff4081];
}

/// Timed buff carried by a power-up pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Speed,
    Frenzy,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Speed, PowerUpKind::Frenzy, PowerUpKind::Shield];

    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::Speed => colors::SPEED,
            PowerUpKind::Frenzy => colors::FRENZY,
            PowerUpKind::Shield => colors::SHIELD,
        }
    }
}

/// Entity variant, each carrying only the data it needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    Missile,
    /// Fires one missile when it crosses the trigger depth
    Alien { has_fired: bool },
    Spinner,
    Pulser,
    LaserGrid,
    Gem { points: u32 },
    Letter { index: u8 },
    PowerUp(PowerUpKind),
    ShopPortal,
}

impl EntityKind {
    /// Hurts the player on contact
    pub fn is_damage_source(&self) -> bool {
        matches!(
            self,
            EntityKind::Obstacle
                | EntityKind::Missile
                | EntityKind::Alien { .. }
                | EntityKind::Spinner
                | EntityKind::Pulser
                | EntityKind::LaserGrid
        )
    }

    /// Collected on proximity (and pulled in by the magnet)
    pub fn is_pickup(&self) -> bool {
        matches!(
            self,
            EntityKind::Gem { .. } | EntityKind::Letter { .. } | EntityKind::PowerUp(_)
        )
    }

    /// Default display colour
    pub fn color(&self) -> u32 {
        match self {
            EntityKind::Obstacle => colors::OBSTACLE,
            EntityKind::Missile => colors::MISSILE,
            EntityKind::Alien { .. } => colors::ALIEN,
            EntityKind::Spinner => colors::SPINNER,
            EntityKind::Pulser => colors::PULSER,
            EntityKind::LaserGrid => colors::LASER_GRID,
            EntityKind::Gem { .. } => colors::GEM,
            EntityKind::Letter { index } => colors::LETTERS[*index as usize % colors::LETTERS.len()],
            EntityKind::PowerUp(kind) => kind.color(),
            EntityKind::ShopPortal => colors::SHOP_PORTAL,
        }
    }

    /// Height (Y) the spawner places this kind at
    pub fn spawn_height(&self) -> f32 {
        match self {
            EntityKind::Obstacle => OBSTACLE_HEIGHT / 2.0,
            EntityKind::Missile | EntityKind::Letter { .. } => 1.0,
            EntityKind::Alien { .. } => 1.75,
            EntityKind::Spinner | EntityKind::Pulser | EntityKind::PowerUp(_) => 1.5,
            EntityKind::LaserGrid => 1.1,
            EntityKind::Gem { .. } => 1.2,
            EntityKind::ShopPortal => 0.0,
        }
    }
}

/// A live entity on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec3,
    /// Depth before this tick's movement (for the swept engagement test)
    pub prev_z: f32,
    pub active: bool,
    /// Display hint only
    pub color: u32,
}

impl WorldEntity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec3) -> Self {
        Self {
            id,
            kind,
            pos,
            prev_z: pos.z,
            active: true,
            color: kind.color(),
        }
    }

    /// True once the entity has travelled past the removal depth
    pub fn is_behind_camera(&self) -> bool {
        self.pos.z > REMOVE_DISTANCE
    }
}
