//! Collision resolution against the player
//!
//! Two passes: first gather every active entity inside the engagement window
//! that the hit-test rules match, then deactivate and apply them one by one.
//! Effects stop as soon as the run leaves Playing (game over, shop, victory).

use glam::Vec3;

use super::collision::{damage_hit, in_engagement_window, pickup_reach, portal_contact};
use super::entity::{EntityId, EntityKind};
use super::registry::EntityRegistry;
use super::state::{GameEvent, GameState};
use crate::consts::ENGAGEMENT_DEPTH;

/// A matched entity awaiting its effect
#[derive(Debug, Clone, Copy)]
struct Contact {
    id: EntityId,
    kind: EntityKind,
    position: Vec3,
    color: u32,
}

/// Sweep the registry against the player's position for this tick
pub fn resolve(state: &mut GameState) {
    let player = state.player;
    let has_magnet = state.run.abilities.inventory.magnet;
    let elapsed = state.elapsed;
    let level = state.run.level;

    let contacts: Vec<Contact> = state
        .entities
        .active()
        .filter(|e| in_engagement_window(e.prev_z, e.pos.z, player.z))
        .filter(|e| match e.kind {
            EntityKind::ShopPortal => portal_contact(e, player),
            kind if kind.is_damage_source() => damage_hit(e, player, elapsed, level),
            _ => pickup_reach(e, player, has_magnet),
        })
        .map(|e| Contact {
            id: e.id,
            kind: e.kind,
            position: e.pos,
            color: e.color,
        })
        .collect();

    for contact in contacts {
        if !state.run.is_playing() {
            break;
        }
        if !state.entities.deactivate(contact.id) {
            continue;
        }
        apply_contact(state, contact);
    }
}

fn apply_contact(state: &mut GameState, contact: Contact) {
    let Contact {
        kind,
        position,
        color,
        ..
    } = contact;

    match kind {
        EntityKind::Obstacle
        | EntityKind::Missile
        | EntityKind::Alien { .. }
        | EntityKind::Spinner
        | EntityKind::Pulser
        | EntityKind::LaserGrid => {
            state.emit(GameEvent::PlayerHit { position, color });
            state.apply_damage();
        }
        EntityKind::Gem { points } => {
            state.collect_gem(points);
            state.emit(GameEvent::ItemCollected {
                kind,
                position,
                color,
            });
        }
        EntityKind::Letter { index } => {
            state.emit(GameEvent::ItemCollected {
                kind,
                position,
                color,
            });
            state.collect_letter(index);
        }
        EntityKind::PowerUp(power_up) => {
            state.collect_power_up(power_up);
            state.emit(GameEvent::ItemCollected {
                kind,
                position,
                color,
            });
        }
        EntityKind::ShopPortal => {
            state.open_shop();
        }
    }
}

/// Deactivate every damage source between `range` ahead of the player and
/// the back of the engagement window. Returns how many were cleared.
pub fn sonic_pulse(registry: &mut EntityRegistry, player_z: f32, range: f32) -> usize {
    registry.deactivate_where(|e| {
        e.kind.is_damage_source()
            && e.pos.z >= player_z - range
            && e.pos.z <= player_z + ENGAGEMENT_DEPTH
    })
}
