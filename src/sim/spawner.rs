//! Procedural content ahead of the player
//!
//! At most one spawn event per tick, placed behind the current frontier
//! (the deepest non-missile entity) by a speed- and difficulty-dependent gap.
//! Letters take priority whenever one is due.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, PowerUpKind};
use super::registry::EntityRegistry;
use super::state::LetterSet;
use super::weighted;
use crate::consts::*;
use crate::{Settings, Tuning, lane_to_x, max_lane};

/// Frontier assumed when the track is empty
const EMPTY_TRACK_FRONTIER: f32 = -20.0;
/// Damage-free distance at which its share of difficulty saturates
const CLEAN_RUN_SATURATION: f32 = 1000.0;
const LEVEL_DIFFICULTY_SHARE: f32 = 0.7;
const CLEAN_RUN_DIFFICULTY_SHARE: f32 = 0.3;
/// Spacing between gems in a run
const GEM_RUN_SPACING: f32 = 3.0;

/// What a spawn event places on the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnPattern {
    Obstacle,
    Pulser,
    Spinner,
    Alien,
    LaserGrid,
    /// Obstacles across every lane but one
    Wall,
    /// Several gems in a line
    GemRun,
    Gem,
    PowerUp,
}

impl SpawnPattern {
    pub fn is_hazard(self) -> bool {
        matches!(
            self,
            SpawnPattern::Obstacle
                | SpawnPattern::Pulser
                | SpawnPattern::Spinner
                | SpawnPattern::Alien
                | SpawnPattern::LaserGrid
                | SpawnPattern::Wall
        )
    }
}

/// Result of a spawn attempt that placed something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawned {
    Letter(u8),
    Pattern(SpawnPattern),
}

/// Difficulty in [0, 1] from the level tier and the current damage-free streak
pub fn difficulty_factor(level: u32, distance_since_damage: f32) -> f32 {
    let tier = level.clamp(1, MAX_LEVEL).saturating_sub(1) as f32 / (MAX_LEVEL - 1) as f32;
    let streak = (distance_since_damage / CLEAN_RUN_SATURATION).clamp(0.0, 1.0);
    (LEVEL_DIFFICULTY_SHARE * tier + CLEAN_RUN_DIFFICULTY_SHARE * streak).clamp(0.0, 1.0)
}

/// Pattern weights in selection order. Locked hazards get zero weight.
pub fn pattern_weights(level: u32, difficulty: f32, hazard_scale: f32) -> [(f32, SpawnPattern); 9] {
    let d = difficulty;
    let unlocked = |min_level: u32, weight: f32| if level >= min_level { weight } else { 0.0 };
    let weights = [
        (0.35, SpawnPattern::Obstacle),
        (unlocked(3, 0.10 + 0.10 * d), SpawnPattern::Pulser),
        (unlocked(6, 0.08 + 0.10 * d), SpawnPattern::Spinner),
        (unlocked(4, 0.06 + 0.08 * d), SpawnPattern::Alien),
        (unlocked(8, 0.05 + 0.10 * d), SpawnPattern::LaserGrid),
        (unlocked(2, 0.05 + 0.15 * d), SpawnPattern::Wall),
        (0.20 - 0.10 * d, SpawnPattern::GemRun),
        (0.15, SpawnPattern::Gem),
        (0.03, SpawnPattern::PowerUp),
    ];
    weights.map(|(w, pattern)| {
        if pattern.is_hazard() {
            (w * hazard_scale, pattern)
        } else {
            (w, pattern)
        }
    })
}

/// Minimum depth between consecutive spawn events
pub fn min_spawn_gap(tuning: &Tuning, speed: f32, difficulty: f32, spacing_scale: f32) -> f32 {
    let base = tuning.spawn_gap_base + tuning.spawn_gap_speed_factor * speed;
    base * (1.0 - tuning.spawn_gap_compression * difficulty) * spacing_scale
}

/// Uniform lane index for the given lane count
pub fn random_lane<R: Rng>(rng: &mut R, lane_count: u32) -> i32 {
    let max = max_lane(lane_count);
    rng.random_range(-max..=max)
}

/// Everything the spawner reads from the run
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub tuning: &'a Tuning,
    pub settings: &'a Settings,
    pub level: u32,
    pub lane_count: u32,
    pub speed: f32,
    pub distance: f32,
    pub distance_since_damage: f32,
    pub letters: LetterSet,
}

/// Letter schedule plus the spawn step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    /// Distance travelled at which the next letter is due
    pub next_letter_distance: f32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            next_letter_distance: tuning.letter_interval(1),
        }
    }

    /// After a level-up the first letter comes one interval past the fresh horizon
    pub fn reschedule_letters(&mut self, distance: f32, interval: f32) {
        self.next_letter_distance = distance - SPAWN_DISTANCE + interval;
    }

    /// Place at most one spawn event behind the frontier
    pub fn fill<R: Rng>(
        &mut self,
        ctx: &SpawnContext,
        registry: &mut EntityRegistry,
        rng: &mut R,
    ) -> Option<Spawned> {
        let frontier = registry.frontier_z().unwrap_or(EMPTY_TRACK_FRONTIER);
        if frontier <= -SPAWN_DISTANCE {
            return None;
        }

        let difficulty = difficulty_factor(ctx.level, ctx.distance_since_damage);
        let gap = min_spawn_gap(
            ctx.tuning,
            ctx.speed,
            difficulty,
            ctx.settings.spawn_spacing_scale(),
        );
        let spawn_z = (frontier - gap).min(-SPAWN_DISTANCE);

        if ctx.distance >= self.next_letter_distance {
            let missing: Vec<u8> = ctx.letters.missing().collect();
            if missing.is_empty() {
                return None;
            }
            let index = missing[rng.random_range(0..missing.len())];
            let lane = random_lane(rng, ctx.lane_count);
            let kind = EntityKind::Letter { index };
            registry.spawn(kind, Vec3::new(lane_to_x(lane), kind.spawn_height(), spawn_z));
            self.next_letter_distance += ctx.tuning.letter_interval(ctx.level);
            log::debug!("Spawned letter {} at z={:.1}", index, spawn_z);
            return Some(Spawned::Letter(index));
        }

        if rng.random::<f32>() < ctx.tuning.spawn_skip_chance {
            return None;
        }

        let weights = pattern_weights(ctx.level, difficulty, ctx.settings.hazard_weight_scale());
        let pattern = weighted::choose(rng, &weights)?;
        place_pattern(pattern, spawn_z, ctx, registry, rng);
        log::debug!(
            "Spawned {:?} at z={:.1} (difficulty {:.2}, gap {:.1})",
            pattern,
            spawn_z,
            difficulty,
            gap
        );
        Some(Spawned::Pattern(pattern))
    }
}

/// Materialise a pattern at depth `z`
pub fn place_pattern<R: Rng>(
    pattern: SpawnPattern,
    z: f32,
    ctx: &SpawnContext,
    registry: &mut EntityRegistry,
    rng: &mut R,
) {
    let place = |registry: &mut EntityRegistry, kind: EntityKind, lane: i32, z: f32| {
        registry.spawn(kind, Vec3::new(lane_to_x(lane), kind.spawn_height(), z));
    };

    match pattern {
        SpawnPattern::Obstacle => place(registry, EntityKind::Obstacle, random_lane(rng, ctx.lane_count), z),
        SpawnPattern::Pulser => place(registry, EntityKind::Pulser, random_lane(rng, ctx.lane_count), z),
        SpawnPattern::Spinner => place(registry, EntityKind::Spinner, random_lane(rng, ctx.lane_count), z),
        SpawnPattern::Alien => place(
            registry,
            EntityKind::Alien { has_fired: false },
            random_lane(rng, ctx.lane_count),
            z,
        ),
        SpawnPattern::LaserGrid => {
            place(registry, EntityKind::LaserGrid, random_lane(rng, ctx.lane_count), z)
        }
        SpawnPattern::Wall => {
            let max = max_lane(ctx.lane_count);
            let open = random_lane(rng, ctx.lane_count);
            for lane in (-max..=max).filter(|&lane| lane != open) {
                place(registry, EntityKind::Obstacle, lane, z);
            }
        }
        SpawnPattern::GemRun => {
            let lane = random_lane(rng, ctx.lane_count);
            let count = rng.random_range(3..=5);
            let gem = EntityKind::Gem {
                points: ctx.tuning.gem_points,
            };
            for i in 0..count {
                place(registry, gem, lane, z - i as f32 * GEM_RUN_SPACING);
            }
        }
        SpawnPattern::Gem => place(
            registry,
            EntityKind::Gem {
                points: ctx.tuning.gem_points,
            },
            random_lane(rng, ctx.lane_count),
            z,
        ),
        SpawnPattern::PowerUp => {
            let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
            place(registry, EntityKind::PowerUp(kind), random_lane(rng, ctx.lane_count), z)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn no_skip() -> Tuning {
        Tuning {
            spawn_skip_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn ctx<'a>(tuning: &'a Tuning, settings: &'a Settings, level: u32, lane_count: u32) -> SpawnContext<'a> {
        SpawnContext {
            tuning,
            settings,
            level,
            lane_count,
            speed: tuning.base_run_speed,
            distance: 0.0,
            distance_since_damage: 0.0,
            letters: LetterSet::default(),
        }
    }

    #[test]
    fn test_difficulty_factor_range() {
        assert_eq!(difficulty_factor(1, 0.0), 0.0);
        assert!((difficulty_factor(10, 0.0) - 0.7).abs() < 1e-6);
        assert!((difficulty_factor(1, 500.0) - 0.15).abs() < 1e-6);
        assert!((difficulty_factor(10, 5000.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hazards_unlock_by_level() {
        let weight = |level, pattern| {
            pattern_weights(level, 0.0, 1.0)
                .iter()
                .find(|(_, p)| *p == pattern)
                .map(|(w, _)| *w)
                .unwrap()
        };
        assert_eq!(weight(1, SpawnPattern::Wall), 0.0);
        assert!(weight(2, SpawnPattern::Wall) > 0.0);
        assert_eq!(weight(2, SpawnPattern::Pulser), 0.0);
        assert!(weight(3, SpawnPattern::Pulser) > 0.0);
        assert_eq!(weight(3, SpawnPattern::Alien), 0.0);
        assert!(weight(4, SpawnPattern::Alien) > 0.0);
        assert_eq!(weight(5, SpawnPattern::Spinner), 0.0);
        assert!(weight(6, SpawnPattern::Spinner) > 0.0);
        assert_eq!(weight(7, SpawnPattern::LaserGrid), 0.0);
        assert!(weight(8, SpawnPattern::LaserGrid) > 0.0);
    }

    #[test]
    fn test_accessibility_halves_hazards() {
        let normal = pattern_weights(5, 0.5, 1.0);
        let gentle = pattern_weights(5, 0.5, 0.5);
        for ((w, pattern), (g, _)) in normal.iter().zip(gentle.iter()) {
            if pattern.is_hazard() {
                assert!((g - w * 0.5).abs() < 1e-6);
            } else {
                assert_eq!(g, w);
            }
        }
    }

    #[test]
    fn test_gap_compresses_with_difficulty() {
        let tuning = Tuning::default();
        let easy = min_spawn_gap(&tuning, 20.0, 0.0, 1.0);
        let hard = min_spawn_gap(&tuning, 20.0, 1.0, 1.0);
        assert!((easy - 17.0).abs() < 1e-4);
        assert!((hard - 17.0 * 0.7).abs() < 1e-4);
        assert!(min_spawn_gap(&tuning, 20.0, 0.0, 1.25) > easy);
    }

    #[test]
    fn test_empty_track_spawns_at_horizon() {
        let tuning = no_skip();
        let settings = Settings::default();
        let mut spawner = Spawner::new(&tuning);
        let mut registry = EntityRegistry::new();
        let mut rng = Pcg32::seed_from_u64(1);

        let spawned = spawner.fill(&ctx(&tuning, &settings, 1, 3), &mut registry, &mut rng);
        assert!(matches!(spawned, Some(Spawned::Pattern(_))));
        assert_eq!(registry.frontier_z().map(|z| z <= -SPAWN_DISTANCE), Some(true));
        // Frontier is now past the horizon
        assert_eq!(spawner.fill(&ctx(&tuning, &settings, 1, 3), &mut registry, &mut rng), None);
    }

    #[test]
    fn test_spawn_respects_gap_behind_frontier() {
        let tuning = no_skip();
        let settings = Settings::default();
        let mut spawner = Spawner::new(&tuning);
        let mut registry = EntityRegistry::new();
        registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -115.0));
        let mut rng = Pcg32::seed_from_u64(2);

        let context = ctx(&tuning, &settings, 1, 3);
        let gap = min_spawn_gap(&tuning, context.speed, 0.0, 1.0);
        spawner.fill(&context, &mut registry, &mut rng);
        let deepest = registry.frontier_z().unwrap();
        assert!(deepest <= -115.0 - gap + 1e-3);
    }

    #[test]
    fn test_due_letter_is_uncollected() {
        let tuning = Tuning::default();
        let settings = Settings::default();
        let mut spawner = Spawner::new(&tuning);
        let mut registry = EntityRegistry::new();
        let mut rng = Pcg32::seed_from_u64(3);

        let mut letters = LetterSet::default();
        for i in [0, 1, 2, 4, 5] {
            letters.insert(i);
        }
        let context = SpawnContext {
            distance: 150.0,
            letters,
            ..ctx(&tuning, &settings, 1, 3)
        };
        assert_eq!(spawner.fill(&context, &mut registry, &mut rng), Some(Spawned::Letter(3)));
        assert!((spawner.next_letter_distance - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_letter_once_set_is_complete() {
        let tuning = Tuning::default();
        let settings = Settings::default();
        let mut spawner = Spawner::new(&tuning);
        let mut registry = EntityRegistry::new();
        let mut rng = Pcg32::seed_from_u64(4);

        let mut letters = LetterSet::default();
        for i in 0..LETTER_COUNT as u8 {
            letters.insert(i);
        }
        let context = SpawnContext {
            distance: 150.0,
            letters,
            ..ctx(&tuning, &settings, 1, 3)
        };
        assert_eq!(spawner.fill(&context, &mut registry, &mut rng), None);
        assert!(registry.is_empty());
        assert_eq!(spawner.next_letter_distance, 150.0);
    }

    #[test]
    fn test_reschedule_after_level_up() {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(&tuning);
        spawner.reschedule_letters(1000.0, tuning.letter_interval(2));
        assert!((spawner.next_letter_distance - (1000.0 - 120.0 + 195.0)).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_wall_leaves_one_clear_lane(seed in any::<u64>(), lanes in prop::sample::select(vec![3u32, 5, 7, 9])) {
            let tuning = Tuning::default();
            let settings = Settings::default();
            let mut registry = EntityRegistry::new();
            let mut rng = Pcg32::seed_from_u64(seed);
            place_pattern(SpawnPattern::Wall, -120.0, &ctx(&tuning, &settings, 5, lanes), &mut registry, &mut rng);

            let mut blocked: Vec<i32> = registry
                .iter()
                .map(|e| (e.pos.x / LANE_WIDTH).round() as i32)
                .collect();
            blocked.sort_unstable();
            blocked.dedup();
            prop_assert_eq!(blocked.len(), lanes as usize - 1);
            prop_assert!(registry.iter().all(|e| e.kind == EntityKind::Obstacle));
        }

        #[test]
        fn prop_gem_run_stays_in_lane(seed in any::<u64>()) {
            let tuning = Tuning::default();
            let settings = Settings::default();
            let mut registry = EntityRegistry::new();
            let mut rng = Pcg32::seed_from_u64(seed);
            place_pattern(SpawnPattern::GemRun, -120.0, &ctx(&tuning, &settings, 1, 5), &mut registry, &mut rng);

            prop_assert!((3..=5).contains(&registry.len()));
            let x = registry.iter().next().map(|e| e.pos.x).unwrap_or_default();
            prop_assert!(registry.iter().all(|e| e.pos.x == x && e.pos.z <= -120.0));
        }
    }
}
