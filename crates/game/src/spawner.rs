//! Wave-based enemy spawning.
//!
//! Spawn cadence and group size tighten with both the wave number and
//! minutes survived. Composition is weighted toward the weakest unlocked
//! type. At fifteen minutes the Reaper arrives, exactly once.

use engine_core::Vec2;
use hecs::CommandBuffer;
use rand::prelude::*;

use crate::enemy::{EnemyBundle, EnemyType};

/// Seconds survived before the Reaper spawns.
pub const BOSS_TIME: f32 = 900.0;
const BOSS_DISTANCE: f32 = 20.0;
const MIN_INTERVAL: f32 = 0.3;
const MAX_GROUP: u32 = 5;

/// Seconds until the next group: `max(0.3, 2 - 0.1*wave - 0.05*minutes)`.
pub fn spawn_interval(wave: u32, minutes: f32) -> f32 {
    (2.0 - wave as f32 * 0.1 - minutes * 0.05).max(MIN_INTERVAL)
}

/// Group size: `min(5, 1 + wave/3 + minutes/5)`, both divisions floored.
pub fn spawn_count(wave: u32, minutes: f32) -> u32 {
    (1 + wave / 3 + (minutes / 5.0).floor() as u32).min(MAX_GROUP)
}

/// Weighted pick from an eligible list ordered weakest-first:
/// 50% the first, 30% the second (or the first if alone), 20% uniform.
pub fn pick_type(eligible: &[EnemyType], rng: &mut impl Rng) -> Option<EnemyType> {
    if eligible.is_empty() {
        return None;
    }
    let roll = rng.gen::<f32>();
    let index = if roll < 0.5 {
        0
    } else if roll < 0.8 {
        1.min(eligible.len() - 1)
    } else {
        rng.gen_range(0..eligible.len())
    };
    Some(eligible[index])
}

/// Random point on a ring around `center`.
pub fn ring_position(center: Vec2, min: f32, max: f32, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let distance = rng.gen_range(min..max);
    center + Vec2::from_angle(angle) * distance
}

/// What one spawner tick produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: u32,
    pub boss: bool,
}

/// Manages continuous enemy spawning around the player.
#[derive(Debug, Clone)]
pub struct EnemySpawner {
    /// Counts down to the next group.
    pub spawn_timer: f32,
    /// Minimum distance from player to spawn.
    pub min_spawn_distance: f32,
    /// Maximum distance from player to spawn.
    pub max_spawn_distance: f32,
    pub boss_spawned: bool,
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self {
            spawn_timer: 0.0,
            min_spawn_distance: 15.0,
            max_spawn_distance: 20.0,
            boss_spawned: false,
        }
    }
}

impl EnemySpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick the timer and queue new enemies into `commands`.
    pub fn update(
        &mut self,
        commands: &mut CommandBuffer,
        player_pos: Vec2,
        elapsed: f32,
        wave: u32,
        dt: f32,
        rng: &mut impl Rng,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        self.spawn_timer -= dt;

        if elapsed >= BOSS_TIME && !self.boss_spawned {
            self.boss_spawned = true;
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let pos = player_pos + Vec2::from_angle(angle) * BOSS_DISTANCE;
            EnemyBundle::new(EnemyType::Reaper, pos, elapsed, wave).queue(commands);
            report.boss = true;
            log::info!("the Reaper has arrived at {:.0}s", elapsed);
        }

        if self.spawn_timer <= 0.0 {
            let minutes = elapsed / 60.0;
            self.spawn_timer = spawn_interval(wave, minutes);

            let eligible = EnemyType::eligible(wave);
            for _ in 0..spawn_count(wave, minutes) {
                let Some(kind) = pick_type(&eligible, rng) else {
                    break;
                };
                let pos = ring_position(player_pos, self.min_spawn_distance, self.max_spawn_distance, rng);
                EnemyBundle::new(kind, pos, elapsed, wave).queue(commands);
                report.spawned += 1;
            }
            log::trace!("wave {} spawned {} enemies", wave, report.spawned);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::Enemy;
    use engine_core::{Health, Transform};
    use hecs::World;

    #[test]
    fn cadence_and_group_size() {
        assert!((spawn_interval(1, 0.0) - 1.9).abs() < 1e-6);
        assert_eq!(spawn_interval(30, 20.0), 0.3);
        assert_eq!(spawn_count(1, 0.0), 1);
        assert_eq!(spawn_count(6, 4.9), 3);
        assert_eq!(spawn_count(6, 5.0), 4);
        assert_eq!(spawn_count(40, 30.0), 5);
    }

    #[test]
    fn weighted_pick_favours_weakest() {
        let mut rng = StdRng::seed_from_u64(8);
        let pool = EnemyType::eligible(7);
        let mut counts = [0u32; 5];
        for _ in 0..10_000 {
            let kind = pick_type(&pool, &mut rng).unwrap();
            counts[pool.iter().position(|k| *k == kind).unwrap()] += 1;
        }
        // Expected: 54% / 34% / 4% / 4% / 4%.
        assert!((5000..5800).contains(&counts[0]), "{counts:?}");
        assert!((3000..3800).contains(&counts[1]), "{counts:?}");
        assert!(counts[2..].iter().all(|c| (250..600).contains(c)), "{counts:?}");
    }

    #[test]
    fn single_type_pool_always_picks_it() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pick_type(&[EnemyType::Imp], &mut rng), Some(EnemyType::Imp));
        }
        assert_eq!(pick_type(&[], &mut rng), None);
    }

    #[test]
    fn first_tick_spawns_on_the_ring() {
        let mut world = World::new();
        let mut commands = CommandBuffer::new();
        let mut spawner = EnemySpawner::new();
        let mut rng = StdRng::seed_from_u64(2);
        let center = Vec2::new(4.0, -2.0);

        let report = spawner.update(&mut commands, center, 0.0, 1, 0.016, &mut rng);
        commands.run_on(&mut world);
        assert_eq!(report, SpawnReport { spawned: 1, boss: false });
        for (_, (t, _)) in world.query::<(&Transform, &Enemy)>().iter() {
            let d = t.position.distance(center);
            assert!((15.0..=20.0).contains(&d), "distance {d}");
        }

        let again = spawner.update(&mut commands, center, 0.016, 1, 0.016, &mut rng);
        assert_eq!(again.spawned, 0);
    }

    #[test]
    fn boss_spawns_once_unscaled() {
        let mut world = World::new();
        let mut commands = CommandBuffer::new();
        let mut spawner = EnemySpawner::new();
        spawner.spawn_timer = 100.0;
        let mut rng = StdRng::seed_from_u64(3);

        let first = spawner.update(&mut commands, Vec2::ZERO, 900.0, 31, 0.016, &mut rng);
        let second = spawner.update(&mut commands, Vec2::ZERO, 901.0, 31, 0.016, &mut rng);
        commands.run_on(&mut world);
        assert!(first.boss);
        assert!(!second.boss);

        let bosses: Vec<(f32, f32)> = world
            .query::<(&Transform, &Health, &Enemy)>()
            .iter()
            .filter(|(_, (_, _, e))| e.is_boss)
            .map(|(_, (t, h, _))| (t.position.length(), h.max))
            .collect();
        assert_eq!(bosses.len(), 1);
        assert!((bosses[0].0 - 20.0).abs() < 1e-3);
        assert_eq!(bosses[0].1, 99999.0);
    }
}
