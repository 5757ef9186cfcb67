//! Owned world state for one run.
//!
//! Enemies, projectiles and pickups live in a `hecs::World`. Anything spawned
//! or despawned while systems are iterating goes through `commands`, which is
//! flushed once at the end of the frame, so new entities first collide on the
//! following frame.

use engine_core::Transform;
use hecs::{CommandBuffer, World};

use crate::combat::TargetSnapshot;
use crate::enemy::Enemy;
use crate::player::Player;
use crate::projectile::{Projectile, Trail};

/// Seconds per difficulty wave.
pub const WAVE_LENGTH: f32 = 30.0;

pub struct WorldState {
    pub entities: World,
    pub commands: CommandBuffer,
    pub player: Player,

    // ── Run clock ───────────────────────────────────────────────────────
    /// Seconds survived.
    pub elapsed: f32,
    pub wave: u32,

    // ── Run summary ─────────────────────────────────────────────────────
    pub kills: u32,
    pub gold_collected: u32,
}

/// `1 + floor(elapsed / 30)`.
pub fn wave_for(elapsed: f32) -> u32 {
    1 + (elapsed / WAVE_LENGTH).floor() as u32
}

impl WorldState {
    pub fn new(player: Player) -> Self {
        Self {
            entities: World::new(),
            commands: CommandBuffer::new(),
            player,
            elapsed: 0.0,
            wave: 1,
            kills: 0,
            gold_collected: 0,
        }
    }

    /// Advance the run clock and recompute the wave.
    pub fn advance_clock(&mut self, dt: f32) {
        self.elapsed += dt;
        self.wave = wave_for(self.elapsed);
    }

    pub fn minutes(&self) -> f32 {
        self.elapsed / 60.0
    }

    /// Mirror of every live enemy for hit resolution this frame.
    pub fn enemy_targets(&self) -> TargetSnapshot {
        TargetSnapshot::capture(&self.entities)
    }

    pub fn enemy_count(&self) -> usize {
        self.entities.query::<&Enemy>().iter().count()
    }

    /// Queue a projectile with a trail sized for its variant.
    pub fn spawn_projectile(&mut self, mut transform: Transform, projectile: Projectile) {
        transform.scale = projectile.size();
        let trail = Trail::new(projectile.trail_length());
        self.commands.spawn((transform, projectile, trail));
    }

    /// Apply everything queued this frame.
    pub fn flush(&mut self) {
        self.commands.run_on(&mut self.entities);
    }

    /// Remove every enemy, projectile and pickup.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::PlayerClass;
    use crate::enemy::{EnemyBundle, EnemyType};
    use crate::persistence::MetaUpgrades;
    use crate::projectile::Bolt;
    use engine_core::Vec2;

    fn world() -> WorldState {
        WorldState::new(Player::new(PlayerClass::Shaman, Vec2::ZERO, &MetaUpgrades::default()))
    }

    #[test]
    fn wave_steps_every_thirty_seconds() {
        assert_eq!(wave_for(0.0), 1);
        assert_eq!(wave_for(29.9), 1);
        assert_eq!(wave_for(30.0), 2);
        assert_eq!(wave_for(600.0), 21);

        let mut w = world();
        for _ in 0..61 {
            w.advance_clock(0.5);
        }
        assert_eq!(w.wave, 2);
        assert!((w.minutes() - 30.5 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn queued_spawns_appear_after_flush() {
        let mut w = world();
        EnemyBundle::new(EnemyType::Imp, Vec2::new(3.0, 0.0), 0.0, 1).queue(&mut w.commands);
        w.spawn_projectile(
            Transform::from_position(Vec2::ZERO),
            Projectile::Bolt(Bolt::new(Vec2::X, 10.0, 8.0, false)),
        );
        assert_eq!(w.enemy_count(), 0);
        assert!(w.enemy_targets().is_empty());

        w.flush();
        assert_eq!(w.enemy_count(), 1);
        assert_eq!(w.enemy_targets().len(), 1);
        assert_eq!(w.entities.query::<(&Projectile, &Trail)>().iter().count(), 1);
    }

    #[test]
    fn clear_tears_everything_down() {
        let mut w = world();
        EnemyBundle::new(EnemyType::Zombie, Vec2::new(3.0, 0.0), 0.0, 1).spawn(&mut w.entities);
        EnemyBundle::new(EnemyType::Zombie, Vec2::new(5.0, 0.0), 0.0, 1).queue(&mut w.commands);
        w.clear();
        w.flush();
        assert_eq!(w.entities.len(), 0);
    }
}
