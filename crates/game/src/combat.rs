//! Damage resolution: armor, invincibility, crits, knockback and drop rolls.
//!
//! Weapons never touch enemy components while they iterate. They read a
//! [`TargetSnapshot`], record [`Hit`]s against it and hand the list to
//! [`apply_hits`] once iteration is over.

use engine_core::{Entity, Health, Transform, Vec2};
use hecs::World;
use rand::Rng;

use crate::enemy::{Enemy, HIT_FLASH};
use crate::pickup::{Pickup, PickupKind};
use crate::player::Player;
use crate::world::WorldState;

/// Invincibility after the player is hurt.
pub const PLAYER_INVINCIBILITY: f32 = 0.5;
/// Red flash after the player is hurt.
pub const PLAYER_FLASH: f32 = 0.1;

// Independent drop chances.
const GOLD_CHANCE: f64 = 0.3;
const HEALTH_CHANCE: f64 = 0.1;
const CHEST_CHANCE: f64 = 0.015;
const CRYSTAL_CHANCE: f64 = 0.008;
/// Rare drops land up to this far from the corpse on each axis.
const RARE_DROP_JITTER: f32 = 0.25;

/// Damage to deal to one enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: Entity,
    pub amount: f32,
    pub is_crit: bool,
}

impl Hit {
    pub fn new(target: Entity, amount: f32) -> Self {
        Self { target, amount, is_crit: false }
    }
}

/// Result of hitting the player, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlayerHit {
    /// Invincibility window absorbed it.
    Ignored,
    Hurt,
    Killed,
}

/// Live enemy as seen by weapons during one pass.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub entity: Entity,
    pub position: Vec2,
    /// Mirror of the enemy's HP, reduced as hits are recorded.
    pub hp: f32,
}

/// Copy of every living enemy, taken before a weapon pass.
#[derive(Debug, Clone, Default)]
pub struct TargetSnapshot {
    targets: Vec<Target>,
}

impl TargetSnapshot {
    pub fn capture(world: &World) -> Self {
        let targets = world
            .query::<(&Transform, &Health, &Enemy)>()
            .iter()
            .filter(|(_, (_, health, _))| !health.is_dead())
            .map(|(entity, (transform, health, _))| Target {
                entity,
                position: transform.position,
                hp: health.current,
            })
            .collect();
        Self { targets }
    }

    /// Targets that haven't been killed by a recorded hit.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.hp > 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Closest living target strictly within `max_distance` of `from`.
    pub fn nearest(&self, from: Vec2, max_distance: f32) -> Option<&Target> {
        self.iter()
            .map(|t| (t, t.position.distance(from)))
            .filter(|(_, d)| *d < max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| t)
    }

    /// Living targets strictly within `radius` of `from`.
    pub fn within(&self, from: Vec2, radius: f32) -> Vec<Target> {
        self.iter().filter(|t| t.position.distance(from) < radius).copied().collect()
    }

    /// Record a hit and return it. Later queries skip targets the mirror says are dead.
    pub fn strike(&mut self, entity: Entity, amount: f32) -> Hit {
        if let Some(t) = self.targets.iter_mut().find(|t| t.entity == entity) {
            t.hp -= amount;
        }
        Hit::new(entity, amount)
    }
}

/// Armor mitigation.
pub fn mitigate(amount: f32, armor: f32) -> f32 {
    amount * (1.0 - armor)
}

pub fn roll_crit(rng: &mut impl Rng, chance: f32) -> bool {
    chance > 0.0 && rng.gen::<f32>() < chance
}

/// Hurt the player unless invincible. Starts a new invincibility window and flash on a hit.
pub fn damage_player(player: &mut Player, amount: f32) -> PlayerHit {
    if player.invincibility.is_active() {
        return PlayerHit::Ignored;
    }
    player.health.take_damage(mitigate(amount, player.armor));
    player.invincibility.reset(PLAYER_INVINCIBILITY);
    player.damage_flash.reset(PLAYER_FLASH);
    if player.health.is_dead() {
        PlayerHit::Killed
    } else {
        PlayerHit::Hurt
    }
}

/// Push `position` directly away from `source`.
pub fn knockback(position: &mut Vec2, source: Vec2, magnitude: f32) {
    let away = (*position - source).normalize_or_zero();
    *position += away * magnitude;
}

/// Independent drop rolls for a dead enemy. XP is guaranteed.
pub fn roll_drops(rng: &mut impl Rng, position: Vec2, xp_value: u32) -> Vec<(Vec2, Pickup)> {
    let mut drops = vec![(position, Pickup::new(PickupKind::XpOrb, xp_value))];

    if rng.gen_bool(GOLD_CHANCE) {
        let gold = (xp_value as f32 * 2.0).ceil() as u32;
        drops.push((position, Pickup::new(PickupKind::Gold, gold)));
    }
    if rng.gen_bool(HEALTH_CHANCE) {
        drops.push((position, Pickup::new(PickupKind::Health, 0)));
    }
    if rng.gen_bool(CHEST_CHANCE) {
        drops.push((jitter(rng, position), Pickup::new(PickupKind::Chest, 0)));
    }
    if rng.gen_bool(CRYSTAL_CHANCE) {
        drops.push((jitter(rng, position), Pickup::new(PickupKind::VacuumCrystal, 0)));
    }
    drops
}

fn jitter(rng: &mut impl Rng, position: Vec2) -> Vec2 {
    position
        + Vec2::new(
            rng.gen_range(-RARE_DROP_JITTER..RARE_DROP_JITTER),
            rng.gen_range(-RARE_DROP_JITTER..RARE_DROP_JITTER),
        )
}

/// Damage one enemy. On the killing blow, queue its drops and despawn and count the kill.
/// Returns true if this hit killed it.
pub fn damage_enemy(world: &mut WorldState, hit: Hit, rng: &mut impl Rng) -> bool {
    let (position, xp_value, killed) = {
        let Ok((transform, health, enemy)) =
            world.entities.query_one_mut::<(&Transform, &mut Health, &mut Enemy)>(hit.target)
        else {
            return false;
        };
        if health.is_dead() {
            return false;
        }
        enemy.flash.reset(HIT_FLASH);
        let killed = health.take_damage(hit.amount);
        (transform.position, enemy.xp_value, killed)
    };

    if hit.is_crit {
        log::trace!("crit for {:.1}", hit.amount);
    }
    if !killed {
        return false;
    }

    for (pos, pickup) in roll_drops(rng, position, xp_value) {
        pickup.queue(&mut world.commands, pos);
    }
    world.commands.despawn(hit.target);
    world.kills += 1;
    true
}

/// Apply a batch of hits recorded during a weapon pass. Returns kills.
pub fn apply_hits(world: &mut WorldState, hits: &[Hit], rng: &mut impl Rng) -> u32 {
    hits.iter().filter(|hit| damage_enemy(world, **hit, rng)).count() as u32
}
