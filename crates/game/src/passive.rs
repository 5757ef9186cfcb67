//! Passive weapons: holy orbit, garlic aura, boomerang, lightning and throwing axes.
//!
//! Each system only runs while the player owns that weapon (level >= 1).
//! Level scaling formulas live in small free functions so they can be checked
//! in isolation.

use engine_core::{rotate_vec, Cooldown, Entity, Lifetime, Transform, Vec2};
use rand::Rng;

use crate::combat::{self, Hit};
use crate::projectile::{
    self, lightning_path, Axe, Boomerang, LightningStrike, Orb, Projectile, LIGHTNING_LIFETIME,
    LIGHTNING_SEGMENTS,
};
use crate::weapons::spread_directions;
use crate::world::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PassiveWeaponId {
    HolyOrbit,
    GarlicAura,
    Boomerang,
    Lightning,
    ThrowingAxe,
}

impl PassiveWeaponId {
    pub const ALL: [PassiveWeaponId; 5] = [
        PassiveWeaponId::HolyOrbit,
        PassiveWeaponId::GarlicAura,
        PassiveWeaponId::Boomerang,
        PassiveWeaponId::Lightning,
        PassiveWeaponId::ThrowingAxe,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PassiveWeaponId::HolyOrbit => "Holy Orbit",
            PassiveWeaponId::GarlicAura => "Garlic Aura",
            PassiveWeaponId::Boomerang => "Boomerang",
            PassiveWeaponId::Lightning => "Lightning",
            PassiveWeaponId::ThrowingAxe => "Throwing Axe",
        }
    }
}

// ── Holy orbit ──────────────────────────────────────────────────────────
pub const ORBIT_DAMAGE: f32 = 0.5;
pub const ORBIT_RADIUS: f32 = 2.5;
/// Radians per second.
pub const ORBIT_SPEED: f32 = 3.5;
pub const ORBIT_COUNT: u32 = 3;

// ── Garlic aura ─────────────────────────────────────────────────────────
pub const AURA_DAMAGE: f32 = 0.3;
pub const AURA_RADIUS: f32 = 2.0;
pub const AURA_TICK: f32 = 0.5;
pub const AURA_KNOCKBACK: f32 = 0.15;

// ── Boomerang ───────────────────────────────────────────────────────────
pub const BOOMERANG_DAMAGE: f32 = 0.8;
pub const BOOMERANG_COOLDOWN: f32 = 1.5;
pub const BOOMERANG_RANGE: f32 = 6.0;
pub const BOOMERANG_COUNT: u32 = 1;
const BOOMERANG_FAN: f32 = 0.4;
const BOOMERANG_MUZZLE: f32 = 0.3;

// ── Lightning ───────────────────────────────────────────────────────────
pub const LIGHTNING_DAMAGE: f32 = 1.2;
pub const LIGHTNING_COOLDOWN: f32 = 1.8;
pub const LIGHTNING_RANGE: f32 = 10.0;
pub const LIGHTNING_STRIKES: u32 = 1;

// ── Throwing axe ────────────────────────────────────────────────────────
pub const AXE_DAMAGE: f32 = 1.5;
pub const AXE_COOLDOWN: f32 = 2.0;
pub const AXE_COUNT: u32 = 1;
pub const AXE_PENETRATION: u32 = 3;
const AXE_FAN: f32 = 0.5;
const AXE_HORIZONTAL_SPEED: f32 = 4.8;
const AXE_LAUNCH_SPEED: f32 = 15.0;

fn steps(level: u32) -> f32 {
    level.saturating_sub(1) as f32
}

/// `1 + (level-1)*per`
pub fn level_factor(level: u32, per: f32) -> f32 {
    1.0 + steps(level) * per
}

pub fn orbit_count(level: u32) -> u32 {
    ORBIT_COUNT + level.saturating_sub(1) / 2
}

pub fn orbit_radius(level: u32) -> f32 {
    ORBIT_RADIUS * level_factor(level, 0.1)
}

pub fn aura_radius(level: u32) -> f32 {
    AURA_RADIUS * level_factor(level, 0.15)
}

pub fn aura_knockback(level: u32) -> f32 {
    AURA_KNOCKBACK * level_factor(level, 0.1)
}

pub fn boomerang_cooldown(level: u32) -> f32 {
    BOOMERANG_COOLDOWN / level_factor(level, 0.1)
}

pub fn boomerang_range(level: u32) -> f32 {
    BOOMERANG_RANGE * level_factor(level, 0.1)
}

pub fn boomerang_count(level: u32) -> u32 {
    BOOMERANG_COUNT + level.saturating_sub(1) / 3
}

pub fn lightning_cooldown(level: u32) -> f32 {
    LIGHTNING_COOLDOWN / level_factor(level, 0.15)
}

pub fn lightning_strikes(level: u32) -> u32 {
    LIGHTNING_STRIKES + level.saturating_sub(1) / 2
}

pub fn lightning_range(level: u32) -> f32 {
    LIGHTNING_RANGE * level_factor(level, 0.1)
}

pub fn axe_cooldown(level: u32) -> f32 {
    AXE_COOLDOWN / level_factor(level, 0.12)
}

pub fn axe_count(level: u32) -> u32 {
    AXE_COUNT + level.saturating_sub(1) / 3
}

pub fn axe_penetration(level: u32) -> u32 {
    AXE_PENETRATION + level.saturating_sub(1) / 2
}

/// Launch velocity for axe `index` of `count`.
pub fn axe_velocity(index: u32, count: u32) -> Vec2 {
    let fan = (index as f32 - (count as f32 - 1.0) / 2.0) * AXE_FAN;
    Vec2::new(fan.sin() * AXE_HORIZONTAL_SPEED, AXE_LAUNCH_SPEED)
}

/// Timers for the passive weapons. Orbit bodies are entities and need no timer.
#[derive(Debug, Default)]
pub struct PassiveWeaponEngine {
    aura_timer: Cooldown,
    boomerang_timer: Cooldown,
    lightning_timer: Cooldown,
    axe_timer: Cooldown,
}

impl PassiveWeaponEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, world: &mut WorldState, dt: f32, rng: &mut impl Rng) {
        let player = &world.player;
        let levels = PassiveWeaponId::ALL.map(|id| player.passive_level(id));
        let [orbit, aura, boomerang, lightning, axe] = levels;

        if let Some(level) = orbit {
            update_orbit(world, level, dt);
        }
        if let Some(level) = aura {
            self.update_aura(world, level, dt, rng);
        }
        if let Some(level) = boomerang {
            self.update_boomerang(world, level, dt);
        }
        if let Some(level) = lightning {
            self.update_lightning(world, level, dt, rng);
        }
        if let Some(level) = axe {
            self.update_axes(world, level, dt);
        }
    }

    fn update_aura(&mut self, world: &mut WorldState, level: u32, dt: f32, rng: &mut impl Rng) {
        self.aura_timer.tick(dt);
        if !self.aura_timer.is_ready() {
            return;
        }
        self.aura_timer.reset(AURA_TICK);

        let origin = world.player.position;
        let radius = aura_radius(level);
        let damage = world.player.passive_damage() * AURA_DAMAGE * level_factor(level, 0.2);
        let push = aura_knockback(level);

        let caught = world.enemy_targets().within(origin, radius);
        for target in &caught {
            if let Ok(mut transform) = world.entities.get::<&mut Transform>(target.entity) {
                combat::knockback(&mut transform.position, origin, push);
            }
        }
        let hits: Vec<Hit> = caught.iter().map(|t| Hit::new(t.entity, damage)).collect();
        combat::apply_hits(world, &hits, rng);
    }

    fn update_boomerang(&mut self, world: &mut WorldState, level: u32, dt: f32) {
        self.boomerang_timer.tick(dt);
        if !self.boomerang_timer.is_ready() {
            return;
        }
        self.boomerang_timer.reset(boomerang_cooldown(level));

        let origin = world.player.position;
        let range = boomerang_range(level);
        let damage = world.player.passive_damage() * BOOMERANG_DAMAGE * level_factor(level, 0.2);
        let facing = if world.player.facing_left { Vec2::NEG_X } else { Vec2::X };
        let aim = world
            .enemy_targets()
            .nearest(origin, range * 2.0)
            .and_then(|t| (t.position - origin).try_normalize())
            .unwrap_or(facing);

        for dir in spread_directions(aim, boomerang_count(level), BOOMERANG_FAN) {
            world.spawn_projectile(
                Transform::from_position(origin + dir * BOOMERANG_MUZZLE),
                Projectile::Boomerang(Boomerang::new(dir, damage, range)),
            );
        }
    }

    fn update_lightning(&mut self, world: &mut WorldState, level: u32, dt: f32, rng: &mut impl Rng) {
        self.lightning_timer.tick(dt);
        let mut targets = world.enemy_targets();
        if !self.lightning_timer.is_ready() || targets.is_empty() {
            return;
        }
        self.lightning_timer.reset(lightning_cooldown(level));

        let origin = world.player.position;
        let range = lightning_range(level);
        let damage = world.player.passive_damage() * LIGHTNING_DAMAGE * level_factor(level, 0.25);

        let mut hits = Vec::new();
        for _ in 0..lightning_strikes(level) {
            let in_range = targets.within(origin, range);
            if in_range.is_empty() {
                continue;
            }
            let target = in_range[rng.gen_range(0..in_range.len())];
            hits.push(targets.strike(target.entity, damage));
            world.spawn_projectile(
                Transform::from_position(target.position),
                Projectile::Lightning(LightningStrike {
                    path: lightning_path(origin, target.position, LIGHTNING_SEGMENTS, rng),
                    lifetime: Lifetime::new(LIGHTNING_LIFETIME),
                }),
            );
        }
        combat::apply_hits(world, &hits, rng);
    }

    fn update_axes(&mut self, world: &mut WorldState, level: u32, dt: f32) {
        self.axe_timer.tick(dt);
        if !self.axe_timer.is_ready() || world.enemy_targets().is_empty() {
            return;
        }
        self.axe_timer.reset(axe_cooldown(level));

        let origin = world.player.position;
        let damage = world.player.passive_damage() * AXE_DAMAGE * level_factor(level, 0.2);
        let penetration = axe_penetration(level);
        let count = axe_count(level);
        for i in 0..count {
            world.spawn_projectile(
                Transform::from_position(origin),
                Projectile::Axe(Axe::new(axe_velocity(i, count), damage, penetration)),
            );
        }
    }
}

/// Keep the right number of orbs around the player and refresh their stats.
fn update_orbit(world: &mut WorldState, level: u32, dt: f32) {
    let count = orbit_count(level) as usize;
    let radius = orbit_radius(level);
    let damage = world.player.passive_damage() * ORBIT_DAMAGE * level_factor(level, 0.2);

    let mut orbs: Vec<(Entity, usize)> = Vec::new();
    for (entity, projectile) in world.entities.query_mut::<&mut Projectile>() {
        if let Projectile::Orb(orb) = projectile {
            orbs.push((entity, orb.slot));
        }
    }
    orbs.sort_by_key(|(_, slot)| *slot);

    for (slot, (entity, _)) in orbs.iter().enumerate() {
        if let Ok(mut projectile) = world.entities.get::<&mut Projectile>(*entity) {
            if let Projectile::Orb(orb) = &mut *projectile {
                orb.slot = slot;
                orb.radius = radius;
                orb.damage = damage;
            }
        }
    }

    let origin = world.player.position;
    for slot in orbs.len()..count {
        let orb = Orb::new(slot, count, radius, damage);
        let position = origin + rotate_vec(Vec2::X, orb.angle) * radius;
        world.spawn_projectile(Transform::from_position(position), Projectile::Orb(orb));
    }

    projectile::spin_orbs(&mut world.entities, ORBIT_SPEED, dt);
}
