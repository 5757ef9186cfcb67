//! Projectile variants and their motion models.
//!
//! Every projectile is an entity with a `Transform`, a [`Projectile`] and a
//! [`Trail`]. Each variant owns its own state machine; [`update_projectiles`]
//! steps them all, records hits against a target snapshot and applies the
//! damage after the query has finished.

use std::collections::{HashMap, HashSet, VecDeque};

use engine_core::{Entity, Lifetime, Transform, Vec2};
use rand::Rng;

use crate::combat::{self, Hit, PlayerHit, TargetSnapshot};
use crate::world::WorldState;

// ── Player bolts ────────────────────────────────────────────────────────
pub const BOLT_SPEED: f32 = 12.0;
const BOLT_HIT_RADIUS: f32 = 0.5;
const BOLT_SPIN: f32 = 12.0;
/// Homing bolts fly straight for this distance first.
const HOMING_MIN_TRAVEL: f32 = 2.0;
const HOMING_SEARCH_RADIUS: f32 = 6.0;
/// Direction blend toward the target per update.
const HOMING_LERP: f32 = 0.03;

// ── Enemy bolts ─────────────────────────────────────────────────────────
const ENEMY_BOLT_SPEED: f32 = 6.0;
const ENEMY_BOLT_RANGE: f32 = 12.0;
const ENEMY_BOLT_HIT_RADIUS: f32 = 0.5;
const ENEMY_BOLT_SPIN: f32 = 9.0;

// ── Passive projectiles ─────────────────────────────────────────────────
pub const ORB_HIT_RADIUS: f32 = 0.7;
/// Seconds before the same orb can hit the same enemy again.
pub const ORB_HIT_COOLDOWN: f32 = 0.25;
const ORB_HIT_FLASH: f32 = 0.15;
pub const BOOMERANG_SPEED: f32 = 10.8;
const BOOMERANG_RETURN_MULT: f32 = 1.2;
const BOOMERANG_HIT_RADIUS: f32 = 0.7;
const BOOMERANG_CATCH_RADIUS: f32 = 0.5;
const BOOMERANG_SPIN: f32 = 24.0;
pub const AXE_GRAVITY: f32 = 28.8;
const AXE_HIT_RADIUS: f32 = 0.8;
pub const AXE_LIFETIME: f32 = 4.0;
/// Axes that fall this far below the player are gone.
const AXE_FLOOR: f32 = 20.0;
const AXE_SPIN: f32 = 21.0;
pub const LIGHTNING_LIFETIME: f32 = 0.25;
pub const LIGHTNING_SEGMENTS: usize = 8;
const LIGHTNING_JITTER: f32 = 0.8;

/// Straight-flying player bolt, optionally homing.
#[derive(Debug, Clone, PartialEq)]
pub struct Bolt {
    pub direction: Vec2,
    pub damage: f32,
    pub range: f32,
    pub homing: bool,
    pub traveled: f32,
}

impl Bolt {
    pub fn new(direction: Vec2, damage: f32, range: f32, homing: bool) -> Self {
        Self { direction, damage, range, homing, traveled: 0.0 }
    }

    /// Blend toward the nearest target once past the minimum travel distance.
    fn steer(&mut self, position: Vec2, targets: &TargetSnapshot) {
        if !self.homing || self.traveled <= HOMING_MIN_TRAVEL {
            return;
        }
        if let Some(target) = targets.nearest(position, HOMING_SEARCH_RADIUS) {
            let to_target = (target.position - position).normalize_or_zero();
            self.direction = self
                .direction
                .lerp(to_target, HOMING_LERP)
                .try_normalize()
                .unwrap_or(self.direction);
        }
    }
}

/// Bolt fired by ranged enemies. Only collides with the player.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyBolt {
    pub direction: Vec2,
    pub damage: f32,
    pub traveled: f32,
}

impl EnemyBolt {
    pub fn new(direction: Vec2, damage: f32) -> Self {
        Self { direction, damage, traveled: 0.0 }
    }
}

/// One body of the holy orbit. Slot, radius and damage are refreshed by the passive engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub slot: usize,
    pub angle: f32,
    pub radius: f32,
    pub damage: f32,
    /// Per-enemy lockout, keyed by entity so a dying neighbour can't shift it.
    pub cooldowns: HashMap<Entity, f32>,
    pub hit_flash: f32,
}

impl Orb {
    pub fn new(slot: usize, total: usize, radius: f32, damage: f32) -> Self {
        Self {
            slot,
            angle: slot as f32 / total.max(1) as f32 * std::f32::consts::TAU,
            radius,
            damage,
            cooldowns: HashMap::new(),
            hit_flash: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoomerangPhase {
    Outbound,
    /// Homing back to the player.
    Returning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boomerang {
    pub direction: Vec2,
    pub damage: f32,
    pub range: f32,
    pub traveled: f32,
    pub phase: BoomerangPhase,
    /// Enemies hit during the current phase.
    pub hits: HashSet<Entity>,
}

impl Boomerang {
    pub fn new(direction: Vec2, damage: f32, range: f32) -> Self {
        Self {
            direction,
            damage,
            range,
            traveled: 0.0,
            phase: BoomerangPhase::Outbound,
            hits: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxePhase {
    Ascending,
    Descending,
}

/// Ballistic axe that cuts through several enemies.
#[derive(Debug, Clone, PartialEq)]
pub struct Axe {
    pub velocity: Vec2,
    pub damage: f32,
    pub penetration: u32,
    pub phase: AxePhase,
    pub hits: HashSet<Entity>,
    pub lifetime: f32,
}

impl Axe {
    pub fn new(velocity: Vec2, damage: f32, penetration: u32) -> Self {
        Self {
            velocity,
            damage,
            penetration,
            phase: AxePhase::Ascending,
            hits: HashSet::new(),
            lifetime: AXE_LIFETIME,
        }
    }
}

/// Short-lived visual left by a lightning strike. Damage is dealt when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct LightningStrike {
    pub path: Vec<Vec2>,
    pub lifetime: Lifetime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projectile {
    Bolt(Bolt),
    EnemyBolt(EnemyBolt),
    Orb(Orb),
    Boomerang(Boomerang),
    Axe(Axe),
    Lightning(LightningStrike),
}

impl Projectile {
    /// Positions kept for the render trail.
    pub fn trail_length(&self) -> usize {
        match self {
            Projectile::Bolt(_) => 5,
            Projectile::EnemyBolt(_) => 4,
            Projectile::Orb(_) | Projectile::Axe(_) => 8,
            Projectile::Boomerang(_) => 6,
            Projectile::Lightning(_) => 0,
        }
    }

    pub fn size(&self) -> f32 {
        match self {
            Projectile::Bolt(_) => 0.3,
            Projectile::EnemyBolt(_) => 0.25,
            Projectile::Orb(_) | Projectile::Boomerang(_) => 0.5,
            Projectile::Axe(_) => 0.6,
            Projectile::Lightning(_) => 1.0,
        }
    }
}

/// Recent positions, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    pub points: VecDeque<Vec2>,
    pub capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self { points: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, point: Vec2) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_front(point);
        self.points.truncate(self.capacity);
    }
}

/// Jagged path from `start` to `end`: `segments` points after `start`, each pushed
/// sideways by `sin(tπ)·0.8·U(-0.5, 0.5)`. Both ends stay on the line.
pub fn lightning_path(start: Vec2, end: Vec2, segments: usize, rng: &mut impl Rng) -> Vec<Vec2> {
    let dir = end - start;
    let perpendicular = dir.perp().normalize_or_zero();
    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..=segments {
        let t = i as f32 / segments as f32;
        let amplitude = (t * std::f32::consts::PI).sin() * LIGHTNING_JITTER;
        let offset = rng.gen_range(-0.5..0.5) * amplitude;
        points.push(start + dir * t + perpendicular * offset);
    }
    points
}

/// What happened to a projectile this step.
#[derive(Default)]
struct StepOutcome {
    expired: bool,
    hits: Vec<Hit>,
    player_damage: Option<f32>,
}

fn step(
    transform: &mut Transform,
    projectile: &mut Projectile,
    targets: &mut TargetSnapshot,
    player_pos: Vec2,
    dt: f32,
) -> StepOutcome {
    let mut out = StepOutcome::default();
    match projectile {
        Projectile::Bolt(bolt) => {
            bolt.steer(transform.position, targets);
            let distance = BOLT_SPEED * dt;
            transform.translate(bolt.direction * distance);
            transform.rotate(BOLT_SPIN * dt);
            bolt.traveled += distance;

            let hit = targets
                .iter()
                .find(|t| t.position.distance(transform.position) < BOLT_HIT_RADIUS)
                .map(|t| t.entity);
            if let Some(entity) = hit {
                out.hits.push(targets.strike(entity, bolt.damage));
                out.expired = true;
            } else if bolt.traveled > bolt.range {
                out.expired = true;
            }
        }
        Projectile::EnemyBolt(bolt) => {
            let distance = ENEMY_BOLT_SPEED * dt;
            transform.translate(bolt.direction * distance);
            transform.rotate(ENEMY_BOLT_SPIN * dt);
            bolt.traveled += distance;

            if transform.position.distance(player_pos) < ENEMY_BOLT_HIT_RADIUS {
                out.player_damage = Some(bolt.damage);
                out.expired = true;
            } else if bolt.traveled > ENEMY_BOLT_RANGE {
                out.expired = true;
            }
        }
        Projectile::Orb(orb) => {
            transform.position = player_pos + Vec2::from_angle(orb.angle) * orb.radius;
            orb.hit_flash = (orb.hit_flash - dt).max(0.0);
            orb.cooldowns.retain(|_, remaining| {
                *remaining -= dt;
                *remaining > 0.0
            });

            let touching: Vec<Entity> = targets
                .iter()
                .filter(|t| t.position.distance(transform.position) < ORB_HIT_RADIUS)
                .map(|t| t.entity)
                .collect();
            for entity in touching {
                if orb.cooldowns.contains_key(&entity) {
                    continue;
                }
                out.hits.push(targets.strike(entity, orb.damage));
                orb.cooldowns.insert(entity, ORB_HIT_COOLDOWN);
                orb.hit_flash = ORB_HIT_FLASH;
            }
        }
        Projectile::Boomerang(b) => {
            transform.rotate(BOOMERANG_SPIN * dt);
            match b.phase {
                BoomerangPhase::Outbound => {
                    let distance = BOOMERANG_SPEED * dt;
                    transform.translate(b.direction * distance);
                    b.traveled += distance;
                    if b.traveled >= b.range {
                        b.phase = BoomerangPhase::Returning;
                        b.hits.clear();
                    }
                }
                BoomerangPhase::Returning => {
                    let to_player = player_pos - transform.position;
                    if to_player.length() < BOOMERANG_CATCH_RADIUS {
                        out.expired = true;
                        return out;
                    }
                    b.direction = to_player.normalize();
                    transform.translate(b.direction * BOOMERANG_SPEED * BOOMERANG_RETURN_MULT * dt);
                }
            }

            let touching: Vec<Entity> = targets
                .iter()
                .filter(|t| !b.hits.contains(&t.entity))
                .filter(|t| t.position.distance(transform.position) < BOOMERANG_HIT_RADIUS)
                .map(|t| t.entity)
                .collect();
            for entity in touching {
                out.hits.push(targets.strike(entity, b.damage));
                b.hits.insert(entity);
            }
        }
        Projectile::Axe(axe) => {
            axe.velocity.y -= AXE_GRAVITY * dt;
            if axe.phase == AxePhase::Ascending && axe.velocity.y <= 0.0 {
                axe.phase = AxePhase::Descending;
            }
            transform.translate(axe.velocity * dt);
            transform.rotate((AXE_SPIN + axe.velocity.y.abs() * 0.5) * dt);

            axe.lifetime -= dt;
            if axe.lifetime <= 0.0 {
                out.expired = true;
                return out;
            }

            let touching: Vec<Entity> = targets
                .iter()
                .filter(|t| !axe.hits.contains(&t.entity))
                .filter(|t| t.position.distance(transform.position) < AXE_HIT_RADIUS)
                .map(|t| t.entity)
                .collect();
            for entity in touching {
                out.hits.push(targets.strike(entity, axe.damage));
                axe.hits.insert(entity);
                if axe.hits.len() as u32 >= axe.penetration {
                    out.expired = true;
                    return out;
                }
            }

            if transform.position.y < player_pos.y - AXE_FLOOR {
                out.expired = true;
            }
        }
        Projectile::Lightning(strike) => {
            out.expired = strike.lifetime.update(dt);
        }
    }
    out
}

/// Step every projectile, then apply recorded hits and despawn the spent ones.
/// Returns the most severe outcome of enemy bolts striking the player.
pub fn update_projectiles(world: &mut WorldState, dt: f32, rng: &mut impl Rng) -> PlayerHit {
    let mut targets = world.enemy_targets();
    let player_pos = world.player.position;

    let mut hits = Vec::new();
    let mut player_damage = Vec::new();
    let mut expired = Vec::new();

    for (entity, (transform, projectile, trail)) in
        world.entities.query_mut::<(&mut Transform, &mut Projectile, &mut Trail)>()
    {
        trail.push(transform.position);
        let out = step(transform, projectile, &mut targets, player_pos, dt);
        hits.extend(out.hits);
        player_damage.extend(out.player_damage);
        if out.expired {
            expired.push(entity);
        }
    }

    for entity in expired {
        world.entities.despawn(entity).ok();
    }

    combat::apply_hits(world, &hits, rng);

    player_damage
        .into_iter()
        .map(|amount| combat::damage_player(&mut world.player, amount))
        .max()
        .unwrap_or(PlayerHit::Ignored)
}

/// Advance orbit angles. Kept apart from the hit pass so orbs move even with no enemies around.
pub fn spin_orbs(world: &mut hecs::World, angular_speed: f32, dt: f32) {
    for (_, projectile) in world.query_mut::<&mut Projectile>() {
        if let Projectile::Orb(orb) = projectile {
            orb.angle += angular_speed * dt;
        }
    }
}
