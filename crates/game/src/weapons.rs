//! Active weapon slot: melee arcs and projectile volleys.

use engine_core::{angle_between, rotate_vec, Transform, Vec2};
use rand::Rng;

use crate::combat::{self, Hit};
use crate::projectile::{Bolt, Projectile};
use crate::world::WorldState;

/// Spread between bolts when a weapon doesn't specify one.
pub const DEFAULT_SPREAD: f32 = 0.2;
/// Bolts spawn this far in front of the player.
const MUZZLE_OFFSET: f32 = 0.5;
/// Aim snaps to +X when the pointer is closer than this to the player.
const MIN_AIM_DISTANCE: f32 = 0.1;

/// Active weapons available to classes and forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveWeaponId {
    SwordSwing,
    NaturesWrath,
    SpiritBolt,
    ClawSwipe,
    Bite,
    Moonfire,
}

/// How the weapon resolves when its cooldown expires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponKind {
    /// Hits every enemy inside a cone.
    Melee { arc: f32 },
    /// Fires a fan of bolts.
    Projectile {
        count: u32,
        spread: Option<f32>,
        homing: bool,
    },
}

/// Static weapon definition.
#[derive(Debug, Clone, Copy)]
pub struct WeaponDef {
    pub name: &'static str,
    /// Multiplier on player damage.
    pub damage: f32,
    pub cooldown: f32,
    pub range: f32,
    pub kind: WeaponKind,
}

impl ActiveWeaponId {
    pub fn def(&self) -> WeaponDef {
        use std::f32::consts::PI;
        match self {
            ActiveWeaponId::SwordSwing => WeaponDef {
                name: "Sword Swing",
                damage: 1.0,
                cooldown: 0.8,
                range: 2.0,
                kind: WeaponKind::Melee { arc: PI * 0.6 },
            },
            ActiveWeaponId::NaturesWrath => WeaponDef {
                name: "Nature's Wrath",
                damage: 0.8,
                cooldown: 1.0,
                range: 6.0,
                kind: WeaponKind::Projectile { count: 3, spread: Some(0.3), homing: false },
            },
            ActiveWeaponId::SpiritBolt => WeaponDef {
                name: "Spirit Bolt",
                damage: 1.2,
                cooldown: 0.6,
                range: 8.0,
                kind: WeaponKind::Projectile { count: 1, spread: None, homing: false },
            },
            ActiveWeaponId::ClawSwipe => WeaponDef {
                name: "Claw Swipe",
                damage: 1.3,
                cooldown: 0.5,
                range: 1.8,
                kind: WeaponKind::Melee { arc: PI * 0.8 },
            },
            ActiveWeaponId::Bite => WeaponDef {
                name: "Bite",
                damage: 0.9,
                cooldown: 0.25,
                range: 1.2,
                kind: WeaponKind::Melee { arc: PI * 0.4 },
            },
            ActiveWeaponId::Moonfire => WeaponDef {
                name: "Moonfire",
                damage: 1.5,
                cooldown: 0.9,
                range: 10.0,
                kind: WeaponKind::Projectile { count: 2, spread: None, homing: true },
            },
        }
    }
}

/// Damage growth per weapon level.
pub fn level_damage_factor(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * 0.2
}

/// Melee reach grows 15% per level.
pub fn melee_reach(range: f32, level: u32) -> f32 {
    range * (1.0 + level.saturating_sub(1) as f32 * 0.15)
}

/// One extra bolt every two levels.
pub fn projectile_count(base: u32, level: u32) -> u32 {
    base + level.saturating_sub(1) / 2
}

/// Directions of a fan of `count` shots centred on `center`, `spread` radians apart.
pub fn spread_directions(center: Vec2, count: u32, spread: f32) -> Vec<Vec2> {
    if count <= 1 {
        return vec![center];
    }
    let mid = (count as f32 - 1.0) / 2.0;
    (0..count)
        .map(|i| rotate_vec(center, (i as f32 - mid) * spread))
        .collect()
}

/// True when `to_target` lies within reach and within half the arc either side of `aim`.
pub fn in_melee_arc(to_target: Vec2, aim: Vec2, reach: f32, arc: f32) -> bool {
    to_target.length() <= reach && angle_between(to_target, aim) <= arc / 2.0
}

/// Normalised aim from `origin` toward the pointer.
pub fn aim_direction(origin: Vec2, aim_target: Vec2) -> Vec2 {
    let to = aim_target - origin;
    if to.length() > MIN_AIM_DISTANCE {
        to.normalize()
    } else {
        Vec2::X
    }
}

/// Ticks the active weapon's cooldown and fires it when ready.
pub fn update_active_weapon(world: &mut WorldState, aim_target: Vec2, dt: f32, rng: &mut impl Rng) {
    world.player.weapon_timer.tick(dt);
    if !world.player.weapon_timer.is_ready() {
        return;
    }

    let weapon = world.player.current_weapon();
    let def = weapon.def();
    let level = world.player.weapon_level(weapon);
    let damage = world.player.damage() * def.damage * level_damage_factor(level);
    let origin = world.player.position;
    let aim = aim_direction(origin, aim_target);

    match def.kind {
        WeaponKind::Melee { arc } => {
            let reach = melee_reach(def.range, level);
            let crit_chance = world.player.melee_crit_chance();
            let hits: Vec<Hit> = world
                .enemy_targets()
                .iter()
                .filter(|t| in_melee_arc(t.position - origin, aim, reach, arc))
                .map(|t| {
                    let is_crit = combat::roll_crit(rng, crit_chance);
                    Hit {
                        target: t.entity,
                        amount: if is_crit { damage * 2.0 } else { damage },
                        is_crit,
                    }
                })
                .collect();
            log::trace!("{} swung, {} enemies in arc", def.name, hits.len());
            combat::apply_hits(world, &hits, rng);
        }
        WeaponKind::Projectile { count, spread, homing } => {
            let count = projectile_count(count, level);
            let spread = spread.unwrap_or(DEFAULT_SPREAD);
            for dir in spread_directions(aim, count, spread) {
                world.spawn_projectile(
                    Transform::from_position(origin + dir * MUZZLE_OFFSET),
                    Projectile::Bolt(Bolt::new(dir, damage, def.range, homing)),
                );
            }
        }
    }

    world.player.weapon_timer.reset(def.cooldown / world.player.attack_speed_mult);
}
