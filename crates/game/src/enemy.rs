//! Enemy types, time/wave scaling and per-frame behaviour.

use engine_core::{Cooldown, Health, Transform, Vec2};
use hecs::{CommandBuffer, Entity, World};

use crate::combat::{self, PlayerHit};
use crate::player::Player;
use crate::projectile::{EnemyBolt, Projectile};

/// Enemies closer than this hurt the player on contact.
pub const CONTACT_RADIUS: f32 = 0.8;
/// Seconds between contact hits from the same enemy.
const CONTACT_COOLDOWN: f32 = 1.0;
/// Enemies stop advancing inside this distance.
const STOP_DISTANCE: f32 = 0.5;
/// Ranged enemies hold position between these distances.
const RANGED_MIN: f32 = 4.0;
const RANGED_MAX: f32 = 8.0;
const RANGED_COOLDOWN: f32 = 2.0;
/// White flash after being hit.
pub const HIT_FLASH: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyType {
    Imp,
    Skeleton,
    Zombie,
    DemonKnight,
    Lich,
    /// Arrives once at 15 minutes. Effectively unkillable.
    Reaper,
}

/// Base stats before scaling.
#[derive(Debug, Clone, Copy)]
pub struct EnemyDef {
    pub name: &'static str,
    pub hp: f32,
    pub damage: f32,
    /// Units per second.
    pub speed: f32,
    pub xp: f32,
    pub size: f32,
    pub color: [f32; 4],
    pub min_wave: u32,
    pub ranged: bool,
    pub is_boss: bool,
}

impl EnemyType {
    /// Regular spawn pool, weakest first.
    pub const ROSTER: [EnemyType; 5] = [
        EnemyType::Imp,
        EnemyType::Skeleton,
        EnemyType::Zombie,
        EnemyType::DemonKnight,
        EnemyType::Lich,
    ];

    pub fn def(&self) -> EnemyDef {
        match self {
            EnemyType::Imp => EnemyDef {
                name: "Imp",
                hp: 10.0,
                damage: 5.0,
                speed: 3.6,
                xp: 1.0,
                size: 0.8,
                color: [1.0, 0.3, 0.3, 1.0],
                min_wave: 1,
                ranged: false,
                is_boss: false,
            },
            EnemyType::Skeleton => EnemyDef {
                name: "Skeleton",
                hp: 20.0,
                damage: 8.0,
                speed: 2.4,
                xp: 2.0,
                size: 1.0,
                color: [0.9, 0.9, 0.8, 1.0],
                min_wave: 1,
                ranged: false,
                is_boss: false,
            },
            EnemyType::Zombie => EnemyDef {
                name: "Zombie",
                hp: 40.0,
                damage: 12.0,
                speed: 1.5,
                xp: 3.0,
                size: 1.1,
                color: [0.3, 0.5, 0.3, 1.0],
                min_wave: 3,
                ranged: false,
                is_boss: false,
            },
            EnemyType::DemonKnight => EnemyDef {
                name: "Demon Knight",
                hp: 80.0,
                damage: 20.0,
                speed: 2.1,
                xp: 10.0,
                size: 1.4,
                color: [0.4, 0.1, 0.1, 1.0],
                min_wave: 5,
                ranged: false,
                is_boss: false,
            },
            EnemyType::Lich => EnemyDef {
                name: "Lich",
                hp: 50.0,
                damage: 15.0,
                speed: 1.8,
                xp: 8.0,
                size: 1.2,
                color: [0.3, 0.1, 0.5, 1.0],
                min_wave: 7,
                ranged: true,
                is_boss: false,
            },
            EnemyType::Reaper => EnemyDef {
                name: "REAPER",
                hp: 99999.0,
                damage: 99999.0,
                speed: 9.0,
                xp: 0.0,
                size: 2.5,
                color: [0.1, 0.1, 0.1, 1.0],
                min_wave: 999,
                ranged: false,
                is_boss: true,
            },
        }
    }

    /// Non-boss types unlocked by `wave`, weakest first.
    pub fn eligible(wave: u32) -> Vec<EnemyType> {
        Self::ROSTER.iter().copied().filter(|t| t.def().min_wave <= wave).collect()
    }
}

/// Health growth from elapsed minutes.
pub fn time_scale(minutes: f32) -> f32 {
    1.0 + minutes * 0.15 + (minutes / 10.0).powi(2)
}

/// Health growth from the wave number.
pub fn wave_scale(wave: u32) -> f32 {
    1.0 + wave.saturating_sub(1) as f32 * 0.1
}

/// Stats fixed at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledStats {
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub xp_value: u32,
}

/// Scale base stats for an enemy spawned at `elapsed` seconds in `wave`. Bosses are exempt.
pub fn scaled_stats(kind: EnemyType, elapsed: f32, wave: u32) -> ScaledStats {
    let def = kind.def();
    let minutes = elapsed / 60.0;
    let xp_value = (def.xp * (1.0 + minutes * 0.05)).ceil() as u32;
    if def.is_boss {
        return ScaledStats { hp: def.hp, damage: def.damage, speed: def.speed, xp_value };
    }
    let waves = wave.saturating_sub(1) as f32;
    ScaledStats {
        hp: def.hp * time_scale(minutes) * wave_scale(wave),
        damage: def.damage * (1.0 + minutes * 0.08 + waves * 0.05),
        speed: def.speed * (1.0 + minutes * 0.01),
        xp_value,
    }
}

/// Enemy component. Health lives in its own component.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyType,
    pub damage: f32,
    pub speed: f32,
    pub xp_value: u32,
    pub is_boss: bool,
    pub contact_cooldown: Cooldown,
    pub ranged_cooldown: Cooldown,
    pub flash: Cooldown,
    pub facing_left: bool,
}

/// Bundle for spawning an enemy.
pub struct EnemyBundle {
    pub transform: Transform,
    pub health: Health,
    pub enemy: Enemy,
}

impl EnemyBundle {
    pub fn new(kind: EnemyType, position: Vec2, elapsed: f32, wave: u32) -> Self {
        let def = kind.def();
        let stats = scaled_stats(kind, elapsed, wave);
        Self {
            transform: Transform::from_position_scale(position, def.size),
            health: Health::new(stats.hp),
            enemy: Enemy {
                kind,
                damage: stats.damage,
                speed: stats.speed,
                xp_value: stats.xp_value,
                is_boss: def.is_boss,
                contact_cooldown: Cooldown::default(),
                ranged_cooldown: Cooldown::default(),
                flash: Cooldown::default(),
                facing_left: false,
            },
        }
    }

    pub fn spawn(self, world: &mut World) -> Entity {
        world.spawn((self.transform, self.health, self.enemy))
    }

    /// Deferred spawn; the enemy appears when the buffer is flushed.
    pub fn queue(self, commands: &mut CommandBuffer) {
        commands.spawn((self.transform, self.health, self.enemy));
    }
}

/// Move every enemy, fire ranged bolts and apply contact damage to the player.
/// New enemy bolts are returned for the caller to queue.
pub fn update_enemies(world: &mut World, player: &mut Player, dt: f32) -> (PlayerHit, Vec<(Transform, Projectile)>) {
    let mut bolts = Vec::new();
    let mut worst = PlayerHit::Ignored;

    for (_, (transform, health, enemy)) in world.query_mut::<(&mut Transform, &Health, &mut Enemy)>() {
        if health.is_dead() {
            continue;
        }
        enemy.flash.tick_clamped(dt);

        let to_player = player.position - transform.position;
        let dist = to_player.length();
        let ranged = enemy.kind.def().ranged;

        if ranged && dist < RANGED_MAX && dist > RANGED_MIN {
            enemy.ranged_cooldown.tick(dt);
            if enemy.ranged_cooldown.is_ready() {
                enemy.ranged_cooldown.reset(RANGED_COOLDOWN);
                bolts.push((
                    Transform::from_position(transform.position),
                    Projectile::EnemyBolt(EnemyBolt::new(to_player / dist, enemy.damage)),
                ));
            }
        } else if dist > STOP_DISTANCE {
            transform.translate(to_player / dist * enemy.speed * dt);
        }

        enemy.contact_cooldown.tick(dt);
        if dist < CONTACT_RADIUS && enemy.contact_cooldown.is_ready() {
            worst = worst.max(combat::damage_player(player, enemy.damage));
            enemy.contact_cooldown.reset(CONTACT_COOLDOWN);
        }

        enemy.facing_left = player.position.x < transform.position.x;
    }

    (worst, bolts)
}
