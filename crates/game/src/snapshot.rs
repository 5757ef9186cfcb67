//! Read-only view of the world for the render layer.

use engine_core::{Health, Transform, Vec2};
use hecs::World;

use crate::enemy::{Enemy, EnemyType};
use crate::pickup::{Pickup, PickupKind};
use crate::player::{Player, DAMAGE_FLASH_COLOR};
use crate::projectile::{Projectile, Trail};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Player,
    Enemy(EnemyType),
    Bolt,
    EnemyBolt,
    Orb,
    Boomerang,
    Axe,
    Lightning,
    Pickup(PickupKind),
}

/// One drawable thing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub kind: RenderKind,
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
    pub color: [f32; 4],
    /// Draw in the flash colour this frame.
    pub flash: bool,
    pub facing_left: bool,
    /// `None` for things without health.
    pub health_fraction: Option<f32>,
    /// Jagged lightning path, empty for everything else.
    pub path: Vec<Vec2>,
    pub trail: Vec<Vec2>,
}

impl RenderItem {
    fn new(kind: RenderKind, transform: &Transform, color: [f32; 4]) -> Self {
        Self {
            kind,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            color,
            flash: false,
            facing_left: false,
            health_fraction: None,
            path: Vec::new(),
            trail: Vec::new(),
        }
    }
}

fn projectile_look(projectile: &Projectile) -> (RenderKind, [f32; 4], bool) {
    match projectile {
        Projectile::Bolt(b) if b.homing => (RenderKind::Bolt, [0.7, 0.6, 1.0, 1.0], false),
        Projectile::Bolt(_) => (RenderKind::Bolt, [0.4, 1.0, 0.5, 1.0], false),
        Projectile::EnemyBolt(_) => (RenderKind::EnemyBolt, [0.6, 0.1, 0.9, 1.0], false),
        Projectile::Orb(o) => (RenderKind::Orb, [1.0, 0.95, 0.5, 1.0], o.hit_flash > 0.0),
        Projectile::Boomerang(_) => (RenderKind::Boomerang, [0.8, 0.8, 0.9, 1.0], false),
        Projectile::Axe(_) => (RenderKind::Axe, [0.6, 0.4, 0.2, 1.0], false),
        Projectile::Lightning(_) => (RenderKind::Lightning, [0.6, 0.8, 1.0, 1.0], false),
    }
}

/// Build the frame's render list: pickups first, then enemies, projectiles and the player on top.
pub fn capture(world: &World, player: &Player) -> Vec<RenderItem> {
    let mut items = Vec::new();

    for (_, (transform, pickup)) in world.query::<(&Transform, &Pickup)>().iter() {
        items.push(RenderItem::new(RenderKind::Pickup(pickup.kind), transform, pickup.kind.color()));
    }

    for (_, (transform, health, enemy)) in world.query::<(&Transform, &Health, &Enemy)>().iter() {
        let mut item = RenderItem::new(RenderKind::Enemy(enemy.kind), transform, enemy.kind.def().color);
        item.flash = enemy.flash.is_active();
        if item.flash {
            item.color = WHITE;
        }
        item.facing_left = enemy.facing_left;
        item.health_fraction = Some(health.percentage());
        items.push(item);
    }

    for (_, (transform, projectile, trail)) in world.query::<(&Transform, &Projectile, &Trail)>().iter() {
        let (kind, color, flash) = projectile_look(projectile);
        let mut item = RenderItem::new(kind, transform, color);
        item.flash = flash;
        item.trail = trail.points.iter().copied().collect();
        if let Projectile::Lightning(strike) = projectile {
            item.path = strike.path.clone();
        }
        items.push(item);
    }

    let player_transform = Transform::from_position(player.position);
    let mut item = RenderItem::new(RenderKind::Player, &player_transform, player.color());
    item.flash = player.damage_flash.is_active();
    if item.flash {
        item.color = DAMAGE_FLASH_COLOR;
    }
    item.facing_left = player.facing_left;
    item.health_fraction = Some(player.health.percentage());
    items.push(item);

    items
}
