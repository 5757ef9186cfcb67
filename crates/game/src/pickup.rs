//! Pickups dropped by dead enemies and the proximity magnet.

use engine_core::{Entity, Transform, Vec2};
use hecs::{CommandBuffer, World};

/// Pickups inside the player's pickup range drift at this speed.
const DRIFT_SPEED: f32 = 12.0;
/// Pickups this close are collected.
pub const COLLECT_RADIUS: f32 = 0.5;
/// HP restored by a health pickup.
pub const HEALTH_AMOUNT: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupKind {
    XpOrb,
    Gold,
    Health,
    /// Free upgrade choice.
    Chest,
    /// Pulls every other pickup to the player.
    VacuumCrystal,
}

impl PickupKind {
    pub fn size(&self) -> f32 {
        match self {
            PickupKind::XpOrb => 0.3,
            PickupKind::Gold => 0.35,
            PickupKind::Health => 0.4,
            PickupKind::Chest => 0.6,
            PickupKind::VacuumCrystal => 0.5,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            PickupKind::XpOrb => [0.2, 1.0, 0.2, 1.0],
            PickupKind::Gold => [1.0, 0.85, 0.0, 1.0],
            PickupKind::Health => [1.0, 0.2, 0.3, 1.0],
            PickupKind::Chest => [1.0, 0.75, 0.2, 1.0],
            PickupKind::VacuumCrystal => [0.4, 0.8, 1.0, 1.0],
        }
    }
}

/// Pickup component. `value` is XP for orbs and gold for coins; unused otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub kind: PickupKind,
    pub value: u32,
}

impl Pickup {
    pub fn new(kind: PickupKind, value: u32) -> Self {
        Self { kind, value }
    }

    pub fn spawn(self, world: &mut World, position: Vec2) -> Entity {
        world.spawn((Transform::from_position_scale(position, self.kind.size()), self))
    }

    pub fn queue(self, commands: &mut CommandBuffer, position: Vec2) {
        commands.spawn((Transform::from_position_scale(position, self.kind.size()), self));
    }
}

/// Pull nearby pickups toward the player. Returns the ones close enough to collect.
pub fn update_pickups(world: &mut World, player_pos: Vec2, pickup_range: f32, dt: f32) -> Vec<Entity> {
    let mut collected = Vec::new();
    for (entity, (transform, _)) in world.query_mut::<(&mut Transform, &Pickup)>() {
        let to_player = player_pos - transform.position;
        let dist = to_player.length();
        if dist < pickup_range {
            transform.translate(to_player.normalize_or_zero() * DRIFT_SPEED * dt);
        }
        if dist < COLLECT_RADIUS {
            collected.push(entity);
        }
    }
    collected
}

/// Every live pickup and where it is.
pub fn live_pickups(world: &World) -> Vec<(Entity, Vec2)> {
    world
        .query::<(&Transform, &Pickup)>()
        .iter()
        .map(|(e, (t, _))| (e, t.position))
        .collect()
}
