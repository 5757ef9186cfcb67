//! Vacuum crystal effect: every pickup on the field spirals into the player.

use engine_core::{Entity, Transform, Vec2};
use hecs::World;
use rand::Rng;

/// Largest random start delay per item.
const MAX_DELAY: f32 = 0.3;
/// Progress per second once an item starts moving.
const PULL_RATE: f32 = 3.0;
const SPIRAL_TURNS: f32 = 2.0;
const SPIRAL_AMPLITUDE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VacuumItem {
    pub entity: Entity,
    pub start: Vec2,
    pub delay: f32,
    pub progress: f32,
}

/// Cubic ease-out.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Decaying spiral offset added to the eased path.
pub fn spiral_offset(progress: f32) -> Vec2 {
    let phase = progress * std::f32::consts::PI * 2.0 * SPIRAL_TURNS;
    Vec2::new(phase.sin(), phase.cos()) * (1.0 - progress) * SPIRAL_AMPLITUDE
}

/// Pickups currently being pulled in.
#[derive(Debug, Default)]
pub struct Vacuum {
    items: Vec<VacuumItem>,
}

impl Vacuum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Start pulling `pickups`. Items already in flight are not added twice.
    pub fn start(&mut self, pickups: impl IntoIterator<Item = (Entity, Vec2)>, rng: &mut impl Rng) {
        for (entity, start) in pickups {
            if self.items.iter().any(|i| i.entity == entity) {
                continue;
            }
            self.items.push(VacuumItem {
                entity,
                start,
                delay: rng.gen_range(0.0..MAX_DELAY),
                progress: 0.0,
            });
        }
        log::debug!("vacuum pulling {} pickups", self.items.len());
    }

    /// Move items along their path toward `target`. Returns the entities that arrived;
    /// the caller collects them if they still exist.
    pub fn update(&mut self, world: &mut World, target: Vec2, dt: f32) -> Vec<Entity> {
        let mut arrived = Vec::new();
        self.items.retain_mut(|item| {
            if item.delay > 0.0 {
                item.delay -= dt;
                return true;
            }
            item.progress += dt * PULL_RATE;
            if item.progress >= 1.0 {
                arrived.push(item.entity);
                return false;
            }
            let Ok(mut transform) = world.get::<&mut Transform>(item.entity) else {
                // Picked up by the magnet in the meantime.
                return false;
            };
            let eased = item.start.lerp(target, ease_out_cubic(item.progress));
            transform.position = eased + spiral_offset(item.progress);
            true
        });
        arrived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pickup::{Pickup, PickupKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ease_and_spiral_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
        assert!(spiral_offset(1.0).length() < 1e-6);
        assert!((spiral_offset(0.0) - Vec2::new(0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn every_item_arrives_exactly_once() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(4);
        let a = Pickup::new(PickupKind::XpOrb, 1).spawn(&mut world, Vec2::new(10.0, 0.0));
        let b = Pickup::new(PickupKind::Gold, 2).spawn(&mut world, Vec2::new(-5.0, 5.0));

        let mut vacuum = Vacuum::new();
        vacuum.start([(a, Vec2::new(10.0, 0.0)), (b, Vec2::new(-5.0, 5.0))], &mut rng);
        vacuum.start([(a, Vec2::new(10.0, 0.0))], &mut rng);
        assert_eq!(vacuum.len(), 2);

        let mut arrived = Vec::new();
        for _ in 0..60 {
            arrived.extend(vacuum.update(&mut world, Vec2::ZERO, 1.0 / 60.0));
        }
        assert_eq!(arrived.len(), 2);
        assert!(arrived.contains(&a) && arrived.contains(&b));
        assert!(!vacuum.is_active());
    }

    #[test]
    fn item_moves_toward_player() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(0);
        let a = Pickup::new(PickupKind::XpOrb, 1).spawn(&mut world, Vec2::new(10.0, 0.0));
        let mut vacuum = Vacuum::new();
        vacuum.start([(a, Vec2::new(10.0, 0.0))], &mut rng);
        for _ in 0..30 {
            vacuum.update(&mut world, Vec2::ZERO, 1.0 / 60.0);
        }
        assert!(world.get::<&Transform>(a).unwrap().position.x < 10.0);
    }

    #[test]
    fn removed_pickup_is_dropped() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(0);
        let a = Pickup::new(PickupKind::XpOrb, 1).spawn(&mut world, Vec2::new(10.0, 0.0));
        let mut vacuum = Vacuum::new();
        vacuum.start([(a, Vec2::new(10.0, 0.0))], &mut rng);
        world.despawn(a).unwrap();
        for _ in 0..60 {
            assert!(vacuum.update(&mut world, Vec2::ZERO, 1.0 / 60.0).is_empty());
        }
        assert!(!vacuum.is_active());
    }
}
