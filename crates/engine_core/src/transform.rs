//! Transform component and utilities for top-down 2D positioning.

use glam::Vec2;

/// A 2D transform: position, facing angle (radians) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and uniform scale.
    pub fn from_position_scale(position: Vec2, scale: f32) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Spin by a delta angle.
    pub fn rotate(&mut self, angle: f32) {
        self.rotation += angle;
    }
}

/// Rotate a 2D direction by `angle` radians.
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Absolute angle between two directions, wrapped into [0, π].
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let mut diff = (a.y.atan2(a.x) - b.y.atan2(b.x)).abs();
    if diff > std::f32::consts::PI {
        diff = std::f32::consts::TAU - diff;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rotate_vec_quarter_turn() {
        let v = rotate_vec(Vec2::X, PI / 2.0);
        assert!((v - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn angle_between_wraps_across_pi() {
        let a = Vec2::from_angle(PI - 0.1);
        let b = Vec2::from_angle(-PI + 0.1);
        assert!((angle_between(a, b) - 0.2).abs() < 1e-4);
    }

    #[test]
    fn translate_and_rotate_accumulate() {
        let mut t = Transform::from_position_scale(Vec2::new(1.0, 2.0), 0.5);
        t.translate(Vec2::new(-1.0, 1.0));
        t.rotate(0.25);
        t.rotate(0.25);
        assert_eq!(t.position, Vec2::new(0.0, 3.0));
        assert_eq!(t.rotation, 0.5);
        assert_eq!(t.scale, 0.5);
    }
}
