//! Core engine types and utilities for the survivors simulation.
//!
//! This crate provides the foundational types used across all game systems:
//! - 2D transform and spatial components
//! - Frame time management
//! - Common component types for ECS

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::Vec2;
pub use hecs::{CommandBuffer, Entity, World};
