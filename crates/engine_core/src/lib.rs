//! Core engine types and utilities for Skyward.
//!
//! This crate provides the foundational types used across all flight systems:
//! - Transform and smoothing helpers
//! - Time management and fixed-step bookkeeping
//! - The scene graph of visual nodes

pub mod components;
pub mod scene;
pub mod time;
pub mod transform;

pub use components::*;
pub use scene::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
