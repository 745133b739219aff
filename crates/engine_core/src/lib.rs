//! Core engine types and utilities for OpenCare.
//!
//! This crate provides the foundational types used across all simulation systems:
//! - Transform and spatial math
//! - Time management (fixed timestep, deterministic stepping)
//! - Scene graph: the transform hierarchy visual nodes and UI anchors live in

pub mod scene_graph;
pub mod time;
pub mod transform;

pub use scene_graph::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
