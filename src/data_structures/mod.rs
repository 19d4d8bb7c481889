//! Engine data structures: geometry, models, textures and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `geometry` builds the procedural meshes of every decoration kind
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `group` is an instanced batch (model + instance data + GPU buffer)
//! - `instance` holds per-instance transformation and shading data

pub mod geometry;
pub mod group;
pub mod instance;
pub mod model;
pub mod texture;
