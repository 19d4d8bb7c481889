//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which flows use to describe what
//! should be drawn. The engine sorts the described objects into batches per
//! pipeline (opaque first, then transparent) before issuing draw calls.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)
//!

use crate::data_structures::{group::InstanceGroup, model::Model};

/// Data for instanced object rendering: a model, instance buffer, and group ID.
///
/// The instance buffer contains per-instance transformation and shading data.
#[derive(Clone, Copy)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub id: u32,
}

/// Specifies how scene objects should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Transparent(Instanced)` renders a single transparent instanced object
/// - `Transparents(Vec<Instanced>)` renders a batch of transparent objects
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
///
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    Transparents(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Sorts this render tree into the opaque and transparent batches.
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, trans: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Transparents(mut vec) => trans.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, trans)),
            Render::None => (),
        }
    }
}

impl<'a> From<&'a InstanceGroup> for Render<'a> {
    fn from(group: &'a InstanceGroup) -> Self {
        if group.transparent {
            Render::Transparent(group.as_instanced())
        } else {
            Render::Default(group.as_instanced())
        }
    }
}

impl<'a> From<&'a [InstanceGroup]> for Render<'a> {
    fn from(groups: &'a [InstanceGroup]) -> Self {
        Render::Composed(groups.iter().map(Render::from).collect())
    }
}
