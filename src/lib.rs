//! holiday-ngin
//!
//! An instanced holiday scene: hundreds of decorations morph between a
//! conical tree and a scattered cloud, on top of a small wgpu/winit engine
//! that runs on native and WASM targets.
//!
//! High-level modules
//! - `animation`: GPU-free arrangement machine, layouts, blending, overlays and snow
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `config`: scene configuration from defaults and environment variables
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (geometry, meshes, instances, textures)
//! - `flow`: high level flow control (scenes / update loops)
//! - `pipelines`: the opaque, transparent and bloom pipelines
//! - `record`: timed frame capture and GIF/PNG export
//! - `resources`: models and procedural textures for the GPU
//! - `render`: render composition for efficient pipeline reuse
//! - `scene`: the holiday scene itself
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod record;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

/// Browser entry point; the page provides a `<canvas id="canvas">`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    flow::run::<()>(vec![scene::holiday_flow(config::SceneConfig::default())])
        .map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
