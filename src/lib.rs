//! scene-walk
//!
//! A first-person walkthrough viewer for a small static scene of textured OBJ
//! models. The scene is loaded once at startup; afterwards the only things that
//! change are the camera, driven by keyboard and mouse, and the transforms of
//! animated objects, advanced on every render tick.
//!
//! High-level modules
//! - `animation`: per-object transform animation (static, rotating, orbiting)
//! - `camera`: camera state, the input controller and the projection
//! - `config`: startup configuration for window, pacing and projection
//! - `context`: GPU and window context that owns device/queue/pipeline
//! - `data_structures`: vertex layout, textures, scene objects and the registry
//! - `flow`: the winit event loop host
//! - `manifest`: the walkthrough scene described as data
//! - `pipelines`: the phong pipeline and its uniforms
//! - `render`: frame pacing and the draw pass
//! - `resources`: helpers to load meshes and textures from the asset directory
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod manifest;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use config::ViewerConfig;
pub use flow::run;
pub use manifest::default_manifest;
