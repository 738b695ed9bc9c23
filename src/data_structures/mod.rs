//! Scene data: meshes on the GPU, textures and scene objects.
//!
//! - `model` contains the vertex layout shared by all meshes
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `scene` holds scene objects, their materials and the registry that draws them

pub mod model;
pub mod scene;
pub mod texture;
