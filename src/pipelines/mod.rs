//! Render pipelines and their uniforms.
//!
//! - `light` holds the scene uniform (projection, view, light) and the uniform
//!   bind group helpers shared with the per-object uniform
//! - `phong` builds the single pipeline every scene object is drawn with

pub mod light;
pub mod phong;
