//! Viewer configuration.
//!
//! [`ViewerConfig`] collects the knobs that are fixed for the lifetime of the
//! viewer: window, frame pacing, projection, light and where assets live.
//! Camera tuning lives with the controller in [`crate::camera`].

use std::path::{Path, PathBuf};

use instant::Duration;

/// Startup configuration for the viewer.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    /// Fixed window size in physical pixels. The window is not resizable.
    pub window_size: (u32, u32),
    /// Delay between the end of one render tick and the start of the next.
    pub tick_interval: Duration,
    /// Root directory that manifest paths are resolved against.
    pub asset_root: PathBuf,
    pub clear_colour: wgpu::Color,
    pub fovy: cgmath::Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// World-space position of the single point light.
    pub light: cgmath::Point3<f32>,
    /// MSAA sample count for the colour and depth targets.
    pub sample_count: u32,
}

impl ViewerConfig {
    pub fn with_asset_root(mut self, root: impl AsRef<Path>) -> Self {
        self.asset_root = root.as_ref().to_path_buf();
        self
    }

    pub fn aspect(&self) -> f32 {
        self.window_size.0 as f32 / self.window_size.1 as f32
    }

    /// Centre of the window, used as the anchor for mouse look.
    pub fn screen_center(&self) -> (f64, f64) {
        (
            f64::from(self.window_size.0) / 2.0,
            f64::from(self.window_size.1) / 2.0,
        )
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "scene-walk".to_string(),
            window_size: (1920, 1080),
            tick_interval: Duration::from_millis(10),
            asset_root: PathBuf::from("./assets"),
            clear_colour: wgpu::Color::BLACK,
            fovy: cgmath::Deg(45.0),
            znear: 0.1,
            zfar: 400.0,
            light: cgmath::Point3::new(4.0, 4.0, 4.0),
            sample_count: 4,
        }
    }
}
