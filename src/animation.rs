//! Per-frame transform animation.
//!
//! Every scene object carries an [`Animation`] that decides how its model
//! matrix changes on each render tick. Kinds with state carry it in their
//! variant, so two orbiting objects never share an accumulator.

use std::f32::consts::{PI, TAU};

use cgmath::{Matrix4, Rad, Vector3, Zero};
use instant::Duration;

/// Rotation applied to a [`Animation::Rotating`] object every tick, in radians.
///
/// The step is per tick, not per second, so the spin speed follows the frame rate.
pub const ROTATION_STEP: f32 = 0.01;

#[derive(Clone, Debug, PartialEq)]
pub enum Animation {
    /// The transform stays as it was constructed.
    Static,
    /// Spins about the local vertical axis.
    Rotating,
    /// Circles a point in the local XY-plane.
    Orbiting(Orbit),
}

impl Animation {
    pub fn orbiting() -> Self {
        Self::Orbiting(Orbit::default())
    }

    /// Advances `transform` by one tick.
    ///
    /// `_elapsed` is accepted so every kind shares one signature; none of the
    /// current kinds scale by time.
    pub fn advance(&mut self, transform: &mut Matrix4<f32>, _elapsed: Duration) {
        match self {
            Animation::Static => (),
            Animation::Rotating => {
                *transform = *transform * Matrix4::from_angle_y(Rad(ROTATION_STEP));
            }
            Animation::Orbiting(orbit) => orbit.advance(transform),
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::Static
    }
}

/// State of an orbiting object.
///
/// Each tick undoes last tick's displacement, advances the phase, re-orients
/// about the local z-axis by the phase and applies the new displacement.
#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
    /// Always within `[0, 2π)`.
    pub phase: f32,
    /// Displacement applied on the last tick, in the object's local frame.
    pub displacement: Vector3<f32>,
    pub radius: f32,
    /// Phase increment per tick in radians.
    pub step: f32,
}

impl Orbit {
    pub fn new(radius: f32, step: f32) -> Self {
        Self {
            phase: 0.0,
            displacement: Vector3::zero(),
            radius,
            step,
        }
    }

    fn advance(&mut self, transform: &mut Matrix4<f32>) {
        *transform = *transform * Matrix4::from_translation(-self.displacement);

        self.phase = (self.phase + self.step).rem_euclid(TAU);
        if self.phase >= TAU {
            self.phase = 0.0;
        }
        let (sin, cos) = self.phase.sin_cos();
        self.displacement = Vector3::new(self.radius * cos, self.radius * sin, 0.0);

        *transform = *transform
            * Matrix4::from_angle_z(Rad(self.phase))
            * Matrix4::from_translation(self.displacement);
    }
}

impl Default for Orbit {
    fn default() -> Self {
        Self::new(16.0, PI / 160_000.0)
    }
}
