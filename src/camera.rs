//! First-person camera state, controller and projection.
//!
//! [`Camera`] is plain state: where the eye is and where it looks. The
//! [`CameraController`] holds only tuning constants and turns key presses and
//! cursor positions into mutations of a camera passed in by reference.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::dpi::PhysicalPosition;

/// Height of the eye above the ground while walking.
pub const EYE_HEIGHT: f32 = 2.05;
/// Pitch is clamped to +-`PITCH_LIMIT` degrees so the view never flips over.
pub const PITCH_LIMIT: f32 = 89.0;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    /// Interactive first-person walking at eye height.
    Walking,
    /// Fixed observation pose; movement and look input are ignored.
    Overview,
}

/// A hardcoded pose the camera snaps to when the mode is toggled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPreset {
    pub position: Point3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
}

impl CameraPreset {
    pub fn walking() -> Self {
        Self {
            position: Point3::new(10.0, EYE_HEIGHT, 6.0),
            yaw: Deg(270.0),
            pitch: Deg(0.0),
        }
    }

    /// Looks down over the scene along `(0, -0.6, -1)`.
    pub fn overview() -> Self {
        Self {
            position: Point3::new(10.0, 14.0, 32.0),
            yaw: Deg(270.0),
            pitch: Deg(-0.6_f32.atan().to_degrees()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub forward: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    /// Always within `[0, 360)`.
    pub yaw: Deg<f32>,
    /// Always within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub pitch: Deg<f32>,
    pub mode: CameraMode,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, yaw: Deg<f32>, pitch: Deg<f32>) -> Self {
        let mut camera = Self {
            position: position.into(),
            forward: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            yaw,
            pitch,
            mode: CameraMode::Walking,
        };
        camera.update_orientation();
        camera
    }

    /// Adds the given offsets to yaw and pitch and refreshes the basis vectors.
    pub fn rotate(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        self.yaw = self.yaw + yaw;
        self.pitch = self.pitch + pitch;
        self.update_orientation();
    }

    /// Clamps pitch, wraps yaw and recomputes `forward` and `right` from them.
    pub fn update_orientation(&mut self) {
        self.pitch = Deg(self.pitch.0.clamp(-PITCH_LIMIT, PITCH_LIMIT));
        self.yaw = Deg(wrap_degrees(self.yaw.0));

        let (yaw_sin, yaw_cos) = self.yaw.0.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.to_radians().sin_cos();
        self.forward = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.forward.cross(self.up).normalize();
    }

    /// Hard reset to a preset pose. Nothing of the previous pose survives.
    pub fn apply_preset(&mut self, preset: &CameraPreset) {
        self.position = preset.position;
        self.yaw = preset.yaw;
        self.pitch = preset.pitch;
        self.update_orientation();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.forward, self.up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, EYE_HEIGHT, 0.0), Deg(270.0), Deg(0.0))
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `360.0`, which is
/// folded back to zero here.
fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Everything a key press can ask the camera to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraAction {
    ToggleMode,
    Forward,
    /// Forward with the run boost; sent as shift + w.
    Run,
    Backward,
    StrafeLeft,
    StrafeRight,
    LookUp,
    LookDown,
    LookLeft,
    LookRight,
}

impl CameraAction {
    pub fn from_key(key: char) -> Option<Self> {
        let action = match key {
            'c' => Self::ToggleMode,
            'w' => Self::Forward,
            'W' => Self::Run,
            's' => Self::Backward,
            'a' => Self::StrafeLeft,
            'd' => Self::StrafeRight,
            'i' => Self::LookUp,
            'k' => Self::LookDown,
            'j' => Self::LookLeft,
            'l' => Self::LookRight,
            _ => return None,
        };
        Some(action)
    }
}

/// Turns input into camera mutations.
///
/// The controller owns no camera state; every handler receives the camera by
/// reference and runs to completion.
#[derive(Clone, Debug)]
pub struct CameraController {
    /// Walking speed in units per second.
    pub speed: f32,
    /// Added to `speed` while running.
    pub run_boost: f32,
    /// Yaw/pitch change per look key press.
    pub look_step: Deg<f32>,
    /// Degrees per pixel of cursor offset from the screen centre.
    pub sensitivity: f32,
    pub eye_height: f32,
    pub screen_center: (f64, f64),
    pub walking: CameraPreset,
    pub overview: CameraPreset,
}

impl CameraController {
    pub fn new(screen_center: (f64, f64)) -> Self {
        Self {
            speed: 50.0,
            run_boost: 0.1,
            look_step: Deg(2.0),
            sensitivity: 0.10,
            eye_height: EYE_HEIGHT,
            screen_center,
            walking: CameraPreset::walking(),
            overview: CameraPreset::overview(),
        }
    }

    /// Handles a key-down event. Returns `false` for keys without a binding.
    ///
    /// `dt` is the elapsed time of the last render tick in seconds and scales
    /// movement.
    pub fn on_key(&self, camera: &mut Camera, key: char, dt: f32) -> bool {
        match CameraAction::from_key(key) {
            Some(action) => {
                self.apply(camera, action, dt);
                true
            }
            None => false,
        }
    }

    pub fn apply(&self, camera: &mut Camera, action: CameraAction, dt: f32) {
        let step = self.speed * dt;
        match action {
            CameraAction::ToggleMode => {
                self.toggle_mode(camera);
                return;
            }
            _ if camera.mode == CameraMode::Overview => return,
            CameraAction::Forward => camera.position = camera.position + camera.forward * step,
            CameraAction::Run => {
                let run_step = (self.speed + self.run_boost) * dt;
                camera.position = camera.position + camera.forward * run_step;
            }
            CameraAction::Backward => camera.position = camera.position - camera.forward * step,
            CameraAction::StrafeLeft => camera.position = camera.position - camera.right * step,
            CameraAction::StrafeRight => camera.position = camera.position + camera.right * step,
            CameraAction::LookUp => camera.rotate(Deg(0.0), self.look_step),
            CameraAction::LookDown => camera.rotate(Deg(0.0), -self.look_step),
            CameraAction::LookLeft => camera.rotate(-self.look_step, Deg(0.0)),
            CameraAction::LookRight => camera.rotate(self.look_step, Deg(0.0)),
        }
        // Translation must never lift the eye off the ground.
        camera.position.y = self.eye_height;
    }

    /// Handles an absolute cursor position.
    ///
    /// Returns the position the cursor should be warped back to, if any, so the
    /// look is unbounded.
    pub fn on_mouse_move(
        &self,
        camera: &mut Camera,
        x: f64,
        y: f64,
    ) -> Option<PhysicalPosition<f64>> {
        if camera.mode == CameraMode::Overview {
            return None;
        }
        let (cx, cy) = self.screen_center;
        let x_offset = (x - cx) as f32 * self.sensitivity;
        let y_offset = (cy - y) as f32 * self.sensitivity;
        camera.rotate(Deg(x_offset), Deg(y_offset));

        if x != cx || y != cy {
            Some(PhysicalPosition::new(cx, cy))
        } else {
            None
        }
    }

    fn toggle_mode(&self, camera: &mut Camera) {
        let (preset, mode) = match camera.mode {
            CameraMode::Walking => (&self.overview, CameraMode::Overview),
            CameraMode::Overview => (&self.walking, CameraMode::Walking),
        };
        camera.apply_preset(preset);
        camera.mode = mode;
        log::debug!("camera switched to {:?}", mode);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new((960.0, 540.0))
    }
}

/// Perspective projection for a fixed-size surface.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    fn assert_unit_basis(camera: &Camera) {
        assert!(close(camera.forward.magnitude(), 1.0), "{:?}", camera.forward);
        assert!(close(camera.right.magnitude(), 1.0), "{:?}", camera.right);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert_eq!(camera.mode, CameraMode::Walking);
        assert!(close(camera.forward.x, 0.0));
        assert!(close(camera.forward.y, 0.0));
        assert!(close(camera.forward.z, -1.0));
        assert!(close(camera.right.x, 1.0));
    }

    #[test]
    fn yaw_stays_in_range_for_any_input() {
        let mut camera = Camera::default();
        for delta in [-1e-7, -0.5, -2.0, -359.9, -360.0, -720.5, 0.0, 1e-7, 2.0, 359.999, 360.0, 1000.0, 1e6] {
            camera.rotate(Deg(delta), Deg(0.0));
            assert!(
                (0.0..360.0).contains(&camera.yaw.0),
                "yaw {} after delta {}",
                camera.yaw.0,
                delta
            );
            assert_unit_basis(&camera);
        }
    }

    #[test]
    fn tiny_negative_yaw_wraps_to_zero_not_360() {
        assert_eq!(wrap_degrees(-1e-9), 0.0);
        assert!(close(wrap_degrees(-2.0), 358.0));
        assert!(close(wrap_degrees(362.0), 2.0));
    }

    #[test]
    fn pitch_is_clamped_regardless_of_delta() {
        let mut camera = Camera::default();
        camera.rotate(Deg(0.0), Deg(10_000.0));
        assert_eq!(camera.pitch, Deg(PITCH_LIMIT));
        assert_unit_basis(&camera);
        camera.rotate(Deg(0.0), Deg(-1e9));
        assert_eq!(camera.pitch, Deg(-PITCH_LIMIT));
        assert_unit_basis(&camera);
    }

    #[test]
    fn look_keys_step_two_degrees() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        assert!(controller.on_key(&mut camera, 'l', 0.0));
        assert!(close(camera.yaw.0, 272.0));
        assert!(controller.on_key(&mut camera, 'j', 0.0));
        assert!(controller.on_key(&mut camera, 'j', 0.0));
        assert!(close(camera.yaw.0, 268.0));
        assert!(controller.on_key(&mut camera, 'i', 0.0));
        assert!(close(camera.pitch.0, 2.0));
        assert!(controller.on_key(&mut camera, 'k', 0.0));
        assert!(controller.on_key(&mut camera, 'k', 0.0));
        assert!(close(camera.pitch.0, -2.0));
    }

    #[test]
    fn unknown_keys_are_not_handled() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let before = camera.clone();
        assert!(!controller.on_key(&mut camera, 'x', 1.0));
        assert_eq!(camera.position, before.position);
        assert_eq!(camera.yaw, before.yaw);
    }

    #[test]
    fn moving_forward_follows_forward_and_stays_at_eye_height() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.on_key(&mut camera, 'w', 1.0);
        assert!(close(camera.position.x, 0.0));
        assert!(close(camera.position.z, -controller.speed));
        assert_eq!(camera.position.y, EYE_HEIGHT);
    }

    #[test]
    fn running_adds_the_boost() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.on_key(&mut camera, 'W', 0.5);
        let expected = -(controller.speed + controller.run_boost) * 0.5;
        assert!(close(camera.position.z, expected), "{}", camera.position.z);
    }

    #[test]
    fn movement_never_changes_height_even_when_looking_up() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        camera.rotate(Deg(17.0), Deg(60.0));
        for key in ['w', 'W', 's', 'a', 'd', 'i', 'k'] {
            controller.on_key(&mut camera, key, 0.37);
            assert_eq!(camera.position.y, EYE_HEIGHT, "after {}", key);
        }
    }

    #[test]
    fn strafing_moves_along_right() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.on_key(&mut camera, 'd', 0.1);
        assert!(close(camera.position.x, controller.speed * 0.1));
        controller.on_key(&mut camera, 'a', 0.1);
        controller.on_key(&mut camera, 'a', 0.1);
        assert!(close(camera.position.x, -controller.speed * 0.1));
    }

    #[test]
    fn toggling_twice_is_a_hard_reset_to_the_walking_preset() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.on_key(&mut camera, 'w', 0.2);
        controller.on_key(&mut camera, 'l', 0.0);

        controller.on_key(&mut camera, 'c', 0.0);
        assert_eq!(camera.mode, CameraMode::Overview);
        assert_eq!(camera.position, Point3::new(10.0, 14.0, 32.0));
        let expected = Vector3::new(0.0, -0.6, -1.0).normalize();
        assert!((camera.forward - expected).magnitude() < EPS);

        controller.on_key(&mut camera, 'c', 0.0);
        assert_eq!(camera.mode, CameraMode::Walking);
        assert_eq!(camera.position, Point3::new(10.0, EYE_HEIGHT, 6.0));
        assert!((camera.forward - -Vector3::unit_z()).magnitude() < EPS);
        assert_unit_basis(&camera);
    }

    #[test]
    fn overview_ignores_movement_look_and_mouse() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.on_key(&mut camera, 'c', 0.0);
        let before = camera.clone();

        for key in ['w', 'W', 's', 'a', 'd', 'i', 'j', 'k', 'l'] {
            assert!(controller.on_key(&mut camera, key, 1.0));
        }
        assert_eq!(controller.on_mouse_move(&mut camera, 0.0, 0.0), None);

        assert_eq!(camera.position, before.position);
        assert_eq!(camera.yaw, before.yaw);
        assert_eq!(camera.pitch, before.pitch);
    }

    #[test]
    fn mouse_offset_turns_and_requests_a_warp() {
        let controller = CameraController::new((960.0, 540.0));
        let mut camera = Camera::default();

        let warp = controller.on_mouse_move(&mut camera, 970.0, 530.0);
        assert_eq!(warp, Some(PhysicalPosition::new(960.0, 540.0)));
        assert!(close(camera.yaw.0, 271.0));
        assert!(close(camera.pitch.0, 1.0));
        assert_unit_basis(&camera);
    }

    #[test]
    fn mouse_at_centre_does_nothing() {
        let controller = CameraController::new((960.0, 540.0));
        let mut camera = Camera::default();
        assert_eq!(controller.on_mouse_move(&mut camera, 960.0, 540.0), None);
        assert_eq!(camera.yaw, Deg(270.0));
        assert_eq!(camera.pitch, Deg(0.0));
    }

    #[test]
    fn view_matrix_puts_the_eye_at_the_origin_looking_down_negative_z() {
        let mut camera = Camera::default();
        camera.position = Point3::new(3.0, EYE_HEIGHT, -7.0);
        camera.rotate(Deg(33.0), Deg(-12.0));
        let view = camera.view_matrix();

        let eye = view * camera.position.to_homogeneous();
        assert!(close(eye.x, 0.0) && close(eye.y, 0.0) && close(eye.z, 0.0));

        let ahead = view * (camera.position + camera.forward).to_homogeneous();
        assert!(close(ahead.x, 0.0) && close(ahead.y, 0.0) && close(ahead.z, -1.0));
    }

    #[test]
    fn projection_keeps_aspect_on_resize() {
        let mut projection = Projection::new(1920, 1080, Deg(45.0), 0.1, 400.0);
        let before = projection.calc_matrix();
        projection.resize(1080, 1080);
        let after = projection.calc_matrix();
        assert!(after.x.x > before.x.x);
        assert!(close(after.y.y, before.y.y));
    }
}
