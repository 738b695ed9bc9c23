mod common;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};
use instant::{Duration, Instant};
use scene_walk::{
    animation::{Animation, ROTATION_STEP},
    camera::{Camera, CameraController, CameraMode, CameraPreset, EYE_HEIGHT},
    config::ViewerConfig,
    render::{FrameRenderer, TickTimer},
};

use crate::common::test_utils::{max_diff, object_at, registry};

const TICK: Duration = Duration::from_millis(10);

fn setup() -> (Camera, CameraController) {
    let config = ViewerConfig::default();
    (Camera::default(), CameraController::new(config.screen_center()))
}

#[test]
fn walking_forward_for_one_second_covers_the_walking_speed() {
    let (mut camera, controller) = setup();
    assert_eq!(camera.position, Point3::new(0.0, EYE_HEIGHT, 0.0));
    assert!((camera.forward - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);

    assert!(controller.on_key(&mut camera, 'w', 1.0));

    assert!((camera.position.z + controller.speed).abs() < 1e-3);
    assert!(camera.position.x.abs() < 1e-3);
    assert_eq!(camera.position.y, EYE_HEIGHT);
}

#[test]
fn looking_up_then_walking_keeps_the_eye_on_the_ground() {
    let (mut camera, controller) = setup();
    for _ in 0..20 {
        controller.on_key(&mut camera, 'i', 0.01);
    }
    assert!((camera.pitch.0 - 40.0).abs() < 1e-3);

    for key in ['w', 'W', 's', 'a', 'd', 'w'] {
        controller.on_key(&mut camera, key, 0.016);
        assert_eq!(camera.position.y, EYE_HEIGHT);
        assert!((camera.forward.magnitude() - 1.0).abs() < 1e-5);
        assert!((camera.right.magnitude() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn overview_round_trip_lands_on_the_walking_preset() {
    let (mut camera, controller) = setup();
    controller.on_key(&mut camera, 'w', 0.2);
    controller.on_key(&mut camera, 'l', 0.0);
    controller.on_mouse_move(&mut camera, 1000.0, 500.0);

    controller.on_key(&mut camera, 'c', 0.0);
    assert_eq!(camera.mode, CameraMode::Overview);
    let overview = camera.clone();

    // Nothing moves the camera while overlooking the scene.
    for key in ['w', 's', 'a', 'd', 'i', 'k', 'j', 'l'] {
        controller.on_key(&mut camera, key, 1.0);
    }
    assert!(controller.on_mouse_move(&mut camera, 0.0, 0.0).is_none());
    assert_eq!(camera.position, overview.position);
    assert_eq!(camera.yaw, overview.yaw);
    assert_eq!(camera.pitch, overview.pitch);

    controller.on_key(&mut camera, 'c', 0.0);
    let walking = CameraPreset::walking();
    assert_eq!(camera.mode, CameraMode::Walking);
    assert_eq!(camera.position, walking.position);
    assert_eq!(camera.yaw, walking.yaw);
    assert_eq!(camera.pitch, walking.pitch);
}

#[test]
fn mouse_look_is_anchored_at_the_screen_centre() {
    let (mut camera, controller) = setup();
    let (cx, cy) = controller.screen_center;

    let warp = controller.on_mouse_move(&mut camera, cx + 10.0, cy);
    assert_eq!(warp.map(|p| (p.x, p.y)), Some((cx, cy)));
    assert!((camera.yaw.0 - 271.0).abs() < 1e-3);

    // The warp itself reports the centre and changes nothing.
    assert!(controller.on_mouse_move(&mut camera, cx, cy).is_none());
    assert!((camera.yaw.0 - 271.0).abs() < 1e-3);
    assert_eq!(camera.pitch, Deg(0.0));
}

#[test]
fn static_objects_never_move_while_the_scene_animates() {
    let (camera, _) = setup();
    let mut renderer = FrameRenderer::new();
    let mut scene = registry(vec![
        Animation::Static,
        Animation::Rotating,
        Animation::orbiting(),
        Animation::Static,
    ]);

    let start = Instant::now();
    for n in 0..500u32 {
        renderer.update(start + TICK * n, &mut scene, &camera);
    }

    assert_eq!(scene.objects()[0].transform, Matrix4::identity());
    assert_eq!(scene.objects()[3].transform, Matrix4::identity());
    assert_ne!(scene.objects()[1].transform, Matrix4::identity());
    assert_ne!(scene.objects()[2].transform, Matrix4::identity());
}

#[test]
fn teapot_spin_follows_the_tick_count_not_the_clock() {
    let (camera, _) = setup();
    let base = Matrix4::from_translation(Vector3::new(-23.0, 0.0, 2.0));
    let mut renderer = FrameRenderer::new();
    let mut scene = scene_walk::data_structures::scene::SceneRegistry::new(vec![object_at(
        base,
        Animation::Rotating,
    )]);

    // Irregular frame times.
    let mut now = Instant::now();
    let ticks = 300;
    for n in 0..ticks {
        now += Duration::from_millis(5 + (n % 7) * 3);
        renderer.update(now, &mut scene, &camera);
    }

    let expected = base * Matrix4::from_angle_y(Rad(ROTATION_STEP * ticks as f32));
    assert!(max_diff(&scene.objects()[0].transform, &expected) < 1e-3);
}

#[test]
fn orbiting_figure_circles_without_drifting() {
    let (camera, _) = setup();
    let base = Matrix4::from_translation(Vector3::new(0.0, 0.3, 0.0))
        * Matrix4::from_axis_angle(Vector3::new(-1.0, 0.0, 0.0), Deg(90.0));
    let mut renderer = FrameRenderer::new();
    let mut scene = scene_walk::data_structures::scene::SceneRegistry::new(vec![object_at(
        base,
        Animation::orbiting(),
    )]);

    let start = Instant::now();
    for n in 0..1_000u32 {
        renderer.update(start + TICK * n, &mut scene, &camera);
        let object = &scene.objects()[0];
        let Animation::Orbiting(orbit) = &object.animation else {
            panic!("animation kind changed");
        };
        assert!((orbit.displacement.magnitude() - orbit.radius).abs() < 1e-3);
        // Undoing the displacement returns to the orbit centre.
        let undone = object.transform * Matrix4::from_translation(-orbit.displacement);
        assert!((undone.w - base.w).magnitude() < 1e-2);
        let offset = (object.transform.w - base.w).truncate();
        assert!((offset.magnitude() - orbit.radius).abs() < 5e-2);
    }
}

#[test]
fn object_uniforms_track_the_camera() {
    let (mut camera, controller) = setup();
    let mut renderer = FrameRenderer::new();
    let mut scene = registry(vec![Animation::Static]);
    let start = Instant::now();

    renderer.update(start, &mut scene, &camera);
    let before = renderer.object_uniforms(&scene)[0].model_view;

    controller.on_key(&mut camera, 'd', 0.1);
    renderer.update(start + TICK, &mut scene, &camera);
    let after = renderer.object_uniforms(&scene)[0].model_view;

    assert_ne!(before, after);
    let expected: [[f32; 4]; 4] = camera.view_matrix().into();
    assert_eq!(after, expected);
}

#[test]
fn ticks_are_paced_by_a_fixed_delay() {
    let config = ViewerConfig::default();
    let start = Instant::now();
    let mut timer = TickTimer::new(config.tick_interval, start);

    let mut ticks = 0;
    let mut now = start;
    while now < start + Duration::from_millis(100) {
        if timer.due(now) {
            ticks += 1;
            // Each tick takes 5 ms of work before the timer is re-armed.
            timer.rearm(now + Duration::from_millis(5));
        }
        now += Duration::from_millis(1);
    }
    // One tick every 15 ms: 0, 15, 30, 45, 60, 75, 90.
    assert_eq!(ticks, 7);
}
