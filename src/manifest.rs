//! The walkthrough scene as data.
//!
//! [`default_manifest`] lists every object of the park scene in draw order:
//! pillars, ground, the teapot house, the skybox and the orbiting figure.

use std::f32::consts::PI;

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

use crate::{animation::Animation, data_structures::scene::Material};

/// Everything needed to load one scene object. Paths are relative to the asset root.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDescriptor {
    pub texture: String,
    pub mesh: String,
    pub material: Material,
    pub animation: Animation,
    pub transform: Matrix4<f32>,
    pub apply_texture: bool,
}

impl ObjectDescriptor {
    pub fn new(texture: &str, mesh: &str, transform: Matrix4<f32>) -> Self {
        Self {
            texture: texture.to_string(),
            mesh: mesh.to_string(),
            material: Material::default(),
            animation: Animation::Static,
            transform,
            apply_texture: true,
        }
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }
}

pub const PILLAR_COUNT: usize = 12;
pub const PILLAR_RING_RADIUS: f32 = 9.5;

const TEAPOT_HOUSE: [(&str, &str); 6] = [
    ("Textures/TeaPotHouse/StoneWallx3.bmp", "Objects/TeaPotHouse/Base.obj"),
    ("Textures/TeaPotHouse/Glass.bmp", "Objects/TeaPotHouse/Window.obj"),
    ("Textures/TeaPotHouse/TeaPotGoldX3.bmp", "Objects/TeaPotHouse/TeaPot.obj"),
    ("Textures/TeaPotHouse/woodTextureX10.bmp", "Objects/TeaPotHouse/BasePorchAndRoof.obj"),
    ("Textures/TeaPotHouse/Door.bmp", "Objects/TeaPotHouse/Door.obj"),
    ("Textures/TeaPotHouse/WoodTexture2.bmp", "Objects/TeaPotHouse/PillarLedge.obj"),
];

pub fn default_manifest() -> Vec<ObjectDescriptor> {
    let identity = Matrix4::identity();
    let mut objects = Vec::new();

    for k in 0..PILLAR_COUNT {
        let angle = k as f32 * 2.0 * PI / PILLAR_COUNT as f32;
        let transform = Matrix4::from_translation(Vector3::new(
            PILLAR_RING_RADIUS * angle.cos(),
            0.3,
            PILLAR_RING_RADIUS * angle.sin(),
        )) * Matrix4::from_scale(0.5);
        objects.push(ObjectDescriptor::new(
            "Textures/steel-cross.bmp",
            "Objects/amsterdamertje/adam.obj",
            transform,
        ));
    }

    objects.push(ObjectDescriptor::new(
        "Textures/grass.bmp",
        "Objects/floor400X400.obj",
        identity,
    ));
    objects.push(ObjectDescriptor::new(
        "Textures/sidewalk/sidewalk.bmp",
        "Objects/Sidewalk.obj",
        identity,
    ));
    objects.push(ObjectDescriptor::new(
        "Textures/rascal.bmp",
        "Objects/Step.obj",
        identity,
    ));
    objects.push(ObjectDescriptor::new(
        "Textures/sidewalk/roadx10.bmp",
        "Objects/Road.obj",
        identity,
    ));

    let house = Matrix4::from_translation(Vector3::new(-23.0, 0.0, 2.0));
    for (texture, mesh) in TEAPOT_HOUSE {
        let descriptor = ObjectDescriptor::new(texture, mesh, house);
        objects.push(if mesh.ends_with("TeaPot.obj") {
            descriptor.with_animation(Animation::Rotating)
        } else {
            descriptor
        });
    }

    objects.push(ObjectDescriptor::new(
        "Textures/Skybox/SkyboxFlipped.bmp",
        "Objects/Skybox/Skybox.obj",
        identity,
    ));

    let npc = Matrix4::from_translation(Vector3::new(0.0, 0.3, 0.0))
        * Matrix4::from_axis_angle(Vector3::new(-1.0, 0.0, 0.0), Deg(90.0));
    objects.push(
        ObjectDescriptor::new(
            "Textures/TeaPotHouse/TeaPotGoldX3.bmp",
            "Objects/KassyaModel/kassya.obj",
            npc,
        )
        .with_animation(Animation::orbiting()),
    );

    objects
}
