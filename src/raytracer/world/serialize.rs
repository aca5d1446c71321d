//! Scene serialiser (spec §4.7): packs scene state into the dense numeric
//! layouts the renderer expects, mirroring a GPU upload buffer even though
//! this port dispatches to a CPU thread pool rather than a device.

use crate::raytracer::world::{Camera, Light, Sphere};

pub const MAX_SPHERES: usize = 512;

#[derive(Clone, Debug, PartialEq)]
pub struct CameraBuffer {
    pub position: [f32; 3],
    pub background: [f32; 3],
    pub height: u32,
    pub width: u32,
    /// Row-major primary ray *directions*, length `height * width`.
    pub primary_rays: Vec<[f32; 3]>,
}

pub fn stage_camera(camera: &Camera) -> CameraBuffer {
    let (height, width) = camera.resolution();
    let mut primary_rays = Vec::with_capacity((height as usize) * (width as usize));
    for row in 0..height {
        for col in 0..width {
            let dir = camera.primary_ray_direction(row, col);
            primary_rays.push(dir.as_ref().cast::<f32>().into());
        }
    }

    CameraBuffer {
        position: (*camera.position().as_ref()).cast::<f32>().into(),
        background: camera.background().channels(),
        height,
        width,
        primary_rays,
    }
}

/// 5 rows of 3 floats: position, ambient, diffuse, specular, `[I^2, I^2, I^2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct LightBuffer(pub [[f32; 3]; 5]);

pub fn stage_light(light: &Light) -> LightBuffer {
    let i_sq = (light.intensity() * light.intensity()) as f32;
    LightBuffer([
        (*light.position().as_ref()).cast::<f32>().into(),
        light.ambient().channels(),
        light.diffuse().channels(),
        light.specular().channels(),
        [i_sq, i_sq, i_sq],
    ])
}

/// Fixed `(512, 5, 3)` layout: row 0 centre, row 1 ambient, row 2 diffuse,
/// row 3 specular, row 4 `[shine, reflect, radius]`. Trailing slots past the
/// registered sphere count are zeroed (radius 0 acts as the "unused slot"
/// sentinel the renderer filters on).
#[derive(Clone, Debug, PartialEq)]
pub struct SphereBuffer(pub Box<[[[f32; 3]; 5]; MAX_SPHERES]>);

pub fn stage_spheres(spheres: &[Sphere]) -> SphereBuffer {
    let mut rows = Box::new([[[0.0f32; 3]; 5]; MAX_SPHERES]);

    for (slot, sphere) in rows.iter_mut().zip(spheres.iter()) {
        slot[0] = (*sphere.centre().as_ref()).cast::<f32>().into();
        slot[1] = sphere.ambient().channels();
        slot[2] = sphere.diffuse().channels();
        slot[3] = sphere.specular().channels();
        slot[4] = [sphere.shine() as f32, sphere.reflect() as f32, sphere.radius() as f32];
    }

    SphereBuffer(rows)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamsBuffer {
    pub eps: f32,
    pub max_reflections: f32,
}

pub fn stage_params(eps: f64, max_reflections: u32) -> ParamsBuffer {
    ParamsBuffer {
        eps: eps as f32,
        max_reflections: max_reflections as f32,
    }
}
