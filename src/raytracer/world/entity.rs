use crate::raytracer::world::{Camera, Light, Sphere};

/// The scene's object directory is a map from name to a tagged entity
/// (REDESIGN FLAG "Dynamic object bag"), replacing the reference system's
/// name-guarded heterogeneous bag.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Camera(Camera),
    Light(Light),
    Sphere(Sphere),
}

impl Entity {
    pub fn as_camera(&self) -> Option<&Camera> {
        match self {
            Entity::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match self {
            Entity::Light(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            Entity::Sphere(s) => Some(s),
            _ => None,
        }
    }
}

/// Borrowed view returned by `Scene::get`, standing in for the host
/// language's `scene[name]` (see SPEC_FULL.md §6 on why this isn't
/// `std::ops::Index`).
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    Camera(&'a Camera),
    Light(&'a Light),
    Sphere(&'a Sphere),
}

impl<'a> From<&'a Entity> for EntityRef<'a> {
    fn from(e: &'a Entity) -> Self {
        match e {
            Entity::Camera(c) => EntityRef::Camera(c),
            Entity::Light(l) => EntityRef::Light(l),
            Entity::Sphere(s) => EntityRef::Sphere(s),
        }
    }
}

impl From<Camera> for Entity {
    fn from(c: Camera) -> Self {
        Entity::Camera(c)
    }
}

impl From<Light> for Entity {
    fn from(l: Light) -> Self {
        Entity::Light(l)
    }
}

impl From<Sphere> for Entity {
    fn from(s: Sphere) -> Self {
        Entity::Sphere(s)
    }
}
