//! Scene registry & dirty tracker (spec §4.6) plus `capture_frame`'s staging
//! and dispatch pipeline (spec §4.4, §4.7, §5).

use std::collections::HashMap;
use std::panic::{catch_unwind, UnwindSafe};

use crate::raytracer::error::{
    RenderError, SceneError, SceneErrors, ValidationError, ValidationErrors, WorkerError,
};
use crate::raytracer::render;
use crate::raytracer::world::camera::CAMERA_NAME;
use crate::raytracer::world::entity::{Entity, EntityRef};
use crate::raytracer::world::frame::{Frame, FrameHistory};
use crate::raytracer::world::objects::light::LIGHT_NAME;
use crate::raytracer::world::serialize::{
    self, CameraBuffer, LightBuffer, ParamsBuffer, SphereBuffer, MAX_SPHERES,
};
use crate::raytracer::world::{Camera, Light, Sphere};

const DEFAULT_EPS: f64 = 1e-3;
const DEFAULT_MAX_REFLECTIONS: u32 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DirtyBits {
    camera: bool,
    light: bool,
    spheres: bool,
    params: bool,
}

impl DirtyBits {
    fn all_dirty() -> Self {
        Self {
            camera: true,
            light: true,
            spheres: true,
            params: true,
        }
    }

    fn any(&self) -> bool {
        self.camera || self.light || self.spheres || self.params
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Default)]
struct Cache {
    camera: Option<CameraBuffer>,
    light: Option<LightBuffer>,
    spheres: Option<SphereBuffer>,
    params: Option<ParamsBuffer>,
}

/// The scene: object directory, dirty bits, render parameters and frame
/// history (spec §3). Entities are owned exclusively by the scene; mutation
/// only happens through `Scene` methods so dirty bits never go stale
/// (REDESIGN FLAG "Dirty tracking through object mutation").
pub struct Scene {
    directory: HashMap<String, Entity>,
    sphere_order: Vec<String>,
    established_resolution: Option<(u32, u32)>,
    dirty: DirtyBits,
    eps: f64,
    max_reflections: u32,
    frames: FrameHistory,
    cache: Cache,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            directory: HashMap::new(),
            sphere_order: Vec::new(),
            established_resolution: None,
            dirty: DirtyBits::all_dirty(),
            eps: DEFAULT_EPS,
            max_reflections: DEFAULT_MAX_REFLECTIONS,
            frames: FrameHistory::default(),
            cache: Cache::default(),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- lookup -----------------------------------------------------

    pub fn get(&self, name: &str) -> Option<EntityRef<'_>> {
        self.directory.get(name).map(EntityRef::from)
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.directory.get(CAMERA_NAME).and_then(Entity::as_camera)
    }

    pub fn light(&self) -> Option<&Light> {
        self.directory.get(LIGHT_NAME).and_then(Entity::as_light)
    }

    pub fn spheres(&self) -> Vec<&Sphere> {
        self.sphere_order
            .iter()
            .filter_map(|name| self.directory.get(name))
            .filter_map(Entity::as_sphere)
            .collect()
    }

    pub fn frames(&self) -> &FrameHistory {
        &self.frames
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn max_reflections(&self) -> u32 {
        self.max_reflections
    }

    // ---- registration -------------------------------------------------

    /// `scene.register(obj)` (spec §6). Accepts any of `Camera`, `Light`,
    /// `Sphere` via `Into<Entity>`.
    pub fn register(&mut self, entity: impl Into<Entity>) -> Result<(), RenderError> {
        self.register_entity(entity.into())
            .map_err(|e| RenderError::from(ValidationErrors(vec![e])))
    }

    fn register_entity(&mut self, entity: Entity) -> Result<(), ValidationError> {
        let name = entity_name(&entity).to_string();

        if self.directory.contains_key(&name) {
            return Err(ValidationError::DuplicateName(name));
        }

        if let Entity::Camera(camera) = &entity {
            let resolution = camera.resolution();
            if let Some(established) = self.established_resolution {
                if established != resolution {
                    return Err(ValidationError::ResolutionMismatch {
                        established_height: established.0,
                        established_width: established.1,
                        new_height: resolution.0,
                        new_width: resolution.1,
                    });
                }
            } else {
                self.established_resolution = Some(resolution);
            }
        }

        let is_sphere = matches!(entity, Entity::Sphere(_));
        self.mark_dirty(&entity);
        self.directory.insert(name.clone(), entity);
        if is_sphere {
            self.sphere_order.push(name);
        }

        Ok(())
    }

    /// Transactional batch registration (spec §7): on failure, every entity
    /// registered earlier in this call is rolled back before the error
    /// returns.
    pub fn register_many(
        &mut self,
        entities: Vec<Entity>,
    ) -> Result<(), RenderError> {
        let dirty_before = self.dirty;
        let mut applied = Vec::with_capacity(entities.len());
        for entity in entities {
            let name = entity_name(&entity).to_string();
            match self.register_entity(entity) {
                Ok(()) => applied.push(name),
                Err(e) => {
                    for name in applied.into_iter().rev() {
                        let _ = self.deregister(&name);
                    }
                    // the batch net-effect on the directory is a no-op, so
                    // the dirty bits it would have flipped shouldn't stick.
                    self.dirty = dirty_before;
                    return Err(RenderError::from(ValidationErrors(vec![e])));
                }
            }
        }
        Ok(())
    }

    pub fn deregister(&mut self, name: &str) -> Result<(), RenderError> {
        let entity = self
            .directory
            .remove(name)
            .ok_or_else(|| ValidationError::UnknownName(name.to_string()))?;

        self.mark_dirty(&entity);
        if matches!(entity, Entity::Sphere(_)) {
            self.sphere_order.retain(|n| n != name);
        }
        Ok(())
    }

    /// Transactional batch deregistration (spec §7).
    pub fn deregister_many(&mut self, names: Vec<String>) -> Result<(), RenderError> {
        let dirty_before = self.dirty;
        let mut removed: Vec<Entity> = Vec::with_capacity(names.len());
        for name in &names {
            match self.directory.remove(name) {
                Some(entity) => {
                    if matches!(entity, Entity::Sphere(_)) {
                        self.sphere_order.retain(|n| n != name);
                    }
                    self.mark_dirty(&entity);
                    removed.push(entity);
                }
                None => {
                    // roll back: re-insert everything removed so far in this call.
                    for (name, entity) in names.iter().zip(removed.into_iter()) {
                        let is_sphere = matches!(entity, Entity::Sphere(_));
                        self.directory.insert(name.clone(), entity);
                        if is_sphere {
                            self.sphere_order.push(name.clone());
                        }
                    }
                    // the batch net-effect on the directory is a no-op, so
                    // the dirty bits it would have flipped shouldn't stick.
                    self.dirty = dirty_before;
                    return Err(RenderError::from(ValidationError::UnknownName(name.clone())));
                }
            }
        }
        Ok(())
    }

    /// Replace a registered entity wholesale — the "mutation" operation of
    /// spec §3's lifecycle, chosen per REDESIGN FLAG "Dirty tracking through
    /// object mutation" option (b): entities are immutable snapshots, and a
    /// mutation is a `replace` of the same name with the same entity kind.
    pub fn replace(&mut self, name: &str, entity: impl Into<Entity>) -> Result<(), RenderError> {
        let entity = entity.into();
        let existing = self
            .directory
            .get(name)
            .ok_or_else(|| ValidationError::UnknownName(name.to_string()))?;

        if std::mem::discriminant(existing) != std::mem::discriminant(&entity) {
            return Err(RenderError::from(ValidationError::EntityKindMismatch(
                name.to_string(),
            )));
        }

        self.mark_dirty(&entity);
        self.directory.insert(name.to_string(), entity);
        Ok(())
    }

    pub fn set_eps(&mut self, eps: f64) -> Result<(), RenderError> {
        if !(0.0..=0.1).contains(&eps) || eps <= 0.0 {
            return Err(RenderError::from(ValidationError::OutOfRange {
                field: "eps",
                value: eps,
                low: f64::EPSILON,
                high: 0.1,
            }));
        }
        self.eps = eps;
        self.dirty.params = true;
        Ok(())
    }

    pub fn set_max_reflections(&mut self, n: u32) -> Result<(), RenderError> {
        if n > 10 {
            return Err(RenderError::from(ValidationError::OutOfRange {
                field: "max_reflections",
                value: n as f64,
                low: 0.,
                high: 10.,
            }));
        }
        self.max_reflections = n;
        self.dirty.params = true;
        Ok(())
    }

    fn mark_dirty(&mut self, entity: &Entity) {
        match entity {
            Entity::Camera(_) => self.dirty.camera = true,
            Entity::Light(_) => self.dirty.light = true,
            Entity::Sphere(_) => self.dirty.spheres = true,
        }
    }

    // ---- capture --------------------------------------------------------

    /// Validates, re-serialises only dirty categories, dispatches the
    /// renderer, appends to history and clears the dirty bits — or, if
    /// nothing is dirty and a previous frame exists, elides the render and
    /// appends a copy of the last frame (spec §4.6).
    pub fn capture_frame(&mut self) -> Result<&Frame, RenderError> {
        if !self.dirty.any() {
            if let Some(last) = self.frames.last() {
                // Deep copy: `Frame` owns its pixel `Vec`, so cloning here
                // means later writes by the caller to a previously returned
                // `&Frame` are impossible (the API only ever hands out
                // shared references) and can never retroactively mutate
                // this history entry (spec §9 "frame elision correctness").
                let copy = last.clone();
                self.frames.push(copy);
                return Ok(self.frames.last().expect("just pushed"));
            }
        }

        self.validate_capture()?;
        // Staging still runs so the device-ready buffers are kept current
        // for every dirty category (spec §4.7); the CPU kernel below reads
        // straight from the domain objects rather than re-parsing its own
        // staged buffers back out of `f32` arrays.
        self.stage_dirty()?;

        let camera = self.camera().expect("validated: camera present");
        let light = self.light().expect("validated: light present");
        let spheres: Vec<Sphere> = self.spheres().into_iter().cloned().collect();

        let frame = render::render(camera, light, &spheres, self.eps, self.max_reflections);

        self.frames.push(frame);
        self.dirty.clear();
        Ok(self.frames.last().expect("just pushed"))
    }

    fn validate_capture(&self) -> Result<(), RenderError> {
        let mut issues = Vec::new();
        if self.camera().is_none() {
            issues.push(SceneError::MissingCamera);
        }
        if self.light().is_none() {
            issues.push(SceneError::MissingLight);
        }
        let sphere_count = self.sphere_order.len();
        if sphere_count == 0 {
            issues.push(SceneError::NoSpheres);
        } else if sphere_count > MAX_SPHERES {
            issues.push(SceneError::TooManySpheres(sphere_count));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(RenderError::from(SceneErrors(issues)))
        }
    }

    /// Stages every dirty category concurrently (spec §5's "host->device
    /// staging... may be concurrent with each other but must complete
    /// before the kernel dispatch"), joining all workers and propagating any
    /// panic as a `WorkerError` before dispatch.
    fn stage_dirty(&mut self) -> Result<(), RenderError> {
        let camera = self.camera();
        let light = self.light();
        let spheres = self.spheres();
        let eps = self.eps;
        let max_reflections = self.max_reflections;

        let need_camera = self.dirty.camera || self.cache.camera.is_none();
        let need_light = self.dirty.light || self.cache.light.is_none();
        let need_spheres = self.dirty.spheres || self.cache.spheres.is_none();
        let need_params = self.dirty.params || self.cache.params.is_none();

        let mut staged_camera = None;
        let mut staged_light = None;
        let mut staged_spheres = None;
        let mut staged_params = None;

        let result: Result<(), WorkerError> = std::thread::scope(|scope| {
            let camera_handle =
                need_camera.then(|| scope.spawn(|| run_stage("camera", || serialize::stage_camera(camera.expect("validated")))));
            let light_handle =
                need_light.then(|| scope.spawn(|| run_stage("light", || serialize::stage_light(light.expect("validated")))));
            let sphere_handle = need_spheres
                .then(|| scope.spawn(|| run_stage("spheres", || serialize::stage_spheres(&spheres))));
            let params_handle = need_params
                .then(|| scope.spawn(|| run_stage("params", || serialize::stage_params(eps, max_reflections))));

            if let Some(h) = camera_handle {
                staged_camera = Some(h.join().expect("staging thread panicked outside catch_unwind")?);
            }
            if let Some(h) = light_handle {
                staged_light = Some(h.join().expect("staging thread panicked outside catch_unwind")?);
            }
            if let Some(h) = sphere_handle {
                staged_spheres = Some(h.join().expect("staging thread panicked outside catch_unwind")?);
            }
            if let Some(h) = params_handle {
                staged_params = Some(h.join().expect("staging thread panicked outside catch_unwind")?);
            }
            Ok(())
        });
        result?;

        if let Some(c) = staged_camera {
            self.cache.camera = Some(c);
        }
        if let Some(l) = staged_light {
            self.cache.light = Some(l);
        }
        if let Some(s) = staged_spheres {
            self.cache.spheres = Some(s);
        }
        if let Some(p) = staged_params {
            self.cache.params = Some(p);
        }

        Ok(())
    }
}

fn entity_name(entity: &Entity) -> &str {
    match entity {
        Entity::Camera(_) => CAMERA_NAME,
        Entity::Light(_) => LIGHT_NAME,
        Entity::Sphere(s) => s.name(),
    }
}

fn run_stage<T>(phase: &'static str, f: impl FnOnce() -> T + UnwindSafe) -> Result<T, WorkerError> {
    catch_unwind(f).map_err(|payload| WorkerError {
        phase,
        message: panic_message(&payload),
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracer::vector::{Color, Direction, Position};

    fn camera() -> Camera {
        Camera::new(
            Position::new(0., 0., 0.),
            4,
            4,
            Direction::new(0., 1., 0.),
            Direction::new(0., 0., -1.),
            Color::BLACK,
        )
        .unwrap()
    }

    fn light() -> Light {
        Light::new(
            Position::new(0., 5., 5.),
            Color::new(0.2, 0.2, 0.2),
            Color::WHITE,
            Color::WHITE,
            1.5,
        )
        .unwrap()
    }

    fn sphere(name: &str) -> Sphere {
        Sphere::new(
            name.into(),
            Position::new(0., 5., 0.),
            1.0,
            Color::new(0.2, 0., 0.),
            Color::new(0.6, 0., 0.),
            Color::WHITE,
            50.,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn dirty_bits_start_true_and_clear_after_capture() {
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        scene.register(sphere("s1")).unwrap();

        scene.capture_frame().unwrap();
        assert!(!scene.dirty.any());
    }

    #[test]
    fn empty_scene_reports_all_missing_pieces() {
        let mut scene = Scene::new();
        let err = scene.capture_frame().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Camera is not defined"));
        assert!(msg.contains("Light is not defined"));
        assert!(msg.contains("No objects to render"));
    }

    #[test]
    fn register_then_deregister_restores_directory() {
        let mut scene = Scene::new();
        scene.register(sphere("s1")).unwrap();
        assert!(scene.get("s1").is_some());
        scene.deregister("s1").unwrap();
        assert!(scene.get("s1").is_none());
        assert!(scene.spheres().is_empty());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut scene = Scene::new();
        scene.register(sphere("s1")).unwrap();
        assert!(scene.register(sphere("s1")).is_err());
    }

    #[test]
    fn resolution_immutable_after_first_camera() {
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.deregister(CAMERA_NAME).unwrap();

        let mismatched = Camera::new(
            Position::new(0., 0., 0.),
            8,
            8,
            Direction::new(0., 1., 0.),
            Direction::new(0., 0., -1.),
            Color::BLACK,
        )
        .unwrap();
        assert!(scene.register(mismatched).is_err());
    }

    #[test]
    fn capture_twice_without_mutation_elides_and_duplicates_last_frame() {
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        scene.register(sphere("s1")).unwrap();

        scene.capture_frame().unwrap();
        scene.capture_frame().unwrap();

        assert_eq!(scene.frames().len(), 2);
        assert_eq!(scene.frames()[0], scene.frames()[1]);
    }

    #[test]
    fn register_many_rolls_back_on_mid_batch_failure() {
        let mut scene = Scene::new();
        let entities = vec![
            Entity::Sphere(sphere("a")),
            Entity::Sphere(sphere("a")), // duplicate -> fails
        ];
        assert!(scene.register_many(entities).is_err());
        assert!(scene.get("a").is_none());
    }

    #[test]
    fn register_many_rollback_restores_clean_dirty_bits() {
        // A failing batch on an already-clean scene is a no-op from the
        // caller's perspective, so it must not leave a dirty bit set behind
        // even though the rollback itself flips bits via `deregister`.
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        scene.register(sphere("s1")).unwrap();
        scene.capture_frame().unwrap();
        assert!(!scene.dirty.any());

        let entities = vec![Entity::Sphere(sphere("s2")), Entity::Sphere(sphere("s2"))];
        assert!(scene.register_many(entities).is_err());
        assert!(scene.get("s2").is_none());
        assert!(!scene.dirty.any());
    }

    #[test]
    fn deregister_many_rollback_restores_clean_dirty_bits() {
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        scene.register(sphere("s1")).unwrap();
        scene.register(sphere("s2")).unwrap();
        scene.capture_frame().unwrap();
        assert!(!scene.dirty.any());

        let names = vec!["s1".to_string(), "nonexistent".to_string()];
        assert!(scene.deregister_many(names).is_err());
        assert!(scene.get("s1").is_some());
        assert!(!scene.dirty.any());
    }

    #[test]
    fn replace_updates_entity_and_marks_category_dirty() {
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        scene.register(sphere("s1")).unwrap();
        scene.capture_frame().unwrap();
        assert!(!scene.dirty.any());

        let moved = Sphere::new(
            "s1".into(),
            Position::new(3., 5., 0.),
            1.0,
            Color::new(0.2, 0., 0.),
            Color::new(0.6, 0., 0.),
            Color::WHITE,
            50.,
            0.0,
        )
        .unwrap();
        scene.replace("s1", moved.clone()).unwrap();
        assert!(scene.dirty.spheres);
        match scene.get("s1").unwrap() {
            EntityRef::Sphere(s) => assert_eq!(*s, moved),
            _ => panic!("expected a sphere"),
        }
    }

    #[test]
    fn replace_rejects_mismatched_entity_kind() {
        let mut scene = Scene::new();
        scene.register(sphere("s1")).unwrap();
        assert!(scene.replace("s1", camera()).is_err());
    }

    #[test]
    fn too_many_spheres_is_a_capture_time_error() {
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        for i in 0..=MAX_SPHERES {
            scene.register(sphere(&format!("s{i}"))).unwrap();
        }
        let err = scene.capture_frame().unwrap_err();
        assert!(err.to_string().contains("512"));
    }

    #[test]
    fn set_eps_rejects_zero() {
        let mut scene = Scene::new();
        assert!(scene.set_eps(0.0).is_err());
    }

    #[test]
    fn set_eps_rejects_above_one_tenth() {
        let mut scene = Scene::new();
        assert!(scene.set_eps(0.11).is_err());
    }

    #[test]
    fn set_eps_accepts_the_inclusive_upper_bound() {
        let mut scene = Scene::new();
        assert!(scene.set_eps(0.1).is_ok());
    }

    #[test]
    fn set_max_reflections_rejects_above_ten() {
        let mut scene = Scene::new();
        assert!(scene.set_max_reflections(11).is_err());
    }

    #[test]
    fn set_max_reflections_accepts_the_inclusive_bounds() {
        let mut scene = Scene::new();
        assert!(scene.set_max_reflections(0).is_ok());
        assert!(scene.set_max_reflections(10).is_ok());
    }

    #[test]
    fn mutating_only_light_restages_only_the_light_buffer() {
        // spec §8 Scenario 5: mutating only the light between two captures
        // must re-upload the light buffer alone; camera/sphere/params
        // buffers stay byte-for-byte the cached copies from the first
        // capture.
        let mut scene = Scene::new();
        scene.register(camera()).unwrap();
        scene.register(light()).unwrap();
        scene.register(sphere("s1")).unwrap();
        scene.capture_frame().unwrap();

        let camera_before = scene.cache.camera.clone();
        let spheres_before = scene.cache.spheres.clone();
        let params_before = scene.cache.params.clone();
        let light_before = scene.cache.light.clone();

        let moved_light = Light::new(
            Position::new(1., 6., 5.),
            Color::new(0.2, 0.2, 0.2),
            Color::WHITE,
            Color::WHITE,
            1.5,
        )
        .unwrap();
        scene.replace(crate::raytracer::world::objects::light::LIGHT_NAME, moved_light).unwrap();
        assert!(scene.dirty.light);
        assert!(!scene.dirty.camera && !scene.dirty.spheres && !scene.dirty.params);

        scene.capture_frame().unwrap();

        assert_eq!(scene.cache.camera, camera_before);
        assert_eq!(scene.cache.spheres, spheres_before);
        assert_eq!(scene.cache.params, params_before);
        assert_ne!(scene.cache.light, light_before);
    }
}
