//! Entity data pool and scene-scoped registry
//!
//! The engine is one explicit context object: the attribute pool (every
//! declared entity's columns), the live-instance registry with its
//! materializer cursors, the scene range tracker, and the shared
//! diagnostic log. Nothing here is global; construct an [`Engine`], pass
//! it around, call [`Engine::release`] when done.
//!
//! Canonical per-frame order:
//! 1. [`Engine::materialize`] - drain newly declared rows into instances,
//! 2. [`Engine::update_scene`] - recompute camera views,
//! 3. [`Engine::draw_scene`] - walk the active scene's ranges and draw.
//!
//! Everything is single-threaded and frame-stepped; no call here blocks,
//! retries, or spans frames.

pub mod column;
pub mod diag;
pub mod instance;
pub mod keymap;
pub mod pool;
pub mod scene;

use crate::render::RenderBackend;
use diag::{Diag, DiagKind, DiagLog};
use instance::{draw_row, InstanceRegistry};
use keymap::generate_unique_name;
use pool::{AttributePool, Category};
use scene::SceneTracker;

pub struct Engine {
    pool: AttributePool,
    instances: InstanceRegistry,
    scenes: SceneTracker,
    diag: DiagLog,
    /// Fallback camera row for scenes with no explicit binding.
    default_camera: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            pool: AttributePool::new(),
            instances: InstanceRegistry::new(),
            scenes: SceneTracker::new(),
            diag: DiagLog::new(),
            default_camera: 0,
        }
    }

    pub fn pool(&self) -> &AttributePool {
        &self.pool
    }

    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    pub fn diag(&self) -> &DiagLog {
        &self.diag
    }

    /// Drain this frame's diagnostics for the app layer to report.
    pub fn take_diagnostics(&mut self) -> Vec<Diag> {
        self.diag.take_all()
    }

    /// A declared row went into `cat`; let the scene tracker account for it.
    fn notify(&mut self, cat: Category) {
        self.scenes.notify_add_object(cat, self.pool.count(cat));
    }

    // =====================================================================
    // Declarations and mutations (thin pool wrappers + scene accounting)
    // =====================================================================

    pub fn add_camera(&mut self, name: &str) {
        if self.pool.add_camera(name, &mut self.diag).is_some() {
            self.notify(Category::Camera);
        }
    }

    pub fn set_camera_pos(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_camera_pos(name, x, y, z, &mut self.diag);
    }

    pub fn set_camera_look(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_camera_look(name, x, y, z, &mut self.diag);
    }

    /// Select the global default camera consulted when the active scene has
    /// no camera binding of its own.
    pub fn use_camera_set(&mut self, name: &str) {
        match self.pool.get_index(Category::Camera, name) {
            Some(row) => self.default_camera = row,
            None => self.diag.push(
                DiagKind::NotFound,
                format!("use_camera_set: no camera '{}'", name),
            ),
        }
    }

    pub fn add_grid_box(&mut self, name: &str) {
        if self.pool.add_grid_box(name, &mut self.diag).is_some() {
            self.notify(Category::GridBox);
        }
    }

    pub fn set_grid_box_pos(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_grid_box_pos(name, x, y, z, &mut self.diag);
    }

    pub fn set_grid_box_size(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_grid_box_size(name, x, y, z, &mut self.diag);
    }

    pub fn set_grid_box_angle(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_grid_box_angle(name, x, y, z, &mut self.diag);
    }

    pub fn set_grid_box_color(&mut self, name: &str, r: f32, g: f32, b: f32, a: f32) {
        self.pool.set_grid_box_color(name, r, g, b, a, &mut self.diag);
    }

    pub fn add_grid_polygon(&mut self, name: &str) {
        if self.pool.add_grid_polygon(name, &mut self.diag).is_some() {
            self.notify(Category::GridPolygon);
        }
    }

    pub fn set_grid_polygon_pos(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_grid_polygon_pos(name, x, y, z, &mut self.diag);
    }

    pub fn set_grid_polygon_size(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_grid_polygon_size(name, x, y, z, &mut self.diag);
    }

    pub fn set_grid_polygon_angle(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_grid_polygon_angle(name, x, y, z, &mut self.diag);
    }

    pub fn set_grid_polygon_color(&mut self, name: &str, r: f32, g: f32, b: f32, a: f32) {
        self.pool.set_grid_polygon_color(name, r, g, b, a, &mut self.diag);
    }

    pub fn set_grid_polygon_sides(&mut self, name: &str, sides: i32) {
        self.pool.set_grid_polygon_sides(name, sides, &mut self.diag);
    }

    pub fn add_sprite_world(&mut self, name: &str, texture: &str) {
        if self.pool.add_sprite_world(name, texture, &mut self.diag).is_some() {
            self.notify(Category::SpriteWorld);
        }
    }

    pub fn set_sprite_world_pos(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_world_pos(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_world_size(&mut self, name: &str, w: f32, h: f32) {
        self.pool.set_sprite_world_size(name, w, h, &mut self.diag);
    }

    pub fn set_sprite_world_angle(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_world_angle(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_world_color(&mut self, name: &str, r: f32, g: f32, b: f32, a: f32) {
        self.pool.set_sprite_world_color(name, r, g, b, a, &mut self.diag);
    }

    pub fn set_sprite_world_billboard(&mut self, name: &str, on: bool) {
        self.pool.set_sprite_world_billboard(name, on, &mut self.diag);
    }

    pub fn set_sprite_world_texture(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_world_texture(name, texture, &mut self.diag);
    }

    pub fn add_sprite_cylinder(&mut self, name: &str, texture: &str) {
        if self.pool.add_sprite_cylinder(name, texture, &mut self.diag).is_some() {
            self.notify(Category::SpriteCylinder);
        }
    }

    pub fn set_sprite_cylinder_pos(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_cylinder_pos(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_cylinder_size(&mut self, name: &str, radius: f32, height: f32) {
        self.pool.set_sprite_cylinder_size(name, radius, height, &mut self.diag);
    }

    pub fn set_sprite_cylinder_angle(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_cylinder_angle(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_cylinder_color(&mut self, name: &str, r: f32, g: f32, b: f32, a: f32) {
        self.pool.set_sprite_cylinder_color(name, r, g, b, a, &mut self.diag);
    }

    pub fn set_sprite_cylinder_segments(&mut self, name: &str, segments: i32) {
        self.pool.set_sprite_cylinder_segments(name, segments, &mut self.diag);
    }

    pub fn set_sprite_cylinder_texture_side(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_cylinder_texture_side(name, texture, &mut self.diag);
    }

    pub fn set_sprite_cylinder_texture_top(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_cylinder_texture_top(name, texture, &mut self.diag);
    }

    pub fn set_sprite_cylinder_texture_bottom(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_cylinder_texture_bottom(name, texture, &mut self.diag);
    }

    pub fn add_sprite_box(&mut self, name: &str, texture: &str) {
        if self.pool.add_sprite_box(name, texture, &mut self.diag).is_some() {
            self.notify(Category::SpriteBox);
        }
    }

    pub fn set_sprite_box_pos(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_box_pos(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_box_size(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_box_size(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_box_angle(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.pool.set_sprite_box_angle(name, x, y, z, &mut self.diag);
    }

    pub fn set_sprite_box_color(&mut self, name: &str, r: f32, g: f32, b: f32, a: f32) {
        self.pool.set_sprite_box_color(name, r, g, b, a, &mut self.diag);
    }

    pub fn set_sprite_box_texture_top(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_box_texture_top(name, texture, &mut self.diag);
    }

    pub fn set_sprite_box_texture_bottom(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_box_texture_bottom(name, texture, &mut self.diag);
    }

    pub fn set_sprite_box_texture_front(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_box_texture_front(name, texture, &mut self.diag);
    }

    pub fn set_sprite_box_texture_rear(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_box_texture_rear(name, texture, &mut self.diag);
    }

    pub fn set_sprite_box_texture_left(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_box_texture_left(name, texture, &mut self.diag);
    }

    pub fn set_sprite_box_texture_right(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_box_texture_right(name, texture, &mut self.diag);
    }

    pub fn add_sprite_screen(&mut self, name: &str, texture: &str) {
        if self.pool.add_sprite_screen(name, texture, &mut self.diag).is_some() {
            self.notify(Category::SpriteScreen);
        }
    }

    pub fn set_sprite_screen_rect(&mut self, name: &str, top: f32, bottom: f32, left: f32, right: f32) {
        self.pool.set_sprite_screen_rect(name, top, bottom, left, right, &mut self.diag);
    }

    pub fn set_sprite_screen_angle(&mut self, name: &str, angle: f32) {
        self.pool.set_sprite_screen_angle(name, angle, &mut self.diag);
    }

    pub fn set_sprite_screen_color(&mut self, name: &str, r: f32, g: f32, b: f32, a: f32) {
        self.pool.set_sprite_screen_color(name, r, g, b, a, &mut self.diag);
    }

    pub fn set_sprite_screen_texture(&mut self, name: &str, texture: &str) {
        self.pool.set_sprite_screen_texture(name, texture, &mut self.diag);
    }

    // =====================================================================
    // Scenes
    // =====================================================================

    pub fn add_scene(&mut self, name: &str) {
        let counts = self.pool.counts();
        self.scenes.add_scene(name, counts, &mut self.diag);
    }

    pub fn scene_end_point(&mut self) {
        let counts = self.pool.counts();
        self.scenes.scene_end_point(counts);
    }

    pub fn change_scene(&mut self, name: &str) {
        self.scenes.change_scene(name, &mut self.diag);
    }

    /// Re-activate a scene and immediately re-apply its camera binding
    /// instead of waiting for the next update pass.
    pub fn init_scene(&mut self, name: &str) {
        if self.scenes.change_scene(name, &mut self.diag) {
            self.instances.update_all(&self.pool, &mut self.diag);
            self.diag.push(DiagKind::Info, format!("init_scene '{}'", name));
        }
    }

    pub fn set_scene_camera(&mut self, scene: &str, camera: &str) {
        let Some(row) = self.pool.get_index(Category::Camera, camera) else {
            self.diag.push(
                DiagKind::NotFound,
                format!("set_scene_camera: no camera '{}'", camera),
            );
            return;
        };
        self.scenes.set_scene_camera(scene, row, &mut self.diag);
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.scenes.current_scene_name()
    }

    /// The `[start, end)` interval a scene owns in one category.
    pub fn scene_range(&self, scene: &str, cat: Category) -> Option<(usize, usize)> {
        let index = self.scenes.scene_index(scene)?;
        Some(self.scenes.range_at(index)?.range(cat))
    }

    /// Remove a scene and its rows from the pool. Every row after the
    /// deleted span shifts down, so this is O(rows after the scene); all
    /// later scenes' intervals are renumbered to match.
    pub fn delete_scene(&mut self, name: &str) {
        let Some(index) = self.scenes.scene_index(name) else {
            self.diag.push(DiagKind::NotFound, format!("delete_scene: no scene '{}'", name));
            return;
        };
        let removed = self.scenes.delete(index);
        for cat in Category::ALL {
            let (start, end) = removed.range(cat);
            if start < end {
                self.pool.remove_range(cat, start, end);
                self.instances.remove_range(cat, start, end);
            }
        }
        // The default camera is a row reference too; follow the compaction
        // or fall back to row zero if its camera went with the scene.
        let (cam_start, cam_end) = removed.range(Category::Camera);
        self.default_camera =
            scene::shift_row(Some(self.default_camera), cam_start, cam_end).unwrap_or(0);
        self.diag.push(DiagKind::Info, format!("deleted scene '{}'", name));
    }

    /// Duplicate a scene's rows at the end of the pool under a new scene
    /// name. Copied rows get fresh names (`name_1`, `name_2`, ...) since
    /// entity names stay unique per category.
    pub fn copy_scene(&mut self, src: &str, dst: &str) {
        let Some(src_index) = self.scenes.scene_index(src) else {
            self.diag.push(DiagKind::NotFound, format!("copy_scene: no scene '{}'", src));
            return;
        };
        if self.scenes.scene_index(dst).is_some() {
            self.diag.push(
                DiagKind::DuplicateName,
                format!("copy_scene: scene '{}' already exists", dst),
            );
            return;
        }
        let source = self.scenes.range_at(src_index).cloned();
        let Some(source) = source else { return };

        let start = self.pool.counts();
        for cat in Category::ALL {
            let (s, e) = source.range(cat);
            for row in s..e {
                let base = match self.pool.names(cat).get_key(row) {
                    Some(key) => key.to_string(),
                    None => continue,
                };
                let fresh = generate_unique_name(self.pool.names(cat), &base);
                self.pool.clone_row(cat, row, &fresh, &mut self.diag);
            }
        }
        let end = self.pool.counts();

        let range = SceneTracker::finalized_range(start, end, source.camera());
        if self.scenes.push_scene(dst, range, &mut self.diag) {
            self.diag.push(DiagKind::Info, format!("copied scene '{}' to '{}'", src, dst));
        }
    }

    // =====================================================================
    // Per-frame passes
    // =====================================================================

    /// Drain newly declared rows into live instances. First frame pass.
    pub fn materialize(&mut self, backend: &mut dyn RenderBackend) {
        self.instances.materialize(&self.pool, backend, &mut self.diag);
    }

    /// Recompute camera views from the pool's pos/look columns.
    pub fn update_scene(&mut self) {
        self.instances.update_all(&self.pool, &mut self.diag);
    }

    /// Walk the active scene's intervals and draw each row, using the
    /// scene's bound camera or the global default. No active scene, no
    /// draw calls.
    pub fn draw_scene(&mut self, backend: &mut dyn RenderBackend) {
        let Some(range) = self.scenes.current_range() else { return };

        let camera_row = range.camera().unwrap_or(self.default_camera);
        if let Some(rig) = self.instances.camera(camera_row) {
            backend.set_camera(rig.view, rig.proj);
        }

        for cat in Category::ALL {
            let (start, end) = range.range(cat);
            for row in start..end.min(self.pool.count(cat)) {
                draw_row(cat, row, &self.pool, &self.instances, backend, &mut self.diag);
            }
        }
    }

    /// Tear the whole context down: live instances, pool storage, scene
    /// ranges. The engine is reusable but empty afterwards.
    pub fn release(&mut self) {
        self.instances.release_all();
        self.pool.release();
        self.scenes.release();
        self.default_camera = 0;
        self.diag.push(DiagKind::Info, "engine released");
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCall, RecordingBackend};
    use macroquad::math::{Mat4, Vec3};

    #[test]
    fn test_scene_range_after_endpoint() {
        let mut engine = Engine::new();
        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();

        assert_eq!(engine.scene_range("S1", Category::GridBox), Some((0, 1)));
    }

    #[test]
    fn test_active_scene_grows_on_late_add() {
        let mut engine = Engine::new();
        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();
        engine.change_scene("S1");
        engine.add_grid_box("B2");

        assert_eq!(engine.scene_range("S1", Category::GridBox), Some((0, 2)));
    }

    #[test]
    fn test_rejected_duplicate_does_not_grow_scene() {
        let mut engine = Engine::new();
        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();
        engine.change_scene("S1");
        engine.add_grid_box("B1");

        assert_eq!(engine.scene_range("S1", Category::GridBox), Some((0, 1)));
        assert_eq!(engine.diag().count_of(DiagKind::DuplicateName), 1);
    }

    #[test]
    fn test_draw_visits_only_active_scene() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();

        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();
        engine.add_scene("S2");
        engine.add_grid_box("B2");
        engine.set_grid_box_pos("B2", 7.0, 0.0, 0.0);
        engine.scene_end_point();

        engine.change_scene("S2");
        engine.materialize(&mut backend);
        engine.update_scene();
        engine.draw_scene(&mut backend);

        assert_eq!(backend.calls.len(), 1);
        match &backend.calls[0] {
            DrawCall::GridBox { pos, .. } => assert_eq!(*pos, Vec3::new(7.0, 0.0, 0.0)),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_no_active_scene_draws_nothing() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();
        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();

        engine.materialize(&mut backend);
        engine.draw_scene(&mut backend);

        assert!(backend.calls.is_empty());
        assert_eq!(engine.current_scene_name(), None);
    }

    #[test]
    fn test_full_camera_and_box_cycle() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();

        engine.add_camera("Main");
        engine.set_camera_pos("Main", 1.0, 2.0, 3.0);
        engine.set_camera_look("Main", 0.0, 0.0, 0.0);
        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.set_grid_box_pos("B1", -2.0, 0.0, 0.0);
        engine.scene_end_point();
        engine.set_scene_camera("S1", "Main");
        engine.change_scene("S1");

        engine.materialize(&mut backend);
        engine.update_scene();
        engine.draw_scene(&mut backend);

        assert_eq!(backend.calls.len(), 1);
        match &backend.calls[0] {
            DrawCall::GridBox { pos, .. } => assert_eq!(*pos, Vec3::new(-2.0, 0.0, 0.0)),
            other => panic!("unexpected call {:?}", other),
        }
        let (view, _proj) = backend.camera.expect("camera should be bound");
        let expected = Mat4::look_at_rh(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(view, expected);
    }

    #[test]
    fn test_set_scene_camera_unknown_camera() {
        let mut engine = Engine::new();
        engine.add_scene("S1");
        engine.scene_end_point();
        engine.set_scene_camera("S1", "Ghost");

        assert_eq!(engine.diag().count_of(DiagKind::NotFound), 1);
    }

    #[test]
    fn test_delete_scene_shifts_rows_and_ranges() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();

        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.add_grid_box("B2");
        engine.scene_end_point();
        engine.add_scene("S2");
        engine.add_grid_box("B3");
        engine.set_grid_box_pos("B3", 5.0, 0.0, 0.0);
        engine.scene_end_point();
        engine.materialize(&mut backend);

        engine.delete_scene("S1");

        assert_eq!(engine.pool().count(Category::GridBox), 1);
        assert_eq!(engine.pool().get_index(Category::GridBox, "B3"), Some(0));
        assert_eq!(engine.scene_range("S2", Category::GridBox), Some((0, 1)));

        // The surviving scene still draws its (shifted) row.
        engine.change_scene("S2");
        engine.update_scene();
        engine.draw_scene(&mut backend);
        assert_eq!(backend.calls.len(), 1);
        match &backend.calls[0] {
            DrawCall::GridBox { pos, .. } => assert_eq!(*pos, Vec3::new(5.0, 0.0, 0.0)),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_delete_scene_follows_camera_bindings() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();

        engine.add_scene("S1");
        engine.add_camera("Cam1");
        engine.scene_end_point();
        engine.add_scene("S2");
        engine.add_camera("Cam2");
        engine.set_camera_pos("Cam2", 0.0, 0.0, -9.0);
        engine.set_camera_look("Cam2", 0.0, 0.0, 0.0);
        engine.add_grid_box("B");
        engine.scene_end_point();
        engine.set_scene_camera("S2", "Cam2");
        engine.use_camera_set("Cam2");

        engine.materialize(&mut backend);
        engine.delete_scene("S1");

        // Cam2 moved from row 1 to row 0; S2 must render through it still.
        engine.change_scene("S2");
        engine.update_scene();
        engine.draw_scene(&mut backend);

        let (view, _proj) = backend.camera.expect("camera should be bound");
        let expected = Mat4::look_at_rh(Vec3::new(0.0, 0.0, -9.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(view, expected);
    }

    #[test]
    fn test_copy_scene_duplicates_rows_with_fresh_names() {
        let mut engine = Engine::new();

        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.set_grid_box_pos("B1", 4.0, 0.0, 0.0);
        engine.scene_end_point();

        engine.copy_scene("S1", "S1copy");

        assert_eq!(engine.pool().count(Category::GridBox), 2);
        assert_eq!(engine.pool().get_index(Category::GridBox, "B1_1"), Some(1));
        assert_eq!(engine.scene_range("S1copy", Category::GridBox), Some((1, 2)));
        assert_eq!(engine.scene_range("S1", Category::GridBox), Some((0, 1)));
    }

    #[test]
    fn test_materializer_catches_up_over_frames() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();

        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();
        engine.change_scene("S1");
        engine.materialize(&mut backend);

        // Declared mid-run while S1 is active: drawable one frame later.
        engine.add_grid_box("B2");
        engine.draw_scene(&mut backend);
        assert_eq!(backend.calls.len(), 1);

        backend.calls.clear();
        engine.materialize(&mut backend);
        engine.draw_scene(&mut backend);
        assert_eq!(backend.calls.len(), 2);
    }

    #[test]
    fn test_release_resets_everything() {
        let mut engine = Engine::new();
        let mut backend = RecordingBackend::new();
        engine.add_camera("cam");
        engine.add_scene("S1");
        engine.add_grid_box("B1");
        engine.scene_end_point();
        engine.materialize(&mut backend);

        engine.release();

        assert_eq!(engine.pool().count(Category::GridBox), 0);
        assert_eq!(engine.instances().slot_count(Category::GridBox), 0);
        assert_eq!(engine.current_scene_name(), None);
    }
}
