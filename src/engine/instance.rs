//! Live instances and the incremental materializer
//!
//! Declaring a row in the pool does not create anything drawable. Once per
//! frame the materializer walks each category from its cursor to the current
//! row count and constructs one live instance per new row, resolving any
//! texture-path references through the render backend. Slots stay aligned
//! with pool rows, so a row that fails to materialize leaves a `None` hole
//! (the same `Vec<Option<T>>` shape the rest of the codebase uses for
//! sparse per-row data).
//!
//! Materialization is exactly-once and in strict row order. On failure the
//! cursor still advances: the row is logged and permanently skipped, never
//! retried. Downstream code relies on the cursor moving unconditionally, so
//! do not turn this into a retry loop.

use macroquad::math::{Mat4, Vec3};

use super::diag::{DiagKind, DiagLog};
use super::pool::{AttributePool, Category};
use crate::render::{RenderBackend, TextureHandle};

/// Vertical field of view for freshly materialized cameras, degrees.
const CAMERA_FOV_Y: f32 = 45.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 100.0;

/// A camera that has been materialized: view recomputed every frame from
/// the pool's pos/look columns, projection fixed at materialization.
pub struct LiveCamera {
    pub view: Mat4,
    pub proj: Mat4,
}

pub struct LiveGridBox;

pub struct LiveGridPolygon;

pub struct LiveSpriteWorld {
    pub texture: TextureHandle,
}

pub struct LiveSpriteScreen {
    pub texture: TextureHandle,
}

pub struct LiveSpriteCylinder {
    pub side: TextureHandle,
    /// Cap textures are optional; a cylinder with no caps is still drawable.
    pub top: Option<TextureHandle>,
    pub bottom: Option<TextureHandle>,
}

/// Every face resolves independently; a face whose texture is missing is
/// simply not drawn, the box itself stays live.
pub struct LiveSpriteBox {
    pub top: Option<TextureHandle>,
    pub bottom: Option<TextureHandle>,
    pub front: Option<TextureHandle>,
    pub rear: Option<TextureHandle>,
    pub left: Option<TextureHandle>,
    pub right: Option<TextureHandle>,
}

/// Per-category ordered lists of live instances, slot `i` materialized from
/// pool row `i`, plus the materializer cursors.
#[derive(Default)]
pub struct InstanceRegistry {
    pub cameras: Vec<Option<LiveCamera>>,
    pub grid_boxes: Vec<Option<LiveGridBox>>,
    pub grid_polygons: Vec<Option<LiveGridPolygon>>,
    pub sprite_worlds: Vec<Option<LiveSpriteWorld>>,
    pub sprite_cylinders: Vec<Option<LiveSpriteCylinder>>,
    pub sprite_boxes: Vec<Option<LiveSpriteBox>>,
    pub sprite_screens: Vec<Option<LiveSpriteScreen>>,

    /// First pool row not yet handed to the materializer, per category.
    cursors: [usize; Category::COUNT],
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots allocated for a category (materialized or skipped).
    pub fn slot_count(&self, cat: Category) -> usize {
        match cat {
            Category::Camera => self.cameras.len(),
            Category::GridBox => self.grid_boxes.len(),
            Category::GridPolygon => self.grid_polygons.len(),
            Category::SpriteWorld => self.sprite_worlds.len(),
            Category::SpriteCylinder => self.sprite_cylinders.len(),
            Category::SpriteBox => self.sprite_boxes.len(),
            Category::SpriteScreen => self.sprite_screens.len(),
        }
    }

    /// Live (successfully materialized) instances in a category.
    pub fn live_count(&self, cat: Category) -> usize {
        match cat {
            Category::Camera => self.cameras.iter().filter(|s| s.is_some()).count(),
            Category::GridBox => self.grid_boxes.iter().filter(|s| s.is_some()).count(),
            Category::GridPolygon => self.grid_polygons.iter().filter(|s| s.is_some()).count(),
            Category::SpriteWorld => self.sprite_worlds.iter().filter(|s| s.is_some()).count(),
            Category::SpriteCylinder => self.sprite_cylinders.iter().filter(|s| s.is_some()).count(),
            Category::SpriteBox => self.sprite_boxes.iter().filter(|s| s.is_some()).count(),
            Category::SpriteScreen => self.sprite_screens.iter().filter(|s| s.is_some()).count(),
        }
    }

    pub fn camera(&self, index: usize) -> Option<&LiveCamera> {
        self.cameras.get(index).and_then(|s| s.as_ref())
    }

    pub fn camera_mut(&mut self, index: usize) -> Option<&mut LiveCamera> {
        self.cameras.get_mut(index).and_then(|s| s.as_mut())
    }

    pub fn grid_box(&self, index: usize) -> Option<&LiveGridBox> {
        self.grid_boxes.get(index).and_then(|s| s.as_ref())
    }

    pub fn grid_polygon(&self, index: usize) -> Option<&LiveGridPolygon> {
        self.grid_polygons.get(index).and_then(|s| s.as_ref())
    }

    pub fn sprite_world(&self, index: usize) -> Option<&LiveSpriteWorld> {
        self.sprite_worlds.get(index).and_then(|s| s.as_ref())
    }

    pub fn sprite_cylinder(&self, index: usize) -> Option<&LiveSpriteCylinder> {
        self.sprite_cylinders.get(index).and_then(|s| s.as_ref())
    }

    pub fn sprite_box(&self, index: usize) -> Option<&LiveSpriteBox> {
        self.sprite_boxes.get(index).and_then(|s| s.as_ref())
    }

    pub fn sprite_screen(&self, index: usize) -> Option<&LiveSpriteScreen> {
        self.sprite_screens.get(index).and_then(|s| s.as_ref())
    }

    /// Drain newly declared rows into live instances, one category at a
    /// time, in strict row order. Call once per frame before updating.
    pub fn materialize(
        &mut self,
        pool: &AttributePool,
        backend: &mut dyn RenderBackend,
        diag: &mut DiagLog,
    ) {
        for cat in Category::ALL {
            while self.cursors[cat.index()] < pool.count(cat) {
                let row = self.cursors[cat.index()];
                self.materialize_row(cat, row, pool, backend, diag);
                // The cursor advances whether or not the row succeeded.
                self.cursors[cat.index()] += 1;
            }
        }
    }

    fn materialize_row(
        &mut self,
        cat: Category,
        row: usize,
        pool: &AttributePool,
        backend: &mut dyn RenderBackend,
        diag: &mut DiagLog,
    ) {
        match cat {
            Category::Camera => {
                let (w, h) = backend.screen_size();
                let proj = Mat4::perspective_rh_gl(
                    CAMERA_FOV_Y.to_radians(),
                    w / h.max(1.0),
                    CAMERA_NEAR,
                    CAMERA_FAR,
                );
                self.cameras.push(Some(LiveCamera {
                    view: Mat4::IDENTITY,
                    proj,
                }));
            }
            Category::GridBox => self.grid_boxes.push(Some(LiveGridBox)),
            Category::GridPolygon => self.grid_polygons.push(Some(LiveGridPolygon)),
            Category::SpriteWorld => {
                let slot = resolve_required(
                    pool.sprite_world.texture.get_key(row),
                    cat,
                    row,
                    backend,
                    diag,
                )
                .map(|texture| LiveSpriteWorld { texture });
                self.sprite_worlds.push(slot);
            }
            Category::SpriteCylinder => {
                let side = resolve_required(
                    pool.sprite_cylinder.side_texture.get_key(row),
                    cat,
                    row,
                    backend,
                    diag,
                );
                let slot = side.map(|side| LiveSpriteCylinder {
                    side,
                    // Missing caps are tolerated, only the side is required.
                    top: pool
                        .sprite_cylinder
                        .top_texture
                        .get_key(row)
                        .and_then(|p| backend.resolve_texture(p)),
                    bottom: pool
                        .sprite_cylinder
                        .bottom_texture
                        .get_key(row)
                        .and_then(|p| backend.resolve_texture(p)),
                });
                self.sprite_cylinders.push(slot);
            }
            Category::SpriteBox => {
                let b = &pool.sprite_box;
                self.sprite_boxes.push(Some(LiveSpriteBox {
                    top: resolve_face(b.top_texture.get_key(row), "top", row, backend, diag),
                    bottom: resolve_face(b.bottom_texture.get_key(row), "bottom", row, backend, diag),
                    front: resolve_face(b.front_texture.get_key(row), "front", row, backend, diag),
                    rear: resolve_face(b.rear_texture.get_key(row), "rear", row, backend, diag),
                    left: resolve_face(b.left_texture.get_key(row), "left", row, backend, diag),
                    right: resolve_face(b.right_texture.get_key(row), "right", row, backend, diag),
                }));
            }
            Category::SpriteScreen => {
                let slot = resolve_required(
                    pool.sprite_screen.texture.get_key(row),
                    cat,
                    row,
                    backend,
                    diag,
                )
                .map(|texture| LiveSpriteScreen { texture });
                self.sprite_screens.push(slot);
            }
        }
    }

    /// Recompute every live camera's view matrix from the pool columns.
    /// Scene-independent fan-out; runs before scene traversal each frame.
    pub fn update_all(&mut self, pool: &AttributePool, diag: &mut DiagLog) {
        for (i, slot) in self.cameras.iter_mut().enumerate() {
            if let Some(cam) = slot {
                let pos = pool.camera.pos.get(i, diag);
                let look = pool.camera.look.get(i, diag);
                let eye = Vec3::new(pos.x, pos.y, pos.z);
                let target = Vec3::new(look.x, look.y, look.z);
                // A camera staring at its own position has no view matrix.
                if eye != target {
                    cam.view = Mat4::look_at_rh(eye, target, Vec3::Y);
                }
            }
        }
    }

    /// Draw every live instance of every category, ignoring scene ranges.
    /// Scene-filtered drawing goes through the scene tracker instead.
    pub fn draw_all(
        &self,
        pool: &AttributePool,
        backend: &mut dyn RenderBackend,
        diag: &mut DiagLog,
    ) {
        for cat in Category::ALL {
            for row in 0..self.slot_count(cat) {
                draw_row(cat, row, pool, self, backend, diag);
            }
        }
    }

    /// Drop all live instances and reset the cursors. The next materialize
    /// pass would start from row zero, so only call this at pool teardown.
    pub fn release_all(&mut self) {
        self.cameras.clear();
        self.grid_boxes.clear();
        self.grid_polygons.clear();
        self.sprite_worlds.clear();
        self.sprite_cylinders.clear();
        self.sprite_boxes.clear();
        self.sprite_screens.clear();
        self.cursors = [0; Category::COUNT];
    }

    /// Remove slots `[start, end)` after the matching pool rows were
    /// compacted away, keeping slot/row alignment and cursor consistency.
    pub fn remove_range(&mut self, cat: Category, start: usize, end: usize) {
        let len = self.slot_count(cat);
        let end_slots = end.min(len);
        if start < end_slots {
            match cat {
                Category::Camera => drop(self.cameras.drain(start..end_slots)),
                Category::GridBox => drop(self.grid_boxes.drain(start..end_slots)),
                Category::GridPolygon => drop(self.grid_polygons.drain(start..end_slots)),
                Category::SpriteWorld => drop(self.sprite_worlds.drain(start..end_slots)),
                Category::SpriteCylinder => drop(self.sprite_cylinders.drain(start..end_slots)),
                Category::SpriteBox => drop(self.sprite_boxes.drain(start..end_slots)),
                Category::SpriteScreen => drop(self.sprite_screens.drain(start..end_slots)),
            }
        }
        let cursor = &mut self.cursors[cat.index()];
        if *cursor >= end {
            *cursor -= end - start;
        } else if *cursor > start {
            *cursor = start;
        }
    }
}

fn resolve_required(
    path: Option<&str>,
    cat: Category,
    row: usize,
    backend: &mut dyn RenderBackend,
    diag: &mut DiagLog,
) -> Option<TextureHandle> {
    let Some(path) = path else {
        diag.push(
            DiagKind::MaterializationFailure,
            format!("{} row {}: no texture path", cat.label(), row),
        );
        return None;
    };
    match backend.resolve_texture(path) {
        Some(handle) => Some(handle),
        None => {
            diag.push(
                DiagKind::MaterializationFailure,
                format!("{} row {}: texture '{}' did not resolve", cat.label(), row, path),
            );
            None
        }
    }
}

/// Like `resolve_required`, but for one face of a sprite box: the failure
/// is logged with the face name and only that face goes missing.
fn resolve_face(
    path: Option<&str>,
    face: &str,
    row: usize,
    backend: &mut dyn RenderBackend,
    diag: &mut DiagLog,
) -> Option<TextureHandle> {
    let path = path?;
    match backend.resolve_texture(path) {
        Some(handle) => Some(handle),
        None => {
            diag.push(
                DiagKind::MaterializationFailure,
                format!(
                    "{} row {}: {} texture '{}' did not resolve",
                    Category::SpriteBox.label(),
                    row,
                    face,
                    path
                ),
            );
            None
        }
    }
}

/// Emit the draw call for one row, pulling current attribute values from
/// the pool and the resolved handles from the live instance. Rows with no
/// live instance (skipped or not yet materialized) draw nothing; camera
/// rows are not drawable.
pub fn draw_row(
    cat: Category,
    row: usize,
    pool: &AttributePool,
    instances: &InstanceRegistry,
    backend: &mut dyn RenderBackend,
    diag: &mut DiagLog,
) {
    use crate::render::DrawCall;

    match cat {
        Category::Camera => {}
        Category::GridBox => {
            if instances.grid_box(row).is_some() {
                backend.draw(DrawCall::GridBox {
                    pos: pool.grid_box.pos.get(row, diag).truncate(),
                    size: pool.grid_box.size.get(row, diag).truncate(),
                    angle: pool.grid_box.angle.get(row, diag).truncate(),
                    color: pool.grid_box.color.get(row, diag),
                });
            }
        }
        Category::GridPolygon => {
            if instances.grid_polygon(row).is_some() {
                backend.draw(DrawCall::GridPolygon {
                    pos: pool.grid_polygon.pos.get(row, diag).truncate(),
                    size: pool.grid_polygon.size.get(row, diag).truncate(),
                    angle: pool.grid_polygon.angle.get(row, diag).truncate(),
                    color: pool.grid_polygon.color.get(row, diag),
                    sides: pool.grid_polygon.sides.get(row, diag),
                });
            }
        }
        Category::SpriteWorld => {
            if let Some(live) = instances.sprite_world(row) {
                let size = pool.sprite_world.size.get(row, diag);
                backend.draw(DrawCall::SpriteWorld {
                    pos: pool.sprite_world.pos.get(row, diag).truncate(),
                    size: macroquad::math::vec2(size.x, size.y),
                    angle: pool.sprite_world.angle.get(row, diag).truncate(),
                    color: pool.sprite_world.color.get(row, diag),
                    texture: live.texture,
                    billboard: pool.sprite_world.billboard.get(row, diag),
                });
            }
        }
        Category::SpriteCylinder => {
            if let Some(live) = instances.sprite_cylinder(row) {
                let size = pool.sprite_cylinder.size.get(row, diag);
                backend.draw(DrawCall::SpriteCylinder {
                    pos: pool.sprite_cylinder.pos.get(row, diag).truncate(),
                    radius: size.x,
                    height: size.y,
                    angle: pool.sprite_cylinder.angle.get(row, diag).truncate(),
                    color: pool.sprite_cylinder.color.get(row, diag),
                    segments: pool.sprite_cylinder.segments.get(row, diag),
                    side: live.side,
                    top: live.top,
                    bottom: live.bottom,
                });
            }
        }
        Category::SpriteBox => {
            if let Some(live) = instances.sprite_box(row) {
                backend.draw(DrawCall::SpriteBox {
                    pos: pool.sprite_box.pos.get(row, diag).truncate(),
                    size: pool.sprite_box.size.get(row, diag).truncate(),
                    angle: pool.sprite_box.angle.get(row, diag).truncate(),
                    color: pool.sprite_box.color.get(row, diag),
                    top: live.top,
                    bottom: live.bottom,
                    front: live.front,
                    rear: live.rear,
                    left: live.left,
                    right: live.right,
                });
            }
        }
        Category::SpriteScreen => {
            if let Some(live) = instances.sprite_screen(row) {
                backend.draw(DrawCall::SpriteScreen {
                    rect: pool.sprite_screen.rect.get(row, diag),
                    angle: pool.sprite_screen.angle.get(row, diag),
                    color: pool.sprite_screen.color.get(row, diag),
                    texture: live.texture,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;

    fn pool_with(entries: &[(&str, &str)]) -> (AttributePool, DiagLog) {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        for (kind, name) in entries {
            match *kind {
                "camera" => pool.add_camera(name, &mut diag),
                "box" => pool.add_grid_box(name, &mut diag),
                "poly" => pool.add_grid_polygon(name, &mut diag),
                "world" => pool.add_sprite_world(name, "tex.png", &mut diag),
                _ => panic!("unknown kind"),
            };
        }
        (pool, diag)
    }

    #[test]
    fn test_materialize_matches_pool_counts() {
        let (mut pool, mut diag) = pool_with(&[
            ("camera", "cam"),
            ("box", "b1"),
            ("box", "b2"),
            ("poly", "p1"),
            ("world", "s1"),
        ]);
        let mut backend = RecordingBackend::new();
        let mut reg = InstanceRegistry::new();

        reg.materialize(&pool, &mut backend, &mut diag);

        for cat in Category::ALL {
            assert_eq!(reg.live_count(cat), pool.count(cat), "{:?}", cat);
        }
        assert_eq!(diag.count_of(DiagKind::MaterializationFailure), 0);

        // New rows declared later are drained by the next frame only.
        pool.add_grid_box("b3", &mut diag);
        assert_eq!(reg.live_count(Category::GridBox), 2);
        reg.materialize(&pool, &mut backend, &mut diag);
        assert_eq!(reg.live_count(Category::GridBox), 3);
    }

    #[test]
    fn test_materialize_is_exactly_once() {
        let (pool, mut diag) = pool_with(&[("box", "b1")]);
        let mut backend = RecordingBackend::new();
        let mut reg = InstanceRegistry::new();

        reg.materialize(&pool, &mut backend, &mut diag);
        reg.materialize(&pool, &mut backend, &mut diag);
        reg.materialize(&pool, &mut backend, &mut diag);

        assert_eq!(reg.slot_count(Category::GridBox), 1);
    }

    #[test]
    fn test_failed_row_is_skipped_and_never_retried() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_sprite_world("ok", "tex.png", &mut diag);
        pool.add_sprite_world("bad", "missing.png", &mut diag);
        pool.add_sprite_world("ok2", "tex.png", &mut diag);

        let mut backend = RecordingBackend::new();
        backend.missing.insert("missing.png".to_string());
        let mut reg = InstanceRegistry::new();

        reg.materialize(&pool, &mut backend, &mut diag);

        // Slots stay row-aligned, the failed row is a hole.
        assert_eq!(reg.slot_count(Category::SpriteWorld), 3);
        assert_eq!(reg.live_count(Category::SpriteWorld), 2);
        assert!(reg.sprite_world(1).is_none());
        assert!(reg.sprite_world(2).is_some());
        assert_eq!(diag.count_of(DiagKind::MaterializationFailure), 1);

        // The texture appearing later does not resurrect the row.
        backend.missing.clear();
        reg.materialize(&pool, &mut backend, &mut diag);
        assert!(reg.sprite_world(1).is_none());
        assert_eq!(diag.count_of(DiagKind::MaterializationFailure), 1);
    }

    #[test]
    fn test_sprite_box_stays_live_with_missing_face() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_sprite_box("crate", "wood.png", &mut diag);
        pool.set_sprite_box_texture_top("crate", "gone.png", &mut diag);

        let mut backend = RecordingBackend::new();
        backend.missing.insert("gone.png".to_string());
        let mut reg = InstanceRegistry::new();
        reg.materialize(&pool, &mut backend, &mut diag);

        let live = reg.sprite_box(0).expect("box should materialize");
        assert!(live.top.is_none());
        assert!(live.front.is_some());
        assert_eq!(diag.count_of(DiagKind::MaterializationFailure), 1);

        // The box still draws; the dead face is the backend's to skip.
        reg.draw_all(&pool, &mut backend, &mut diag);
        assert_eq!(backend.calls.len(), 1);
        match &backend.calls[0] {
            crate::render::DrawCall::SpriteBox { top, rear, .. } => {
                assert!(top.is_none());
                assert!(rear.is_some());
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_update_all_recomputes_camera_views() {
        let (pool, mut diag) = pool_with(&[("camera", "cam")]);
        let mut backend = RecordingBackend::new();
        let mut reg = InstanceRegistry::new();
        reg.materialize(&pool, &mut backend, &mut diag);

        let before = reg.camera(0).unwrap().view;
        let mut pool = pool;
        pool.set_camera_pos("cam", 1.0, 2.0, 3.0, &mut diag);
        pool.set_camera_look("cam", 0.0, 0.0, 0.0, &mut diag);
        reg.update_all(&pool, &mut diag);

        let after = reg.camera(0).unwrap().view;
        assert_ne!(before, after);
        let expected = Mat4::look_at_rh(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
        );
        assert_eq!(after, expected);
    }

    #[test]
    fn test_draw_all_ignores_scenes() {
        let (pool, mut diag) = pool_with(&[("box", "b1"), ("box", "b2"), ("poly", "p1")]);
        let mut backend = RecordingBackend::new();
        let mut reg = InstanceRegistry::new();
        reg.materialize(&pool, &mut backend, &mut diag);

        reg.draw_all(&pool, &mut backend, &mut diag);

        assert_eq!(backend.calls.len(), 3);
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let reg = InstanceRegistry::new();
        assert!(reg.camera(0).is_none());
        assert!(reg.grid_box(17).is_none());
    }

    #[test]
    fn test_remove_range_keeps_cursor_consistent() {
        let (pool, mut diag) = pool_with(&[("box", "a"), ("box", "b"), ("box", "c")]);
        let mut backend = RecordingBackend::new();
        let mut reg = InstanceRegistry::new();
        reg.materialize(&pool, &mut backend, &mut diag);

        let mut pool = pool;
        pool.remove_range(Category::GridBox, 0, 2);
        reg.remove_range(Category::GridBox, 0, 2);

        assert_eq!(reg.slot_count(Category::GridBox), 1);
        // Cursor fell back with the rows; nothing new to materialize.
        reg.materialize(&pool, &mut backend, &mut diag);
        assert_eq!(reg.slot_count(Category::GridBox), 1);
    }
}
