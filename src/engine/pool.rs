//! Attribute pool
//!
//! The single source of truth for every declared entity. Attributes live in
//! structure-of-arrays columns, one set per category, all index-aligned:
//! row `i` of a category is one logical entity across its position, size,
//! angle and color columns. Rows are only ever appended; the sole compaction
//! path is whole-scene deletion.
//!
//! Declaration (`add_*`) pushes a default row and registers the entity name;
//! mutation (`set_*`) resolves name to row and overwrites just the columns
//! that setter covers. A name that does not resolve logs `NotFound` and
//! no-ops, it never stops the caller.

use macroquad::math::{vec4, Vec4};

use super::column::Column;
use super::diag::{DiagKind, DiagLog};
use super::keymap::NameRegistry;

/// The closed set of entity kinds.
///
/// There is deliberately no way to register new categories at runtime; every
/// dispatch is a match over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Camera = 0,
    GridBox = 1,
    GridPolygon = 2,
    SpriteWorld = 3,
    SpriteCylinder = 4,
    SpriteBox = 5,
    SpriteScreen = 6,
}

impl Category {
    pub const COUNT: usize = 7;

    /// Declaration and traversal order. Screen sprites come last so they
    /// overlay the world when a scene is drawn front to back.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Camera,
        Category::GridBox,
        Category::GridPolygon,
        Category::SpriteWorld,
        Category::SpriteCylinder,
        Category::SpriteBox,
        Category::SpriteScreen,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Camera => "camera",
            Category::GridBox => "grid box",
            Category::GridPolygon => "grid polygon",
            Category::SpriteWorld => "sprite world",
            Category::SpriteCylinder => "sprite cylinder",
            Category::SpriteBox => "sprite box",
            Category::SpriteScreen => "sprite screen",
        }
    }
}

/// Per-category row counts, used by the scene tracker to snapshot ranges.
pub type CategoryCounts = [usize; Category::COUNT];

// Column sets. Grouping them per category keeps a row's columns next to
// each other in code, so a new attribute can't be forgotten in add/remove.

#[derive(Default)]
pub struct CameraColumns {
    pub pos: Column<Vec4>,
    pub look: Column<Vec4>,
}

#[derive(Default)]
pub struct GridBoxColumns {
    pub pos: Column<Vec4>,
    pub size: Column<Vec4>,
    pub angle: Column<Vec4>,
    pub color: Column<Vec4>,
}

#[derive(Default)]
pub struct GridPolygonColumns {
    pub pos: Column<Vec4>,
    pub size: Column<Vec4>,
    pub angle: Column<Vec4>,
    pub color: Column<Vec4>,
    pub sides: Column<i32>,
}

#[derive(Default)]
pub struct SpriteWorldColumns {
    pub pos: Column<Vec4>,
    pub size: Column<Vec4>,
    pub angle: Column<Vec4>,
    pub color: Column<Vec4>,
    pub billboard: Column<bool>,
    /// Per-row texture path, renameable in place after the row exists.
    pub texture: NameRegistry,
}

#[derive(Default)]
pub struct SpriteCylinderColumns {
    pub pos: Column<Vec4>,
    /// x = radius, y = height.
    pub size: Column<Vec4>,
    pub angle: Column<Vec4>,
    pub color: Column<Vec4>,
    pub segments: Column<i32>,
    pub side_texture: NameRegistry,
    pub top_texture: NameRegistry,
    pub bottom_texture: NameRegistry,
}

/// A textured cuboid with one independently swappable texture per face.
#[derive(Default)]
pub struct SpriteBoxColumns {
    pub pos: Column<Vec4>,
    pub size: Column<Vec4>,
    pub angle: Column<Vec4>,
    pub color: Column<Vec4>,
    pub top_texture: NameRegistry,
    pub bottom_texture: NameRegistry,
    pub front_texture: NameRegistry,
    pub rear_texture: NameRegistry,
    pub left_texture: NameRegistry,
    pub right_texture: NameRegistry,
}

#[derive(Default)]
pub struct SpriteScreenColumns {
    /// x = top, y = bottom, z = left, w = right (screen pixels).
    pub rect: Column<Vec4>,
    pub angle: Column<f32>,
    pub color: Column<Vec4>,
    pub texture: NameRegistry,
}

/// Default segment count for a freshly declared cylinder.
pub const DEFAULT_CYLINDER_SEGMENTS: i32 = 32;
/// Default side count for a freshly declared polygon.
pub const DEFAULT_POLYGON_SIDES: i32 = 4;

pub struct AttributePool {
    pub camera: CameraColumns,
    pub grid_box: GridBoxColumns,
    pub grid_polygon: GridPolygonColumns,
    pub sprite_world: SpriteWorldColumns,
    pub sprite_cylinder: SpriteCylinderColumns,
    pub sprite_box: SpriteBoxColumns,
    pub sprite_screen: SpriteScreenColumns,

    names: [NameRegistry; Category::COUNT],
    counts: CategoryCounts,
}

impl AttributePool {
    pub fn new() -> Self {
        Self {
            camera: CameraColumns::default(),
            grid_box: GridBoxColumns::default(),
            grid_polygon: GridPolygonColumns::default(),
            sprite_world: SpriteWorldColumns::default(),
            sprite_cylinder: SpriteCylinderColumns::default(),
            sprite_box: SpriteBoxColumns::default(),
            sprite_screen: SpriteScreenColumns::default(),
            names: Default::default(),
            counts: [0; Category::COUNT],
        }
    }

    /// Rows declared so far in a category. Consumed by the materializer and
    /// the scene tracker.
    pub fn count(&self, cat: Category) -> usize {
        self.counts[cat.index()]
    }

    /// Snapshot of every category's row count.
    pub fn counts(&self) -> CategoryCounts {
        self.counts
    }

    pub fn names(&self, cat: Category) -> &NameRegistry {
        &self.names[cat.index()]
    }

    pub fn get_index(&self, cat: Category, name: &str) -> Option<usize> {
        self.names[cat.index()].get_index(name)
    }

    /// Resolve a name for mutation; a miss logs `NotFound`.
    fn resolve(&self, cat: Category, name: &str, diag: &mut DiagLog) -> Option<usize> {
        match self.names[cat.index()].get_index(name) {
            Some(i) => Some(i),
            None => {
                diag.push(
                    DiagKind::NotFound,
                    format!("{}: no entry named '{}'", cat.label(), name),
                );
                None
            }
        }
    }

    /// Register the name for a new row; the caller then pushes default
    /// values into every column of the category. Registering first means a
    /// rejected duplicate can never leave columns partially grown.
    fn register(&mut self, cat: Category, name: &str, diag: &mut DiagLog) -> Option<usize> {
        let row = self.names[cat.index()].add(name, diag)?;
        self.counts[cat.index()] += 1;
        Some(row)
    }

    // =====================================================================
    // Camera
    // =====================================================================

    pub fn add_camera(&mut self, name: &str, diag: &mut DiagLog) -> Option<usize> {
        let row = self.register(Category::Camera, name, diag)?;
        self.camera.pos.push(Vec4::ZERO, diag);
        self.camera.look.push(vec4(0.0, 0.0, 1.0, 0.0), diag);
        Some(row)
    }

    pub fn set_camera_pos(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::Camera, name, diag) {
            self.camera.pos.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_camera_look(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::Camera, name, diag) {
            self.camera.look.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    // =====================================================================
    // Grid box
    // =====================================================================

    pub fn add_grid_box(&mut self, name: &str, diag: &mut DiagLog) -> Option<usize> {
        let row = self.register(Category::GridBox, name, diag)?;
        self.grid_box.pos.push(Vec4::ZERO, diag);
        self.grid_box.size.push(Vec4::ONE, diag);
        self.grid_box.angle.push(Vec4::ZERO, diag);
        self.grid_box.color.push(Vec4::ONE, diag);
        Some(row)
    }

    pub fn set_grid_box_pos(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::GridBox, name, diag) {
            self.grid_box.pos.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_grid_box_size(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::GridBox, name, diag) {
            self.grid_box.size.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_grid_box_angle(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::GridBox, name, diag) {
            self.grid_box.angle.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_grid_box_color(
        &mut self,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::GridBox, name, diag) {
            self.grid_box.color.set(i, vec4(r, g, b, a), diag);
        }
    }

    // =====================================================================
    // Grid polygon
    // =====================================================================

    pub fn add_grid_polygon(&mut self, name: &str, diag: &mut DiagLog) -> Option<usize> {
        let row = self.register(Category::GridPolygon, name, diag)?;
        self.grid_polygon.pos.push(Vec4::ZERO, diag);
        self.grid_polygon.size.push(Vec4::ONE, diag);
        self.grid_polygon.angle.push(Vec4::ZERO, diag);
        self.grid_polygon.color.push(Vec4::ZERO, diag);
        self.grid_polygon.sides.push(DEFAULT_POLYGON_SIDES, diag);
        Some(row)
    }

    pub fn set_grid_polygon_pos(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::GridPolygon, name, diag) {
            self.grid_polygon.pos.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_grid_polygon_size(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::GridPolygon, name, diag) {
            self.grid_polygon.size.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_grid_polygon_angle(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::GridPolygon, name, diag) {
            self.grid_polygon.angle.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_grid_polygon_color(
        &mut self,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::GridPolygon, name, diag) {
            self.grid_polygon.color.set(i, vec4(r, g, b, a), diag);
        }
    }

    pub fn set_grid_polygon_sides(&mut self, name: &str, sides: i32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::GridPolygon, name, diag) {
            self.grid_polygon.sides.set(i, sides, diag);
        }
    }

    // =====================================================================
    // Sprite world
    // =====================================================================

    pub fn add_sprite_world(&mut self, name: &str, texture: &str, diag: &mut DiagLog) -> Option<usize> {
        let row = self.register(Category::SpriteWorld, name, diag)?;
        self.sprite_world.pos.push(Vec4::ZERO, diag);
        self.sprite_world.size.push(Vec4::ONE, diag);
        self.sprite_world.angle.push(Vec4::ZERO, diag);
        self.sprite_world.color.push(Vec4::ONE, diag);
        self.sprite_world.billboard.push(false, diag);
        self.sprite_world.texture.push_key(texture);
        Some(row)
    }

    pub fn set_sprite_world_pos(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteWorld, name, diag) {
            self.sprite_world.pos.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_world_size(&mut self, name: &str, w: f32, h: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteWorld, name, diag) {
            self.sprite_world.size.set(i, vec4(w, h, 0.0, 0.0), diag);
        }
    }

    pub fn set_sprite_world_angle(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteWorld, name, diag) {
            self.sprite_world.angle.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_world_color(
        &mut self,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteWorld, name, diag) {
            self.sprite_world.color.set(i, vec4(r, g, b, a), diag);
        }
    }

    pub fn set_sprite_world_billboard(&mut self, name: &str, on: bool, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteWorld, name, diag) {
            self.sprite_world.billboard.set(i, on, diag);
        }
    }

    /// Swap the texture path after the row exists. Takes effect for rows not
    /// yet materialized; live instances keep their resolved handle.
    pub fn set_sprite_world_texture(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteWorld, name, diag) {
            self.sprite_world.texture.set_key(i, texture, diag);
        }
    }

    // =====================================================================
    // Sprite cylinder
    // =====================================================================

    pub fn add_sprite_cylinder(
        &mut self,
        name: &str,
        texture: &str,
        diag: &mut DiagLog,
    ) -> Option<usize> {
        let row = self.register(Category::SpriteCylinder, name, diag)?;
        self.sprite_cylinder.pos.push(Vec4::ZERO, diag);
        self.sprite_cylinder.size.push(vec4(1.0, 1.0, 0.0, 0.0), diag);
        self.sprite_cylinder.angle.push(Vec4::ZERO, diag);
        self.sprite_cylinder.color.push(Vec4::ONE, diag);
        self.sprite_cylinder.segments.push(DEFAULT_CYLINDER_SEGMENTS, diag);
        self.sprite_cylinder.side_texture.push_key(texture);
        self.sprite_cylinder.top_texture.push_key(texture);
        self.sprite_cylinder.bottom_texture.push_key(texture);
        Some(row)
    }

    pub fn set_sprite_cylinder_pos(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.pos.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_cylinder_size(
        &mut self,
        name: &str,
        radius: f32,
        height: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.size.set(i, vec4(radius, height, 0.0, 0.0), diag);
        }
    }

    pub fn set_sprite_cylinder_angle(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.angle.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_cylinder_color(
        &mut self,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.color.set(i, vec4(r, g, b, a), diag);
        }
    }

    pub fn set_sprite_cylinder_segments(&mut self, name: &str, segments: i32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.segments.set(i, segments, diag);
        }
    }

    pub fn set_sprite_cylinder_texture_side(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.side_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_cylinder_texture_top(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.top_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_cylinder_texture_bottom(
        &mut self,
        name: &str,
        texture: &str,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteCylinder, name, diag) {
            self.sprite_cylinder.bottom_texture.set_key(i, texture, diag);
        }
    }

    // =====================================================================
    // Sprite box
    // =====================================================================

    /// All six faces start with the same texture; per-face setters swap
    /// them individually afterwards.
    pub fn add_sprite_box(&mut self, name: &str, texture: &str, diag: &mut DiagLog) -> Option<usize> {
        let row = self.register(Category::SpriteBox, name, diag)?;
        self.sprite_box.pos.push(Vec4::ZERO, diag);
        self.sprite_box.size.push(Vec4::ONE, diag);
        self.sprite_box.angle.push(Vec4::ZERO, diag);
        self.sprite_box.color.push(Vec4::ONE, diag);
        self.sprite_box.top_texture.push_key(texture);
        self.sprite_box.bottom_texture.push_key(texture);
        self.sprite_box.front_texture.push_key(texture);
        self.sprite_box.rear_texture.push_key(texture);
        self.sprite_box.left_texture.push_key(texture);
        self.sprite_box.right_texture.push_key(texture);
        Some(row)
    }

    pub fn set_sprite_box_pos(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.pos.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_box_size(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.size.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_box_angle(&mut self, name: &str, x: f32, y: f32, z: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.angle.set(i, vec4(x, y, z, 0.0), diag);
        }
    }

    pub fn set_sprite_box_color(
        &mut self,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.color.set(i, vec4(r, g, b, a), diag);
        }
    }

    pub fn set_sprite_box_texture_top(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.top_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_box_texture_bottom(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.bottom_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_box_texture_front(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.front_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_box_texture_rear(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.rear_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_box_texture_left(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.left_texture.set_key(i, texture, diag);
        }
    }

    pub fn set_sprite_box_texture_right(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteBox, name, diag) {
            self.sprite_box.right_texture.set_key(i, texture, diag);
        }
    }

    // =====================================================================
    // Sprite screen
    // =====================================================================

    pub fn add_sprite_screen(
        &mut self,
        name: &str,
        texture: &str,
        diag: &mut DiagLog,
    ) -> Option<usize> {
        let row = self.register(Category::SpriteScreen, name, diag)?;
        self.sprite_screen.rect.push(Vec4::ZERO, diag);
        self.sprite_screen.angle.push(0.0, diag);
        self.sprite_screen.color.push(Vec4::ONE, diag);
        self.sprite_screen.texture.push_key(texture);
        Some(row)
    }

    /// Screen-space placement as top/bottom/left/right pixel edges.
    pub fn set_sprite_screen_rect(
        &mut self,
        name: &str,
        top: f32,
        bottom: f32,
        left: f32,
        right: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteScreen, name, diag) {
            self.sprite_screen.rect.set(i, vec4(top, bottom, left, right), diag);
        }
    }

    pub fn set_sprite_screen_angle(&mut self, name: &str, angle: f32, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteScreen, name, diag) {
            self.sprite_screen.angle.set(i, angle, diag);
        }
    }

    pub fn set_sprite_screen_color(
        &mut self,
        name: &str,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        diag: &mut DiagLog,
    ) {
        if let Some(i) = self.resolve(Category::SpriteScreen, name, diag) {
            self.sprite_screen.color.set(i, vec4(r, g, b, a), diag);
        }
    }

    pub fn set_sprite_screen_texture(&mut self, name: &str, texture: &str, diag: &mut DiagLog) {
        if let Some(i) = self.resolve(Category::SpriteScreen, name, diag) {
            self.sprite_screen.texture.set_key(i, texture, diag);
        }
    }

    // =====================================================================
    // Whole-range operations (scene delete / copy)
    // =====================================================================

    /// Physically remove rows `[start, end)` of a category from every
    /// column, renumbering all later rows. O(n) in the rows after `end`.
    pub fn remove_range(&mut self, cat: Category, start: usize, end: usize) {
        let end = end.min(self.counts[cat.index()]);
        if start >= end {
            return;
        }
        match cat {
            Category::Camera => {
                self.camera.pos.remove_range(start, end);
                self.camera.look.remove_range(start, end);
            }
            Category::GridBox => {
                self.grid_box.pos.remove_range(start, end);
                self.grid_box.size.remove_range(start, end);
                self.grid_box.angle.remove_range(start, end);
                self.grid_box.color.remove_range(start, end);
            }
            Category::GridPolygon => {
                self.grid_polygon.pos.remove_range(start, end);
                self.grid_polygon.size.remove_range(start, end);
                self.grid_polygon.angle.remove_range(start, end);
                self.grid_polygon.color.remove_range(start, end);
                self.grid_polygon.sides.remove_range(start, end);
            }
            Category::SpriteWorld => {
                self.sprite_world.pos.remove_range(start, end);
                self.sprite_world.size.remove_range(start, end);
                self.sprite_world.angle.remove_range(start, end);
                self.sprite_world.color.remove_range(start, end);
                self.sprite_world.billboard.remove_range(start, end);
                self.sprite_world.texture.remove_range(start, end);
            }
            Category::SpriteCylinder => {
                self.sprite_cylinder.pos.remove_range(start, end);
                self.sprite_cylinder.size.remove_range(start, end);
                self.sprite_cylinder.angle.remove_range(start, end);
                self.sprite_cylinder.color.remove_range(start, end);
                self.sprite_cylinder.segments.remove_range(start, end);
                self.sprite_cylinder.side_texture.remove_range(start, end);
                self.sprite_cylinder.top_texture.remove_range(start, end);
                self.sprite_cylinder.bottom_texture.remove_range(start, end);
            }
            Category::SpriteBox => {
                self.sprite_box.pos.remove_range(start, end);
                self.sprite_box.size.remove_range(start, end);
                self.sprite_box.angle.remove_range(start, end);
                self.sprite_box.color.remove_range(start, end);
                self.sprite_box.top_texture.remove_range(start, end);
                self.sprite_box.bottom_texture.remove_range(start, end);
                self.sprite_box.front_texture.remove_range(start, end);
                self.sprite_box.rear_texture.remove_range(start, end);
                self.sprite_box.left_texture.remove_range(start, end);
                self.sprite_box.right_texture.remove_range(start, end);
            }
            Category::SpriteScreen => {
                self.sprite_screen.rect.remove_range(start, end);
                self.sprite_screen.angle.remove_range(start, end);
                self.sprite_screen.color.remove_range(start, end);
                self.sprite_screen.texture.remove_range(start, end);
            }
        }
        self.names[cat.index()].remove_range(start, end);
        self.counts[cat.index()] -= end - start;
    }

    /// Append a duplicate of row `src` under `new_name`.
    /// Returns the new row index, or `None` if the name is taken.
    pub fn clone_row(
        &mut self,
        cat: Category,
        src: usize,
        new_name: &str,
        diag: &mut DiagLog,
    ) -> Option<usize> {
        match cat {
            Category::Camera => {
                let pos = self.camera.pos.get(src, diag);
                let look = self.camera.look.get(src, diag);
                let row = self.add_camera(new_name, diag)?;
                self.camera.pos.set(row, pos, diag);
                self.camera.look.set(row, look, diag);
                Some(row)
            }
            Category::GridBox => {
                let pos = self.grid_box.pos.get(src, diag);
                let size = self.grid_box.size.get(src, diag);
                let angle = self.grid_box.angle.get(src, diag);
                let color = self.grid_box.color.get(src, diag);
                let row = self.add_grid_box(new_name, diag)?;
                self.grid_box.pos.set(row, pos, diag);
                self.grid_box.size.set(row, size, diag);
                self.grid_box.angle.set(row, angle, diag);
                self.grid_box.color.set(row, color, diag);
                Some(row)
            }
            Category::GridPolygon => {
                let pos = self.grid_polygon.pos.get(src, diag);
                let size = self.grid_polygon.size.get(src, diag);
                let angle = self.grid_polygon.angle.get(src, diag);
                let color = self.grid_polygon.color.get(src, diag);
                let sides = self.grid_polygon.sides.get(src, diag);
                let row = self.add_grid_polygon(new_name, diag)?;
                self.grid_polygon.pos.set(row, pos, diag);
                self.grid_polygon.size.set(row, size, diag);
                self.grid_polygon.angle.set(row, angle, diag);
                self.grid_polygon.color.set(row, color, diag);
                self.grid_polygon.sides.set(row, sides, diag);
                Some(row)
            }
            Category::SpriteWorld => {
                let pos = self.sprite_world.pos.get(src, diag);
                let size = self.sprite_world.size.get(src, diag);
                let angle = self.sprite_world.angle.get(src, diag);
                let color = self.sprite_world.color.get(src, diag);
                let billboard = self.sprite_world.billboard.get(src, diag);
                let texture = self
                    .sprite_world
                    .texture
                    .get_key(src)
                    .unwrap_or_default()
                    .to_string();
                let row = self.add_sprite_world(new_name, &texture, diag)?;
                self.sprite_world.pos.set(row, pos, diag);
                self.sprite_world.size.set(row, size, diag);
                self.sprite_world.angle.set(row, angle, diag);
                self.sprite_world.color.set(row, color, diag);
                self.sprite_world.billboard.set(row, billboard, diag);
                Some(row)
            }
            Category::SpriteCylinder => {
                let pos = self.sprite_cylinder.pos.get(src, diag);
                let size = self.sprite_cylinder.size.get(src, diag);
                let angle = self.sprite_cylinder.angle.get(src, diag);
                let color = self.sprite_cylinder.color.get(src, diag);
                let segments = self.sprite_cylinder.segments.get(src, diag);
                let side = self
                    .sprite_cylinder
                    .side_texture
                    .get_key(src)
                    .unwrap_or_default()
                    .to_string();
                let top = self
                    .sprite_cylinder
                    .top_texture
                    .get_key(src)
                    .unwrap_or_default()
                    .to_string();
                let bottom = self
                    .sprite_cylinder
                    .bottom_texture
                    .get_key(src)
                    .unwrap_or_default()
                    .to_string();
                let row = self.add_sprite_cylinder(new_name, &side, diag)?;
                self.sprite_cylinder.pos.set(row, pos, diag);
                self.sprite_cylinder.size.set(row, size, diag);
                self.sprite_cylinder.angle.set(row, angle, diag);
                self.sprite_cylinder.color.set(row, color, diag);
                self.sprite_cylinder.segments.set(row, segments, diag);
                self.sprite_cylinder.top_texture.set_key(row, &top, diag);
                self.sprite_cylinder.bottom_texture.set_key(row, &bottom, diag);
                Some(row)
            }
            Category::SpriteBox => {
                let pos = self.sprite_box.pos.get(src, diag);
                let size = self.sprite_box.size.get(src, diag);
                let angle = self.sprite_box.angle.get(src, diag);
                let color = self.sprite_box.color.get(src, diag);
                let faces: Vec<String> = [
                    &self.sprite_box.top_texture,
                    &self.sprite_box.bottom_texture,
                    &self.sprite_box.front_texture,
                    &self.sprite_box.rear_texture,
                    &self.sprite_box.left_texture,
                    &self.sprite_box.right_texture,
                ]
                .iter()
                .map(|reg| reg.get_key(src).unwrap_or_default().to_string())
                .collect();
                let row = self.add_sprite_box(new_name, &faces[0], diag)?;
                self.sprite_box.pos.set(row, pos, diag);
                self.sprite_box.size.set(row, size, diag);
                self.sprite_box.angle.set(row, angle, diag);
                self.sprite_box.color.set(row, color, diag);
                self.sprite_box.bottom_texture.set_key(row, &faces[1], diag);
                self.sprite_box.front_texture.set_key(row, &faces[2], diag);
                self.sprite_box.rear_texture.set_key(row, &faces[3], diag);
                self.sprite_box.left_texture.set_key(row, &faces[4], diag);
                self.sprite_box.right_texture.set_key(row, &faces[5], diag);
                Some(row)
            }
            Category::SpriteScreen => {
                let rect = self.sprite_screen.rect.get(src, diag);
                let angle = self.sprite_screen.angle.get(src, diag);
                let color = self.sprite_screen.color.get(src, diag);
                let texture = self
                    .sprite_screen
                    .texture
                    .get_key(src)
                    .unwrap_or_default()
                    .to_string();
                let row = self.add_sprite_screen(new_name, &texture, diag)?;
                self.sprite_screen.rect.set(row, rect, diag);
                self.sprite_screen.angle.set(row, angle, diag);
                self.sprite_screen.color.set(row, color, diag);
                Some(row)
            }
        }
    }

    /// Release every column and registry; the pool is empty afterwards.
    pub fn release(&mut self) {
        self.camera.pos.free();
        self.camera.look.free();
        self.grid_box.pos.free();
        self.grid_box.size.free();
        self.grid_box.angle.free();
        self.grid_box.color.free();
        self.grid_polygon.pos.free();
        self.grid_polygon.size.free();
        self.grid_polygon.angle.free();
        self.grid_polygon.color.free();
        self.grid_polygon.sides.free();
        self.sprite_world.pos.free();
        self.sprite_world.size.free();
        self.sprite_world.angle.free();
        self.sprite_world.color.free();
        self.sprite_world.billboard.free();
        self.sprite_world.texture.free();
        self.sprite_cylinder.pos.free();
        self.sprite_cylinder.size.free();
        self.sprite_cylinder.angle.free();
        self.sprite_cylinder.color.free();
        self.sprite_cylinder.segments.free();
        self.sprite_cylinder.side_texture.free();
        self.sprite_cylinder.top_texture.free();
        self.sprite_cylinder.bottom_texture.free();
        self.sprite_box.pos.free();
        self.sprite_box.size.free();
        self.sprite_box.angle.free();
        self.sprite_box.color.free();
        self.sprite_box.top_texture.free();
        self.sprite_box.bottom_texture.free();
        self.sprite_box.front_texture.free();
        self.sprite_box.rear_texture.free();
        self.sprite_box.left_texture.free();
        self.sprite_box.right_texture.free();
        self.sprite_screen.rect.free();
        self.sprite_screen.angle.free();
        self.sprite_screen.color.free();
        self.sprite_screen.texture.free();
        for reg in &mut self.names {
            reg.free();
        }
        self.counts = [0; Category::COUNT];
    }
}

impl Default for AttributePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_rows() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();

        assert_eq!(pool.add_grid_box("a", &mut diag), Some(0));
        assert_eq!(pool.add_grid_box("b", &mut diag), Some(1));
        assert_eq!(pool.get_index(Category::GridBox, "b"), Some(1));
        assert_eq!(pool.count(Category::GridBox), 2);
        // Other categories untouched.
        assert_eq!(pool.count(Category::Camera), 0);
    }

    #[test]
    fn test_duplicate_add_keeps_first_row() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();

        pool.add_grid_box("a", &mut diag);
        pool.set_grid_box_pos("a", 1.0, 2.0, 3.0, &mut diag);

        assert_eq!(pool.add_grid_box("a", &mut diag), None);
        assert_eq!(pool.count(Category::GridBox), 1);
        assert_eq!(pool.grid_box.pos.get(0, &mut diag), vec4(1.0, 2.0, 3.0, 0.0));
        assert_eq!(diag.count_of(DiagKind::DuplicateName), 1);
        // Columns stayed aligned with the row count.
        assert_eq!(pool.grid_box.pos.len(), 1);
        assert_eq!(pool.grid_box.color.len(), 1);
    }

    #[test]
    fn test_set_unknown_name_is_noop_with_one_diag() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_grid_box("a", &mut diag);

        pool.set_grid_box_pos("ghost", 9.0, 9.0, 9.0, &mut diag);

        assert_eq!(pool.grid_box.pos.get(0, &mut diag), Vec4::ZERO);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.count_of(DiagKind::NotFound), 1);
    }

    #[test]
    fn test_defaults_match_declaration_contract() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();

        pool.add_camera("cam", &mut diag);
        assert_eq!(pool.camera.look.get(0, &mut diag), vec4(0.0, 0.0, 1.0, 0.0));

        pool.add_grid_polygon("poly", &mut diag);
        assert_eq!(pool.grid_polygon.sides.get(0, &mut diag), DEFAULT_POLYGON_SIDES);
        assert_eq!(pool.grid_polygon.size.get(0, &mut diag), Vec4::ONE);

        pool.add_sprite_cylinder("cyl", "drum.png", &mut diag);
        assert_eq!(
            pool.sprite_cylinder.segments.get(0, &mut diag),
            DEFAULT_CYLINDER_SEGMENTS
        );
        assert_eq!(pool.sprite_cylinder.side_texture.get_key(0), Some("drum.png"));
        assert_eq!(pool.sprite_cylinder.top_texture.get_key(0), Some("drum.png"));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_texture_path_renamed_in_place() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_sprite_world("s", "old.png", &mut diag);

        pool.set_sprite_world_texture("s", "new.png", &mut diag);

        assert_eq!(pool.sprite_world.texture.get_key(0), Some("new.png"));
        // The row itself did not move.
        assert_eq!(pool.get_index(Category::SpriteWorld, "s"), Some(0));
    }

    #[test]
    fn test_sprite_box_faces_start_shared_and_rename_per_face() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_sprite_box("crate", "wood.png", &mut diag);

        assert_eq!(pool.sprite_box.top_texture.get_key(0), Some("wood.png"));
        assert_eq!(pool.sprite_box.rear_texture.get_key(0), Some("wood.png"));

        pool.set_sprite_box_texture_top("crate", "lid.png", &mut diag);
        assert_eq!(pool.sprite_box.top_texture.get_key(0), Some("lid.png"));
        // Only the named face changed.
        assert_eq!(pool.sprite_box.front_texture.get_key(0), Some("wood.png"));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_remove_range_compacts_all_columns() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        for (name, x) in [("a", 0.0), ("b", 1.0), ("c", 2.0), ("d", 3.0)] {
            pool.add_grid_box(name, &mut diag);
            pool.set_grid_box_pos(name, x, 0.0, 0.0, &mut diag);
        }

        pool.remove_range(Category::GridBox, 1, 3);

        assert_eq!(pool.count(Category::GridBox), 2);
        assert_eq!(pool.get_index(Category::GridBox, "a"), Some(0));
        assert_eq!(pool.get_index(Category::GridBox, "d"), Some(1));
        assert_eq!(pool.get_index(Category::GridBox, "b"), None);
        assert_eq!(pool.grid_box.pos.get(1, &mut diag), vec4(3.0, 0.0, 0.0, 0.0));
        assert_eq!(pool.grid_box.pos.len(), 2);
        assert_eq!(pool.grid_box.color.len(), 2);
    }

    #[test]
    fn test_clone_row_copies_values() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_sprite_world("s", "tex.png", &mut diag);
        pool.set_sprite_world_pos("s", 4.0, 5.0, 6.0, &mut diag);
        pool.set_sprite_world_billboard("s", true, &mut diag);

        let row = pool.clone_row(Category::SpriteWorld, 0, "s_1", &mut diag);

        assert_eq!(row, Some(1));
        assert_eq!(pool.sprite_world.pos.get(1, &mut diag), vec4(4.0, 5.0, 6.0, 0.0));
        assert!(pool.sprite_world.billboard.get(1, &mut diag));
        assert_eq!(pool.sprite_world.texture.get_key(1), Some("tex.png"));
    }

    #[test]
    fn test_release_empties_everything() {
        let mut diag = DiagLog::new();
        let mut pool = AttributePool::new();
        pool.add_camera("cam", &mut diag);
        pool.add_grid_box("box", &mut diag);

        pool.release();

        for cat in Category::ALL {
            assert_eq!(pool.count(cat), 0);
        }
        assert_eq!(pool.get_index(Category::Camera, "cam"), None);
    }
}
