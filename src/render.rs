//! Render backend seam
//!
//! The engine core never talks to the GPU directly; it emits [`DrawCall`]s
//! through the [`RenderBackend`] trait and resolves texture paths to opaque
//! handles the same way. [`MacroquadBackend`] is the real implementation,
//! tests use [`RecordingBackend`] so nothing here needs a window.

use std::collections::HashMap;

use macroquad::camera::{set_camera, set_default_camera, Camera};
use macroquad::color::Color;
use macroquad::math::{vec2, vec3, Mat4, Vec2, Vec3, Vec4};
use macroquad::models::{draw_line_3d, draw_mesh, Mesh, Vertex};
use macroquad::texture::{draw_texture_ex, DrawTextureParams, FilterMode, RenderPass, Texture2D};
use macroquad::window::{screen_height, screen_width};

use crate::asset::AssetBatch;

/// Opaque index into the backend's texture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// One drawable row, fully resolved. Everything the backend needs is in the
/// call itself, so backends never reach back into the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    GridBox {
        pos: Vec3,
        size: Vec3,
        angle: Vec3,
        color: Vec4,
    },
    GridPolygon {
        pos: Vec3,
        size: Vec3,
        angle: Vec3,
        color: Vec4,
        sides: i32,
    },
    SpriteWorld {
        pos: Vec3,
        size: Vec2,
        angle: Vec3,
        color: Vec4,
        texture: TextureHandle,
        billboard: bool,
    },
    SpriteCylinder {
        pos: Vec3,
        radius: f32,
        height: f32,
        angle: Vec3,
        color: Vec4,
        segments: i32,
        side: TextureHandle,
        top: Option<TextureHandle>,
        bottom: Option<TextureHandle>,
    },
    SpriteBox {
        pos: Vec3,
        size: Vec3,
        angle: Vec3,
        color: Vec4,
        top: Option<TextureHandle>,
        bottom: Option<TextureHandle>,
        front: Option<TextureHandle>,
        rear: Option<TextureHandle>,
        left: Option<TextureHandle>,
        right: Option<TextureHandle>,
    },
    SpriteScreen {
        /// x = top, y = bottom, z = left, w = right, in screen pixels.
        rect: Vec4,
        angle: f32,
        color: Vec4,
        texture: TextureHandle,
    },
}

pub trait RenderBackend {
    /// Current output size in pixels, for projection aspect.
    fn screen_size(&self) -> (f32, f32);

    /// Resolve a texture path to a handle, loading it on first use.
    /// `None` means the texture cannot be provided.
    fn resolve_texture(&mut self, path: &str) -> Option<TextureHandle>;

    /// Bind the camera used for world-space draw calls this frame.
    fn set_camera(&mut self, view: Mat4, proj: Mat4);

    fn draw(&mut self, call: DrawCall);
}

/// A camera defined by explicit view and projection matrices.
struct RigCamera {
    view: Mat4,
    proj: Mat4,
}

impl Camera for RigCamera {
    fn matrix(&self) -> Mat4 {
        self.proj * self.view
    }

    fn depth_enabled(&self) -> bool {
        true
    }

    fn render_pass(&self) -> Option<RenderPass> {
        None
    }

    fn viewport(&self) -> Option<(i32, i32, i32, i32)> {
        None
    }
}

#[derive(PartialEq)]
enum CameraMode {
    World,
    Screen,
}

/// The real backend: macroquad for output, the asset batch plus the loose
/// filesystem for texture bytes. Textures are decoded once and cached by
/// path; handles index the cache and stay valid for the backend's lifetime.
pub struct MacroquadBackend {
    assets: AssetBatch,
    textures: Vec<Texture2D>,
    by_path: HashMap<String, Option<TextureHandle>>,
    rig: RigCamera,
    mode: CameraMode,
}

impl MacroquadBackend {
    pub fn new(assets: AssetBatch) -> Self {
        Self {
            assets,
            textures: Vec::new(),
            by_path: HashMap::new(),
            rig: RigCamera {
                view: Mat4::IDENTITY,
                proj: Mat4::IDENTITY,
            },
            mode: CameraMode::Screen,
        }
    }

    fn texture(&self, handle: TextureHandle) -> Option<&Texture2D> {
        self.textures.get(handle.0 as usize)
    }

    fn enter_world(&mut self) {
        if self.mode != CameraMode::World {
            set_camera(&self.rig);
            self.mode = CameraMode::World;
        }
    }

    fn enter_screen(&mut self) {
        if self.mode != CameraMode::Screen {
            set_default_camera();
            self.mode = CameraMode::Screen;
        }
    }

    fn load_texture(&mut self, path: &str) -> Option<TextureHandle> {
        let bytes = self
            .assets
            .fetch(path)
            .or_else(|_| std::fs::read(path))
            .ok()?;
        let decoded = image::load_from_memory(&bytes).ok()?.to_rgba8();
        let (w, h) = decoded.dimensions();
        let texture = Texture2D::from_rgba8(w as u16, h as u16, decoded.as_raw());
        texture.set_filter(FilterMode::Nearest);
        self.textures.push(texture);
        Some(TextureHandle(self.textures.len() as u32 - 1))
    }

    /// Draw the reference grid under the world: gray lines on y = 0 with
    /// colored x/y/z axes through the origin.
    pub fn draw_grid_base(&mut self) {
        self.enter_world();
        let gray = Color::new(0.5, 0.5, 0.5, 1.0);
        for i in 0..=10 {
            if i == 5 {
                continue;
            }
            let t = i as f32 - 5.0;
            draw_line_3d(vec3(t, 0.0, -5.0), vec3(t, 0.0, 5.0), gray);
            draw_line_3d(vec3(-5.0, 0.0, t), vec3(5.0, 0.0, t), gray);
        }
        draw_line_3d(vec3(-5.0, 0.0, 0.0), vec3(5.0, 0.0, 0.0), Color::new(1.0, 0.0, 0.0, 1.0));
        draw_line_3d(vec3(0.0, -5.0, 0.0), vec3(0.0, 5.0, 0.0), Color::new(0.0, 1.0, 0.0, 1.0));
        draw_line_3d(vec3(0.0, 0.0, -5.0), vec3(0.0, 0.0, 5.0), Color::new(0.0, 0.0, 1.0, 1.0));
    }

    fn draw_grid_box(&mut self, pos: Vec3, size: Vec3, angle: Vec3, color: Vec4) {
        self.enter_world();
        let rot = rotation(angle);
        let half = size * 0.5;
        let corner = |x: f32, y: f32, z: f32| pos + rot.transform_vector3(vec3(x, y, z) * half);
        let c = [
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, -1.0, 1.0),
            corner(-1.0, -1.0, 1.0),
            corner(-1.0, 1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ];
        let color = to_color(color);
        const EDGES: [(usize, usize); 12] = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        for (a, b) in EDGES {
            draw_line_3d(c[a], c[b], color);
        }
    }

    fn draw_grid_polygon(&mut self, pos: Vec3, size: Vec3, angle: Vec3, color: Vec4, sides: i32) {
        self.enter_world();
        let sides = sides.max(3) as usize;
        let rot = rotation(angle);
        let color = to_color(color);
        let vertex = |i: usize| {
            let a = i as f32 / sides as f32 * std::f32::consts::TAU;
            pos + rot.transform_vector3(vec3(a.cos() * size.x, 0.0, a.sin() * size.z))
        };
        for i in 0..sides {
            draw_line_3d(vertex(i), vertex((i + 1) % sides), color);
        }
    }

    fn draw_sprite_world(
        &mut self,
        pos: Vec3,
        size: Vec2,
        angle: Vec3,
        color: Vec4,
        texture: TextureHandle,
        billboard: bool,
    ) {
        self.enter_world();
        let Some(texture) = self.texture(texture).cloned() else { return };
        let (right, up) = if billboard {
            // The view rotation's rows are the camera basis in world space.
            let v = self.rig.view;
            (
                vec3(v.x_axis.x, v.y_axis.x, v.z_axis.x),
                vec3(v.x_axis.y, v.y_axis.y, v.z_axis.y),
            )
        } else {
            let rot = rotation(angle);
            (rot.transform_vector3(Vec3::X), rot.transform_vector3(Vec3::Y))
        };
        let half_r = right * size.x * 0.5;
        let half_u = up * size.y * 0.5;
        let color = to_color(color);
        let quad = [
            (pos - half_r + half_u, vec2(0.0, 0.0)),
            (pos + half_r + half_u, vec2(1.0, 0.0)),
            (pos + half_r - half_u, vec2(1.0, 1.0)),
            (pos - half_r - half_u, vec2(0.0, 1.0)),
        ];
        let vertices = quad
            .iter()
            .map(|(p, uv)| Vertex::new(p.x, p.y, p.z, uv.x, uv.y, color))
            .collect();
        draw_mesh(&Mesh {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            texture: Some(texture),
        });
    }

    fn draw_sprite_cylinder(
        &mut self,
        pos: Vec3,
        radius: f32,
        height: f32,
        angle: Vec3,
        color: Vec4,
        segments: i32,
        side: TextureHandle,
        top: Option<TextureHandle>,
        bottom: Option<TextureHandle>,
    ) {
        self.enter_world();
        let segments = segments.max(3) as usize;
        let rot = rotation(angle);
        let color = to_color(color);
        let ring = |i: usize, y: f32| {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            pos + rot.transform_vector3(vec3(a.cos() * radius, y, a.sin() * radius))
        };

        if let Some(texture) = self.texture(side).cloned() {
            let mut vertices = Vec::with_capacity((segments + 1) * 2);
            for i in 0..=segments {
                let u = i as f32 / segments as f32;
                let t = ring(i % segments, height * 0.5);
                let b = ring(i % segments, -height * 0.5);
                vertices.push(Vertex::new(t.x, t.y, t.z, u, 0.0, color));
                vertices.push(Vertex::new(b.x, b.y, b.z, u, 1.0, color));
            }
            let mut indices = Vec::with_capacity(segments * 6);
            for i in 0..segments as u16 {
                let base = i * 2;
                indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
            }
            draw_mesh(&Mesh {
                vertices,
                indices,
                texture: Some(texture),
            });
        }

        for (handle, y) in [(top, height * 0.5), (bottom, -height * 0.5)] {
            let Some(texture) = handle.and_then(|h| self.texture(h).cloned()) else { continue };
            let center = pos + rot.transform_vector3(vec3(0.0, y, 0.0));
            let mut vertices = vec![Vertex::new(center.x, center.y, center.z, 0.5, 0.5, color)];
            for i in 0..segments {
                let a = i as f32 / segments as f32 * std::f32::consts::TAU;
                let p = ring(i, y);
                vertices.push(Vertex::new(
                    p.x,
                    p.y,
                    p.z,
                    0.5 + a.cos() * 0.5,
                    0.5 + a.sin() * 0.5,
                    color,
                ));
            }
            let mut indices = Vec::with_capacity(segments * 3);
            for i in 0..segments as u16 {
                let next = 1 + (i + 1) % segments as u16;
                indices.extend_from_slice(&[0, 1 + i, next]);
            }
            draw_mesh(&Mesh {
                vertices,
                indices,
                texture: Some(texture),
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_sprite_box(
        &mut self,
        pos: Vec3,
        size: Vec3,
        angle: Vec3,
        color: Vec4,
        top: Option<TextureHandle>,
        bottom: Option<TextureHandle>,
        front: Option<TextureHandle>,
        rear: Option<TextureHandle>,
        left: Option<TextureHandle>,
        right: Option<TextureHandle>,
    ) {
        self.enter_world();
        let rot = rotation(angle);
        let half = size * 0.5;
        let corner = |x: f32, y: f32, z: f32| pos + rot.transform_vector3(vec3(x, y, z) * half);
        let color = to_color(color);

        // Each face is its own quad, texture-coordinated left-to-right,
        // top-to-bottom as seen from outside the box.
        let faces: [(Option<TextureHandle>, [Vec3; 4]); 6] = [
            (top, [
                corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0),
                corner(1.0, 1.0, -1.0), corner(-1.0, 1.0, -1.0),
            ]),
            (bottom, [
                corner(-1.0, -1.0, -1.0), corner(1.0, -1.0, -1.0),
                corner(1.0, -1.0, 1.0), corner(-1.0, -1.0, 1.0),
            ]),
            (front, [
                corner(-1.0, 1.0, -1.0), corner(1.0, 1.0, -1.0),
                corner(1.0, -1.0, -1.0), corner(-1.0, -1.0, -1.0),
            ]),
            (rear, [
                corner(1.0, 1.0, 1.0), corner(-1.0, 1.0, 1.0),
                corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0),
            ]),
            (left, [
                corner(-1.0, 1.0, 1.0), corner(-1.0, 1.0, -1.0),
                corner(-1.0, -1.0, -1.0), corner(-1.0, -1.0, 1.0),
            ]),
            (right, [
                corner(1.0, 1.0, -1.0), corner(1.0, 1.0, 1.0),
                corner(1.0, -1.0, 1.0), corner(1.0, -1.0, -1.0),
            ]),
        ];

        for (handle, quad) in faces {
            let Some(texture) = handle.and_then(|h| self.texture(h).cloned()) else { continue };
            let uvs = [vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0), vec2(0.0, 1.0)];
            let vertices = quad
                .iter()
                .zip(uvs)
                .map(|(p, uv)| Vertex::new(p.x, p.y, p.z, uv.x, uv.y, color))
                .collect();
            draw_mesh(&Mesh {
                vertices,
                indices: vec![0, 1, 2, 0, 2, 3],
                texture: Some(texture),
            });
        }
    }

    fn draw_sprite_screen(&mut self, rect: Vec4, angle: f32, color: Vec4, texture: TextureHandle) {
        self.enter_screen();
        let Some(texture) = self.texture(texture).cloned() else { return };
        let (top, bottom, left, right) = (rect.x, rect.y, rect.z, rect.w);
        draw_texture_ex(
            &texture,
            left,
            top,
            to_color(color),
            DrawTextureParams {
                dest_size: Some(vec2(right - left, bottom - top)),
                rotation: angle,
                ..Default::default()
            },
        );
    }
}

impl RenderBackend for MacroquadBackend {
    fn screen_size(&self) -> (f32, f32) {
        (screen_width(), screen_height())
    }

    fn resolve_texture(&mut self, path: &str) -> Option<TextureHandle> {
        if let Some(cached) = self.by_path.get(path) {
            return *cached;
        }
        let handle = self.load_texture(path);
        // Failures are cached too; a path that failed once stays failed.
        self.by_path.insert(path.to_string(), handle);
        handle
    }

    fn set_camera(&mut self, view: Mat4, proj: Mat4) {
        self.rig = RigCamera { view, proj };
        set_camera(&self.rig);
        self.mode = CameraMode::World;
    }

    fn draw(&mut self, call: DrawCall) {
        match call {
            DrawCall::GridBox { pos, size, angle, color } => {
                self.draw_grid_box(pos, size, angle, color)
            }
            DrawCall::GridPolygon { pos, size, angle, color, sides } => {
                self.draw_grid_polygon(pos, size, angle, color, sides)
            }
            DrawCall::SpriteWorld { pos, size, angle, color, texture, billboard } => {
                self.draw_sprite_world(pos, size, angle, color, texture, billboard)
            }
            DrawCall::SpriteCylinder {
                pos,
                radius,
                height,
                angle,
                color,
                segments,
                side,
                top,
                bottom,
            } => self.draw_sprite_cylinder(
                pos, radius, height, angle, color, segments, side, top, bottom,
            ),
            DrawCall::SpriteBox {
                pos,
                size,
                angle,
                color,
                top,
                bottom,
                front,
                rear,
                left,
                right,
            } => self.draw_sprite_box(
                pos, size, angle, color, top, bottom, front, rear, left, right,
            ),
            DrawCall::SpriteScreen { rect, angle, color, texture } => {
                self.draw_sprite_screen(rect, angle, color, texture)
            }
        }
    }
}

fn rotation(angle: Vec3) -> Mat4 {
    Mat4::from_euler(macroquad::math::EulerRot::YXZ, angle.y, angle.x, angle.z)
}

fn to_color(v: Vec4) -> Color {
    Color::new(v.x, v.y, v.z, v.w)
}

/// Headless backend for tests: records every call, resolves any path not in
/// `missing` to a handle derived from its insertion order.
#[cfg(test)]
pub struct RecordingBackend {
    pub calls: Vec<DrawCall>,
    pub missing: std::collections::HashSet<String>,
    pub camera: Option<(Mat4, Mat4)>,
    resolved: HashMap<String, TextureHandle>,
}

#[cfg(test)]
impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            missing: std::collections::HashSet::new(),
            camera: None,
            resolved: HashMap::new(),
        }
    }
}

#[cfg(test)]
impl RenderBackend for RecordingBackend {
    fn screen_size(&self) -> (f32, f32) {
        (800.0, 600.0)
    }

    fn resolve_texture(&mut self, path: &str) -> Option<TextureHandle> {
        if self.missing.contains(path) {
            return None;
        }
        let next = TextureHandle(self.resolved.len() as u32);
        Some(*self.resolved.entry(path.to_string()).or_insert(next))
    }

    fn set_camera(&mut self, view: Mat4, proj: Mat4) {
        self.camera = Some((view, proj));
    }

    fn draw(&mut self, call: DrawCall) {
        self.calls.push(call);
    }
}
