//! Stage scripts
//!
//! A stage script is a RON file holding the same declaration calls the
//! engine API exposes, applied in order against a fresh [`Engine`]. Scripts
//! exist so a stage can be edited without recompiling; the built-in demo
//! stage in `main.rs` is the hardcoded equivalent.
//!
//! ```ron
//! (ops: [
//!     AddCamera(name: "Main"),
//!     SetCameraPos(name: "Main", x: 0.0, y: 3.0, z: -10.0),
//!     AddScene(name: "Scene1"),
//!     AddGridBox(name: "BoxA"),
//!     SceneEndPoint,
//!     SetSceneCamera(scene: "Scene1", camera: "Main"),
//!     ChangeScene(name: "Scene1"),
//! ])
//! ```

use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;

#[derive(Debug)]
pub enum ScriptError {
    Io(io::Error),
    Parse(ron::error::SpannedError),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Io(e) => write!(f, "script I/O error: {}", e),
            ScriptError::Parse(e) => write!(f, "script parse error: {}", e),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<io::Error> for ScriptError {
    fn from(e: io::Error) -> Self {
        ScriptError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ScriptError {
    fn from(e: ron::error::SpannedError) -> Self {
        ScriptError::Parse(e)
    }
}

/// One declaration call. Unknown names and duplicates surface through the
/// engine's diagnostic log when applied, never as script errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageOp {
    AddCamera { name: String },
    SetCameraPos { name: String, x: f32, y: f32, z: f32 },
    SetCameraLook { name: String, x: f32, y: f32, z: f32 },
    UseCameraSet { name: String },

    AddGridBox { name: String },
    SetGridBoxPos { name: String, x: f32, y: f32, z: f32 },
    SetGridBoxSize { name: String, x: f32, y: f32, z: f32 },
    SetGridBoxAngle { name: String, x: f32, y: f32, z: f32 },
    SetGridBoxColor { name: String, r: f32, g: f32, b: f32, a: f32 },

    AddGridPolygon { name: String },
    SetGridPolygonPos { name: String, x: f32, y: f32, z: f32 },
    SetGridPolygonSize { name: String, x: f32, y: f32, z: f32 },
    SetGridPolygonAngle { name: String, x: f32, y: f32, z: f32 },
    SetGridPolygonColor { name: String, r: f32, g: f32, b: f32, a: f32 },
    SetGridPolygonSides { name: String, sides: i32 },

    AddSpriteWorld { name: String, texture: String },
    SetSpriteWorldPos { name: String, x: f32, y: f32, z: f32 },
    SetSpriteWorldSize { name: String, w: f32, h: f32 },
    SetSpriteWorldAngle { name: String, x: f32, y: f32, z: f32 },
    SetSpriteWorldColor { name: String, r: f32, g: f32, b: f32, a: f32 },
    SetSpriteWorldBillboard { name: String, on: bool },
    SetSpriteWorldTexture { name: String, texture: String },

    AddSpriteCylinder { name: String, texture: String },
    SetSpriteCylinderPos { name: String, x: f32, y: f32, z: f32 },
    SetSpriteCylinderSize { name: String, radius: f32, height: f32 },
    SetSpriteCylinderAngle { name: String, x: f32, y: f32, z: f32 },
    SetSpriteCylinderColor { name: String, r: f32, g: f32, b: f32, a: f32 },
    SetSpriteCylinderSegments { name: String, segments: i32 },
    SetSpriteCylinderTextureSide { name: String, texture: String },
    SetSpriteCylinderTextureTop { name: String, texture: String },
    SetSpriteCylinderTextureBottom { name: String, texture: String },

    AddSpriteBox { name: String, texture: String },
    SetSpriteBoxPos { name: String, x: f32, y: f32, z: f32 },
    SetSpriteBoxSize { name: String, x: f32, y: f32, z: f32 },
    SetSpriteBoxAngle { name: String, x: f32, y: f32, z: f32 },
    SetSpriteBoxColor { name: String, r: f32, g: f32, b: f32, a: f32 },
    SetSpriteBoxTextureTop { name: String, texture: String },
    SetSpriteBoxTextureBottom { name: String, texture: String },
    SetSpriteBoxTextureFront { name: String, texture: String },
    SetSpriteBoxTextureRear { name: String, texture: String },
    SetSpriteBoxTextureLeft { name: String, texture: String },
    SetSpriteBoxTextureRight { name: String, texture: String },

    AddSpriteScreen { name: String, texture: String },
    SetSpriteScreenRect { name: String, top: f32, bottom: f32, left: f32, right: f32 },
    SetSpriteScreenAngle { name: String, angle: f32 },
    SetSpriteScreenColor { name: String, r: f32, g: f32, b: f32, a: f32 },
    SetSpriteScreenTexture { name: String, texture: String },

    AddScene { name: String },
    SceneEndPoint,
    SetSceneCamera { scene: String, camera: String },
    ChangeScene { name: String },
    InitScene { name: String },
    DeleteScene { name: String },
    CopyScene { src: String, dst: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageScript {
    pub ops: Vec<StageOp>,
}

impl StageScript {
    pub fn from_ron(text: &str) -> Result<Self, ScriptError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        Self::from_ron(&std::fs::read_to_string(path)?)
    }

    /// Apply every op in order. Always succeeds; bad names and duplicates
    /// show up in the engine's diagnostic log afterwards.
    pub fn apply(&self, engine: &mut Engine) {
        for op in &self.ops {
            match op {
                StageOp::AddCamera { name } => engine.add_camera(name),
                StageOp::SetCameraPos { name, x, y, z } => engine.set_camera_pos(name, *x, *y, *z),
                StageOp::SetCameraLook { name, x, y, z } => {
                    engine.set_camera_look(name, *x, *y, *z)
                }
                StageOp::UseCameraSet { name } => engine.use_camera_set(name),

                StageOp::AddGridBox { name } => engine.add_grid_box(name),
                StageOp::SetGridBoxPos { name, x, y, z } => {
                    engine.set_grid_box_pos(name, *x, *y, *z)
                }
                StageOp::SetGridBoxSize { name, x, y, z } => {
                    engine.set_grid_box_size(name, *x, *y, *z)
                }
                StageOp::SetGridBoxAngle { name, x, y, z } => {
                    engine.set_grid_box_angle(name, *x, *y, *z)
                }
                StageOp::SetGridBoxColor { name, r, g, b, a } => {
                    engine.set_grid_box_color(name, *r, *g, *b, *a)
                }

                StageOp::AddGridPolygon { name } => engine.add_grid_polygon(name),
                StageOp::SetGridPolygonPos { name, x, y, z } => {
                    engine.set_grid_polygon_pos(name, *x, *y, *z)
                }
                StageOp::SetGridPolygonSize { name, x, y, z } => {
                    engine.set_grid_polygon_size(name, *x, *y, *z)
                }
                StageOp::SetGridPolygonAngle { name, x, y, z } => {
                    engine.set_grid_polygon_angle(name, *x, *y, *z)
                }
                StageOp::SetGridPolygonColor { name, r, g, b, a } => {
                    engine.set_grid_polygon_color(name, *r, *g, *b, *a)
                }
                StageOp::SetGridPolygonSides { name, sides } => {
                    engine.set_grid_polygon_sides(name, *sides)
                }

                StageOp::AddSpriteWorld { name, texture } => {
                    engine.add_sprite_world(name, texture)
                }
                StageOp::SetSpriteWorldPos { name, x, y, z } => {
                    engine.set_sprite_world_pos(name, *x, *y, *z)
                }
                StageOp::SetSpriteWorldSize { name, w, h } => {
                    engine.set_sprite_world_size(name, *w, *h)
                }
                StageOp::SetSpriteWorldAngle { name, x, y, z } => {
                    engine.set_sprite_world_angle(name, *x, *y, *z)
                }
                StageOp::SetSpriteWorldColor { name, r, g, b, a } => {
                    engine.set_sprite_world_color(name, *r, *g, *b, *a)
                }
                StageOp::SetSpriteWorldBillboard { name, on } => {
                    engine.set_sprite_world_billboard(name, *on)
                }
                StageOp::SetSpriteWorldTexture { name, texture } => {
                    engine.set_sprite_world_texture(name, texture)
                }

                StageOp::AddSpriteCylinder { name, texture } => {
                    engine.add_sprite_cylinder(name, texture)
                }
                StageOp::SetSpriteCylinderPos { name, x, y, z } => {
                    engine.set_sprite_cylinder_pos(name, *x, *y, *z)
                }
                StageOp::SetSpriteCylinderSize { name, radius, height } => {
                    engine.set_sprite_cylinder_size(name, *radius, *height)
                }
                StageOp::SetSpriteCylinderAngle { name, x, y, z } => {
                    engine.set_sprite_cylinder_angle(name, *x, *y, *z)
                }
                StageOp::SetSpriteCylinderColor { name, r, g, b, a } => {
                    engine.set_sprite_cylinder_color(name, *r, *g, *b, *a)
                }
                StageOp::SetSpriteCylinderSegments { name, segments } => {
                    engine.set_sprite_cylinder_segments(name, *segments)
                }
                StageOp::SetSpriteCylinderTextureSide { name, texture } => {
                    engine.set_sprite_cylinder_texture_side(name, texture)
                }
                StageOp::SetSpriteCylinderTextureTop { name, texture } => {
                    engine.set_sprite_cylinder_texture_top(name, texture)
                }
                StageOp::SetSpriteCylinderTextureBottom { name, texture } => {
                    engine.set_sprite_cylinder_texture_bottom(name, texture)
                }

                StageOp::AddSpriteBox { name, texture } => engine.add_sprite_box(name, texture),
                StageOp::SetSpriteBoxPos { name, x, y, z } => {
                    engine.set_sprite_box_pos(name, *x, *y, *z)
                }
                StageOp::SetSpriteBoxSize { name, x, y, z } => {
                    engine.set_sprite_box_size(name, *x, *y, *z)
                }
                StageOp::SetSpriteBoxAngle { name, x, y, z } => {
                    engine.set_sprite_box_angle(name, *x, *y, *z)
                }
                StageOp::SetSpriteBoxColor { name, r, g, b, a } => {
                    engine.set_sprite_box_color(name, *r, *g, *b, *a)
                }
                StageOp::SetSpriteBoxTextureTop { name, texture } => {
                    engine.set_sprite_box_texture_top(name, texture)
                }
                StageOp::SetSpriteBoxTextureBottom { name, texture } => {
                    engine.set_sprite_box_texture_bottom(name, texture)
                }
                StageOp::SetSpriteBoxTextureFront { name, texture } => {
                    engine.set_sprite_box_texture_front(name, texture)
                }
                StageOp::SetSpriteBoxTextureRear { name, texture } => {
                    engine.set_sprite_box_texture_rear(name, texture)
                }
                StageOp::SetSpriteBoxTextureLeft { name, texture } => {
                    engine.set_sprite_box_texture_left(name, texture)
                }
                StageOp::SetSpriteBoxTextureRight { name, texture } => {
                    engine.set_sprite_box_texture_right(name, texture)
                }

                StageOp::AddSpriteScreen { name, texture } => {
                    engine.add_sprite_screen(name, texture)
                }
                StageOp::SetSpriteScreenRect { name, top, bottom, left, right } => {
                    engine.set_sprite_screen_rect(name, *top, *bottom, *left, *right)
                }
                StageOp::SetSpriteScreenAngle { name, angle } => {
                    engine.set_sprite_screen_angle(name, *angle)
                }
                StageOp::SetSpriteScreenColor { name, r, g, b, a } => {
                    engine.set_sprite_screen_color(name, *r, *g, *b, *a)
                }
                StageOp::SetSpriteScreenTexture { name, texture } => {
                    engine.set_sprite_screen_texture(name, texture)
                }

                StageOp::AddScene { name } => engine.add_scene(name),
                StageOp::SceneEndPoint => engine.scene_end_point(),
                StageOp::SetSceneCamera { scene, camera } => {
                    engine.set_scene_camera(scene, camera)
                }
                StageOp::ChangeScene { name } => engine.change_scene(name),
                StageOp::InitScene { name } => engine.init_scene(name),
                StageOp::DeleteScene { name } => engine.delete_scene(name),
                StageOp::CopyScene { src, dst } => engine.copy_scene(src, dst),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pool::Category;

    const DEMO: &str = r#"(ops: [
        AddCamera(name: "Main"),
        SetCameraPos(name: "Main", x: 0.0, y: 3.0, z: -10.0),
        AddScene(name: "Scene1"),
        AddGridBox(name: "BoxA"),
        SetGridBoxPos(name: "BoxA", x: -2.0, y: 0.0, z: 0.0),
        SceneEndPoint,
        SetSceneCamera(scene: "Scene1", camera: "Main"),
        ChangeScene(name: "Scene1"),
    ])"#;

    #[test]
    fn test_parse_and_apply() {
        let script = StageScript::from_ron(DEMO).unwrap();
        let mut engine = Engine::new();
        script.apply(&mut engine);

        assert_eq!(engine.pool().count(Category::Camera), 1);
        assert_eq!(engine.pool().count(Category::GridBox), 1);
        assert_eq!(engine.current_scene_name(), Some("Scene1"));
        assert_eq!(engine.scene_range("Scene1", Category::GridBox), Some((0, 1)));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            StageScript::from_ron("(ops: [NotAnOp]"),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn test_script_round_trips_through_ron() {
        let script = StageScript::from_ron(DEMO).unwrap();
        let text = ron::to_string(&script).unwrap();
        let again = StageScript::from_ron(&text).unwrap();
        assert_eq!(again.ops.len(), script.ops.len());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            StageScript::load(Path::new("/nonexistent/stage.ron")),
            Err(ScriptError::Io(_))
        ));
    }
}
