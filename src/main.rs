//! STAGEHAND: a small scene-graph runtime
//!
//! Entities are declared by name into a shared attribute pool, scenes claim
//! contiguous ranges of that pool, and a per-frame materializer turns newly
//! declared rows into drawable instances. Run with no arguments for the
//! built-in demo stage, or pass a RON stage script:
//!
//! ```text
//! stagehand [stage.ron] [package.pkg ...]
//! ```

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod asset;
mod engine;
mod render;
mod script;

use std::path::Path;

use macroquad::prelude::*;

use asset::AssetBatch;
use engine::Engine;
use render::MacroquadBackend;
use script::StageScript;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("STAGEHAND v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// The stage used when no script is given: two cameras, two scenes, a box
/// pair and a pentagon, starting in Scene1.
fn demo_stage(engine: &mut Engine) {
    engine.add_camera("MainCamera");
    engine.set_camera_pos("MainCamera", 0.0, 3.0, -10.0);
    engine.set_camera_look("MainCamera", 0.0, 0.0, 0.0);
    engine.add_camera("SideCamera");
    engine.set_camera_pos("SideCamera", 10.0, 5.0, 0.0);
    engine.set_camera_look("SideCamera", 0.0, 0.0, 0.0);

    engine.add_scene("Scene1");
    engine.add_grid_box("BoxA");
    engine.set_grid_box_pos("BoxA", -2.0, 0.0, 0.0);
    engine.add_grid_box("BoxB");
    engine.set_grid_box_pos("BoxB", 2.0, 0.0, 0.0);
    engine.set_grid_box_color("BoxB", 1.0, 0.5, 0.0, 1.0);
    engine.scene_end_point();

    engine.add_scene("Scene2");
    engine.add_grid_polygon("PolyA");
    engine.set_grid_polygon_sides("PolyA", 5);
    engine.scene_end_point();

    engine.set_scene_camera("Scene1", "MainCamera");
    engine.set_scene_camera("Scene2", "SideCamera");
    engine.change_scene("Scene1");
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let mut assets = AssetBatch::new();
    let mut script = None;
    for arg in std::env::args().skip(1) {
        if arg.ends_with(".pkg") {
            match assets.load_package(Path::new(&arg)) {
                Ok(()) => println!("Loaded package {}", arg),
                Err(e) => println!("Failed to load package {}: {}", arg, e),
            }
        } else {
            match StageScript::load(Path::new(&arg)) {
                Ok(s) => {
                    println!("Loaded stage script {}", arg);
                    script = Some(s);
                }
                Err(e) => println!("Failed to load stage script {}: {}", arg, e),
            }
        }
    }

    let mut backend = MacroquadBackend::new(assets);
    let mut engine = Engine::new();
    match &script {
        Some(s) => s.apply(&mut engine),
        None => demo_stage(&mut engine),
    }

    loop {
        clear_background(Color::new(0.08, 0.08, 0.1, 1.0));

        engine.materialize(&mut backend);
        engine.update_scene();
        // Grid first so screen sprites end up on top; it reuses the camera
        // bound on the previous frame, which only matters for frame zero.
        backend.draw_grid_base();
        engine.draw_scene(&mut backend);

        for diag in engine.take_diagnostics() {
            println!("[{}] {}", diag.kind.label(), diag.message);
        }

        next_frame().await
    }
}
