use std::path::PathBuf;

use rasterscene::math::Vec3;
use rasterscene::mesh::MeshSource;
use rasterscene::window::{FrameLimiter, Window, WindowEvent, WINDOW_HEIGHT, WINDOW_WIDTH};
use rasterscene::{Engine, EngineConfig, NodeId, ShadingMode};
use sdl2::keyboard::Keycode;

const ROTATION_STEP: f32 = 0.05;
const TRANSLATION_STEP: f32 = 10.0;
const SCALE_STEP: f32 = 0.05;

/// Apply one key binding to the engine or the selected node.
/// Returns false for unbound keys.
fn handle_key(engine: &mut Engine, selected: NodeId, key: Keycode) -> Result<bool, String> {
    match key {
        Keycode::T => engine.toggle_triangulation(),
        Keycode::F => engine.toggle_fill(),
        Keycode::Z => engine.toggle_depth_view(),
        Keycode::L => engine.toggle_point_light(),
        Keycode::N => engine.toggle_normals(),
        Keycode::Num1 => engine.set_shading_mode(ShadingMode::None),
        Keycode::Num2 => engine.set_shading_mode(ShadingMode::Flat),
        Keycode::Num3 => engine.set_shading_mode(ShadingMode::Gouraud),
        Keycode::Num4 => engine.set_shading_mode(ShadingMode::Phong),
        Keycode::Tab => engine.set_shading_mode(engine.shading_mode().next()),
        _ => return handle_transform_key(engine, selected, key),
    }
    log::debug!("{} shading, {:?}", engine.shading_mode(), engine.render_mode());
    Ok(true)
}

fn handle_transform_key(
    engine: &mut Engine,
    selected: NodeId,
    key: Keycode,
) -> Result<bool, String> {
    let edit = match key {
        Keycode::Up => engine.rotate(selected, Vec3::new(-ROTATION_STEP, 0.0, 0.0)),
        Keycode::Down => engine.rotate(selected, Vec3::new(ROTATION_STEP, 0.0, 0.0)),
        Keycode::Left => engine.rotate(selected, Vec3::new(0.0, -ROTATION_STEP, 0.0)),
        Keycode::Right => engine.rotate(selected, Vec3::new(0.0, ROTATION_STEP, 0.0)),
        Keycode::Q => engine.rotate(selected, Vec3::new(0.0, 0.0, ROTATION_STEP)),
        Keycode::E => engine.rotate(selected, Vec3::new(0.0, 0.0, -ROTATION_STEP)),
        Keycode::W => engine.translate(selected, Vec3::new(0.0, TRANSLATION_STEP, 0.0)),
        Keycode::S => engine.translate(selected, Vec3::new(0.0, -TRANSLATION_STEP, 0.0)),
        Keycode::A => engine.translate(selected, Vec3::new(-TRANSLATION_STEP, 0.0, 0.0)),
        Keycode::D => engine.translate(selected, Vec3::new(TRANSLATION_STEP, 0.0, 0.0)),
        Keycode::Equals | Keycode::KpPlus => engine.scale(selected, Vec3::splat(SCALE_STEP)),
        Keycode::Minus | Keycode::KpMinus => engine.scale(selected, Vec3::splat(-SCALE_STEP)),
        _ => return Ok(false),
    };
    edit.map_err(|e| e.to_string())?;
    Ok(true)
}

fn main() -> Result<(), String> {
    rasterscene::init_logger();

    let mut window = Window::new("rasterscene", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut engine = Engine::new(EngineConfig::default().with_size(WINDOW_WIDTH, WINDOW_HEIGHT));

    // An OBJ path on the command line replaces the default cube.
    let mesh_name = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            engine
                .registry_mut()
                .register("model", MeshSource::ObjFile(path));
            "model"
        }
        None => "cube",
    };

    let main_node = engine
        .create_mesh_node("main", mesh_name)
        .map_err(|e| e.to_string())?;
    engine
        .rotate(main_node, Vec3::new(0.4, 0.6, 0.0))
        .map_err(|e| e.to_string())?;

    // Concave test polygon riding along with the main node.
    let badge = engine
        .create_mesh_node("badge", "insideOutPoly")
        .map_err(|e| e.to_string())?;
    engine.add_child(main_node, badge).map_err(|e| e.to_string())?;
    engine
        .translate(badge, Vec3::new(0.0, 0.0, 260.0))
        .map_err(|e| e.to_string())?;

    let mut frame_limiter = FrameLimiter::new(&window);
    let mut settled = false;

    loop {
        let _delta = frame_limiter.wait_and_get_delta(&window);

        loop {
            match window.poll_events() {
                WindowEvent::None => break,
                WindowEvent::Quit => return Ok(()),
                WindowEvent::Resize(w, h) => {
                    window.resize(w, h)?;
                    engine.resize(w, h);
                }
                WindowEvent::KeyDown(key) => {
                    if !handle_key(&mut engine, main_node, key)? {
                        log::trace!("unbound key {key:?}");
                    }
                }
            }
        }

        let now_settled = engine.render(&mut window);
        if now_settled && !settled {
            log::debug!("scene settled: {:?}", engine.last_frame());
        }
        settled = now_settled;
    }
}
