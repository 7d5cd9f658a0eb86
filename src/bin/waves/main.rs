//! Animated wave surface over an indexed grid mesh.
//!
//! The grid's vertex shader only consumes positions; the uv and normal
//! attributes of the shared stride-8 layout are skipped by the binder with
//! a warning, which is the intended tolerant path.
//!
//! Controls: WASD + Space/LShift to fly, arrow keys to look, `[`/`]` to
//! step the wave height, Escape to quit.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use flyby3d::abs::{App, Mesh, Shader, ShaderProgram, VertexLayout};
use flyby3d::camera::{CameraInput, FlyCamera};
use flyby3d::obj::VertexBuffer;
use flyby3d::runner::{self, Demo, Flow, FrameContext};
use flyby3d::{Result, ShaderStage};

const GRID_RESOLUTION: u32 = 128;
const GRID_EXTENT: f32 = 40.0;

struct WavesDemo {
    program: ShaderProgram,
    mesh: Mesh,
    camera: FlyCamera,
    wave_height: f32,
    wave_speed: f32,
    wave_steepness: f32,
    time: f32,
    view: Mat4,
    projection: Mat4,
}

impl Demo for WavesDemo {
    fn update(&mut self, ctx: &FrameContext) -> Flow {
        if ctx.keyboard.was_pressed(Keycode::Escape) {
            return Flow::Quit;
        }

        self.camera
            .update(&CameraInput::from_keyboard(ctx.keyboard), ctx.delta_time);

        if ctx.keyboard.was_pressed(Keycode::RightBracket) {
            self.wave_height += 0.1;
        }
        if ctx.keyboard.was_pressed(Keycode::LeftBracket) {
            self.wave_height = (self.wave_height - 0.1).max(0.0);
        }

        self.time = ctx.elapsed;
        self.view = self.camera.view();
        self.projection = self.camera.projection(ctx.aspect_ratio());

        Flow::Continue
    }

    fn render(&mut self, gl: &Arc<glow::Context>) {
        self.program
            .set_matrices(&["u_view", "u_projection"], &[self.view, self.projection])
            .expect("name and value counts match");
        self.program
            .set_scalars(
                &["u_time", "u_wave_height", "u_wave_speed", "u_wave_steepness"],
                &[self.time, self.wave_height, self.wave_speed, self.wave_steepness],
            )
            .expect("name and value counts match");
        self.program
            .set_vectors(
                &["u_view_pos", "u_light_direction"],
                &[self.camera.position, Vec3::new(0.4, 0.8, 0.2).normalize()],
            )
            .expect("name and value counts match");

        unsafe {
            gl.clear_color(0.01, 0.03, 0.08, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        self.program.use_program();
        self.mesh.draw();
    }
}

/// Builds a flat, Y-up grid in the shared stride-8 layout with two CCW
/// triangles per cell.
fn grid(resolution: u32, extent: f32) -> Result<(VertexBuffer, Vec<u32>)> {
    let side = resolution + 1;

    let mut data = Vec::with_capacity((side * side) as usize * 8);
    for z in 0..side {
        for x in 0..side {
            let u = x as f32 / resolution as f32;
            let v = z as f32 / resolution as f32;
            data.extend_from_slice(&[
                (u - 0.5) * extent,
                0.0,
                (v - 0.5) * extent,
                u,
                v,
                0.0,
                1.0,
                0.0,
            ]);
        }
    }

    let mut indices = Vec::with_capacity((resolution * resolution) as usize * 6);
    for z in 0..resolution {
        for x in 0..resolution {
            let i = z * side + x;
            indices.extend_from_slice(&[i, i + side, i + 1, i + 1, i + side, i + side + 1]);
        }
    }

    Ok((VertexBuffer::new(data, 8)?, indices))
}

fn setup(app: &App) -> Result<WavesDemo> {
    let gl = &app.gl;

    let vert = Shader::new(gl, ShaderStage::Vertex, include_str!("shaders/vert.glsl"))?;
    let frag = Shader::new(gl, ShaderStage::Fragment, include_str!("shaders/frag.glsl"))?;
    let program = ShaderProgram::new(gl, &[&vert, &frag])?;

    let (buffer, indices) = grid(GRID_RESOLUTION, GRID_EXTENT)?;
    log::info!(
        "generated {}x{} grid: {} vertices, {} indices",
        GRID_RESOLUTION,
        GRID_RESOLUTION,
        buffer.vertex_count(),
        indices.len()
    );

    let mesh = Mesh::new(
        gl,
        &program,
        &VertexLayout::position_uv_normal(),
        &buffer,
        Some(&indices),
    )?;

    let mut camera = FlyCamera::new(Vec3::new(0.0, 6.0, 14.0));
    camera.far = 200.0;
    camera.look_toward(Vec3::ZERO);

    Ok(WavesDemo {
        program,
        mesh,
        camera,
        wave_height: 0.8,
        wave_speed: 1.2,
        wave_steepness: 0.6,
        time: 0.0,
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
    })
}

fn main() {
    flyby3d::init_logger();

    let mut app = match App::new("waves", 1280, 720) {
        Ok(app) => app,
        Err(e) => {
            log::error!("window setup failed: {e}");
            std::process::exit(1);
        }
    };

    unsafe {
        // No face culling so the surface stays visible from below.
        app.gl.enable(glow::DEPTH_TEST);
    }

    let mut demo = match setup(&app) {
        Ok(demo) => demo,
        Err(e) => {
            log::error!("demo setup failed: {e}");
            std::process::exit(1);
        }
    };

    runner::run(&mut app, &mut demo);
}
