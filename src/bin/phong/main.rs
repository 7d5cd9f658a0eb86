//! Textured model viewer with Phong-style lighting.
//!
//! Controls: WASD + Space/LShift to fly, arrow keys to look, drag the left
//! mouse button to spin the model, `=`/`-` to step its scale, Escape to
//! quit.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::{keyboard::Keycode, mouse::MouseButton};

use flyby3d::abs::{App, Mesh, Shader, ShaderProgram, Texture, VertexLayout};
use flyby3d::camera::{CameraInput, FlyCamera};
use flyby3d::obj::{self, NormalMode};
use flyby3d::runner::{self, Demo, Flow, FrameContext};
use flyby3d::{Result, ShaderStage};

const DRAG_SENSITIVITY: f32 = 0.005;
const LIGHT_DIRECTION: Vec3 = Vec3::new(5.0, 2.0, 1.0);

struct PhongDemo {
    program: ShaderProgram,
    mesh: Mesh,
    texture: Texture,
    camera: FlyCamera,
    rotation_x: f32,
    rotation_y: f32,
    scale: f32,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
}

impl Demo for PhongDemo {
    fn update(&mut self, ctx: &FrameContext) -> Flow {
        if ctx.keyboard.was_pressed(Keycode::Escape) {
            return Flow::Quit;
        }

        self.camera
            .update(&CameraInput::from_keyboard(ctx.keyboard), ctx.delta_time);

        if ctx.mouse.is_down(MouseButton::Left) {
            self.rotation_y += ctx.mouse.delta.x * DRAG_SENSITIVITY;
            self.rotation_x += ctx.mouse.delta.y * DRAG_SENSITIVITY;
        }

        if ctx.keyboard.was_pressed(Keycode::Equals) {
            self.scale += 0.5;
        }
        if ctx.keyboard.was_pressed(Keycode::Minus) {
            self.scale = (self.scale - 0.7).max(0.1);
        }

        self.model = Mat4::from_rotation_x(self.rotation_x)
            * Mat4::from_rotation_y(self.rotation_y)
            * Mat4::from_scale(Vec3::splat(self.scale));
        self.view = self.camera.view();
        self.projection = self.camera.projection(ctx.aspect_ratio());

        Flow::Continue
    }

    fn render(&mut self, gl: &Arc<glow::Context>) {
        self.program
            .set_matrices(
                &["u_model", "u_view", "u_projection"],
                &[self.model, self.view, self.projection],
            )
            .expect("name and value counts match");
        self.program
            .set_vectors(
                &[
                    "u_view_pos",
                    "u_ambient_color",
                    "u_light_direction",
                    "u_light_color",
                ],
                &[
                    self.camera.position,
                    Vec3::splat(0.1),
                    LIGHT_DIRECTION.normalize(),
                    Vec3::ONE,
                ],
            )
            .expect("name and value counts match");

        unsafe {
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        self.program.use_program();
        self.texture.bind(0);
        self.mesh.draw();
    }
}

fn setup(app: &App) -> Result<PhongDemo> {
    let gl = &app.gl;

    let buffer = obj::load_obj(include_str!("../../assets/cube.obj"), NormalMode::Averaged)?;
    log::info!("loaded mesh: {} vertices", buffer.vertex_count());

    let vert = Shader::new(gl, ShaderStage::Vertex, include_str!("shaders/vert.glsl"))?;
    let frag = Shader::new(gl, ShaderStage::Fragment, include_str!("shaders/frag.glsl"))?;
    let program = ShaderProgram::new(gl, &[&vert, &frag])?;

    let mesh = Mesh::new(
        gl,
        &program,
        &VertexLayout::position_uv_normal(),
        &buffer,
        None,
    )?;
    let texture = Texture::new(gl, &checkerboard(8, 64))?;

    program.use_program();
    program.set_uniform("u_texture", 0i32);

    let mut camera = FlyCamera::new(Vec3::new(2.0, 2.0, 5.0));
    camera.look_toward(Vec3::ZERO);

    Ok(PhongDemo {
        program,
        mesh,
        texture,
        camera,
        rotation_x: 0.0,
        rotation_y: 0.0,
        scale: 1.0,
        model: Mat4::IDENTITY,
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
    })
}

fn checkerboard(tiles: u32, tile_px: u32) -> image::DynamicImage {
    let size = tiles * tile_px;
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(size, size, |x, y| {
        if ((x / tile_px) + (y / tile_px)) % 2 == 0 {
            image::Rgba([200, 120, 80, 255])
        } else {
            image::Rgba([95, 52, 30, 255])
        }
    }))
}

fn main() {
    flyby3d::init_logger();

    let mut app = match App::new("phong", 1280, 720) {
        Ok(app) => app,
        Err(e) => {
            log::error!("window setup failed: {e}");
            std::process::exit(1);
        }
    };

    unsafe {
        app.gl.enable(glow::DEPTH_TEST);
        app.gl.enable(glow::CULL_FACE);
        app.gl.cull_face(glow::BACK);
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
