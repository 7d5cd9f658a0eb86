//! The per-frame render loop.
//!
//! One logical step per frame, driven until the demo quits or the window
//! closes: compute the frame delta, drain events into the buffered input
//! state, update, render, swap. Asset setup happens before [`run`] is
//! entered; nothing inside the loop blocks or loads.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use glow::HasContext;

use crate::abs::App;
use crate::input::{KeyboardState, MouseState};

/// Whether the loop keeps going after this frame.
pub enum Flow {
    Continue,
    Quit,
}

/// Everything a demo sees during one update step.
pub struct FrameContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Seconds since the loop started.
    pub elapsed: f32,
    pub window_size: (u32, u32),
}

impl FrameContext<'_> {
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.window_size;
        width as f32 / height.max(1) as f32
    }
}

/// One self-contained demo: per-frame state update and a draw pass.
pub trait Demo {
    /// Integrates input and animation state; return [`Flow::Quit`] to stop.
    fn update(&mut self, ctx: &FrameContext) -> Flow;

    /// Pushes per-frame uniforms and issues the draw calls.
    fn render(&mut self, gl: &Arc<glow::Context>);
}

/// Runs the demo until it quits or the window is closed.
pub fn run(app: &mut App, demo: &mut dyn Demo) {
    let start = Instant::now();
    let mut last_frame = Instant::now();
    let mut keyboard = KeyboardState::default();
    let mut mouse = MouseState::default();

    log::info!("entering render loop");

    loop {
        let now = Instant::now();
        let delta_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        keyboard.begin_frame();
        mouse.begin_frame();

        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => {
                    log::info!("window closed, leaving render loop");
                    return;
                }
                sdl2::event::Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(width, height),
                    ..
                } => unsafe {
                    app.gl.viewport(0, 0, width, height);
                },
                sdl2::event::Event::MouseMotion {
                    x, y, xrel, yrel, ..
                } => {
                    mouse.position = Vec2::new(x as f32, y as f32);
                    mouse.delta += Vec2::new(xrel as f32, yrel as f32);
                }
                sdl2::event::Event::MouseButtonDown { mouse_btn, .. } => {
                    mouse.down.insert(mouse_btn);
                    mouse.pressed.insert(mouse_btn);
                }
                sdl2::event::Event::MouseButtonUp { mouse_btn, .. } => {
                    mouse.down.remove(&mouse_btn);
                    mouse.released.insert(mouse_btn);
                }
                sdl2::event::Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    keyboard.down.insert(keycode);
                    keyboard.pressed.insert(keycode);
                }
                sdl2::event::Event::KeyUp {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    keyboard.down.remove(&keycode);
                    keyboard.released.insert(keycode);
                }
                _ => {}
            }
        }

        let ctx = FrameContext {
            keyboard: &keyboard,
            mouse: &mouse,
            delta_time,
            elapsed: start.elapsed().as_secs_f32(),
            window_size: app.window.size(),
        };

        if let Flow::Quit = demo.update(&ctx) {
            log::info!("demo requested quit");
            return;
        }

        demo.render(&app.gl);
        app.window.gl_swap_window();
    }
}
