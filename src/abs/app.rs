//! SDL2 and OpenGL application setup.
//!
//! [`App`] owns the SDL2 subsystems, the window and the glow context. All of
//! it is created up front; a failure here aborts initialization before any
//! asset loading starts.

use std::sync::Arc;

use crate::error::{Error, Result};

/// The windowing and GL context bundle the render loop runs against.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Opens a resizable window with a GL 3.3 core context and vsync.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::Backend)?;
        let video_subsystem = sdl.video().map_err(Error::Backend)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(|e| Error::Backend(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(Error::Backend)?;
        window.gl_make_current(&gl_context).map_err(Error::Backend)?;

        if let Err(e) = video_subsystem.gl_set_swap_interval(sdl2::video::SwapInterval::VSync) {
            log::debug!("vsync not available: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(Error::Backend)?;

        log::info!("opened {width}x{height} window with GL 3.3 core context");

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// Current drawable aspect ratio.
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.window.size();
        width as f32 / height.max(1) as f32
    }
}
