//! Minimal real-time 3D rendering demo framework.
//!
//! The pieces fit together as a pipeline: [`obj`] parses a triangulated OBJ
//! source into an interleaved vertex stream, [`abs`] uploads it and binds a
//! named vertex layout and uniforms against a compiled shader program,
//! [`camera`] integrates held input into a free-fly viewpoint, and
//! [`runner`] drives the whole thing one frame at a time.
//!
//! Demo binaries live in `src/bin/`; each does all of its asset setup
//! before entering the loop and aborts with a diagnostic if any stage
//! fails.

pub mod abs;
pub mod camera;
pub mod error;
pub mod input;
pub mod obj;
pub mod runner;

pub use error::{Error, Result, ShaderStage};

/// Installs a console logger for the demo binaries.
pub fn init_logger() {
    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply();

    if let Err(e) = result {
        eprintln!("logger setup failed: {e}");
    }
}
