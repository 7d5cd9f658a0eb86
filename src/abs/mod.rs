//! Core graphics abstractions: application setup, shader management,
//! mesh and texture handling on top of the glow backend.

pub mod app;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
