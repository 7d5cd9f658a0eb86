//! Crate-wide error type.
//!
//! Everything that can fail during setup (mesh parsing, shader builds,
//! binder calls) funnels into [`Error`]. Per-frame code is infallible by
//! design: a valid setup never produces steady-state errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The shader stage a compile failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The matching glow shader type constant.
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A line in a mesh source could not be tokenized into a known record.
    #[error("OBJ parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A face corner or the source as a whole lacks data the requested
    /// vertex layout needs.
    #[error("mesh does not provide {kind} data required by the requested layout")]
    Missing { kind: &'static str },

    /// A face references an out-of-range position/texcoord/normal index.
    #[error("face references {kind} index {index} but only {len} are defined")]
    Index {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// Shader compilation failed; carries the backend's info log.
    #[error("{stage} shader compilation failed:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// Program linking failed; carries the backend's info log.
    #[error("program link failed:\n{log}")]
    Link { log: String },

    /// A grouped uniform-binder call with mismatched name/value counts.
    #[error("uniform binder called with {names} names but {values} values")]
    Arity { names: usize, values: usize },

    /// An interleaved buffer whose length is not a whole number of records.
    #[error("vertex buffer length {len} is not a multiple of stride {stride}")]
    Stride { len: usize, stride: usize },

    /// A vertex layout whose stride disagrees with the buffer it binds.
    #[error("vertex layout stride {layout} does not match buffer stride {buffer}")]
    LayoutMismatch { layout: usize, buffer: usize },

    /// Windowing or GL context failure during setup.
    #[error("backend error: {0}")]
    Backend(String),
}
