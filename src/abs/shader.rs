//! Shader compilation, linking and uniform binding.
//!
//! [`ShaderProgram`] resolves every active uniform into a location table at
//! link time, so frame-time sets never query the driver by string. Grouped
//! binder calls ([`ShaderProgram::set_matrices`] and friends) follow an
//! activate, push all, deactivate pattern: nothing set by one call can leak
//! into another program's draw. Callers re-activate before drawing.

use std::sync::Arc;

use fxhash::FxHashMap;
use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

use crate::error::{Error, Result, ShaderStage};

/// An individually compiled shader stage.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles a shader, surfacing the driver's info log on failure.
    pub fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self> {
        unsafe {
            let shader = gl.create_shader(stage.gl_type()).map_err(Error::Backend)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(Error::Compile { stage, log });
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
                stage,
            })
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// A value that can be pushed into a resolved uniform location.
pub trait Uniform {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation);
}

impl Uniform for bool {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_1_i32(Some(location), *self as i32);
        }
    }
}

impl Uniform for i32 {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_1_i32(Some(location), *self);
        }
    }
}

impl Uniform for f32 {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_1_f32(Some(location), *self);
        }
    }
}

impl Uniform for Vec2 {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_2_f32(Some(location), self.x, self.y);
        }
    }
}

impl Uniform for Vec3 {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_3_f32(Some(location), self.x, self.y, self.z);
        }
    }
}

impl Uniform for Vec4 {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_4_f32(Some(location), self.x, self.y, self.z, self.w);
        }
    }
}

impl Uniform for Mat4 {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref());
        }
    }
}

impl<T: Uniform> Uniform for &T {
    fn apply(&self, gl: &glow::Context, location: &glow::NativeUniformLocation) {
        (*self).apply(gl, location);
    }
}

/// A linked program with its resolved uniform location table.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    uniforms: FxHashMap<String, glow::NativeUniformLocation>,
}

impl ShaderProgram {
    /// Links the given shaders, then resolves every active uniform once.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self> {
        unsafe {
            let program = gl.create_program().map_err(Error::Backend)?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(Error::Link { log });
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            let mut uniforms = FxHashMap::default();
            for index in 0..gl.get_active_uniforms(program) {
                let Some(active) = gl.get_active_uniform(program, index) else {
                    continue;
                };
                if let Some(location) = gl.get_uniform_location(program, &active.name) {
                    log::debug!("resolved uniform `{}`", active.name);
                    uniforms.insert(active.name, location);
                }
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                uniforms,
            })
        }
    }

    /// Binds the program for drawing.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Whether the linker kept a uniform with this name.
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Raw program handle, for attribute resolution.
    pub(crate) fn id(&self) -> glow::Program {
        self.id
    }

    /// Sets a single uniform on the currently active program.
    ///
    /// Names the linker eliminated are skipped with a warning; shaders that
    /// ignore a uniform are routine across the demos.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        match self.uniforms.get(name) {
            Some(location) => value.apply(&self.gl, location),
            None => log::warn!("uniform `{name}` not active in program, skipping"),
        }
    }

    /// Pushes several named matrices in one activate-push-deactivate call.
    pub fn set_matrices(&self, names: &[&str], values: &[Mat4]) -> Result<()> {
        self.set_grouped(names, values)
    }

    /// Pushes several named 3-component vectors in one call.
    pub fn set_vectors(&self, names: &[&str], values: &[Vec3]) -> Result<()> {
        self.set_grouped(names, values)
    }

    /// Pushes several named scalars in one call.
    pub fn set_scalars(&self, names: &[&str], values: &[f32]) -> Result<()> {
        self.set_grouped(names, values)
    }

    fn set_grouped<T: Uniform>(&self, names: &[&str], values: &[T]) -> Result<()> {
        check_arity(names.len(), values.len())?;

        unsafe {
            self.gl.use_program(Some(self.id));
        }
        for (name, value) in names.iter().zip(values) {
            self.set_uniform(name, value);
        }
        unsafe {
            self.gl.use_program(None);
        }
        Ok(())
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

/// Grouped-binder precondition, checked before anything is pushed.
fn check_arity(names: usize, values: usize) -> Result<()> {
    if names != values {
        return Err(Error::Arity { names, values });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check_arity;
    use crate::error::Error;

    #[test]
    fn mismatched_arity_is_rejected_before_any_binding() {
        let err = check_arity(3, 2).unwrap_err();
        assert!(matches!(err, Error::Arity { names: 3, values: 2 }));
    }

    #[test]
    fn matched_arity_passes() {
        assert!(check_arity(4, 4).is_ok());
        assert!(check_arity(0, 0).is_ok());
    }
}
