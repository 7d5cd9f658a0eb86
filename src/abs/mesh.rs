//! GPU mesh and named attribute binding.
//!
//! [`Mesh`] uploads an interleaved vertex stream once and wires a
//! [`VertexLayout`] onto a program's attribute slots by name. An attribute
//! the shader compiler optimized out is skipped with a warning rather than
//! failing the whole bind; demos share shaders that ignore some attributes.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::ShaderProgram;
use crate::error::{Error, Result};
use crate::obj::VertexBuffer;

/// One named slice of an interleaved record, in float components.
#[derive(Debug, Clone)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub size: i32,
    pub offset: i32,
}

/// Ordered description of how a fixed-stride record splits into attributes.
///
/// Purely descriptive and supplied by the caller; nothing is derived from
/// the mesh data.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: usize) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, size: i32, offset: i32) -> Self {
        self.attributes.push(VertexAttribute { name, size, offset });
        self
    }

    /// position(3) + texcoord(2) + normal(3), the stride-8 OBJ layout.
    pub fn position_uv_normal() -> Self {
        Self::new(8)
            .with("in_position", 3, 0)
            .with("in_uv", 2, 3)
            .with("in_normal", 3, 5)
    }

    /// position(3) + normal(3), the stride-6 layout.
    pub fn position_normal() -> Self {
        Self::new(6)
            .with("in_position", 3, 0)
            .with("in_normal", 3, 3)
    }

    /// Checks every attribute slice fits inside the record.
    fn validate(&self) -> Result<()> {
        for attribute in &self.attributes {
            let end = attribute.offset + attribute.size;
            if attribute.offset < 0 || end as usize > self.stride {
                return Err(Error::LayoutMismatch {
                    layout: end.max(0) as usize,
                    buffer: self.stride,
                });
            }
        }
        Ok(())
    }
}

/// A mesh resident on the GPU, optionally indexed.
pub struct Mesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: Option<glow::Buffer>,
    element_count: i32,
}

impl Mesh {
    /// Uploads the buffer and binds each layout attribute by name against
    /// the program. Supplying `indices` switches drawing to `draw_elements`.
    pub fn new(
        gl: &Arc<glow::Context>,
        program: &ShaderProgram,
        layout: &VertexLayout,
        buffer: &VertexBuffer,
        indices: Option<&[u32]>,
    ) -> Result<Self> {
        layout.validate()?;
        if layout.stride != buffer.stride() {
            return Err(Error::LayoutMismatch {
                layout: layout.stride,
                buffer: buffer.stride(),
            });
        }

        unsafe {
            let vao = gl.create_vertex_array().map_err(Error::Backend)?;
            let vbo = gl.create_buffer().map_err(Error::Backend)?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            let data = buffer.data();
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    data.as_ptr() as *const u8,
                    data.len() * std::mem::size_of::<f32>(),
                ),
                glow::STATIC_DRAW,
            );

            let ebo = match indices {
                Some(indices) => {
                    let ebo = gl.create_buffer().map_err(Error::Backend)?;
                    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
                    gl.buffer_data_u8_slice(
                        glow::ELEMENT_ARRAY_BUFFER,
                        std::slice::from_raw_parts(
                            indices.as_ptr() as *const u8,
                            indices.len() * std::mem::size_of::<u32>(),
                        ),
                        glow::STATIC_DRAW,
                    );
                    Some(ebo)
                }
                None => None,
            };

            let float_size = std::mem::size_of::<f32>() as i32;
            for attribute in &layout.attributes {
                let Some(location) = gl.get_attrib_location(program.id(), attribute.name) else {
                    log::warn!("attribute `{}` not found in program, skipping", attribute.name);
                    continue;
                };
                gl.vertex_attrib_pointer_f32(
                    location,
                    attribute.size,
                    glow::FLOAT,
                    false,
                    layout.stride as i32 * float_size,
                    attribute.offset * float_size,
                );
                gl.enable_vertex_attrib_array(location);
            }

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            let element_count = match indices {
                Some(indices) => indices.len() as i32,
                None => buffer.vertex_count() as i32,
            };

            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                ebo,
                element_count,
            })
        }
    }

    /// Issues one draw call for the whole mesh.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            match self.ebo {
                Some(_) => self.gl.draw_elements(
                    glow::TRIANGLES,
                    self.element_count,
                    glow::UNSIGNED_INT,
                    0,
                ),
                None => self.gl.draw_arrays(glow::TRIANGLES, 0, self.element_count),
            }
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn element_count(&self) -> i32 {
        self.element_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            if let Some(ebo) = self.ebo {
                self.gl.delete_buffer(ebo);
            }
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layouts_fit_their_strides() {
        assert!(VertexLayout::position_uv_normal().validate().is_ok());
        assert!(VertexLayout::position_normal().validate().is_ok());
    }

    #[test]
    fn attribute_past_record_end_is_rejected() {
        let layout = VertexLayout::new(6).with("in_uv", 2, 5);
        assert!(matches!(
            layout.validate().unwrap_err(),
            Error::LayoutMismatch { layout: 7, buffer: 6 }
        ));
    }
}
