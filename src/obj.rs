//! Triangulated OBJ mesh loading.
//!
//! The loader parses `v`/`vt`/`vn`/`f` records into a [`RawMesh`] and
//! flattens it into an interleaved, non-indexed vertex stream: one record
//! per face corner in traversal order, no deduplication. Normals come either
//! from each corner's own normal index ([`NormalMode::Flat`]) or from a
//! position-averaged table shared by every face touching a position
//! ([`NormalMode::Averaged`]), which gives smooth shading at the cost of
//! sharp edges.
//!
//! Input must already be triangulated; faces with more than three corners
//! are emitted as given, not fanned out.

use fxhash::FxHashSet;
use glam::{Vec2, Vec3};

use crate::error::{Error, Result};

/// How normals are assigned to emitted vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalMode {
    /// Each corner keeps its own normal index; edges stay sharp.
    Flat,
    /// One averaged normal per position index, shared across faces.
    Averaged,
}

/// Which attribute slices each emitted record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Components {
    /// position(3) + texcoord(2) + normal(3).
    PositionUvNormal,
    /// position(3) + normal(3).
    PositionNormal,
}

impl Components {
    /// Floats per emitted record.
    pub fn stride(self) -> usize {
        match self {
            Components::PositionUvNormal => 8,
            Components::PositionNormal => 6,
        }
    }
}

/// One corner of a face, 0-based indices into the mesh arrays.
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// A face as listed in the source.
#[derive(Debug, Clone)]
pub struct Face {
    pub corners: Vec<Corner>,
}

/// Flat interleaved vertex stream, one fixed-stride record per vertex.
///
/// Owned by the caller after loading; uploaded once to the GPU and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    data: Vec<f32>,
    stride: usize,
}

impl VertexBuffer {
    /// Wraps raw interleaved data, rejecting partial records.
    pub fn new(data: Vec<f32>, stride: usize) -> Result<Self> {
        if stride == 0 || data.len() % stride != 0 {
            return Err(Error::Stride {
                len: data.len(),
                stride,
            });
        }
        Ok(Self { data, stride })
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.stride
    }
}

/// Parsed intermediate form of an OBJ source; discarded after interleaving.
#[derive(Debug, Default)]
pub struct RawMesh {
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl RawMesh {
    /// Parses OBJ text line by line.
    ///
    /// Lines are classified by their leading token; unknown tokens
    /// (`o`, `s`, `usemtl`, comments, ...) are skipped for forward
    /// compatibility. Malformed known records fail with the 1-based line
    /// number.
    pub fn parse(source: &str) -> Result<Self> {
        let mut mesh = RawMesh::default();

        for (index, raw_line) in source.lines().enumerate() {
            let line = index + 1;
            let mut tokens = raw_line.split_whitespace();
            let Some(head) = tokens.next() else { continue };

            match head {
                "v" => mesh.positions.push(parse_vec3(&mut tokens, line)?),
                "vt" => mesh.texcoords.push(parse_vec2(&mut tokens, line)?),
                "vn" => mesh.normals.push(parse_vec3(&mut tokens, line)?),
                "f" => mesh.faces.push(parse_face(&mut tokens, line)?),
                _ => {}
            }
        }

        Ok(mesh)
    }

    /// Flattens the mesh into an interleaved stream.
    ///
    /// Emits one record per face corner in traversal order. A corner
    /// referencing data the source never provides fails fast rather than
    /// emitting zeros.
    pub fn interleave(&self, normals: NormalMode, components: Components) -> Result<VertexBuffer> {
        let averaged = match normals {
            NormalMode::Averaged => Some(self.averaged_normals()?),
            NormalMode::Flat => None,
        };

        let stride = components.stride();
        let corners: usize = self.faces.iter().map(|f| f.corners.len()).sum();
        let mut data = Vec::with_capacity(corners * stride);

        for face in &self.faces {
            for corner in &face.corners {
                let position = *self.positions.get(corner.position).ok_or(Error::Index {
                    kind: "position",
                    index: corner.position,
                    len: self.positions.len(),
                })?;
                data.extend_from_slice(&position.to_array());

                if components == Components::PositionUvNormal {
                    data.extend_from_slice(&self.texcoord_at(*corner)?.to_array());
                }

                let normal = match &averaged {
                    Some(table) => table[corner.position],
                    None => self.normal_at(*corner)?,
                };
                data.extend_from_slice(&normal.to_array());
            }
        }

        VertexBuffer::new(data, stride)
    }

    /// Builds the per-position averaged normal table.
    ///
    /// For every face corner the referenced normal index is recorded against
    /// the corner's position index; duplicates collapse through the set. Each
    /// position then gets the component-wise mean of its referenced normals.
    /// The mean is not renormalized.
    fn averaged_normals(&self) -> Result<Vec<Vec3>> {
        if self.normals.is_empty() {
            return Err(Error::Missing { kind: "normal" });
        }

        let mut referenced: Vec<FxHashSet<usize>> =
            vec![FxHashSet::default(); self.positions.len()];

        for face in &self.faces {
            for corner in &face.corners {
                let normal = corner.normal.ok_or(Error::Missing { kind: "normal" })?;
                if normal >= self.normals.len() {
                    return Err(Error::Index {
                        kind: "normal",
                        index: normal,
                        len: self.normals.len(),
                    });
                }
                referenced
                    .get_mut(corner.position)
                    .ok_or(Error::Index {
                        kind: "position",
                        index: corner.position,
                        len: self.positions.len(),
                    })?
                    .insert(normal);
            }
        }

        Ok(referenced
            .iter()
            .map(|indices| {
                if indices.is_empty() {
                    // Position not referenced by any face; never looked up.
                    return Vec3::ZERO;
                }
                let sum: Vec3 = indices.iter().map(|&i| self.normals[i]).sum();
                sum / indices.len() as f32
            })
            .collect())
    }

    fn texcoord_at(&self, corner: Corner) -> Result<Vec2> {
        if self.texcoords.is_empty() {
            return Err(Error::Missing { kind: "texcoord" });
        }
        let index = corner.texcoord.ok_or(Error::Missing { kind: "texcoord" })?;
        self.texcoords.get(index).copied().ok_or(Error::Index {
            kind: "texcoord",
            index,
            len: self.texcoords.len(),
        })
    }

    fn normal_at(&self, corner: Corner) -> Result<Vec3> {
        if self.normals.is_empty() {
            return Err(Error::Missing { kind: "normal" });
        }
        let index = corner.normal.ok_or(Error::Missing { kind: "normal" })?;
        self.normals.get(index).copied().ok_or(Error::Index {
            kind: "normal",
            index,
            len: self.normals.len(),
        })
    }
}

/// Parses and interleaves in one step, using the stride-8 layout.
pub fn load_obj(source: &str, normals: NormalMode) -> Result<VertexBuffer> {
    RawMesh::parse(source)?.interleave(normals, Components::PositionUvNormal)
}

fn parse_component(token: Option<&str>, line: usize) -> Result<f32> {
    let token = token.ok_or_else(|| Error::Parse {
        line,
        message: "record is missing a numeric component".into(),
    })?;
    token.parse().map_err(|_| Error::Parse {
        line,
        message: format!("`{token}` is not a number"),
    })
}

fn parse_vec3(tokens: &mut std::str::SplitWhitespace, line: usize) -> Result<Vec3> {
    Ok(Vec3::new(
        parse_component(tokens.next(), line)?,
        parse_component(tokens.next(), line)?,
        parse_component(tokens.next(), line)?,
    ))
}

fn parse_vec2(tokens: &mut std::str::SplitWhitespace, line: usize) -> Result<Vec2> {
    Ok(Vec2::new(
        parse_component(tokens.next(), line)?,
        parse_component(tokens.next(), line)?,
    ))
}

/// Parses one `i/j/k` corner; `j` and `k` may be absent (`i`, `i/j`, `i//k`).
fn parse_corner(token: &str, line: usize) -> Result<Corner> {
    let mut parts = token.split('/');

    let position = parse_index(parts.next().unwrap_or(""), line)?;
    let texcoord = match parts.next() {
        None | Some("") => None,
        Some(part) => Some(parse_index(part, line)?),
    };
    let normal = match parts.next() {
        None | Some("") => None,
        Some(part) => Some(parse_index(part, line)?),
    };

    Ok(Corner {
        position,
        texcoord,
        normal,
    })
}

/// Converts a 1-based source index to 0-based.
fn parse_index(part: &str, line: usize) -> Result<usize> {
    match part.parse::<usize>() {
        Ok(i) if i > 0 => Ok(i - 1),
        _ => Err(Error::Parse {
            line,
            message: format!("`{part}` is not a valid 1-based index"),
        }),
    }
}

fn parse_face(tokens: &mut std::str::SplitWhitespace, line: usize) -> Result<Face> {
    let corners = tokens
        .map(|token| parse_corner(token, line))
        .collect::<Result<Vec<_>>>()?;

    if corners.len() < 3 {
        return Err(Error::Parse {
            line,
            message: format!("face has {} corners, expected at least 3", corners.len()),
        });
    }

    Ok(Face { corners })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    const CUBE: &str = include_str!("assets/cube.obj");

    fn normal_bits(record: &[f32], stride: usize) -> [u32; 3] {
        let n = &record[stride - 3..];
        [n[0].to_bits(), n[1].to_bits(), n[2].to_bits()]
    }

    fn distinct_normals(buffer: &VertexBuffer) -> usize {
        buffer
            .data()
            .chunks(buffer.stride())
            .map(|r| normal_bits(r, buffer.stride()))
            .collect::<HashSet<_>>()
            .len()
    }

    #[test]
    fn cube_flat_expands_every_corner() {
        let buffer = load_obj(CUBE, NormalMode::Flat).unwrap();
        assert_eq!(buffer.stride(), 8);
        assert_eq!(buffer.vertex_count(), 36);
        // 3 corners per face, 12 faces, 8 floats per record.
        assert_eq!(buffer.data().len(), 3 * 12 * 8);
    }

    #[test]
    fn cube_flat_keeps_per_face_normals() {
        let buffer = load_obj(CUBE, NormalMode::Flat).unwrap();
        assert_eq!(distinct_normals(&buffer), 6);
    }

    #[test]
    fn cube_averaged_collapses_to_one_normal_per_corner() {
        let buffer = load_obj(CUBE, NormalMode::Averaged).unwrap();
        assert_eq!(buffer.vertex_count(), 36);
        assert!(distinct_normals(&buffer) <= 8);
    }

    #[test]
    fn averaged_normals_are_identical_across_shared_positions() {
        let buffer = load_obj(CUBE, NormalMode::Averaged).unwrap();
        let mut by_position: HashMap<[u32; 3], [u32; 3]> = HashMap::new();
        for record in buffer.data().chunks(buffer.stride()) {
            let position = [
                record[0].to_bits(),
                record[1].to_bits(),
                record[2].to_bits(),
            ];
            let normal = normal_bits(record, buffer.stride());
            let previous = by_position.entry(position).or_insert(normal);
            assert_eq!(*previous, normal);
        }
    }

    #[test]
    fn flat_normals_differ_across_faces_sharing_a_position() {
        let buffer = load_obj(CUBE, NormalMode::Flat).unwrap();
        let mut by_position: HashMap<[u32; 3], HashSet<[u32; 3]>> = HashMap::new();
        for record in buffer.data().chunks(buffer.stride()) {
            let position = [
                record[0].to_bits(),
                record[1].to_bits(),
                record[2].to_bits(),
            ];
            by_position
                .entry(position)
                .or_default()
                .insert(normal_bits(record, buffer.stride()));
        }
        // Every cube corner sits on three faces with three different normals.
        assert!(by_position.values().all(|normals| normals.len() == 3));
    }

    #[test]
    fn averaged_normal_is_mean_of_distinct_face_normals() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0 0
vn 0 0 1
vn 1 0 0
f 1/1/1 2/1/1 3/1/1
f 2/1/2 4/1/2 3/1/2
";
        let buffer = load_obj(source, NormalMode::Averaged).unwrap();
        // Positions 2 and 3 are shared by both faces; their averaged normal
        // is the mean of (0,0,1) and (1,0,0).
        let shared: Vec<&[f32]> = buffer
            .data()
            .chunks(8)
            .filter(|r| r[0] == 1.0 && r[1] == 0.0 || r[0] == 0.0 && r[1] == 1.0)
            .collect();
        assert!(!shared.is_empty());
        for record in shared {
            assert_eq!(record[5..8], [0.5, 0.0, 0.5]);
        }
    }

    #[test]
    fn position_normal_layout_has_stride_six() {
        let mesh = RawMesh::parse(CUBE).unwrap();
        let buffer = mesh
            .interleave(NormalMode::Flat, Components::PositionNormal)
            .unwrap();
        assert_eq!(buffer.stride(), 6);
        assert_eq!(buffer.data().len(), 36 * 6);
    }

    #[test]
    fn unknown_records_are_skipped() {
        let source = "\
o cube
mtllib cube.mtl
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
s off
usemtl brick
f 1//1 2//1 3//1
";
        let mesh = RawMesh::parse(source).unwrap();
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn malformed_vertex_reports_line_number() {
        let err = RawMesh::parse("v 0 0 0\nv 1.0 nope 2.0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn face_with_fewer_than_three_corners_is_rejected() {
        let err = RawMesh::parse("v 0 0 0\nf 1 1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn out_of_range_position_index_is_reported() {
        let source = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";
        let err = load_obj(source, NormalMode::Flat).unwrap_err();
        assert!(matches!(
            err,
            Error::Index {
                kind: "position",
                index: 1,
                len: 1,
            }
        ));
    }

    #[test]
    fn missing_texcoords_fail_fast() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = RawMesh::parse(source).unwrap();

        let err = mesh
            .interleave(NormalMode::Flat, Components::PositionUvNormal)
            .unwrap_err();
        assert!(matches!(err, Error::Missing { kind: "texcoord" }));

        // The same mesh is fine when the layout does not need texcoords.
        assert!(
            mesh.interleave(NormalMode::Flat, Components::PositionNormal)
                .is_ok()
        );
    }

    #[test]
    fn missing_normals_fail_fast_in_both_modes() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let mesh = RawMesh::parse(source).unwrap();
        for mode in [NormalMode::Flat, NormalMode::Averaged] {
            let err = mesh
                .interleave(mode, Components::PositionUvNormal)
                .unwrap_err();
            assert!(matches!(err, Error::Missing { kind: "normal" }));
        }
    }

    #[test]
    fn partial_records_are_rejected() {
        let err = VertexBuffer::new(vec![0.0; 10], 8).unwrap_err();
        assert!(matches!(err, Error::Stride { len: 10, stride: 8 }));
    }

    #[test]
    fn indices_convert_from_one_based() {
        let source = "v 4 5 6\nvt 0 1\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1\n";
        let buffer = load_obj(source, NormalMode::Flat).unwrap();
        assert_eq!(&buffer.data()[0..3], &[4.0, 5.0, 6.0]);
    }
}
