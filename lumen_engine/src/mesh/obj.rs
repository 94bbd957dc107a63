//! Loading meshes from Wavefront OBJ files.
//!
//! Only the subset needed for textured, lit triangle meshes is understood:
//! `v x y z`, `vt u v`, `vn x y z` and triangular faces `f v/vt/vn v/vt/vn v/vt/vn`.
//! Everything else (comments, groups, materials, ...) is skipped.

use std::path::Path;
use std::rc::Rc;

use itertools::Itertools;
use obj::raw::object::Polygon;
use puffin::profile_function;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::config::LoadOpts;
use crate::core::targets::{CACHE, MESH};
use crate::core::types::{Vector2, Vector3};
use crate::mesh::cache::{self, Timestamp};
use crate::mesh::face::{CornerIndices, FaceIndices};
use crate::mesh::generic::{Mesh, MeshError, MeshStatus};

/// A mesh with a texture coordinate and a normal on every vertex, as loaded from OBJ files
pub type UvMesh = Mesh<(Vector2, Vector3)>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjError {
    #[error("line {line}: `{prefix}` needs {expected} components")]
    MissingComponent {
        line: usize,
        prefix: &'static str,
        expected: usize,
    },
    #[error("line {line}: invalid number in {found:?}")]
    InvalidNumber { line: usize, found: String },
    #[error("line {line}: face corner {found:?} is not of the form `v/vt/vn`")]
    InvalidCorner { line: usize, found: String },
    #[error("line {line}: index {index} is invalid, indices start at 1")]
    InvalidIndex { line: usize, index: i64 },
    #[error("line {line}: faces must be triangles, found {count} corners")]
    NonTriangularFace { line: usize, count: usize },
    /// Reported by the OBJ reader without a location
    #[error("malformed OBJ data: {reason}")]
    Malformed { reason: String },
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// The raw arrays read from an OBJ file, before faces are built
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<Vector3>,
    pub uvs: Vec<Vector2>,
    pub normals: Vec<Vector3>,
    /// Zero-based; the attribute indices are `[uv, normal]`
    pub faces: Vec<FaceIndices<(Vector2, Vector3)>>,
}

/// Parses OBJ text. Any malformed line fails the whole parse.
///
/// Lines are first checked against the supported subset, then the kept statements are read with
/// [obj::raw::parse_obj]. Files longer than `progress_line_threshold` lines log their progress every 10%.
pub fn parse_obj(text: &str, progress_line_threshold: usize) -> Result<ObjData, ObjError> {
    profile_function!();

    let statements = select_statements(text, progress_line_threshold)?;
    let raw = obj::raw::parse_obj(statements.text.as_bytes()).map_err(|err| locate_error(&statements.text, &err))?;

    let faces = raw
        .polygons
        .into_iter()
        .zip(statements.face_lines)
        .map(|(polygon, line)| match polygon {
            Polygon::PTN(corners) => match corners[..] {
                [a, b, c] => Ok(FaceIndices::new([
                    corner_indices(line, a)?,
                    corner_indices(line, b)?,
                    corner_indices(line, c)?,
                ])),
                _ => Err(ObjError::NonTriangularFace {
                    line,
                    count: corners.len(),
                }),
            },
            _ => Err(ObjError::InvalidCorner {
                line,
                found: String::new(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ObjData {
        positions: raw.positions.iter().map(|&(x, y, z, _)| Vector3::new(x, y, z)).collect(),
        uvs: raw.tex_coords.iter().map(|&(u, v, _)| Vector2::new(u, v)).collect(),
        normals: raw.normals.iter().map(|&(x, y, z)| Vector3::new(x, y, z)).collect(),
        faces,
    })
}

/// The subset of a file that is handed to the OBJ reader
struct Statements {
    /// One line per source line, so that line numbers still match; unsupported lines are left blank
    text: String,
    /// The source line of each face, in order
    face_lines: Vec<usize>,
}

/// Keeps `v`, `vt`, `vn` and `f` statements, trimmed to the components that are used, and rejects faces
/// that aren't triangles of `v/vt/vn` corners with indices from 1
fn select_statements(text: &str, progress_line_threshold: usize) -> Result<Statements, ObjError> {
    let total = text.lines().count();
    let progress_step = (total > progress_line_threshold).then_some((total / 10).max(1));
    let mut out = Statements {
        text: String::with_capacity(text.len()),
        face_lines: Vec::new(),
    };

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut words = line.split_whitespace();

        match words.next() {
            Some("v") => push_components(&mut out.text, line_no, "v", 3, words)?,
            Some("vt") => push_components(&mut out.text, line_no, "vt", 2, words)?,
            Some("vn") => push_components(&mut out.text, line_no, "vn", 3, words)?,
            Some("f") => {
                let corners = words.collect_vec();
                if corners.len() != 3 {
                    return Err(ObjError::NonTriangularFace {
                        line: line_no,
                        count: corners.len(),
                    });
                }
                corners.iter().try_for_each(|corner| check_corner(line_no, corner))?;
                out.text.push('f');
                corners.iter().for_each(|corner| {
                    out.text.push(' ');
                    out.text.push_str(corner);
                });
                out.face_lines.push(line_no);
            }
            _ => {}
        }
        out.text.push('\n');

        if let Some(step) = progress_step {
            if line_no % step == 0 {
                debug!(target: MESH, percent = line_no * 100 / total, "parsing large mesh");
            }
        }
    }

    Ok(out)
}

/// Writes the statement with its first `expected` components; any further ones are dropped
fn push_components<'a>(
    out: &mut String,
    line: usize,
    prefix: &'static str,
    expected: usize,
    words: impl Iterator<Item = &'a str>,
) -> Result<(), ObjError> {
    let components = words.take(expected).collect_vec();
    if components.len() < expected {
        return Err(ObjError::MissingComponent { line, prefix, expected });
    }
    out.push_str(prefix);
    components.iter().for_each(|word| {
        out.push(' ');
        out.push_str(word);
    });
    Ok(())
}

fn check_corner(line: usize, corner: &str) -> Result<(), ObjError> {
    let (v, vt, vn) = corner
        .split('/')
        .collect_tuple()
        .ok_or_else(|| ObjError::InvalidCorner {
            line,
            found: corner.to_string(),
        })?;
    for word in [v, vt, vn] {
        let index: i64 = word.parse().map_err(|_| ObjError::InvalidNumber {
            line,
            found: word.to_string(),
        })?;
        // Relative (negative) indices aren't supported
        if index < 1 {
            return Err(ObjError::InvalidIndex { line, index });
        }
    }
    Ok(())
}

fn corner_indices(line: usize, (v, vt, vn): (usize, usize, usize)) -> Result<CornerIndices<(Vector2, Vector3)>, ObjError> {
    let index = |i: usize| {
        u32::try_from(i).map_err(|_| ObjError::InvalidIndex {
            line,
            index: i64::try_from(i).unwrap_or(i64::MAX),
        })
    };
    Ok(CornerIndices::new(index(v)?, [index(vt)?, index(vn)?]))
}

/// The reader doesn't say where it failed. Faces were checked already, so it has to be a number in one of
/// the vertex statements: read those one by one to find it
fn locate_error(text: &str, err: &obj::ObjError) -> ObjError {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with('v'))
        .find_map(|(idx, line)| {
            obj::raw::parse_obj(line.as_bytes()).err().map(|_| ObjError::InvalidNumber {
                line: idx + 1,
                found: line.to_string(),
            })
        })
        .unwrap_or_else(|| ObjError::Malformed { reason: err.to_string() })
}

impl UvMesh {
    /// Loads a mesh from an OBJ file, going through the geometry cache when enabled.
    ///
    /// Never fails outright: a missing file gives an empty [MeshStatus::FileNotFound] mesh, and a
    /// malformed one an empty [MeshStatus::Failed] mesh.
    #[instrument(level = "debug", skip_all, fields(path = ?path.as_ref()))]
    pub fn load_obj(path: impl AsRef<Path>, opts: &LoadOpts) -> Rc<Self> {
        profile_function!();
        let path = path.as_ref();

        if opts.use_cache {
            match cache::try_load::<(Vector2, Vector3)>(path, &opts.cache_dir) {
                Ok(record) => return Rc::new(Self::from_faces(record.faces, record.bbox)),
                Err(miss) => debug!(target: CACHE, ?path, reason = %miss, "not using mesh cache"),
            }
        }

        // Taken before reading, so that an edit made while loading leaves the cache stale
        let source_mtime = Timestamp::of_file(path).ok();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(target: MESH, ?path, "mesh file not found");
                return Rc::new(Self::with_status(MeshStatus::FileNotFound));
            }
            Err(err) => {
                warn!(target: MESH, ?path, %err, "couldn't read mesh file");
                return Rc::new(Self::with_status(MeshStatus::Failed));
            }
        };

        let mut mesh = Self::new();
        let built = parse_obj(&text, opts.progress_line_threshold).and_then(|data| {
            mesh.construct_faces(&data.positions, &data.faces, (data.uvs.as_slice(), data.normals.as_slice()))
                .map_err(ObjError::from)
        });
        if let Err(err) = built {
            warn!(target: MESH, ?path, %err, "failed loading mesh");
            return Rc::new(Self::with_status(MeshStatus::Failed));
        }
        info!(target: MESH, ?path, faces = mesh.faces().len(), "loaded mesh");

        if let (true, Some(mtime)) = (opts.use_cache, source_mtime) {
            if let Err(err) = cache::save(path, &opts.cache_dir, mtime, &mesh.bbox(), mesh.faces()) {
                warn!(target: CACHE, ?path, %err, "couldn't save mesh cache");
            }
        }

        Rc::new(mesh)
    }
}
