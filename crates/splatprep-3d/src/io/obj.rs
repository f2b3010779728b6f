use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::mesh::{MeshError, TriangleMesh};

/// Error types for the OBJ module.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    /// Failed to read OBJ file
    #[error("Failed to read OBJ file")]
    Io(#[from] std::io::Error),

    /// Malformed statement
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The faces do not form a valid mesh
    #[error("Invalid mesh. {0}")]
    Mesh(#[from] MeshError),
}

/// Read a Wavefront OBJ file into a triangle mesh.
///
/// Only vertex positions and faces are used. Polygons are triangulated as fans.
///
/// # Arguments
///
/// * `path` - The path to the OBJ file.
///
/// # Returns
///
/// The triangle mesh.
pub fn read_obj(path: impl AsRef<Path>) -> Result<TriangleMesh, ObjError> {
    let file = File::open(path)?;
    parse_obj(BufReader::new(file))
}

/// Parse OBJ statements from a reader.
pub fn parse_obj(reader: impl BufRead) -> Result<TriangleMesh, ObjError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_idx + 1;
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let coords = parts
                    .take(3)
                    .map(|s| s.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| parse_error(line_number, e.to_string()))?;
                let vertex: [f64; 3] = coords
                    .try_into()
                    .map_err(|_| parse_error(line_number, "vertex needs 3 coordinates"))?;
                vertices.push(vertex);
            }
            Some("f") => {
                let indices = parts
                    .map(|s| resolve_index(s, vertices.len(), line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                if indices.len() < 3 {
                    return Err(parse_error(line_number, "face needs at least 3 vertices"));
                }
                for i in 1..indices.len() - 1 {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            _ => {}
        }
    }

    log::debug!("parsed {} vertices and {} faces", vertices.len(), faces.len());

    Ok(TriangleMesh::new(vertices, faces)?)
}

// resolve `v`, `v/vt`, `v//vn` or `v/vt/vn` to a 0-based vertex index
fn resolve_index(token: &str, num_vertices: usize, line: usize) -> Result<usize, ObjError> {
    let index = token
        .split('/')
        .next()
        .unwrap_or_default()
        .parse::<i64>()
        .map_err(|e| parse_error(line, format!("{}: {}", token, e)))?;

    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => num_vertices as i64 + i,
        _ => return Err(parse_error(line, "vertex index 0 is not valid")),
    };

    if resolved < 0 {
        return Err(parse_error(line, format!("vertex index {} out of range", index)));
    }
    Ok(resolved as usize)
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}
