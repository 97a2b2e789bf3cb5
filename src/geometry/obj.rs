//! Minimal Wavefront OBJ subset.
//!
//! Reads `v x y z` and `f a b c` records (1-based triangle indices) and
//! ignores every other line. Writes `v` and `f` records of any arity.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use thiserror::Error;

use super::Mesh;
use crate::util::Timed;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: vertex index {index} out of range ({count} vertices)")]
    IndexOutOfRange { line: usize, index: i64, count: usize },
}

pub type ObjResult<T> = Result<T, ObjError>;

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_floats<'a>(
    line: usize,
    mut tokens: impl Iterator<Item = &'a str>,
) -> ObjResult<[f32; 3]> {
    let mut out = [0.0; 3];
    for (k, slot) in out.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| parse_error(line, format!("vertex needs 3 coordinates, got {k}")))?;
        let value: f32 = token
            .parse()
            .map_err(|_| parse_error(line, format!("bad coordinate '{token}'")))?;
        if !value.is_finite() {
            return Err(parse_error(line, format!("non-finite coordinate '{token}'")));
        }
        *slot = value;
    }
    Ok(out)
}

/// Face corners may be `i`, `i/t`, `i//n` or `i/t/n`; only `i` is kept.
fn parse_indices<'a>(
    line: usize,
    mut tokens: impl Iterator<Item = &'a str>,
) -> ObjResult<[i64; 3]> {
    let mut out = [0; 3];
    for (k, slot) in out.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| parse_error(line, format!("face needs 3 indices, got {k}")))?;
        let index = token.split('/').next().unwrap_or(token);
        *slot = index
            .parse()
            .map_err(|_| parse_error(line, format!("bad index '{token}'")))?;
    }
    if tokens.next().is_some() {
        return Err(parse_error(line, "only triangular faces are supported"));
    }
    Ok(out)
}

/// Parse OBJ text into a triangle mesh without normals.
///
/// Indices are validated after all vertices are read, so faces may precede
/// the vertices they reference.
pub fn parse_obj<R: BufRead>(reader: R) -> ObjResult<Mesh> {
    let mut positions = Vec::new();
    let mut faces: Vec<(usize, [i64; 3])> = Vec::new();

    for (i, text) in reader.lines().enumerate() {
        let line = i + 1;
        let text = text.map_err(|source| ObjError::Io {
            path: PathBuf::from("<stream>"),
            source,
        })?;
        let mut tokens = text.split_whitespace();
        match tokens.next() {
            Some("v") => positions.push(Vec3::from_array(parse_floats(line, tokens)?)),
            Some("f") => faces.push((line, parse_indices(line, tokens)?)),
            _ => {}
        }
    }

    let count = positions.len();
    let mut triangles = Vec::with_capacity(faces.len());
    for (line, indices) in faces {
        let mut tri = [0u32; 3];
        for (slot, &index) in tri.iter_mut().zip(&indices) {
            if index < 1 || index as usize > count {
                return Err(ObjError::IndexOutOfRange { line, index, count });
            }
            *slot = (index - 1) as u32;
        }
        triangles.push(tri);
    }

    Ok(Mesh::from_triangles(positions, &triangles))
}

/// Load an OBJ file, reporting failures.
pub fn try_load_obj(path: impl AsRef<Path>) -> ObjResult<Mesh> {
    let path = path.as_ref();
    let _t = Timed::debug("OBJ load");
    let file = File::open(path).map_err(|source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(BufReader::new(file)).map_err(|e| match e {
        ObjError::Io { source, .. } => ObjError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    log::info!(
        "Loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Load an OBJ file; on failure logs a warning and returns an empty mesh.
pub fn load_obj(path: impl AsRef<Path>) -> Mesh {
    let path = path.as_ref();
    match try_load_obj(path) {
        Ok(mesh) => mesh,
        Err(e) => {
            log::warn!("Could not load {}: {e}", path.display());
            Mesh::new()
        }
    }
}

/// Write `v` and 1-based `f` records.
pub fn write_obj<W: Write>(mut writer: W, mesh: &Mesh) -> std::io::Result<()> {
    for p in &mesh.positions {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for face in &mesh.position_faces {
        write!(writer, "f")?;
        for &i in face {
            write!(writer, " {}", i + 1)?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

pub fn save_obj(path: impl AsRef<Path>, mesh: &Mesh) -> ObjResult<()> {
    let path = path.as_ref();
    let io_error = |source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    write_obj(BufWriter::new(file), mesh).map_err(io_error)?;
    log::info!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::create_box;

    const TETRA: &str = "\
# tetrahedron
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
vn 0 0 1
f 1 3 2
f 1 2 4
f 1//1 4//1 3//1
f 2/1/1 3/1/1 4/1/1
";

    #[test]
    fn test_parse_tetrahedron() {
        let mesh = parse_obj(TETRA.as_bytes()).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.position_faces[0].as_slice(), &[0, 2, 1]);
        assert_eq!(mesh.position_faces[3].as_slice(), &[1, 2, 3]);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange { line: 3, index: 3, count: 2 }
        ));
    }

    #[test]
    fn test_zero_index_rejected() {
        let err = parse_obj("v 0 0 0\nf 0 1 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_bad_coordinate() {
        let err = parse_obj("v 0 zero 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        for text in ["v nan 0 0\n", "v 0 inf 0\n", "v 0 0 -inf\n"] {
            let err = parse_obj(text.as_bytes()).unwrap_err();
            assert!(
                err.to_string().contains("non-finite"),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_quad_face_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 1 1 1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("triangular"));
    }

    #[test]
    fn test_written_triangles_read_back() {
        let mut mesh = create_box();
        mesh.triangulate();
        let mut bytes = Vec::new();
        write_obj(&mut bytes, &mesh).unwrap();

        let read = parse_obj(bytes.as_slice()).unwrap();
        assert_eq!(read.positions, mesh.positions);
        assert_eq!(read.position_faces, mesh.position_faces);
    }

    #[test]
    fn test_read_error_names_the_file() {
        let path = std::env::temp_dir().join("meshlens_invalid_utf8.obj");
        std::fs::write(&path, b"v 0 0 0\nv \xff\xfe 0 0\n").unwrap();
        let result = try_load_obj(&path);
        std::fs::remove_file(&path).ok();

        match result {
            Err(ObjError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_gives_empty_mesh() {
        let mesh = load_obj("/nonexistent/meshlens/missing.obj");
        assert_eq!(mesh.num_vertices(), 0);
        assert!(matches!(
            try_load_obj("/nonexistent/meshlens/missing.obj"),
            Err(ObjError::Io { .. })
        ));
    }
}
