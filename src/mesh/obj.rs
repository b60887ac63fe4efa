//! Wavefront OBJ loading via `tobj`.

use std::path::Path;

use super::MeshRecord;
use crate::colors;
use crate::error::LoadError;
use crate::math::Vec3;

/// Load every model in an OBJ file into a single record.
///
/// Faces keep their original arity. Each material's diffuse color becomes a
/// palette entry; faces without a material cycle through the default palette.
/// Vertex normals are kept only when every object in the file provides them.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshRecord, LoadError> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ..Default::default()
        },
    )?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("ignoring materials of {}: {e}", path.display());
        Vec::new()
    });

    let mut palette: Vec<u32> = materials
        .iter()
        .map(|m| {
            let [r, g, b] = m.diffuse.unwrap_or([1.0, 1.0, 1.0]);
            colors::pack_color(r, g, b, 1.0)
        })
        .collect();
    let material_count = palette.len();
    palette.extend_from_slice(&colors::DEFAULT_PALETTE);

    let mut record = MeshRecord::default();
    let mut keep_normals = true;
    let mut polygon_index = 0usize;

    for model in &models {
        let mesh = &model.mesh;
        let base = record.vertices.len();

        record.vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );

        if mesh.normals.len() == mesh.positions.len() && keep_normals {
            record.vertex_normals.extend(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2])),
            );
        } else {
            keep_normals = false;
        }

        let color = mesh.material_id.filter(|&id| id < material_count);

        // An empty arity list means every face is a triangle.
        let arities: Vec<usize> = if mesh.face_arities.is_empty() {
            vec![3; mesh.indices.len() / 3]
        } else {
            mesh.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut start = 0;
        for arity in arities {
            let Some(face) = mesh.indices.get(start..start + arity) else {
                break;
            };
            record
                .polygons
                .push(face.iter().map(|&i| base + i as usize).collect());
            record.polygon_colors.push(match color {
                Some(id) => id,
                None => material_count + polygon_index % colors::DEFAULT_PALETTE.len(),
            });
            polygon_index += 1;
            start += arity;
        }
    }

    if !keep_normals {
        record.vertex_normals.clear();
    }
    record.palette = palette;

    if record.polygons.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }

    log::debug!(
        "loaded {}: {} vertices, {} polygons from {} object(s)",
        path.display(),
        record.vertices.len(),
        record.polygons.len(),
        models.len()
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshData, PolygonLayout};
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rasterscene-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_quads_keep_their_arity() {
        let path = write_temp(
            "quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\nf 1 2 3\n",
        );
        let record = load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(record.vertices.len(), 4);
        assert_eq!(record.polygons.len(), 2);
        assert_eq!(record.polygons[0].len(), 4);
        assert_eq!(record.polygons[1].len(), 3);

        let mesh = MeshData::new(record).unwrap();
        assert_eq!(mesh.view(PolygonLayout::Triangulated).len(), 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_obj("/nonexistent/definitely-missing.obj");
        assert!(result.is_err());
    }
}
