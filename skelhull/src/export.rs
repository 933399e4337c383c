use crate::{ColliderMesh, ConvexPart, Error};
use obj::{Group, IndexTuple, ObjData, Object, SimplePolygon};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

impl ConvexPart {
    /// Vertices driven by each bone as `(vertex, weight)` pairs with positive weight, the
    /// data a rigged exporter attaches to the part.
    pub fn bone_vertex_weights(&self) -> BTreeMap<u32, Vec<(u32, f32)>> {
        let mut out: BTreeMap<u32, Vec<(u32, f32)>> = BTreeMap::new();
        for (index, vertex) in self.mesh.vertices.iter().enumerate() {
            for (&bone, &weight) in vertex.bone_ids.iter().zip(&vertex.bone_weights) {
                if weight > 0.0 {
                    out.entry(bone).or_default().push((index as u32, weight));
                }
            }
        }
        out
    }
}

/// Object name of part `index` out of `count`: `Collider_` plus a zero-padded index at
/// least two digits wide.
pub fn collider_object_name(index: usize, count: usize) -> String {
    let width = count.saturating_sub(1).to_string().len().max(2);
    format!("Collider_{index:0width$}")
}

/// `<dir>/Colliders/<stem>_collider.<ext>` next to the source mesh.
pub fn collider_output_path(source: &Path) -> PathBuf {
    let directory = source.parent().unwrap_or_else(|| Path::new(""));
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut file_name = format!("{stem}_collider");
    if let Some(extension) = source.extension() {
        file_name.push('.');
        file_name.push_str(&extension.to_string_lossy());
    }
    directory.join("Colliders").join(file_name)
}

/// Writes every part as a separate Wavefront OBJ object with per-vertex normals.
/// Positions and normals share one global index space across the file.
pub fn write_obj<W: Write>(collider: &ColliderMesh, out: &mut W) -> Result<(), Error> {
    if collider.is_empty() {
        return Ok(());
    }
    let count = collider.len();
    let mut data = ObjData::default();
    for (index, part) in collider.parts.iter().enumerate() {
        let offset = data.position.len();
        for vertex in &part.mesh.vertices {
            data.position.push(vertex.position.to_array());
            data.normal.push(vertex.normal.to_array());
        }
        let polys = part
            .mesh
            .indices
            .chunks_exact(3)
            .map(|tri| {
                SimplePolygon(
                    tri.iter()
                        .map(|&i| {
                            let i = i as usize + offset;
                            IndexTuple(i, None, Some(i))
                        })
                        .collect(),
                )
            })
            .collect();
        let name = collider_object_name(index, count);
        data.objects.push(Object {
            groups: vec![Group {
                polys,
                name: name.clone(),
                index: 0,
                material: None,
            }],
            name,
        });
    }
    data.write_to_buf(out)?;
    Ok(())
}
