use crate::{
    Aabb, ColliderShape, DecompositionParams, Error, Skeleton, SkinnedMesh, SkinnedVertex,
    TriangleMesh, convex_hull,
};
use glam::Vec3;
use palette::{FromColor, Hsv, Srgb};

/// Which bones own a collider part.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum BoneSelection {
    /// Branch points of the hierarchy: bones with more than one child.
    #[default]
    Important,
    All,
    /// Exactly these bone ids.
    Custom(Vec<usize>),
}

impl BoneSelection {
    /// Custom selection of the named bones.
    pub fn from_names<'a>(
        skeleton: &Skeleton,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, Error> {
        names
            .into_iter()
            .map(|name| {
                skeleton.find_bone(name).ok_or_else(|| Error::UnknownBone {
                    name: name.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Custom)
    }

    /// Anchor bone ids in ascending order.
    pub fn anchors(&self, skeleton: &Skeleton) -> Result<Vec<usize>, Error> {
        match self {
            Self::Important => Ok(skeleton
                .bones()
                .iter()
                .filter(|bone| bone.children().len() > 1)
                .map(|bone| bone.id())
                .collect()),
            Self::All => Ok((0..skeleton.bone_count()).collect()),
            Self::Custom(ids) => {
                let mut ids = ids.clone();
                ids.sort_unstable();
                ids.dedup();
                if let Some(&id) = ids.iter().find(|&&id| id >= skeleton.bone_count()) {
                    return Err(Error::InvalidBoneId { id });
                }
                Ok(ids)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPart {
    /// Bone the part is rigidly bound to; `None` for static-mesh parts.
    pub bone: Option<usize>,
    /// sRGB display color. Carries no collision meaning.
    pub color: [f32; 3],
    pub mesh: SkinnedMesh,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColliderMesh {
    pub parts: Vec<ConvexPart>,
}

impl ColliderMesh {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.triangle_count()).sum()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.parts
            .iter()
            .filter_map(|p| p.mesh.bounds())
            .reduce(|a, b| a.union(&b))
    }
}

/// `count` colors spread evenly around the hue wheel, starting at red.
pub fn hue_colors(count: usize) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let hue = 360.0 * i as f32 / count as f32;
            let hsv: Hsv = Hsv::new(hue, 1.0, 1.0);
            let rgb: Srgb = Srgb::from_color(hsv);
            [rgb.red, rgb.green, rgb.blue]
        })
        .collect()
}

fn part_shape(points: &[Vec3], shape: ColliderShape) -> Option<TriangleMesh> {
    match shape {
        ColliderShape::ConvexHull => match convex_hull(points) {
            Ok(hull) if hull.has_area() => Some(hull),
            // Collinear or coincident points hull to zero-area triangles.
            Ok(_) => None,
            Err(err) => {
                log::warn!("convex hull of {} points failed: {err}", points.len());
                None
            }
        },
        ColliderShape::Aabb => Aabb::from_points(points).map(|aabb| aabb.to_triangle_mesh()),
    }
}

/// Splits the skinned geometry into one convex part per anchor bone.
///
/// A vertex joins the group of every anchor it has a recorded influence on, whatever the
/// weight, so groups of neighbouring anchors may overlap. Anchors that gather no vertices
/// produce no part.
pub fn decompose_skeleton(
    skeleton: &Skeleton,
    selection: &BoneSelection,
    shape: ColliderShape,
) -> Result<ColliderMesh, Error> {
    let anchors = selection.anchors(skeleton)?;
    if anchors.is_empty() {
        if matches!(selection, BoneSelection::Custom(_)) {
            log::warn!("custom bone selection is empty, no colliders produced");
        }
        return Ok(ColliderMesh::default());
    }

    let mut is_anchor = vec![false; skeleton.bone_count()];
    for &bone in &anchors {
        is_anchor[bone] = true;
    }

    let mut groups: Vec<Vec<Vec3>> = vec![Vec::new(); skeleton.bone_count()];
    for (vertex, &position) in skeleton.vertices().iter().enumerate() {
        for &bone in skeleton.vertex_bones(vertex) {
            if is_anchor[bone] {
                groups[bone].push(position);
            }
        }
    }

    let mut shapes = Vec::new();
    for &bone in &anchors {
        let points = &groups[bone];
        if points.is_empty() {
            log::debug!("bone {bone} has no vertices, skipped");
            continue;
        }
        match part_shape(points, shape) {
            Some(mesh) if mesh.triangle_count() > 0 => shapes.push((bone, mesh)),
            _ => log::debug!("bone {bone} produced an empty shape, skipped"),
        }
    }

    let colors = hue_colors(shapes.len());
    let parts: Vec<ConvexPart> = shapes
        .into_iter()
        .zip(colors)
        .map(|((bone, mesh), color)| {
            let name = skeleton
                .bone(bone)
                .map(|b| b.name().to_string())
                .unwrap_or_default();
            let mesh = SkinnedMesh::faceted(name, &mesh, |position, normal| {
                SkinnedVertex::rigid(position, normal, bone as u32)
            });
            log::trace!("bone {bone}: {} triangles", mesh.triangle_count());
            ConvexPart {
                bone: Some(bone),
                color,
                mesh,
            }
        })
        .collect();

    log::debug!(
        "skeletal decomposition: {} anchors, {} parts",
        anchors.len(),
        parts.len()
    );
    Ok(ColliderMesh { parts })
}

/// Approximate convex decomposition of a static mesh, performed outside this crate
/// (typically by an external process).
pub trait ConvexDecomposer {
    fn decompose(
        &self,
        mesh: &TriangleMesh,
        params: &DecompositionParams,
    ) -> Result<Vec<TriangleMesh>, Error>;
}

/// Runs `decomposer` on a static mesh and wraps its parts as colored, flat-shaded
/// colliders, replacing each part by its bounding box in [`ColliderShape::Aabb`] mode.
pub fn decompose_static_mesh<D: ConvexDecomposer + ?Sized>(
    decomposer: &D,
    mesh: &TriangleMesh,
    params: &DecompositionParams,
) -> Result<ColliderMesh, Error> {
    params.validate()?;
    let raw = decomposer.decompose(mesh, params)?;
    let raw_count = raw.len();

    let shapes: Vec<TriangleMesh> = raw
        .into_iter()
        .filter_map(|part| match params.shape {
            ColliderShape::ConvexHull => Some(part),
            ColliderShape::Aabb => part.bounds().map(|aabb| aabb.to_triangle_mesh()),
        })
        .filter(|part| part.triangle_count() > 0)
        .collect();

    let colors = hue_colors(shapes.len());
    let parts: Vec<ConvexPart> = shapes
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (shape, color))| ConvexPart {
            bone: None,
            color,
            mesh: SkinnedMesh::faceted(format!("part_{i}"), shape, |position, normal| {
                SkinnedVertex {
                    position,
                    normal,
                    ..SkinnedVertex::default()
                }
            }),
        })
        .collect();

    log::debug!(
        "static decomposition: {raw_count} raw parts, {} colliders",
        parts.len()
    );
    Ok(ColliderMesh { parts })
}
