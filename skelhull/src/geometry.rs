use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use parry3d::math::Point;
use parry3d::transformation::{self, ConvexHullError};

pub const MAX_BONES_PER_VERTEX: usize = 4;

/// Vertex layout shared by the source skin and the generated colliders.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
    pub bone_ids: [u32; MAX_BONES_PER_VERTEX],
    pub bone_weights: [f32; MAX_BONES_PER_VERTEX],
}

impl SkinnedVertex {
    /// A vertex that follows `bone` alone.
    pub fn rigid(position: Vec3, normal: Vec3, bone: u32) -> Self {
        Self {
            position,
            normal,
            tex_coord: Vec2::ZERO,
            bone_ids: [bone, 0, 0, 0],
            bone_weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Linear blend skinning of the position against `bone_matrices`.
    ///
    /// Slots with zero weight or an id outside `bone_matrices` are ignored; a vertex with no
    /// usable slot stays at its bind position.
    pub fn skin_position(&self, bone_matrices: &[Mat4]) -> Vec3 {
        let mut total = 0.0;
        let mut skinned = Vec3::ZERO;
        for (&id, &weight) in self.bone_ids.iter().zip(&self.bone_weights) {
            if weight <= 0.0 {
                continue;
            }
            let Some(matrix) = bone_matrices.get(id as usize) else {
                continue;
            };
            skinned += matrix.transform_point3(self.position) * weight;
            total += weight;
        }
        if total > 0.0 { skinned } else { self.position }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Corner triples of a box, counter-clockwise seen from outside. Corner `i` takes `max`
/// on the x, y, z axis when bit 0, 1, 2 of `i` is set.
const BOX_TRIANGLES: [[u32; 3]; 12] = [
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
];

impl Aabb {
    /// `None` for an empty point set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |aabb, &p| Self {
                min: aabb.min.min(p),
                max: aabb.max.max(p),
            },
        ))
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Rectangular prism spanning the box, as 8 corners and 12 outward-facing triangles.
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        TriangleMesh {
            positions: self.corners().to_vec(),
            faces: BOX_TRIANGLES.to_vec(),
        }
    }
}

/// Indexed triangle list without attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self { positions, faces }
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    /// Whether any triangle has a non-zero area.
    pub fn has_area(&self) -> bool {
        self.triangles()
            .any(|[a, b, c]| flat_normal(a, b, c) != Vec3::ZERO)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.faces.iter().map(|f| {
            [
                self.positions[f[0] as usize],
                self.positions[f[1] as usize],
                self.positions[f[2] as usize],
            ]
        })
    }
}

/// Unit normal of triangle `a b c` from the cross product of its edges; zero when the
/// triangle is degenerate.
pub fn flat_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// 3D convex hull of a point set.
pub fn convex_hull(points: &[Vec3]) -> Result<TriangleMesh, ConvexHullError> {
    let points: Vec<Point<f32>> = points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
    let (vertices, faces) = transformation::try_convex_hull(&points)?;
    Ok(TriangleMesh {
        positions: vertices.iter().map(|p| Vec3::new(p.x, p.y, p.z)).collect(),
        faces,
    })
}

/// Drawable skinned geometry: the source skin or one collider part.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinnedMesh {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

impl SkinnedMesh {
    /// Expands `mesh` into a flat-shaded triangle soup: three vertices per triangle sharing
    /// the face normal, each produced by `vertex(position, normal)`.
    pub fn faceted(
        name: impl Into<String>,
        mesh: &TriangleMesh,
        vertex: impl Fn(Vec3, Vec3) -> SkinnedVertex,
    ) -> Self {
        let mut vertices = Vec::with_capacity(mesh.triangle_count() * 3);
        for [a, b, c] in mesh.triangles() {
            let normal = flat_normal(a, b, c);
            vertices.push(vertex(a, normal));
            vertices.push(vertex(b, normal));
            vertices.push(vertex(c, normal));
        }
        let indices = (0..vertices.len() as u32).collect();
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Vertex buffer contents ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
