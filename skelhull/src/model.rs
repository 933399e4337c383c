//! Typed scene view handed over by the import collaborator.

use glam::{Mat4, Quat, Vec2, Vec3};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search by node name.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexWeight {
    pub vertex: usize,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshBone {
    pub name: String,
    /// Object space to bone space in the bind pose.
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub faces: Vec<[u32; 3]>,
    pub bones: Vec<MeshBone>,
}

impl MeshData {
    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

pub type PositionKey = Keyframe<Vec3>;
pub type RotationKey = Keyframe<Quat>;
pub type ScaleKey = Keyframe<Vec3>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAnimation {
    pub node: String,
    pub position_keys: Vec<PositionKey>,
    pub rotation_keys: Vec<RotationKey>,
    pub scale_keys: Vec<ScaleKey>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationData {
    pub name: String,
    /// Zero when the source file does not declare a rate.
    pub ticks_per_second: f32,
    pub duration: f32,
    pub channels: Vec<NodeAnimation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub root: SceneNode,
    pub meshes: Vec<MeshData>,
    pub animations: Vec<AnimationData>,
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self {
            root,
            meshes: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Names of every bone referenced by a mesh's skin data.
    pub fn bone_names(&self) -> HashSet<&str> {
        self.meshes
            .iter()
            .flat_map(|mesh| mesh.bones.iter())
            .map(|bone| bone.name.as_str())
            .collect()
    }

    /// First skin bone with the given name, in mesh order.
    pub fn find_bone(&self, name: &str) -> Option<&MeshBone> {
        self.meshes
            .iter()
            .flat_map(|mesh| mesh.bones.iter())
            .find(|bone| bone.name == name)
    }
}
