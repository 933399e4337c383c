use crate::{Animation, Error};
use glam::{Mat4, Vec3};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Bone {
    name: String,
    id: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    offset_matrix: Mat4,

    /// Transform relative to the parent bone. Overwritten by animation playback.
    pub local_transform: Mat4,
    bind_pose_transform: Mat4,

    vertex_weights: HashMap<usize, f32>,
}

impl Bone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Object space to bone space in the bind pose.
    pub fn offset_matrix(&self) -> Mat4 {
        self.offset_matrix
    }

    /// Local transform captured when the bone was added.
    pub fn bind_pose_transform(&self) -> Mat4 {
        self.bind_pose_transform
    }

    /// Skin weight of each vertex this bone influences.
    pub fn vertex_weights(&self) -> &HashMap<usize, f32> {
        &self.vertex_weights
    }
}

/// Bone hierarchy of a skinned mesh plus the geometry it deforms.
///
/// Bones live in a flat arena addressed by id; a bone's parent always has a smaller id.
/// `final_bone_matrices` holds one linear-blend skinning matrix per bone and is refreshed
/// by [`Skeleton::update_bone_matrices`].
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    bone_index: HashMap<String, usize>,
    root: Option<usize>,
    final_bone_matrices: Vec<Mat4>,

    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    vertex_bones: Vec<Vec<usize>>,

    animations: Vec<Animation>,
    animation_index: HashMap<String, usize>,
    current_animation: Option<usize>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bone. `id` must be the next free slot and `parent`, if any, must already
    /// exist, so the hierarchy is always built parent-first.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        id: usize,
        parent: Option<usize>,
        offset_matrix: Mat4,
        local_transform: Mat4,
    ) -> Result<usize, Error> {
        let name = name.into();
        let expected = self.bones.len();
        if id != expected {
            return Err(Error::BoneIdMismatch {
                bone: name,
                expected,
                actual: id,
            });
        }
        if self.bone_index.contains_key(&name) {
            return Err(Error::DuplicateBone { name });
        }
        match parent {
            Some(parent) if parent >= self.bones.len() => {
                return Err(Error::UnknownParentBone { bone: name, parent });
            }
            None => {
                if let Some(existing) = self.root {
                    return Err(Error::MultipleRootBones {
                        bone: name,
                        existing: self.bones[existing].name.clone(),
                    });
                }
                self.root = Some(id);
            }
            Some(_) => {}
        }

        self.bone_index.insert(name.clone(), id);
        self.final_bone_matrices.push(Mat4::IDENTITY);
        if let Some(parent) = parent {
            self.bones[parent].children.push(id);
        }
        self.bones.push(Bone {
            name,
            id,
            parent,
            children: Vec::new(),
            offset_matrix,
            local_transform,
            bind_pose_transform: local_transform,
            vertex_weights: HashMap::new(),
        });
        Ok(id)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, id: usize) -> Option<&Bone> {
        self.bones.get(id)
    }

    pub fn bone_mut(&mut self, id: usize) -> Option<&mut Bone> {
        self.bones.get_mut(id)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bone_index.get(name).copied()
    }

    pub fn root_bone(&self) -> Option<usize> {
        self.root
    }

    /// Skinning matrices indexed by bone id.
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_bone_matrices
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Bones influencing `vertex`, in the order their weights were recorded.
    pub fn vertex_bones(&self, vertex: usize) -> &[usize] {
        self.vertex_bones
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Appends mesh geometry and returns the id of its first vertex. Face indices are
    /// shifted by that base so several meshes can share the skeleton.
    pub(crate) fn append_geometry(&mut self, positions: &[Vec3], faces: &[[u32; 3]]) -> usize {
        let base = self.vertices.len();
        let offset = base as u32;
        self.vertices.extend_from_slice(positions);
        self.vertex_bones.resize_with(self.vertices.len(), Vec::new);
        self.faces
            .extend(faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
        base
    }

    /// Records that `bone` influences `vertex` with `weight`.
    pub(crate) fn record_weight(&mut self, bone: usize, vertex: usize, weight: f32) {
        self.bones[bone].vertex_weights.insert(vertex, weight);
        self.vertex_bones[vertex].push(bone);
    }

    /// Registers an animation. An animation with the same name is replaced in place.
    pub fn add_animation(&mut self, animation: Animation) {
        match self.animation_index.get(&animation.name) {
            Some(&index) => self.animations[index] = animation,
            None => {
                self.animation_index
                    .insert(animation.name.clone(), self.animations.len());
                self.animations.push(animation);
            }
        }
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animation_index
            .get(name)
            .map(|&index| &self.animations[index])
    }

    /// Animation names in load order.
    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|a| a.name.as_str())
    }

    pub fn current_animation(&self) -> Option<&Animation> {
        self.current_animation.map(|index| &self.animations[index])
    }

    pub fn current_animation_name(&self) -> Option<&str> {
        self.current_animation().map(|a| a.name.as_str())
    }

    /// Activates an animation for playback. Bone local transforms are left untouched; bones
    /// without a channel in the new animation keep their last pose.
    pub fn set_current_animation(&mut self, name: &str) -> Result<(), Error> {
        let Some(&index) = self.animation_index.get(name) else {
            log::warn!("animation '{name}' not found in skeleton");
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        };
        self.current_animation = Some(index);
        Ok(())
    }

    /// Deactivates playback and returns every bone to its bind pose.
    pub fn stop_animation(&mut self) {
        self.current_animation = None;
        self.reset_to_bind_pose();
    }

    /// Restores bind-pose local transforms. Final matrices are not recomputed.
    pub fn reset_to_bind_pose(&mut self) {
        for bone in &mut self.bones {
            bone.local_transform = bone.bind_pose_transform;
        }
    }

    pub fn update_bone_matrices(&mut self) {
        self.final_bone_matrices
            .resize(self.bones.len(), Mat4::IDENTITY);
        if let Some(root) = self.root {
            self.propagate(root, Mat4::IDENTITY);
        }
    }

    fn propagate(&mut self, bone: usize, parent_global: Mat4) {
        let global = parent_global * self.bones[bone].local_transform;
        self.final_bone_matrices[bone] = global * self.bones[bone].offset_matrix;
        for i in 0..self.bones[bone].children.len() {
            let child = self.bones[bone].children[i];
            self.propagate(child, global);
        }
    }

    /// Samples the active animation at `time` seconds and refreshes the final matrices.
    /// Without an active animation only the matrices are refreshed.
    pub fn play_current_animation(&mut self, time: f32) {
        if let Some(index) = self.current_animation {
            let animation = &self.animations[index];
            let ticks = animation.ticks_at(time);
            for (&bone, channel) in &animation.channels {
                if let Some(bone) = self.bones.get_mut(bone) {
                    bone.local_transform = channel.transform_at(ticks);
                }
            }
        }
        self.update_bone_matrices();
    }
}
