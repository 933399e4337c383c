use crate::{
    Animation, AnimationChannel, AnimationData, Error, Keyframe, MAX_BONES_PER_VERTEX, MeshData,
    Scene, SceneNode, Skeleton, SkinnedMesh, SkinnedVertex,
};
use glam::{Vec2, Vec3};
use std::collections::HashSet;

/// Skeleton, skin and animations loaded from one scene.
#[derive(Clone, Debug)]
pub struct SkinnedModel {
    pub skeleton: Skeleton,
    /// One entry per skinned mesh in the scene, in scene order.
    pub meshes: Vec<SkinnedMesh>,
}

impl SkinnedModel {
    /// Runs the full skeletal load: hierarchy, skin weights, animations, then a bind-pose
    /// matrix update. Fails without a partial result when the skeleton cannot be built.
    pub fn from_scene(scene: &Scene) -> Result<Self, Error> {
        let mut skeleton = build_skeleton(scene)?;

        let mut meshes = Vec::new();
        for mesh in scene.meshes.iter().filter(|m| m.has_bones()) {
            meshes.push(assign_skin_weights(&mut skeleton, mesh)?);
        }

        load_animations(&mut skeleton, &scene.animations);
        skeleton.update_bone_matrices();

        log::debug!(
            "loaded skinned model: {} bones, {} vertices, {} meshes, {} animations",
            skeleton.bone_count(),
            skeleton.vertices().len(),
            meshes.len(),
            skeleton.animations().len()
        );
        Ok(Self { skeleton, meshes })
    }
}

/// Shallowest node whose name is a skin bone. Ties go to the first node in depth-first
/// order.
pub fn find_root_bone<'a>(root: &'a SceneNode, bone_names: &HashSet<&str>) -> Option<&'a SceneNode> {
    fn search<'a>(
        node: &'a SceneNode,
        bone_names: &HashSet<&str>,
        depth: usize,
        best: &mut Option<(usize, &'a SceneNode)>,
    ) {
        if best.is_some_and(|(best_depth, _)| best_depth <= depth) {
            return;
        }
        if bone_names.contains(node.name.as_str()) {
            *best = Some((depth, node));
            return;
        }
        for child in &node.children {
            search(child, bone_names, depth + 1, best);
        }
    }

    let mut best = None;
    search(root, bone_names, 0, &mut best);
    best.map(|(_, node)| node)
}

/// Builds the bone hierarchy. Local transforms are recovered from the offset matrices
/// rather than the node transforms, and non-bone nodes are collapsed out.
pub fn build_skeleton(scene: &Scene) -> Result<Skeleton, Error> {
    let bone_names = scene.bone_names();
    let root = find_root_bone(&scene.root, &bone_names).ok_or(Error::RootBoneNotFound)?;

    let mut skeleton = Skeleton::new();
    construct(&mut skeleton, scene, root, None)?;
    Ok(skeleton)
}

fn construct(
    skeleton: &mut Skeleton,
    scene: &Scene,
    node: &SceneNode,
    parent: Option<usize>,
) -> Result<(), Error> {
    let Some(bone) = scene.find_bone(&node.name) else {
        for child in &node.children {
            construct(skeleton, scene, child, parent)?;
        }
        return Ok(());
    };

    let offset_matrix = bone.offset_matrix;
    let determinant = offset_matrix.determinant();
    if !determinant.is_finite() || determinant.abs() < 1.0e-12 {
        return Err(Error::DegenerateOffsetMatrix {
            bone: node.name.clone(),
        });
    }

    let bind_pose_global = offset_matrix.inverse();
    let local_transform = match parent {
        None => bind_pose_global,
        // The parent's offset matrix is the inverse of its bind-pose global transform.
        Some(parent) => skeleton.bones()[parent].offset_matrix() * bind_pose_global,
    };

    let id = skeleton.add_bone(
        node.name.clone(),
        skeleton.bone_count(),
        parent,
        offset_matrix,
        local_transform,
    )?;
    for child in &node.children {
        construct(skeleton, scene, child, Some(id))?;
    }
    Ok(())
}

/// Records `mesh`'s skin weights on the skeleton and returns its drawable skin.
///
/// Each vertex keeps the first [`MAX_BONES_PER_VERTEX`] non-zero influences in the order the
/// mesh lists them, normalized to sum to one. Vertices without influence are bound fully
/// to bone 0.
pub fn assign_skin_weights(skeleton: &mut Skeleton, mesh: &MeshData) -> Result<SkinnedMesh, Error> {
    let count = mesh.positions.len();
    if let Some((bone, weight)) = mesh
        .bones
        .iter()
        .flat_map(|b| b.weights.iter().map(move |w| (b, w)))
        .find(|(_, w)| w.vertex >= count)
    {
        return Err(Error::VertexOutOfRange {
            bone: bone.name.clone(),
            vertex: weight.vertex,
            count,
        });
    }
    if let Some(face) = mesh.faces.iter().find(|f| f.iter().any(|&i| i as usize >= count)) {
        return Err(Error::InvalidValue {
            message: format!(
                "mesh '{}': face {face:?} indexes past {count} vertices",
                mesh.name
            ),
        });
    }

    let base = skeleton.append_geometry(&mesh.positions, &mesh.faces);
    let mut bone_ids = vec![[0u32; MAX_BONES_PER_VERTEX]; count];
    let mut bone_weights = vec![[0.0f32; MAX_BONES_PER_VERTEX]; count];
    let mut dropped = 0usize;

    for bone in &mesh.bones {
        let Some(bone_id) = skeleton.find_bone(&bone.name) else {
            log::warn!(
                "mesh '{}' is skinned to '{}', which is not part of the skeleton",
                mesh.name,
                bone.name
            );
            continue;
        };

        for weight in &bone.weights {
            skeleton.record_weight(bone_id, base + weight.vertex, weight.weight);

            let ids = &mut bone_ids[weight.vertex];
            let weights = &mut bone_weights[weight.vertex];
            match weights.iter().position(|&w| w == 0.0) {
                Some(slot) => {
                    ids[slot] = bone_id as u32;
                    weights[slot] = weight.weight;
                }
                None => dropped += 1,
            }
        }
    }
    if dropped > 0 {
        log::warn!(
            "mesh '{}': {dropped} influences beyond {MAX_BONES_PER_VERTEX} per vertex were dropped",
            mesh.name
        );
    }

    for (ids, weights) in bone_ids.iter_mut().zip(&mut bone_weights) {
        normalize_skin_weights(ids, weights);
    }

    let vertices = (0..count)
        .map(|i| SkinnedVertex {
            position: mesh.positions[i],
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO),
            tex_coord: mesh.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
            bone_ids: bone_ids[i],
            bone_weights: bone_weights[i],
        })
        .collect();

    Ok(SkinnedMesh {
        name: mesh.name.clone(),
        vertices,
        indices: mesh.faces.iter().flatten().copied().collect(),
    })
}

/// Scales the weights to sum to one. An all-zero set becomes full weight on bone 0.
pub fn normalize_skin_weights(
    ids: &mut [u32; MAX_BONES_PER_VERTEX],
    weights: &mut [f32; MAX_BONES_PER_VERTEX],
) {
    let sum: f32 = weights.iter().sum();
    if sum <= 0.0 {
        *ids = [0; MAX_BONES_PER_VERTEX];
        *weights = [1.0, 0.0, 0.0, 0.0];
        return;
    }
    if sum != 1.0 {
        for w in weights.iter_mut() {
            *w /= sum;
        }
    }
}

/// Loads keyframe tracks into the skeleton. Channels for nodes that are not bones (scene
/// root, bone ends) are skipped.
pub fn load_animations(skeleton: &mut Skeleton, animations: &[AnimationData]) {
    for data in animations {
        let mut animation = Animation::new(data.name.clone(), data.ticks_per_second, data.duration);

        for node in &data.channels {
            let Some(bone) = skeleton.find_bone(&node.node) else {
                log::trace!(
                    "animation '{}': skipping channel for non-bone node '{}'",
                    data.name,
                    node.node
                );
                continue;
            };

            let mut channel = AnimationChannel::new(bone, node.node.clone());
            channel.position_keys = sorted_by_time(&node.position_keys);
            channel.rotation_keys = sorted_by_time(&node.rotation_keys);
            for key in &mut channel.rotation_keys {
                key.value = key.value.normalize();
            }
            channel.scale_keys = sorted_by_time(&node.scale_keys);
            animation.insert_channel(channel);
        }

        log::debug!(
            "animation '{}': {} channels, {} ticks at {} ticks/s",
            animation.name,
            animation.channels.len(),
            animation.duration,
            animation.ticks_per_second
        );
        skeleton.add_animation(animation);
    }
}

fn sorted_by_time<T: Copy>(keys: &[Keyframe<T>]) -> Vec<Keyframe<T>> {
    let mut keys = keys.to_vec();
    keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    keys
}
