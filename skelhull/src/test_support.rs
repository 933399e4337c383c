use crate::{MeshBone, MeshData, Scene, SceneNode, VertexWeight};
use glam::{Mat4, Vec3};

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

pub(crate) fn assert_vec3_approx(actual: Vec3, expected: Vec3) {
    assert!(
        actual.abs_diff_eq(expected, 1.0e-4),
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn assert_mat4_approx(actual: Mat4, expected: Mat4) {
    assert!(
        actual.abs_diff_eq(expected, 1.0e-4),
        "expected {expected}, got {actual}"
    );
}

/// The 8 corners of a cube.
pub(crate) fn cube_points(center: Vec3, half_extent: f32) -> Vec<Vec3> {
    (0..8)
        .map(|i| {
            let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
            center + Vec3::new(sign(1), sign(2), sign(4)) * half_extent
        })
        .collect()
}

pub(crate) fn skin_bone(name: &str, bind_global: Mat4, vertices: std::ops::Range<usize>) -> MeshBone {
    MeshBone {
        name: name.to_string(),
        offset_matrix: bind_global.inverse(),
        weights: vertices
            .map(|vertex| VertexWeight {
                vertex,
                weight: 1.0,
            })
            .collect(),
    }
}

/// `root -> mid -> tip` under a non-bone `Armature` node, one cube of 8 vertices per bone
/// at y = 1, 2, 3.
pub(crate) fn chain_scene() -> Scene {
    let joints = [("root", 1.0), ("mid", 2.0), ("tip", 3.0)];

    let mut positions = Vec::new();
    let mut bones = Vec::new();
    for (i, (name, y)) in joints.iter().enumerate() {
        let center = Vec3::new(0.0, *y, 0.0);
        positions.extend(cube_points(center, 0.25));
        bones.push(skin_bone(
            name,
            Mat4::from_translation(center),
            i * 8..(i + 1) * 8,
        ));
    }

    let hierarchy = SceneNode::new("root").with_child(
        SceneNode::new("mid").with_child(SceneNode::new("tip").with_child(SceneNode::new("tip_end"))),
    );
    let mut scene = Scene::new(
        SceneNode::new("Scene").with_child(
            SceneNode::new("Armature")
                .with_transform(Mat4::from_scale(Vec3::splat(0.01)))
                .with_child(hierarchy),
        ),
    );
    scene.meshes.push(MeshData {
        name: "body".to_string(),
        positions,
        faces: vec![[0, 1, 2], [8, 9, 10], [16, 17, 18]],
        bones,
        ..MeshData::default()
    });
    scene
}

/// `hips` branches into `spine -> head`, `leg_l` and `leg_r`. Ids in build order:
/// hips 0, spine 1, head 2, leg_l 3, leg_r 4.
pub(crate) fn branching_scene() -> Scene {
    let joints = [
        ("hips", Vec3::new(0.0, 1.0, 0.0)),
        ("spine", Vec3::new(0.0, 2.0, 0.0)),
        ("head", Vec3::new(0.0, 3.0, 0.0)),
        ("leg_l", Vec3::new(-0.5, 0.0, 0.0)),
        ("leg_r", Vec3::new(0.5, 0.0, 0.0)),
    ];

    let mut positions = Vec::new();
    let mut bones = Vec::new();
    for (i, (name, center)) in joints.iter().enumerate() {
        positions.extend(cube_points(*center, 0.25));
        bones.push(skin_bone(
            name,
            Mat4::from_translation(*center),
            i * 8..(i + 1) * 8,
        ));
    }

    let hips = SceneNode::new("hips")
        .with_child(SceneNode::new("spine").with_child(SceneNode::new("head")))
        .with_child(SceneNode::new("leg_l"))
        .with_child(SceneNode::new("leg_r"));
    let mut scene = Scene::new(SceneNode::new("Scene").with_child(hips));
    scene.meshes.push(MeshData {
        name: "body".to_string(),
        positions,
        bones,
        ..MeshData::default()
    });
    scene
}
