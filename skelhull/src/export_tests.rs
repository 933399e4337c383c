use crate::{
    ColliderMesh, ConvexPart, SkinnedMesh, SkinnedVertex, TriangleMesh, collider_object_name,
    collider_output_path, write_obj,
};
use glam::Vec3;
use std::path::{Path, PathBuf};

fn triangle_part(bone: u32, offset: Vec3) -> ConvexPart {
    let mesh = TriangleMesh::new(
        vec![offset, offset + Vec3::X, offset + Vec3::Y],
        vec![[0, 1, 2]],
    );
    ConvexPart {
        bone: Some(bone as usize),
        color: [1.0, 0.0, 0.0],
        mesh: SkinnedMesh::faceted("part", &mesh, |position, normal| {
            SkinnedVertex::rigid(position, normal, bone)
        }),
    }
}

#[test]
fn object_names_are_zero_padded() {
    assert_eq!(collider_object_name(0, 1), "Collider_00");
    assert_eq!(collider_object_name(7, 10), "Collider_07");
    assert_eq!(collider_object_name(9, 101), "Collider_009");
    assert_eq!(collider_object_name(99, 100), "Collider_99");
    assert_eq!(collider_object_name(3, 0), "Collider_03");
}

#[test]
fn output_path_sits_in_a_colliders_folder() {
    assert_eq!(
        collider_output_path(Path::new("assets/hero.fbx")),
        PathBuf::from("assets/Colliders/hero_collider.fbx")
    );
    assert_eq!(
        collider_output_path(Path::new("mesh.obj")),
        PathBuf::from("Colliders/mesh_collider.obj")
    );
    assert_eq!(
        collider_output_path(Path::new("dir/noext")),
        PathBuf::from("dir/Colliders/noext_collider")
    );
}

/// `(position, normal)` indices of a face corner such as `4//4` or `4/1/4`.
fn corner_indices(token: &str) -> (usize, usize) {
    let position = token.split('/').next().unwrap().parse().unwrap();
    let normal = token.rsplit('/').next().unwrap().parse().unwrap();
    (position, normal)
}

fn floats(line: &str) -> Vec<f32> {
    line.split_whitespace()
        .skip(1)
        .map(|v| v.parse().unwrap())
        .collect()
}

#[test]
fn obj_objects_use_global_indices() {
    let collider = ColliderMesh {
        parts: vec![
            triangle_part(0, Vec3::ZERO),
            triangle_part(1, Vec3::new(0.0, 0.0, 2.0)),
        ],
    };
    let mut out = Vec::new();
    write_obj(&collider, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let positions: Vec<Vec<f32>> = lines
        .iter()
        .filter(|l| l.starts_with("v "))
        .map(|l| floats(l))
        .collect();
    let normals: Vec<Vec<f32>> = lines
        .iter()
        .filter(|l| l.starts_with("vn "))
        .map(|l| floats(l))
        .collect();
    assert_eq!(positions.len(), 6);
    assert_eq!(normals.len(), 6);
    assert_eq!(positions[4], [1.0, 0.0, 2.0]);
    assert!(normals.iter().all(|n| n == &[0.0, 0.0, 1.0]));

    let faces: Vec<Vec<(usize, usize)>> = lines
        .iter()
        .filter(|l| l.starts_with("f "))
        .map(|l| l.split_whitespace().skip(1).map(corner_indices).collect())
        .collect();
    assert_eq!(
        faces,
        [
            vec![(1, 1), (2, 2), (3, 3)],
            vec![(4, 4), (5, 5), (6, 6)],
        ]
    );

    let first = lines.iter().position(|l| *l == "o Collider_00").unwrap();
    let second = lines.iter().position(|l| *l == "o Collider_01").unwrap();
    assert!(first < second);
    let second_face = lines.iter().position(|l| l.starts_with("f 4")).unwrap();
    assert!(second < second_face);
}

#[test]
fn empty_collider_writes_nothing() {
    let mut out = Vec::new();
    write_obj(&ColliderMesh::default(), &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn rigid_parts_report_one_bone() {
    let part = triangle_part(3, Vec3::ZERO);
    let weights = part.bone_vertex_weights();
    assert_eq!(weights.len(), 1);
    assert_eq!(weights[&3], [(0, 1.0), (1, 1.0), (2, 1.0)]);
}

#[test]
fn blended_vertices_report_every_influence() {
    let mut part = triangle_part(0, Vec3::ZERO);
    part.mesh.vertices[1].bone_ids = [0, 2, 0, 0];
    part.mesh.vertices[1].bone_weights = [0.75, 0.25, 0.0, 0.0];

    let weights = part.bone_vertex_weights();
    assert_eq!(weights.keys().copied().collect::<Vec<_>>(), [0, 2]);
    assert_eq!(weights[&0], [(0, 1.0), (1, 0.75), (2, 1.0)]);
    assert_eq!(weights[&2], [(1, 0.25)]);
}
