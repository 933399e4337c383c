//! JSON interchange for scenes and decomposition settings.
//!
//! Matrices are 16 floats in column-major order, quaternions are `[x, y, z, w]`.

use crate::{
    AnimationData, ColliderShape, DecompositionParams, DecompositionPreset, Error, Keyframe,
    MeshBone, MeshData, NodeAnimation, Scene, SceneNode, VertexWeight,
};
use glam::{Mat4, Quat, Vec2, Vec3};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SceneDef {
    root: NodeDef,
    #[serde(default)]
    meshes: Vec<MeshDef>,
    #[serde(default)]
    animations: Vec<AnimationDef>,
}

#[derive(Debug, Deserialize)]
struct NodeDef {
    name: String,
    #[serde(default)]
    transform: Option<[f32; 16]>,
    #[serde(default)]
    children: Vec<NodeDef>,
}

#[derive(Debug, Deserialize)]
struct MeshDef {
    #[serde(default)]
    name: String,
    positions: Vec<[f32; 3]>,
    #[serde(default)]
    normals: Vec<[f32; 3]>,
    #[serde(default, rename = "texCoords")]
    tex_coords: Vec<[f32; 2]>,
    #[serde(default)]
    faces: Vec<[u32; 3]>,
    #[serde(default)]
    bones: Vec<BoneDef>,
}

#[derive(Debug, Deserialize)]
struct BoneDef {
    name: String,
    offset: [f32; 16],
    /// `[vertex, weight]` pairs.
    #[serde(default)]
    weights: Vec<(usize, f32)>,
}

#[derive(Debug, Deserialize)]
struct AnimationDef {
    name: String,
    #[serde(default, rename = "ticksPerSecond")]
    ticks_per_second: f32,
    duration: f32,
    #[serde(default)]
    channels: Vec<ChannelDef>,
}

#[derive(Debug, Deserialize)]
struct ChannelDef {
    node: String,
    #[serde(default)]
    position: Vec<KeyDef<[f32; 3]>>,
    #[serde(default)]
    rotation: Vec<KeyDef<[f32; 4]>>,
    #[serde(default)]
    scale: Vec<KeyDef<[f32; 3]>>,
}

#[derive(Debug, Deserialize)]
struct KeyDef<T> {
    time: f32,
    value: T,
}

#[derive(Debug, Default, Deserialize)]
struct ParamsDef {
    #[serde(default)]
    preset: Option<String>,
    #[serde(default)]
    threshold: Option<f32>,
    #[serde(default)]
    resolution: Option<u32>,
    /// `-1` for unlimited.
    #[serde(default, rename = "maxConvexHulls")]
    max_convex_hulls: Option<i64>,
    #[serde(default)]
    extrude: Option<f32>,
    #[serde(default)]
    shape: Option<String>,
}

fn parse_error(message: impl Into<String>) -> Error {
    Error::JsonParse {
        message: message.into(),
    }
}

impl From<NodeDef> for SceneNode {
    fn from(def: NodeDef) -> Self {
        SceneNode {
            name: def.name,
            transform: def
                .transform
                .map(|m| Mat4::from_cols_array(&m))
                .unwrap_or(Mat4::IDENTITY),
            children: def.children.into_iter().map(SceneNode::from).collect(),
        }
    }
}

impl From<MeshDef> for MeshData {
    fn from(def: MeshDef) -> Self {
        MeshData {
            name: def.name,
            positions: def.positions.into_iter().map(Vec3::from_array).collect(),
            normals: def.normals.into_iter().map(Vec3::from_array).collect(),
            tex_coords: def.tex_coords.into_iter().map(Vec2::from_array).collect(),
            faces: def.faces,
            bones: def
                .bones
                .into_iter()
                .map(|bone| MeshBone {
                    name: bone.name,
                    offset_matrix: Mat4::from_cols_array(&bone.offset),
                    weights: bone
                        .weights
                        .into_iter()
                        .map(|(vertex, weight)| VertexWeight { vertex, weight })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<AnimationDef> for AnimationData {
    fn from(def: AnimationDef) -> Self {
        fn keys<T, U>(defs: Vec<KeyDef<T>>, convert: impl Fn(T) -> U) -> Vec<Keyframe<U>> {
            defs.into_iter()
                .map(|k| Keyframe {
                    time: k.time,
                    value: convert(k.value),
                })
                .collect()
        }

        AnimationData {
            name: def.name,
            ticks_per_second: def.ticks_per_second,
            duration: def.duration,
            channels: def
                .channels
                .into_iter()
                .map(|channel| NodeAnimation {
                    node: channel.node,
                    position_keys: keys(channel.position, Vec3::from_array),
                    rotation_keys: keys(channel.rotation, Quat::from_array),
                    scale_keys: keys(channel.scale, Vec3::from_array),
                })
                .collect(),
        }
    }
}

impl Scene {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: SceneDef = serde_json::from_str(input).map_err(|e| parse_error(e.to_string()))?;
        Ok(Scene {
            root: def.root.into(),
            meshes: def.meshes.into_iter().map(MeshData::from).collect(),
            animations: def.animations.into_iter().map(AnimationData::from).collect(),
        })
    }
}

impl DecompositionParams {
    /// Starts from `preset` (Balanced when absent) and overrides the fields present, then
    /// validates the result.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: ParamsDef = serde_json::from_str(input).map_err(|e| parse_error(e.to_string()))?;

        let preset = match def.preset.as_deref() {
            None => DecompositionPreset::default(),
            Some("fast") => DecompositionPreset::Fast,
            Some("balanced") => DecompositionPreset::Balanced,
            Some("accurate") => DecompositionPreset::Accurate,
            Some(other) => return Err(parse_error(format!("unknown preset '{other}'"))),
        };
        let mut params = DecompositionParams::preset(preset);

        if let Some(threshold) = def.threshold {
            params.threshold = threshold;
        }
        if let Some(resolution) = def.resolution {
            params.resolution = resolution;
        }
        if let Some(max) = def.max_convex_hulls {
            params.max_convex_hulls = match max {
                -1 => None,
                max => Some(u32::try_from(max).map_err(|_| Error::InvalidValue {
                    message: format!("max_convex_hulls {max} is not a hull count"),
                })?),
            };
        }
        if let Some(extrude) = def.extrude {
            params.extrude = extrude;
        }
        params.shape = match def.shape.as_deref() {
            None | Some("convexHull") => ColliderShape::ConvexHull,
            Some("aabb") => ColliderShape::Aabb,
            Some(other) => return Err(parse_error(format!("unknown collider shape '{other}'"))),
        };

        params.validate()?;
        Ok(params)
    }
}
