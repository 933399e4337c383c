use crate::{Keyframe, PositionKey, RotationKey, ScaleKey};
use glam::{Mat4, Quat, Vec3};
use std::collections::BTreeMap;

/// Playback rate used when the source declares none.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Keyframe tracks driving a single bone. Each track is sorted by time and sampled
/// independently of the other two.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationChannel {
    pub bone: usize,
    pub bone_name: String,
    pub position_keys: Vec<PositionKey>,
    pub rotation_keys: Vec<RotationKey>,
    pub scale_keys: Vec<ScaleKey>,
}

impl AnimationChannel {
    pub fn new(bone: usize, bone_name: impl Into<String>) -> Self {
        Self {
            bone,
            bone_name: bone_name.into(),
            ..Self::default()
        }
    }

    pub fn position_at(&self, time: f32) -> Vec3 {
        sample_track(&self.position_keys, time, Vec3::ZERO, Vec3::lerp)
    }

    pub fn rotation_at(&self, time: f32) -> Quat {
        sample_track(&self.rotation_keys, time, Quat::IDENTITY, Quat::slerp)
    }

    pub fn scale_at(&self, time: f32) -> Vec3 {
        sample_track(&self.scale_keys, time, Vec3::ONE, Vec3::lerp)
    }

    /// Local bone transform at `time` (in ticks): translate * rotate * scale.
    pub fn transform_at(&self, time: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale_at(time),
            self.rotation_at(time),
            self.position_at(time),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub name: String,
    pub ticks_per_second: f32,
    /// Length in ticks.
    pub duration: f32,
    pub channels: BTreeMap<usize, AnimationChannel>,
}

impl Animation {
    pub fn new(name: impl Into<String>, ticks_per_second: f32, duration: f32) -> Self {
        let ticks_per_second = if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        };
        Self {
            name: name.into(),
            ticks_per_second,
            duration,
            channels: BTreeMap::new(),
        }
    }

    /// Replaces any channel already bound to the same bone.
    pub fn insert_channel(&mut self, channel: AnimationChannel) {
        self.channels.insert(channel.bone, channel);
    }

    pub fn channel(&self, bone: usize) -> Option<&AnimationChannel> {
        self.channels.get(&bone)
    }

    /// Converts seconds to ticks, wrapped into `[0, duration)`.
    pub fn ticks_at(&self, seconds: f32) -> f32 {
        let ticks = seconds * self.ticks_per_second;
        if self.duration > 0.0 {
            // rem_euclid rounds tiny negative inputs up to exactly `duration`.
            let wrapped = ticks.rem_euclid(self.duration);
            if wrapped < self.duration { wrapped } else { 0.0 }
        } else {
            ticks
        }
    }
}

fn sample_track<T: Copy>(
    keys: &[Keyframe<T>],
    time: f32,
    default: T,
    interpolate: impl Fn(T, T, f32) -> T,
) -> T {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return default;
    };

    let index = keys.partition_point(|k| k.time <= time);
    if index == 0 {
        return first.value;
    }
    if index >= keys.len() {
        return last.value;
    }

    // prev.time <= time < next.time, so the span is positive.
    let prev = &keys[index - 1];
    let next = &keys[index];
    let factor = (time - prev.time) / (next.time - prev.time);
    interpolate(prev.value, next.value, factor)
}
