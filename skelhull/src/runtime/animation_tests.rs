use crate::test_support::{assert_approx, assert_mat4_approx, assert_vec3_approx};
use crate::{Animation, AnimationChannel, DEFAULT_TICKS_PER_SECOND, Keyframe};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

fn key<T>(time: f32, value: T) -> Keyframe<T> {
    Keyframe { time, value }
}

#[test]
fn position_interpolates_and_clamps() {
    let mut channel = AnimationChannel::new(0, "bone");
    channel.position_keys = vec![key(0.0, Vec3::ZERO), key(10.0, Vec3::new(10.0, 0.0, 0.0))];

    assert_vec3_approx(channel.position_at(5.0), Vec3::new(5.0, 0.0, 0.0));
    assert_vec3_approx(channel.position_at(15.0), Vec3::new(10.0, 0.0, 0.0));
    assert_vec3_approx(channel.position_at(-1.0), Vec3::ZERO);
    assert_vec3_approx(channel.position_at(10.0), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn interior_keys_pick_the_bracketing_pair() {
    let mut channel = AnimationChannel::new(0, "bone");
    channel.scale_keys = vec![
        key(0.0, Vec3::ONE),
        key(2.0, Vec3::splat(3.0)),
        key(4.0, Vec3::splat(1.0)),
    ];

    assert_vec3_approx(channel.scale_at(1.0), Vec3::splat(2.0));
    assert_vec3_approx(channel.scale_at(2.0), Vec3::splat(3.0));
    assert_vec3_approx(channel.scale_at(3.0), Vec3::splat(2.0));
}

#[test]
fn rotation_uses_spherical_interpolation() {
    let mut channel = AnimationChannel::new(0, "bone");
    channel.rotation_keys = vec![
        key(0.0, Quat::IDENTITY),
        key(2.0, Quat::from_rotation_y(FRAC_PI_2)),
    ];

    let halfway = channel.rotation_at(1.0);
    assert_approx(halfway.length(), 1.0);
    assert_vec3_approx(
        halfway * Vec3::X,
        Quat::from_rotation_y(FRAC_PI_2 / 2.0) * Vec3::X,
    );
}

#[test]
fn empty_tracks_yield_the_identity() {
    let channel = AnimationChannel::new(0, "bone");
    assert_eq!(channel.position_at(3.0), Vec3::ZERO);
    assert_eq!(channel.rotation_at(3.0), Quat::IDENTITY);
    assert_eq!(channel.scale_at(3.0), Vec3::ONE);
    assert_mat4_approx(channel.transform_at(3.0), Mat4::IDENTITY);
}

#[test]
fn single_key_holds_for_all_times() {
    let mut channel = AnimationChannel::new(0, "bone");
    channel.position_keys = vec![key(4.0, Vec3::new(1.0, 2.0, 3.0))];
    for time in [0.0, 4.0, 100.0] {
        assert_vec3_approx(channel.position_at(time), Vec3::new(1.0, 2.0, 3.0));
    }
}

#[test]
fn transform_applies_scale_then_rotation_then_translation() {
    let mut channel = AnimationChannel::new(0, "bone");
    channel.position_keys = vec![key(0.0, Vec3::new(1.0, 0.0, 0.0))];
    channel.rotation_keys = vec![key(0.0, Quat::from_rotation_z(FRAC_PI_2))];
    channel.scale_keys = vec![key(0.0, Vec3::splat(2.0))];

    let moved = channel.transform_at(0.0).transform_point3(Vec3::X);
    assert_vec3_approx(moved, Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn missing_rate_falls_back_to_default() {
    assert_eq!(Animation::new("a", 0.0, 10.0).ticks_per_second, DEFAULT_TICKS_PER_SECOND);
    assert_eq!(Animation::new("a", -5.0, 10.0).ticks_per_second, DEFAULT_TICKS_PER_SECOND);
    assert_eq!(Animation::new("a", f32::NAN, 10.0).ticks_per_second, DEFAULT_TICKS_PER_SECOND);
    assert_eq!(Animation::new("a", 30.0, 10.0).ticks_per_second, 30.0);
}

#[test]
fn ticks_wrap_into_the_duration() {
    let animation = Animation::new("a", 1.0, 10.0);
    assert_approx(animation.ticks_at(2.0), 2.0);
    assert_approx(animation.ticks_at(12.0), 2.0);
    assert_approx(animation.ticks_at(10.0), 0.0);
    assert_approx(animation.ticks_at(-1.0), 9.0);
    assert_eq!(animation.ticks_at(-1.0e-9), 0.0);

    let default_rate = Animation::new("a", 0.0, 50.0);
    assert_approx(default_rate.ticks_at(1.0), 25.0);

    let zero_length = Animation::new("a", 1.0, 0.0);
    assert_approx(zero_length.ticks_at(3.0), 3.0);
}

#[test]
fn time_just_before_zero_samples_the_first_key() {
    let mut animation = Animation::new("a", 1.0, 10.0);
    let mut channel = AnimationChannel::new(0, "bone");
    channel.position_keys = vec![key(0.0, Vec3::ZERO), key(10.0, Vec3::new(10.0, 0.0, 0.0))];
    animation.insert_channel(channel);

    let ticks = animation.ticks_at(-1.0e-9);
    let position = animation.channel(0).unwrap().position_at(ticks);
    assert_vec3_approx(position, Vec3::ZERO);
}

#[test]
fn insert_channel_replaces_by_bone() {
    let mut animation = Animation::new("a", 1.0, 1.0);
    animation.insert_channel(AnimationChannel::new(2, "first"));
    animation.insert_channel(AnimationChannel::new(2, "second"));
    assert_eq!(animation.channels.len(), 1);
    assert_eq!(animation.channel(2).unwrap().bone_name, "second");
    assert!(animation.channel(0).is_none());
}
