//! ANP3 decoding

use std::io::Read;

use glam::{Quat, Vec3};

use super::{NAME_LEN, ROTATION_SCALE, TRANSLATION_SCALE};
use crate::document::{Animation, Bone, BoneIdentification, ChannelMask, Container, Keyframe};
use crate::error::IfpError;
use crate::io::{capacity_hint, read_fixed_string, read_i16_array, read_u32, read_u32_array};

/// Read the container that follows the "ANP3" tag
pub(crate) fn read_container(r: &mut dyn Read) -> Result<Container, IfpError> {
    let size = read_u32(r)?;
    let name = read_fixed_string(r, NAME_LEN)?;
    let animation_count = read_u32(r)?;

    let mut animations = Vec::with_capacity(capacity_hint(animation_count));
    for _ in 0..animation_count {
        animations.push(read_animation(r)?);
    }

    let container = Container { name, animations };

    // Traversal is count-driven; the size field is informational only
    let expected = super::container_size(&container);
    if u64::from(size) != expected {
        tracing::warn!(
            "ANP3 container {:?}: size field {} does not match computed size {}",
            container.name,
            size,
            expected
        );
    }

    Ok(container)
}

fn read_animation(r: &mut dyn Read) -> Result<Animation, IfpError> {
    let name = read_fixed_string(r, NAME_LEN)?;
    let [bone_count, keyframes_size, _unused] = read_u32_array::<_, 3>(r)?;

    let mut bones = Vec::with_capacity(capacity_hint(bone_count));
    for _ in 0..bone_count {
        bones.push(read_bone(r)?);
    }

    let animation = Animation { name, bones };
    tracing::trace!(
        animation = %animation.name,
        bones = bone_count,
        keyframes_size,
        "read ANP3 animation"
    );
    Ok(animation)
}

fn read_bone(r: &mut dyn Read) -> Result<Bone, IfpError> {
    let name = read_fixed_string(r, NAME_LEN)?;
    let [channel_flag, keyframe_count, bone_id] = read_u32_array::<_, 3>(r)?;
    let channel_mask = ChannelMask::from_compact_flag(channel_flag);

    let mut keyframes = Vec::with_capacity(capacity_hint(keyframe_count));
    for _ in 0..keyframe_count {
        keyframes.push(read_keyframe(r, channel_mask)?);
    }

    Ok(Bone {
        name,
        identification: BoneIdentification::BoneId(bone_id),
        channel_mask,
        keyframes,
    })
}

fn read_keyframe(r: &mut dyn Read, channels: ChannelMask) -> Result<Keyframe, IfpError> {
    let [qx, qy, qz, qw, time] = read_i16_array::<_, 5>(r)?;
    let rotation = Quat::from_xyzw(
        qx as f32 / ROTATION_SCALE,
        qy as f32 / ROTATION_SCALE,
        qz as f32 / ROTATION_SCALE,
        qw as f32 / ROTATION_SCALE,
    );

    let mut keyframe = Keyframe::new(time as f32, rotation);
    if channels.translation {
        let [px, py, pz] = read_i16_array::<_, 3>(r)?;
        keyframe.translation = Vec3::new(
            px as f32 / TRANSLATION_SCALE,
            py as f32 / TRANSLATION_SCALE,
            pz as f32 / TRANSLATION_SCALE,
        );
    }
    Ok(keyframe)
}
