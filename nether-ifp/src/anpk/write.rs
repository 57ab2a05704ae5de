//! ANPK encoding

use std::io::Write;

use super::{
    ALIGNMENT, ANIM_TAG, ANIM_UNUSED_LEN, ANIMATION_INFO_SIZE, BONE_NAME_LEN, CPAN_TAG, DGAN_TAG,
    INFO_TAG, NAME_TAG, anim_len, bone_keyframes_size, bone_len, container_size, dgan_size,
};
use crate::document::{Animation, Bone, BoneIdentification, ChannelMask, Container, Keyframe};
use crate::error::IfpError;
use crate::io::{
    padding_for, to_u32, write_f32, write_fixed_string, write_tag, write_u32, write_zeros,
};

/// Write the container that follows the "ANPK" tag
pub(crate) fn write_container(w: &mut dyn Write, container: &Container) -> Result<(), IfpError> {
    let size = to_u32("container size", container_size(container))?;
    tracing::trace!(container = %container.name, size, "writing ANPK container");

    write_u32(w, size)?;
    write_tag(w, INFO_TAG)?;
    write_u32(w, to_u32("container INFO size", container.name.len() + 1 + 4)?)?;
    write_u32(w, to_u32("animation count", container.animations.len())?)?;
    write_padded_name(w, &container.name)?;

    for animation in &container.animations {
        write_animation(w, animation)?;
    }
    Ok(())
}

/// Null-terminated name followed by zeros up to the next 4-byte boundary
fn write_padded_name(w: &mut dyn Write, name: &str) -> Result<(), IfpError> {
    let len = name.len() + 1;
    write_fixed_string(w, name, len)?;
    write_zeros(w, padding_for(len as u64, ALIGNMENT) as usize)
}

fn write_animation(w: &mut dyn Write, animation: &Animation) -> Result<(), IfpError> {
    write_tag(w, NAME_TAG)?;
    write_u32(w, to_u32("animation name length", animation.name.len() + 1)?)?;
    write_padded_name(w, &animation.name)?;

    let chunk_size = to_u32("DGAN size", dgan_size(animation))?;
    tracing::trace!(
        animation = %animation.name,
        bones = animation.bones.len(),
        chunk_size,
        "writing ANPK animation"
    );

    write_tag(w, DGAN_TAG)?;
    write_u32(w, chunk_size)?;
    write_tag(w, INFO_TAG)?;
    write_u32(w, ANIMATION_INFO_SIZE)?;
    write_u32(w, to_u32("bone count", animation.bones.len())?)?;
    write_zeros(w, ANIMATION_INFO_SIZE as usize - 4)?;

    for bone in &animation.bones {
        write_bone(w, bone)?;
    }
    Ok(())
}

fn write_bone(w: &mut dyn Write, bone: &Bone) -> Result<(), IfpError> {
    write_tag(w, CPAN_TAG)?;
    write_u32(w, to_u32("CPAN size", bone_len(bone))?)?;

    write_tag(w, ANIM_TAG)?;
    write_u32(w, anim_len(&bone.identification))?;
    write_fixed_string(w, &bone.name, BONE_NAME_LEN)?;
    write_u32(w, to_u32("keyframe count", bone.keyframes.len())?)?;
    write_zeros(w, ANIM_UNUSED_LEN)?;
    match bone.identification {
        BoneIdentification::BoneId(id) => write_u32(w, id)?,
        BoneIdentification::Sibling { x, y } => {
            write_u32(w, x)?;
            write_u32(w, y)?;
        }
    }

    write_tag(w, &bone.channel_mask.code())?;
    write_u32(w, to_u32("keyframes size", bone_keyframes_size(bone))?)?;
    for kf in &bone.keyframes {
        write_keyframe(w, kf, bone.channel_mask)?;
    }
    Ok(())
}

fn write_keyframe(w: &mut dyn Write, kf: &Keyframe, channels: ChannelMask) -> Result<(), IfpError> {
    let rotation = kf.rotation.conjugate();
    for v in rotation.to_array() {
        write_f32(w, v)?;
    }
    if channels.translation {
        for v in kf.translation.to_array() {
            write_f32(w, v)?;
        }
    }
    if channels.scale {
        for v in kf.scale.to_array() {
            write_f32(w, v)?;
        }
    }
    write_f32(w, kf.time)
}
