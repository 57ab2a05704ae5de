//! ANP3 encoding
//!
//! Callers validate the container first; quantization errors here are
//! unreachable for validated input but still propagate.

use std::io::Write;

use glam::{Quat, Vec3};

use super::{
    ANIMATION_UNUSED, NAME_LEN, ROTATION_SCALE, TRANSLATION_SCALE, animation_keyframes_size,
    container_size,
};
use crate::document::{Animation, Bone, BoneIdentification, Container, Keyframe};
use crate::error::IfpError;
use crate::io::{to_u32, write_fixed_string, write_i16, write_u32};

/// Write the container that follows the "ANP3" tag (without block padding)
pub(crate) fn write_container(w: &mut dyn Write, container: &Container) -> Result<(), IfpError> {
    let size = to_u32("container size", container_size(container))?;
    tracing::trace!(container = %container.name, size, "writing ANP3 container");

    write_u32(w, size)?;
    write_fixed_string(w, &container.name, NAME_LEN)?;
    write_u32(w, to_u32("animation count", container.animations.len())?)?;
    for animation in &container.animations {
        write_animation(w, animation)?;
    }
    Ok(())
}

fn write_animation(w: &mut dyn Write, animation: &Animation) -> Result<(), IfpError> {
    write_fixed_string(w, &animation.name, NAME_LEN)?;
    write_u32(w, to_u32("bone count", animation.bones.len())?)?;
    write_u32(w, to_u32("keyframes size", animation_keyframes_size(animation))?)?;
    write_u32(w, ANIMATION_UNUSED)?;
    for bone in &animation.bones {
        write_bone(w, bone)?;
    }
    Ok(())
}

fn write_bone(w: &mut dyn Write, bone: &Bone) -> Result<(), IfpError> {
    let bone_id = match bone.identification {
        BoneIdentification::BoneId(id) => id,
        BoneIdentification::Sibling { .. } => {
            return Err(IfpError::UnsupportedIdentification {
                format: "ANP3",
                bone: bone.name.clone(),
            });
        }
    };

    write_fixed_string(w, &bone.name, NAME_LEN)?;
    write_u32(w, bone.channel_mask.compact_flag())?;
    write_u32(w, to_u32("keyframe count", bone.keyframes.len())?)?;
    write_u32(w, bone_id)?;
    for kf in &bone.keyframes {
        write_keyframe(w, kf, bone.channel_mask.translation)?;
    }
    Ok(())
}

fn write_keyframe(w: &mut dyn Write, kf: &Keyframe, translation: bool) -> Result<(), IfpError> {
    for v in quantize_rotation(kf.rotation)? {
        write_i16(w, v)?;
    }
    write_i16(w, quantize_time(kf.time)?)?;
    if translation {
        for v in quantize_translation(kf.translation)? {
            write_i16(w, v)?;
        }
    }
    Ok(())
}

// =============================================================================
// Quantization
// =============================================================================

/// Scale and truncate toward zero, failing when the result leaves `i16`
fn quantize(field: &'static str, value: f32, scale: f32) -> Result<i16, IfpError> {
    let scaled = (value * scale).trunc();
    if !scaled.is_finite() || scaled < i16::MIN as f32 || scaled > i16::MAX as f32 {
        return Err(IfpError::ValueOutOfRange { field, value });
    }
    Ok(scaled as i16)
}

pub(crate) fn quantize_rotation(q: Quat) -> Result<[i16; 4], IfpError> {
    Ok([
        quantize("rotation.x", q.x, ROTATION_SCALE)?,
        quantize("rotation.y", q.y, ROTATION_SCALE)?,
        quantize("rotation.z", q.z, ROTATION_SCALE)?,
        quantize("rotation.w", q.w, ROTATION_SCALE)?,
    ])
}

pub(crate) fn quantize_translation(t: Vec3) -> Result<[i16; 3], IfpError> {
    Ok([
        quantize("translation.x", t.x, TRANSLATION_SCALE)?,
        quantize("translation.y", t.y, TRANSLATION_SCALE)?,
        quantize("translation.z", t.z, TRANSLATION_SCALE)?,
    ])
}

/// Ticks are stored as-is
pub(crate) fn quantize_time(time: f32) -> Result<i16, IfpError> {
    quantize("time", time, 1.0)
}
