//! ANP3: compact/legacy variant
//!
//! # Layout
//! ```text
//! Container:
//!   size u32                  - bytes after this field (28 + animations)
//!   name [u8; 24]
//!   animation_count u32
//!
//! Animation (36-byte header):
//!   name [u8; 24]
//!   bone_count u32
//!   keyframes_size u32        - keyframe bytes of all bones
//!   unused u32                - always written as 1
//!
//! Bone (36-byte header):
//!   name [u8; 24]
//!   channel_flag u32          - 3 = rotation, 4 = rotation + translation
//!   keyframe_count u32
//!   bone_id u32
//!
//! Keyframe (10 or 16 bytes):
//!   rotation [i16; 4]         - x, y, z, w scaled by 4096
//!   time i16                  - raw tick count
//!   translation [i16; 3]      - scaled by 1024, only with flag 4
//! ```
//!
//! The file is zero-padded to the next 2048-byte boundary.

use std::io::{Read, Write};

use crate::document::{Animation, Bone, BoneIdentification, Container};
use crate::error::IfpError;
use crate::format::{IfpCodec, IfpFormat};
use crate::io::{check_fixed_string, to_u32};

mod read;
mod write;


/// Width of every name slot
pub const NAME_LEN: usize = 24;

/// Container fields counted by its size field (name + animation count)
pub const CONTAINER_HEADER_SIZE: u32 = 28;

/// Animation header size
pub const ANIMATION_HEADER_SIZE: u32 = 36;

/// Bone header size
pub const BONE_HEADER_SIZE: u32 = 36;

/// Rotation-only keyframe size
pub const KEYFRAME_SIZE: u32 = 10;

/// Rotation + translation keyframe size
pub const KEYFRAME_SIZE_TRANSLATION: u32 = 16;

/// Fixed-point scale of rotation components
pub const ROTATION_SCALE: f32 = 4096.0;

/// Fixed-point scale of translation components
pub const TRANSLATION_SCALE: f32 = 1024.0;

/// Files are padded to a multiple of this
pub const BLOCK_SIZE: u64 = 2048;

/// Value written into each animation's unused field
pub(crate) const ANIMATION_UNUSED: u32 = 1;

/// Codec for ANP3 files
#[derive(Debug, Clone, Copy, Default)]
pub struct Anp3Codec;

impl IfpCodec for Anp3Codec {
    fn format(&self) -> IfpFormat {
        IfpFormat::Anp3
    }

    fn read_container(&self, reader: &mut dyn Read) -> Result<Container, IfpError> {
        read::read_container(reader)
    }

    fn validate(&self, container: &Container) -> Result<(), IfpError> {
        check_fixed_string(&container.name, NAME_LEN)?;
        for animation in &container.animations {
            check_fixed_string(&animation.name, NAME_LEN)?;
            for bone in &animation.bones {
                validate_bone(bone)?;
            }
        }
        // Every count and nested size is bounded by the container size
        to_u32("container size", container_size(container))?;
        Ok(())
    }

    fn write_container(
        &self,
        writer: &mut dyn Write,
        container: &Container,
    ) -> Result<(), IfpError> {
        self.validate(container)?;
        write::write_container(writer, container)
    }

    fn container_size(&self, container: &Container) -> Result<u32, IfpError> {
        to_u32("container size", container_size(container))
    }

    fn block_size(&self) -> Option<u64> {
        Some(BLOCK_SIZE)
    }
}

fn validate_bone(bone: &Bone) -> Result<(), IfpError> {
    check_fixed_string(&bone.name, NAME_LEN)?;
    if bone.keyframes.is_empty() {
        return Err(IfpError::EmptyBone {
            bone: bone.name.clone(),
        });
    }
    if bone.channel_mask.scale {
        return Err(IfpError::UnsupportedChannel {
            format: "ANP3",
            bone: bone.name.clone(),
        });
    }
    if let BoneIdentification::Sibling { .. } = bone.identification {
        return Err(IfpError::UnsupportedIdentification {
            format: "ANP3",
            bone: bone.name.clone(),
        });
    }
    bone.check_channels()?;
    for kf in &bone.keyframes {
        write::quantize_rotation(kf.rotation)?;
        write::quantize_time(kf.time)?;
        if bone.channel_mask.translation {
            write::quantize_translation(kf.translation)?;
        }
    }
    Ok(())
}

// =============================================================================
// Sizes
// =============================================================================

/// Size of one keyframe record for the given bone
pub fn keyframe_size(bone: &Bone) -> u32 {
    if bone.channel_mask.translation {
        KEYFRAME_SIZE_TRANSLATION
    } else {
        KEYFRAME_SIZE
    }
}

/// Keyframe bytes of one bone
pub fn bone_keyframes_size(bone: &Bone) -> u64 {
    bone.keyframes.len() as u64 * u64::from(keyframe_size(bone))
}

/// Bone record size (header + keyframes)
pub fn bone_size(bone: &Bone) -> u64 {
    u64::from(BONE_HEADER_SIZE) + bone_keyframes_size(bone)
}

/// Value of an animation's keyframes_size field
pub fn animation_keyframes_size(animation: &Animation) -> u64 {
    animation.bones.iter().map(bone_keyframes_size).sum()
}

/// Animation record size (header + bones)
pub fn animation_size(animation: &Animation) -> u64 {
    u64::from(ANIMATION_HEADER_SIZE) + animation.bones.iter().map(bone_size).sum::<u64>()
}

/// Value of the container's size field, before narrowing to 32 bits
pub fn container_size(container: &Container) -> u64 {
    u64::from(CONTAINER_HEADER_SIZE) + container.animations.iter().map(animation_size).sum::<u64>()
}
