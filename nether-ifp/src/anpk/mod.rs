//! ANPK: chunked/extended variant
//!
//! # Layout
//! ```text
//! Container:
//!   size u32                    - bytes after this field
//!   "INFO" info_len u32         - strlen(name) + 1 + 4
//!   animation_count u32
//!   name [u8]                   - null-terminated, padded to 4 bytes
//!
//! Animation:
//!   "NAME" name_len u32         - strlen(name) + 1
//!   name [u8]                   - null-terminated, padded to 4 bytes
//!   "DGAN" chunk_size u32       - bytes after this field
//!   "INFO" info_size u32        - always written as 8
//!   bone_count u32
//!   [u8; info_size - 4]         - zero
//!
//! Bone:
//!   "CPAN" bone_len u32         - bytes after this field
//!   "ANIM" anim_len u32         - 44 (bone id) or 48 (sibling pair)
//!   name [u8; 28]
//!   keyframe_count u32
//!   unused [u8; 8]
//!   bone_id u32                 - anim_len 44
//!   sibling_x u32, sibling_y u32 - anim_len 48
//!   channel code [u8; 4]        - "KR00" / "KRT0" / "KR0S" / "KRTS"
//!   keyframes_size u32
//!
//! Keyframe (20, 32 or 44 bytes):
//!   rotation [f32; 4]           - x, y, z, w, conjugated relative to the document
//!   translation [f32; 3]        - only with 'T'
//!   scale [f32; 3]              - only with 'S'
//!   time f32                    - seconds
//! ```

use std::io::{Read, Write};

use crate::document::{Animation, Bone, BoneIdentification, ChannelMask, Container};
use crate::error::IfpError;
use crate::format::{IfpCodec, IfpFormat};
use crate::io::{align_up, check_fixed_string, to_u32};

mod read;
mod write;


pub(crate) const INFO_TAG: &[u8; 4] = b"INFO";
pub(crate) const NAME_TAG: &[u8; 4] = b"NAME";
pub(crate) const DGAN_TAG: &[u8; 4] = b"DGAN";
pub(crate) const CPAN_TAG: &[u8; 4] = b"CPAN";
pub(crate) const ANIM_TAG: &[u8; 4] = b"ANIM";

/// Chunk marker + length field
pub const CHUNK_HEADER_SIZE: u32 = 8;

/// Name fields and chunks start on this boundary
pub const ALIGNMENT: u64 = 4;

/// Bone name slot width
pub const BONE_NAME_LEN: usize = 28;

/// ANIM record length when the bone is addressed by id
pub const ANIM_LEN_BONE_ID: u32 = 44;

/// ANIM record length when the bone is addressed by sibling pair
pub const ANIM_LEN_SIBLING: u32 = 48;

/// Unused bytes between keyframe count and identification
pub(crate) const ANIM_UNUSED_LEN: usize = 8;

/// Animation INFO payload size written by this crate (bone count + 4 zero bytes)
pub const ANIMATION_INFO_SIZE: u32 = 8;

/// Rotation + time keyframe size
pub const KEYFRAME_BASE_SIZE: u32 = 20;

/// Extra bytes per optional vector channel
pub const CHANNEL_SIZE: u32 = 12;

/// Codec for ANPK files
#[derive(Debug, Clone, Copy, Default)]
pub struct AnpkCodec;

impl IfpCodec for AnpkCodec {
    fn format(&self) -> IfpFormat {
        IfpFormat::Anpk
    }

    fn read_container(&self, reader: &mut dyn Read) -> Result<Container, IfpError> {
        read::read_container(reader)
    }

    fn validate(&self, container: &Container) -> Result<(), IfpError> {
        // Container and animation names have no slot limit
        check_fixed_string(&container.name, usize::MAX)?;
        for animation in &container.animations {
            check_fixed_string(&animation.name, usize::MAX)?;
            for bone in &animation.bones {
                check_fixed_string(&bone.name, BONE_NAME_LEN)?;
                if bone.keyframes.is_empty() {
                    return Err(IfpError::EmptyBone {
                        bone: bone.name.clone(),
                    });
                }
                bone.check_channels()?;
            }
        }
        // Every count, name length and nested size is bounded by the container size
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
}

// =============================================================================
// Sizes
// =============================================================================

/// Bytes a variable-length name occupies: terminator plus alignment padding
pub fn name_field_size(name: &str) -> u64 {
    align_up(name.len() as u64 + 1, ALIGNMENT)
}

/// ANIM record length selected by the identification scheme
pub fn anim_len(identification: &BoneIdentification) -> u32 {
    match identification {
        BoneIdentification::BoneId(_) => ANIM_LEN_BONE_ID,
        BoneIdentification::Sibling { .. } => ANIM_LEN_SIBLING,
    }
}

/// Size of one keyframe record for the given channels
pub fn keyframe_size(channels: ChannelMask) -> u32 {
    KEYFRAME_BASE_SIZE
        + if channels.translation { CHANNEL_SIZE } else { 0 }
        + if channels.scale { CHANNEL_SIZE } else { 0 }
}

/// Value of a bone's keyframes_size field
pub fn bone_keyframes_size(bone: &Bone) -> u64 {
    bone.keyframes.len() as u64 * u64::from(keyframe_size(bone.channel_mask))
}

/// Value of a bone's CPAN length field
pub fn bone_len(bone: &Bone) -> u64 {
    u64::from(CHUNK_HEADER_SIZE + anim_len(&bone.identification) + CHUNK_HEADER_SIZE)
        + bone_keyframes_size(bone)
}

/// Value of an animation's DGAN chunk_size field
pub fn dgan_size(animation: &Animation) -> u64 {
    u64::from(CHUNK_HEADER_SIZE + ANIMATION_INFO_SIZE)
        + animation
            .bones
            .iter()
            .map(|b| u64::from(CHUNK_HEADER_SIZE) + bone_len(b))
            .sum::<u64>()
}

/// Total bytes of one animation (NAME chunk + DGAN chunk)
pub fn animation_size(animation: &Animation) -> u64 {
    u64::from(CHUNK_HEADER_SIZE)
        + name_field_size(&animation.name)
        + u64::from(CHUNK_HEADER_SIZE)
        + dgan_size(animation)
}

/// Value of the container's size field, before narrowing to 32 bits
pub fn container_size(container: &Container) -> u64 {
    u64::from(CHUNK_HEADER_SIZE)
        + 4
        + name_field_size(&container.name)
        + container
            .animations
            .iter()
            .map(animation_size)
            .sum::<u64>()
}
