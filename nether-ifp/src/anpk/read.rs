//! ANPK decoding

use std::io::Read;

use glam::{Quat, Vec3};

use super::{
    ALIGNMENT, ANIM_LEN_BONE_ID, ANIM_LEN_SIBLING, ANIM_TAG, ANIM_UNUSED_LEN, BONE_NAME_LEN,
    CPAN_TAG, DGAN_TAG, INFO_TAG, NAME_TAG,
};
use crate::document::{Animation, Bone, BoneIdentification, ChannelMask, Container, Keyframe};
use crate::error::IfpError;
use crate::io::{
    capacity_hint, expect_tag, padding_for, read_f32, read_f32_array, read_fixed_string,
    read_tag, read_u32, skip,
};

/// Read the container that follows the "ANPK" tag
pub(crate) fn read_container(r: &mut dyn Read) -> Result<Container, IfpError> {
    let size = read_u32(r)?;
    expect_tag(r, INFO_TAG)?;
    let info_len = read_u32(r)?;
    let animation_count = read_u32(r)?;

    // info_len covers the animation count plus the unpadded name
    let name_len = info_len
        .checked_sub(4)
        .ok_or(IfpError::InvalidInfoSize(info_len))?;
    let name = read_padded_name(r, name_len)?;

    let mut animations = Vec::with_capacity(capacity_hint(animation_count));
    for _ in 0..animation_count {
        animations.push(read_animation(r)?);
    }

    let container = Container { name, animations };

    let expected = super::container_size(&container);
    if u64::from(size) != expected {
        tracing::warn!(
            "ANPK container {:?}: size field {} does not match computed size {}",
            container.name,
            size,
            expected
        );
    }

    Ok(container)
}

/// Read a `len`-byte name field and skip its alignment padding
fn read_padded_name(r: &mut dyn Read, len: u32) -> Result<String, IfpError> {
    let name = read_fixed_string(r, len as usize)?;
    skip(r, padding_for(len as u64, ALIGNMENT) as usize)?;
    Ok(name)
}

fn read_animation(r: &mut dyn Read) -> Result<Animation, IfpError> {
    expect_tag(r, NAME_TAG)?;
    let name_len = read_u32(r)?;
    let name = read_padded_name(r, name_len)?;

    expect_tag(r, DGAN_TAG)?;
    let chunk_size = read_u32(r)?;

    expect_tag(r, INFO_TAG)?;
    let info_size = read_u32(r)?;
    let bone_count = read_u32(r)?;
    let info_rest = info_size
        .checked_sub(4)
        .ok_or(IfpError::InvalidInfoSize(info_size))?;
    skip(r, info_rest as usize)?;

    let mut bones = Vec::with_capacity(capacity_hint(bone_count));
    for _ in 0..bone_count {
        bones.push(read_bone(r)?);
    }

    let animation = Animation { name, bones };
    tracing::trace!(
        animation = %animation.name,
        bones = bone_count,
        chunk_size,
        "read ANPK animation"
    );
    Ok(animation)
}

fn read_bone(r: &mut dyn Read) -> Result<Bone, IfpError> {
    expect_tag(r, CPAN_TAG)?;
    let _bone_len = read_u32(r)?;

    expect_tag(r, ANIM_TAG)?;
    let anim_len = read_u32(r)?;
    let name = read_fixed_string(r, BONE_NAME_LEN)?;
    let keyframe_count = read_u32(r)?;
    skip(r, ANIM_UNUSED_LEN)?;

    // The record length alone decides the identification scheme
    let identification = match anim_len {
        ANIM_LEN_BONE_ID => BoneIdentification::BoneId(read_u32(r)?),
        ANIM_LEN_SIBLING => {
            let x = read_u32(r)?;
            let y = read_u32(r)?;
            BoneIdentification::Sibling { x, y }
        }
        other => return Err(IfpError::InvalidAnimLength(other)),
    };

    let code = read_tag(r)?;
    if !code.iter().all(u8::is_ascii_alphanumeric) {
        return Err(IfpError::InvalidChannelCode(
            String::from_utf8_lossy(&code).into_owned(),
        ));
    }
    let channel_mask = ChannelMask::from_code(&code);
    let _keyframes_size = read_u32(r)?;

    let mut keyframes = Vec::with_capacity(capacity_hint(keyframe_count));
    for _ in 0..keyframe_count {
        keyframes.push(read_keyframe(r, channel_mask)?);
    }

    Ok(Bone {
        name,
        identification,
        channel_mask,
        keyframes,
    })
}

fn read_keyframe(r: &mut dyn Read, channels: ChannelMask) -> Result<Keyframe, IfpError> {
    let [x, y, z, w] = read_f32_array::<_, 4>(r)?;
    // File quaternions use the opposite handedness
    let rotation = Quat::from_xyzw(x, y, z, w).conjugate();

    let translation = if channels.translation {
        Vec3::from_array(read_f32_array::<_, 3>(r)?)
    } else {
        Vec3::ZERO
    };
    let scale = if channels.scale {
        Vec3::from_array(read_f32_array::<_, 3>(r)?)
    } else {
        Vec3::ONE
    };
    let time = read_f32(r)?;

    Ok(Keyframe {
        time,
        rotation,
        translation,
        scale,
    })
}
