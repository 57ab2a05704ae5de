//! In-memory animation document
//!
//! Both format variants decode into the same tree:
//! [`Document`] → [`Container`] → [`Animation`] → [`Bone`] → [`Keyframe`].
//! Each level owns its children; declaration order is preserved.

use glam::{Quat, Vec3};

use crate::error::IfpError;
use crate::format::IfpFormat;

/// Parsed IFP file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Format variant selected by the 4-byte header tag
    pub format: IfpFormat,
    /// Root of the animation tree
    pub container: Container,
}

impl Document {
    /// Create an empty document of the given variant
    pub fn new(format: IfpFormat, name: impl Into<String>) -> Self {
        Self {
            format,
            container: Container::new(name),
        }
    }

    /// Format tag as written at offset 0
    pub fn format_tag(&self) -> &'static [u8; 4] {
        self.format.tag()
    }

    /// Count animations, bones and keyframes
    pub fn summary(&self) -> Summary {
        let animations = &self.container.animations;
        Summary {
            format: self.format,
            name: self.container.name.clone(),
            animation_count: animations.len(),
            bone_count: animations.iter().map(|a| a.bones.len()).sum(),
            keyframe_count: animations.iter().map(Animation::keyframe_count).sum(),
        }
    }
}

/// Top-level named collection of animations
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Container {
    /// Display name (max 23 chars for ANP3, unbounded for ANPK)
    pub name: String,
    pub animations: Vec<Animation>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animations: Vec::new(),
        }
    }

    /// Find the first animation with the given name
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }

    pub fn animation_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.iter_mut().find(|a| a.name == name)
    }
}

/// Named clip made of per-bone keyframe tracks
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub name: String,
    pub bones: Vec<Bone>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    /// Find the first bone track with the given name
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Total keyframes across all bones
    pub fn keyframe_count(&self) -> usize {
        self.bones.iter().map(|b| b.keyframes.len()).sum()
    }
}

/// Keyframe track for one skeleton bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub name: String,
    /// How the track is matched to a skeleton bone
    pub identification: BoneIdentification,
    /// Channels encoded by every keyframe of this bone
    pub channel_mask: ChannelMask,
    pub keyframes: Vec<Keyframe>,
}

impl Bone {
    pub fn new(
        name: impl Into<String>,
        identification: BoneIdentification,
        channel_mask: ChannelMask,
    ) -> Self {
        Self {
            name: name.into(),
            identification,
            channel_mask,
            keyframes: Vec::new(),
        }
    }

    pub fn push_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
    }

    /// Check that channels excluded by the mask hold their defaults
    ///
    /// A writer drops excluded channels, so anything else would be lost.
    pub fn check_channels(&self) -> Result<(), IfpError> {
        for kf in &self.keyframes {
            let channel = if !self.channel_mask.translation && kf.translation != Vec3::ZERO {
                "translation"
            } else if !self.channel_mask.scale && kf.scale != Vec3::ONE {
                "scale"
            } else {
                continue;
            };
            return Err(IfpError::ChannelMismatch {
                bone: self.name.clone(),
                channel,
            });
        }
        Ok(())
    }

    /// Bone id, if this track is addressed by id
    pub fn bone_id(&self) -> Option<u32> {
        match self.identification {
            BoneIdentification::BoneId(id) => Some(id),
            BoneIdentification::Sibling { .. } => None,
        }
    }
}

/// How a bone track is matched to a target skeleton
///
/// Decided once at parse time; in ANPK files the ANIM record length
/// selects the variant (44 = bone id, 48 = sibling pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoneIdentification {
    /// Explicit numeric bone id
    BoneId(u32),
    /// Pair of sibling indices
    Sibling { x: u32, y: u32 },
}

/// Channels present in a bone's keyframes (rotation is always present)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelMask {
    pub translation: bool,
    pub scale: bool,
}

impl ChannelMask {
    /// Rotation only ("KR00")
    pub const ROTATION: Self = Self {
        translation: false,
        scale: false,
    };
    /// Rotation + translation ("KRT0")
    pub const ROTATION_TRANSLATION: Self = Self {
        translation: true,
        scale: false,
    };
    /// Rotation + scale ("KR0S")
    pub const ROTATION_SCALE: Self = Self {
        translation: false,
        scale: true,
    };
    /// Rotation + translation + scale ("KRTS")
    pub const ALL: Self = Self {
        translation: true,
        scale: true,
    };

    /// ANP3 channel flag for rotation + translation
    pub const COMPACT_FLAG_TRANSLATION: u32 = 4;
    /// ANP3 channel flag for rotation only
    pub const COMPACT_FLAG_ROTATION: u32 = 3;

    /// Chunked-variant channel code
    pub fn code(&self) -> [u8; 4] {
        [
            b'K',
            b'R',
            if self.translation { b'T' } else { b'0' },
            if self.scale { b'S' } else { b'0' },
        ]
    }

    /// Decode a chunked-variant channel code
    ///
    /// Only the 3rd and 4th characters carry information.
    pub fn from_code(code: &[u8; 4]) -> Self {
        Self {
            translation: code[2] == b'T',
            scale: code[3] == b'S',
        }
    }

    /// ANP3 channel flag (3 = rotation, 4 = rotation + translation)
    pub fn compact_flag(&self) -> u32 {
        if self.translation {
            Self::COMPACT_FLAG_TRANSLATION
        } else {
            Self::COMPACT_FLAG_ROTATION
        }
    }

    /// Decode an ANP3 channel flag; anything but 4 is rotation-only
    pub fn from_compact_flag(flag: u32) -> Self {
        if flag == Self::COMPACT_FLAG_TRANSLATION {
            Self::ROTATION_TRANSLATION
        } else {
            Self::ROTATION
        }
    }
}

/// Single time-stamped transform sample
///
/// `time` is a raw tick count in ANP3 files and seconds in ANPK files.
/// Translation is zero and scale is one when the bone's mask excludes them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    pub time: f32,
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Keyframe {
    pub fn new(time: f32, rotation: Quat) -> Self {
        Self {
            time,
            rotation,
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Keyframe {
    fn default() -> Self {
        Self::new(0.0, Quat::IDENTITY)
    }
}

/// Document statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub format: IfpFormat,
    pub name: String,
    pub animation_count: usize,
    pub bone_count: usize,
    pub keyframe_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_codes() {
        assert_eq!(&ChannelMask::ROTATION.code(), b"KR00");
        assert_eq!(&ChannelMask::ROTATION_TRANSLATION.code(), b"KRT0");
        assert_eq!(&ChannelMask::ROTATION_SCALE.code(), b"KR0S");
        assert_eq!(&ChannelMask::ALL.code(), b"KRTS");
        assert_eq!(ChannelMask::from_code(b"KRTS"), ChannelMask::ALL);
        // Leading markers are ignored
        assert_eq!(
            ChannelMask::from_code(b"XXT0"),
            ChannelMask::ROTATION_TRANSLATION
        );
    }

    #[test]
    fn test_compact_flags() {
        assert_eq!(ChannelMask::ROTATION.compact_flag(), 3);
        assert_eq!(ChannelMask::ROTATION_TRANSLATION.compact_flag(), 4);
        assert_eq!(
            ChannelMask::from_compact_flag(4),
            ChannelMask::ROTATION_TRANSLATION
        );
        assert_eq!(ChannelMask::from_compact_flag(3), ChannelMask::ROTATION);
        assert_eq!(ChannelMask::from_compact_flag(0), ChannelMask::ROTATION);
    }

    #[test]
    fn test_keyframe_defaults() {
        let kf = Keyframe::new(2.0, Quat::IDENTITY);
        assert_eq!(kf.translation, Vec3::ZERO);
        assert_eq!(kf.scale, Vec3::ONE);
    }

    #[test]
    fn test_excluded_channels_must_hold_defaults() {
        let mut bone = Bone::new("Hand", BoneIdentification::BoneId(0), ChannelMask::ROTATION);
        bone.push_keyframe(Keyframe::default());
        assert!(bone.check_channels().is_ok());

        bone.push_keyframe(Keyframe::default().with_translation(Vec3::new(1.0, 2.0, 3.0)));
        assert!(matches!(
            bone.check_channels(),
            Err(IfpError::ChannelMismatch { channel: "translation", .. })
        ));
        bone.channel_mask = ChannelMask::ROTATION_TRANSLATION;
        assert!(bone.check_channels().is_ok());

        bone.keyframes[0].scale = Vec3::splat(2.0);
        assert!(matches!(
            bone.check_channels(),
            Err(IfpError::ChannelMismatch { channel: "scale", .. })
        ));
    }

    #[test]
    fn test_summary_counts() {
        let mut doc = Document::new(IfpFormat::Anpk, "ped");
        let mut anim = Animation::new("walk");
        for id in 0..3 {
            let mut bone = Bone::new(
                format!("bone{id}"),
                BoneIdentification::BoneId(id),
                ChannelMask::ROTATION,
            );
            bone.push_keyframe(Keyframe::default());
            bone.push_keyframe(Keyframe::new(0.5, Quat::IDENTITY));
            anim.bones.push(bone);
        }
        doc.container.animations.push(anim);
        doc.container.animations.push(Animation::new("idle"));

        let summary = doc.summary();
        assert_eq!(summary.animation_count, 2);
        assert_eq!(summary.bone_count, 3);
        assert_eq!(summary.keyframe_count, 6);
        assert!(doc.container.animation("idle").is_some());
        assert_eq!(
            doc.container.animation("walk").and_then(|a| a.bone("bone2")).and_then(Bone::bone_id),
            Some(2)
        );
    }
}
