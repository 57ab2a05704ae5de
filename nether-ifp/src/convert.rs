//! Conversion between ANP3 and ANPK documents
//!
//! ANP3 stores time as raw ticks and ANPK as seconds, so converting needs a
//! frame rate. ANP3 has no scale channel and no sibling addressing.

use crate::document::{BoneIdentification, Container, Document};
use crate::error::IfpError;
use crate::format::IfpFormat;

/// Convert `document` to the `target` variant
///
/// `fps` is ticks per second: ANP3 → ANPK divides tick times by it, ANPK →
/// ANP3 multiplies and rounds. Scale channels are dropped when converting to
/// ANP3; sibling-addressed bones cannot be converted to ANP3 at all.
pub fn convert_document(
    document: &Document,
    target: IfpFormat,
    fps: f32,
) -> Result<Document, IfpError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(IfpError::ValueOutOfRange {
            field: "fps",
            value: fps,
        });
    }

    if document.format == target {
        return Ok(document.clone());
    }

    let mut container = document.container.clone();
    match target {
        IfpFormat::Anpk => ticks_to_seconds(&mut container, fps),
        IfpFormat::Anp3 => seconds_to_ticks(&mut container, fps)?,
    }

    tracing::debug!(
        from = %document.format,
        to = %target,
        fps,
        "converted {:?}",
        container.name
    );
    Ok(Document {
        format: target,
        container,
    })
}

fn ticks_to_seconds(container: &mut Container, fps: f32) {
    for bone in container.animations.iter_mut().flat_map(|a| a.bones.iter_mut()) {
        for kf in &mut bone.keyframes {
            kf.time /= fps;
        }
    }
}

fn seconds_to_ticks(container: &mut Container, fps: f32) -> Result<(), IfpError> {
    for animation in &mut container.animations {
        for bone in &mut animation.bones {
            if let BoneIdentification::Sibling { .. } = bone.identification {
                return Err(IfpError::UnsupportedIdentification {
                    format: "ANP3",
                    bone: bone.name.clone(),
                });
            }

            if bone.channel_mask.scale {
                tracing::warn!(
                    "dropping scale channel of bone {:?} in animation {:?}",
                    bone.name,
                    animation.name
                );
                bone.channel_mask.scale = false;
            }

            for kf in &mut bone.keyframes {
                kf.time = (kf.time * fps).round();
                kf.scale = glam::Vec3::ONE;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Animation, Bone, ChannelMask, Keyframe};
    use crate::{parse_ifp, to_bytes};
    use glam::{Quat, Vec3};

    fn document(format: IfpFormat, mask: ChannelMask, times: &[f32]) -> Document {
        let mut bone = Bone::new("Spine", BoneIdentification::BoneId(3), mask);
        for &t in times {
            bone.push_keyframe(
                Keyframe::new(t, Quat::IDENTITY)
                    .with_translation(if mask.translation { Vec3::X } else { Vec3::ZERO })
                    .with_scale(if mask.scale { Vec3::splat(2.0) } else { Vec3::ONE }),
            );
        }
        let mut anim = Animation::new("run");
        anim.bones.push(bone);
        let mut doc = Document::new(format, "ped");
        doc.container.animations.push(anim);
        doc
    }

    fn times(doc: &Document) -> Vec<f32> {
        doc.container.animations[0].bones[0]
            .keyframes
            .iter()
            .map(|k| k.time)
            .collect()
    }

    #[test]
    fn test_ticks_to_seconds() {
        let doc = document(
            IfpFormat::Anp3,
            ChannelMask::ROTATION_TRANSLATION,
            &[0.0, 15.0, 30.0],
        );
        let converted = convert_document(&doc, IfpFormat::Anpk, 30.0).unwrap();
        assert_eq!(converted.format, IfpFormat::Anpk);
        assert_eq!(times(&converted), vec![0.0, 0.5, 1.0]);
        assert_eq!(
            converted.container.animations[0].bones[0].identification,
            BoneIdentification::BoneId(3)
        );
    }

    #[test]
    fn test_seconds_to_ticks_rounds() {
        let doc = document(
            IfpFormat::Anpk,
            ChannelMask::ROTATION,
            &[0.0, 1.0 / 30.0, 2.0 / 30.0],
        );
        let converted = convert_document(&doc, IfpFormat::Anp3, 30.0).unwrap();
        assert_eq!(times(&converted), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_scale_dropped_for_anp3() {
        let doc = document(IfpFormat::Anpk, ChannelMask::ALL, &[0.0]);
        let converted = convert_document(&doc, IfpFormat::Anp3, 30.0).unwrap();
        let bone = &converted.container.animations[0].bones[0];
        assert_eq!(bone.channel_mask, ChannelMask::ROTATION_TRANSLATION);
        assert_eq!(bone.keyframes[0].scale, Vec3::ONE);

        // The converted document must be writable
        let bytes = to_bytes(&converted).unwrap();
        assert_eq!(parse_ifp(&bytes).unwrap(), converted);
    }

    #[test]
    fn test_sibling_cannot_become_anp3() {
        let mut doc = document(IfpFormat::Anpk, ChannelMask::ROTATION, &[0.0]);
        doc.container.animations[0].bones[0].identification =
            BoneIdentification::Sibling { x: 0, y: 1 };
        assert!(matches!(
            convert_document(&doc, IfpFormat::Anp3, 30.0),
            Err(IfpError::UnsupportedIdentification { .. })
        ));
    }

    #[test]
    fn test_same_format_is_unchanged() {
        let doc = document(IfpFormat::Anpk, ChannelMask::ALL, &[0.25]);
        assert_eq!(convert_document(&doc, IfpFormat::Anpk, 60.0).unwrap(), doc);
    }

    #[test]
    fn test_invalid_fps() {
        let doc = document(IfpFormat::Anp3, ChannelMask::ROTATION, &[0.0]);
        for fps in [0.0, -30.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                convert_document(&doc, IfpFormat::Anpk, fps),
                Err(IfpError::ValueOutOfRange { field: "fps", .. })
            ));
        }
    }
}
