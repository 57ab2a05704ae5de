//! Integration tests for the nether-ifp binary
//!
//! Builds small IFP files with the library, then drives the CLI against them.

use nether_ifp::{
    Animation, Bone, BoneIdentification, ChannelMask, Document, IfpFormat, Keyframe, Quat, Vec3,
};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn nether_ifp(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nether-ifp"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run nether-ifp")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "nether-ifp failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// ANP3 "ped" with a two-bone "walk" animation
fn write_ped(path: &Path) -> Document {
    let mut root = Bone::new(
        "Root",
        BoneIdentification::BoneId(0),
        ChannelMask::ROTATION_TRANSLATION,
    );
    root.push_keyframe(Keyframe::new(0.0, Quat::IDENTITY).with_translation(Vec3::new(0.0, 0.0, 1.0)));
    root.push_keyframe(Keyframe::new(30.0, Quat::IDENTITY).with_translation(Vec3::new(1.0, 0.0, 1.0)));

    let mut head = Bone::new("Head", BoneIdentification::BoneId(5), ChannelMask::ROTATION);
    head.push_keyframe(Keyframe::new(0.0, Quat::from_xyzw(0.0, 0.0, 0.5, 0.75)));

    let mut walk = Animation::new("walk");
    walk.bones.push(root);
    walk.bones.push(head);

    let mut doc = Document::new(IfpFormat::Anp3, "ped");
    doc.container.animations.push(walk);
    nether_ifp::save(path, &doc).expect("Failed to write test IFP");
    doc
}

#[test]
fn test_info() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_ped(&dir.path().join("ped.ifp"));

    let output = nether_ifp(&["info", "ped.ifp"], dir.path());
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ANP3"), "stdout: {stdout}");
    assert!(stdout.contains("walk"), "stdout: {stdout}");
}

#[test]
fn test_convert_default_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let doc = write_ped(&dir.path().join("ped.ifp"));

    let output = nether_ifp(&["convert", "ped.ifp", "--format", "anpk"], dir.path());
    assert_success(&output);

    let converted = nether_ifp::load(dir.path().join("ped.anpk.ifp")).expect("Missing output");
    assert_eq!(converted.format, IfpFormat::Anpk);
    assert_eq!(converted.summary().keyframe_count, doc.summary().keyframe_count);

    let root = converted.container.animations[0].bone("Root").unwrap();
    assert_eq!(root.keyframes[1].time, 1.0);
}

#[test]
fn test_convert_with_fps_and_name() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_ped(&dir.path().join("ped.ifp"));

    let output = nether_ifp(
        &[
            "convert", "ped.ifp", "-o", "out/player.ifp", "-f", "ANPK", "--fps", "60", "--name",
            "player",
        ],
        dir.path(),
    );
    assert_success(&output);

    let converted = nether_ifp::load(dir.path().join("out/player.ifp")).unwrap();
    assert_eq!(converted.container.name, "player");
    let root = converted.container.animations[0].bone("Root").unwrap();
    assert_eq!(root.keyframes[1].time, 0.5);
}

#[test]
fn test_convert_rejects_name_too_long_for_anp3() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_ped(&dir.path().join("ped.ifp"));

    let output = nether_ifp(
        &[
            "convert",
            "ped.ifp",
            "-o",
            "renamed.ifp",
            "-f",
            "ANP3",
            "--name",
            "a_name_that_does_not_fit_24",
        ],
        dir.path(),
    );
    assert!(!output.status.success());
    assert!(!dir.path().join("renamed.ifp").exists());
}

#[test]
fn test_verify() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ped.ifp");
    write_ped(&path);

    assert_success(&nether_ifp(&["verify", "ped.ifp"], dir.path()));

    // A wrong size field still loads but no longer re-encodes identically
    let mut data = std::fs::read(&path).unwrap();
    data[4] ^= 0xFF;
    std::fs::write(&path, data).unwrap();
    let output = nether_ifp(&["verify", "ped.ifp"], dir.path());
    assert!(!output.status.success());
}

#[test]
fn test_verify_unknown_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("bad.ifp"), b"RIFF\0\0\0\0").unwrap();
    let output = nether_ifp(&["verify", "bad.ifp"], dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown IFP format"), "stderr: {stderr}");
}

#[test]
fn test_dump_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_ped(&dir.path().join("ped.ifp"));

    let output = nether_ifp(&["dump", "ped.ifp", "-o", "ped.json"], dir.path());
    assert_success(&output);

    let json = std::fs::read_to_string(dir.path().join("ped.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["format"], "ANP3");
    assert_eq!(value["container"]["name"], "ped");
    assert_eq!(value["container"]["animations"][0]["bones"][1]["name"], "Head");

    // The dump is a faithful serialization of the document
    let doc: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(doc, nether_ifp::load(dir.path().join("ped.ifp")).unwrap());
}

#[test]
fn test_batch_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::create_dir(dir.path().join("anims")).unwrap();
    write_ped(&dir.path().join("anims/ped.ifp"));
    std::fs::write(
        dir.path().join("ifp.toml"),
        r#"
        [defaults]
        format = "ANPK"
        fps = 15.0

        [[convert]]
        input = "anims/ped.ifp"
        output = "out/ped_anpk.ifp"

        [[convert]]
        input = "anims/ped.ifp"
        output = "out/ped_copy.ifp"
        format = "ANP3"
        name = "ped2"
        "#,
    )
    .unwrap();

    // Run from elsewhere: paths resolve against the manifest directory
    let elsewhere = tempdir().expect("Failed to create temp dir");
    let manifest = dir.path().join("ifp.toml");
    let output = nether_ifp(&["batch", manifest.to_str().unwrap()], elsewhere.path());
    assert_success(&output);

    let anpk = nether_ifp::load(dir.path().join("out/ped_anpk.ifp")).unwrap();
    assert_eq!(anpk.format, IfpFormat::Anpk);
    let root = anpk.container.animations[0].bone("Root").unwrap();
    assert_eq!(root.keyframes[1].time, 2.0);

    let copy = nether_ifp::load(dir.path().join("out/ped_copy.ifp")).unwrap();
    assert_eq!(copy.format, IfpFormat::Anp3);
    assert_eq!(copy.container.name, "ped2");
}

#[test]
fn test_batch_invalid_manifest_touches_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_ped(&dir.path().join("ped.ifp"));
    std::fs::write(
        dir.path().join("ifp.toml"),
        r#"
        [[convert]]
        input = "ped.ifp"
        output = "ok.ifp"
        format = "ANPK"

        [[convert]]
        input = "ped.ifp"
        output = "bad.ifp"
        format = "ANPK"
        fps = 0.0
        "#,
    )
    .unwrap();

    let output = nether_ifp(&["batch"], dir.path());
    assert!(!output.status.success());
    assert!(!dir.path().join("ok.ifp").exists());
}
