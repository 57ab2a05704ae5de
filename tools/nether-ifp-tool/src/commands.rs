//! Subcommand implementations

use anyhow::{Context, Result};
use nether_ifp::{Document, IfpFormat, Summary};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::manifest::{BatchManifest, ConvertJob};

/// Default output path for a conversion: `ped.ifp` -> `ped.anpk.ifp`
pub fn default_output(input: &Path, format: IfpFormat) -> PathBuf {
    input.with_extension(format!("{}.ifp", format.as_str().to_lowercase()))
}

fn load(path: &Path) -> Result<Document> {
    nether_ifp::load(path).with_context(|| format!("Failed to load IFP: {}", path.display()))
}

/// Log the document outline
pub fn info(input: &Path) -> Result<()> {
    let doc = load(input)?;
    let Summary {
        format,
        name,
        animation_count,
        bone_count,
        keyframe_count,
    } = doc.summary();

    tracing::info!("{}: {} container {:?}", input.display(), format, name);
    tracing::info!(
        "  {} animations, {} bones, {} keyframes",
        animation_count,
        bone_count,
        keyframe_count
    );
    for anim in &doc.container.animations {
        tracing::info!(
            "  {:<24} {:>3} bones {:>5} keyframes",
            anim.name,
            anim.bones.len(),
            anim.keyframe_count()
        );
    }
    Ok(())
}

/// Write the document as JSON to `output`, or stdout
pub fn dump(input: &Path, output: Option<&Path>) -> Result<()> {
    let doc = load(input)?;
    let json = serde_json::to_string_pretty(&doc).context("Failed to serialize document")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

/// Load, convert and save a single file
pub fn convert(job: &ConvertJob) -> Result<Summary> {
    tracing::info!("Converting {:?} -> {:?}", job.input, job.output);

    let doc = load(&job.input)?;
    let mut converted = nether_ifp::convert_document(&doc, job.format, job.fps)
        .with_context(|| format!("Failed to convert {}", job.input.display()))?;
    if let Some(name) = &job.name {
        converted.container.name = name.clone();
    }

    if let Some(parent) = job.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    if let Err(err) = nether_ifp::save(&job.output, &converted) {
        // Don't leave a half-written file behind
        let _ = std::fs::remove_file(&job.output);
        return Err(err).with_context(|| format!("Failed to save {}", job.output.display()));
    }
    Ok(converted.summary())
}

/// Re-encode `input` and check the bytes match the file exactly
pub fn verify(input: &Path) -> Result<()> {
    let original =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let doc = nether_ifp::parse_ifp(&original)
        .with_context(|| format!("Failed to parse IFP: {}", input.display()))?;
    let encoded = nether_ifp::to_bytes(&doc).context("Failed to re-encode document")?;

    if encoded != original {
        let offset = encoded
            .iter()
            .zip(&original)
            .position(|(a, b)| a != b)
            .unwrap_or(encoded.len().min(original.len()));
        anyhow::bail!(
            "{} does not re-encode identically: first difference at byte {} ({} bytes read, {} bytes written)",
            input.display(),
            offset,
            original.len(),
            encoded.len()
        );
    }

    tracing::info!("{}: {} bytes, round-trip OK", input.display(), original.len());
    Ok(())
}

/// Run every job of a batch manifest
pub fn batch(manifest_path: &Path) -> Result<()> {
    use rayon::prelude::*;

    let manifest = BatchManifest::load(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new(""));
    let jobs = manifest.jobs(base_dir)?;
    tracing::info!("Running {} conversions from {:?}", jobs.len(), manifest_path);

    // Jobs are independent, so convert them in parallel
    let summaries: Result<Vec<_>> = jobs.par_iter().map(convert).collect();
    let summaries = summaries?;

    let keyframes: usize = summaries.iter().map(|s| s.keyframe_count).sum();
    tracing::info!(
        "Batch complete: {} files, {} keyframes",
        summaries.len(),
        keyframes
    );
    Ok(())
}
