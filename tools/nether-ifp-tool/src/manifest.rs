//! ifp.toml batch manifest
//!
//! ```toml
//! [defaults]
//! fps = 30.0
//! format = "ANPK"
//!
//! [[convert]]
//! input = "anims/ped.ifp"
//! output = "out/ped_anpk.ifp"
//! ```

use anyhow::{Context, Result};
use nether_ifp::IfpFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Frame rate used when neither the job nor `[defaults]` sets one
pub const DEFAULT_FPS: f32 = 30.0;

/// ifp.toml manifest structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchManifest {
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub convert: Vec<ConvertEntry>,
}

/// Settings shared by every job
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    /// Ticks per second for ANP3 <-> ANPK time conversion.
    /// Default: 30
    #[serde(default = "default_fps")]
    pub fps: f32,

    /// Target format when a job does not name one
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            format: None,
        }
    }
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

/// Single conversion job
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertEntry {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub fps: Option<f32>,
    /// Rename the container
    #[serde(default)]
    pub name: Option<String>,
}

/// Fully resolved conversion job
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: IfpFormat,
    pub fps: f32,
    pub name: Option<String>,
}

impl BatchManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse ifp.toml")
    }

    /// Check every job before any file is touched
    pub fn validate(&self) -> Result<()> {
        self.jobs(Path::new("")).map(|_| ())
    }

    /// Resolve every job, with relative paths joined onto `base_dir`
    pub fn jobs(&self, base_dir: &Path) -> Result<Vec<ConvertJob>> {
        if self.convert.is_empty() {
            anyhow::bail!("Manifest has no [[convert]] jobs");
        }
        check_fps(self.defaults.fps).context("Invalid [defaults] fps")?;
        let default_format = self
            .defaults
            .format
            .as_deref()
            .map(parse_format)
            .transpose()
            .context("Invalid [defaults] format")?;

        self.convert
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<ConvertJob> {
                let format = match entry.format.as_deref() {
                    Some(format) => parse_format(format)?,
                    None => default_format.with_context(|| {
                        format!("Job {} ({}) has no target format", i + 1, entry.input)
                    })?,
                };
                let fps = entry.fps.unwrap_or(self.defaults.fps);
                check_fps(fps).with_context(|| format!("Invalid fps for job {}", i + 1))?;

                Ok(ConvertJob {
                    input: base_dir.join(&entry.input),
                    output: base_dir.join(&entry.output),
                    format,
                    fps,
                    name: entry.name.clone(),
                })
            })
            .collect()
    }
}

fn parse_format(value: &str) -> Result<IfpFormat> {
    value
        .parse()
        .with_context(|| format!("Unknown format {:?} (use ANP3 or ANPK)", value))
}

fn check_fps(fps: f32) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        anyhow::bail!("fps must be a positive number, got {}", fps);
    }
    Ok(())
}
