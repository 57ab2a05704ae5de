//! Nether-IFP: IFP skeletal animation container parser and writer for Nethercore
//!
//! This crate reads and writes the IFP animation container used by RenderWare-era
//! games, so animation packs can be inspected, converted and rebuilt by Nethercore
//! tooling. Both historical variants share a 4-byte tag at offset 0 and nothing else:
//!
//! - **ANP3** (compact/legacy): flat records, 24-byte names, keyframes quantized to
//!   16-bit fixed point, file padded to a 2048-byte boundary.
//! - **ANPK** (chunked/extended): tagged chunks (`INFO`, `NAME`, `DGAN`, `CPAN`,
//!   `ANIM`), 4-byte aligned names, float keyframes with optional translation and
//!   scale channels.
//!
//! Writers compute every size field bottom-up before emitting headers and validate
//! the whole document before the first byte, so output is byte-for-byte stable:
//! `save(load(save(doc)))` equals `save(doc)`.
//!
//! # Usage
//!
//! ```ignore
//! use nether_ifp::{load, save, IfpFormat};
//!
//! let doc = load("ped.ifp")?;
//! println!("{} ({})", doc.container.name, doc.format);
//! for anim in &doc.container.animations {
//!     println!("  {}: {} bones", anim.name, anim.bones.len());
//! }
//!
//! let anpk = nether_ifp::convert_document(&doc, IfpFormat::Anpk, 30.0)?;
//! save("ped_anpk.ifp", &anpk)?;
//! ```

pub mod anp3;
pub mod anpk;
mod convert;
mod document;
mod error;
mod format;
mod io;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use anp3::Anp3Codec;
pub use anpk::AnpkCodec;
pub use convert::convert_document;
pub use document::{
    Animation, Bone, BoneIdentification, ChannelMask, Container, Document, Keyframe, Summary,
};
pub use error::IfpError;
pub use format::{IfpCodec, IfpFormat, codec_for_tag};

// Re-export math types used by the document model
pub use glam::{Quat, Vec3};

// =============================================================================
// Constants
// =============================================================================

/// Compact/legacy variant tag "ANP3"
pub const ANP3_MAGIC: &[u8; 4] = b"ANP3";

/// Chunked/extended variant tag "ANPK"
pub const ANPK_MAGIC: &[u8; 4] = b"ANPK";

// =============================================================================
// Entry points
// =============================================================================

/// Read a document from a stream positioned at the format tag
pub fn read_ifp<R: Read>(mut reader: R) -> Result<Document, IfpError> {
    let tag = io::read_tag(&mut reader)?;
    let format = IfpFormat::from_tag(&tag)?;
    let container = format.codec().read_container(&mut reader)?;
    Ok(Document { format, container })
}

/// Write a document, including the format tag and any block padding
///
/// Nothing is written when the document fails validation. On an I/O
/// failure the output is left partially written.
pub fn write_ifp<W: Write>(writer: W, document: &Document) -> Result<(), IfpError> {
    let codec = document.format.codec();
    codec.validate(&document.container)?;

    let mut w = io::CountingWriter::new(writer);
    io::write_tag(&mut w, document.format.tag())?;
    codec.write_container(&mut w, &document.container)?;

    if let Some(block) = codec.block_size() {
        let padding = io::padding_for(w.written(), block);
        io::write_zeros(&mut w, padding as usize)?;
    }
    w.flush()?;
    Ok(())
}

/// Parse a document from an in-memory file image
pub fn parse_ifp(data: &[u8]) -> Result<Document, IfpError> {
    read_ifp(data)
}

/// Encode a document into a new byte vector
pub fn to_bytes(document: &Document) -> Result<Vec<u8>, IfpError> {
    let mut out = Vec::new();
    write_ifp(&mut out, document)?;
    Ok(out)
}

/// Load an IFP file
pub fn load(path: impl AsRef<Path>) -> Result<Document, IfpError> {
    let path = path.as_ref();
    tracing::debug!("loading IFP {}", path.display());

    let document = read_ifp(BufReader::new(File::open(path)?))?;
    tracing::debug!(
        format = %document.format,
        animations = document.container.animations.len(),
        "loaded {}",
        path.display()
    );
    Ok(document)
}

/// Save a document to an IFP file
///
/// The caller is responsible for removing a partially written file on error.
pub fn save(path: impl AsRef<Path>, document: &Document) -> Result<(), IfpError> {
    let path = path.as_ref();
    tracing::debug!(format = %document.format, "saving IFP {}", path.display());

    let mut writer = BufWriter::new(File::create(path)?);
    write_ifp(&mut writer, document)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
