//! Format variants and the tag → codec registry

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use crate::anp3::Anp3Codec;
use crate::anpk::AnpkCodec;
use crate::document::Container;
use crate::error::IfpError;
use crate::{ANP3_MAGIC, ANPK_MAGIC};

/// IFP format variant, selected by the 4-byte tag at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IfpFormat {
    /// Compact/legacy variant with quantized 16-bit keyframes
    #[cfg_attr(feature = "serde", serde(rename = "ANP3"))]
    Anp3,
    /// Chunked/extended variant with float keyframes
    #[cfg_attr(feature = "serde", serde(rename = "ANPK"))]
    Anpk,
}

impl IfpFormat {
    pub const ALL: [IfpFormat; 2] = [IfpFormat::Anp3, IfpFormat::Anpk];

    pub fn tag(self) -> &'static [u8; 4] {
        match self {
            Self::Anp3 => ANP3_MAGIC,
            Self::Anpk => ANPK_MAGIC,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anp3 => "ANP3",
            Self::Anpk => "ANPK",
        }
    }

    /// Look up the variant for a header tag
    pub fn from_tag(tag: &[u8]) -> Result<Self, IfpError> {
        codec_for_tag(tag)
            .map(|codec| codec.format())
            .ok_or_else(|| IfpError::UnknownFormat(String::from_utf8_lossy(tag).into_owned()))
    }

    /// Codec implementing this variant
    pub fn codec(self) -> &'static dyn IfpCodec {
        match self {
            Self::Anp3 => &Anp3Codec,
            Self::Anpk => &AnpkCodec,
        }
    }
}

impl fmt::Display for IfpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IfpFormat {
    type Err = IfpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s.to_ascii_uppercase().as_bytes())
    }
}

/// Read/write capability shared by both format variants
///
/// Implementations see the stream positioned right after the 4-byte tag;
/// the tag itself and any trailing block padding belong to the caller.
pub trait IfpCodec: Sync {
    fn format(&self) -> IfpFormat;

    /// Decode the container that follows the tag
    fn read_container(&self, reader: &mut dyn Read) -> Result<Container, IfpError>;

    /// Check everything that could make `write_container` fail midway
    fn validate(&self, container: &Container) -> Result<(), IfpError>;

    /// Encode `container`; runs [`IfpCodec::validate`] before the first byte
    fn write_container(&self, writer: &mut dyn Write, container: &Container)
    -> Result<(), IfpError>;

    /// Value of the container's leading size field (bytes after that field)
    ///
    /// Fails with [`IfpError::SizeOverflow`] when the container is too large
    /// for the 32-bit field.
    fn container_size(&self, container: &Container) -> Result<u32, IfpError>;

    /// Block size the whole file is padded to, if any
    fn block_size(&self) -> Option<u64> {
        None
    }
}

static CODECS: [&dyn IfpCodec; 2] = [&Anp3Codec, &AnpkCodec];

/// Find the codec registered for a header tag
pub fn codec_for_tag(tag: &[u8]) -> Option<&'static dyn IfpCodec> {
    CODECS
        .iter()
        .copied()
        .find(|codec| codec.format().tag().as_slice() == tag)
}
