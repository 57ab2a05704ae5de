//! Error types for IFP parsing and writing

use std::io;

/// Errors that can occur when reading or writing IFP animation files
#[derive(Debug, thiserror::Error)]
pub enum IfpError {
    /// The 4-byte header tag matches no registered format
    #[error("unknown IFP format tag {0:?} (expected \"ANP3\" or \"ANPK\")")]
    UnknownFormat(String),

    /// Fewer bytes available than a fixed-width read requires
    #[error("unexpected end of stream")]
    Truncated,

    /// A string does not fit its fixed-width slot (including the null terminator)
    #[error("string {value:?} does not fit in a {max_len}-byte field")]
    StringTooLong { value: String, max_len: usize },

    /// A chunk marker did not match the expected literal
    #[error("expected chunk tag {expected:?}, found {found:?}")]
    UnexpectedTag { expected: &'static str, found: String },

    /// ANIM record length is neither 44 (bone id) nor 48 (sibling pair)
    #[error("invalid ANIM record length {0} (expected 44 or 48)")]
    InvalidAnimLength(u32),

    /// INFO chunk too small to hold its count field
    #[error("invalid INFO chunk size {0} (must be at least 4)")]
    InvalidInfoSize(u32),

    /// Chunked keyframe channel code is not a 4-character ASCII marker
    #[error("invalid keyframe channel code {0:?}")]
    InvalidChannelCode(String),

    /// Bone advertises a channel the target format cannot encode
    #[error("{format} cannot encode the scale channel of bone {bone:?}")]
    UnsupportedChannel { format: &'static str, bone: String },

    /// Bone identification scheme not representable in the target format
    #[error("{format} cannot encode the sibling identification of bone {bone:?}")]
    UnsupportedIdentification { format: &'static str, bone: String },

    /// A name holds non-ASCII bytes or an interior NUL
    #[error("name {value:?} is not NUL-free ASCII")]
    InvalidName { value: String },

    /// Keyframe data in a channel the bone's mask excludes
    #[error("bone {bone:?} has {channel} data outside its channel mask")]
    ChannelMismatch { bone: String, channel: &'static str },

    /// A count or size does not fit its 32-bit field
    #[error("{field} value {value} does not fit in a 32-bit field")]
    SizeOverflow { field: &'static str, value: u64 },

    /// Writers never emit bones without keyframes
    #[error("bone {bone:?} has no keyframes")]
    EmptyBone { bone: String },

    /// Quantized value does not fit the 16-bit field it is stored in
    #[error("{field} value {value} is out of range for its encoding")]
    ValueOutOfRange { field: &'static str, value: f32 },

    /// Underlying file or stream failure
    #[error("IO error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for IfpError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::Io(err),
        }
    }
}
