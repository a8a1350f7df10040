use alloc::string::String;
use enough::StopReason;

/// Errors from TGA decoding, conversion and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TgaError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("unexpected end of input")]
    TruncatedData,

    #[error("malformed pixel stream: {0}")]
    MalformedStream(String),

    #[error("palette index {index} out of range for color map of {len} entries")]
    PaletteIndexOutOfRange { index: u32, len: u32 },

    #[error("unsupported conversion mode {0} (expected 0-9)")]
    UnsupportedConversion(u8),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for TgaError {
    fn from(r: StopReason) -> Self {
        TgaError::Cancelled(r)
    }
}

impl From<core::convert::Infallible> for TgaError {
    fn from(never: core::convert::Infallible) -> Self {
        match never {}
    }
}
