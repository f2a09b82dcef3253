use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

#[derive(Debug)]
pub enum ThumbError {
    IoError(io::Error),
    OpenFailed(String),
    InvalidDimensions { width: u32, height: u32 },
    CodecError(String),
    Stall { scanline: u32 },
    AllocationFailed { bytes: usize },
    Unsupported(String),
    AlreadyDecoded,
    HandleFailed,
}

impl Error for ThumbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ThumbError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for ThumbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ThumbError::IoError(err) => write!(f, "I/O error: {}", err),
            ThumbError::OpenFailed(reason) => write!(f, "Failed to open image: {}", reason),
            ThumbError::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            ThumbError::CodecError(msg) => write!(f, "Codec error: {}", msg),
            ThumbError::Stall { scanline } => {
                write!(f, "Decoder stalled at scanline {}", scanline)
            }
            ThumbError::AllocationFailed { bytes } => {
                write!(f, "Failed to allocate {} bytes for pixel buffer", bytes)
            }
            ThumbError::Unsupported(what) => write!(f, "Unsupported: {}", what),
            ThumbError::AlreadyDecoded => write!(f, "Image has already been decoded"),
            ThumbError::HandleFailed => write!(f, "Handle is in a failed state"),
        }
    }
}

impl From<io::Error> for ThumbError {
    fn from(error: io::Error) -> Self {
        ThumbError::IoError(error)
    }
}

impl From<jpeg_decoder::Error> for ThumbError {
    fn from(error: jpeg_decoder::Error) -> Self {
        match error {
            jpeg_decoder::Error::Io(err) => ThumbError::IoError(err),
            other => ThumbError::CodecError(other.to_string()),
        }
    }
}

// Result type alias for thumbjet operations
pub type ThumbResult<T> = Result<T, ThumbError>;
