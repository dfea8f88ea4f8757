use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IconError {
    #[error("File is not a PE executable")]
    NotPe,
    #[error("PE file has no resource table")]
    NoResourceTable,
    #[error("No icon group or matching icon resource found")]
    ResourceNotFound,
    #[error("Icon group resource is malformed")]
    MalformedIconGroup,
    #[error("Icon bitmaps with {0} bits per pixel are not supported")]
    UnsupportedBitDepth(u16),
    #[error("Resource data is truncated")]
    TruncatedPayload,
    #[error(transparent)]
    Png(#[from] image::ImageError),
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for IconError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedPayload
        } else {
            Self::Io(error)
        }
    }
}
