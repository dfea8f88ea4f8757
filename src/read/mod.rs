mod ext;

pub use ext::{ByteSliceExt, ReadBytesExt};
