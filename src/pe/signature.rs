use std::{fmt, io};

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::read::ReadBytesExt;

/// The 4-byte signature that starts the NT headers, normally `PE\0\0`.
#[derive(Copy, Clone, Default, Eq, PartialEq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(transparent)]
pub struct Signature([u8; 4]);

impl Signature {
    pub const MAGIC: Self = Self(*b"PE\0\0");

    pub fn read_from<R>(mut reader: R) -> io::Result<Self>
    where
        R: io::Read,
    {
        reader.read_t::<Self>()
    }

    /// Only the leading `PE` is checked. The trailing bytes are always zero in practice but the
    /// Windows loader does not rely on them either.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(b"PE")
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes())
            .map(|signature| signature.trim_end_matches('\0'))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.as_str()).finish()
    }
}
