use derive_more::{Display, From, Into};

/// A relative virtual address: an address relative to the image base once loaded.
///
/// Must be translated through the [`SectionTable`](super::SectionTable) before it can be used to
/// read from the file.
#[derive(
    Copy, Clone, Debug, Default, Display, Eq, PartialEq, Ord, PartialOrd, Hash, From, Into,
)]
#[display("{_0:#X}")]
pub struct Rva(u32);

impl Rva {
    #[inline]
    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// An offset relative to the start of the resource directory.
///
/// Directory entries point at subdirectories and data entries using this kind of offset. It is
/// never translated through the section table.
#[derive(
    Copy, Clone, Debug, Default, Display, Eq, PartialEq, Ord, PartialOrd, Hash, From, Into,
)]
#[display("{_0:#X}")]
pub struct ResourceOffset(u32);

impl ResourceOffset {
    #[inline]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// An absolute byte offset into the file.
#[derive(
    Copy, Clone, Debug, Default, Display, Eq, PartialEq, Ord, PartialOrd, Hash, From, Into,
)]
#[display("{_0:#X}")]
pub struct FileOffset(u64);

impl FileOffset {
    #[inline]
    pub const fn new(offset: u64) -> Self {
        Self(offset)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the offset `count` bytes further on, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, count: u64) -> Option<Self> {
        match self.0.checked_add(count) {
            Some(offset) => Some(Self(offset)),
            None => None,
        }
    }
}

impl From<u32> for FileOffset {
    #[inline]
    fn from(offset: u32) -> Self {
        Self(offset.into())
    }
}
