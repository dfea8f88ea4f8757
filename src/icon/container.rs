use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, U32};

use super::IconDirEntry;

/// The 6-byte header of a standalone `.ico` file, `ICONDIR`.
#[doc(alias("ICONDIR"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct IconFileHeader {
    reserved: U16<LittleEndian>,
    resource_type: U16<LittleEndian>,
    count: U16<LittleEndian>,
}

/// A 16-byte `.ico` directory entry, `ICONDIRENTRY`.
///
/// It differs from the resource form only in its last field: a 32-bit file offset to the image
/// replaces the 16-bit resource ID.
#[doc(alias("ICONDIRENTRY"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct IconFileEntry {
    width: u8,
    height: u8,
    color_count: u8,
    reserved: u8,
    planes: U16<LittleEndian>,
    bit_count: U16<LittleEndian>,
    bytes_in_res: U32<LittleEndian>,
    image_offset: U32<LittleEndian>,
}

impl IconFileEntry {
    #[inline]
    pub const fn bytes_in_res(&self) -> u32 {
        self.bytes_in_res.get()
    }

    #[inline]
    pub const fn image_offset(&self) -> u32 {
        self.image_offset.get()
    }
}

/// A single-image `.ico` file synthesized in memory around one `RT_ICON` payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconContainer {
    entry: IconFileEntry,
    bytes: Vec<u8>,
}

impl IconContainer {
    /// Offset of the image data: one header followed by one directory entry.
    pub const IMAGE_OFFSET: usize = size_of::<IconFileHeader>() + size_of::<IconFileEntry>();

    pub fn new(entry: &IconDirEntry, payload: &[u8]) -> Self {
        let header = IconFileHeader {
            reserved: U16::ZERO,
            resource_type: U16::new(1),
            count: U16::new(1),
        };

        // Payloads come from a resource whose size is a u32
        let bytes_in_res = u32::try_from(payload.len()).unwrap_or(u32::MAX);

        let file_entry = IconFileEntry {
            width: entry.raw_width(),
            height: entry.raw_height(),
            color_count: entry.color_count(),
            reserved: entry.reserved(),
            planes: U16::new(entry.planes()),
            bit_count: U16::new(entry.bit_count()),
            bytes_in_res: U32::new(bytes_in_res),
            image_offset: U32::new(Self::IMAGE_OFFSET as u32),
        };

        let mut bytes = Vec::with_capacity(Self::IMAGE_OFFSET + payload.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(file_entry.as_bytes());
        bytes.extend_from_slice(payload);

        Self {
            entry: file_entry,
            bytes,
        }
    }

    /// The directory entry describing the single image.
    #[inline]
    pub const fn entry(&self) -> &IconFileEntry {
        &self.entry
    }

    /// The image data: either a PNG stream or a headerless DIB.
    pub fn image(&self) -> &[u8] {
        &self.bytes[self.entry.image_offset() as usize..]
    }

    /// The complete `.ico` file.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
