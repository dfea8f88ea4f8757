use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U32};

use crate::pe::ResourceOffset;

pub const IMAGE_RESOURCE_NAME_IS_STRING: u32 = 0x8000_0000;
pub const IMAGE_RESOURCE_DATA_IS_DIRECTORY: u32 = 0x8000_0000;

#[doc(alias("IMAGE_RESOURCE_DIRECTORY_ENTRY"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ImageResourceDirectoryEntry {
    name_or_id: U32<LittleEndian>,
    offset_to_data_or_directory: U32<LittleEndian>,
}

impl ImageResourceDirectoryEntry {
    /// Returns true if the key is an offset to a string name rather than an integer ID.
    #[inline]
    pub const fn has_name(self) -> bool {
        self.name_or_id() & IMAGE_RESOURCE_NAME_IS_STRING != 0
    }

    /// The raw 32-bit key of this entry.
    #[inline]
    pub const fn name_or_id(self) -> u32 {
        self.name_or_id.get()
    }

    /// The offset of the name string, valid if [`has_name`](Self::has_name) returns true.
    #[inline]
    pub const fn name_offset(self) -> ResourceOffset {
        ResourceOffset::new(self.name_or_id() & !IMAGE_RESOURCE_NAME_IS_STRING)
    }

    #[inline]
    const fn offset_to_data_or_directory(self) -> u32 {
        self.offset_to_data_or_directory.get()
    }

    /// Returns true if the entry points at a subdirectory rather than a data entry.
    #[inline]
    pub const fn is_table(self) -> bool {
        self.offset_to_data_or_directory() & IMAGE_RESOURCE_DATA_IS_DIRECTORY != 0
    }

    /// The offset of the associated subdirectory or data entry.
    #[inline]
    pub const fn data_offset(self) -> ResourceOffset {
        let offset = self.offset_to_data_or_directory() & !IMAGE_RESOURCE_DATA_IS_DIRECTORY;
        ResourceOffset::new(offset)
    }
}

#[cfg(test)]
impl ImageResourceDirectoryEntry {
    pub(crate) fn test_new(name_or_id: u32, offset_to_data_or_directory: u32) -> Self {
        Self {
            name_or_id: U32::new(name_or_id),
            offset_to_data_or_directory: U32::new(offset_to_data_or_directory),
        }
    }
}
