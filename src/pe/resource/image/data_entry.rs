use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U32};

use crate::pe::Rva;

// Each resource data entry describes a leaf of the resource tree. Unlike the offsets inside the
// directory tables, its data pointer is an RVA and must go through the section table.
#[doc(alias("IMAGE_RESOURCE_DATA_ENTRY"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ImageResourceDataEntry {
    offset_to_data: U32<LittleEndian>,
    size: U32<LittleEndian>,
    codepage: U32<LittleEndian>,
    reserved: U32<LittleEndian>,
}

impl ImageResourceDataEntry {
    #[inline]
    pub const fn offset_to_data(&self) -> Rva {
        Rva::new(self.offset_to_data.get())
    }

    #[inline]
    pub const fn size(&self) -> u32 {
        self.size.get()
    }
}

#[cfg(test)]
impl ImageResourceDataEntry {
    pub(crate) fn test_new(offset_to_data: u32, size: u32) -> Self {
        Self {
            offset_to_data: U32::new(offset_to_data),
            size: U32::new(size),
            codepage: U32::ZERO,
            reserved: U32::ZERO,
        }
    }
}
