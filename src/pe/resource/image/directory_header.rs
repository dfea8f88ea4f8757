use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, U32};

/// The 16-byte header at the start of every resource directory table, followed by its named
/// entries and then its ID entries.
#[doc(alias("IMAGE_RESOURCE_DIRECTORY"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ImageResourceDirectory {
    characteristics: U32<LittleEndian>,
    time_date_stamp: U32<LittleEndian>,
    major_version: U16<LittleEndian>,
    minor_version: U16<LittleEndian>,
    number_of_name_entries: U16<LittleEndian>,
    number_of_id_entries: U16<LittleEndian>,
}

impl ImageResourceDirectory {
    #[inline]
    pub const fn number_of_name_entries(&self) -> u16 {
        self.number_of_name_entries.get()
    }

    #[inline]
    pub const fn number_of_id_entries(&self) -> u16 {
        self.number_of_id_entries.get()
    }

    #[inline]
    pub const fn number_of_entries(&self) -> usize {
        self.number_of_name_entries() as usize + self.number_of_id_entries() as usize
    }
}

#[cfg(test)]
impl ImageResourceDirectory {
    pub(crate) fn test_new(number_of_name_entries: u16, number_of_id_entries: u16) -> Self {
        use zerocopy::FromZeros;

        let mut header = Self::new_zeroed();
        header.number_of_name_entries = U16::new(number_of_name_entries);
        header.number_of_id_entries = U16::new(number_of_id_entries);
        header
    }
}
