mod section_header;

use std::{io, slice};

pub use section_header::SectionHeader;
use tracing::trace;
use zerocopy::{FromZeros, IntoBytes};

use super::{FileOffset, Rva};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[repr(transparent)]
pub struct SectionTable(Vec<SectionHeader>);

impl SectionTable {
    /// Size of one `IMAGE_SECTION_HEADER`.
    pub const ENTRY_SIZE: usize = size_of::<SectionHeader>();

    #[inline]
    pub fn sections(&self) -> &[SectionHeader] {
        &self.0
    }

    /// Reads `number_of_sections` headers from the reader's current position.
    pub fn read_from<R>(mut src: R, number_of_sections: u16) -> io::Result<Self>
    where
        R: io::Read,
    {
        let mut sections = vec![SectionHeader::new_zeroed(); number_of_sections.into()];

        for section in &mut sections {
            src.read_exact(section.as_mut_bytes())?;
        }

        Ok(Self(sections))
    }

    /// Returns the first section whose virtual range contains `rva`.
    pub fn section_containing(&self, rva: Rva) -> Option<&SectionHeader> {
        self.0.iter().find(|section| section.contains(rva))
    }

    /// Converts a relative virtual address to a file offset.
    ///
    /// Returns `None` if the address is not mapped by any section.
    pub fn to_file_offset(&self, rva: Rva) -> Option<FileOffset> {
        let section = self.section_containing(rva)?;
        let offset = u64::from(section.pointer_to_raw_data())
            + u64::from(rva.get() - section.virtual_address());
        trace!(%rva, section = section.real_name(), offset, "Translated RVA");
        Some(FileOffset::new(offset))
    }
}

impl From<Vec<SectionHeader>> for SectionTable {
    #[inline]
    fn from(sections: Vec<SectionHeader>) -> Self {
        Self(sections)
    }
}

impl<'table> IntoIterator for &'table SectionTable {
    type Item = &'table SectionHeader;

    type IntoIter = slice::Iter<'table, SectionHeader>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
