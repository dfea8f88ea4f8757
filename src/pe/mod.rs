mod coff;
mod dos;
mod offset;
pub mod optional_header;
pub mod resource;
mod section_table;
mod signature;

use std::io::{Read, Seek, SeekFrom};

pub use coff::CoffHeader;
pub use dos::DosHeader;
pub use offset::{FileOffset, ResourceOffset, Rva};
pub use optional_header::OptionalHeader;
pub use section_table::{SectionHeader, SectionTable};
pub use signature::Signature;
use tracing::debug;

use crate::{error::IconError, read::ReadBytesExt};

/// The validated headers of a PE image, up to and including the section table.
#[derive(Debug)]
pub struct PeHeaders {
    pub dos_header: DosHeader,
    pub coff_header: CoffHeader,
    pub optional_header: OptionalHeader,
    pub section_table: SectionTable,
}

impl PeHeaders {
    /// Validates the DOS and PE signatures and reads the headers needed to locate resources.
    ///
    /// Nothing past the 64-byte DOS header is read unless it starts with `MZ`.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::NotPe`] if either signature is missing or the file ends before them.
    pub fn read_from<R>(mut reader: R) -> Result<Self, IconError>
    where
        R: Read + Seek,
    {
        reader.seek(SeekFrom::Start(0))?;

        let dos_header = DosHeader::read_from(&mut reader).map_err(|_| IconError::NotPe)?;
        if !dos_header.has_valid_signature() {
            return Err(IconError::NotPe);
        }

        reader.seek(SeekFrom::Start(dos_header.pe_pointer().into()))?;

        let signature = Signature::read_from(&mut reader).map_err(|_| IconError::NotPe)?;
        if !signature.is_valid() {
            return Err(IconError::NotPe);
        }

        let coff_header = reader.read_t::<CoffHeader>()?;

        let optional_header =
            OptionalHeader::read_from(&mut reader, coff_header.size_of_optional_header())?;

        let headers = Self {
            dos_header,
            coff_header,
            optional_header,
            section_table: SectionTable::default(),
        };

        reader.seek(SeekFrom::Start(headers.section_table_offset().get()))?;
        let section_table =
            SectionTable::read_from(&mut reader, headers.coff_header.number_of_sections())?;

        debug!(
            pe_header_offset = %headers.pe_header_offset(),
            magic = %headers.optional_header.magic(),
            number_of_sections = headers.number_of_sections(),
            "Read PE headers"
        );

        Ok(Self {
            section_table,
            ..headers
        })
    }

    /// The file offset of the `PE\0\0` signature.
    #[inline]
    pub fn pe_header_offset(&self) -> FileOffset {
        FileOffset::from(self.dos_header.pe_pointer())
    }

    #[inline]
    pub const fn number_of_sections(&self) -> u16 {
        self.coff_header.number_of_sections()
    }

    #[inline]
    pub const fn optional_header_size(&self) -> u16 {
        self.coff_header.size_of_optional_header()
    }

    #[inline]
    pub const fn is_pe32_plus(&self) -> bool {
        self.optional_header.is_pe32_plus()
    }

    /// The section table starts right after the optional header.
    pub fn section_table_offset(&self) -> FileOffset {
        FileOffset::new(
            self.pe_header_offset().get()
                + size_of::<Signature>() as u64
                + size_of::<CoffHeader>() as u64
                + u64::from(self.optional_header_size()),
        )
    }

    /// Locates the resource directory, yielding the facts the resource walker needs.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::NoResourceTable`] if the resource data directory is absent, empty, not
    /// mapped by any section, or points past the end of the file.
    pub fn into_info(self, file_len: u64) -> Result<PeInfo, IconError> {
        let resource_table = self
            .optional_header
            .data_directories()
            .resource_table()
            .copied()
            .filter(|resource_table| !resource_table.is_empty())
            .ok_or(IconError::NoResourceTable)?;

        let resource_base = resource_table
            .file_offset(&self.section_table)
            .filter(|offset| offset.get() < file_len)
            .ok_or(IconError::NoResourceTable)?;

        let resource_rva = resource_table.virtual_address();

        // Prefer the extent of the section holding the resource directory, as some linkers
        // understate the data directory size
        let section_end = self
            .section_table
            .section_containing(resource_rva)
            .map(|section| {
                u64::from(section.pointer_to_raw_data()) + u64::from(section.size_of_raw_data())
            })
            .unwrap_or_default();
        let resource_end = section_end
            .max(resource_base.get() + u64::from(resource_table.size()))
            .min(file_len);

        debug!(%resource_rva, %resource_base, resource_end, "Located resource directory");

        Ok(PeInfo {
            section_table_offset: self.section_table_offset(),
            section_table: self.section_table,
            resource_base,
            resource_rva,
            resource_len: resource_end - resource_base.get(),
            file_len,
        })
    }
}

/// Read-only facts about one executable, computed once per extraction.
#[derive(Clone, Debug)]
pub struct PeInfo {
    section_table_offset: FileOffset,
    section_table: SectionTable,
    resource_base: FileOffset,
    resource_rva: Rva,
    resource_len: u64,
    file_len: u64,
}

impl PeInfo {
    #[inline]
    pub const fn section_table_offset(&self) -> FileOffset {
        self.section_table_offset
    }

    #[inline]
    pub fn number_of_sections(&self) -> usize {
        self.section_table.sections().len()
    }

    #[inline]
    pub const fn section_table(&self) -> &SectionTable {
        &self.section_table
    }

    /// The file offset every [`ResourceOffset`] is relative to.
    #[inline]
    pub const fn resource_base(&self) -> FileOffset {
        self.resource_base
    }

    /// The virtual address of the resource directory.
    #[inline]
    pub const fn resource_rva(&self) -> Rva {
        self.resource_rva
    }

    /// The number of bytes from the resource base to the end of its section.
    #[inline]
    pub const fn resource_len(&self) -> u64 {
        self.resource_len
    }

    #[inline]
    pub const fn file_len(&self) -> u64 {
        self.file_len
    }
}
