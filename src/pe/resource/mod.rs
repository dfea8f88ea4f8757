mod image;
mod name;
mod resource_types;
mod table;

use std::io::{Read, Seek, SeekFrom};

pub use image::{
    IMAGE_RESOURCE_DATA_IS_DIRECTORY, IMAGE_RESOURCE_NAME_IS_STRING, ImageResourceDataEntry,
    ImageResourceDirectory, ImageResourceDirectoryEntry,
};
pub use name::ResourceName;
pub use resource_types::ResourceType;
pub use table::ResourceDirectoryTable;
use tracing::{trace, warn};
use zerocopy::FromBytes;

use super::{FileOffset, PeInfo, ResourceOffset, SectionTable};
use crate::error::IconError;

/// A located, still unread resource payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ResourceEntry {
    /// The raw key of the name/ID level. For named resources the high bit is set.
    pub id: u32,
    pub language: u32,
    pub offset: FileOffset,
    pub size: u32,
}

impl ResourceEntry {
    #[inline]
    pub const fn is_named(&self) -> bool {
        self.id & IMAGE_RESOURCE_NAME_IS_STRING != 0
    }

    /// Reads the payload, which has already been checked to lie within the file.
    pub fn read<R>(&self, mut reader: R) -> Result<Vec<u8>, IconError>
    where
        R: Read + Seek,
    {
        reader.seek(SeekFrom::Start(self.offset.get()))?;
        let mut payload = vec![0; self.size as usize];
        reader.read_exact(&mut payload)?;
        Ok(payload)
    }
}

/// The resource directory tree, loaded into memory from the resource base to the end of its
/// section.
///
/// The tree has exactly three levels: type, name or ID, and language. Every table and data entry
/// is parsed from the in-memory bytes, so a corrupt offset can only ever make a branch disappear.
pub struct ResourceDirectory {
    data: Vec<u8>,
    file_len: u64,
}

impl ResourceDirectory {
    pub fn read_from<R>(mut reader: R, pe_info: &PeInfo) -> Result<Self, IconError>
    where
        R: Read + Seek,
    {
        reader.seek(SeekFrom::Start(pe_info.resource_base().get()))?;

        let mut data = Vec::with_capacity(pe_info.resource_len() as usize);
        reader
            .by_ref()
            .take(pe_info.resource_len())
            .read_to_end(&mut data)?;

        Self::new(data, pe_info.file_len())
    }

    /// Wraps resource directory bytes that have already been read from a file of `file_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::NoResourceTable`] if the root table does not fit.
    pub fn new(data: Vec<u8>, file_len: u64) -> Result<Self, IconError> {
        if ResourceDirectoryTable::parse(&data).is_none() {
            return Err(IconError::NoResourceTable);
        }

        Ok(Self { data, file_len })
    }

    fn root(&self) -> Option<ResourceDirectoryTable<'_>> {
        ResourceDirectoryTable::parse(&self.data)
    }

    /// Parses the subdirectory an entry points at, if it is one and lies within bounds.
    fn table_at(&self, offset: ResourceOffset) -> Option<ResourceDirectoryTable<'_>> {
        self.data
            .get(offset.as_usize()..)
            .and_then(ResourceDirectoryTable::parse)
    }

    fn data_entry_at(&self, offset: ResourceOffset) -> Option<ImageResourceDataEntry> {
        self.data
            .get(offset.as_usize()..)
            .and_then(|bytes| ImageResourceDataEntry::read_from_prefix(bytes).ok())
            .map(|(data_entry, _)| data_entry)
    }

    /// Resolves the name of a named resource key.
    pub fn name(&self, id: u32) -> Option<String> {
        if id & IMAGE_RESOURCE_NAME_IS_STRING == 0 {
            return None;
        }

        let offset = ResourceOffset::new(id & !IMAGE_RESOURCE_NAME_IS_STRING);
        ResourceName::new(offset).to_string_lossy(&self.data)
    }

    /// Collects every resource of the given type, in traversal order.
    ///
    /// Branches whose tables or data entries are out of bounds, or whose data does not map to a
    /// location inside the file, are skipped.
    pub fn entries(
        &self,
        resource_type: ResourceType,
        section_table: &SectionTable,
    ) -> Vec<ResourceEntry> {
        let mut resources = Vec::new();

        let Some(root) = self.root() else {
            return resources;
        };

        // Level 1: type
        let type_id = resource_type.id();
        for type_entry in root
            .id_entries()
            .filter(|entry| !entry.has_name() && entry.name_or_id() == type_id)
        {
            if !type_entry.is_table() {
                warn!(%resource_type, "Type entry does not point at a directory");
                continue;
            }
            let Some(names) = self.table_at(type_entry.data_offset()) else {
                warn!(
                    %resource_type,
                    offset = %type_entry.data_offset(),
                    "Name directory is out of bounds"
                );
                continue;
            };

            // Level 2: name or ID
            for name_entry in names.entries() {
                let id = name_entry.name_or_id();
                if !name_entry.is_table() {
                    warn!(id, "Name entry does not point at a directory");
                    continue;
                }
                let Some(languages) = self.table_at(name_entry.data_offset()) else {
                    warn!(
                        id,
                        offset = %name_entry.data_offset(),
                        "Language directory is out of bounds"
                    );
                    continue;
                };

                // Level 3: language
                for language_entry in languages.entries() {
                    if let Some(resource) = self.leaf(id, *language_entry, section_table) {
                        trace!(?resource, %resource_type, "Found resource");
                        resources.push(resource);
                    }
                }
            }
        }

        resources
    }

    fn leaf(
        &self,
        id: u32,
        language_entry: ImageResourceDirectoryEntry,
        section_table: &SectionTable,
    ) -> Option<ResourceEntry> {
        let language = language_entry.name_or_id();

        if language_entry.is_table() {
            warn!(id, language, "Resource tree is deeper than three levels");
            return None;
        }

        let Some(data_entry) = self.data_entry_at(language_entry.data_offset()) else {
            warn!(
                id,
                language,
                offset = %language_entry.data_offset(),
                "Data entry is out of bounds"
            );
            return None;
        };

        let Some(offset) = section_table.to_file_offset(data_entry.offset_to_data()) else {
            warn!(
                id,
                language,
                rva = %data_entry.offset_to_data(),
                "Resource data is not mapped by any section"
            );
            return None;
        };

        let in_bounds = offset
            .checked_add(data_entry.size().into())
            .is_some_and(|end| end.get() <= self.file_len);
        if !in_bounds {
            warn!(
                id,
                language,
                %offset,
                size = data_entry.size(),
                "Resource data extends past the end of the file"
            );
            return None;
        }

        Some(ResourceEntry {
            id,
            language,
            offset,
            size: data_entry.size(),
        })
    }
}
