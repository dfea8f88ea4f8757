//! Builders for small, well-formed PE images used throughout the tests.

use zerocopy::IntoBytes;

use crate::{
    icon::IconDirEntry,
    pe::{
        SectionHeader,
        resource::{
            IMAGE_RESOURCE_DATA_IS_DIRECTORY, IMAGE_RESOURCE_NAME_IS_STRING,
            ImageResourceDataEntry, ImageResourceDirectory, ImageResourceDirectoryEntry,
            ResourceType,
        },
    },
};

const LANG_EN_US: u32 = 0x409;
const FILE_ALIGNMENT: usize = 0x200;

/// Builds a PE image with a `.text` section and a `.rsrc` section holding a resource tree.
#[derive(Default)]
pub struct PeBuilder {
    pe32_plus: bool,
    resource_directory_rva: Option<u32>,
    resource_directory_size: Option<u32>,
    resources: ResourceBuilder,
}

impl PeBuilder {
    pub const PE_HEADER_OFFSET: usize = 0x80;
    pub const RSRC_RVA: u32 = 0x2000;
    pub const RSRC_FILE_OFFSET: u32 = 0x400;
    const TEXT_RVA: u32 = 0x1000;
    const TEXT_FILE_OFFSET: u32 = 0x200;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn pe32_plus(mut self, pe32_plus: bool) -> Self {
        self.pe32_plus = pe32_plus;
        self
    }

    pub fn resource_directory_rva(mut self, rva: u32) -> Self {
        self.resource_directory_rva = Some(rva);
        self
    }

    pub fn resource_directory_size(mut self, size: u32) -> Self {
        self.resource_directory_size = Some(size);
        self
    }

    pub fn resources(mut self, resources: ResourceBuilder) -> Self {
        self.resources = resources;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let rsrc = self.resources.build(Self::RSRC_RVA);
        let rsrc_raw_size = rsrc.len().next_multiple_of(FILE_ALIGNMENT).max(0x1000);

        let mut bytes = vec![0; Self::RSRC_FILE_OFFSET as usize + rsrc_raw_size];

        // DOS header
        bytes[..2].copy_from_slice(b"MZ");
        put_u32(&mut bytes, 0x3C, Self::PE_HEADER_OFFSET as u32);

        // PE signature and COFF header
        let pe = Self::PE_HEADER_OFFSET;
        bytes[pe..pe + 4].copy_from_slice(b"PE\0\0");
        let coff = pe + 4;
        let machine = if self.pe32_plus { 0x8664 } else { 0x14C };
        put_u16(&mut bytes, coff, machine);
        put_u16(&mut bytes, coff + 2, 2);
        let optional_header_size: u16 = if self.pe32_plus { 240 } else { 224 };
        put_u16(&mut bytes, coff + 16, optional_header_size);
        put_u16(&mut bytes, coff + 18, 0x0102);

        // Optional header
        let optional = coff + 20;
        let magic = if self.pe32_plus { 0x20B } else { 0x10B };
        put_u16(&mut bytes, optional, magic);
        let data_directories = optional + if self.pe32_plus { 112 } else { 96 };
        put_u32(&mut bytes, data_directories - 4, 16);
        let resource_directory = data_directories + 2 * 8;
        put_u32(
            &mut bytes,
            resource_directory,
            self.resource_directory_rva.unwrap_or(Self::RSRC_RVA),
        );
        put_u32(
            &mut bytes,
            resource_directory + 4,
            self.resource_directory_size.unwrap_or(rsrc.len() as u32),
        );

        // Section table
        let sections = [
            SectionHeader::test_new(
                b".text",
                Self::TEXT_RVA,
                FILE_ALIGNMENT as u32,
                Self::TEXT_FILE_OFFSET,
                FILE_ALIGNMENT as u32,
            ),
            SectionHeader::test_new(
                b".rsrc",
                Self::RSRC_RVA,
                rsrc_raw_size as u32,
                Self::RSRC_FILE_OFFSET,
                rsrc_raw_size as u32,
            ),
        ];
        let section_table = optional + usize::from(optional_header_size);
        bytes[section_table..section_table + sections.as_bytes().len()]
            .copy_from_slice(sections.as_bytes());

        let rsrc_start = Self::RSRC_FILE_OFFSET as usize;
        bytes[rsrc_start..rsrc_start + rsrc.len()].copy_from_slice(&rsrc);

        bytes
    }
}

#[derive(Clone, Debug)]
enum Key {
    Id(u32),
    Name(String),
}

#[derive(Clone, Debug)]
struct Resource {
    resource_type: ResourceType,
    key: Key,
    payload: Vec<u8>,
    language_directory_override: Option<u32>,
    language_entry_is_directory: bool,
    data_rva_override: Option<u32>,
    data_size_override: Option<u32>,
}

impl Resource {
    fn new(resource_type: ResourceType, key: Key, payload: Vec<u8>) -> Self {
        Self {
            resource_type,
            key,
            payload,
            language_directory_override: None,
            language_entry_is_directory: false,
            data_rva_override: None,
            data_size_override: None,
        }
    }

    fn has_id(&self, resource_type: ResourceType, id: u32) -> bool {
        self.resource_type == resource_type && matches!(self.key, Key::Id(key) if key == id)
    }
}

/// Serializes a three-level resource tree with one language per resource.
#[derive(Clone, Debug, Default)]
pub struct ResourceBuilder {
    resources: Vec<Resource>,
}

impl ResourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, resource_type: ResourceType, id: u32, payload: Vec<u8>) -> Self {
        self.resources
            .push(Resource::new(resource_type, Key::Id(id), payload));
        self
    }

    pub fn add_named(mut self, resource_type: ResourceType, name: &str, payload: Vec<u8>) -> Self {
        let key = Key::Name(name.to_owned());
        self.resources
            .push(Resource::new(resource_type, key, payload));
        self
    }

    fn modify(mut self, resource_type: ResourceType, id: u32, f: impl Fn(&mut Resource)) -> Self {
        self.resources
            .iter_mut()
            .filter(|resource| resource.has_id(resource_type, id))
            .for_each(f);
        self
    }

    /// Points the name-level entry of a resource at `offset` instead of its language directory.
    pub fn corrupt_language_directory(
        self,
        resource_type: ResourceType,
        id: u32,
        offset: u32,
    ) -> Self {
        self.modify(resource_type, id, |resource| {
            resource.language_directory_override = Some(offset);
        })
    }

    /// Flags the language-level entry of a resource as a subdirectory instead of a data entry.
    pub fn language_entry_as_directory(self, resource_type: ResourceType, id: u32) -> Self {
        self.modify(resource_type, id, |resource| {
            resource.language_entry_is_directory = true;
        })
    }

    pub fn data_rva_override(self, resource_type: ResourceType, id: u32, rva: u32) -> Self {
        self.modify(resource_type, id, |resource| {
            resource.data_rva_override = Some(rva);
        })
    }

    pub fn data_size_override(self, resource_type: ResourceType, id: u32, size: u32) -> Self {
        self.modify(resource_type, id, |resource| {
            resource.data_size_override = Some(size);
        })
    }

    /// Serializes the tree as it would appear at `rva`.
    pub fn build(&self, rva: u32) -> Vec<u8> {
        let mut types = Vec::<ResourceType>::new();
        for resource in &self.resources {
            if !types.contains(&resource.resource_type) {
                types.push(resource.resource_type);
            }
        }

        // Named entries precede ID entries within each name directory
        let by_type = types
            .iter()
            .map(|&resource_type| {
                let mut members = self
                    .resources
                    .iter()
                    .filter(|resource| resource.resource_type == resource_type)
                    .collect::<Vec<_>>();
                members.sort_by_key(|resource| matches!(resource.key, Key::Id(_)));
                members
            })
            .collect::<Vec<_>>();

        let table_size = |entries: usize| {
            size_of::<ImageResourceDirectory>() + entries * size_of::<ImageResourceDirectoryEntry>()
        };

        let mut offset = table_size(types.len());
        let name_tables = by_type
            .iter()
            .map(|members| {
                let start = offset;
                offset += table_size(members.len());
                start
            })
            .collect::<Vec<_>>();

        let ordered = by_type.iter().flatten().copied().collect::<Vec<_>>();
        let language_tables = ordered
            .iter()
            .map(|_| {
                let start = offset;
                offset += table_size(1);
                start
            })
            .collect::<Vec<_>>();
        let data_entries = ordered
            .iter()
            .map(|_| {
                let start = offset;
                offset += size_of::<ImageResourceDataEntry>();
                start
            })
            .collect::<Vec<_>>();
        let names = ordered
            .iter()
            .map(|resource| match &resource.key {
                Key::Id(_) => None,
                Key::Name(name) => {
                    let start = offset;
                    offset += size_of::<u16>() + name.encode_utf16().count() * size_of::<u16>();
                    Some(start)
                }
            })
            .collect::<Vec<_>>();
        let payloads = ordered
            .iter()
            .map(|resource| {
                let start = offset.next_multiple_of(8);
                offset = start + resource.payload.len();
                start
            })
            .collect::<Vec<_>>();

        let mut bytes = Vec::with_capacity(offset);

        // Level 1: type
        bytes.extend_from_slice(
            ImageResourceDirectory::test_new(0, types.len() as u16).as_bytes(),
        );
        for (resource_type, name_table) in types.iter().zip(&name_tables) {
            bytes.extend_from_slice(
                ImageResourceDirectoryEntry::test_new(
                    resource_type.id(),
                    IMAGE_RESOURCE_DATA_IS_DIRECTORY | *name_table as u32,
                )
                .as_bytes(),
            );
        }

        // Level 2: name or ID
        let mut index = 0;
        for members in &by_type {
            let named = members
                .iter()
                .filter(|resource| matches!(resource.key, Key::Name(_)))
                .count();
            bytes.extend_from_slice(
                ImageResourceDirectory::test_new(named as u16, (members.len() - named) as u16)
                    .as_bytes(),
            );
            for resource in members {
                let key = match resource.key {
                    Key::Id(id) => id,
                    Key::Name(_) => {
                        IMAGE_RESOURCE_NAME_IS_STRING | names[index].unwrap_or_default() as u32
                    }
                };
                let target = resource
                    .language_directory_override
                    .unwrap_or(language_tables[index] as u32);
                bytes.extend_from_slice(
                    ImageResourceDirectoryEntry::test_new(
                        key,
                        IMAGE_RESOURCE_DATA_IS_DIRECTORY | target,
                    )
                    .as_bytes(),
                );
                index += 1;
            }
        }

        // Level 3: language
        for (resource, data_entry) in ordered.iter().zip(&data_entries) {
            let mut target = *data_entry as u32;
            if resource.language_entry_is_directory {
                target |= IMAGE_RESOURCE_DATA_IS_DIRECTORY;
            }
            bytes.extend_from_slice(ImageResourceDirectory::test_new(0, 1).as_bytes());
            bytes.extend_from_slice(
                ImageResourceDirectoryEntry::test_new(LANG_EN_US, target).as_bytes(),
            );
        }

        for (resource, payload) in ordered.iter().zip(&payloads) {
            let data_rva = resource
                .data_rva_override
                .unwrap_or(rva + *payload as u32);
            let size = resource
                .data_size_override
                .unwrap_or(resource.payload.len() as u32);
            bytes.extend_from_slice(ImageResourceDataEntry::test_new(data_rva, size).as_bytes());
        }

        for resource in &ordered {
            if let Key::Name(name) = &resource.key {
                let units = name.encode_utf16().collect::<Vec<_>>();
                bytes.extend_from_slice(&(units.len() as u16).to_le_bytes());
                bytes.extend(units.iter().flat_map(|unit| unit.to_le_bytes()));
            }
        }

        for (resource, &payload) in ordered.iter().zip(&payloads) {
            bytes.resize(payload, 0);
            bytes.extend_from_slice(&resource.payload);
        }

        bytes
    }
}

/// Serializes an `RT_GROUP_ICON` payload.
pub fn group_icon_payload(entries: &[IconDirEntry]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(6 + entries.as_bytes().len());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    payload.extend_from_slice(entries.as_bytes());
    payload
}

/// Serializes a `BITMAPINFOHEADER` icon image, with the height doubled for the AND mask.
pub fn dib(
    width: u32,
    height: u32,
    bit_count: u16,
    palette: &[[u8; 4]],
    pixels: &[u8],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(40 + palette.len() * 4 + pixels.len());
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&(width as i32).to_le_bytes());
    data.extend_from_slice(&(height as i32 * 2).to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&bit_count.to_le_bytes());
    data.extend_from_slice(&[0; 24]);
    data.extend(palette.iter().flatten());
    data.extend_from_slice(pixels);
    data
}

/// A 32-bit icon image filled with one BGRA color.
pub fn bgra_dib(width: u32, height: u32, bgra: [u8; 4]) -> Vec<u8> {
    let pixels = bgra.repeat((width * height) as usize);
    dib(width, height, 32, &[], &pixels)
}

fn put_u16(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
