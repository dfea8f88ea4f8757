mod container;
mod dib;
mod group;

use std::io::{Read, Seek, SeekFrom};

pub use container::{IconContainer, IconFileEntry, IconFileHeader};
pub use dib::{Dib, PartialDecode, PixelFormat, RgbQuad};
pub use group::{GroupIconDir, IconDirEntry, IconGroup};
use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::{
    error::IconError,
    pe::{
        PeHeaders, PeInfo,
        resource::{ResourceDirectory, ResourceEntry, ResourceType},
    },
};

/// The first four bytes of every PNG stream.
pub const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

/// Decodes one `RT_ICON` payload described by `entry`.
///
/// The payload is wrapped in a single-image `.ico` container first. Its image data is either a
/// complete PNG stream or a DIB.
///
/// # Errors
///
/// Returns an error if the image is neither a decodable PNG nor a complete DIB of a supported bit
/// depth.
pub fn decode(entry: &IconDirEntry, payload: &[u8]) -> Result<RgbaImage, IconError> {
    let container = IconContainer::new(entry, payload);
    let data = container.image();

    if data.starts_with(&PNG_SIGNATURE) {
        debug!(len = data.len(), "Decoding PNG icon");
        let image = image::load_from_memory_with_format(data, ImageFormat::Png)?;
        return Ok(image.into_rgba8());
    }

    let dib = Dib::parse(data)?;
    debug!(
        width = dib.width(),
        height = dib.height(),
        format = ?dib.format(),
        "Decoding bitmap icon"
    );
    dib.decode()
}

/// An icon group together with the resource it was read from.
#[derive(Clone, Debug)]
pub struct GroupResource {
    pub resource: ResourceEntry,
    pub name: Option<String>,
    pub group: IconGroup,
}

/// Runs the extraction pipeline over a seekable PE image.
///
/// Each stage consumes the validated output of the previous one: the headers locate the resource
/// directory, the directory yields icon groups and icons, and the best image of the first usable
/// group is decoded.
pub struct IconExtractor<R> {
    reader: R,
    pe_info: PeInfo,
    resources: ResourceDirectory,
}

impl<R: Read + Seek> IconExtractor<R> {
    /// Validates the PE headers and loads the resource directory.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::NotPe`] or [`IconError::NoResourceTable`] if the image has no usable
    /// resource directory.
    pub fn new(mut reader: R) -> Result<Self, IconError> {
        let headers = PeHeaders::read_from(&mut reader)?;
        let file_len = reader.seek(SeekFrom::End(0))?;
        let pe_info = headers.into_info(file_len)?;
        let resources = ResourceDirectory::read_from(&mut reader, &pe_info)?;

        Ok(Self {
            reader,
            pe_info,
            resources,
        })
    }

    #[inline]
    pub const fn pe_info(&self) -> &PeInfo {
        &self.pe_info
    }

    #[inline]
    pub fn resources(&self, resource_type: ResourceType) -> Vec<ResourceEntry> {
        self.resources
            .entries(resource_type, self.pe_info.section_table())
    }

    /// Reads and parses every icon group, skipping malformed ones.
    pub fn icon_groups(&mut self) -> Vec<GroupResource> {
        let mut groups = Vec::new();

        for resource in self.resources(ResourceType::GroupIcon) {
            let parsed = resource
                .read(&mut self.reader)
                .and_then(|payload| IconGroup::parse(&payload));

            match parsed {
                Ok(group) => groups.push(GroupResource {
                    name: self.resources.name(resource.id),
                    resource,
                    group,
                }),
                Err(error) => warn!(id = resource.id, %error, "Skipping icon group"),
            }
        }

        groups
    }

    /// Extracts the best icon of the first group that yields one.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::ResourceNotFound`] if no group has a decodable icon. If a group's
    /// selected icon exists but fails to decode, and no later group succeeds, that decode error is
    /// returned instead.
    pub fn extract(mut self) -> Result<RgbaImage, IconError> {
        let groups = self.icon_groups();
        let icons = self.resources(ResourceType::Icon);

        debug!(
            groups = groups.len(),
            icons = icons.len(),
            "Collected icon resources"
        );

        let mut last_error = IconError::ResourceNotFound;

        for GroupResource {
            resource: group_resource,
            group,
            ..
        } in groups
        {
            let Some(best) = group.best() else {
                debug!(id = group_resource.id, "Icon group is empty");
                continue;
            };

            let Some(icon) = icons
                .iter()
                .find(|icon| icon.id == u32::from(best.icon_id()))
            else {
                warn!(
                    group = group_resource.id,
                    icon = best.icon_id(),
                    "Selected icon is missing"
                );
                continue;
            };

            debug!(group = group_resource.id, selected = ?best, "Selected icon");

            match icon
                .read(&mut self.reader)
                .and_then(|payload| decode(best, &payload))
            {
                Ok(image) => return Ok(image),
                Err(error) => {
                    warn!(
                        group = group_resource.id,
                        icon = icon.id,
                        %error,
                        "Failed to decode icon"
                    );
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }
}
