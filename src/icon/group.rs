use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, U32};

use crate::error::IconError;

/// The header of an `RT_GROUP_ICON` resource, `GRPICONDIR` without its trailing entries.
#[doc(alias("GRPICONDIR"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GroupIconDir {
    reserved: U16<LittleEndian>,
    resource_type: U16<LittleEndian>,
    count: U16<LittleEndian>,
}

impl GroupIconDir {
    /// `resource_type` of an icon group. Cursor groups use 2.
    pub const ICON: u16 = 1;

    #[inline]
    pub const fn resource_type(&self) -> u16 {
        self.resource_type.get()
    }

    #[inline]
    pub const fn count(&self) -> u16 {
        self.count.get()
    }
}

/// One candidate image in an icon group, `GRPICONDIRENTRY`.
#[doc(alias("GRPICONDIRENTRY"))]
#[derive(Copy, Clone, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct IconDirEntry {
    width: u8,
    height: u8,
    color_count: u8,
    reserved: u8,
    planes: U16<LittleEndian>,
    bit_count: U16<LittleEndian>,
    bytes_in_res: U32<LittleEndian>,
    id: U16<LittleEndian>,
}

impl IconDirEntry {
    /// The width in pixels. A stored width of 0 means 256.
    #[inline]
    pub const fn width(&self) -> u16 {
        decode_dimension(self.width)
    }

    /// The height in pixels. A stored height of 0 means 256.
    #[inline]
    pub const fn height(&self) -> u16 {
        decode_dimension(self.height)
    }

    #[inline]
    pub const fn raw_width(&self) -> u8 {
        self.width
    }

    #[inline]
    pub const fn raw_height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub const fn color_count(&self) -> u8 {
        self.color_count
    }

    #[inline]
    pub const fn reserved(&self) -> u8 {
        self.reserved
    }

    #[inline]
    pub const fn planes(&self) -> u16 {
        self.planes.get()
    }

    #[inline]
    pub const fn bit_count(&self) -> u16 {
        self.bit_count.get()
    }

    #[inline]
    pub const fn bytes_in_res(&self) -> u32 {
        self.bytes_in_res.get()
    }

    /// The ID of the `RT_ICON` resource holding this image.
    #[inline]
    pub const fn icon_id(&self) -> u16 {
        self.id.get()
    }
}

const fn decode_dimension(dimension: u8) -> u16 {
    if dimension == 0 { 256 } else { dimension as u16 }
}

impl fmt::Debug for IconDirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IconDirEntry")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("color_count", &self.color_count())
            .field("planes", &self.planes())
            .field("bit_count", &self.bit_count())
            .field("bytes_in_res", &self.bytes_in_res())
            .field("icon_id", &self.icon_id())
            .finish()
    }
}

/// A parsed `RT_GROUP_ICON` resource.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IconGroup {
    entries: Vec<IconDirEntry>,
}

impl IconGroup {
    /// Parses an icon group payload.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::MalformedIconGroup`] if the header is short, the group is not an icon
    /// group, or the payload cannot hold every entry the header declares.
    pub fn parse(payload: &[u8]) -> Result<Self, IconError> {
        let (header, rest) =
            GroupIconDir::read_from_prefix(payload).map_err(|_| IconError::MalformedIconGroup)?;

        if header.resource_type() != GroupIconDir::ICON {
            return Err(IconError::MalformedIconGroup);
        }

        let entries = <[IconDirEntry]>::ref_from_prefix_with_elems(rest, header.count().into())
            .map(|(entries, _)| entries.to_vec())
            .map_err(|_| IconError::MalformedIconGroup)?;

        Ok(Self { entries })
    }

    #[inline]
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks the widest image, breaking ties by the highest bit depth. Among identical candidates
    /// the first one wins.
    pub fn best(&self) -> Option<&IconDirEntry> {
        self.entries.iter().reduce(|best, entry| {
            if (entry.width(), entry.bit_count()) > (best.width(), best.bit_count()) {
                entry
            } else {
                best
            }
        })
    }
}

#[cfg(test)]
impl IconDirEntry {
    pub(crate) fn test_new(
        width: u8,
        height: u8,
        bit_count: u16,
        bytes_in_res: u32,
        id: u16,
    ) -> Self {
        Self {
            width,
            height,
            color_count: 0,
            reserved: 0,
            planes: U16::new(1),
            bit_count: U16::new(bit_count),
            bytes_in_res: U32::new(bytes_in_res),
            id: U16::new(id),
        }
    }
}
