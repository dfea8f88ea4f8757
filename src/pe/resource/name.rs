use zerocopy::{FromBytes, LE, U16};

use crate::{pe::ResourceOffset, read::ByteSliceExt};

/// A resource name: a length-prefixed UTF-16LE string stored inside the resource directory.
#[derive(Debug, Clone, Copy)]
pub struct ResourceName {
    offset: ResourceOffset,
}

impl ResourceName {
    #[inline]
    pub const fn new(offset: ResourceOffset) -> Self {
        Self { offset }
    }

    /// Decodes the name from the resource directory bytes, or `None` if it runs out of bounds.
    pub fn to_string_lossy(self, directory: &[u8]) -> Option<String> {
        let offset = self.offset.as_usize();
        let length = directory.u16_at::<LE>(offset)?;
        let units = directory.get(offset + size_of::<u16>()..)?;
        let (units, _) = <[U16<LE>]>::ref_from_prefix_with_elems(units, length.into())
            .ok()?;

        Some(
            char::decode_utf16(units.iter().map(|unit| unit.get()))
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
        )
    }
}
