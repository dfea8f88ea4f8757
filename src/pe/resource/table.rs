use zerocopy::FromBytes;

use super::{ImageResourceDirectory, ImageResourceDirectoryEntry};

/// A resource directory table borrowed from the resource directory bytes.
#[derive(Copy, Clone, Debug)]
pub struct ResourceDirectoryTable<'data> {
    pub header: ImageResourceDirectory,
    entries: &'data [ImageResourceDirectoryEntry],
}

impl<'data> ResourceDirectoryTable<'data> {
    /// Parses a table from the start of `bytes`.
    ///
    /// Returns `None` if the header or any of the entries it declares would extend past the end of
    /// `bytes`.
    pub fn parse(bytes: &'data [u8]) -> Option<Self> {
        let (header, rest) = ImageResourceDirectory::read_from_prefix(bytes).ok()?;
        let (entries, _) = <[ImageResourceDirectoryEntry]>::ref_from_prefix_with_elems(
            rest,
            header.number_of_entries(),
        )
        .ok()?;

        Some(Self { header, entries })
    }

    /// Entries keyed by a string name. These always come first.
    #[inline]
    pub fn name_entries(&self) -> impl Iterator<Item = &'data ImageResourceDirectoryEntry> {
        self.entries
            .iter()
            .take(self.header.number_of_name_entries().into())
    }

    /// Entries keyed by an integer ID.
    #[inline]
    pub fn id_entries(&self) -> impl Iterator<Item = &'data ImageResourceDirectoryEntry> {
        self.entries
            .iter()
            .skip(self.header.number_of_name_entries().into())
    }

    #[inline]
    pub fn entries(&self) -> impl Iterator<Item = &'data ImageResourceDirectoryEntry> {
        self.entries.iter()
    }

    pub fn find_id_entry(&self, id: u32) -> Option<&'data ImageResourceDirectoryEntry> {
        self.entries()
            .find(|entry| !entry.has_name() && entry.name_or_id() == id)
    }
}
