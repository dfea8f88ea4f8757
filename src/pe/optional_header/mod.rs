mod data_directories;
mod data_directory;
mod magic;

use std::io::{Read, Seek, SeekFrom};

pub use data_directories::DataDirectories;
pub use data_directory::DataDirectory;
pub use magic::Magic;

use crate::{error::IconError, read::ReadBytesExt};
use zerocopy::LE;

/// The parts of `IMAGE_OPTIONAL_HEADER32` / `IMAGE_OPTIONAL_HEADER64` needed to locate the
/// resource table.
///
/// The two layouts only differ in the width of a handful of fields before the data directories,
/// so rather than modelling every field the header is read at fixed, bitness-dependent offsets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionalHeader {
    magic: Magic,
    number_of_rva_and_sizes: u32,
    data_directories: DataDirectories,
}

impl OptionalHeader {
    /// Reads the optional header starting at the reader's current position.
    ///
    /// `size` is the `SizeOfOptionalHeader` from the COFF header. Data directories that would lie
    /// outside of it are not read.
    pub fn read_from<R>(mut reader: R, size: u16) -> Result<Self, IconError>
    where
        R: Read + Seek,
    {
        let start = reader.stream_position()?;

        let magic = Magic::from(reader.read_u16::<LE>()?);

        reader.seek(SeekFrom::Start(
            start + u64::from(magic.number_of_rva_and_sizes_offset()),
        ))?;
        let number_of_rva_and_sizes = reader.read_u32::<LE>()?;

        // The data directories immediately follow NumberOfRvaAndSizes
        let available = usize::from(size)
            .saturating_sub(usize::from(magic.data_directories_offset()))
            / size_of::<DataDirectory>();
        let len = (number_of_rva_and_sizes as usize)
            .min(available)
            .min(DataDirectories::MAX);

        let data_directories = DataDirectories::read_from(&mut reader, len)?;

        Ok(Self {
            magic,
            number_of_rva_and_sizes,
            data_directories,
        })
    }

    #[inline]
    pub const fn magic(&self) -> Magic {
        self.magic
    }

    #[inline]
    pub const fn is_pe32_plus(&self) -> bool {
        matches!(self.magic, Magic::Pe32Plus)
    }

    #[inline]
    pub const fn number_of_rva_and_sizes(&self) -> u32 {
        self.number_of_rva_and_sizes
    }

    #[inline]
    pub const fn data_directories(&self) -> &DataDirectories {
        &self.data_directories
    }
}
