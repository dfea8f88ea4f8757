use std::fmt;

/// The `Magic` field at the start of the optional header.
///
/// `0x20B` identifies a PE32+ (64-bit) image. Every other value, including the ROM image magic, is
/// read with the PE32 layout.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Magic {
    #[default]
    Pe32,
    Pe32Plus,
}

impl Magic {
    pub const IMAGE_NT_OPTIONAL_HDR32_MAGIC: u16 = 0x10B;
    pub const IMAGE_NT_OPTIONAL_HDR64_MAGIC: u16 = 0x20B;

    /// Offset of `NumberOfRvaAndSizes` from the start of the optional header.
    #[inline]
    pub const fn number_of_rva_and_sizes_offset(self) -> u16 {
        self.data_directories_offset() - size_of::<u32>() as u16
    }

    /// Offset of the first data directory from the start of the optional header.
    #[inline]
    pub const fn data_directories_offset(self) -> u16 {
        match self {
            Self::Pe32 => 96,
            Self::Pe32Plus => 112,
        }
    }
}

impl From<u16> for Magic {
    fn from(magic: u16) -> Self {
        if magic == Self::IMAGE_NT_OPTIONAL_HDR64_MAGIC {
            Self::Pe32Plus
        } else {
            Self::Pe32
        }
    }
}

impl From<Magic> for u16 {
    fn from(magic: Magic) -> Self {
        match magic {
            Magic::Pe32 => Magic::IMAGE_NT_OPTIONAL_HDR32_MAGIC,
            Magic::Pe32Plus => Magic::IMAGE_NT_OPTIONAL_HDR64_MAGIC,
        }
    }
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pe32 => f.write_str("PE32"),
            Self::Pe32Plus => f.write_str("PE32+"),
        }
    }
}
