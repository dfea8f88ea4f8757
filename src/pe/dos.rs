use std::io;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, U32};

use crate::read::ReadBytesExt;

/// "MZ", the initials of Mark Zbikowski.
pub const DOS_SIGNATURE: [u8; 2] = *b"MZ";

/// In `winnt.h`, it's `IMAGE_DOS_HEADER`.
///
/// Only two fields still matter on Windows: the signature (`e_magic`) and the offset of the PE
/// header (`e_lfanew`). Everything in between belongs to the MS-DOS loader and is kept opaque.
#[doc(alias("IMAGE_DOS_HEADER"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct DosHeader {
    #[doc(alias("e_magic"))]
    signature: [u8; 2],

    /// `e_cblp` through `e_res2`.
    legacy_fields: [U16<LittleEndian>; 29],

    #[doc(alias("e_lfanew"))]
    pe_pointer: U32<LittleEndian>,
}

impl DosHeader {
    pub const SIZE: usize = size_of::<Self>();

    /// Reads the 64-byte DOS header. Nothing past the header is consumed.
    pub fn read_from<R>(mut reader: R) -> io::Result<Self>
    where
        R: io::Read,
    {
        reader.read_t::<Self>()
    }

    #[inline]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == DOS_SIGNATURE
    }

    /// The file offset of the PE signature, `e_lfanew`.
    #[inline]
    pub const fn pe_pointer(&self) -> u32 {
        self.pe_pointer.get()
    }
}
