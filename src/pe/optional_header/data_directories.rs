use std::io;

use zerocopy::{FromZeros, IntoBytes};

use super::DataDirectory;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct DataDirectories(Vec<DataDirectory>);

impl DataDirectories {
    /// `IMAGE_NUMBEROF_DIRECTORY_ENTRIES`
    pub const MAX: usize = 16;

    const RESOURCE_TABLE_INDEX: usize = 2;

    pub fn read_from<R>(mut src: R, len: usize) -> io::Result<Self>
    where
        R: io::Read,
    {
        let mut data_directories = vec![DataDirectory::new_zeroed(); len];

        for data_directory in &mut data_directories {
            src.read_exact(data_directory.as_mut_bytes())?;
        }

        Ok(Self(data_directories))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn resource_table(&self) -> Option<&DataDirectory> {
        self.0.get(Self::RESOURCE_TABLE_INDEX)
    }
}
