mod data_entry;
mod directory_entry;
mod directory_header;

pub use data_entry::ImageResourceDataEntry;
pub use directory_entry::{
    IMAGE_RESOURCE_DATA_IS_DIRECTORY, IMAGE_RESOURCE_NAME_IS_STRING, ImageResourceDirectoryEntry,
};
pub use directory_header::ImageResourceDirectory;
