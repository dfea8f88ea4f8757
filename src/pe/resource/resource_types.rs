use strum::{Display, FromRepr};

/// The predefined `RT_*` resource types, keyed by their integer ID in the type directory.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, Hash, FromRepr)]
#[repr(u32)]
pub enum ResourceType {
    Cursor = 1,
    Bitmap = 2,
    Icon = 3,
    Menu = 4,
    Dialog = 5,
    String = 6,
    FontDirectory = 7,
    Font = 8,
    Accelerator = 9,
    RCData = 10,
    MessageTable = 11,
    GroupCursor = 12,
    GroupIcon = 14,
    Version = 16,
    DialogInclude = 17,
    PlugPlay = 19,
    Vxd = 20,
    AnimatedCursor = 21,
    AnimatedIcon = 22,
    Html = 23,
    Manifest = 24,
}

impl ResourceType {
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl From<ResourceType> for u32 {
    #[inline]
    fn from(resource_type: ResourceType) -> Self {
        resource_type.id()
    }
}
