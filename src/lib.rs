//! Extracts the best icon embedded in a Windows PE executable as an RGBA bitmap.
//!
//! ```no_run
//! if let Some(icon) = exe_icon::extract_icon("setup.exe") {
//!     println!("{}x{}", icon.width(), icon.height());
//! }
//! ```

pub mod error;
pub mod icon;
pub mod pe;
mod read;
#[cfg(test)]
mod test_utils;

use std::{fs::File, io::BufReader, path::Path};

pub use error::IconError;
pub use icon::IconExtractor;
pub use image::RgbaImage;
use tracing::debug;

/// Extracts and decodes the best icon of the executable at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not a PE image, has no resource directory, or
/// has no icon group whose selected icon decodes.
pub fn try_extract_icon<P: AsRef<Path>>(path: P) -> Result<RgbaImage, IconError> {
    let file = File::open(path.as_ref())?;
    IconExtractor::new(BufReader::new(file))?.extract()
}

/// Extracts and decodes the best icon of the executable at `path`, or `None` if it has none.
pub fn extract_icon<P: AsRef<Path>>(path: P) -> Option<RgbaImage> {
    let path = path.as_ref();
    try_extract_icon(path)
        .inspect_err(|error| debug!(path = %path.display(), %error, "No icon extracted"))
        .ok()
}
