use image::RgbaImage;
use tracing::debug;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LE};

use crate::{error::IconError, read::ByteSliceExt};

/// One palette color, `RGBQUAD`. The fourth byte is padding and is ignored.
#[doc(alias("RGBQUAD"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RgbQuad {
    blue: u8,
    green: u8,
    red: u8,
    reserved: u8,
}

impl RgbQuad {
    #[inline]
    const fn to_rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, u8::MAX]
    }
}

/// The pixel encodings found in icon bitmaps.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    /// `B, G, R, A`
    Bgra32,
    /// `B, G, R` with rows padded to 4 bytes
    Bgr24,
    /// One index per byte into a 256-color palette
    Indexed8,
    /// Two indices per byte into a 16-color palette, high nibble first
    Indexed4,
}

impl PixelFormat {
    pub fn from_bit_count(bit_count: u16) -> Result<Self, IconError> {
        match bit_count {
            32 => Ok(Self::Bgra32),
            24 => Ok(Self::Bgr24),
            8 => Ok(Self::Indexed8),
            4 => Ok(Self::Indexed4),
            _ => Err(IconError::UnsupportedBitDepth(bit_count)),
        }
    }

    #[inline]
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Bgra32 => 32,
            Self::Bgr24 => 24,
            Self::Indexed8 => 8,
            Self::Indexed4 => 4,
        }
    }

    #[inline]
    pub const fn palette_len(self) -> usize {
        match self {
            Self::Bgra32 | Self::Bgr24 => 0,
            Self::Indexed8 => 256,
            Self::Indexed4 => 16,
        }
    }

    /// The number of bytes in one row of `width` pixels, padded to a multiple of 4.
    #[inline]
    pub const fn stride(self, width: usize) -> usize {
        (width * self.bits_per_pixel()).div_ceil(32) * 4
    }

    /// Converts one source row into RGBA, writing at most `output.len() / 4` pixels.
    fn decode_row(self, row: &[u8], palette: &[RgbQuad], output: &mut [u8]) {
        let color = |index: u8| {
            palette
                .get(usize::from(index))
                .map_or([0, 0, 0, u8::MAX], |quad| quad.to_rgba())
        };

        let pixels = output.chunks_exact_mut(4);
        match self {
            Self::Bgra32 => {
                for (pixel, bgra) in pixels.zip(row.chunks_exact(4)) {
                    pixel.copy_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
                }
            }
            Self::Bgr24 => {
                for (pixel, bgr) in pixels.zip(row.chunks_exact(3)) {
                    pixel.copy_from_slice(&[bgr[2], bgr[1], bgr[0], u8::MAX]);
                }
            }
            Self::Indexed8 => {
                for (pixel, &index) in pixels.zip(row) {
                    pixel.copy_from_slice(&color(index));
                }
            }
            Self::Indexed4 => {
                let indices = row.iter().flat_map(|&byte| [byte >> 4, byte & 0x0F]);
                for (pixel, index) in pixels.zip(indices) {
                    pixel.copy_from_slice(&color(index));
                }
            }
        }
    }

    /// Decodes each `(output, row)` pair and returns how many rows were written.
    fn decode_into<'a, 'b>(
        self,
        rows: impl Iterator<Item = (&'a mut [u8], &'b [u8])>,
        palette: &[RgbQuad],
    ) -> u32 {
        rows.fold(0, |decoded, (output, row)| {
            self.decode_row(row, palette, output);
            decoded + 1
        })
    }
}

/// The result of decoding as many rows as the payload holds.
#[derive(Clone, Debug)]
pub struct PartialDecode {
    /// The full-size image. Rows that were not present are transparent black.
    pub image: RgbaImage,
    pub rows_decoded: u32,
}

impl PartialDecode {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.rows_decoded == self.image.height()
    }
}

/// A device-independent bitmap as stored in an `RT_ICON` resource: a `BITMAPINFOHEADER`, an
/// optional palette, the color rows and then the AND mask, which is not used.
///
/// Rows are stored bottom-up unless the header height is negative.
#[derive(Copy, Clone, Debug)]
pub struct Dib<'data> {
    data: &'data [u8],
    header_size: usize,
    width: u32,
    height: u32,
    top_down: bool,
    format: PixelFormat,
}

impl<'data> Dib<'data> {
    /// Bytes of the header that are read: size, width, height, planes and bit count.
    const MIN_HEADER_SIZE: usize = 16;

    /// Icons larger than this are rejected before any allocation.
    pub const MAX_DIMENSION: u32 = 1024;

    /// Parses the bitmap header.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::UnsupportedBitDepth`] for anything but 32, 24, 8 or 4 bits per pixel
    /// and [`IconError::TruncatedPayload`] if the header is short or the dimensions are unusable.
    pub fn parse(data: &'data [u8]) -> Result<Self, IconError> {
        let header_size = data.u32_at::<LE>(0).ok_or(IconError::TruncatedPayload)? as usize;
        let width = data.i32_at::<LE>(4).ok_or(IconError::TruncatedPayload)?;
        let raw_height = data.i32_at::<LE>(8).ok_or(IconError::TruncatedPayload)?;
        let bit_count = data.u16_at::<LE>(14).ok_or(IconError::TruncatedPayload)?;

        let format = PixelFormat::from_bit_count(bit_count)?;

        if !(Self::MIN_HEADER_SIZE..=data.len()).contains(&header_size) {
            return Err(IconError::TruncatedPayload);
        }

        // The stored height covers both the color rows and the AND mask below them
        let height = raw_height.unsigned_abs() / 2;
        let width = u32::try_from(width).unwrap_or_default();
        if !(1..=Self::MAX_DIMENSION).contains(&width)
            || !(1..=Self::MAX_DIMENSION).contains(&height)
        {
            return Err(IconError::TruncatedPayload);
        }

        Ok(Self {
            data,
            header_size,
            width,
            height,
            top_down: raw_height < 0,
            format,
        })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub const fn is_top_down(&self) -> bool {
        self.top_down
    }

    fn palette(&self) -> Result<&'data [RgbQuad], IconError> {
        let bytes = self
            .data
            .get(self.header_size..)
            .ok_or(IconError::TruncatedPayload)?;
        <[RgbQuad]>::ref_from_prefix_with_elems(bytes, self.format.palette_len())
            .map(|(palette, _)| palette)
            .map_err(|_| IconError::TruncatedPayload)
    }

    fn pixel_offset(&self) -> usize {
        self.header_size + self.format.palette_len() * size_of::<RgbQuad>()
    }

    /// Decodes every row that is fully present in the payload.
    ///
    /// A truncated payload yields the rows stored first: the bottom of a bottom-up bitmap or the
    /// top of a top-down one.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::TruncatedPayload`] if the palette is incomplete.
    pub fn decode_rows(&self) -> Result<PartialDecode, IconError> {
        let palette = self.palette()?;
        let pixels = self.data.get(self.pixel_offset()..).unwrap_or_default();

        let width = self.width as usize;
        let stride = self.format.stride(width);
        let mut buffer = vec![0; width * self.height as usize * 4];

        let outputs = buffer.chunks_exact_mut(width * 4);
        let rows = pixels.chunks_exact(stride);
        let rows_decoded = if self.top_down {
            self.format.decode_into(outputs.zip(rows), palette)
        } else {
            self.format.decode_into(outputs.rev().zip(rows), palette)
        };

        let image = RgbaImage::from_raw(self.width, self.height, buffer)
            .ok_or(IconError::TruncatedPayload)?;

        Ok(PartialDecode {
            image,
            rows_decoded,
        })
    }

    /// Decodes the bitmap, failing unless every row is present.
    pub fn decode(&self) -> Result<RgbaImage, IconError> {
        let partial = self.decode_rows()?;
        if partial.is_complete() {
            Ok(partial.image)
        } else {
            debug!(
                rows_decoded = partial.rows_decoded,
                height = self.height,
                "Icon bitmap is truncated"
            );
            Err(IconError::TruncatedPayload)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Dib, PixelFormat};
    use crate::{error::IconError, test_utils::dib};

    #[rstest]
    #[case(PixelFormat::Bgra32, 3, 12)]
    #[case(PixelFormat::Bgr24, 1, 4)]
    #[case(PixelFormat::Bgr24, 2, 8)]
    #[case(PixelFormat::Bgr24, 5, 16)]
    #[case(PixelFormat::Indexed8, 1, 4)]
    #[case(PixelFormat::Indexed8, 5, 8)]
    #[case(PixelFormat::Indexed4, 1, 4)]
    #[case(PixelFormat::Indexed4, 9, 8)]
    fn stride(#[case] format: PixelFormat, #[case] width: usize, #[case] expected: usize) {
        assert_eq!(format.stride(width), expected);
    }

    #[test]
    fn decodes_32_bpp_bottom_up() {
        #[rustfmt::skip]
        let pixels = [
            // Bottom row: blue, green
            0xFF, 0x00, 0x00, 0xFF,   0x00, 0xFF, 0x00, 0x80,
            // Top row: red, white
            0x00, 0x00, 0xFF, 0x40,   0xFF, 0xFF, 0xFF, 0x00,
        ];
        let data = dib(2, 2, 32, &[], &pixels);

        let image = Dib::parse(&data).unwrap().decode().unwrap();

        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0xFF, 0x00, 0x00, 0x40]);
        assert_eq!(image.get_pixel(1, 0).0, [0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(image.get_pixel(0, 1).0, [0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(image.get_pixel(1, 1).0, [0x00, 0xFF, 0x00, 0x80]);
    }

    #[test]
    fn decodes_24_bpp_with_row_padding() {
        #[rustfmt::skip]
        let pixels = [
            // Bottom row, padded from 3 to 4 bytes
            0x01, 0x02, 0x03, 0xEE,
            // Top row
            0x04, 0x05, 0x06, 0xEE,
        ];
        let data = dib(1, 2, 24, &[], &pixels);

        let image = Dib::parse(&data).unwrap().decode().unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [0x06, 0x05, 0x04, 0xFF]);
        assert_eq!(image.get_pixel(0, 1).0, [0x03, 0x02, 0x01, 0xFF]);
    }

    #[test]
    fn decodes_8_bpp_palette_indices() {
        let mut palette = vec![[0; 4]; 256];
        palette[1] = [0x10, 0x20, 0x30, 0x00];
        palette[255] = [0xA0, 0xB0, 0xC0, 0x00];
        #[rustfmt::skip]
        let pixels = [
            1, 255, 0, 0,
            255, 1, 0, 0,
        ];
        let data = dib(2, 2, 8, &palette, &pixels);

        let image = Dib::parse(&data).unwrap().decode().unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [0xC0, 0xB0, 0xA0, 0xFF]);
        assert_eq!(image.get_pixel(1, 0).0, [0x30, 0x20, 0x10, 0xFF]);
        assert_eq!(image.get_pixel(0, 1).0, [0x30, 0x20, 0x10, 0xFF]);
        assert_eq!(image.get_pixel(1, 1).0, [0xC0, 0xB0, 0xA0, 0xFF]);
    }

    #[test]
    fn decodes_4_bpp_odd_width() {
        let mut palette = vec![[0; 4]; 16];
        palette[0x1] = [0x11, 0x11, 0x11, 0];
        palette[0x2] = [0x22, 0x22, 0x22, 0];
        palette[0x3] = [0x33, 0x33, 0x33, 0];
        palette[0xF] = [0xFF, 0x00, 0x00, 0];
        // Three pixels per row: the low nibble of the second byte is unused
        #[rustfmt::skip]
        let pixels = [
            0x12, 0x3F, 0, 0,
            0x21, 0x3F, 0, 0,
        ];
        let data = dib(3, 2, 4, &palette, &pixels);

        let image = Dib::parse(&data).unwrap().decode().unwrap();

        assert_eq!(image.dimensions(), (3, 2));
        let top = (0..3)
            .map(|x| image.get_pixel(x, 0).0[0])
            .collect::<Vec<_>>();
        let bottom = (0..3)
            .map(|x| image.get_pixel(x, 1).0[0])
            .collect::<Vec<_>>();
        assert_eq!(top, [0x22, 0x11, 0x33]);
        assert_eq!(bottom, [0x11, 0x22, 0x33]);
    }

    #[test]
    fn truncated_payload_keeps_complete_rows() {
        #[rustfmt::skip]
        let pixels = [
            // Bottom row
            0x01, 0x02, 0x03, 0xFF,
            // Middle row
            0x04, 0x05, 0x06, 0xFF,
            // Top row, cut short
            0x07, 0x08,
        ];
        let data = dib(1, 3, 32, &[], &pixels);
        let dib = Dib::parse(&data).unwrap();

        let partial = dib.decode_rows().unwrap();
        assert_eq!(partial.rows_decoded, 2);
        assert!(!partial.is_complete());
        assert_eq!(partial.image.get_pixel(0, 2).0, [0x03, 0x02, 0x01, 0xFF]);
        assert_eq!(partial.image.get_pixel(0, 1).0, [0x06, 0x05, 0x04, 0xFF]);
        assert_eq!(partial.image.get_pixel(0, 0).0, [0, 0, 0, 0]);

        assert!(matches!(dib.decode(), Err(IconError::TruncatedPayload)));
    }

    #[test]
    fn truncated_palette_fails() {
        let data = dib(1, 1, 8, &vec![[0; 4]; 100], &[]);
        assert!(matches!(
            Dib::parse(&data).unwrap().decode_rows(),
            Err(IconError::TruncatedPayload)
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(16)]
    #[case(0)]
    fn unsupported_bit_depth(#[case] bit_count: u16) {
        let data = dib(1, 1, bit_count, &[], &[0; 4]);
        assert!(matches!(
            Dib::parse(&data),
            Err(IconError::UnsupportedBitDepth(depth)) if depth == bit_count
        ));
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            Dib::parse(&[40, 0, 0, 0, 1, 0]),
            Err(IconError::TruncatedPayload)
        ));
    }

    #[rstest]
    #[case::zero_width(0, 2)]
    #[case::negative_width(-1, 2)]
    #[case::single_row_height(1, 1)]
    #[case::oversized(4096, 2)]
    fn rejects_unusable_dimensions(#[case] width: i32, #[case] raw_height: i32) {
        let mut data = dib(1, 1, 32, &[], &[0; 4]);
        data[4..8].copy_from_slice(&width.to_le_bytes());
        data[8..12].copy_from_slice(&raw_height.to_le_bytes());

        assert!(matches!(
            Dib::parse(&data),
            Err(IconError::TruncatedPayload)
        ));
    }

    #[test]
    fn negative_height_is_top_down() {
        #[rustfmt::skip]
        let pixels = [
            // Top row: red
            0x00, 0x00, 0xFF, 0xFF,
            // Bottom row: blue
            0xFF, 0x00, 0x00, 0xFF,
        ];
        let mut data = dib(1, 2, 32, &[], &pixels);
        data[8..12].copy_from_slice(&(-4i32).to_le_bytes());

        let dib = Dib::parse(&data).unwrap();
        assert!(dib.is_top_down());
        assert_eq!(dib.height(), 2);

        let image = dib.decode().unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0xFF, 0x00, 0x00, 0xFF]);
        assert_eq!(image.get_pixel(0, 1).0, [0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn truncated_top_down_keeps_top_rows() {
        let mut data = dib(1, 2, 32, &[], &[0x01, 0x02, 0x03, 0xFF, 0x04]);
        data[8..12].copy_from_slice(&(-4i32).to_le_bytes());

        let partial = Dib::parse(&data).unwrap().decode_rows().unwrap();
        assert_eq!(partial.rows_decoded, 1);
        assert_eq!(partial.image.get_pixel(0, 0).0, [0x03, 0x02, 0x01, 0xFF]);
        assert_eq!(partial.image.get_pixel(0, 1).0, [0, 0, 0, 0]);
    }
}
