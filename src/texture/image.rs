//! Decoded RGBA8 images.

use super::TextureError;

/// A decoded image: tightly packed RGBA8 rows, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Wrap raw RGBA8 pixels, checking the buffer length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TextureError> {
        let image = Self {
            width,
            height,
            pixels,
        };
        if image.is_well_formed() {
            Ok(image)
        } else {
            Err(TextureError::Size {
                width,
                height,
                len: image.pixels.len(),
            })
        }
    }

    /// An image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode PNG or JPEG bytes into RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self, TextureError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw())
    }

    /// Image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the size is nonzero and matches the pixel buffer.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(image: &image::RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let mut source = image::RgbaImage::new(3, 2);
        source.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));
        let decoded = Image::decode(&encode_png(&source)).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        let last = &decoded.pixels()[decoded.pixels().len() - 4..];
        assert_eq!(last, &[10, 20, 30, 40]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(Image::decode(b"not an image"), Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_size_is_checked() {
        assert!(Image::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Image::new(2, 2, vec![0; 15]),
            Err(TextureError::Size { len: 15, .. })
        ));
        assert!(!Image::solid(0, 4, [0; 4]).is_well_formed());
    }
}
