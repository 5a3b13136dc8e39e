//! Texture module: image decoding and upload.

mod image;
mod sampler;
mod texture2d;

pub use self::image::Image;
pub use sampler::{AddressMode, FilterMode, Sampler, SamplerDescriptor};
pub use texture2d::GpuTexture;

use crate::assets::{AssetSource, TextureAsset};
use crate::core::{GraphicsDevice, TextureHandle};
use thiserror::Error;

/// Errors that can occur while loading a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    /// The asset source has no such file.
    #[error("Asset {0} not found")]
    Missing(&'static str),

    /// The bytes are not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] ::image::ImageError),

    /// Pixel buffer length does not match the dimensions.
    #[error("Pixel buffer of {len} bytes does not fit a {width}x{height} RGBA image")]
    Size {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Buffer length in bytes.
        len: usize,
    },

    /// The device refused the upload.
    #[error("Device rejected the texture upload")]
    Upload,
}

/// Decode `asset` and upload it, returning its handle.
pub fn try_load_texture(
    device: &mut dyn GraphicsDevice,
    assets: &dyn AssetSource,
    asset: TextureAsset,
) -> Result<TextureHandle, TextureError> {
    let bytes = assets.read(asset).ok_or(TextureError::Missing(asset.file_name()))?;
    let image = Image::decode(&bytes)?;
    let texture = device.upload_texture(&image);
    if !texture.is_valid() {
        return Err(TextureError::Upload);
    }
    log::debug!(
        "Loaded {} ({}x{}) as texture {texture}",
        asset.file_name(),
        image.width(),
        image.height()
    );
    Ok(texture)
}

/// Decode `asset` and upload it. Failures are logged and yield
/// [`TextureHandle::NONE`], which draws as plain white.
pub fn load_texture(device: &mut dyn GraphicsDevice, assets: &dyn AssetSource, asset: TextureAsset) -> TextureHandle {
    match try_load_texture(device, assets, asset) {
        Ok(texture) => texture,
        Err(err) => {
            log::error!("Failed to load texture {}: {err}", asset.file_name());
            TextureHandle::NONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssets, NoAssets};
    use crate::core::HeadlessDevice;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        ::image::RgbaImage::from_pixel(width, height, ::image::Rgba([200, 100, 50, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ::image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_uploads_decoded_image() {
        let mut device = HeadlessDevice::new();
        let mut assets = MemoryAssets::new();
        assets.insert(TextureAsset::Earth, png(4, 2));

        let texture = load_texture(&mut device, &assets, TextureAsset::Earth);
        assert!(texture.is_valid());
        assert_eq!(device.texture_size(texture), Some((4, 2)));
    }

    #[test]
    fn test_missing_asset_yields_none() {
        let mut device = HeadlessDevice::new();
        assert_eq!(load_texture(&mut device, &NoAssets, TextureAsset::Sun), TextureHandle::NONE);
        assert!(matches!(
            try_load_texture(&mut device, &NoAssets, TextureAsset::Sun),
            Err(TextureError::Missing("sun.png"))
        ));
        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn test_corrupt_asset_yields_none() {
        let mut device = HeadlessDevice::new();
        let mut assets = MemoryAssets::new();
        assets.insert(TextureAsset::Moon, b"\x89PNG broken".to_vec());
        assert_eq!(load_texture(&mut device, &assets, TextureAsset::Moon), TextureHandle::NONE);
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let mut device = HeadlessDevice::new();
        let mut assets = MemoryAssets::new();
        assets.insert(TextureAsset::Galaxy, png(crate::core::MAX_TEXTURE_SIZE + 1, 1));
        assert!(matches!(
            try_load_texture(&mut device, &assets, TextureAsset::Galaxy),
            Err(TextureError::Upload)
        ));
    }
}
