use anyhow::Context;
use image::{DynamicImage, ImageBuffer};

use crate::{
    data_structures::scene_graph::{Image, SamplerDesc, Texture, WrapMode},
    error::SceneError,
};

fn channels_and_bits(format: gltf::image::Format) -> (u8, u8) {
    use gltf::image::Format;
    match format {
        Format::R8 => (1, 8),
        Format::R8G8 => (2, 8),
        Format::R8G8B8 => (3, 8),
        Format::R8G8B8A8 => (4, 8),
        Format::R16 => (1, 16),
        Format::R16G16 => (2, 16),
        Format::R16G16B16 => (3, 16),
        Format::R16G16B16A16 => (4, 16),
        Format::R32G32B32FLOAT => (3, 32),
        Format::R32G32B32A32FLOAT => (4, 32),
    }
}

pub fn load_images(images: Vec<gltf::image::Data>) -> Vec<Image> {
    images
        .into_iter()
        .map(|data| {
            let (channels, bits) = channels_and_bits(data.format);
            Image {
                width: data.width,
                height: data.height,
                channels,
                bits,
                pixels: data.pixels,
            }
        })
        .collect()
}

fn wrap_mode(mode: gltf::texture::WrappingMode) -> WrapMode {
    match mode {
        gltf::texture::WrappingMode::ClampToEdge => WrapMode::ClampToEdge,
        gltf::texture::WrappingMode::MirroredRepeat => WrapMode::MirroredRepeat,
        gltf::texture::WrappingMode::Repeat => WrapMode::Repeat,
    }
}

pub fn load_textures(document: &gltf::Document) -> Vec<Texture> {
    document
        .textures()
        .map(|texture| {
            let sampler = texture.sampler();
            Texture {
                image: texture.source().index(),
                sampler: SamplerDesc {
                    wrap_s: wrap_mode(sampler.wrap_s()),
                    wrap_t: wrap_mode(sampler.wrap_t()),
                },
            }
        })
        .collect()
}

fn from_ne_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect()
}

fn from_ne_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Expands any supported channel layout and bit depth to tightly packed RGBA8.
///
/// One- and two-channel images become grey (with alpha), 16-bit and float
/// images are scaled down to 8 bits.
pub fn to_rgba8(index: usize, image: &Image) -> anyhow::Result<Vec<u8>> {
    let (w, h) = (image.width, image.height);
    let short = || format!("image {index} has fewer pixels than {w}x{h}");
    let dynamic = match (image.channels, image.bits) {
        (1, 8) => DynamicImage::ImageLuma8(
            ImageBuffer::from_raw(w, h, image.pixels.clone()).with_context(short)?,
        ),
        (2, 8) => DynamicImage::ImageLumaA8(
            ImageBuffer::from_raw(w, h, image.pixels.clone()).with_context(short)?,
        ),
        (3, 8) => DynamicImage::ImageRgb8(
            ImageBuffer::from_raw(w, h, image.pixels.clone()).with_context(short)?,
        ),
        (4, 8) => DynamicImage::ImageRgba8(
            ImageBuffer::from_raw(w, h, image.pixels.clone()).with_context(short)?,
        ),
        (1, 16) => DynamicImage::ImageLuma16(
            ImageBuffer::from_raw(w, h, from_ne_u16(&image.pixels)).with_context(short)?,
        ),
        (2, 16) => DynamicImage::ImageLumaA16(
            ImageBuffer::from_raw(w, h, from_ne_u16(&image.pixels)).with_context(short)?,
        ),
        (3, 16) => DynamicImage::ImageRgb16(
            ImageBuffer::from_raw(w, h, from_ne_u16(&image.pixels)).with_context(short)?,
        ),
        (4, 16) => DynamicImage::ImageRgba16(
            ImageBuffer::from_raw(w, h, from_ne_u16(&image.pixels)).with_context(short)?,
        ),
        (3, 32) => DynamicImage::ImageRgb32F(
            ImageBuffer::from_raw(w, h, from_ne_f32(&image.pixels)).with_context(short)?,
        ),
        (4, 32) => DynamicImage::ImageRgba32F(
            ImageBuffer::from_raw(w, h, from_ne_f32(&image.pixels)).with_context(short)?,
        ),
        (channels, bits) => {
            return Err(SceneError::UnsupportedImage {
                image: index,
                channels,
                bits,
            }
            .into());
        }
    };
    Ok(dynamic.to_rgba8().into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(channels: u8, bits: u8, pixels: Vec<u8>) -> Image {
        Image {
            width: 1,
            height: 1,
            channels,
            bits,
            pixels,
        }
    }

    #[test]
    fn rgb8_gains_opaque_alpha() {
        let rgba = to_rgba8(0, &image(3, 8, vec![10, 20, 30])).unwrap();
        assert_eq!(rgba, vec![10, 20, 30, 255]);
    }

    #[test]
    fn rgba8_passes_through() {
        let rgba = to_rgba8(0, &image(4, 8, vec![1, 2, 3, 4])).unwrap();
        assert_eq!(rgba, vec![1, 2, 3, 4]);
    }

    #[test]
    fn luma_expands_to_grey() {
        let rgba = to_rgba8(0, &image(1, 8, vec![77])).unwrap();
        assert_eq!(rgba, vec![77, 77, 77, 255]);
    }

    #[test]
    fn sixteen_bit_is_scaled_down() {
        let mut pixels = Vec::new();
        for value in [u16::MAX, 0, u16::MAX, u16::MAX] {
            pixels.extend_from_slice(&value.to_ne_bytes());
        }
        let rgba = to_rgba8(0, &image(4, 16, pixels)).unwrap();
        assert_eq!(rgba, vec![255, 0, 255, 255]);
    }

    #[test]
    fn short_pixel_buffer_is_an_error() {
        assert!(to_rgba8(3, &image(4, 8, vec![1, 2])).is_err());
    }

    #[test]
    fn unsupported_layout_is_reported() {
        let err = to_rgba8(2, &image(5, 8, vec![0; 5])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SceneError>(),
            Some(&SceneError::UnsupportedImage {
                image: 2,
                channels: 5,
                bits: 8
            })
        );
    }
}
