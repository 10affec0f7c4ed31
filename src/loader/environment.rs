use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};

use crate::scene::EnvironmentTexture;

/// Decode an HDR or PNG panorama into float RGBA texels
pub fn load_environment_file(path: impl AsRef<Path>) -> Result<EnvironmentTexture> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()?;
    let image = reader.decode().context("unsupported environment image")?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(to_texture(name, &image))
}

fn to_texture(name: String, image: &DynamicImage) -> EnvironmentTexture {
    let rgba = image.to_rgba32f();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|pixel| pixel.0).collect();
    EnvironmentTexture {
        name,
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn png_panorama_becomes_linear_texels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sky.png");
        RgbImage::from_pixel(4, 2, Rgb([255, 0, 0])).save(&path).unwrap();

        let texture = load_environment_file(&path).unwrap();
        assert_eq!(texture.name, "sky");
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.pixels.len(), 8);
        assert_eq!(texture.pixels[0], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_file_fails() {
        assert!(load_environment_file("/definitely/not/here.hdr").is_err());
    }
}
