//! Conversion of stray image formats to JPEG.
//!
//! The output name is the original full filename with `.jpg` appended
//! (`poster.bmp` → `poster.bmp.jpg`). The original is only removed or
//! staged once the JPEG is fully written; on failure it stays in place.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

pub const JPEG_QUALITY: u8 = 85;

/// Where the original file goes after a successful conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OriginalDisposal {
    Delete,
    /// Move into this directory, keeping the original name
    StageIn(PathBuf),
}

/// Name of the JPEG produced for `file_name`.
pub fn jpeg_name(file_name: &str) -> String {
    format!("{}.jpg", file_name)
}

/// Decode, flatten to RGB and write a JPEG next to the original.
/// Returns the new file's base name.
pub fn convert_to_jpeg(path: &Path, disposal: &OriginalDisposal) -> Result<String, ConvertError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ConvertError::FileName(path.to_path_buf()))?;
    let new_name = jpeg_name(file_name);
    let new_path = path.with_file_name(&new_name);

    let decoded = decode(path)?;
    let rgb = flatten_to_rgb(decoded);

    if let Err(e) = write_jpeg(&rgb, &new_path) {
        // Never leave a half-written JPEG behind.
        let _ = fs::remove_file(&new_path);
        return Err(e);
    }

    if let Err(e) = dispose_original(path, file_name, disposal) {
        // The original is still in place, so the JPEG would be a duplicate.
        let _ = fs::remove_file(&new_path);
        return Err(e);
    }
    Ok(new_name)
}

fn decode(path: &Path) -> Result<DynamicImage, ConvertError> {
    let io_err = |source: std::io::Error| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|source| ConvertError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Palette, alpha and high bit depth images all end up as opaque 8-bit RGB.
/// Alpha is dropped, not composited.
fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.into_rgb8(),
    }
}

fn write_jpeg(rgb: &RgbImage, path: &Path) -> Result<(), ConvertError> {
    let io_err = |source: std::io::Error| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode_image(rgb)
        .map_err(|source| ConvertError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(io_err)
}

fn dispose_original(
    path: &Path,
    file_name: &str,
    disposal: &OriginalDisposal,
) -> Result<(), ConvertError> {
    match disposal {
        OriginalDisposal::Delete => fs::remove_file(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }),
        OriginalDisposal::StageIn(dir) => {
            let staging_err = |source: std::io::Error| ConvertError::Staging {
                path: dir.clone(),
                source,
            };
            fs::create_dir_all(dir).map_err(staging_err)?;
            fs::rename(path, dir.join(file_name)).map_err(staging_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{ColorType, ExtendedColorType, ImageFormat, Rgb, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_gif(path: &Path) {
        let img = RgbaImage::from_fn(8, 6, |x, _| {
            if x % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 0])
            }
        });
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        encoder
            .encode(img.as_raw(), 8, 6, ExtendedColorType::Rgba8)
            .unwrap();
    }

    #[test]
    fn test_jpeg_name_appends_suffix() {
        assert_eq!(jpeg_name("m_Matrix.bmp"), "m_Matrix.bmp.jpg");
        assert_eq!(jpeg_name("poster"), "poster.jpg");
    }

    #[test]
    fn test_palette_image_becomes_rgb_jpeg() {
        let dir = tempdir().unwrap();
        // GIF is palette-based; the misleading name forces content sniffing.
        let source = dir.path().join("palette.dat");
        write_gif(&source);

        let new_name = convert_to_jpeg(&source, &OriginalDisposal::Delete).unwrap();
        assert_eq!(new_name, "palette.dat.jpg");
        assert!(!source.exists());

        let output = dir.path().join(&new_name);
        let reader = ImageReader::open(&output)
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
        let decoded = reader.decode().unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn test_bmp_converts_and_deletes_original() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("m_Matrix.bmp");
        RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]))
            .save_with_format(&source, ImageFormat::Bmp)
            .unwrap();

        let new_name = convert_to_jpeg(&source, &OriginalDisposal::Delete).unwrap();
        assert_eq!(new_name, "m_Matrix.bmp.jpg");
        assert!(dir.path().join("m_Matrix.bmp.jpg").exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_corrupt_input_keeps_original() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.tiff");
        fs::write(&source, b"definitely-not-an-image").unwrap();

        let result = convert_to_jpeg(&source, &OriginalDisposal::Delete);
        assert!(matches!(result, Err(ConvertError::Decode { .. })));
        assert!(source.exists());
        assert!(!dir.path().join("broken.tiff.jpg").exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempdir().unwrap();
        let result = convert_to_jpeg(&dir.path().join("gone.bmp"), &OriginalDisposal::Delete);
        assert!(matches!(result, Err(ConvertError::Io { .. })));
    }

    #[test]
    fn test_blocked_staging_folder_rolls_back_jpeg() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join(".originals");
        fs::write(&staging, b"not a folder").unwrap();
        let source = dir.path().join("Heat.bin");
        RgbImage::from_pixel(3, 3, Rgb([9, 9, 9]))
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let result = convert_to_jpeg(&source, &OriginalDisposal::StageIn(staging.clone()));
        match result {
            Err(ConvertError::Staging { path, .. }) => assert_eq!(path, staging),
            other => panic!("expected staging error, got {:?}", other),
        }
        assert!(source.exists());
        assert!(!dir.path().join("Heat.bin.jpg").exists());
    }

    #[test]
    fn test_staging_keeps_original_bytes() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join(".originals");
        let source = dir.path().join("poster.webm");
        RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 128]))
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();
        let original_bytes = fs::read(&source).unwrap();

        let new_name =
            convert_to_jpeg(&source, &OriginalDisposal::StageIn(staging.clone())).unwrap();
        assert_eq!(new_name, "poster.webm.jpg");
        assert!(!source.exists());
        assert_eq!(fs::read(staging.join("poster.webm")).unwrap(), original_bytes);
    }
}
