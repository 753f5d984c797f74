use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::{ResizeTarget, UploadFile};

const JPEG_QUALITY: u8 = 85;

/// Shrink a raster image into `target` before it is stored.
///
/// Non-images and images exactly matching the target pass through untouched.
/// Images are never upscaled. Alpha-bearing PNGs stay PNG, everything else is
/// re-encoded as JPEG. Any decode/encode failure keeps the original content.
pub fn prepare_upload(file: UploadFile, target: Option<ResizeTarget>) -> UploadFile {
    let Some(target) = target else {
        return file;
    };

    let Ok(format) = image::guess_format(&file.bytes) else {
        return file;
    };

    match resize_image(&file.bytes, format, target) {
        Ok(Some((bytes, output))) => {
            let (extension, content_type) = match output {
                ImageFormat::Png => ("png", "image/png"),
                _ => ("jpg", "image/jpeg"),
            };
            UploadFile {
                filename: replace_extension(&file.filename, extension),
                content_type: Some(content_type.to_string()),
                bytes,
            }
        }
        Ok(None) => file,
        Err(e) => {
            tracing::warn!("Failed to resize image {}: {}", file.filename, e);
            file
        }
    }
}

/// Run [`prepare_upload`] on the blocking pool
pub async fn prepare_upload_blocking(file: UploadFile, target: Option<ResizeTarget>) -> UploadFile {
    if target.is_none() {
        return file;
    }

    let fallback = file.clone();
    match tokio::task::spawn_blocking(move || prepare_upload(file, target)).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!("Image preparation task failed for {}: {}", fallback.filename, e);
            fallback
        }
    }
}

fn resize_image(
    bytes: &[u8],
    format: ImageFormat,
    target: ResizeTarget,
) -> image::ImageResult<Option<(Vec<u8>, ImageFormat)>> {
    let img = image::load_from_memory_with_format(bytes, format)?;

    if img.width() == target.width && img.height() == target.height {
        return Ok(None);
    }

    let has_alpha = img.color().has_alpha();

    let img = if img.width() > target.width || img.height() > target.height {
        img.resize(target.width, target.height, FilterType::Lanczos3)
    } else {
        img
    };

    let mut buf = Vec::new();
    if has_alpha && format == ImageFormat::Png {
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(Some((buf, ImageFormat::Png)))
    } else {
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;
        Ok(Some((buf, ImageFormat::Jpeg)))
    }
}

fn replace_extension(filename: &str, extension: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    format!("{}.{}", stem, extension)
}
