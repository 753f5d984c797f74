//! QR code rendering for invite links

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcodegen::{QrCode, QrCodeEcc};

use crate::error::{AppError, Result};

/// Pixels per module in the raster output
pub const BOX_SIZE: u32 = 10;
/// Quiet zone around the symbol, in modules
pub const BORDER: u32 = 4;
/// Logical width and height of the vector output
pub const SVG_VIEWPORT: u32 = 200;
pub const DEFAULT_FILL: &str = "#000000";

fn encode(link: &str) -> Result<QrCode> {
    QrCode::encode_text(link, QrCodeEcc::High)
        .map_err(|e| AppError::BadRequest(format!("Cannot encode link as QR code: {}", e)))
}

/// Render `link` as a PNG; identical input always yields identical bytes
pub fn generate_png(link: &str) -> Result<Vec<u8>> {
    let qr = encode(link)?;
    let modules = qr.size() as u32 + 2 * BORDER;
    let side = modules * BOX_SIZE;

    let img = GrayImage::from_fn(side, side, |px, py| {
        let x = (px / BOX_SIZE) as i32 - BORDER as i32;
        let y = (py / BOX_SIZE) as i32 - BORDER as i32;
        // get_module is false outside the symbol, which paints the border white
        if qr.get_module(x, y) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Render `link` as standalone SVG markup scaled to a 200x200 viewport.
///
/// The output has no namespace-prefixed elements and carries the fill colour
/// on the drawing primitives so it can be inlined into an HTML page.
pub fn generate_svg(link: &str, fill: &str) -> Result<String> {
    if !is_valid_fill(fill) {
        return Err(AppError::BadRequest(format!("Invalid fill colour: {}", fill)));
    }

    let qr = encode(link)?;
    let size = qr.size();
    let scale = SVG_VIEWPORT as f64 / (size as f64 + 2.0 * BORDER as f64);
    let unit = format_units(scale);

    let mut path = String::new();
    for y in 0..size {
        for x in 0..size {
            if qr.get_module(x, y) {
                let left = format_units((x as f64 + BORDER as f64) * scale);
                let top = format_units((y as f64 + BORDER as f64) * scale);
                path.push_str(&format!("M{},{}h{}v{}h-{}z", left, top, unit, unit, unit));
            }
        }
    }

    Ok(format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{vp}" height="{vp}" viewBox="0 0 {vp} {vp}" shape-rendering="crispEdges">"#,
            r##"<rect width="{vp}" height="{vp}" fill="#ffffff"/>"##,
            r#"<path fill="{fill}" d="{path}"/>"#,
            "</svg>"
        ),
        vp = SVG_VIEWPORT,
        fill = fill,
        path = path
    ))
}

/// Hex colours and plain colour keywords only; anything else could break out
/// of the attribute
fn is_valid_fill(fill: &str) -> bool {
    if let Some(hex) = fill.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !fill.is_empty() && fill.len() <= 32 && fill.chars().all(|c| c.is_ascii_alphabetic())
}

fn format_units(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
