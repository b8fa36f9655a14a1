use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::{Bitmap, SurfaceSize};
use crate::foundation::error::{StackpaneError, StackpaneResult};
use crate::registry::layers::Layer;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One rendered composite in row-major premultiplied RGBA8.
pub struct CompositeFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

impl CompositeFrame {
    /// Encode as PNG with straight alpha, suitable for embedding.
    pub fn encode_png(&self) -> StackpaneResult<Vec<u8>> {
        let mut straight = self.rgba8_premul.clone();
        unpremultiply_rgba8_in_place(&mut straight);

        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| StackpaneError::render("frame bytes do not match dimensions"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .context("encode composite png")?;
        Ok(out)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Outcome of one composite pass.
pub enum Composite {
    /// No layer is both visible and loaded; the caller should show its
    /// fallback placeholder.
    Placeholder,
    /// The stack rendered into a frame.
    Frame(CompositeFrame),
}

/// Draw every visible, loaded layer bottom-up, then the highlight variant on
/// top of the stack so the hovered part stays visible beneath higher layers.
///
/// Each bitmap is stretched to the full surface without preserving aspect
/// ratio; part images in one product set share a canvas and rely on this.
pub fn compose(
    surface: SurfaceSize,
    layers: &[&Layer],
    highlight: Option<&Bitmap>,
) -> StackpaneResult<Composite> {
    if surface.width == 0 || surface.height == 0 {
        return Err(StackpaneError::render("surface has zero dimension"));
    }

    let composable: Vec<&Layer> = layers
        .iter()
        .copied()
        .filter(|layer| layer.is_composable())
        .collect();
    if composable.is_empty() {
        return Ok(Composite::Placeholder);
    }

    let mut frame = CompositeFrame {
        width: surface.width,
        height: surface.height,
        rgba8_premul: vec![0u8; surface.pixel_count() * 4],
    };

    for layer in &composable {
        // is_composable guarantees the bitmap.
        if let Some(bitmap) = layer.bitmap() {
            draw_stretched(&mut frame, bitmap);
        }
    }
    if let Some(bitmap) = highlight {
        draw_stretched(&mut frame, bitmap);
    }

    tracing::debug!(layers = composable.len(), "composite rendered");
    Ok(Composite::Frame(frame))
}

/// Source-over blend of `bitmap` stretched across the whole frame,
/// nearest-neighbor, in premultiplied space.
fn draw_stretched(frame: &mut CompositeFrame, bitmap: &Bitmap) {
    for dy in 0..frame.height {
        let sy = (u64::from(dy) * u64::from(bitmap.height) / u64::from(frame.height)) as u32;
        for dx in 0..frame.width {
            let sx = (u64::from(dx) * u64::from(bitmap.width) / u64::from(frame.width)) as u32;
            let Some(src) = bitmap.pixel_at(sx, sy) else {
                continue;
            };
            if src.a == 0 {
                continue;
            }

            let off = (dy as usize * frame.width as usize + dx as usize) * 4;
            let dst = &mut frame.rgba8_premul[off..off + 4];
            let inv = 255 - u16::from(src.a);
            dst[0] = blend_channel(src.r, dst[0], inv);
            dst[1] = blend_channel(src.g, dst[1], inv);
            dst[2] = blend_channel(src.b, dst[2], inv);
            dst[3] = blend_channel(src.a, dst[3], inv);
        }
    }
}

fn blend_channel(src: u8, dst: u8, inv_src_a: u16) -> u8 {
    let dst = u16::from(dst);
    (u16::from(src) + ((dst * inv_src_a + 127) / 255)).min(255) as u8
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
