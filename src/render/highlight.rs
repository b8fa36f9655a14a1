use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Bitmap, LayerId, Rgba8Premul, premul_channel};
use crate::registry::layers::Layer;

/// Outline color for the hovered part.
const OUTLINE_RGB: (u8, u8, u8) = (0xff, 0x50, 0x00);

/// Outline thickness in source-bitmap pixels.
const OUTLINE_OFFSET_PX: u32 = 2;

#[derive(Debug, Default)]
/// Lazily derived, cached outlined variants of layer bitmaps.
///
/// Keyed by layer id and content version: repeated lookups while the bitmap
/// is unchanged return the same `Arc`; a new load settling evicts the entry.
pub struct HighlightCache {
    cached: HashMap<LayerId, (u64, Arc<Bitmap>)>,
}

impl HighlightCache {
    /// Construct an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the outlined variant of `layer`'s bitmap, deriving and caching
    /// it on first use. `None` while the layer has no loaded bitmap.
    pub fn get(&mut self, layer: &Layer) -> Option<Arc<Bitmap>> {
        let bitmap = layer.bitmap()?;
        let version = layer.load_generation();

        if let Some((cached_version, variant)) = self.cached.get(layer.id())
            && *cached_version == version
        {
            return Some(Arc::clone(variant));
        }

        let variant = Arc::new(outline_variant(bitmap));
        self.cached
            .insert(layer.id().clone(), (version, Arc::clone(&variant)));
        Some(variant)
    }

    /// Drop the cached variant for a removed layer.
    pub fn purge(&mut self, id: &LayerId) {
        self.cached.remove(id);
    }

    /// Drop all cached variants (session reset).
    pub fn clear(&mut self) {
        self.cached.clear();
    }
}

/// Derive the outlined variant: the silhouette is the union of four
/// directional offsets of the source alpha, recolored to the outline color,
/// with the original drawn back on top.
fn outline_variant(bitmap: &Bitmap) -> Bitmap {
    let (w, h) = (bitmap.width, bitmap.height);
    let d = OUTLINE_OFFSET_PX as i64;
    let mut out = vec![0u8; w as usize * h as usize * 4];

    for y in 0..h {
        for x in 0..w {
            // Border alpha from the offset-union silhouette.
            let mut border_a = 0u8;
            for (ox, oy) in [(-d, 0), (d, 0), (0, -d), (0, d)] {
                let sx = i64::from(x) - ox;
                let sy = i64::from(y) - oy;
                if sx < 0 || sy < 0 {
                    continue;
                }
                if let Some(a) = bitmap.alpha_at(sx as u32, sy as u32) {
                    border_a = border_a.max(a);
                }
            }

            let border = Rgba8Premul {
                r: premul_channel(OUTLINE_RGB.0, border_a),
                g: premul_channel(OUTLINE_RGB.1, border_a),
                b: premul_channel(OUTLINE_RGB.2, border_a),
                a: border_a,
            };
            let src = bitmap.pixel_at(x, y).unwrap_or(Rgba8Premul::transparent());

            // Original over border, premultiplied source-over.
            let inv = 255 - u16::from(src.a);
            let off = (y as usize * w as usize + x as usize) * 4;
            out[off] = over(src.r, border.r, inv);
            out[off + 1] = over(src.g, border.g, inv);
            out[off + 2] = over(src.b, border.b, inv);
            out[off + 3] = over(src.a, border.a, inv);
        }
    }

    Bitmap {
        width: w,
        height: h,
        rgba8_premul: Arc::new(out),
    }
}

fn over(src: u8, dst: u8, inv_src_a: u16) -> u8 {
    (u16::from(src) + ((u16::from(dst) * inv_src_a + 127) / 255)).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/highlight.rs"]
mod tests;
