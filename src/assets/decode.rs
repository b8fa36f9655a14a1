use anyhow::Context;

use crate::foundation::core::{Bitmap, premul_channel};
use crate::foundation::error::StackpaneResult;

/// Decode encoded image bytes into a premultiplied RGBA8 [`Bitmap`].
///
/// Decoding into owned pixels is what makes later per-pixel alpha reads
/// always possible; a source that cannot be decoded is a load failure, never
/// a half-readable bitmap.
pub fn decode_bitmap(bytes: &[u8]) -> StackpaneResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode layer image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Bitmap::from_premul_rgba8(width, height, rgba8_premul)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = premul_channel(px[0], a);
        px[1] = premul_channel(px[1], a);
        px[2] = premul_channel(px[2], a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
