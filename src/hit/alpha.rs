use std::collections::{HashMap, HashSet};

use crate::foundation::core::{Bitmap, LayerId, SurfaceSize};
use crate::foundation::error::{StackpaneError, StackpaneResult};
use crate::registry::layers::Layer;

#[derive(Clone, Debug)]
/// Per-layer grid of opacity samples at surface resolution.
///
/// Sampled with the same non-aspect-preserving stretch the compositor uses,
/// so a hit on the buffer is a hit on the drawn pixels.
pub struct AlphaBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl AlphaBuffer {
    /// Resample a bitmap's alpha channel to `surface` dimensions
    /// (nearest-neighbor).
    pub fn from_bitmap(bitmap: &Bitmap, surface: SurfaceSize) -> Self {
        let mut samples = vec![0u8; surface.pixel_count()];
        for dy in 0..surface.height {
            let sy = (u64::from(dy) * u64::from(bitmap.height) / u64::from(surface.height)) as u32;
            let row = dy as usize * surface.width as usize;
            for dx in 0..surface.width {
                let sx =
                    (u64::from(dx) * u64::from(bitmap.width) / u64::from(surface.width)) as u32;
                samples[row + dx as usize] = bitmap.alpha_at(sx, sy).unwrap_or(0);
            }
        }
        Self {
            width: surface.width,
            height: surface.height,
            samples,
        }
    }

    /// Buffer dimensions.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Read one opacity sample; errors when the buffer cannot answer for the
    /// point (undersized relative to the surface it is queried against).
    pub fn sample(&self, x: u32, y: u32) -> StackpaneResult<u8> {
        if x >= self.width || y >= self.height {
            return Err(StackpaneError::hit_test(format!(
                "({x},{y}) outside {}x{} alpha buffer",
                self.width, self.height
            )));
        }
        Ok(self.samples[y as usize * self.width as usize + x as usize])
    }
}

#[derive(Debug)]
/// Answers "which layer is under this point" from cached alpha buffers.
///
/// One buffer per loaded layer, keyed by the layer's content version, rebuilt
/// only when the bitmap changes or the surface resizes. Pointer movement only
/// reads: one buffer sample per layer in the worst case, short-circuiting on
/// the first hit.
pub struct HitTester {
    surface: SurfaceSize,
    buffers: HashMap<LayerId, (u64, AlphaBuffer)>,
    read_failed: HashSet<LayerId>,
}

impl HitTester {
    /// Construct a hit tester for the given surface size.
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            surface,
            buffers: HashMap::new(),
            read_failed: HashSet::new(),
        }
    }

    /// Adopt a new surface size, invalidating every cached buffer.
    pub fn set_surface(&mut self, surface: SurfaceSize) {
        if self.surface != surface {
            self.surface = surface;
            self.buffers.clear();
        }
    }

    /// Drop cached state for a removed layer.
    pub fn purge(&mut self, id: &LayerId) {
        self.buffers.remove(id);
        self.read_failed.remove(id);
    }

    /// Drop all cached state (session reset).
    pub fn clear(&mut self) {
        self.buffers.clear();
        self.read_failed.clear();
    }

    /// Make sure every loaded layer in `layers` has a buffer for its current
    /// content version, and drop buffers for layers no longer in the set.
    /// Fresh buffers are left untouched.
    pub fn rebuild(&mut self, layers: &[&Layer]) {
        let live: HashSet<&LayerId> = layers.iter().map(|layer| layer.id()).collect();
        self.buffers.retain(|id, _| live.contains(id));

        for layer in layers {
            self.ensure_fresh(layer);
        }
    }

    fn ensure_fresh(&mut self, layer: &Layer) {
        let Some(bitmap) = layer.bitmap() else {
            // Pending or failed: nothing to sample against.
            self.buffers.remove(layer.id());
            return;
        };
        let version = layer.load_generation();
        let fresh = self
            .buffers
            .get(layer.id())
            .is_some_and(|(cached, _)| *cached == version);
        if !fresh {
            let buffer = AlphaBuffer::from_bitmap(bitmap, self.surface);
            self.buffers.insert(layer.id().clone(), (version, buffer));
        }
    }

    /// Return the topmost layer with nonzero opacity at `(x, y)`, or `None`
    /// if every layer is transparent there.
    ///
    /// `layers` must be ordered topmost first; invisible and unloaded layers
    /// are skipped. A buffer read failure counts as transparent for that
    /// layer (logged once per layer) and the query continues downward.
    pub fn query_point(&mut self, layers: &[&Layer], x: u32, y: u32) -> Option<LayerId> {
        if x >= self.surface.width || y >= self.surface.height {
            return None;
        }

        for layer in layers {
            if !layer.is_composable() {
                continue;
            }
            self.ensure_fresh(layer);
            let Some((_, buffer)) = self.buffers.get(layer.id()) else {
                continue;
            };
            match buffer.sample(x, y) {
                Ok(alpha) if alpha > 0 => return Some(layer.id().clone()),
                Ok(_) => {}
                Err(err) => {
                    if self.read_failed.insert(layer.id().clone()) {
                        tracing::warn!(id = %layer.id(), error = %err, "alpha read failed, treating layer as transparent");
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hit/alpha.rs"]
mod tests;
