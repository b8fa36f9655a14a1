use std::time::Instant;

use crate::assets::loader::{ImageLoader, LoadRequest, LoadSettled};
use crate::foundation::core::{LayerId, Point, SurfaceSize};
use crate::foundation::error::StackpaneResult;
use crate::hit::alpha::HitTester;
use crate::registry::layers::{Layer, LayerRegistry, SelectedPart};
use crate::render::compose::{Composite, CompositeFrame, compose};
use crate::render::highlight::HighlightCache;
use crate::render::sched::RenderScheduler;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Outcome of one scheduler tick.
pub enum TickOutcome {
    /// No repaint was due (or the render pass aborted; the next mutation
    /// schedules a fresh attempt).
    Idle,
    /// A repaint was due but no layer is both visible and loaded; show the
    /// fallback placeholder.
    Placeholder,
    /// A repaint was due and rendered.
    Rendered(CompositeFrame),
}

#[derive(Debug)]
/// The preview engine: one owned instance per preview surface.
///
/// Owns the layer registry, the async load queue, the per-layer alpha
/// buffers, the highlight cache, and the render debounce. All methods run
/// synchronously on the host's event thread; the only suspension point in
/// the whole engine is the host's own fetch between
/// [`PreviewEngine::take_load_requests`] and
/// [`PreviewEngine::finish_load`]. A mutation is visible to every subsequent
/// read the instant it returns.
pub struct PreviewEngine {
    surface: SurfaceSize,
    registry: LayerRegistry,
    loader: ImageLoader,
    hit: HitTester,
    highlights: HighlightCache,
    sched: RenderScheduler,
    hovered: Option<LayerId>,
    clock: fn() -> Instant,
}

impl PreviewEngine {
    /// Construct an engine for a surface of the given pixel size, reading
    /// the wall clock when arming the render debounce.
    pub fn new(surface: SurfaceSize) -> Self {
        Self::with_clock(surface, Instant::now)
    }

    /// Construct an engine with an explicit time source. Mutations arm the
    /// debounce at `clock()`, so a synthetic clock drives the whole
    /// schedule/tick cycle deterministically.
    pub fn with_clock(surface: SurfaceSize, clock: fn() -> Instant) -> Self {
        Self {
            surface,
            registry: LayerRegistry::new(),
            loader: ImageLoader::new(),
            hit: HitTester::new(surface),
            highlights: HighlightCache::new(),
            sched: RenderScheduler::new(),
            hovered: None,
            clock,
        }
    }

    /// Current surface size.
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Add a layer, or replace it if `id` already exists. Queues a bitmap
    /// fetch stamped with the new generation and schedules a render, so a
    /// remove-and-re-add is visually idempotent once the load settles.
    /// Non-blocking; returns immediately.
    pub fn add_layer(
        &mut self,
        id: LayerId,
        display_name: impl Into<String>,
        source_url: impl Into<String>,
        z_order: i32,
    ) {
        let url = source_url.into();
        let generation = self.registry.insert(id.clone(), display_name, &url, z_order);
        self.loader.request(id, url, generation);
        self.schedule_render();
    }

    /// Remove a layer and purge every cached derivative for it. Unknown ids
    /// are a no-op.
    pub fn remove_layer(&mut self, id: &LayerId) {
        if !self.registry.remove(id) {
            return;
        }
        self.hit.purge(id);
        self.highlights.purge(id);
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        self.schedule_render();
    }

    /// Toggle a layer's visibility. Load state is unaffected; unknown ids
    /// are a no-op.
    pub fn set_visible(&mut self, id: &LayerId, visible: bool) {
        if !self.registry.set_visible(id, visible) {
            return;
        }
        if !visible && self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        self.schedule_render();
    }

    /// Layers in paint order (ascending z, ties by insertion order).
    pub fn layers(&self) -> Vec<&Layer> {
        self.registry.ordered()
    }

    /// Selected-part records for the downstream document writer.
    pub fn selection(&self) -> Vec<SelectedPart> {
        self.registry.selection()
    }

    /// Drain queued bitmap fetches. The host resolves each URL to bytes with
    /// its own transport (any concurrency, no ordering guarantee) and
    /// reports back through [`PreviewEngine::finish_load`].
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        self.loader.take_requests()
    }

    #[tracing::instrument(skip(self, bytes))]
    /// Apply one fetch outcome. Stale generations are discarded silently;
    /// applied outcomes (loaded or failed) schedule a render.
    pub fn finish_load(
        &mut self,
        id: &LayerId,
        generation: u64,
        bytes: Result<Vec<u8>, anyhow::Error>,
    ) -> LoadSettled {
        let settled = self
            .loader
            .settle(&mut self.registry, id, generation, bytes);
        if settled != LoadSettled::Discarded {
            self.schedule_render();
        }
        settled
    }

    /// Synchronous hit test for a pointer position in surface-relative pixel
    /// coordinates. Updates the hovered layer and schedules a render only
    /// when the answer changes; returns the layer now under the pointer.
    pub fn pointer_moved(&mut self, pos: Point) -> Option<LayerId> {
        let hit = match surface_pixel(pos) {
            Some((x, y)) => {
                let ordered = self.registry.ordered_topmost_first();
                self.hit.query_point(&ordered, x, y)
            }
            None => None,
        };

        if hit != self.hovered {
            self.hovered = hit.clone();
            self.schedule_render();
        }
        hit
    }

    /// The pointer left the surface; clears the hover highlight.
    pub fn pointer_left(&mut self) {
        if self.hovered.take().is_some() {
            self.schedule_render();
        }
    }

    /// Layer currently under the pointer, for the tooltip consumer.
    pub fn hovered_layer(&self) -> Option<&LayerId> {
        self.hovered.as_ref()
    }

    /// Adopt a new surface size. Alpha buffers are invalidated wholesale and
    /// rebuilt on the next render or query.
    pub fn resize_surface(&mut self, surface: SurfaceSize) {
        if self.surface == surface {
            return;
        }
        self.surface = surface;
        self.hit.set_surface(surface);
        self.schedule_render();
    }

    #[tracing::instrument(skip(self))]
    /// Run the coalesced repaint if one is due.
    ///
    /// Burst mutations inside one frame window produce exactly one rendered
    /// frame, reflecting the registry state at the moment the window
    /// elapses. A render error aborts this tick only; no retry is scheduled,
    /// the next mutation arms a fresh one.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.sched.take_due(now) {
            return TickOutcome::Idle;
        }

        let ordered = self.registry.ordered();
        self.hit.rebuild(&ordered);

        let highlight = self
            .hovered
            .as_ref()
            .and_then(|id| self.registry.get(id))
            .and_then(|layer| self.highlights.get(layer));

        match compose(self.surface, &ordered, highlight.as_deref()) {
            Ok(Composite::Placeholder) => TickOutcome::Placeholder,
            Ok(Composite::Frame(frame)) => TickOutcome::Rendered(frame),
            Err(err) => {
                tracing::warn!(error = %err, "render pass aborted");
                TickOutcome::Idle
            }
        }
    }

    /// Compose the current state and encode it as an embeddable PNG for the
    /// document writer. `Ok(None)` while the placeholder would show.
    pub fn export_composite(&mut self) -> StackpaneResult<Option<Vec<u8>>> {
        let ordered = self.registry.ordered();
        let highlight = self
            .hovered
            .as_ref()
            .and_then(|id| self.registry.get(id))
            .and_then(|layer| self.highlights.get(layer));

        match compose(self.surface, &ordered, highlight.as_deref())? {
            Composite::Placeholder => Ok(None),
            Composite::Frame(frame) => frame.encode_png().map(Some),
        }
    }

    /// Session-scope reset: drop every layer, derived cache, queued fetch,
    /// and the hover state. In-flight fetches settle as unknown layers.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.loader.take_requests();
        self.hit.clear();
        self.highlights.clear();
        self.sched.reset();
        self.hovered = None;
    }

    fn schedule_render(&mut self) {
        self.sched.schedule((self.clock)());
    }
}

/// Map a surface-relative position to a pixel coordinate; `None` for points
/// left of or above the surface (right/bottom overruns are rejected by the
/// hit tester against the live surface size).
fn surface_pixel(pos: Point) -> Option<(u32, u32)> {
    if pos.x < 0.0 || pos.y < 0.0 {
        return None;
    }
    Some((pos.x.floor() as u32, pos.y.floor() as u32))
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
