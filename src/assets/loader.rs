use crate::assets::decode::decode_bitmap;
use crate::foundation::core::LayerId;
use crate::registry::layers::{LayerRegistry, LoadState, SettleOutcome};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One outstanding bitmap fetch, stamped with the generation captured at
/// request time.
pub struct LoadRequest {
    /// Target layer.
    pub id: LayerId,
    /// Location of the bitmap resource.
    pub url: String,
    /// Generation the completion must carry back to be applied.
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What became of a load completion.
pub enum LoadSettled {
    /// The bitmap decoded and the layer is now loaded.
    Loaded,
    /// The fetch or decode failed and the layer is now failed.
    Failed,
    /// A newer request superseded this one, or the layer is gone; nothing
    /// changed.
    Discarded,
}

#[derive(Clone, Debug, Default)]
/// Asynchronous bitmap resolution, runtime-agnostic.
///
/// The engine owns no transport: it queues [`LoadRequest`]s, the host drains
/// them with [`ImageLoader::take_requests`] and resolves each URL to bytes
/// however it likes (any number of fetches in flight, no ordering guarantee),
/// then feeds each outcome back through [`ImageLoader::settle`]. Cancellation
/// is advisory-only via the generation counter; in-flight fetches are never
/// aborted, their results are dropped on arrival.
pub struct ImageLoader {
    queue: Vec<LoadRequest>,
}

impl ImageLoader {
    /// Construct a loader with an empty request queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fetch for `(id, url)` stamped with `generation`.
    pub fn request(&mut self, id: LayerId, url: impl Into<String>, generation: u64) {
        self.queue.push(LoadRequest {
            id,
            url: url.into(),
            generation,
        });
    }

    /// Drain all queued requests for the host to start fetching.
    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.queue)
    }

    /// Whether any request is waiting to be drained.
    pub fn has_pending_requests(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Apply one fetch outcome: decode on success, then settle against the
    /// registry's current generation.
    pub fn settle(
        &mut self,
        registry: &mut LayerRegistry,
        id: &LayerId,
        generation: u64,
        bytes: Result<Vec<u8>, anyhow::Error>,
    ) -> LoadSettled {
        // Decode failures take the same path as fetch failures: the layer is
        // marked failed only if the generation still matches.
        let decoded = bytes.and_then(|bytes| decode_bitmap(&bytes).map_err(anyhow::Error::from));

        match registry.settle_load(id, generation, decoded) {
            SettleOutcome::Applied(LoadState::Loaded) => LoadSettled::Loaded,
            SettleOutcome::Applied(_) => LoadSettled::Failed,
            SettleOutcome::Stale | SettleOutcome::Unknown => LoadSettled::Discarded,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
