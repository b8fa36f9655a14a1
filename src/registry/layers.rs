use std::collections::HashMap;

use crate::foundation::core::{Bitmap, LayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Observable load state of a layer.
pub enum LoadState {
    /// A fetch is in flight (or was never completed).
    Pending,
    /// The bitmap decoded successfully and is available.
    Loaded,
    /// The fetch or decode failed; the layer stays addressable but is
    /// excluded from compositing and hit testing.
    Failed,
}

#[derive(Clone, Debug)]
enum LoadPhase {
    Pending,
    Loaded(Bitmap),
    Failed,
}

#[derive(Clone, Debug)]
/// One selectable part image with independent visibility and stacking order.
pub struct Layer {
    id: LayerId,
    display_name: String,
    source_url: String,
    z_order: i32,
    visible: bool,
    phase: LoadPhase,
    load_generation: u64,
    insert_seq: u64,
}

impl Layer {
    /// Layer identifier.
    pub fn id(&self) -> &LayerId {
        &self.id
    }

    /// Human-readable label (tooltip use only).
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Location of the bitmap resource.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Stacking order; lower values draw first (bottom).
    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// Whether the layer participates in compositing and hit testing.
    /// Independent of load state.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Observable load state.
    pub fn load_state(&self) -> LoadState {
        match self.phase {
            LoadPhase::Pending => LoadState::Pending,
            LoadPhase::Loaded(_) => LoadState::Loaded,
            LoadPhase::Failed => LoadState::Failed,
        }
    }

    /// Decoded bitmap; present exactly when [`LoadState::Loaded`].
    pub fn bitmap(&self) -> Option<&Bitmap> {
        match &self.phase {
            LoadPhase::Loaded(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    /// Generation stamped when `source_url` was last (re)set, drawn from a
    /// registry-wide monotonic counter so a value is never reused for an id.
    /// A bitmap only settles if its request carried the current generation,
    /// so this doubles as the content version for derived caches.
    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    /// Usable by the compositor and hit tester on this frame.
    pub fn is_composable(&self) -> bool {
        self.visible && matches!(self.phase, LoadPhase::Loaded(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Selected-part record handed to the downstream document writer.
pub struct SelectedPart {
    /// Layer identifier.
    pub id: LayerId,
    /// Human-readable label.
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Result of applying an asynchronous load completion.
pub enum SettleOutcome {
    /// The completion matched the current generation and was applied.
    Applied(LoadState),
    /// A newer request superseded this completion; it was discarded.
    Stale,
    /// The layer was removed before the completion arrived.
    Unknown,
}

#[derive(Clone, Debug, Default)]
/// Authoritative map of active layers and their metadata and load state.
///
/// Single-writer: all mutation happens on the host's event thread. Async load
/// results enter through [`LayerRegistry::settle_load`], which enforces the
/// generation check.
pub struct LayerRegistry {
    layers: HashMap<LayerId, Layer>,
    next_seq: u64,
    next_generation: u64,
}

impl LayerRegistry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id` and return the load generation
    /// the caller must stamp on the fetch it triggers.
    ///
    /// Generations come from a registry-wide counter, so a value is never
    /// reused for an id — an in-flight fetch for any earlier incarnation of
    /// the layer, replaced or removed-and-re-added, is discarded when it
    /// arrives.
    pub fn insert(
        &mut self,
        id: LayerId,
        display_name: impl Into<String>,
        source_url: impl Into<String>,
        z_order: i32,
    ) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        let insert_seq = match self.layers.get(&id) {
            Some(prev) => prev.insert_seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };

        tracing::debug!(id = %id, z_order, generation, "layer inserted");
        self.layers.insert(
            id.clone(),
            Layer {
                id,
                display_name: display_name.into(),
                source_url: source_url.into(),
                z_order,
                visible: true,
                phase: LoadPhase::Pending,
                load_generation: generation,
                insert_seq,
            },
        );
        generation
    }

    /// Delete the entry for `id`. Unknown ids are a no-op; returns whether an
    /// entry was removed so the caller can purge derived caches.
    pub fn remove(&mut self, id: &LayerId) -> bool {
        let removed = self.layers.remove(id).is_some();
        if removed {
            tracing::debug!(id = %id, "layer removed");
        }
        removed
    }

    /// Toggle visibility. Unknown ids are a no-op; load state is unaffected.
    pub fn set_visible(&mut self, id: &LayerId, visible: bool) -> bool {
        match self.layers.get_mut(id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Lookup a layer by id.
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Whether the registry holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of registered layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Layers in paint order: ascending `z_order`, ties broken by insertion
    /// order (stable across re-adds of the same id).
    pub fn ordered(&self) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self.layers.values().collect();
        out.sort_by_key(|layer| (layer.z_order, layer.insert_seq));
        out
    }

    /// Layers in hit-test order: topmost first.
    pub fn ordered_topmost_first(&self) -> Vec<&Layer> {
        let mut out = self.ordered();
        out.reverse();
        out
    }

    /// Apply an asynchronous load completion for `(id, generation)`.
    ///
    /// The generation check is the cancellation mechanism: a completion for a
    /// superseded request is discarded silently, never applied.
    pub fn settle_load(
        &mut self,
        id: &LayerId,
        generation: u64,
        result: Result<Bitmap, anyhow::Error>,
    ) -> SettleOutcome {
        let Some(layer) = self.layers.get_mut(id) else {
            return SettleOutcome::Unknown;
        };
        if layer.load_generation != generation {
            tracing::debug!(id = %id, generation, current = layer.load_generation, "stale load discarded");
            return SettleOutcome::Stale;
        }

        match result {
            Ok(bitmap) => {
                layer.phase = LoadPhase::Loaded(bitmap);
                SettleOutcome::Applied(LoadState::Loaded)
            }
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "layer bitmap load failed");
                layer.phase = LoadPhase::Failed;
                SettleOutcome::Applied(LoadState::Failed)
            }
        }
    }

    /// Selected-part records in paint order, for the document writer.
    pub fn selection(&self) -> Vec<SelectedPart> {
        self.ordered()
            .into_iter()
            .map(|layer| SelectedPart {
                id: layer.id.clone(),
                name: layer.display_name.clone(),
            })
            .collect()
    }

    /// Session-scope reset: drop every layer. Derived caches are purged by
    /// the owner.
    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/layers.rs"]
mod tests;
