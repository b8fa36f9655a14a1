use super::*;

fn solid(width: u32, height: u32, alpha: u8) -> Bitmap {
    let px = [alpha, alpha, alpha, alpha];
    let bytes: Vec<u8> = px
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    Bitmap::from_premul_rgba8(width, height, bytes).unwrap()
}

fn ids(layers: &[&Layer]) -> Vec<String> {
    layers.iter().map(|l| l.id().to_string()).collect()
}

#[test]
fn ordered_by_z_then_insertion() {
    let mut reg = LayerRegistry::new();
    reg.insert(LayerId::new("c"), "C", "u/c", 1);
    reg.insert(LayerId::new("a"), "A", "u/a", 0);
    reg.insert(LayerId::new("b"), "B", "u/b", 1);

    assert_eq!(ids(&reg.ordered()), ["a", "c", "b"]);
    assert_eq!(ids(&reg.ordered_topmost_first()), ["b", "c", "a"]);
}

#[test]
fn contains_exactly_added_and_not_removed() {
    let mut reg = LayerRegistry::new();
    reg.insert(LayerId::new("a"), "A", "u/a", 0);
    reg.insert(LayerId::new("b"), "B", "u/b", 1);
    reg.insert(LayerId::new("c"), "C", "u/c", 2);
    assert!(reg.remove(&LayerId::new("b")));

    assert_eq!(ids(&reg.ordered()), ["a", "c"]);
    assert_eq!(reg.len(), 2);
}

#[test]
fn unknown_ids_are_noops() {
    let mut reg = LayerRegistry::new();
    assert!(!reg.remove(&LayerId::new("ghost")));
    assert!(!reg.set_visible(&LayerId::new("ghost"), false));
    assert!(reg.is_empty());
}

#[test]
fn reinsert_bumps_generation_and_discards_stale_loads() {
    let mut reg = LayerRegistry::new();
    let id = LayerId::new("x");
    let gen1 = reg.insert(id.clone(), "X", "u/x-old", 0);
    let gen2 = reg.insert(id.clone(), "X", "u/x-new", 0);
    assert!(gen2 > gen1);
    assert_eq!(reg.get(&id).unwrap().load_state(), LoadState::Pending);

    // The old fetch arrives late: discarded, layer stays pending.
    assert_eq!(
        reg.settle_load(&id, gen1, Ok(solid(2, 2, 255))),
        SettleOutcome::Stale
    );
    assert_eq!(reg.get(&id).unwrap().load_state(), LoadState::Pending);

    assert_eq!(
        reg.settle_load(&id, gen2, Ok(solid(2, 2, 255))),
        SettleOutcome::Applied(LoadState::Loaded)
    );
    assert!(reg.get(&id).unwrap().bitmap().is_some());
}

#[test]
fn generations_are_never_reused_across_remove_and_readd() {
    let mut reg = LayerRegistry::new();
    let id = LayerId::new("x");
    let gen1 = reg.insert(id.clone(), "X", "u/x-old", 0);
    reg.remove(&id);
    let gen2 = reg.insert(id.clone(), "X", "u/x-new", 0);
    assert!(gen2 > gen1);

    // The first incarnation's fetch lands late; it belongs to a dead layer
    // and must not settle against the new source.
    assert_eq!(
        reg.settle_load(&id, gen1, Ok(solid(2, 2, 255))),
        SettleOutcome::Stale
    );
    assert_eq!(reg.get(&id).unwrap().load_state(), LoadState::Pending);

    assert_eq!(
        reg.settle_load(&id, gen2, Ok(solid(2, 2, 255))),
        SettleOutcome::Applied(LoadState::Loaded)
    );
}

#[test]
fn settle_after_removal_is_unknown() {
    let mut reg = LayerRegistry::new();
    let id = LayerId::new("x");
    let generation = reg.insert(id.clone(), "X", "u/x", 0);
    reg.remove(&id);

    assert_eq!(
        reg.settle_load(&id, generation, Ok(solid(1, 1, 255))),
        SettleOutcome::Unknown
    );
}

#[test]
fn failed_load_keeps_layer_addressable() {
    let mut reg = LayerRegistry::new();
    let id = LayerId::new("x");
    let generation = reg.insert(id.clone(), "X", "u/x", 0);

    assert_eq!(
        reg.settle_load(&id, generation, Err(anyhow::anyhow!("404"))),
        SettleOutcome::Applied(LoadState::Failed)
    );
    let layer = reg.get(&id).unwrap();
    assert_eq!(layer.load_state(), LoadState::Failed);
    assert!(layer.bitmap().is_none());
    assert!(!layer.is_composable());

    // Still removable and re-addable.
    let regen = reg.insert(id.clone(), "X", "u/x", 0);
    assert!(regen > generation);
    assert_eq!(reg.get(&id).unwrap().load_state(), LoadState::Pending);
}

#[test]
fn visibility_is_independent_of_load_state() {
    let mut reg = LayerRegistry::new();
    let id = LayerId::new("x");
    let generation = reg.insert(id.clone(), "X", "u/x", 0);
    reg.settle_load(&id, generation, Ok(solid(1, 1, 255)));

    assert!(reg.get(&id).unwrap().is_composable());
    assert!(reg.set_visible(&id, false));
    let layer = reg.get(&id).unwrap();
    assert_eq!(layer.load_state(), LoadState::Loaded);
    assert!(!layer.is_composable());

    // Unchanged flag reports no mutation.
    assert!(!reg.set_visible(&id, false));
}

#[test]
fn selection_lists_parts_in_paint_order() {
    let mut reg = LayerRegistry::new();
    reg.insert(LayerId::new("bolt"), "Hex bolt", "u/b", 1);
    reg.insert(LayerId::new("shell"), "Shell", "u/s", 0);

    let parts = reg.selection();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].id, LayerId::new("shell"));
    assert_eq!(parts[0].name, "Shell");
    assert_eq!(parts[1].id, LayerId::new("bolt"));
}

#[test]
fn clear_drops_everything() {
    let mut reg = LayerRegistry::new();
    reg.insert(LayerId::new("a"), "A", "u/a", 0);
    reg.clear();
    assert!(reg.is_empty());
    assert!(reg.ordered().is_empty());
}
