//! Rebind guard tests
//!
//! Tests for:
//! - Suppression of repeated binds to the same slot
//! - Per-slot tracking (same object, different slot)
//! - Per-object and global always-rebind overrides
//! - State after failed binds and after reset

use vesper::backend::{BindSlot, HeadlessBackend, ResourceKind};
use vesper::errors::VesperError;
use vesper::renderer::RebindGuard;
use vesper::resources::{PrimitiveTopology, ResourceDesc, ResourceHandle, ResourceId, ResourceStore};

// ============================================================================
// Helpers
// ============================================================================

/// Two live identities to feed the guard.
fn two_ids() -> (ResourceId, ResourceId) {
    let mut backend = HeadlessBackend::new();
    let mut store = ResourceStore::default();
    let desc = ResourceDesc::Topology(PrimitiveTopology::TriangleList);
    let a = ResourceHandle::stored(desc.clone())
        .materialize(&mut store, &mut backend)
        .unwrap();
    let b = ResourceHandle::stored(desc)
        .materialize(&mut store, &mut backend)
        .unwrap();
    (a, b)
}

fn texture_slot(n: u32) -> BindSlot {
    BindSlot::new(ResourceKind::Texture, n)
}

/// Runs one guarded bind and counts backend calls in `calls`.
fn bind(guard: &mut RebindGuard, slot: BindSlot, id: ResourceId, always: bool, calls: &mut u32) -> bool {
    guard
        .bind(slot, id, always, || {
            *calls += 1;
            Ok(())
        })
        .unwrap()
}

// ============================================================================
// Suppression
// ============================================================================

#[test]
fn second_bind_of_same_object_is_suppressed() {
    let (a, _) = two_ids();
    let mut guard = RebindGuard::new();
    let mut calls = 0;

    assert!(bind(&mut guard, texture_slot(0), a, false, &mut calls));
    assert!(!bind(&mut guard, texture_slot(0), a, false, &mut calls));

    assert_eq!(calls, 1);
    assert_eq!(guard.stats().performed, 1);
    assert_eq!(guard.stats().suppressed, 1);
    assert_eq!(guard.last_bound(texture_slot(0)), Some(a));
}

#[test]
fn different_object_replaces_slot_content() {
    let (a, b) = two_ids();
    let mut guard = RebindGuard::new();
    let mut calls = 0;

    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    assert!(bind(&mut guard, texture_slot(0), b, false, &mut calls));
    assert!(bind(&mut guard, texture_slot(0), a, false, &mut calls));

    assert_eq!(calls, 3);
    assert_eq!(guard.last_bound(texture_slot(0)), Some(a));
}

#[test]
fn slots_are_tracked_independently() {
    let (a, _) = two_ids();
    let mut guard = RebindGuard::new();
    let mut calls = 0;

    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    assert!(bind(&mut guard, texture_slot(1), a, false, &mut calls));
    assert!(!bind(&mut guard, texture_slot(1), a, false, &mut calls));

    // Same index, other kind.
    let sampler = BindSlot::new(ResourceKind::Sampler, 0);
    assert!(bind(&mut guard, sampler, a, false, &mut calls));
    assert_eq!(calls, 3);
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn always_rebind_object_is_never_suppressed() {
    let (a, _) = two_ids();
    let mut guard = RebindGuard::new();
    let mut calls = 0;

    for _ in 0..3 {
        assert!(bind(&mut guard, texture_slot(0), a, true, &mut calls));
    }
    assert_eq!(calls, 3);
    assert_eq!(guard.stats().suppressed, 0);
}

#[test]
fn global_always_rebind_forwards_everything() {
    let (a, _) = two_ids();
    let mut guard = RebindGuard::always_rebinding();
    assert!(guard.always_rebind());
    let mut calls = 0;

    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    assert_eq!(calls, 2);

    guard.set_always_rebind(false);
    assert!(!bind(&mut guard, texture_slot(0), a, false, &mut calls));
    assert_eq!(calls, 2);
}

// ============================================================================
// Failure and Reset
// ============================================================================

#[test]
fn failed_bind_forgets_the_slot() {
    let (a, b) = two_ids();
    let mut guard = RebindGuard::new();
    let mut calls = 0;

    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    let err = guard
        .bind(texture_slot(0), b, false, || Err(VesperError::Backend("boom".into())))
        .unwrap_err();
    assert!(matches!(err, VesperError::Backend(_)));
    assert_eq!(guard.last_bound(texture_slot(0)), None);

    // The slot content is unknown, so even the old object goes through.
    assert!(bind(&mut guard, texture_slot(0), a, false, &mut calls));
    assert_eq!(calls, 2);
}

#[test]
fn reset_forgets_bound_state_but_keeps_stats() {
    let (a, _) = two_ids();
    let mut guard = RebindGuard::new();
    let mut calls = 0;

    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    bind(&mut guard, texture_slot(0), a, false, &mut calls);
    guard.reset();

    assert_eq!(guard.last_bound(texture_slot(0)), None);
    assert!(bind(&mut guard, texture_slot(0), a, false, &mut calls));
    assert_eq!(guard.stats().performed, 2);
    assert_eq!(guard.stats().suppressed, 1);

    guard.reset_stats();
    assert_eq!(guard.stats().performed, 0);
}

#[test]
fn bindable_binds_through_guard_at_its_own_slot() {
    let mut backend = HeadlessBackend::new();
    let mut store = ResourceStore::default();
    let mut guard = RebindGuard::new();

    let mut texture = ResourceHandle::owned(ResourceDesc::solid_texture("red", [255, 0, 0, 255], 2));
    let id = texture.materialize(&mut store, &mut backend).unwrap();
    backend.clear_calls();

    assert!(texture.bind(&store, &mut guard, &mut backend).unwrap());
    assert!(!texture.bind(&store, &mut guard, &mut backend).unwrap());

    assert_eq!(backend.bind_count(), 1);
    let (_, slot) = backend.binds().next().unwrap();
    assert_eq!(slot, texture_slot(2));
    assert_eq!(guard.last_bound(texture_slot(2)), Some(id));
}
