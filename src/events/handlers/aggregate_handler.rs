// events/handlers/aggregate_handler.rs
//
// Keeps the aggregate cache honest.
//
// Every tree or media event names the ancestor chains whose counts it
// changed; those entries (and any removed nodes) are dropped from the
// cache. Content and meta events do not touch counts.

use std::sync::Arc;

use crate::events::types::{MediaAttached, MediaDetached, NodeCreated, NodeDeleted, NodeMoved};
use crate::events::EventBus;
use crate::services::AggregateService;

/// Registers cache invalidation handlers with the event bus.
pub fn register_aggregate_handlers(bus: &EventBus, service: Arc<AggregateService>) {
    let created = Arc::clone(&service);
    bus.subscribe::<NodeCreated, _>(move |event| {
        created.invalidate(event.ancestor_ids.iter().copied());
    });

    let moved = Arc::clone(&service);
    bus.subscribe::<NodeMoved, _>(move |event| {
        moved.invalidate(
            event
                .old_ancestor_ids
                .iter()
                .chain(event.new_ancestor_ids.iter())
                .copied()
                .chain(std::iter::once(event.node_id)),
        );
    });

    let deleted = Arc::clone(&service);
    bus.subscribe::<NodeDeleted, _>(move |event| {
        deleted.invalidate(
            event
                .ancestor_ids
                .iter()
                .chain(event.removed_ids.iter())
                .copied(),
        );
    });

    let attached = Arc::clone(&service);
    bus.subscribe::<MediaAttached, _>(move |event| {
        attached.invalidate(
            event
                .ancestor_ids
                .iter()
                .copied()
                .chain(std::iter::once(event.node_id)),
        );
    });

    let detached = service;
    bus.subscribe::<MediaDetached, _>(move |event| {
        detached.invalidate(
            event
                .ancestor_ids
                .iter()
                .copied()
                .chain(std::iter::once(event.node_id)),
        );
    });

    log::debug!("aggregate cache handlers registered");
}
