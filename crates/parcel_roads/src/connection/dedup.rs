use bevy::prelude::*;

use super::types::{RoadConnectionQueue, RoadConnectionStats, UpdateData};
use crate::lifecycle::Deleted;

/// Sort by entity and keep one entry per parcel.
pub fn dedup_parcels(parcels: &mut Vec<Entity>) {
    parcels.sort_unstable();
    parcels.dedup();
}

/// Turn the collected parcel list into one work item per unique parcel.
pub fn dedup_connection_queue(
    mut queue: ResMut<RoadConnectionQueue>,
    mut stats: ResMut<RoadConnectionStats>,
    deleted: Query<(), With<Deleted>>,
) {
    let queue = &mut *queue;
    stats.queued = queue.collected.len();
    dedup_parcels(&mut queue.collected);
    stats.unique = queue.collected.len();

    queue.items = queue
        .collected
        .iter()
        .map(|&parcel| UpdateData {
            deleted: deleted.contains(parcel),
            ..UpdateData::new(parcel)
        })
        .collect();
}
