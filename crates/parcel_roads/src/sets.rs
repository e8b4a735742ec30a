//! Ordering of the resolver within the `FixedUpdate` schedule.
//!
//! ```text
//! Collect  →  Dedup  →  Search  →  Commit  →  Index  →  Cleanup
//! ```
//!
//! * **Collect** – Reset the cycle, detach parcels from deleted roads, and
//!   gather parcels touched directly or by nearby road changes.
//! * **Dedup** – Sort the gathered parcels and build one work item each.
//! * **Search** – Resolve front, left and right roads for every work item on
//!   the compute task pool. Reads the search trees only.
//! * **Commit** – Apply results to parcels, road buffers and icons, one item
//!   at a time.
//! * **Index** – Bring both search trees up to date with this cycle's
//!   changes, and hash the committed state. This is the only set that writes
//!   the trees, and it runs after every set that reads them.
//! * **Cleanup** – Consume change markers and despawn deleted entities.
//!
//! Host systems that create, move or delete parcels and roads should run
//! before `Collect` and tag what they touched with the lifecycle markers.

use bevy::prelude::*;

/// Ordered phases of one resolver cycle, configured as a chain.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParcelRoadSet {
    Collect,
    Dedup,
    Search,
    Commit,
    Index,
    Cleanup,
}

pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            ParcelRoadSet::Collect,
            ParcelRoadSet::Dedup,
            ParcelRoadSet::Search,
            ParcelRoadSet::Commit,
            ParcelRoadSet::Index,
            ParcelRoadSet::Cleanup,
        )
            .chain(),
    );
}
