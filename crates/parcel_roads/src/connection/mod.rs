//! The parcel-to-road connection resolver.
//!
//! One cycle runs four stages in order: collect parcels needing
//! re-evaluation, dedup them into work items, search for the best road per
//! access point in parallel, and commit the results sequentially.

mod collect;
mod commit;
mod dedup;
mod distance;
mod lookup;
mod plugin;
mod search;
mod types;

pub use collect::{
    begin_connection_cycle, collect_parcels_near_updated_roads, collect_updated_parcels,
    detach_deleted_roads, parcels_beside_road, parcels_near_road, parcels_with_side_road,
};
pub use commit::{apply_update, commit_road_connections, CommitTarget, ParcelState};
pub use dedup::{dedup_connection_queue, dedup_parcels};
pub use distance::{check_distance, road_distance, RoadView};
pub use lookup::{ParcelLookup, RoadLookup, RoadRecord};
pub use plugin::RoadConnectionPlugin;
pub use search::{find_best_road, resolve_parcel, search_road_connections};
pub use types::{
    AccessResult, ParcelConnectionChanged, RoadConnectionQueue, RoadConnectionStats, UpdateData,
};
