use bevy::prelude::*;

use super::collect::{
    begin_connection_cycle, collect_parcels_near_updated_roads, collect_updated_parcels,
    detach_deleted_roads,
};
use super::commit::commit_road_connections;
use super::dedup::dedup_connection_queue;
use super::search::search_road_connections;
use super::types::{ParcelConnectionChanged, RoadConnectionQueue, RoadConnectionStats};
use crate::icons::{IconChanged, WarningIcons};
use crate::params::fall_back_on_invalid_params;
use crate::ParcelRoadSet;

pub struct RoadConnectionPlugin;

impl Plugin for RoadConnectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadConnectionQueue>()
            .init_resource::<RoadConnectionStats>()
            .init_resource::<WarningIcons>()
            .add_event::<ParcelConnectionChanged>()
            .add_event::<IconChanged>()
            .add_systems(
                FixedUpdate,
                (
                    fall_back_on_invalid_params,
                    begin_connection_cycle,
                    detach_deleted_roads,
                    collect_updated_parcels,
                    collect_parcels_near_updated_roads,
                )
                    .chain()
                    .in_set(ParcelRoadSet::Collect),
            )
            .add_systems(
                FixedUpdate,
                dedup_connection_queue.in_set(ParcelRoadSet::Dedup),
            )
            .add_systems(
                FixedUpdate,
                search_road_connections.in_set(ParcelRoadSet::Search),
            )
            .add_systems(
                FixedUpdate,
                commit_road_connections.in_set(ParcelRoadSet::Commit),
            );
    }
}
