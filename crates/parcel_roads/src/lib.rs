use bevy::prelude::*;

pub mod config;
pub mod connection;
pub mod curve;
pub mod error;
pub mod icons;
pub mod lifecycle;
pub mod parcel;
pub mod parcel_geometry;
pub mod params;
pub mod road;
pub mod sets;
pub mod spatial;
pub mod state_hash;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

#[cfg(test)]
mod integration_tests;

pub use sets::ParcelRoadSet;

use crate::params::ParcelRoadParams;

/// Keeps every parcel's road references in sync with the road network.
///
/// Inserts [`ParcelRoadParams`] with defaults unless the host already
/// inserted its own.
pub struct ParcelRoadsPlugin;

impl Plugin for ParcelRoadsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ParcelRoadParams>();
        sets::configure_sets(app);

        app.add_plugins((
            connection::RoadConnectionPlugin,
            spatial::SearchTreePlugin,
            state_hash::StateHashPlugin,
        ));

        app.add_systems(
            FixedUpdate,
            lifecycle::clear_change_markers.in_set(ParcelRoadSet::Cleanup),
        );
    }
}
