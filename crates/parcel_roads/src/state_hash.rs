//! Deterministic hashing of the resolver's externally visible state.
//!
//! Computes a 64-bit hash after every commit, stored in the
//! `ConnectionStateHash` resource. The hash covers, in a fixed order:
//!
//! 1. Every parcel sorted by entity: front road, curve position (f32 → bits),
//!    side roads and flags
//! 2. Every eligible road sorted by entity: its connected-parcels buffer in
//!    stored order
//! 3. Every warning icon in `WarningIcons` iteration order
//!
//! Two runs over the same inputs must produce the same hash, and a cycle
//! with nothing to do must leave it unchanged.

use std::hash::{Hash, Hasher};

use bevy::prelude::*;

use crate::connection::RoadConnectionStats;
use crate::icons::WarningIcons;
use crate::parcel::Parcel;
use crate::road::ConnectedParcels;
use crate::ParcelRoadSet;

/// Hash of the connection state at the end of the latest cycle.
#[derive(Resource, Default, Clone, Debug)]
pub struct ConnectionStateHash {
    /// Resolver cycle at which this hash was computed.
    pub cycle: u64,
    /// The 64-bit FNV-1a hash of connection state.
    pub hash: u64,
}

// ---------------------------------------------------------------------------
// FNV-1a hasher (deterministic, no random seed)
// ---------------------------------------------------------------------------

/// A simple FNV-1a hasher that produces deterministic output regardless of
/// platform or Rust version. Unlike `DefaultHasher`, this is not randomized.
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001B3;

    fn new() -> Self {
        Self {
            state: Self::FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

fn hash_entity(entity: Option<Entity>, hasher: &mut Fnv1aHasher) {
    entity.map(Entity::to_bits).hash(hasher);
}

/// Compute the connection-state hash.
///
/// Inputs may be in any order; they are sorted by entity here.
pub fn compute_connection_hash(
    parcels: &[(Entity, &Parcel)],
    roads: &[(Entity, &ConnectedParcels)],
    icons: &WarningIcons,
) -> u64 {
    let mut hasher = Fnv1aHasher::new();

    // 1. Parcels
    let mut parcels = parcels.to_vec();
    parcels.sort_unstable_by_key(|(entity, _)| *entity);
    for (entity, parcel) in parcels {
        entity.to_bits().hash(&mut hasher);
        hash_entity(parcel.road_edge, &mut hasher);
        parcel.curve_position.to_bits().hash(&mut hasher);
        hash_entity(parcel.left_road, &mut hasher);
        hash_entity(parcel.right_road, &mut hasher);
        parcel.flags.bits().hash(&mut hasher);
    }

    // 2. Road buffers
    let mut roads = roads.to_vec();
    roads.sort_unstable_by_key(|(entity, _)| *entity);
    for (entity, connected) in roads {
        entity.to_bits().hash(&mut hasher);
        connected.0.len().hash(&mut hasher);
        for parcel in &connected.0 {
            parcel.to_bits().hash(&mut hasher);
        }
    }

    // 3. Icons
    for (entity, kind, anchor) in icons.iter() {
        entity.to_bits().hash(&mut hasher);
        kind.hash(&mut hasher);
        anchor.to_array().map(f32::to_bits).hash(&mut hasher);
    }

    hasher.finish()
}

// ---------------------------------------------------------------------------
// ECS system
// ---------------------------------------------------------------------------

fn update_connection_hash(
    stats: Res<RoadConnectionStats>,
    icons: Res<WarningIcons>,
    parcels: Query<(Entity, &Parcel)>,
    roads: Query<(Entity, &ConnectedParcels)>,
    mut state_hash: ResMut<ConnectionStateHash>,
) {
    let parcels: Vec<_> = parcels.iter().collect();
    let roads: Vec<_> = roads.iter().collect();
    state_hash.cycle = stats.cycles;
    state_hash.hash = compute_connection_hash(&parcels, &roads, &icons);
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct StateHashPlugin;

impl Plugin for StateHashPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConnectionStateHash>().add_systems(
            FixedUpdate,
            update_connection_hash.in_set(ParcelRoadSet::Index),
        );
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
