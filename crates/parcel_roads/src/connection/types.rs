use bevy::prelude::*;

/// Best road found for one access point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessResult {
    pub road: Entity,
    /// Horizontal distance from the access point to the road geometry.
    pub distance: f32,
    /// Parameter of the nearest point on the road's middle curve.
    pub curve_position: f32,
    /// World position of that nearest point.
    pub curve_point: Vec3,
}

/// Per-parcel work item. Lives for one cycle only.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateData {
    pub parcel: Entity,
    /// World position of the front access point, used as the icon anchor.
    pub front_access: Vec3,
    pub front: Option<AccessResult>,
    pub left: Option<AccessResult>,
    pub right: Option<AccessResult>,
    pub deleted: bool,
    /// Search could not read the parcel's own data this cycle.
    pub missing_data: bool,
}

impl UpdateData {
    pub fn new(parcel: Entity) -> Self {
        Self {
            parcel,
            front_access: Vec3::ZERO,
            front: None,
            left: None,
            right: None,
            deleted: false,
            missing_data: false,
        }
    }
}

/// Cycle-scoped work lists handed from stage to stage.
#[derive(Resource, Debug, Default)]
pub struct RoadConnectionQueue {
    /// Parcels needing re-evaluation. May hold duplicates until dedup.
    pub collected: Vec<Entity>,
    /// Eligible road edges created or updated this cycle. They may not be in
    /// the road search tree yet, so search checks them explicitly.
    pub updated_roads: Vec<Entity>,
    /// One work item per unique parcel, in ascending entity order.
    pub items: Vec<UpdateData>,
}

impl RoadConnectionQueue {
    pub fn clear(&mut self) {
        self.collected.clear();
        self.updated_roads.clear();
        self.items.clear();
    }
}

/// Counters for the most recent resolver cycle.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct RoadConnectionStats {
    pub cycles: u64,
    /// Parcel entries collected, duplicates included.
    pub queued: usize,
    /// Work items after dedup.
    pub unique: usize,
    /// Parcels that went from no road to a road.
    pub connected: usize,
    /// Parcels that lost their road.
    pub disconnected: usize,
    /// Parcels moved from one road to another.
    pub reassigned: usize,
    /// Parcels whose road stayed the same but whose curve position moved.
    pub curve_updates: usize,
    /// Items or candidates skipped because component data was missing.
    pub skipped_missing_data: usize,
}

impl RoadConnectionStats {
    /// Reset the per-cycle counters, keeping the cycle count.
    pub fn begin_cycle(&mut self) {
        *self = Self {
            cycles: self.cycles + 1,
            ..Default::default()
        };
    }
}

/// Sent whenever commit changes a parcel's front road or curve position.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ParcelConnectionChanged {
    pub parcel: Entity,
    pub previous: Option<Entity>,
    pub current: Option<Entity>,
    pub curve_position: f32,
}
