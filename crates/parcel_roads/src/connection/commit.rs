//! Commit stage: apply resolved work items to parcels, road buffers and
//! warning icons.
//!
//! Runs single-threaded over the work list in ascending parcel order. The
//! decision logic lives in [`apply_update`], written against
//! [`CommitTarget`] so it can be driven without an `App`.

use bevy::prelude::*;

use super::types::{ParcelConnectionChanged, RoadConnectionQueue, RoadConnectionStats, UpdateData};
use crate::icons::{IconChanged, WarningIconKind, WarningIcons};
use crate::lifecycle::{Created, Temp};
use crate::parcel::{Parcel, ParcelFlags};
use crate::road::ConnectedParcels;

/// Connection state of a parcel as seen by the commit stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParcelState {
    pub road_edge: Option<Entity>,
    pub curve_position: f32,
    pub left_road: Option<Entity>,
    pub right_road: Option<Entity>,
    pub flags: ParcelFlags,
    /// Spawned this cycle.
    pub created: bool,
    /// Provisional placement preview.
    pub temp: bool,
}

impl ParcelState {
    pub fn from_parcel(parcel: &Parcel, created: bool, temp: bool) -> Self {
        Self {
            road_edge: parcel.road_edge,
            curve_position: parcel.curve_position,
            left_road: parcel.left_road,
            right_road: parcel.right_road,
            flags: parcel.flags,
            created,
            temp,
        }
    }

    fn derived_flags(&self) -> ParcelFlags {
        ParcelFlags::from_roads(self.road_edge, self.left_road, self.right_road)
    }
}

/// Mutable state the commit stage writes to.
pub trait CommitTarget {
    fn parcel_state(&self, parcel: Entity) -> Option<ParcelState>;
    /// Store the road fields of `state` on the parcel.
    fn write_parcel(&mut self, parcel: Entity, state: &ParcelState);
    /// List `parcel` on `road`'s connected-parcels buffer.
    fn attach(&mut self, road: Entity, parcel: Entity);
    /// Remove `parcel` from `road`'s buffer if the road is still alive.
    fn detach(&mut self, road: Entity, parcel: Entity);
    /// Show the no-road icon at `anchor`, or clear it when `None`.
    fn set_no_road_icon(&mut self, parcel: Entity, anchor: Option<Vec3>);
    /// Downstream notification that a parcel's connection changed.
    fn mark_dirty(&mut self, change: ParcelConnectionChanged);
}

/// Apply one work item.
pub fn apply_update<T: CommitTarget>(
    target: &mut T,
    item: &UpdateData,
    stats: &mut RoadConnectionStats,
) {
    let parcel = item.parcel;

    if item.deleted {
        if let Some(road) = target.parcel_state(parcel).and_then(|s| s.road_edge) {
            target.detach(road, parcel);
        }
        target.set_no_road_icon(parcel, None);
        return;
    }
    if item.missing_data {
        return;
    }
    let Some(before) = target.parcel_state(parcel) else {
        stats.skipped_missing_data += 1;
        return;
    };

    let mut state = before;
    let new_road = item.front.map(|access| access.road);
    let new_curve = item.front.map_or(0.0, |access| access.curve_position);

    if new_road != before.road_edge || before.created {
        state.road_edge = new_road;
        state.curve_position = new_curve;
        if !before.temp {
            if let Some(old) = before.road_edge {
                target.detach(old, parcel);
            }
            if let Some(road) = new_road {
                target.attach(road, parcel);
                target.set_no_road_icon(parcel, None);
            } else {
                target.set_no_road_icon(parcel, Some(item.front_access));
            }
            match (before.road_edge, new_road) {
                (None, Some(_)) => stats.connected += 1,
                (Some(_), None) => stats.disconnected += 1,
                (Some(a), Some(b)) if a != b => stats.reassigned += 1,
                _ => {}
            }
        }
    } else if new_road.is_some() && before.curve_position != new_curve {
        state.curve_position = new_curve;
        stats.curve_updates += 1;
    }

    state.left_road = item.left.map(|access| access.road);
    state.right_road = item.right.map(|access| access.road);
    state.flags = state.derived_flags();

    if state != before {
        target.write_parcel(parcel, &state);
        if !state.temp {
            target.mark_dirty(ParcelConnectionChanged {
                parcel,
                previous: before.road_edge,
                current: state.road_edge,
                curve_position: state.curve_position,
            });
        }
    }

    if !state.temp && state.road_edge.is_none() {
        target.set_no_road_icon(parcel, Some(item.front_access));
    }
}

pub type CommitParcelData = (&'static mut Parcel, Has<Created>, Option<&'static Temp>);

/// ECS-backed [`CommitTarget`]. Events are buffered and sent once the whole
/// work list has been applied.
struct WorldCommit<'a, 'pw, 'ps, 'rw, 'rs> {
    parcels: &'a mut Query<'pw, 'ps, CommitParcelData>,
    roads: &'a mut Query<'rw, 'rs, &'static mut ConnectedParcels>,
    icons: &'a mut WarningIcons,
    icon_events: Vec<IconChanged>,
    changes: Vec<ParcelConnectionChanged>,
}

impl CommitTarget for WorldCommit<'_, '_, '_, '_, '_> {
    fn parcel_state(&self, parcel: Entity) -> Option<ParcelState> {
        let (data, created, temp) = self.parcels.get(parcel).ok()?;
        Some(ParcelState::from_parcel(data, created, temp.is_some()))
    }

    fn write_parcel(&mut self, parcel: Entity, state: &ParcelState) {
        let Ok((mut data, _, _)) = self.parcels.get_mut(parcel) else {
            return;
        };
        data.road_edge = state.road_edge;
        data.curve_position = state.curve_position;
        data.left_road = state.left_road;
        data.right_road = state.right_road;
        data.flags = state.flags;
    }

    fn attach(&mut self, road: Entity, parcel: Entity) {
        match self.roads.get_mut(road) {
            Ok(mut connected) => connected.add(parcel),
            Err(_) => warn!("road connections: road {road} vanished before {parcel} could attach"),
        }
    }

    fn detach(&mut self, road: Entity, parcel: Entity) {
        if let Ok(mut connected) = self.roads.get_mut(road) {
            connected.remove(parcel);
        }
    }

    fn set_no_road_icon(&mut self, parcel: Entity, anchor: Option<Vec3>) {
        let kind = WarningIconKind::NoRoadAccess;
        let changed = match anchor {
            Some(anchor) => self.icons.add(parcel, kind, anchor),
            None => self.icons.remove(parcel, kind),
        };
        if changed {
            self.icon_events.push(IconChanged {
                entity: parcel,
                kind,
                anchor,
            });
        }
    }

    fn mark_dirty(&mut self, change: ParcelConnectionChanged) {
        self.changes.push(change);
    }
}

/// Apply every work item of this cycle in order.
pub fn commit_road_connections(
    queue: Res<RoadConnectionQueue>,
    mut stats: ResMut<RoadConnectionStats>,
    mut icons: ResMut<WarningIcons>,
    mut icon_events: EventWriter<IconChanged>,
    mut changes: EventWriter<ParcelConnectionChanged>,
    mut parcels: Query<CommitParcelData>,
    mut roads: Query<&'static mut ConnectedParcels>,
) {
    if queue.items.is_empty() {
        return;
    }
    let mut target = WorldCommit {
        parcels: &mut parcels,
        roads: &mut roads,
        icons: &mut icons,
        icon_events: Vec::new(),
        changes: Vec::new(),
    };
    for item in &queue.items {
        apply_update(&mut target, item, &mut stats);
    }
    icon_events.send_batch(target.icon_events);
    changes.send_batch(target.changes);

    debug!(
        "road connections: cycle {} evaluated {} parcels ({} queued)",
        stats.cycles,
        stats.unique,
        stats.queued,
    );
    debug!(
        "road connections: {} connected, {} disconnected, {} reassigned, {} curve updates",
        stats.connected,
        stats.disconnected,
        stats.reassigned,
        stats.curve_updates,
    );
}
