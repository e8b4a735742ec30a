//! Warning icons anchored on entities.
//!
//! The resolver raises a `NoRoadAccess` icon on every parcel left without a
//! front road and clears it once a road is found. `WarningIcons` is the
//! authoritative set; `IconChanged` events let presentation layers follow it
//! without polling.

use std::collections::BTreeMap;

use bevy::prelude::*;

/// Kinds of warning icon this crate raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningIconKind {
    /// Parcel has no road within reach of its front access point.
    NoRoadAccess,
}

/// Sent when an icon appears, moves or disappears. `anchor` is `None` on
/// removal.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct IconChanged {
    pub entity: Entity,
    pub kind: WarningIconKind,
    pub anchor: Option<Vec3>,
}

/// Active warning icons keyed by entity and kind, iterated in a
/// deterministic order.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct WarningIcons {
    icons: BTreeMap<(Entity, WarningIconKind), Vec3>,
}

impl WarningIcons {
    /// Show `kind` on `entity` at `anchor`. Returns true if the icon was
    /// added or moved.
    pub fn add(&mut self, entity: Entity, kind: WarningIconKind, anchor: Vec3) -> bool {
        self.icons.insert((entity, kind), anchor) != Some(anchor)
    }

    /// Returns true if an icon was removed.
    pub fn remove(&mut self, entity: Entity, kind: WarningIconKind) -> bool {
        self.icons.remove(&(entity, kind)).is_some()
    }

    pub fn get(&self, entity: Entity, kind: WarningIconKind) -> Option<Vec3> {
        self.icons.get(&(entity, kind)).copied()
    }

    pub fn contains(&self, entity: Entity, kind: WarningIconKind) -> bool {
        self.icons.contains_key(&(entity, kind))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, WarningIconKind, Vec3)> + '_ {
        self.icons
            .iter()
            .map(|(&(entity, kind), &anchor)| (entity, kind, anchor))
    }

    /// Entities currently showing `kind`, ascending.
    pub fn entities_with(&self, kind: WarningIconKind) -> Vec<Entity> {
        self.iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(entity, _, _)| entity)
            .collect()
    }
}
