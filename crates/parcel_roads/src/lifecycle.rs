//! Change markers supplied by the host, and their end-of-cycle cleanup.
//!
//! The host tags entities touched since the last cycle with [`Created`],
//! [`Updated`] or [`Deleted`]. The resolver reads these markers, and
//! [`clear_change_markers`] consumes them once every stage has run, so each
//! cycle only sees fresh changes.

use bevy::prelude::*;
use bitflags::bitflags;

/// Entity was spawned since the previous cycle.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Created;

/// Entity was modified since the previous cycle.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Updated;

/// Entity is pending removal. It is despawned during cleanup.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Deleted;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TempFlags: u8 {
        const CREATE = 1 << 0;
        const MODIFY = 1 << 1;
        const DELETE = 1 << 2;
    }
}

/// Provisional entity, e.g. a parcel being dragged by a placement tool.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Temp {
    pub flags: TempFlags,
}

impl Temp {
    pub fn new(flags: TempFlags) -> Self {
        Self { flags }
    }

    /// Whether this provisional entity represents a pending create or modify
    /// that the resolver should evaluate.
    pub fn wants_evaluation(&self) -> bool {
        self.flags.intersects(TempFlags::CREATE | TempFlags::MODIFY)
    }
}

/// Strip `Created`/`Updated` markers and despawn `Deleted` entities.
pub fn clear_change_markers(
    mut commands: Commands,
    created: Query<Entity, With<Created>>,
    updated: Query<Entity, With<Updated>>,
    deleted: Query<Entity, With<Deleted>>,
) {
    for entity in &created {
        commands.entity(entity).remove::<Created>();
    }
    for entity in &updated {
        commands.entity(entity).remove::<Updated>();
    }
    let mut despawned = 0usize;
    for entity in &deleted {
        commands.entity(entity).despawn();
        despawned += 1;
    }
    if despawned > 0 {
        trace!("lifecycle: despawned {despawned} deleted entities");
    }
}
