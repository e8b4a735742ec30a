//! # TestWorld: headless integration test harness for the road resolver
//!
//! Wraps `bevy::app::App` + `ParcelRoadsPlugin` so integration tests can
//! spawn roads and parcels, drive whole resolver cycles and assert on the
//! resulting ECS state without a window or renderer.

mod assertions;
mod queries;
mod spawning;

use bevy::app::App;
use bevy::prelude::*;

use crate::params::ParcelRoadParams;
use crate::ParcelRoadsPlugin;

/// A headless Bevy App wrapping `ParcelRoadsPlugin` for integration testing.
///
/// Spawn entities through the helper methods (which attach the lifecycle
/// markers the resolver expects), then call `tick()` to run cycles and
/// query/assert on the results.
pub struct TestWorld {
    app: App,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty world with default resolver parameters.
    pub fn new() -> Self {
        Self::with_params(ParcelRoadParams::default())
    }

    /// An empty world with the given resolver parameters.
    pub fn with_params(params: ParcelRoadParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Insert BEFORE the plugin so init_resource keeps these.
        app.insert_resource(params);
        app.add_plugins(ParcelRoadsPlugin);

        // Run one update so Startup systems execute.
        app.update();

        Self { app }
    }

    /// Access the ECS world mutably (needed for queries in Bevy).
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }
}
