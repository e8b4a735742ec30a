/// World units per lot cell along either axis.
pub const CELL_SIZE: f32 = 8.0;
/// Fixed vertical extent of a parcel footprint.
pub const PARCEL_HEIGHT: f32 = 2.0;

/// Maximum distance from the front access point to an eligible road.
pub const FRONT_ACCESS_RADIUS: f32 = 8.4;
/// Maximum distance from the left/right access points to an eligible road.
pub const SIDE_ACCESS_RADIUS: f32 = 7.8;

/// Coarse samples taken along a curve before refinement.
pub const CURVE_COARSE_SAMPLES: usize = 16;
/// Refinement rounds after the coarse scan. Each round shrinks the bracket to
/// half its width, so 10 rounds give ~1e-4 precision in `t`.
pub const CURVE_REFINE_ITERATIONS: usize = 10;

/// Half extent of the quadtree root, centred on the world origin.
pub const SEARCH_TREE_HALF_EXTENT: f32 = 8192.0;
/// A quadtree node splits once it holds more than this many items.
pub const SEARCH_TREE_SPLIT_THRESHOLD: usize = 8;
/// Maximum quadtree depth (root is depth 0).
pub const SEARCH_TREE_MAX_DEPTH: u8 = 10;

/// Work items handed to a single compute task during the search stage.
pub const SEARCH_BATCH_SIZE: usize = 64;
