//! Road edge components read by the resolver.
//!
//! A road edge is described the way the host's network renders it: a middle
//! curve, an edge body split into a start and an end half (each bounded by a
//! left and a right curve), and a joint at each end node. Joints with a
//! positive `middle_radius` are rounded and carry an extra middle curve.

use bevy::prelude::*;
use bitflags::bitflags;

use crate::curve::{left_normal, Bezier4};

bitflags! {
    /// Surface composition of a road edge or one of its sides.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompositionFlags: u8 {
        const ELEVATED = 1 << 0;
        const TUNNEL = 1 << 1;
        const RAISED = 1 << 2;
        const LOWERED = 1 << 3;
    }
}

impl CompositionFlags {
    /// Whole-edge flags that rule out any parcel connection.
    pub const BLOCKS_EDGE: CompositionFlags =
        CompositionFlags::ELEVATED.union(CompositionFlags::TUNNEL);
    /// Side flags that rule out connecting on that side.
    pub const BLOCKS_SIDE: CompositionFlags =
        CompositionFlags::RAISED.union(CompositionFlags::LOWERED);
}

/// Composition of a road edge: general flags plus per-side flags.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoadComposition {
    pub general: CompositionFlags,
    pub left: CompositionFlags,
    pub right: CompositionFlags,
}

/// Middle curve of a road edge, used for the attachment curve position.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RoadCurve(pub Bezier4);

/// Left and right boundary curves of one cross-section run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub left: Bezier4,
    pub right: Bezier4,
}

impl Segment {
    pub fn bounds_xz(&self) -> Rect {
        self.left.bounds_xz().union(self.right.bounds_xz())
    }
}

/// Body of a road edge, split in two halves at its midpoint.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub start: Segment,
    pub end: Segment,
    pub bounds: Rect,
}

/// Joint geometry where an edge meets one of its nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeometry {
    pub left: Segment,
    pub right: Segment,
    pub middle: Bezier4,
    pub middle_radius: f32,
    pub bounds: Rect,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct StartNodeGeometry(pub NodeGeometry);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct EndNodeGeometry(pub NodeGeometry);

/// Parcels whose front road is this edge. Its presence marks the edge as a
/// road parcels may connect to.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectedParcels(pub Vec<Entity>);

impl ConnectedParcels {
    /// Add `parcel` unless it is already listed.
    pub fn add(&mut self, parcel: Entity) {
        if !self.0.contains(&parcel) {
            self.0.push(parcel);
        }
    }

    /// Remove every entry for `parcel`.
    pub fn remove(&mut self, parcel: Entity) {
        self.0.retain(|&p| p != parcel);
    }

    pub fn contains(&self, parcel: Entity) -> bool {
        self.0.contains(&parcel)
    }
}

/// Union of edge and both node bounds.
pub fn road_bounds(edge: &EdgeGeometry, start: &NodeGeometry, end: &NodeGeometry) -> Rect {
    edge.bounds.union(start.bounds).union(end.bounds)
}

/// Geometry derived from a middle curve and a half width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadGeometry {
    pub curve: Bezier4,
    pub edge: EdgeGeometry,
    pub start_node: NodeGeometry,
    pub end_node: NodeGeometry,
}

impl RoadGeometry {
    /// Build edge and flat end-cap node geometry around `curve`.
    pub fn from_curve(curve: Bezier4, half_width: f32) -> Self {
        let (first, second) = curve.split(0.5);
        let start = Segment {
            left: first.offset_xz(half_width),
            right: first.offset_xz(-half_width),
        };
        let end = Segment {
            left: second.offset_xz(half_width),
            right: second.offset_xz(-half_width),
        };
        let edge = EdgeGeometry {
            start,
            end,
            bounds: start.bounds_xz().union(end.bounds_xz()),
        };
        Self {
            curve,
            edge,
            start_node: end_cap(curve.a, curve.tangent(0.0), half_width),
            end_node: end_cap(curve.d, curve.tangent(1.0), half_width),
        }
    }

    pub fn straight(from: Vec3, to: Vec3, half_width: f32) -> Self {
        Self::from_curve(Bezier4::line(from, to), half_width)
    }

    pub fn bounds_xz(&self) -> Rect {
        road_bounds(&self.edge, &self.start_node, &self.end_node)
    }
}

/// Zero-length joint across the road end at `at`.
fn end_cap(at: Vec3, tangent: Vec3, half_width: f32) -> NodeGeometry {
    let offset = left_normal(tangent) * half_width;
    let left = Bezier4::line(at + offset, at + offset);
    let centre = Bezier4::line(at, at);
    let right = Bezier4::line(at - offset, at - offset);
    NodeGeometry {
        left: Segment {
            left,
            right: centre,
        },
        right: Segment {
            left: centre,
            right,
        },
        middle: centre,
        middle_radius: 0.0,
        bounds: left.bounds_xz().union(right.bounds_xz()),
    }
}

/// Every component the resolver reads from an eligible road edge.
#[derive(Bundle)]
pub struct RoadBundle {
    pub curve: RoadCurve,
    pub edge: EdgeGeometry,
    pub start_node: StartNodeGeometry,
    pub end_node: EndNodeGeometry,
    pub composition: RoadComposition,
    pub connected: ConnectedParcels,
}

impl RoadBundle {
    pub fn new(geometry: RoadGeometry, composition: RoadComposition) -> Self {
        Self {
            curve: RoadCurve(geometry.curve),
            edge: geometry.edge,
            start_node: StartNodeGeometry(geometry.start_node),
            end_node: EndNodeGeometry(geometry.end_node),
            composition,
            connected: ConnectedParcels::default(),
        }
    }

    pub fn at_grade(geometry: RoadGeometry) -> Self {
        Self::new(geometry, RoadComposition::default())
    }
}
