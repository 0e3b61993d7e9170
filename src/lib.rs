//! Graph topology model with pluggable layout engines.
//!
//! A [`Graph`] owns nodes (leaves and collapsible groups), edges with bend
//! points, per-node edge [`Anchor`]s, and a graph-scoped [`EventBus`]. Three
//! interchangeable engines implement [`Layout`]: force-directed, layered
//! ("dagre"), and constraint-based ("cola"). [`render_svg`] produces a
//! standalone SVG snapshot of the laid-out graph.

pub mod anchor;
pub mod cli;
pub mod element;
pub mod events;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod model;
pub mod svg;
pub mod utils;

pub use anchor::{Anchor, AnchorEnd, SvgShape};
pub use element::{Edge, Node, NodeShape};
pub use events::{DragOperation, EventBus, GraphEvent, SubscriptionId};
pub use geometry::{Padding, Point, Rect};
pub use graph::{Graph, GraphError, RoutableEdge};
pub use layout::{
    ColaConfig, ColaLayout, DagreConfig, DagreLayout, ForceConfig, ForceLayout, Layout,
};
pub use model::{Direction, EdgeModel, GraphModel, NodeModel};
pub use svg::render_svg;

/// Padding applied around a group's children when no model value is given.
pub const DEFAULT_GROUP_PADDING: f32 = 10.0;

/// Whitespace kept around the rendered graph in SVG output.
pub const LAYOUT_MARGIN: f32 = 40.0;
