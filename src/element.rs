use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, AnchorEnd};
use crate::geometry::{Padding, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Rectangle,
    Ellipse,
    Stadium,
    Diamond,
}

/// A positioned element of the topology: a leaf, or a group that encloses
/// child nodes and may be collapsed down to a leaf-sized stand-in.
///
/// Bounds are mutated through [`crate::Graph`] so the group-bounds cache
/// stays coherent; everything else on the node is plain data.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    /// Renderer-selection discriminator; opaque to the layout engines.
    pub type_name: String,
    pub label: String,
    pub shape: NodeShape,
    pub(crate) bounds: Rect,
    pub(crate) group: bool,
    pub(crate) collapsed: bool,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<String>,
    pub(crate) group_padding: Padding,
    anchors: HashMap<(AnchorEnd, String), Anchor>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let mut anchors = HashMap::new();
        // The terminal fallback of the anchor resolution chain.
        anchors.insert((AnchorEnd::Both, String::new()), Anchor::Center);
        Node {
            id: id.into(),
            type_name: String::new(),
            label: String::new(),
            shape: NodeShape::Rectangle,
            bounds: Rect::default(),
            group: false,
            collapsed: false,
            parent: None,
            children: Vec::new(),
            group_padding: Padding::Uniform(crate::DEFAULT_GROUP_PADDING),
            anchors,
        }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_group(mut self, padding: Padding) -> Self {
        self.group = true;
        self.group_padding = padding;
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_group(&self) -> bool {
        self.group
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn group_padding(&self) -> Padding {
        self.group_padding
    }

    /// True when the layout positions this node directly: leaves always,
    /// groups only while collapsed. Expanded groups derive their bounds from
    /// their children instead.
    pub fn is_positioned(&self) -> bool {
        !self.group || self.collapsed
    }

    pub fn set_anchor(&mut self, end: AnchorEnd, kind: impl Into<String>, anchor: Anchor) {
        self.anchors.insert((end, kind.into()), anchor);
    }

    /// Resolves the anchor for one edge end. Fallback order: exact
    /// (end, kind), then (end, untyped), then (Both, kind) for source/target
    /// ends, then the always-registered (Both, untyped) default.
    pub fn anchor(&self, end: AnchorEnd, kind: &str) -> &Anchor {
        if let Some(anchor) = self.anchors.get(&(end, kind.to_string())) {
            return anchor;
        }
        if !kind.is_empty() {
            if let Some(anchor) = self.anchors.get(&(end, String::new())) {
                return anchor;
            }
        }
        if end != AnchorEnd::Both {
            if let Some(anchor) = self.anchors.get(&(AnchorEnd::Both, kind.to_string())) {
                return anchor;
            }
        }
        self.anchors
            .get(&(AnchorEnd::Both, String::new()))
            .expect("default anchor is registered at construction")
    }

    /// Converts a point from this node's coordinate space into its parent's.
    /// Expanded groups are pure containers and contribute no offset; getting
    /// this wrong double-applies group origins.
    pub fn translate_to_parent(&self, point: Point) -> Point {
        if self.is_positioned() {
            point.translate(self.bounds.x, self.bounds.y)
        } else {
            point
        }
    }

    pub fn translate_from_parent(&self, point: Point) -> Point {
        if self.is_positioned() {
            point.translate(-self.bounds.x, -self.bounds.y)
        } else {
            point
        }
    }
}

/// A connection between two nodes. Bend points are intermediate routing
/// coordinates between the source and target anchor locations; layouts reset
/// them on every run.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub type_name: String,
    pub label: String,
    pub source: String,
    pub target: String,
    pub(crate) bend_points: Vec<Point>,
    /// Anchor-kind overrides consulted when resolving each endpoint's
    /// anchor on the source/target node.
    pub source_anchor_kind: String,
    pub target_anchor_kind: String,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Edge {
            id: id.into(),
            type_name: String::new(),
            label: String::new(),
            source: source.into(),
            target: target.into(),
            bend_points: Vec::new(),
            source_anchor_kind: String::new(),
            target_anchor_kind: String::new(),
        }
    }

    pub fn bend_points(&self) -> &[Point] {
        &self.bend_points
    }

    pub fn set_bend_points(&mut self, points: Vec<Point>) {
        self.bend_points = points;
    }
}
