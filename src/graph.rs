use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

use crate::element::{Edge, Node};
use crate::events::{EventBus, GraphEvent};
use crate::geometry::Rect;
use crate::model::{Direction, EdgeModel, GraphModel, NodeModel};

/// Structural errors raised while assembling a graph. Once elements are in
/// the graph, operations degrade (empty unions, filtered edges) instead of
/// erroring.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate element id '{0}'")]
    DuplicateId(String),
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("edge '{id}' references unknown node '{node}'")]
    DanglingEdge { id: String, node: String },
    #[error("node '{id}' cannot be parented under its own descendant '{parent}'")]
    CyclicParent { id: String, parent: String },
}

/// An edge with both endpoints resolved to currently visible nodes. Edges
/// into a collapsed group's interior are redirected to the group itself.
#[derive(Debug, Clone)]
pub struct RoutableEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// The root container of one topology view. Owns every node and edge,
/// the graph-scoped event bus, and the lazily cached group bounds.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
    order: Vec<String>,
    edges: Vec<Edge>,
    direction: Direction,
    events: EventBus,
    // Dirty-flag cache for expanded-group bounds; cleared wholesale on any
    // bounds or structure mutation and recomputed on read.
    group_bounds_cache: RefCell<HashMap<String, Rect>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a model document. Parent references may appear in
    /// any order; dangling parents and edge endpoints are load-time errors.
    pub fn from_model(model: &GraphModel) -> Result<Self, GraphError> {
        let mut graph = Graph::new();
        graph.direction = model.direction;

        for node_model in &model.nodes {
            if graph.nodes.contains_key(&node_model.id) {
                return Err(GraphError::DuplicateId(node_model.id.clone()));
            }
            let mut node = Node::new(node_model.id.clone());
            apply_node_model(&mut node, node_model);
            graph.order.push(node.id.clone());
            graph.nodes.insert(node.id.clone(), node);
        }

        // Second pass: wire parents once every node exists.
        for node_model in &model.nodes {
            if let Some(parent_id) = &node_model.parent {
                if !graph.nodes.contains_key(parent_id) {
                    return Err(GraphError::UnknownElement(parent_id.clone()));
                }
                if graph.creates_cycle(&node_model.id, parent_id) {
                    return Err(GraphError::CyclicParent {
                        id: node_model.id.clone(),
                        parent: parent_id.clone(),
                    });
                }
                graph.attach_child(parent_id, &node_model.id);
            }
        }

        for edge_model in &model.edges {
            let source = edge_model
                .source
                .clone()
                .ok_or_else(|| GraphError::DanglingEdge {
                    id: edge_model.id.clone(),
                    node: "<missing source>".into(),
                })?;
            let target = edge_model
                .target
                .clone()
                .ok_or_else(|| GraphError::DanglingEdge {
                    id: edge_model.id.clone(),
                    node: "<missing target>".into(),
                })?;
            let mut edge = Edge::new(edge_model.id.clone(), source, target);
            apply_edge_model(&mut edge, edge_model);
            graph.add_edge(edge)?;
        }

        Ok(graph)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id.clone()));
        }
        if let Some(parent) = node.parent().map(str::to_owned) {
            if !self.nodes.contains_key(&parent) {
                return Err(GraphError::UnknownElement(parent));
            }
            let id = node.id.clone();
            self.order.push(id.clone());
            self.nodes.insert(id.clone(), node);
            self.attach_child(&parent, &id);
        } else {
            self.order.push(node.id.clone());
            self.nodes.insert(node.id.clone(), node);
        }
        self.touch();
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edges.iter().any(|existing| existing.id == edge.id) {
            return Err(GraphError::DuplicateId(edge.id.clone()));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::DanglingEdge {
                    id: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Removes a node, its entire subtree, and every incident edge. Children
    /// are exclusively owned by their parent, so nothing survives detached.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        let mut doomed = vec![id.to_string()];
        let mut index = 0;
        while index < doomed.len() {
            if let Some(node) = self.nodes.get(&doomed[index]) {
                doomed.extend(node.children.iter().cloned());
            }
            index += 1;
        }

        if let Some(parent_id) = self.nodes.get(id).and_then(|n| n.parent().map(str::to_owned)) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|child| child != id);
            }
        }

        for dead in &doomed {
            self.nodes.remove(dead);
        }
        self.order.retain(|node_id| !doomed.contains(node_id));
        self.edges
            .retain(|edge| !doomed.contains(&edge.source) && !doomed.contains(&edge.target));
        self.touch();
        true
    }

    pub fn remove_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.id != id);
        before != self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn set_edge_bend_points(&mut self, id: &str, points: Vec<crate::geometry::Point>) {
        if let Some(edge) = self.edges.iter_mut().find(|edge| edge.id == id) {
            edge.set_bend_points(points);
        }
    }

    /// Child nodes visible under `id`. A collapsed group hides its node
    /// children entirely; their edges are redirected to the group via
    /// [`Graph::visible_endpoint`].
    pub fn children(&self, id: &str) -> Vec<&Node> {
        match self.nodes.get(id) {
            Some(node) if !node.collapsed => node
                .children
                .iter()
                .filter_map(|child| self.nodes.get(child))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// True when any ancestor of `id` is a collapsed group.
    pub fn is_hidden(&self, id: &str) -> bool {
        let mut current = self.nodes.get(id).and_then(|node| node.parent());
        while let Some(parent_id) = current {
            match self.nodes.get(parent_id) {
                Some(parent) => {
                    if parent.collapsed {
                        return true;
                    }
                    current = parent.parent();
                }
                None => break,
            }
        }
        false
    }

    /// Resolves the node an edge endpoint should actually route to: the
    /// outermost collapsed ancestor when the endpoint is hidden, the node
    /// itself otherwise. `None` when the id is unknown.
    pub fn visible_endpoint(&self, id: &str) -> Option<String> {
        self.nodes.get(id)?;
        let mut result = id.to_string();
        let mut current = self.nodes.get(id).and_then(|node| node.parent());
        while let Some(parent_id) = current {
            let parent = self.nodes.get(parent_id)?;
            if parent.collapsed {
                result = parent_id.to_string();
            }
            current = parent.parent();
        }
        Some(result)
    }

    /// Ids of every node the layouts position directly: visible leaves and
    /// visible collapsed groups.
    pub fn visible_leaves(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .map_or(false, |node| node.is_positioned() && !self.is_hidden(id))
            })
            .cloned()
            .collect()
    }

    /// Edges with both endpoints resolved to visible nodes. Edges whose
    /// endpoints vanish (unknown ids) or collapse onto the same group are
    /// silently dropped, never errors.
    pub fn routable_edges(&self) -> Vec<RoutableEdge> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let source = self.visible_endpoint(&edge.source)?;
                let target = self.visible_endpoint(&edge.target)?;
                if source == target {
                    return None;
                }
                Some(RoutableEdge {
                    id: edge.id.clone(),
                    source,
                    target,
                })
            })
            .collect()
    }

    pub fn set_node_bounds(&mut self, id: &str, bounds: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.bounds = bounds;
            self.touch();
        }
    }

    pub fn translate_node(&mut self, id: &str, dx: f32, dy: f32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.bounds.translate(dx, dy);
            self.touch();
        }
    }

    /// Padded union of the descendant leaf bounds of an expanded group,
    /// cached until the next mutation. Leaves and collapsed groups report
    /// their own bounds; a childless group falls back to its own bounds.
    pub fn group_bounds(&self, id: &str) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return Rect::default();
        };
        if node.is_positioned() {
            return node.bounds;
        }
        if let Some(cached) = self.group_bounds_cache.borrow().get(id) {
            return *cached;
        }

        let mut union = Rect::default();
        self.accumulate_leaf_bounds(id, &mut union);
        let bounds = if union.is_empty() {
            node.bounds
        } else {
            *union.padding(node.group_padding)
        };
        self.group_bounds_cache
            .borrow_mut()
            .insert(id.to_string(), bounds);
        bounds
    }

    fn accumulate_leaf_bounds(&self, id: &str, union: &mut Rect) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        for child_id in &node.children {
            if let Some(child) = self.nodes.get(child_id) {
                if child.is_positioned() {
                    union.union(&child.bounds);
                } else {
                    self.accumulate_leaf_bounds(child_id, union);
                }
            }
        }
    }

    /// The bounds the rest of the system should treat as this node's extent:
    /// derived for expanded groups, stored for everything else.
    pub fn effective_bounds(&self, id: &str) -> Rect {
        match self.nodes.get(id) {
            Some(node) if !node.is_positioned() => self.group_bounds(id),
            Some(node) => node.bounds,
            None => Rect::default(),
        }
    }

    /// Union of every root element's effective bounds.
    pub fn bounds(&self) -> Rect {
        let mut union = Rect::default();
        for id in &self.order {
            if let Some(node) = self.nodes.get(id) {
                if node.parent().is_none() {
                    union.union(&self.effective_bounds(id));
                }
            }
        }
        union
    }

    /// Toggles a group's collapsed state, preserving its effective center so
    /// the surrounding layout does not jump. No-op (and no event) when the
    /// state already matches.
    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.collapsed == collapsed || !node.group {
            return;
        }

        let old_center = self.effective_bounds(id).center();

        if collapsed {
            // The group becomes a leaf-sized stand-in centered where the
            // expanded bounds were. Hidden children keep their coordinates.
            let node = self.nodes.get_mut(id).expect("checked above");
            node.collapsed = true;
            node.bounds.set_center(old_center.x, old_center.y);
            self.touch();
        } else {
            self.nodes.get_mut(id).expect("checked above").collapsed = false;
            self.touch();
            let new_center = self.effective_bounds(id).center();
            let dx = old_center.x - new_center.x;
            let dy = old_center.y - new_center.y;
            if dx != 0.0 || dy != 0.0 {
                self.translate_subtree(id, dx, dy);
            }
        }

        self.events.emit(GraphEvent::CollapseChanged {
            node: id.to_string(),
            collapsed,
        });
    }

    fn translate_subtree(&mut self, id: &str, dx: f32, dy: f32) {
        let children: Vec<String> = self
            .nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child_id in children {
            if let Some(child) = self.nodes.get_mut(&child_id) {
                if child.is_positioned() {
                    child.bounds.translate(dx, dy);
                } else {
                    self.translate_subtree(&child_id, dx, dy);
                    continue;
                }
            }
            // Collapsed groups still carry hidden children that must follow.
            self.translate_subtree(&child_id, dx, dy);
        }
        self.touch();
    }

    /// Merges a partial node model: only fields present in the model are
    /// applied, so patching one property never resets its neighbors.
    /// Collapse changes route through [`Graph::set_collapsed`] to keep the
    /// center-preservation and notification semantics.
    pub fn set_node_model(&mut self, model: &NodeModel) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&model.id) {
            return Err(GraphError::UnknownElement(model.id.clone()));
        }

        if let Some(parent_id) = &model.parent {
            if !self.nodes.contains_key(parent_id) {
                return Err(GraphError::UnknownElement(parent_id.clone()));
            }
            let old_parent = self
                .nodes
                .get(&model.id)
                .and_then(|node| node.parent().map(str::to_owned));
            if old_parent.as_deref() != Some(parent_id.as_str()) {
                if self.creates_cycle(&model.id, parent_id) {
                    return Err(GraphError::CyclicParent {
                        id: model.id.clone(),
                        parent: parent_id.clone(),
                    });
                }
                if let Some(old_parent) = old_parent {
                    if let Some(parent) = self.nodes.get_mut(&old_parent) {
                        parent.children.retain(|child| child != &model.id);
                    }
                }
                self.attach_child(parent_id, &model.id);
            }
        }

        let collapsed = model.collapsed;
        {
            let node = self.nodes.get_mut(&model.id).expect("checked above");
            apply_node_geometry(node, model);
            if let Some(label) = &model.label {
                node.label = label.clone();
            }
            if let Some(type_name) = &model.type_name {
                node.type_name = type_name.clone();
            }
            if let Some(shape) = model.shape {
                node.shape = shape;
            }
            if let Some(group) = model.group {
                node.group = group;
            }
            if let Some(padding) = model.padding {
                node.group_padding = padding;
            }
        }
        self.touch();

        if let Some(collapsed) = collapsed {
            self.set_collapsed(&model.id, collapsed);
        }
        Ok(())
    }

    pub fn set_edge_model(&mut self, model: &EdgeModel) -> Result<(), GraphError> {
        for endpoint in [&model.source, &model.target] {
            if let Some(endpoint) = endpoint {
                if !self.nodes.contains_key(endpoint) {
                    return Err(GraphError::DanglingEdge {
                        id: model.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }
        let Some(edge) = self.edges.iter_mut().find(|edge| edge.id == model.id) else {
            return Err(GraphError::UnknownElement(model.id.clone()));
        };
        apply_edge_model(edge, model);
        Ok(())
    }

    /// True when making `parent_id` the parent of `id` would close a parent
    /// cycle. Every ancestor walk in the crate relies on parent chains
    /// terminating, so cycles must be rejected before they are wired.
    fn creates_cycle(&self, id: &str, parent_id: &str) -> bool {
        let mut current = Some(parent_id.to_string());
        while let Some(ancestor) = current {
            if ancestor == id {
                return true;
            }
            current = self
                .nodes
                .get(&ancestor)
                .and_then(|node| node.parent().map(str::to_owned));
        }
        false
    }

    fn attach_child(&mut self, parent_id: &str, child_id: &str) {
        if let Some(node) = self.nodes.get_mut(child_id) {
            node.parent = Some(parent_id.to_string());
        }
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            if !parent.children.iter().any(|child| child == child_id) {
                parent.children.push(child_id.to_string());
            }
        }
    }

    fn touch(&mut self) {
        self.group_bounds_cache.borrow_mut().clear();
    }
}

fn apply_node_model(node: &mut Node, model: &NodeModel) {
    apply_node_geometry(node, model);
    if let Some(label) = &model.label {
        node.label = label.clone();
    }
    if let Some(type_name) = &model.type_name {
        node.type_name = type_name.clone();
    }
    if let Some(shape) = model.shape {
        node.shape = shape;
    }
    if let Some(group) = model.group {
        node.group = group;
    }
    if let Some(collapsed) = model.collapsed {
        node.collapsed = collapsed;
    }
    if let Some(padding) = model.padding {
        node.group_padding = padding;
    }
}

fn apply_node_geometry(node: &mut Node, model: &NodeModel) {
    if let Some(x) = model.x {
        node.bounds.x = x;
    }
    if let Some(y) = model.y {
        node.bounds.y = y;
    }
    if let Some(width) = model.width {
        node.bounds.width = width;
    }
    if let Some(height) = model.height {
        node.bounds.height = height;
    }
}

fn apply_edge_model(edge: &mut Edge, model: &EdgeModel) {
    if let Some(source) = &model.source {
        edge.source = source.clone();
    }
    if let Some(target) = &model.target {
        edge.target = target.clone();
    }
    if let Some(label) = &model.label {
        edge.label = label.clone();
    }
    if let Some(type_name) = &model.type_name {
        edge.type_name = type_name.clone();
    }
    if !model.bend_points.is_empty() {
        edge.set_bend_points(model.bend_points.clone());
    }
}
