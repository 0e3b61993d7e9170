mod cola;
mod dagre;
mod force;

pub use cola::{ColaConfig, ColaLayout};
pub use dagre::{DagreConfig, DagreLayout};
pub use force::{ForceConfig, ForceLayout};

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use anyhow::Result;

use crate::geometry::Point;
use crate::graph::Graph;

/// The contract every layout engine satisfies: `layout` repositions the
/// graph's positioned nodes in place (resetting transient state such as bend
/// points first) and may be invoked any number of times; `destroy` releases
/// event subscriptions and is idempotent. Engines tolerate empty graphs and
/// dangling edges, keep every center finite, and never change a node's
/// dimensions.
pub trait Layout {
    fn layout(&mut self, graph: &mut Graph) -> Result<()>;
    fn destroy(&mut self);
}

/// A link fed to a physics or constraint solver: a routable edge, or a faux
/// clustering edge that is never rendered.
#[derive(Debug, Clone)]
pub(crate) struct LayoutLink {
    pub source: String,
    pub target: String,
    pub faux: bool,
}

/// Synthetic all-pairs edges between positioned siblings inside each
/// expanded group, giving force/constraint solvers a cohesion pressure
/// toward group clustering. Rebuilt from scratch per run so repeated
/// layouts never accumulate them.
pub(crate) fn faux_sibling_links(graph: &Graph) -> Vec<LayoutLink> {
    let mut links = Vec::new();
    for node in graph.nodes() {
        if !node.is_group() || node.is_collapsed() || graph.is_hidden(&node.id) {
            continue;
        }
        let siblings: Vec<&str> = graph
            .children(&node.id)
            .into_iter()
            .filter(|child| child.is_positioned())
            .map(|child| child.id.as_str())
            .collect();
        for i in 0..siblings.len() {
            for j in (i + 1)..siblings.len() {
                links.push(LayoutLink {
                    source: siblings[i].to_string(),
                    target: siblings[j].to_string(),
                    faux: true,
                });
            }
        }
    }
    links
}

/// Real links among the visible leaf set plus the faux clustering links.
pub(crate) fn solver_links(graph: &Graph, leaves: &[String]) -> Vec<LayoutLink> {
    let visible: HashSet<&str> = leaves.iter().map(String::as_str).collect();
    let mut links: Vec<LayoutLink> = graph
        .routable_edges()
        .into_iter()
        .filter(|edge| visible.contains(edge.source.as_str()) && visible.contains(edge.target.as_str()))
        .map(|edge| LayoutLink {
            source: edge.source,
            target: edge.target,
            faux: false,
        })
        .collect();
    links.extend(faux_sibling_links(graph));
    links
}

/// Whether two positioned nodes live under different direct parents; the
/// discriminator both solvers use for their cross-group distance policies.
pub(crate) fn cross_group(graph: &Graph, a: &str, b: &str) -> bool {
    let parent_of = |id: &str| graph.node(id).and_then(|node| node.parent().map(str::to_owned));
    parent_of(a) != parent_of(b)
}

/// Summed padding of every enclosing group on the way to the root. The force
/// layout inflates cross-group link distances by this walk for both
/// endpoints, so deeper nesting pushes nodes further apart.
pub(crate) fn ancestor_padding_sum(graph: &Graph, id: &str) -> f32 {
    let mut sum = 0.0;
    let mut current = graph.node(id).and_then(|node| node.parent().map(str::to_owned));
    while let Some(parent_id) = current {
        match graph.node(&parent_id) {
            Some(parent) => {
                if parent.is_group() {
                    sum += parent.group_padding().magnitude();
                }
                current = parent.parent().map(str::to_owned);
            }
            None => break,
        }
    }
    sum
}

/// Deterministic starting positions: nodes that already carry a usable
/// center keep it; unplaced or coincident nodes are spread on a spiral
/// seeded from their id so runs are reproducible without a RNG.
pub(crate) fn seeded_positions(graph: &Graph, leaves: &[String]) -> HashMap<String, Point> {
    let mut positions = HashMap::new();
    let mut taken: Vec<Point> = Vec::new();

    for (index, id) in leaves.iter().enumerate() {
        let center = graph
            .node(id)
            .map(|node| node.bounds().center())
            .unwrap_or_default();
        let occupied = taken
            .iter()
            .any(|existing| existing.distance_to(center) < 1.0);
        let position = if center.x.is_finite() && center.y.is_finite() && !occupied {
            center
        } else {
            let mut hasher = DefaultHasher::new();
            id.hash(&mut hasher);
            let angle = (hasher.finish() % 6283) as f32 / 1000.0;
            let radius = ((index + 1) as f32).sqrt() * 50.0;
            Point::new(angle.cos() * radius, angle.sin() * radius)
        };
        taken.push(position);
        positions.insert(id.clone(), position);
    }
    positions
}

/// Writes solver positions back as node centers, leaving dimensions alone.
pub(crate) fn apply_centers(graph: &mut Graph, positions: &HashMap<String, Point>) {
    for (id, position) in positions {
        if let Some(node) = graph.node(id) {
            let mut bounds = node.bounds();
            bounds.set_center(position.x, position.y);
            graph.set_node_bounds(id, bounds);
        }
    }
}

/// Layouts recompute routing from scratch; stale bend points from earlier
/// runs must not leak through.
pub(crate) fn reset_bend_points(graph: &mut Graph) {
    for edge in graph.edges_mut() {
        edge.set_bend_points(Vec::new());
    }
}
