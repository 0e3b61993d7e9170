use std::collections::HashMap;

use anyhow::Result;
use log::debug;

use crate::geometry::Point;
use crate::graph::Graph;
use crate::layout::{
    apply_centers, cross_group, reset_bend_points, seeded_positions, solver_links, Layout,
};

#[derive(Debug, Clone)]
pub struct ColaConfig {
    /// Relaxation rounds; the solver is deterministic, not cooled.
    pub iterations: usize,
    /// Ideal length for links whose endpoints share a parent. Flat by
    /// design: this engine's tuning differs from the force layout's
    /// padding-sum policy and the two must not be unified.
    pub same_group_distance: f32,
    /// Ideal length for links crossing group boundaries.
    pub cross_group_distance: f32,
    /// Fraction of the distance error corrected per round.
    pub relaxation: f32,
}

impl Default for ColaConfig {
    fn default() -> Self {
        ColaConfig {
            iterations: 120,
            same_group_distance: 50.0,
            cross_group_distance: 100.0,
            relaxation: 0.5,
        }
    }
}

/// Constraint-based layout: repeated projection of every link onto its
/// ideal length, followed by pairwise overlap separation. Uses the same
/// faux sibling links as the force layout for group cohesion, but drives
/// them with flat distance constants instead of a physics simulation.
#[derive(Debug, Default)]
pub struct ColaLayout {
    config: ColaConfig,
}

impl ColaLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ColaConfig) -> Self {
        ColaLayout { config }
    }
}

impl Layout for ColaLayout {
    fn layout(&mut self, graph: &mut Graph) -> Result<()> {
        reset_bend_points(graph);
        let leaves = graph.visible_leaves();
        if leaves.is_empty() {
            return Ok(());
        }

        let mut positions: HashMap<String, Point> = seeded_positions(graph, &leaves);
        let half_sizes: HashMap<String, (f32, f32)> = leaves
            .iter()
            .map(|id| {
                let bounds = graph.node(id).map(|n| n.bounds()).unwrap_or_default();
                (id.clone(), (bounds.width / 2.0, bounds.height / 2.0))
            })
            .collect();

        let links: Vec<(String, String, f32)> = solver_links(graph, &leaves)
            .into_iter()
            .map(|link| {
                let distance = if !link.faux && cross_group(graph, &link.source, &link.target) {
                    self.config.cross_group_distance
                } else {
                    self.config.same_group_distance
                };
                (link.source, link.target, distance)
            })
            .collect();

        for _ in 0..self.config.iterations {
            // Project each link toward its ideal length, splitting the
            // correction between both endpoints.
            for (source, target, ideal) in &links {
                let (Some(&a), Some(&b)) = (positions.get(source), positions.get(target)) else {
                    continue;
                };
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let error = (dist - ideal) / dist * self.config.relaxation / 2.0;
                let shift_x = dx * error;
                let shift_y = dy * error;
                if let Some(a) = positions.get_mut(source) {
                    a.x += shift_x;
                    a.y += shift_y;
                }
                if let Some(b) = positions.get_mut(target) {
                    b.x -= shift_x;
                    b.y -= shift_y;
                }
            }

            // Separation constraints: remove rectangle overlap along the
            // axis of least penetration.
            for i in 0..leaves.len() {
                for j in (i + 1)..leaves.len() {
                    let (Some(&a), Some(&b)) =
                        (positions.get(&leaves[i]), positions.get(&leaves[j]))
                    else {
                        continue;
                    };
                    let (aw, ah) = half_sizes[&leaves[i]];
                    let (bw, bh) = half_sizes[&leaves[j]];
                    let overlap_x = aw + bw - (b.x - a.x).abs();
                    let overlap_y = ah + bh - (b.y - a.y).abs();
                    if overlap_x <= 0.0 || overlap_y <= 0.0 {
                        continue;
                    }
                    if overlap_x < overlap_y {
                        let sign = if b.x >= a.x { 1.0 } else { -1.0 };
                        let push = overlap_x / 2.0 * sign;
                        if let Some(p) = positions.get_mut(&leaves[i]) {
                            p.x -= push;
                        }
                        if let Some(p) = positions.get_mut(&leaves[j]) {
                            p.x += push;
                        }
                    } else {
                        let sign = if b.y >= a.y { 1.0 } else { -1.0 };
                        let push = overlap_y / 2.0 * sign;
                        if let Some(p) = positions.get_mut(&leaves[i]) {
                            p.y -= push;
                        }
                        if let Some(p) = positions.get_mut(&leaves[j]) {
                            p.y += push;
                        }
                    }
                }
            }
        }

        apply_centers(graph, &positions);
        debug!(
            "cola layout relaxed {} nodes over {} rounds",
            leaves.len(),
            self.config.iterations
        );
        Ok(())
    }

    fn destroy(&mut self) {
        // Nothing registered beyond the bound graph.
    }
}
