use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::Result;
use log::debug;

use crate::geometry::Point;
use crate::graph::Graph;
use crate::layout::{reset_bend_points, Layout};

#[derive(Debug, Clone)]
pub struct DagreConfig {
    /// Gap between consecutive ranks along the flow direction.
    pub rank_spacing: f32,
    /// Gap between neighbors within a rank.
    pub node_spacing: f32,
}

impl Default for DagreConfig {
    fn default() -> Self {
        DagreConfig {
            rank_spacing: 80.0,
            node_spacing: 40.0,
        }
    }
}

/// Hierarchical layered layout: rank assignment by longest path over the
/// visible leaf set, group-aware ordering within ranks (members of the same
/// group stay adjacent, the compound-parent treatment), then size-aware
/// coordinate assignment. Stateless between runs.
#[derive(Debug, Default)]
pub struct DagreLayout {
    config: DagreConfig,
}

impl DagreLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DagreConfig) -> Self {
        DagreLayout { config }
    }

    /// Longest-path ranking via indegree peeling; nodes stranded by cycles
    /// fall back to one rank past their deepest ranked parent.
    fn compute_ranks(
        &self,
        leaves: &[String],
        edges: &[(String, String)],
    ) -> HashMap<String, usize> {
        let mut levels: HashMap<String, usize> =
            leaves.iter().map(|id| (id.clone(), 0usize)).collect();
        let mut indegree: HashMap<String, usize> =
            leaves.iter().map(|id| (id.clone(), 0usize)).collect();
        for (_, target) in edges {
            *indegree.entry(target.clone()).or_insert(0) += 1;
        }

        let mut queue: VecDeque<String> = leaves
            .iter()
            .filter(|id| indegree.get(*id).copied().unwrap_or(0) == 0)
            .cloned()
            .collect();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(node_id) = queue.pop_front() {
            visited.insert(node_id.clone());
            let node_level = *levels.get(&node_id).unwrap_or(&0);
            for (_, target) in edges.iter().filter(|(source, _)| *source == node_id) {
                let entry = levels.entry(target.clone()).or_insert(0);
                if *entry < node_level + 1 {
                    *entry = node_level + 1;
                }
                if let Some(degree) = indegree.get_mut(target) {
                    if *degree > 0 {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(target.clone());
                        }
                    }
                }
            }
        }

        if visited.len() != leaves.len() {
            for id in leaves {
                if visited.contains(id) {
                    continue;
                }
                let mut max_parent = 0usize;
                let mut has_parent = false;
                for (source, target) in edges.iter().filter(|(_, target)| target == id) {
                    has_parent = true;
                    max_parent = max_parent.max(levels.get(source).copied().unwrap_or(0) + 1);
                }
                levels.insert(id.clone(), if has_parent { max_parent } else { 0 });
            }
        }

        levels
    }

    /// Ancestor-path sort key that keeps members of the same (possibly
    /// nested) group contiguous within a rank.
    fn containment_key(graph: &Graph, id: &str) -> String {
        let mut chain = vec![id.to_string()];
        let mut current = graph.node(id).and_then(|n| n.parent().map(str::to_owned));
        while let Some(parent_id) = current {
            chain.push(parent_id.clone());
            current = graph
                .node(&parent_id)
                .and_then(|n| n.parent().map(str::to_owned));
        }
        chain.reverse();
        chain.join("/")
    }
}

impl Layout for DagreLayout {
    fn layout(&mut self, graph: &mut Graph) -> Result<()> {
        reset_bend_points(graph);
        let leaves = graph.visible_leaves();
        if leaves.is_empty() {
            return Ok(());
        }
        let visible: HashSet<&str> = leaves.iter().map(String::as_str).collect();
        let routable = graph.routable_edges();
        let edges: Vec<(String, String)> = routable
            .iter()
            .filter(|edge| {
                visible.contains(edge.source.as_str()) && visible.contains(edge.target.as_str())
            })
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect();

        let ranks = self.compute_ranks(&leaves, &edges);
        let max_rank = ranks.values().copied().max().unwrap_or(0);

        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
        for id in &leaves {
            buckets[ranks.get(id).copied().unwrap_or(0)].push(id.clone());
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|id| Self::containment_key(graph, id));
        }

        let direction = graph.direction();
        let horizontal = direction.is_horizontal();
        let size_along = |graph: &Graph, id: &str| {
            let bounds = graph.node(id).map(|n| n.bounds()).unwrap_or_default();
            if horizontal {
                (bounds.width, bounds.height)
            } else {
                (bounds.height, bounds.width)
            }
        };

        // Main-axis band centers per rank, then per-rank centered cross
        // placement honoring each node's own size.
        let mut rank_centers = vec![0.0f32; buckets.len()];
        let mut main_cursor = 0.0f32;
        let mut centers: HashMap<String, (f32, f32)> = HashMap::new();

        let rank_order: Vec<usize> = if direction.is_reversed() {
            (0..buckets.len()).rev().collect()
        } else {
            (0..buckets.len()).collect()
        };

        for &rank in &rank_order {
            let bucket = &buckets[rank];
            let band = bucket
                .iter()
                .map(|id| size_along(graph, id).0)
                .fold(0.0f32, f32::max);
            rank_centers[rank] = main_cursor + band / 2.0;

            let total: f32 = bucket
                .iter()
                .map(|id| size_along(graph, id).1)
                .sum::<f32>()
                + self.config.node_spacing * bucket.len().saturating_sub(1) as f32;
            let mut cross_cursor = -total / 2.0;
            for id in bucket {
                let (_, cross_size) = size_along(graph, id);
                centers.insert(
                    id.clone(),
                    (rank_centers[rank], cross_cursor + cross_size / 2.0),
                );
                cross_cursor += cross_size + self.config.node_spacing;
            }

            main_cursor += band + self.config.rank_spacing;
        }

        for (id, (main, cross)) in &centers {
            if let Some(node) = graph.node(id) {
                let mut bounds = node.bounds();
                if horizontal {
                    bounds.set_center(*main, *cross);
                } else {
                    bounds.set_center(*cross, *main);
                }
                graph.set_node_bounds(id, bounds);
            }
        }

        // Bend points only for edges spanning more than one rank gap; a
        // direct neighbor edge keeps its trivial two-endpoint route.
        for edge in &routable {
            let (Some(&source_rank), Some(&target_rank)) =
                (ranks.get(&edge.source), ranks.get(&edge.target))
            else {
                continue;
            };
            let span = target_rank.abs_diff(source_rank);
            if span <= 1 {
                continue;
            }
            let (Some(&(_, source_cross)), Some(&(_, target_cross))) =
                (centers.get(&edge.source), centers.get(&edge.target))
            else {
                continue;
            };

            let mut points = Vec::with_capacity(span - 1);
            let step: isize = if target_rank > source_rank { 1 } else { -1 };
            let mut rank = source_rank as isize + step;
            while rank != target_rank as isize {
                let fraction =
                    (rank - source_rank as isize).abs() as f32 / span as f32;
                let cross = source_cross + (target_cross - source_cross) * fraction;
                let main = rank_centers[rank as usize];
                points.push(if horizontal {
                    Point::new(main, cross)
                } else {
                    Point::new(cross, main)
                });
                rank += step;
            }
            graph.set_edge_bend_points(&edge.id, points);
        }

        debug!(
            "dagre layout placed {} nodes across {} ranks",
            leaves.len(),
            buckets.len()
        );
        Ok(())
    }

    fn destroy(&mut self) {
        // No listeners or external resources to release.
    }
}
