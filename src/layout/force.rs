use std::collections::HashMap;

use anyhow::Result;
use log::debug;

use crate::events::{DragOperation, EventBus, GraphEvent, SubscriptionId};
use crate::graph::Graph;
use crate::layout::{
    ancestor_padding_sum, apply_centers, cross_group, reset_bend_points, seeded_positions,
    solver_links, Layout, LayoutLink,
};

#[derive(Debug, Clone)]
pub struct ForceConfig {
    /// Many-body repulsion magnitude.
    pub charge: f32,
    /// Ideal link length before any group-padding inflation.
    pub link_distance: f32,
    /// Extra clearance added to every collision radius.
    pub collide_distance: f32,
    /// Pull toward the simulation origin.
    pub center_strength: f32,
    /// Physics ticks run per step; bounds are written back once per step,
    /// not once per tick, to bound how often observers see updates.
    pub simulation_speed: usize,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    /// Warmth while a move-drag holds the simulation open.
    pub drag_alpha_target: f32,
    pub max_ticks: usize,
}

impl Default for ForceConfig {
    fn default() -> Self {
        ForceConfig {
            charge: 900.0,
            link_distance: 60.0,
            collide_distance: 10.0,
            center_strength: 0.05,
            simulation_speed: 10,
            alpha_decay: 0.0228,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            max_ticks: 1000,
        }
    }
}

#[derive(Debug, Clone)]
struct Body {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    radius: f32,
    fixed: bool,
}

#[derive(Debug, Clone)]
struct SimLink {
    source: String,
    target: String,
    distance: f32,
    strength: f32,
}

/// Force-directed layout: leaves are particles under charge, centering,
/// collision, and link forces, cooled by a d3-style alpha schedule. Bound to
/// one graph's event bus at construction for drag interaction and never
/// rebound.
pub struct ForceLayout {
    config: ForceConfig,
    events: EventBus,
    subscription: Option<SubscriptionId>,
    bodies: HashMap<String, Body>,
    links: Vec<SimLink>,
    alpha: f32,
    alpha_target: f32,
    running: bool,
}

impl ForceLayout {
    pub fn new(graph: &Graph) -> Self {
        Self::with_config(graph, ForceConfig::default())
    }

    pub fn with_config(graph: &Graph, config: ForceConfig) -> Self {
        let events = graph.events().clone();
        let subscription = Some(events.subscribe());
        ForceLayout {
            config,
            events,
            subscription,
            bodies: HashMap::new(),
            links: Vec::new(),
            alpha: 0.0,
            alpha_target: 0.0,
            running: false,
        }
    }

    /// Rebuilds bodies and links from the graph's current visible leaf set.
    /// Faux edges are regenerated here, so repeated runs never accumulate
    /// them.
    fn rebuild(&mut self, graph: &mut Graph) {
        reset_bend_points(graph);
        let leaves = graph.visible_leaves();
        let positions = seeded_positions(graph, &leaves);

        let previous: HashMap<String, bool> = self
            .bodies
            .iter()
            .map(|(id, body)| (id.clone(), body.fixed))
            .collect();

        self.bodies = leaves
            .iter()
            .map(|id| {
                let bounds = graph.node(id).map(|n| n.bounds()).unwrap_or_default();
                let position = positions.get(id).copied().unwrap_or_default();
                (
                    id.clone(),
                    Body {
                        x: position.x,
                        y: position.y,
                        vx: 0.0,
                        vy: 0.0,
                        radius: bounds.width.max(bounds.height) / 2.0
                            + self.config.collide_distance,
                        // A drag in progress survives a mid-drag relayout.
                        fixed: previous.get(id).copied().unwrap_or(false),
                    },
                )
            })
            .collect();

        self.links = solver_links(graph, &leaves)
            .into_iter()
            .map(|link| self.build_link(graph, link))
            .collect();
    }

    fn build_link(&self, graph: &Graph, link: LayoutLink) -> SimLink {
        let mut distance = self.config.link_distance;
        if !link.faux && cross_group(graph, &link.source, &link.target) {
            // Nesting depth directly increases the ideal length: the summed
            // padding of every enclosing group on both endpoints.
            distance += ancestor_padding_sum(graph, &link.source)
                + ancestor_padding_sum(graph, &link.target);
        }
        SimLink {
            source: link.source,
            target: link.target,
            strength: if link.faux { 0.1 } else { 0.5 },
            distance,
        }
    }

    /// One amortized step: drains pending drag events, runs
    /// `simulation_speed` physics ticks, then writes bounds back once.
    pub fn step(&mut self, graph: &mut Graph) {
        self.handle_events(graph);
        if self.running {
            for _ in 0..self.config.simulation_speed.max(1) {
                self.tick();
                if self.alpha < self.config.alpha_min && self.alpha_target == 0.0 {
                    self.running = false;
                    break;
                }
            }
        }
        self.write_back(graph);
    }

    fn handle_events(&mut self, graph: &Graph) {
        let Some(subscription) = self.subscription else {
            return;
        };
        for event in self.events.drain(subscription) {
            match event {
                GraphEvent::DragStart { node, operation } => match operation {
                    DragOperation::Move => {
                        self.pin(graph, &node, true);
                        self.alpha_target = self.config.drag_alpha_target;
                        self.alpha = self.alpha.max(self.config.drag_alpha_target);
                        self.running = true;
                    }
                    // Non-move drags (resize and friends) freeze the
                    // simulation outright instead of pinning.
                    DragOperation::Other(_) => {
                        self.running = false;
                    }
                },
                GraphEvent::DragEnd { node, operation } => match operation {
                    DragOperation::Move => {
                        self.pin(graph, &node, false);
                        self.alpha_target = 0.0;
                    }
                    DragOperation::Other(_) => {
                        self.alpha = 1.0;
                        self.running = true;
                    }
                },
                GraphEvent::CollapseChanged { .. } => {}
            }
        }
    }

    /// Pins the node's body, or every leaf body inside it when the node is a
    /// group, at its current simulated position.
    fn pin(&mut self, graph: &Graph, id: &str, fixed: bool) {
        let mut targets = vec![id.to_string()];
        if graph.node(id).map_or(false, |node| node.is_group()) {
            let mut stack = vec![id.to_string()];
            while let Some(current) = stack.pop() {
                for child in graph.children(&current) {
                    stack.push(child.id.clone());
                    if child.is_positioned() {
                        targets.push(child.id.clone());
                    }
                }
            }
        }
        for target in targets {
            if let Some(body) = self.bodies.get_mut(&target) {
                body.fixed = fixed;
                body.vx = 0.0;
                body.vy = 0.0;
            }
        }
    }

    fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let ids: Vec<String> = self.bodies.keys().cloned().collect();

        // Many-body charge: pairwise repulsion falling off with distance
        // squared.
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (ax, ay, bx, by) = {
                    let a = &self.bodies[&ids[i]];
                    let b = &self.bodies[&ids[j]];
                    (a.x, a.y, b.x, b.y)
                };
                let dx = ax - bx;
                let dy = ay - by;
                let dist_sq = (dx * dx + dy * dy).max(1.0);
                let dist = dist_sq.sqrt();
                let force = self.config.charge * alpha / dist_sq;
                let fx = dx / dist * force;
                let fy = dy / dist * force;
                if let Some(a) = self.bodies.get_mut(&ids[i]) {
                    a.vx += fx;
                    a.vy += fy;
                }
                if let Some(b) = self.bodies.get_mut(&ids[j]) {
                    b.vx -= fx;
                    b.vy -= fy;
                }
            }
        }

        // Link springs toward each link's ideal distance.
        let links = self.links.clone();
        for link in &links {
            let (Some(a), Some(b)) = (
                self.bodies.get(&link.source).cloned(),
                self.bodies.get(&link.target).cloned(),
            ) else {
                continue;
            };
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let dist = (dx * dx + dy * dy).sqrt().max(1.0);
            let force = (dist - link.distance) * link.strength * alpha;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            if let Some(a) = self.bodies.get_mut(&link.source) {
                a.vx += fx;
                a.vy += fy;
            }
            if let Some(b) = self.bodies.get_mut(&link.target) {
                b.vx -= fx;
                b.vy -= fy;
            }
        }

        // Centering plus integration with velocity decay.
        let decay = 1.0 - self.config.velocity_decay;
        for body in self.bodies.values_mut() {
            if body.fixed {
                body.vx = 0.0;
                body.vy = 0.0;
                continue;
            }
            body.vx -= body.x * self.config.center_strength * alpha;
            body.vy -= body.y * self.config.center_strength * alpha;
            body.vx *= decay;
            body.vy *= decay;
            body.x += body.vx;
            body.y += body.vy;
        }

        // Collision: positional separation when circles overlap.
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (ax, ay, ar, a_fixed, bx, by, br, b_fixed) = {
                    let a = &self.bodies[&ids[i]];
                    let b = &self.bodies[&ids[j]];
                    (a.x, a.y, a.radius, a.fixed, b.x, b.y, b.radius, b.fixed)
                };
                let dx = bx - ax;
                let dy = by - ay;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let overlap = ar + br - dist;
                if overlap <= 0.0 {
                    continue;
                }
                let push = overlap / 2.0;
                let ux = dx / dist;
                let uy = dy / dist;
                if !a_fixed {
                    if let Some(a) = self.bodies.get_mut(&ids[i]) {
                        a.x -= ux * push;
                        a.y -= uy * push;
                    }
                }
                if !b_fixed {
                    if let Some(b) = self.bodies.get_mut(&ids[j]) {
                        b.x += ux * push;
                        b.y += uy * push;
                    }
                }
            }
        }
    }

    fn write_back(&self, graph: &mut Graph) {
        let positions = self
            .bodies
            .iter()
            .map(|(id, body)| (id.clone(), crate::geometry::Point::new(body.x, body.y)))
            .collect();
        apply_centers(graph, &positions);
    }
}

impl Layout for ForceLayout {
    /// Runs the simulation to rest synchronously. Incremental hosts call
    /// [`ForceLayout::step`] instead and let drag events keep it warm.
    fn layout(&mut self, graph: &mut Graph) -> Result<()> {
        self.rebuild(graph);
        if self.bodies.is_empty() {
            return Ok(());
        }

        self.alpha = 1.0;
        self.running = true;
        let mut ticks = 0;
        while self.running && ticks < self.config.max_ticks {
            self.step(graph);
            ticks += self.config.simulation_speed.max(1);
        }
        debug!(
            "force layout settled after {} ticks (alpha {:.4})",
            ticks, self.alpha
        );
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.events.unsubscribe(subscription);
        }
        self.running = false;
    }
}

impl Drop for ForceLayout {
    fn drop(&mut self) {
        self.destroy();
    }
}
