use std::fmt::Write as FmtWrite;

use anyhow::Result;

use crate::anchor::AnchorEnd;
use crate::element::NodeShape;
use crate::geometry::{Point, Rect};
use crate::graph::Graph;
use crate::utils::escape_xml;
use crate::LAYOUT_MARGIN;

/// Renders a laid-out graph to a standalone SVG document: expanded groups as
/// rounded containers, nodes by shape, edges routed through their anchors
/// and bend points. Purely a snapshot; no interactivity.
pub fn render_svg(graph: &Graph, background: &str) -> Result<String> {
    let bounds = graph.bounds();
    let (shift_x, shift_y, width, height) = if bounds.is_empty() {
        (LAYOUT_MARGIN, LAYOUT_MARGIN, LAYOUT_MARGIN * 2.0, LAYOUT_MARGIN * 2.0)
    } else {
        (
            LAYOUT_MARGIN - bounds.x,
            LAYOUT_MARGIN - bounds.y,
            bounds.width + LAYOUT_MARGIN * 2.0,
            bounds.height + LAYOUT_MARGIN * 2.0,
        )
    };

    let mut svg = String::new();
    write!(
        svg,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" font-family="Inter, system-ui, sans-serif">
  <rect width="100%" height="100%" fill="{}" />
"##,
        width,
        height,
        width,
        height,
        escape_xml(background)
    )?;

    // Containers first so nodes and edges draw above them. Deeper groups
    // later in insertion order paint over their ancestors.
    for node in graph.nodes() {
        if !node.is_group() || node.is_collapsed() || graph.is_hidden(&node.id) {
            continue;
        }
        let mut rect = graph.group_bounds(&node.id);
        rect.translate(shift_x, shift_y);
        write!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"12\" ry=\"12\" fill=\"#f7fafc\" stroke=\"#a0aec0\" stroke-width=\"1.5\" stroke-dasharray=\"4 3\" />\n",
            rect.x, rect.y, rect.width, rect.height
        )?;
        if !node.label.is_empty() {
            write!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#4a5568\" font-size=\"12\" text-anchor=\"middle\">{}</text>\n",
                rect.x + rect.width / 2.0,
                rect.y - 6.0,
                escape_xml(&node.label)
            )?;
        }
    }

    for routed in graph.routable_edges() {
        let Some(edge) = graph.edge(&routed.id) else {
            continue;
        };
        let (Some(source_node), Some(target_node)) =
            (graph.node(&routed.source), graph.node(&routed.target))
        else {
            continue;
        };
        let source_bounds = graph.effective_bounds(&routed.source);
        let target_bounds = graph.effective_bounds(&routed.target);

        let source_anchor = source_node.anchor(AnchorEnd::Source, &edge.source_anchor_kind);
        let target_anchor = target_node.anchor(AnchorEnd::Target, &edge.target_anchor_kind);

        let bends = edge.bend_points();
        let source_ref = bends
            .first()
            .copied()
            .unwrap_or_else(|| target_anchor.reference_point(target_bounds));
        let target_ref = bends
            .last()
            .copied()
            .unwrap_or_else(|| source_anchor.reference_point(source_bounds));

        let mut route = Vec::with_capacity(bends.len() + 2);
        route.push(source_anchor.location(source_bounds, source_ref));
        route.extend_from_slice(bends);
        route.push(target_anchor.location(target_bounds, target_ref));
        for point in &mut route {
            *point = point.translate(shift_x, shift_y);
        }

        if route.len() == 2 {
            write!(
                svg,
                "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#2d3748\" stroke-width=\"2\" />\n",
                route[0].x, route[0].y, route[1].x, route[1].y
            )?;
        } else {
            let points = route
                .iter()
                .map(|p| format!("{:.1},{:.1}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            write!(
                svg,
                "  <polyline points=\"{}\" fill=\"none\" stroke=\"#2d3748\" stroke-width=\"2\" />\n",
                points
            )?;
        }

        if !edge.label.is_empty() {
            let center = route_midpoint(&route);
            write!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#2d3748\" font-size=\"12\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
                center.x,
                center.y - 6.0,
                escape_xml(&edge.label)
            )?;
        }
    }

    for node in graph.nodes() {
        if !node.is_positioned() || graph.is_hidden(&node.id) {
            continue;
        }
        let mut bounds = node.bounds();
        bounds.translate(shift_x, shift_y);
        write_node_shape(&mut svg, node.shape, bounds)?;

        let label = if node.label.is_empty() {
            &node.id
        } else {
            &node.label
        };
        let center = bounds.center();
        write!(
            svg,
            "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#1a202c\" font-size=\"14\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
            center.x,
            center.y,
            escape_xml(label)
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn write_node_shape(svg: &mut String, shape: NodeShape, bounds: Rect) -> Result<()> {
    let center = bounds.center();
    match shape {
        NodeShape::Rectangle => write!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"8\" ry=\"8\" fill=\"#fde68a\" stroke=\"#2d3748\" stroke-width=\"2\" />\n",
            bounds.x, bounds.y, bounds.width, bounds.height
        )?,
        NodeShape::Stadium => write!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{:.1}\" ry=\"{:.1}\" fill=\"#c4f1f9\" stroke=\"#2d3748\" stroke-width=\"2\" />\n",
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            bounds.height / 2.0,
            bounds.height / 2.0
        )?,
        NodeShape::Ellipse => write!(
            svg,
            "  <ellipse cx=\"{:.1}\" cy=\"{:.1}\" rx=\"{:.1}\" ry=\"{:.1}\" fill=\"#e9d8fd\" stroke=\"#2d3748\" stroke-width=\"2\" />\n",
            center.x,
            center.y,
            bounds.width / 2.0,
            bounds.height / 2.0
        )?,
        NodeShape::Diamond => {
            let half_w = bounds.width / 2.0;
            let half_h = bounds.height / 2.0;
            write!(
                svg,
                "  <polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"#fbcfe8\" stroke=\"#2d3748\" stroke-width=\"2\" />\n",
                center.x,
                center.y - half_h,
                center.x + half_w,
                center.y,
                center.x,
                center.y + half_h,
                center.x - half_w,
                center.y
            )?;
        }
    }
    Ok(())
}

fn route_midpoint(route: &[Point]) -> Point {
    if route.is_empty() {
        return Point::default();
    }
    if route.len() % 2 == 1 {
        return route[route.len() / 2];
    }
    let a = route[route.len() / 2 - 1];
    let b = route[route.len() / 2];
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
