use crate::geometry::{Point, Rect};

/// Which end of an edge an anchor serves. `Both` is the wildcard end the
/// default anchor registers under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorEnd {
    Source,
    Target,
    Both,
}

/// Concrete SVG geometry an [`Anchor::Svg`] routes against, expressed in the
/// node's local coordinate space (origin at the bounds' top-left corner).
#[derive(Debug, Clone, PartialEq)]
pub enum SvgShape {
    Circle { cx: f32, cy: f32, r: f32 },
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Polygon { points: Vec<Point> },
    Path { d: String },
}

impl SvgShape {
    /// Bounding box of the shape in local coordinates. Path data is reduced
    /// to the box spanned by its numeric coordinates, which is exact for
    /// line commands and an approximation for curves.
    pub fn bbox(&self) -> Rect {
        match self {
            SvgShape::Circle { cx, cy, r } => Rect::new(cx - r, cy - r, r * 2.0, r * 2.0),
            SvgShape::Ellipse { cx, cy, rx, ry } => {
                Rect::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0)
            }
            SvgShape::Rect {
                x,
                y,
                width,
                height,
            } => Rect::new(*x, *y, *width, *height),
            SvgShape::Polygon { points } => bbox_of_points(points),
            SvgShape::Path { d } => bbox_of_points(&parse_path_coordinates(d)),
        }
    }
}

/// An edge-endpoint routing strategy owned by a node. Every variant answers
/// `location`: the point on the node's boundary closest to an external
/// reference, nudged outward by `offset` to leave a visual gap.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// Always the bounds center; the default registered for (Both, "").
    Center,
    Rect { offset: f32 },
    Ellipse { offset: f32 },
    Svg { shape: Option<SvgShape>, offset: f32 },
}

impl Anchor {
    /// Boundary point for an edge coming from `reference`. Degenerate bounds
    /// always resolve to the bounds center rather than erroring.
    pub fn location(&self, bounds: Rect, reference: Point) -> Point {
        if bounds.is_empty() {
            return bounds.center();
        }
        match self {
            Anchor::Center => bounds.center(),
            Anchor::Rect { offset } => rect_boundary(bounds, reference, *offset),
            Anchor::Ellipse { offset } => {
                let center = bounds.center();
                ellipse_boundary(
                    center,
                    bounds.width / 2.0,
                    bounds.height / 2.0,
                    reference,
                    *offset,
                )
            }
            Anchor::Svg { shape, offset } => match shape {
                Some(shape) => svg_boundary(shape, bounds, reference, *offset),
                None => bounds.center(),
            },
        }
    }

    /// The default "far point" used when routing toward this node before any
    /// better reference is known. SVG anchors answer from the live shape's
    /// bounding box because rendered geometry can diverge from the logical
    /// bounds; everything else answers the bounds center.
    pub fn reference_point(&self, bounds: Rect) -> Point {
        match self {
            Anchor::Svg {
                shape: Some(shape), ..
            } => {
                let mut bbox = shape.bbox();
                bbox.translate(bounds.x, bounds.y);
                if bbox.is_empty() {
                    bounds.center()
                } else {
                    bbox.center()
                }
            }
            _ => bounds.center(),
        }
    }
}

fn rect_boundary(bounds: Rect, reference: Point, offset: f32) -> Point {
    let center = bounds.center();
    let dx = reference.x - center.x;
    let dy = reference.y - center.y;
    if dx.abs() <= f32::EPSILON && dy.abs() <= f32::EPSILON {
        return center;
    }

    let half_w = bounds.width / 2.0;
    let half_h = bounds.height / 2.0;
    let tx = if dx.abs() > f32::EPSILON {
        half_w / dx.abs()
    } else {
        f32::INFINITY
    };
    let ty = if dy.abs() > f32::EPSILON {
        half_h / dy.abs()
    } else {
        f32::INFINITY
    };
    let t = tx.min(ty);

    with_outward_offset(center, dx, dy, t, offset)
}

fn ellipse_boundary(center: Point, rx: f32, ry: f32, reference: Point, offset: f32) -> Point {
    let dx = reference.x - center.x;
    let dy = reference.y - center.y;
    if (dx.abs() <= f32::EPSILON && dy.abs() <= f32::EPSILON) || rx <= 0.0 || ry <= 0.0 {
        return center;
    }

    let nx = dx / rx;
    let ny = dy / ry;
    let t = 1.0 / (nx * nx + ny * ny).sqrt();

    with_outward_offset(center, dx, dy, t, offset)
}

fn svg_boundary(shape: &SvgShape, bounds: Rect, reference: Point, offset: f32) -> Point {
    // Shape math happens in the node's local frame.
    let local_ref = reference.translate(-bounds.x, -bounds.y);
    let local = match shape {
        SvgShape::Circle { cx, cy, r } => {
            ellipse_boundary(Point::new(*cx, *cy), *r, *r, local_ref, offset)
        }
        SvgShape::Ellipse { cx, cy, rx, ry } => {
            ellipse_boundary(Point::new(*cx, *cy), *rx, *ry, local_ref, offset)
        }
        SvgShape::Rect {
            x,
            y,
            width,
            height,
        } => rect_boundary(Rect::new(*x, *y, *width, *height), local_ref, offset),
        SvgShape::Polygon { points } => polygon_boundary(points, local_ref, offset),
        // No exact handler for path data; its bounding box stands in.
        SvgShape::Path { .. } => {
            let bbox = shape.bbox();
            if bbox.is_empty() {
                return bounds.center();
            }
            rect_boundary(bbox, local_ref, offset)
        }
    };
    local.translate(bounds.x, bounds.y)
}

fn polygon_boundary(points: &[Point], reference: Point, offset: f32) -> Point {
    let bbox = bbox_of_points(points);
    if points.len() < 3 || bbox.is_empty() {
        return bbox.center();
    }

    let center = bbox.center();
    let dx = reference.x - center.x;
    let dy = reference.y - center.y;
    if dx.abs() <= f32::EPSILON && dy.abs() <= f32::EPSILON {
        return center;
    }

    // Outermost crossing of the center->reference ray with any polygon side.
    let mut best_t: Option<f32> = None;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        if let Some(t) = ray_segment_intersection(center, dx, dy, a, b) {
            if best_t.map_or(true, |best| t > best) {
                best_t = Some(t);
            }
        }
    }

    match best_t {
        Some(t) => with_outward_offset(center, dx, dy, t, offset),
        None => rect_boundary(bbox, reference, offset),
    }
}

/// Solves `center + t * (dx, dy) = a + u * (b - a)` for t >= 0, 0 <= u <= 1.
fn ray_segment_intersection(origin: Point, dx: f32, dy: f32, a: Point, b: Point) -> Option<f32> {
    let sx = b.x - a.x;
    let sy = b.y - a.y;
    let denom = dx * sy - dy * sx;
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let qx = a.x - origin.x;
    let qy = a.y - origin.y;
    let t = (qx * sy - qy * sx) / denom;
    let u = (qx * dy - qy * dx) / denom;
    if t >= 0.0 && (-f32::EPSILON..=1.0 + f32::EPSILON).contains(&u) {
        Some(t)
    } else {
        None
    }
}

fn with_outward_offset(center: Point, dx: f32, dy: f32, t: f32, offset: f32) -> Point {
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return center;
    }
    let scale = t + offset / len;
    Point::new(center.x + dx * scale, center.y + dy * scale)
}

fn bbox_of_points(points: &[Point]) -> Rect {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    if points.is_empty() || min_x > max_x || min_y > max_y {
        return Rect::default();
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Pulls every numeric token out of an SVG path string and pairs them into
/// coordinates. Good enough for the bounding-box fallback; relative commands
/// and curve control points widen the box, never shrink it below the
/// on-curve points of absolute data.
fn parse_path_coordinates(d: &str) -> Vec<Point> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for ch in d.chars() {
        if ch.is_ascii_digit() || ch == '.' || (ch == '-' && current.is_empty()) {
            current.push(ch);
        } else {
            if let Ok(value) = current.parse::<f32>() {
                numbers.push(value);
            }
            current.clear();
            if ch == '-' {
                current.push(ch);
            }
        }
    }
    if let Ok(value) = current.parse::<f32>() {
        numbers.push(value);
    }

    numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}
