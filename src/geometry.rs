use serde::{Deserialize, Serialize};

/// A 2D coordinate. Plain value math; NaN and infinities propagate untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn translate(mut self, dx: f32, dy: f32) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }

    pub fn scale(mut self, sx: f32, sy: f32) -> Self {
        self.x *= sx;
        self.y *= sy;
        self
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Padding in CSS shorthand order: one value for all sides, two for
/// [vertical, horizontal], three for [top, horizontal, bottom], four for
/// [top, right, bottom, left].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    Uniform(f32),
    Axes([f32; 2]),
    TopAxisBottom([f32; 3]),
    Sides([f32; 4]),
}

impl Padding {
    /// Resolved as (top, right, bottom, left).
    pub fn sides(&self) -> (f32, f32, f32, f32) {
        match *self {
            Padding::Uniform(all) => (all, all, all, all),
            Padding::Axes([v, h]) => (v, h, v, h),
            Padding::TopAxisBottom([t, h, b]) => (t, h, b, h),
            Padding::Sides([t, r, b, l]) => (t, r, b, l),
        }
    }

    /// Total vertical + horizontal extent added by this padding, averaged
    /// into a single per-side magnitude. Used by layouts that need one
    /// scalar spacing value out of a possibly asymmetric padding.
    pub fn magnitude(&self) -> f32 {
        let (t, r, b, l) = self.sides();
        (t + r + b + l) / 4.0
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Uniform(0.0)
    }
}

/// An axis-aligned bounding box. `is_empty` is the degenerate marker; all
/// other operations are total and never validate their inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rect covers no area. NaN dimensions count as empty so
    /// degenerate rects keep degrading to center fallbacks downstream.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Moves the rect so its center lands on (cx, cy); dimensions unchanged.
    pub fn set_center(&mut self, cx: f32, cy: f32) -> &mut Self {
        self.x = cx - self.width / 2.0;
        self.y = cy - self.height / 2.0;
        self
    }

    pub fn translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.x += dx;
        self.y += dy;
        self
    }

    /// Expands the rect outward per the CSS shorthand convention.
    pub fn padding(&mut self, padding: Padding) -> &mut Self {
        let (top, right, bottom, left) = padding.sides();
        self.x -= left;
        self.y -= top;
        self.width += left + right;
        self.height += top + bottom;
        self
    }

    /// Grows the rect to the smallest one containing both. Empty operands
    /// are absorbed rather than rejected: union with an empty rect adopts
    /// the other operand unchanged.
    pub fn union(&mut self, other: &Rect) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            *self = *other;
            return self;
        }
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        self.x = min_x;
        self.y = min_y;
        self.width = max_x - min_x;
        self.height = max_y - min_y;
        self
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}
