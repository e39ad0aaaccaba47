//! Points, rectangles, and polygon winding in a declared coordinate space.
//!
//! All geometry uses a top-left origin. Whether values are normalized to
//! the processed image or absolute pixels is fixed per delivery batch by
//! [`CoordinateSpace`]; nothing here mixes the two.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. A rectangle of zero area means "no bounds".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Minimal axis-aligned envelope of `points`; `ZERO` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::ZERO;
        };
        let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width * self.height == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Edges are inclusive so corner points lie inside their own envelope.
    /// Offsets are compared against the size rather than `max_x`/`max_y`,
    /// which can round past an extreme point.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x
            && p.x - self.x <= self.width
            && p.y >= self.y
            && p.y - self.y <= self.height
    }

    pub fn iou(&self, other: &Rect) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.max_x().min(other.max_x());
        let iy2 = self.max_y().min(other.max_y());

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width * self.height;
        let area_b = other.width * other.height;
        inter / (area_a + area_b - inter)
    }
}

/// Rotational direction of a corner polygon, measured by the sign of its
/// shoelace area in the coordinates as given (positive = counter-clockwise).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
    Degenerate,
}

impl Winding {
    pub fn of(points: &[Point]) -> Self {
        let area = signed_area(points);
        if area > 0.0 {
            Winding::CounterClockwise
        } else if area < 0.0 {
            Winding::Clockwise
        } else {
            Winding::Degenerate
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Winding::CounterClockwise => Winding::Clockwise,
            Winding::Clockwise => Winding::CounterClockwise,
            Winding::Degenerate => Winding::Degenerate,
        }
    }
}

fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

const EDGE_TOLERANCE: f64 = 1e-9;

/// The coordinate regime a producing pipeline declares for one delivery batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoordinateSpace {
    /// Scalars in [0, 1] relative to the processed image.
    Normalized,
    /// Pixel coordinates within an image of the given size.
    Absolute { width: f64, height: f64 },
}

impl CoordinateSpace {
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            CoordinateSpace::Normalized => (1.0, 1.0),
            CoordinateSpace::Absolute { width, height } => (width, height),
        }
    }

    pub fn contains_point(&self, p: Point) -> bool {
        let (w, h) = self.extent();
        (0.0..=w).contains(&p.x) && (0.0..=h).contains(&p.y)
    }

    /// The far edge is allowed a relative slack of `EDGE_TOLERANCE` because
    /// `x + width` of an envelope touching the border can round past it.
    pub fn contains_rect(&self, r: &Rect) -> bool {
        let (w, h) = self.extent();
        r.width >= 0.0
            && r.height >= 0.0
            && self.contains_point(Point::new(r.x, r.y))
            && r.max_x() <= w * (1.0 + EDGE_TOLERANCE)
            && r.max_y() <= h * (1.0 + EDGE_TOLERANCE)
    }

    /// Horizontal reflection about the vertical center line of the image.
    pub fn mirror_point(&self, p: Point) -> Point {
        let (w, _) = self.extent();
        Point::new(w - p.x, p.y)
    }

    pub fn to_normalized_point(&self, p: Point) -> Point {
        let (w, h) = self.extent();
        Point::new(p.x / w, p.y / h)
    }

    pub fn to_normalized_rect(&self, r: &Rect) -> Rect {
        let (w, h) = self.extent();
        Rect::new(r.x / w, r.y / h, r.width / w, r.height / h)
    }

    /// Scales a normalized point into an image of `width` x `height` pixels.
    pub fn to_absolute_point(p: Point, width: f64, height: f64) -> Point {
        Point::new(p.x * width, p.y * height)
    }

    pub fn to_absolute_rect(r: &Rect, width: f64, height: f64) -> Rect {
        Rect::new(r.x * width, r.y * height, r.width * width, r.height * height)
    }
}
