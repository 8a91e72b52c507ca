//! Geometric primitives.
//!
//! Pure value types: points, segments, axis-aligned ellipses and polygons,
//! plus the [`Primitive`] tagged variant the rasterizer and scene work on.
//! Nothing in here knows how to draw.

use std::fmt;

use crate::color::Color;
use crate::error::{Error, Result};

/// Glyph used for points unless overridden.
pub const DEFAULT_POINT_GLYPH: char = '*';
/// Glyph used for segment interiors whose major axis is X.
pub const DEFAULT_HORIZONTAL_GLYPH: char = '=';
/// Glyph used for segment interiors whose major axis is Y.
pub const DEFAULT_VERTICAL_GLYPH: char = '|';
/// Glyph used for ellipse outlines.
pub const DEFAULT_ELLIPSE_GLYPH: char = '*';

fn join_names<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let joined: String = names.into_iter().flatten().collect();
    (!joined.is_empty()).then_some(joined)
}

// ============================================================================
// Point
// ============================================================================

/// A point with floating-point coordinates, drawn as a single glyph.
///
/// Equality is by exact coordinate match; glyph, color and name do not take
/// part in it.
#[derive(Debug, Clone)]
pub struct Point {
    /// X coordinate (column).
    pub x: f64,
    /// Y coordinate (row).
    pub y: f64,
    /// Glyph the point is drawn with.
    pub glyph: char,
    /// Color the point is drawn with.
    pub color: Color,
    /// Optional display name.
    pub name: Option<String>,
}

impl Point {
    /// Create a new point drawn with the default glyph.
    #[must_use]
    pub fn new(x: f64, y: f64, color: Color) -> Self {
        Self { x, y, glyph: DEFAULT_POINT_GLYPH, color, name: None }
    }

    /// Set the glyph.
    #[must_use]
    pub fn with_glyph(mut self, glyph: char) -> Self {
        self.glyph = glyph;
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move the point by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Connect this point to another, producing a segment in this point's color.
    #[must_use]
    pub fn connect(&self, other: &Self) -> Segment {
        connect(self, other)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point {}({}, {})", self.name.as_deref().unwrap_or(""), self.x, self.y)
    }
}

/// Connect two points into a segment drawn in the first point's color.
#[must_use]
pub fn connect(p1: &Point, p2: &Point) -> Segment {
    Segment::new(p1.clone(), p2.clone(), p1.color)
}

// ============================================================================
// Segment
// ============================================================================

/// An unordered pair of points.
///
/// `Segment(a, b) == Segment(b, a)`.
#[derive(Debug, Clone)]
pub struct Segment {
    /// First endpoint.
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
    /// Color of the interior cells (endpoints keep their own color).
    pub color: Color,
    /// Interior glyph when X is the major axis.
    pub horizontal_glyph: char,
    /// Interior glyph when Y is the major axis.
    pub vertical_glyph: char,
    /// Optional display name.
    pub name: Option<String>,
}

impl Segment {
    /// Create a new segment. The name is derived from the endpoint names.
    #[must_use]
    pub fn new(p1: Point, p2: Point, color: Color) -> Self {
        let name = join_names([p1.name.as_deref(), p2.name.as_deref()]);
        Self {
            p1,
            p2,
            color,
            horizontal_glyph: DEFAULT_HORIZONTAL_GLYPH,
            vertical_glyph: DEFAULT_VERTICAL_GLYPH,
            name,
        }
    }

    /// Set the interior glyphs.
    #[must_use]
    pub fn with_glyphs(mut self, horizontal: char, vertical: char) -> Self {
        self.horizontal_glyph = horizontal;
        self.vertical_glyph = vertical;
        self
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }

    /// Move both endpoints by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.p1.translate(dx, dy);
        self.p2.translate(dx, dy);
    }

    /// Move the first endpoint to `x`, carrying the second along.
    pub fn set_x(&mut self, x: f64) {
        let dx = x - self.p1.x;
        self.p1.x = x;
        self.p2.x += dx;
    }

    /// Move the first endpoint to `y`, carrying the second along.
    pub fn set_y(&mut self, y: f64) {
        let dy = y - self.p1.y;
        self.p1.y = y;
        self.p2.y += dy;
    }

    /// Close a triangle `[p1, p2, point]`.
    #[must_use]
    pub fn extend_with_point(&self, point: &Point) -> Polygon {
        Polygon::from_parts(
            vec![self.p1.clone(), self.p2.clone(), point.clone()],
            self.color,
            self.horizontal_glyph,
            self.vertical_glyph,
        )
    }

    /// Join two segments into a quadrilateral.
    ///
    /// The second segment is walked so that the outline does not cross
    /// itself for the common case of two roughly parallel segments.
    #[must_use]
    pub fn join(&self, other: &Self) -> Polygon {
        let (b1, b2) = if other.p1.x > other.p2.x {
            (other.p1.clone(), other.p2.clone())
        } else {
            (other.p2.clone(), other.p1.clone())
        };
        Polygon::from_parts(
            vec![self.p1.clone(), self.p2.clone(), b1, b2],
            self.color,
            self.horizontal_glyph,
            self.vertical_glyph,
        )
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        (self.p1 == other.p1 && self.p2 == other.p2) || (self.p1 == other.p2 && self.p2 == other.p1)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment {}: ({}, {}) -> ({}, {})",
            self.name.as_deref().unwrap_or(""),
            self.p1.x,
            self.p1.y,
            self.p2.x,
            self.p2.y
        )
    }
}

// ============================================================================
// Ellipse
// ============================================================================

/// An axis-aligned ellipse given by center and radii.
#[derive(Debug, Clone)]
pub struct Ellipse {
    /// Center X.
    pub x: f64,
    /// Center Y.
    pub y: f64,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Outline color.
    pub color: Color,
    /// Outline glyph.
    pub glyph: char,
    /// Optional display name.
    pub name: Option<String>,
}

impl Ellipse {
    /// Create a new ellipse.
    #[must_use]
    pub fn new(x: f64, y: f64, radius_x: f64, radius_y: f64, color: Color) -> Self {
        Self { x, y, radius_x, radius_y, color, glyph: DEFAULT_ELLIPSE_GLYPH, name: None }
    }

    /// Create a circle.
    #[must_use]
    pub fn circle(x: f64, y: f64, radius: f64, color: Color) -> Self {
        Self::new(x, y, radius, radius, color)
    }

    /// Set the glyph.
    #[must_use]
    pub fn with_glyph(mut self, glyph: char) -> Self {
        self.glyph = glyph;
        self
    }

    /// Move the center by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Circumference, using Ramanujan's second approximation.
    #[must_use]
    pub fn circumference(&self) -> f64 {
        let a = self.radius_x.abs();
        let b = self.radius_y.abs();
        if a + b == 0.0 {
            return 0.0;
        }
        let h = ((a - b) * (a - b)) / ((a + b) * (a + b));
        std::f64::consts::PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
    }
}

impl PartialEq for Ellipse {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.radius_x == other.radius_x
            && self.radius_y == other.radius_y
    }
}

impl fmt::Display for Ellipse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ellipse {}({}, {}) rx={} ry={}",
            self.name.as_deref().unwrap_or(""),
            self.x,
            self.y,
            self.radius_x,
            self.radius_y
        )
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// A closed outline through one or more vertices.
///
/// The boundary runs between consecutive vertices and wraps from the last
/// vertex back to the first. The perimeter is cached and recomputed on every
/// vertex change, which is why the vertex list is not public.
#[derive(Debug, Clone)]
pub struct Polygon {
    points: Vec<Point>,
    perimeter: f64,
    /// Boundary color (vertices keep their own color).
    pub color: Color,
    /// Boundary glyph when X is the major axis.
    pub horizontal_glyph: char,
    /// Boundary glyph when Y is the major axis.
    pub vertical_glyph: char,
    /// Optional display name.
    pub name: Option<String>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPolygon`] if `points` is empty.
    pub fn new(points: impl IntoIterator<Item = Point>, color: Color) -> Result<Self> {
        let points: Vec<Point> = points.into_iter().collect();
        if points.is_empty() {
            return Err(Error::EmptyPolygon);
        }
        Ok(Self::from_parts(points, color, DEFAULT_HORIZONTAL_GLYPH, DEFAULT_VERTICAL_GLYPH))
    }

    /// Callers guarantee `points` is non-empty.
    fn from_parts(points: Vec<Point>, color: Color, horizontal: char, vertical: char) -> Self {
        debug_assert!(!points.is_empty(), "polygon must have a vertex");
        let name = join_names(points.iter().map(|p| p.name.as_deref()));
        let mut polygon = Self {
            points,
            perimeter: 0.0,
            color,
            horizontal_glyph: horizontal,
            vertical_glyph: vertical,
            name,
        };
        polygon.recalculate();
        polygon
    }

    /// Axis-aligned rectangle with corners A, B, C, D clockwise from the
    /// upper-left corner at `(x, y)`.
    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64, color: Color) -> Self {
        let corners = [
            ("A", x, y),
            ("B", x + width, y),
            ("C", x + width, y + height),
            ("D", x, y + height),
        ];
        let points = corners
            .into_iter()
            .map(|(name, px, py)| Point::new(px, py, color).named(name))
            .collect();
        Self::from_parts(points, color, DEFAULT_HORIZONTAL_GLYPH, DEFAULT_VERTICAL_GLYPH)
    }

    /// Set the boundary glyphs.
    #[must_use]
    pub fn with_glyphs(mut self, horizontal: char, vertical: char) -> Self {
        self.horizontal_glyph = horizontal;
        self.vertical_glyph = vertical;
        self
    }

    /// The vertices in order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Sum of the boundary segment lengths.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Boundary segments, closing the loop from the last vertex to the first.
    #[must_use]
    pub fn boundary(&self) -> Vec<Segment> {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                Segment::new(self.points[i].clone(), self.points[(i + 1) % n].clone(), self.color)
                    .with_glyphs(self.horizontal_glyph, self.vertical_glyph)
            })
            .collect()
    }

    fn recalculate(&mut self) {
        let n = self.points.len();
        self.perimeter = (0..n).map(|i| self.points[i].distance(&self.points[(i + 1) % n])).sum();
    }

    /// Move every vertex by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for point in &mut self.points {
            point.translate(dx, dy);
        }
        self.recalculate();
    }

    /// Move the first vertex to `x`, carrying the others along.
    pub fn set_x(&mut self, x: f64) {
        let dx = x - self.points[0].x;
        for point in &mut self.points[1..] {
            point.x += dx;
        }
        self.points[0].x = x;
        self.recalculate();
    }

    /// Move the first vertex to `y`, carrying the others along.
    pub fn set_y(&mut self, y: f64) {
        let dy = y - self.points[0].y;
        for point in &mut self.points[1..] {
            point.y += dy;
        }
        self.points[0].y = y;
        self.recalculate();
    }

    /// A new polygon with `point` appended.
    #[must_use]
    pub fn extend_with_point(&self, point: &Point) -> Self {
        let mut points = self.points.clone();
        points.push(point.clone());
        Self::from_parts(points, self.color, self.horizontal_glyph, self.vertical_glyph)
    }

    /// A new polygon with both endpoints of `segment` appended.
    #[must_use]
    pub fn extend_with_segment(&self, segment: &Segment) -> Self {
        let mut points = self.points.clone();
        points.push(segment.p1.clone());
        points.push(segment.p2.clone());
        Self::from_parts(points, self.color, self.horizontal_glyph, self.vertical_glyph)
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Polygon {}({}, {}):",
            self.name.as_deref().unwrap_or(""),
            self.points[0].x,
            self.points[0].y
        )?;
        for segment in self.boundary() {
            writeln!(f, "{segment}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rectangle containing every `(x, y)` pair.
    fn enclosing(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in coords {
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        Self::new(min.0, min.1, max.0 - min.0, max.1 - min.1)
    }

    /// Check if a coordinate pair is inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Check if two rectangles share at least one point (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

// ============================================================================
// Primitive
// ============================================================================

/// Any drawable primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A single point.
    Point(Point),
    /// A line segment.
    Segment(Segment),
    /// An axis-aligned ellipse.
    Ellipse(Ellipse),
    /// A closed polygon.
    Polygon(Polygon),
}

impl Primitive {
    /// The coordinate `set_x`/`set_y` position: the point itself, the first
    /// endpoint, the center, or the first vertex.
    #[must_use]
    pub fn anchor(&self) -> (f64, f64) {
        match self {
            Self::Point(p) => (p.x, p.y),
            Self::Segment(s) => (s.p1.x, s.p1.y),
            Self::Ellipse(e) => (e.x, e.y),
            Self::Polygon(poly) => (poly.points[0].x, poly.points[0].y),
        }
    }

    /// Move the anchor to an absolute X, translating the rest rigidly.
    pub fn set_x(&mut self, x: f64) {
        match self {
            Self::Point(p) => p.x = x,
            Self::Segment(s) => s.set_x(x),
            Self::Ellipse(e) => e.x = x,
            Self::Polygon(poly) => poly.set_x(x),
        }
    }

    /// Move the anchor to an absolute Y, translating the rest rigidly.
    pub fn set_y(&mut self, y: f64) {
        match self {
            Self::Point(p) => p.y = y,
            Self::Segment(s) => s.set_y(y),
            Self::Ellipse(e) => e.y = y,
            Self::Polygon(poly) => poly.set_y(y),
        }
    }

    /// Move by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Point(p) => p.translate(dx, dy),
            Self::Segment(s) => s.translate(dx, dy),
            Self::Ellipse(e) => e.translate(dx, dy),
            Self::Polygon(poly) => poly.translate(dx, dy),
        }
    }

    /// Segment length, if this is a segment.
    #[must_use]
    pub fn length(&self) -> Option<f64> {
        match self {
            Self::Segment(s) => Some(s.length()),
            _ => None,
        }
    }

    /// Perimeter of a polygon or circumference of an ellipse.
    #[must_use]
    pub fn perimeter(&self) -> Option<f64> {
        match self {
            Self::Polygon(poly) => Some(poly.perimeter()),
            Self::Ellipse(e) => Some(e.circumference()),
            _ => None,
        }
    }

    /// Axis-aligned bounding box of the continuous geometry.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Point(p) => Rect::new(p.x, p.y, 0.0, 0.0),
            Self::Segment(s) => Rect::enclosing([(s.p1.x, s.p1.y), (s.p2.x, s.p2.y)]),
            Self::Ellipse(e) => {
                let (rx, ry) = (e.radius_x.abs(), e.radius_y.abs());
                Rect::new(e.x - rx, e.y - ry, 2.0 * rx, 2.0 * ry)
            }
            Self::Polygon(poly) => Rect::enclosing(poly.points.iter().map(|p| (p.x, p.y))),
        }
    }

    /// Short kind name, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::Segment(_) => "segment",
            Self::Ellipse(_) => "ellipse",
            Self::Polygon(_) => "polygon",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(p) => p.fmt(f),
            Self::Segment(s) => s.fmt(f),
            Self::Ellipse(e) => e.fmt(f),
            Self::Polygon(poly) => poly.fmt(f),
        }
    }
}

impl From<Point> for Primitive {
    fn from(p: Point) -> Self {
        Self::Point(p)
    }
}

impl From<Segment> for Primitive {
    fn from(s: Segment) -> Self {
        Self::Segment(s)
    }
}

impl From<Ellipse> for Primitive {
    fn from(e: Ellipse) -> Self {
        Self::Ellipse(e)
    }
}

impl From<Polygon> for Primitive {
    fn from(poly: Polygon) -> Self {
        Self::Polygon(poly)
    }
}
