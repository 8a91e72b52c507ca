//! Primitive rasterizers.

use crate::color::Color;
use crate::geometry::{Ellipse, Point, Polygon, Primitive, Segment};

/// Largest cell coordinate magnitude the rasterizer steps through.
///
/// Coordinates are clamped to this range so that absurd inputs cannot make
/// a line or ellipse loop for billions of steps.
pub const COORD_LIMIT: i32 = u16::MAX as i32;

/// One cell produced by rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellWrite {
    /// Column.
    pub col: i32,
    /// Row.
    pub row: i32,
    /// Glyph to draw.
    pub glyph: char,
    /// Color to draw the glyph (or block) in.
    pub color: Color,
}

impl CellWrite {
    /// Create a new cell write.
    #[must_use]
    pub const fn new(col: i32, row: i32, glyph: char, color: Color) -> Self {
        Self { col, row, glyph, color }
    }

    /// Grid position as `(col, row)`.
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        (self.col, self.row)
    }
}

/// Truncate a continuous coordinate to a cell coordinate.
///
/// NaN maps to 0.
#[inline]
#[must_use]
pub fn to_cell(v: f64) -> i32 {
    let limit = f64::from(COORD_LIMIT);
    v.trunc().clamp(-limit, limit) as i32
}

/// Trait for primitives that rasterize to cell writes.
pub trait Rasterize {
    /// Append this primitive's cells to `out`, in drawing order.
    fn rasterize_into(&self, out: &mut Vec<CellWrite>);

    /// Rasterize into a fresh vector.
    fn rasterize(&self) -> Vec<CellWrite> {
        let mut out = Vec::new();
        self.rasterize_into(&mut out);
        out
    }
}

/// Rasterize any primitive.
#[must_use]
pub fn rasterize(primitive: &Primitive) -> Vec<CellWrite> {
    primitive.rasterize()
}

// ============================================================================
// Line Drawing
// ============================================================================

/// Interior cells of the segment between two cell positions, excluding both
/// endpoints.
///
/// Endpoints are ordered lexicographically before stepping so that the
/// result does not depend on which end the caller names first. Cells come out
/// in order from that first endpoint toward the other.
#[must_use]
pub fn segment_interior(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let ((x0, y0), (x1, y1)) = if to < from { (to, from) } else { (from, to) };

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::with_capacity(dx.max(-dy) as usize);
    let (mut x, mut y) = (x0, y0);

    loop {
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }

        if x == x1 && y == y1 {
            break;
        }
        cells.push((x, y));
    }

    cells
}

fn rasterize_segment_interior(segment: &Segment, out: &mut Vec<CellWrite>) {
    let from = (to_cell(segment.p1.x), to_cell(segment.p1.y));
    let to = (to_cell(segment.p2.x), to_cell(segment.p2.y));

    let glyph = if (to.1 - from.1).abs() < (to.0 - from.0).abs() {
        segment.horizontal_glyph
    } else {
        segment.vertical_glyph
    };

    out.extend(
        segment_interior(from, to)
            .into_iter()
            .map(|(col, row)| CellWrite::new(col, row, glyph, segment.color)),
    );
}

// ============================================================================
// Ellipse Drawing
// ============================================================================

/// Push the mirrored offsets `(±x, ±y)` in the order +x+y, +x−y, −x−y, −x+y,
/// skipping mirrors that coincide on an axis.
#[inline]
fn push_symmetric(out: &mut Vec<(i32, i32)>, cx: i32, cy: i32, x: i32, y: i32) {
    out.push((cx + x, cy + y));
    if y != 0 {
        out.push((cx + x, cy - y));
    }
    if x != 0 {
        out.push((cx - x, cy - y));
        if y != 0 {
            out.push((cx - x, cy + y));
        }
    }
}

/// Outline cells of an axis-aligned ellipse using the midpoint algorithm.
///
/// Region 1 steps along X while `a²(2y−1) > 2b²(x+1)`, region 2 steps along Y
/// down to the major axis. Radii are taken as magnitudes. A zero radius on
/// either axis degrades to a straight run of cells, or to the center alone
/// when both are zero.
#[must_use]
pub fn ellipse_outline(center: (i32, i32), radius_x: i32, radius_y: i32) -> Vec<(i32, i32)> {
    let (cx, cy) = center;
    let rx = radius_x.abs();
    let ry = radius_y.abs();
    let mut cells = Vec::new();

    if rx == 0 || ry == 0 {
        for x in 0..=rx {
            for y in 0..=ry {
                if x == 0 || y == 0 {
                    push_symmetric(&mut cells, cx, cy, x, y);
                }
            }
        }
        return cells;
    }

    // Decision variables are scaled by 4 to stay integral and can exceed i64
    // for radii near COORD_LIMIT.
    let a2 = i128::from(rx) * i128::from(rx);
    let b2 = i128::from(ry) * i128::from(ry);
    let mut x: i32 = 0;
    let mut y: i32 = ry;

    let (xi, yi) = (i128::from(x), i128::from(y));
    let mut d = 4 * b2 * (xi + 1) * (xi + 1) + a2 * (2 * yi - 1) * (2 * yi - 1) - 4 * a2 * b2;

    while a2 * (2 * i128::from(y) - 1) > 2 * b2 * (i128::from(x) + 1) {
        push_symmetric(&mut cells, cx, cy, x, y);
        let (xi, yi) = (i128::from(x), i128::from(y));
        if d < 0 {
            d += 4 * b2 * (2 * xi + 3);
        } else {
            d += 4 * b2 * (2 * xi + 3) - 8 * a2 * (yi - 1);
            y -= 1;
        }
        x += 1;
    }

    let (xi, yi) = (i128::from(x), i128::from(y));
    d = b2 * (2 * xi + 1) * (2 * xi + 1) + 4 * a2 * (yi - 1) * (yi - 1) - 4 * a2 * b2;

    let mut tip = x;
    while y >= 0 {
        push_symmetric(&mut cells, cx, cy, x, y);
        if y == 0 {
            tip = x;
        }
        let (xi, yi) = (i128::from(x), i128::from(y));
        if d > 0 {
            d += 4 * a2 * (3 - 2 * yi);
        } else {
            d += 8 * b2 * (xi + 1) + 4 * a2 * (3 - 2 * yi);
            x += 1;
        }
        y -= 1;
    }

    // Flat ellipses leave region 1 by reaching y = 0 before the slope does,
    // which stops short of the horizontal tip.
    for x in tip + 1..=rx {
        push_symmetric(&mut cells, cx, cy, x, 0);
    }

    cells
}

// ============================================================================
// Rasterize impls
// ============================================================================

impl Rasterize for Point {
    fn rasterize_into(&self, out: &mut Vec<CellWrite>) {
        out.push(CellWrite::new(to_cell(self.x), to_cell(self.y), self.glyph, self.color));
    }
}

impl Rasterize for Segment {
    /// Both endpoints (as points), then the interior.
    fn rasterize_into(&self, out: &mut Vec<CellWrite>) {
        self.p1.rasterize_into(out);
        if (to_cell(self.p1.x), to_cell(self.p1.y)) != (to_cell(self.p2.x), to_cell(self.p2.y)) {
            self.p2.rasterize_into(out);
        }
        rasterize_segment_interior(self, out);
    }
}

impl Rasterize for Ellipse {
    fn rasterize_into(&self, out: &mut Vec<CellWrite>) {
        let center = (to_cell(self.x), to_cell(self.y));
        out.extend(
            ellipse_outline(center, to_cell(self.radius_x), to_cell(self.radius_y))
                .into_iter()
                .map(|(col, row)| CellWrite::new(col, row, self.glyph, self.color)),
        );
    }
}

impl Rasterize for Polygon {
    /// Every vertex (as a point), then the interior of every boundary segment.
    fn rasterize_into(&self, out: &mut Vec<CellWrite>) {
        for point in self.points() {
            point.rasterize_into(out);
        }
        for segment in self.boundary() {
            rasterize_segment_interior(&segment, out);
        }
    }
}

impl Rasterize for Primitive {
    fn rasterize_into(&self, out: &mut Vec<CellWrite>) {
        match self {
            Self::Point(p) => p.rasterize_into(out),
            Self::Segment(s) => s.rasterize_into(out),
            Self::Ellipse(e) => e.rasterize_into(out),
            Self::Polygon(poly) => poly.rasterize_into(out),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::connect;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y, Color::White)
    }

    #[test]
    fn test_segment_interior_canonical_path() {
        assert_eq!(segment_interior((0, 0), (4, 2)), vec![(1, 1), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_segment_interior_independent_of_direction() {
        assert_eq!(segment_interior((4, 2), (0, 0)), segment_interior((0, 0), (4, 2)));
        assert_eq!(segment_interior((0, 5), (3, -1)), segment_interior((3, -1), (0, 5)));
    }

    #[test]
    fn test_segment_interior_horizontal() {
        assert_eq!(segment_interior((2, 3), (6, 3)), vec![(3, 3), (4, 3), (5, 3)]);
    }

    #[test]
    fn test_segment_interior_vertical() {
        assert_eq!(segment_interior((1, 5), (1, 1)), vec![(1, 2), (1, 3), (1, 4)]);
    }

    #[test]
    fn test_segment_interior_degenerate() {
        assert!(segment_interior((3, 3), (3, 3)).is_empty());
        assert!(segment_interior((3, 3), (4, 4)).is_empty());
        assert!(segment_interior((3, 3), (4, 3)).is_empty());
    }

    #[test]
    fn test_segment_glyph_follows_major_axis() {
        let flat = connect(&pt(0.0, 0.0), &pt(4.0, 2.0)).rasterize();
        assert!(flat[2..].iter().all(|c| c.glyph == '='));

        let steep = connect(&pt(0.0, 0.0), &pt(2.0, 4.0)).rasterize();
        assert!(steep[2..].iter().all(|c| c.glyph == '|'));

        let diagonal = connect(&pt(0.0, 0.0), &pt(3.0, 3.0)).rasterize();
        assert!(diagonal[2..].iter().all(|c| c.glyph == '|'));
    }

    #[test]
    fn test_segment_endpoints_drawn_as_points() {
        let a = pt(0.0, 0.0).with_glyph('A');
        let b = Point::new(4.0, 2.0, Color::Red).with_glyph('B');
        let cells = Segment::new(a, b, Color::Green).rasterize();
        assert_eq!(cells[0], CellWrite::new(0, 0, 'A', Color::White));
        assert_eq!(cells[1], CellWrite::new(4, 2, 'B', Color::Red));
        assert!(cells[2..].iter().all(|c| c.color == Color::Green));
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_zero_length_segment_is_single_cell() {
        let cells = connect(&pt(2.7, 2.2), &pt(2.1, 2.9)).rasterize();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].position(), (2, 2));
    }

    #[test]
    fn test_to_cell_truncates_and_clamps() {
        assert_eq!(to_cell(3.9), 3);
        assert_eq!(to_cell(-3.9), -3);
        assert_eq!(to_cell(f64::NAN), 0);
        assert_eq!(to_cell(1e12), COORD_LIMIT);
        assert_eq!(to_cell(f64::NEG_INFINITY), -COORD_LIMIT);
    }

    #[test]
    fn test_ellipse_extremes() {
        let cells: HashSet<(i32, i32)> = ellipse_outline((10, 10), 5, 3).into_iter().collect();
        let min_x = cells.iter().map(|c| c.0).min().unwrap();
        let max_x = cells.iter().map(|c| c.0).max().unwrap();
        let min_y = cells.iter().map(|c| c.1).min().unwrap();
        let max_y = cells.iter().map(|c| c.1).max().unwrap();
        assert_eq!((min_x, max_x), (5, 15));
        assert_eq!((min_y, max_y), (7, 13));
        assert!(cells.contains(&(5, 10)));
        assert!(cells.contains(&(15, 10)));
        assert!(cells.contains(&(10, 7)));
        assert!(cells.contains(&(10, 13)));
    }

    #[test]
    fn test_ellipse_first_step_order() {
        let cells = ellipse_outline((10, 10), 5, 3);
        // Top/bottom apex first (x = 0 has no left mirror).
        assert_eq!(&cells[..2], &[(10, 13), (10, 7)]);
        // Then the four-way pattern +x+y, +x-y, -x-y, -x+y.
        assert_eq!(&cells[2..6], &[(11, 13), (11, 7), (9, 7), (9, 13)]);
    }

    #[test]
    fn test_ellipse_no_duplicate_cells() {
        let cells = ellipse_outline((0, 0), 7, 4);
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_ellipse_circle_is_closed_ring() {
        let cells: HashSet<(i32, i32)> = ellipse_outline((0, 0), 6, 6).into_iter().collect();
        // Every outline cell has an 8-neighbour on the outline.
        for &(x, y) in &cells {
            let neighbours = (-1..=1)
                .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
                .filter(|&(dx, dy)| (dx, dy) != (0, 0))
                .filter(|&(dx, dy)| cells.contains(&(x + dx, y + dy)))
                .count();
            assert!(neighbours >= 2, "cell ({x}, {y}) is isolated");
        }
    }

    #[test]
    fn test_flat_ellipse_reaches_tip() {
        let cells: HashSet<(i32, i32)> = ellipse_outline((0, 0), 40, 1).into_iter().collect();
        assert!(cells.contains(&(40, 0)));
        assert!(cells.contains(&(-40, 0)));
        for x in -40..=40 {
            assert!((-1..=1).any(|y| cells.contains(&(x, y))), "gap at column {x}");
        }
    }

    #[test]
    fn test_ellipse_zero_radii() {
        assert_eq!(ellipse_outline((4, 4), 0, 0), vec![(4, 4)]);

        let vertical: HashSet<_> = ellipse_outline((4, 4), 0, 2).into_iter().collect();
        let expected: HashSet<_> = (2..=6).map(|y| (4, y)).collect();
        assert_eq!(vertical, expected);

        let horizontal: HashSet<_> = ellipse_outline((4, 4), 3, 0).into_iter().collect();
        let expected: HashSet<_> = (1..=7).map(|x| (x, 4)).collect();
        assert_eq!(horizontal, expected);
    }

    #[test]
    fn test_ellipse_negative_radius_is_magnitude() {
        assert_eq!(ellipse_outline((0, 0), -5, 3), ellipse_outline((0, 0), 5, 3));
    }

    #[test]
    fn test_ellipse_rasterize_uses_glyph() {
        let cells = Ellipse::new(10.0, 10.0, 5.0, 3.0, Color::Cyan).with_glyph('o').rasterize();
        assert!(cells.iter().all(|c| c.glyph == 'o' && c.color == Color::Cyan));
    }

    #[test]
    fn test_polygon_vertices_then_edges() {
        let square = Polygon::rectangle(0.0, 0.0, 4.0, 2.0, Color::Yellow);
        let cells = square.rasterize();
        let positions: Vec<_> = cells.iter().map(CellWrite::position).collect();
        assert_eq!(&positions[..4], &[(0, 0), (4, 0), (4, 2), (0, 2)]);

        let outline: HashSet<_> = positions.into_iter().collect();
        // 4x2 rectangle outline: 5 + 5 top/bottom, 1 + 1 on the sides.
        assert_eq!(outline.len(), 12);
        assert!(outline.contains(&(2, 0)));
        assert!(outline.contains(&(0, 1)));
        assert!(!outline.contains(&(2, 1)));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let prim: Primitive = Polygon::rectangle(1.5, 2.5, 7.0, 3.0, Color::Red).into();
        assert_eq!(rasterize(&prim), rasterize(&prim));
    }

    proptest! {
        #[test]
        fn prop_segment_interior_within_bounding_box(
            x0 in -200i32..200, y0 in -200i32..200, x1 in -200i32..200, y1 in -200i32..200,
        ) {
            for (x, y) in segment_interior((x0, y0), (x1, y1)) {
                prop_assert!(x >= x0.min(x1) && x <= x0.max(x1));
                prop_assert!(y >= y0.min(y1) && y <= y0.max(y1));
                prop_assert!((x, y) != (x0, y0) && (x, y) != (x1, y1));
            }
        }

        #[test]
        fn prop_segment_interior_one_cell_per_major_step(
            x0 in -200i32..200, y0 in -200i32..200, x1 in -200i32..200, y1 in -200i32..200,
        ) {
            let major = (x1 - x0).abs().max((y1 - y0).abs());
            let cells = segment_interior((x0, y0), (x1, y1));
            prop_assert_eq!(cells.len() as i32, (major - 1).max(0));
        }

        #[test]
        fn prop_ellipse_symmetric(
            cx in -100i32..100, cy in -100i32..100, rx in 0i32..60, ry in 0i32..60,
        ) {
            let cells: HashSet<(i32, i32)> = ellipse_outline((cx, cy), rx, ry).into_iter().collect();
            for &(x, y) in &cells {
                prop_assert!(cells.contains(&(2 * cx - x, y)));
                prop_assert!(cells.contains(&(x, 2 * cy - y)));
            }
        }

        #[test]
        fn prop_ellipse_within_bounds(
            rx in 0i32..60, ry in 0i32..60,
        ) {
            for (x, y) in ellipse_outline((0, 0), rx, ry) {
                prop_assert!(x.abs() <= rx && y.abs() <= ry);
            }
        }
    }
}
