//! Rasterization of primitives into cell writes.
//!
//! Every function here is pure and deterministic: the same primitive always
//! yields the same ordered sequence of [`CellWrite`]s.
//!
//! # Algorithms
//!
//! - **Bresenham's Line**: integer stepping along the major axis; only the
//!   interior cells are produced, endpoints belong to their points
//! - **Midpoint Ellipse**: two-region integer midpoint algorithm with
//!   four-way symmetry
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Van Aken, J. R. (1984). "An Efficient Ellipse-Drawing Algorithm." IEEE CG&A.

mod primitives;

pub use primitives::{
    ellipse_outline, rasterize, segment_interior, to_cell, CellWrite, Rasterize, COORD_LIMIT,
};
