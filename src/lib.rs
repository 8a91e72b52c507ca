//! # Glyph-Canvas
//!
//! Vector 2D drawing on character-cell displays.
//!
//! Points, line segments, axis-aligned ellipses and polygons are rasterized
//! into cell writes and kept drawn by a [`Scene`](scene::Scene), which redraws
//! every attached primitive in the background and moves primitives without
//! leaving stale cells behind.
//!
//! ## Quick Start
//!
//! ```rust
//! use glyph_canvas::prelude::*;
//!
//! let display = VirtualDisplay::new(20, 10);
//! let scene = Scene::new(display.clone(), &SceneConfig::default())?;
//!
//! let a = Point::new(1.0, 1.0, Color::Yellow).named("A");
//! let b = Point::new(9.0, 5.0, Color::Yellow).named("B");
//! let handle = scene.add(connect(&a, &b))?;
//!
//! handle.translate(5.0, 2.0)?;
//! assert_eq!(display.cell(3, 6).map(|c| c.glyph), Some('*'));
//! # Ok::<(), glyph_canvas::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `terminal`: [`TerminalSink`](output::TerminalSink), drawing on a real
//!   terminal through crossterm
//!
//! ## Algorithms
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital
//!   plotter." IBM Systems Journal 4(1).
//! - Van Aken, J. R. (1984). "An Efficient Ellipse-Drawing Algorithm."
//!   IEEE CG&A 4(9).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Grid arithmetic moves between f64, i32 and u16 constantly
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Console color palette.
pub mod color;

/// Geometric primitives (points, segments, ellipses, polygons).
pub mod geometry;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Rasterization of primitives into cell writes.
pub mod render;

/// Cell buffer mirrored onto a sink.
pub mod canvas;

/// Cell sinks (in-memory display, terminal).
pub mod output;

// ============================================================================
// Scene
// ============================================================================

/// Live primitive set with background redraw.
pub mod scene;

/// YAML scene configuration.
pub mod config;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for glyph-canvas operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use glyph_canvas::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, Cell, DrawMode};
    pub use crate::color::Color;
    pub use crate::config::{GlyphSet, SceneConfig};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{connect, Ellipse, Point, Polygon, Primitive, Rect, Segment};
    #[cfg(feature = "terminal")]
    pub use crate::output::TerminalSink;
    pub use crate::output::{CellSink, VirtualDisplay};
    pub use crate::render::{rasterize, CellWrite, Rasterize};
    pub use crate::scene::{Scene, ShapeHandle, ShapeId};
}
