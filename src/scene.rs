//! Live scene of primitives with a background redraw loop.
//!
//! A [`Scene`] owns the canvas and the primitives drawn on it. A worker
//! thread re-rasterizes every primitive on each pass, so cells overwritten
//! from outside heal at loop frequency. All canvas writes, from the worker or
//! from a [`ShapeHandle`], happen under one lock, and a position change runs
//! its erase, mutate and draw steps inside a single critical section.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::canvas::{Canvas, Cell, DrawMode};
use crate::config::{GlyphSet, SceneConfig};
use crate::error::{Error, Result};
use crate::geometry::Primitive;
use crate::output::CellSink;
use crate::render::{CellWrite, Rasterize};

/// Identifier of a primitive within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Entry {
    id: ShapeId,
    primitive: Primitive,
    /// Cells of the most recent draw.
    footprint: Vec<CellWrite>,
}

impl Entry {
    /// Rasterize and paint, remembering what was drawn.
    ///
    /// A primitive lying wholly off the grid keeps its footprint but paints
    /// nothing.
    fn draw(&mut self, canvas: &mut Canvas) -> Result<()> {
        self.footprint.clear();
        self.primitive.rasterize_into(&mut self.footprint);
        if !canvas.overlaps(&self.primitive.bounds()) {
            return Ok(());
        }
        self.footprint.iter().try_for_each(|write| canvas.paint(write))
    }

    fn erase(&self, canvas: &mut Canvas) -> Result<()> {
        self.footprint.iter().try_for_each(|write| canvas.erase(write))
    }
}

#[derive(Debug)]
struct SceneState {
    canvas: Canvas,
    entries: Vec<Entry>,
    next_id: u64,
}

impl SceneState {
    fn entry_mut(&mut self, id: ShapeId) -> Result<(&mut Canvas, &mut Entry)> {
        let entry =
            self.entries.iter_mut().find(|e| e.id == id).ok_or(Error::Detached { id })?;
        Ok((&mut self.canvas, entry))
    }

    fn entry(&self, id: ShapeId) -> Result<&Entry> {
        self.entries.iter().find(|e| e.id == id).ok_or(Error::Detached { id })
    }

    /// One full, non-differential pass over every primitive.
    fn redraw_all(&mut self) -> Result<()> {
        let Self { canvas, entries, .. } = self;
        canvas.frame(|canvas| entries.iter_mut().try_for_each(|entry| entry.draw(canvas)))
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SceneState>,
    running: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SceneState> {
        // Cell state stays consistent cell-by-cell; a panic mid-pass at worst
        // leaves stale cells for the next pass to fix.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether the redraw loop is currently failing.
///
/// A sink that keeps rejecting writes is reported when passes start failing
/// and again when they recover, not once per pass.
#[derive(Debug, Default)]
struct PassHealth {
    failing: bool,
}

impl PassHealth {
    /// Log state changes; returns `true` if this pass changed the state.
    fn record(&mut self, pass: Result<()>) -> bool {
        match pass {
            Err(e) if !self.failing => {
                warn!("redraw pass failed: {e} (further failures are not logged)");
                self.failing = true;
                true
            }
            Ok(()) if self.failing => {
                info!("redraw passes succeeding again");
                self.failing = false;
                true
            }
            Err(_) | Ok(()) => false,
        }
    }
}

fn run_redraw_loop(shared: &Shared, frame_interval: Duration) {
    debug!("redraw loop started ({frame_interval:?} between passes)");
    let mut health = PassHealth::default();
    loop {
        if frame_interval.is_zero() {
            thread::yield_now();
        } else {
            thread::park_timeout(frame_interval);
        }
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        health.record(shared.lock().redraw_all());
    }
    debug!("redraw loop stopped");
}

/// A set of primitives kept drawn on a cell sink.
///
/// Dropping the scene stops the redraw loop and clears the canvas; use
/// [`Scene::shutdown`] to observe errors from that final clear.
pub struct Scene {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    mode: DrawMode,
    glyphs: GlyphSet,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("mode", &self.mode)
            .field("len", &self.len())
            .field("running", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Size a canvas to `sink`, clear it and start the redraw loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails during the initial clear or the
    /// worker thread cannot be spawned.
    pub fn new<S: CellSink + 'static>(sink: S, config: &SceneConfig) -> Result<Self> {
        let canvas = Canvas::new(Box::new(sink), config.mode, config.blank_cell())?;
        debug!("scene started on a {}x{} canvas", canvas.width(), canvas.height());

        let shared = Arc::new(Shared {
            state: Mutex::new(SceneState { canvas, entries: Vec::new(), next_id: 0 }),
            running: AtomicBool::new(true),
        });

        let frame_interval = config.frame_interval();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("glyph-canvas-redraw".to_string())
            .spawn(move || run_redraw_loop(&worker_shared, frame_interval))?;

        Ok(Self { shared, worker: Some(worker), mode: config.mode, glyphs: config.glyphs })
    }

    /// Attach a primitive and draw it immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the draw. The primitive is then
    /// not attached, and whatever part of it reached the canvas is erased.
    pub fn add(&self, primitive: impl Into<Primitive>) -> Result<ShapeHandle> {
        let primitive = primitive.into();
        let mut state = self.shared.lock();

        let id = ShapeId::new(state.next_id);
        state.next_id += 1;
        let mut entry = Entry { id, primitive, footprint: Vec::new() };

        let SceneState { canvas, entries, .. } = &mut *state;
        if let Err(e) = canvas.frame(|canvas| entry.draw(canvas)) {
            if let Err(erase) = canvas.frame(|canvas| entry.erase(canvas)) {
                debug!("could not erase rejected {} {id}: {erase}", entry.primitive.kind());
            }
            return Err(e);
        }

        debug!("attached {} {id}", entry.primitive.kind());
        entries.push(entry);
        Ok(ShapeHandle { id, scene: Arc::downgrade(&self.shared) })
    }

    /// Number of attached primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    /// Whether no primitive is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the attached primitives in insertion order.
    #[must_use]
    pub fn primitives(&self) -> Vec<Primitive> {
        self.shared.lock().entries.iter().map(|e| e.primitive.clone()).collect()
    }

    /// Drawing mode chosen at construction.
    #[must_use]
    pub const fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Glyphs configured for this scene.
    #[must_use]
    pub const fn glyphs(&self) -> &GlyphSet {
        &self.glyphs
    }

    /// Canvas size as `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u16, u16) {
        let state = self.shared.lock();
        (state.canvas.width(), state.canvas.height())
    }

    /// Read back a canvas slot.
    #[must_use]
    pub fn cell(&self, row: i32, col: i32) -> Option<Cell> {
        self.shared.lock().canvas.get_cell(row, col)
    }

    /// Run one redraw pass now, on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the first sink error of the pass.
    pub fn redraw(&self) -> Result<()> {
        self.shared.lock().redraw_all()
    }

    /// Stop the redraw loop, detach everything and clear the canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the final clear.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.shared.running.store(false, Ordering::Release);
        worker.thread().unpark();
        if worker.join().is_err() {
            warn!("redraw loop panicked");
        }

        let mut state = self.shared.lock();
        state.entries.clear();
        debug!("scene stopped");
        state.canvas.clear()
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("failed to clear canvas on teardown: {e}");
        }
    }
}

/// Handle to a primitive attached to a [`Scene`].
///
/// The handle does not keep the scene alive. Once the primitive is removed or
/// the scene is shut down every operation fails with [`Error::Detached`].
#[derive(Debug, Clone)]
pub struct ShapeHandle {
    id: ShapeId,
    scene: Weak<Shared>,
}

impl ShapeHandle {
    /// The primitive's identifier.
    #[must_use]
    pub const fn id(&self) -> ShapeId {
        self.id
    }

    fn shared(&self) -> Result<Arc<Shared>> {
        self.scene.upgrade().ok_or(Error::Detached { id: self.id })
    }

    fn read<T>(&self, f: impl FnOnce(&Entry) -> T) -> Result<T> {
        let shared = self.shared()?;
        let state = shared.lock();
        state.entry(self.id).map(f)
    }

    /// Erase the last footprint, apply `mutate`, draw again. The three steps
    /// hold the scene lock throughout, so neither the redraw loop nor another
    /// handle can observe or paint over a half-moved primitive.
    fn reposition_with(&self, mutate: impl FnOnce(&mut Primitive)) -> Result<()> {
        let shared = self.shared()?;
        let mut state = shared.lock();
        let (canvas, entry) = state.entry_mut(self.id)?;
        canvas.frame(|canvas| {
            entry.erase(canvas)?;
            mutate(&mut entry.primitive);
            entry.draw(canvas)
        })
    }

    /// Move the anchor to an absolute X; the rest of the shape follows.
    ///
    /// The anchor is the point itself, a segment's first endpoint, an
    /// ellipse's center or a polygon's first vertex.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if the primitive is no longer in a live scene, or
    /// a sink error.
    pub fn set_x(&self, x: f64) -> Result<()> {
        self.reposition_with(|p| p.set_x(x))
    }

    /// Move the anchor to an absolute Y; the rest of the shape follows.
    ///
    /// # Errors
    ///
    /// See [`ShapeHandle::set_x`].
    pub fn set_y(&self, y: f64) -> Result<()> {
        self.reposition_with(|p| p.set_y(y))
    }

    /// Move the anchor to `(x, y)` in one update.
    ///
    /// # Errors
    ///
    /// See [`ShapeHandle::set_x`].
    pub fn reposition(&self, x: f64, y: f64) -> Result<()> {
        self.reposition_with(|p| {
            p.set_x(x);
            p.set_y(y);
        })
    }

    /// Move by a delta.
    ///
    /// # Errors
    ///
    /// See [`ShapeHandle::set_x`].
    pub fn translate(&self, dx: f64, dy: f64) -> Result<()> {
        self.reposition_with(|p| p.translate(dx, dy))
    }

    /// Draw the primitive again without moving it.
    ///
    /// # Errors
    ///
    /// See [`ShapeHandle::set_x`].
    pub fn draw(&self) -> Result<()> {
        let shared = self.shared()?;
        let mut state = shared.lock();
        let (canvas, entry) = state.entry_mut(self.id)?;
        canvas.frame(|canvas| entry.draw(canvas))
    }

    /// Erase the primitive and drop it from the scene.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if it was already removed, or a sink error from the
    /// erase (the primitive is removed regardless).
    pub fn remove(&self) -> Result<()> {
        let shared = self.shared()?;
        let mut state = shared.lock();
        let index = state
            .entries
            .iter()
            .position(|e| e.id == self.id)
            .ok_or(Error::Detached { id: self.id })?;
        let entry = state.entries.remove(index);
        debug!("removing {} {}", entry.primitive.kind(), self.id);
        state.canvas.frame(|canvas| entry.erase(canvas))
    }

    /// Snapshot of the primitive.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if the primitive is no longer in a live scene.
    pub fn primitive(&self) -> Result<Primitive> {
        self.read(|e| e.primitive.clone())
    }

    /// Segment length, `None` for other kinds.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if the primitive is no longer in a live scene.
    pub fn length(&self) -> Result<Option<f64>> {
        self.read(|e| e.primitive.length())
    }

    /// Polygon perimeter or ellipse circumference, `None` for other kinds.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if the primitive is no longer in a live scene.
    pub fn perimeter(&self) -> Result<Option<f64>> {
        self.read(|e| e.primitive.perimeter())
    }

    /// Cells of the most recent draw.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if the primitive is no longer in a live scene.
    pub fn footprint(&self) -> Result<Vec<CellWrite>> {
        self.read(|e| e.footprint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::{connect, Ellipse, Point, Polygon};
    use crate::output::VirtualDisplay;
    use approx::assert_relative_eq;

    /// A scene whose loop never wakes during a test, so tests see exactly
    /// the writes they cause.
    fn scene(width: u16, height: u16) -> (Scene, VirtualDisplay) {
        let display = VirtualDisplay::new(width, height);
        let config = SceneConfig { frame_interval_ms: 3_600_000, ..SceneConfig::default() };
        let scene = Scene::new(display.clone(), &config).unwrap();
        (scene, display)
    }

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y, Color::Green)
    }

    #[test]
    fn test_add_draws_immediately() {
        let (scene, display) = scene(10, 5);
        let handle = scene.add(pt(3.0, 2.0)).unwrap();

        assert_eq!(display.row_text(2), "   *      ");
        assert_eq!(scene.cell(2, 3).map(|c| c.foreground), Some(Color::Green));
        assert_eq!(handle.footprint().unwrap(), vec![CellWrite::new(3, 2, '*', Color::Green)]);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_move_leaves_no_ghost() {
        let (scene, display) = scene(10, 10);
        let handle = scene.add(pt(0.0, 0.0)).unwrap();

        handle.reposition(5.0, 5.0).unwrap();

        assert_eq!(scene.cell(0, 0), Some(Cell::default()));
        assert_eq!(display.cell(0, 0), Some(Cell::default()));
        assert_eq!(display.cell(5, 5).map(|c| c.glyph), Some('*'));
    }

    #[test]
    fn test_set_x_is_idempotent() {
        let (scene, display) = scene(12, 6);
        let handle = scene.add(connect(&pt(1.0, 1.0), &pt(5.0, 3.0))).unwrap();

        handle.set_x(4.0).unwrap();
        let once = display.text();
        handle.set_x(4.0).unwrap();

        assert_eq!(display.text(), once);
        assert_eq!(handle.primitive().unwrap().anchor(), (4.0, 1.0));
    }

    #[test]
    fn test_composite_moves_every_vertex() {
        let (scene, display) = scene(20, 10);
        let square = Polygon::rectangle(1.0, 1.0, 3.0, 2.0, Color::Red);
        let handle = scene.add(square).unwrap();
        let before = handle.footprint().unwrap();

        handle.translate(10.0, 5.0).unwrap();

        for write in &before {
            assert_eq!(display.cell(write.row as u16, write.col as u16), Some(Cell::default()));
        }
        let after = handle.footprint().unwrap();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|w| w.col >= 11 && w.row >= 6));
        assert_relative_eq!(handle.perimeter().unwrap().unwrap(), 10.0);
    }

    #[test]
    fn test_remove_erases_and_detaches() {
        let (scene, display) = scene(8, 8);
        let handle = scene.add(Ellipse::new(4.0, 4.0, 2.0, 2.0, Color::Blue)).unwrap();
        assert_ne!(display.text().trim(), "");

        handle.remove().unwrap();

        assert!(scene.is_empty());
        assert_eq!(display.text().trim(), "");
        assert!(matches!(handle.set_x(1.0), Err(Error::Detached { .. })));
        assert!(matches!(handle.remove(), Err(Error::Detached { .. })));
        assert!(matches!(handle.primitive(), Err(Error::Detached { .. })));
    }

    #[test]
    fn test_handles_detach_on_shutdown() {
        let (scene, display) = scene(6, 3);
        let handle = scene.add(pt(1.0, 1.0)).unwrap();

        scene.shutdown().unwrap();

        assert!(matches!(handle.draw(), Err(Error::Detached { .. })));
        assert!(matches!(handle.length(), Err(Error::Detached { .. })));
        assert_eq!(display.text(), "      \n      \n      \n");
    }

    #[test]
    fn test_handles_detach_on_drop() {
        let (scene, _display) = scene(6, 3);
        let handle = scene.add(pt(1.0, 1.0)).unwrap();
        drop(scene);
        assert!(matches!(handle.translate(1.0, 0.0), Err(Error::Detached { .. })));
    }

    #[test]
    fn test_redraw_heals_external_overwrite() {
        let (scene, mut display) = scene(6, 3);
        scene.add(pt(2.0, 1.0)).unwrap();

        display.emit(1, 2, 'x', Color::White, Color::Black).unwrap();
        scene.redraw().unwrap();

        assert_eq!(display.cell(1, 2).map(|c| c.glyph), Some('*'));
    }

    #[test]
    fn test_metrics_through_handle() {
        let (scene, _display) = scene(10, 10);
        let seg = scene.add(connect(&pt(0.0, 0.0), &pt(3.0, 4.0))).unwrap();
        assert_eq!(seg.length().unwrap(), Some(5.0));
        assert_eq!(seg.perimeter().unwrap(), None);
        assert_eq!(scene.primitives().len(), 1);
    }

    #[test]
    fn test_colored_block_mode() {
        let display = VirtualDisplay::new(4, 4);
        let config = SceneConfig {
            mode: DrawMode::ColoredBlock,
            frame_interval_ms: 3_600_000,
            ..SceneConfig::default()
        };
        let scene = Scene::new(display.clone(), &config).unwrap();
        scene.add(pt(1.0, 1.0)).unwrap();

        let cell = display.cell(1, 1).unwrap();
        assert_eq!((cell.foreground, cell.background), (Color::Green, Color::Green));
        assert_eq!(scene.mode(), DrawMode::ColoredBlock);
    }

    #[test]
    fn test_rejected_add_is_not_attached() {
        let (scene, display) = scene(10, 3);
        display.fail_writes(true);

        assert!(scene.add(pt(2.0, 1.0)).is_err());

        display.fail_writes(false);
        scene.redraw().unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.cell(1, 2), Some(Cell::default()));
        assert_eq!(display.row_text(1), "          ");

        // Later additions are unaffected.
        let handle = scene.add(pt(4.0, 1.0)).unwrap();
        assert_eq!(display.row_text(1), "    *     ");
        handle.remove().unwrap();
        assert!(scene.is_empty());
    }

    #[test]
    fn test_redraw_queries_sink_once_per_pass() {
        let (scene, display) = scene(10, 4);
        scene.add(connect(&pt(-50.0, 1.0), &pt(60.0, 1.0))).unwrap();
        scene.add(Ellipse::new(500.0, 500.0, 20.0, 10.0, Color::Red)).unwrap();
        let before = display.dimension_queries();

        scene.redraw().unwrap();

        assert_eq!(display.dimension_queries(), before + 1);
        assert_eq!(display.row_text(1), "==========");
    }

    #[test]
    fn test_off_grid_primitive_keeps_footprint() {
        let (scene, display) = scene(6, 3);
        let before = display.emit_count();
        let handle = scene.add(Ellipse::new(100.0, 100.0, 3.0, 2.0, Color::Red)).unwrap();

        assert!(!handle.footprint().unwrap().is_empty());
        assert_eq!(display.emit_count(), before);

        handle.reposition(3.0, 1.0).unwrap();
        assert!(display.text().contains('*'));
    }

    #[test]
    fn test_pass_health_logs_transitions_only() {
        let mut health = PassHealth::default();
        let broken = || Err(Error::Io(std::io::Error::other("gone")));

        let changes: Vec<bool> = [broken(), broken(), broken(), Ok(()), Ok(()), broken()]
            .into_iter()
            .map(|pass| health.record(pass))
            .collect();

        assert_eq!(changes, vec![true, false, false, true, false, true]);
    }

    #[test]
    fn test_shape_id_display() {
        assert_eq!(ShapeId::new(3).to_string(), "#3");
        assert_eq!(ShapeId::new(3).get(), 3);
    }
}
