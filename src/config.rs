//! Scene configuration.
//!
//! YAML documents with every field defaulted, so an empty file is a valid
//! configuration:
//!
//! ```yaml
//! version: 1
//! mode: colored_symbol
//! frame_interval_ms: 16
//! background: black
//! foreground: white
//! glyphs:
//!   point: '*'
//!   horizontal: '='
//!   vertical: '|'
//!   ellipse: '*'
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::canvas::{Cell, DrawMode};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::{
    Ellipse, Point, Polygon, Segment, DEFAULT_ELLIPSE_GLYPH, DEFAULT_HORIZONTAL_GLYPH,
    DEFAULT_POINT_GLYPH, DEFAULT_VERTICAL_GLYPH,
};

/// Highest configuration version this crate understands.
pub const CONFIG_VERSION: u32 = 1;

/// Glyphs applied by the builder methods on this type.
///
/// Only primitives built through [`GlyphSet::point`], [`GlyphSet::segment`],
/// [`GlyphSet::ellipse`] and [`GlyphSet::polygon`] pick these up. `Point::new`,
/// `connect` and the other plain constructors keep the `DEFAULT_*` glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphSet {
    /// Point glyph.
    #[serde(default = "default_point")]
    pub point: char,
    /// Segment and polygon glyph where X is the major axis.
    #[serde(default = "default_horizontal")]
    pub horizontal: char,
    /// Segment and polygon glyph where Y is the major axis.
    #[serde(default = "default_vertical")]
    pub vertical: char,
    /// Ellipse outline glyph.
    #[serde(default = "default_ellipse")]
    pub ellipse: char,
}

fn default_point() -> char {
    DEFAULT_POINT_GLYPH
}
fn default_horizontal() -> char {
    DEFAULT_HORIZONTAL_GLYPH
}
fn default_vertical() -> char {
    DEFAULT_VERTICAL_GLYPH
}
fn default_ellipse() -> char {
    DEFAULT_ELLIPSE_GLYPH
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self {
            point: default_point(),
            horizontal: default_horizontal(),
            vertical: default_vertical(),
            ellipse: default_ellipse(),
        }
    }
}

impl GlyphSet {
    /// A point drawn with this set's point glyph.
    #[must_use]
    pub fn point(&self, x: f64, y: f64, color: Color) -> Point {
        Point::new(x, y, color).with_glyph(self.point)
    }

    /// A segment whose endpoints and interior use this set's glyphs.
    #[must_use]
    pub fn segment(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color) -> Segment {
        Segment::new(self.point(x1, y1, color), self.point(x2, y2, color), color)
            .with_glyphs(self.horizontal, self.vertical)
    }

    /// An ellipse drawn with this set's ellipse glyph.
    #[must_use]
    pub fn ellipse(&self, x: f64, y: f64, radius_x: f64, radius_y: f64, color: Color) -> Ellipse {
        Ellipse::new(x, y, radius_x, radius_y, color).with_glyph(self.ellipse)
    }

    /// A polygon through `vertices`, every vertex and edge using this set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPolygon`] if `vertices` is empty.
    pub fn polygon(
        &self,
        vertices: impl IntoIterator<Item = (f64, f64)>,
        color: Color,
    ) -> Result<Polygon> {
        let points = vertices.into_iter().map(|(x, y)| self.point(x, y, color));
        Ok(Polygon::new(points, color)?.with_glyphs(self.horizontal, self.vertical))
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, char)> {
        [
            ("glyphs.point", self.point),
            ("glyphs.horizontal", self.horizontal),
            ("glyphs.vertical", self.vertical),
            ("glyphs.ellipse", self.ellipse),
        ]
        .into_iter()
    }
}

/// Scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// How colors are applied to cells.
    #[serde(default)]
    pub mode: DrawMode,

    /// Pause between redraw passes in milliseconds. 0 redraws continuously.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Color of empty cells.
    #[serde(default = "default_background")]
    pub background: Color,

    /// Foreground color of empty cells.
    #[serde(default = "default_foreground")]
    pub foreground: Color,

    /// Glyphs for primitives built through [`GlyphSet`].
    #[serde(default)]
    pub glyphs: GlyphSet,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_background() -> Color {
    Color::Black
}
fn default_foreground() -> Color {
    Color::White
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            mode: DrawMode::default(),
            frame_interval_ms: default_frame_interval_ms(),
            background: default_background(),
            foreground: default_foreground(),
            glyphs: GlyphSet::default(),
        }
    }
}

impl SceneConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails, or
    /// [`Error::ConfigInvalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse { line, message: e.to_string() }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// `<config dir>/glyph-canvas/config.yaml`, if the platform has a config
    /// directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glyph-canvas").join("config.yaml"))
    }

    /// Checks values serde cannot express constraints for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(Error::ConfigInvalid {
                key: "version".to_string(),
                message: format!("unsupported version {}", self.version),
            });
        }
        if let Some((key, glyph)) = self.glyphs.iter().find(|(_, g)| g.is_control()) {
            return Err(Error::ConfigInvalid {
                key: key.to_string(),
                message: format!("{glyph:?} is a control character"),
            });
        }
        Ok(())
    }

    /// Pause between redraw passes.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// The cell empty slots are cleared to.
    #[must_use]
    pub fn blank_cell(&self) -> Cell {
        Cell::blank(self.foreground, self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = SceneConfig::new();

        assert_eq!(config.version, 1);
        assert_eq!(config.mode, DrawMode::ColoredSymbol);
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        assert_eq!(config.blank_cell(), Cell::default());
        assert_eq!(config.glyphs.point, '*');
    }

    #[test]
    fn test_config_parse_empty() {
        assert_eq!(SceneConfig::parse("{}").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r"
version: 1
mode: colored_block
frame_interval_ms: 0
background: dark_blue
foreground: yellow
glyphs:
  point: 'o'
  horizontal: '-'
";

        let config = SceneConfig::parse(yaml).unwrap();

        assert_eq!(config.mode, DrawMode::ColoredBlock);
        assert_eq!(config.frame_interval(), Duration::ZERO);
        assert_eq!(config.background, Color::DarkBlue);
        assert_eq!(config.foreground, Color::Yellow);
        assert_eq!(config.glyphs.point, 'o');
        assert_eq!(config.glyphs.horizontal, '-');
        // Unset glyphs keep their defaults.
        assert_eq!(config.glyphs.vertical, '|');
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r"
version: 1
mode: colored_symbol
frame_interval_ms: not_a_number
";

        let err = SceneConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { line: 4, .. }), "got {err}");
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_config_rejects_future_version() {
        let err = SceneConfig::parse("version: 2").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { ref key, .. } if key == "version"));
    }

    #[test]
    fn test_config_rejects_control_glyph() {
        let err = SceneConfig::parse("glyphs:\n  vertical: \"\\t\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { ref key, .. } if key == "glyphs.vertical"));
    }

    #[test]
    fn test_config_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode: colored_block\nframe_interval_ms: 40").unwrap();

        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.mode, DrawMode::ColoredBlock);
        assert_eq!(config.frame_interval_ms, 40);
    }

    #[test]
    fn test_config_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        assert!(matches!(SceneConfig::load(&path), Err(Error::ConfigNotFound(_))));
        assert_eq!(SceneConfig::load_or_default(&path), SceneConfig::default());
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = SceneConfig::default_path() {
            assert!(path.ends_with("glyph-canvas/config.yaml"));
        }
    }

    #[test]
    fn test_glyph_set_builders() {
        let glyphs = GlyphSet { point: 'o', horizontal: '-', vertical: '!', ellipse: '@' };

        let seg = glyphs.segment(0.0, 0.0, 4.0, 2.0, Color::Red);
        assert_eq!((seg.p1.glyph, seg.horizontal_glyph, seg.vertical_glyph), ('o', '-', '!'));
        assert_eq!(glyphs.ellipse(0.0, 0.0, 1.0, 1.0, Color::Red).glyph, '@');

        let poly = glyphs.polygon([(0.0, 0.0), (1.0, 0.0)], Color::Red).unwrap();
        assert!(poly.points().iter().all(|p| p.glyph == 'o'));
        assert_eq!(poly.horizontal_glyph, '-');
        assert!(glyphs.polygon(Vec::new(), Color::Red).is_err());
    }

    #[test]
    fn test_plain_constructors_ignore_glyph_set() {
        let glyphs = GlyphSet { point: 'o', ..GlyphSet::default() };

        assert_eq!(glyphs.point(1.0, 1.0, Color::Red).glyph, 'o');
        assert_eq!(Point::new(1.0, 1.0, Color::Red).glyph, DEFAULT_POINT_GLYPH);
        assert_eq!(Ellipse::new(0.0, 0.0, 1.0, 1.0, Color::Red).glyph, DEFAULT_ELLIPSE_GLYPH);
    }
}
