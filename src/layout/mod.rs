//! Layout metrics and drawing surface
//!
//! The tree never computes pixel metrics itself: spacing constants come from
//! a [`LayoutConfig`], text is measured by a [`LayoutMetrics`] provider and
//! painting goes through a [`Canvas`].

pub mod canvas;
pub mod config;

pub use canvas::{Canvas, DrawOp, Paint, RecordingCanvas};
pub use config::{ConfigError, LayoutConfig};

use serde::{Deserialize, Serialize};

/// Provider of spacing constants and text measurement
pub trait LayoutMetrics {
    /// Spacing constants
    fn config(&self) -> &LayoutConfig;

    /// Width of `text` when rendered with the block font
    fn measure_text(&self, text: &str) -> f32;

    /// Height of one rendered text line
    fn text_height(&self) -> f32;

    /// Distance from the vertical center of a line to the text baseline
    fn baseline_offset(&self) -> f32 {
        0.0
    }
}

/// Fixed-pitch metrics derived from the configured text size
///
/// Every character is `text_size / 2` wide and a text line is `text_size`
/// tall. Useful for headless layout and deterministic tests.
#[derive(Debug, Clone)]
pub struct MonospaceMetrics {
    config: LayoutConfig,
    char_width: f32,
}

impl MonospaceMetrics {
    pub fn new(config: LayoutConfig) -> Self {
        let char_width = config.text_size / 2.0;
        Self { config, char_width }
    }

    pub fn with_char_width(mut self, char_width: f32) -> Self {
        self.char_width = char_width;
        self
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutMetrics for MonospaceMetrics {
    fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }

    fn text_height(&self) -> f32 {
        self.config.text_size
    }

    fn baseline_offset(&self) -> f32 {
        self.config.text_size / 4.0
    }
}

/// Axis-aligned rectangle in node-local or canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the point lies inside the rectangle, edges included
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Whether `other` lies fully inside this rectangle
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_measurement() {
        let metrics = MonospaceMetrics::default();
        assert_eq!(metrics.measure_text(""), 0.0);
        assert_eq!(metrics.measure_text("abc"), 30.0);
        assert_eq!(metrics.text_height(), 20.0);

        let narrow = MonospaceMetrics::default().with_char_width(4.0);
        assert_eq!(narrow.measure_text("abcd"), 16.0);
    }

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.center(), (25.0, 40.0));
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(40.0, 60.0));
        assert!(!rect.contains(41.0, 30.0));
        assert!(rect.encloses(&Rect::new(15.0, 25.0, 5.0, 5.0)));
        assert!(!rect.encloses(&Rect::new(35.0, 25.0, 10.0, 5.0)));
        assert_eq!(rect.translate(1.0, 2.0), Rect::new(11.0, 22.0, 30.0, 40.0));
    }
}
