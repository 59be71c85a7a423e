//! Drawing surface abstraction

use super::Rect;

/// Fill used for a rectangle, tagged with the schema category it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paint {
    /// Block body and connector rail
    Body(usize),
    /// Socket that neither takes nor hands out a typed value
    CodeField(usize),
    /// Typed input socket
    InputField(usize),
    /// Typed output socket
    OutputField(usize),
}

/// Paint target for block trees
pub trait Canvas {
    fn width(&self) -> f32;

    fn height(&self) -> f32;

    fn draw_rect(&mut self, rect: Rect, paint: Paint);

    /// Draw `text` starting at `x` with its baseline at `baseline`
    fn draw_text(&mut self, text: &str, x: f32, baseline: f32);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect(Rect, Paint),
    Text { text: String, x: f32, baseline: f32 },
}

/// Canvas that records draw calls instead of painting them
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Texts drawn so far, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rect(..) => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<(Rect, Paint)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect(rect, paint) => Some((*rect, *paint)),
                DrawOp::Text { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn draw_rect(&mut self, rect: Rect, paint: Paint) {
        self.ops.push(DrawOp::Rect(rect, paint));
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            baseline,
        });
    }
}
