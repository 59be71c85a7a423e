//! Painting block trees onto a [`Canvas`]

use super::node::{BlockNode, LineContent, SlotContent};
use super::sequence::BlockSequence;
use crate::core::schema::{IoKind, Slot};
use crate::layout::{Canvas, LayoutMetrics, Paint, Rect};

fn field_paint(kind: IoKind, category: usize) -> Paint {
    if kind.is_input() {
        Paint::InputField(category)
    } else if kind.is_output() {
        Paint::OutputField(category)
    } else {
        Paint::CodeField(category)
    }
}

impl BlockNode {
    /// Paint the subtree with its top-left corner at `(left, top)`
    ///
    /// Nodes lying entirely outside the canvas are skipped.
    pub fn draw(&self, canvas: &mut dyn Canvas, metrics: &dyn LayoutMetrics, top: f32, left: f32) {
        if top > canvas.height()
            || left > canvas.width()
            || top + self.height < 0.0
            || left + self.width < 0.0
        {
            return;
        }

        let config = metrics.config();
        let category = self.schema.category();
        let body = Paint::Body(category);

        canvas.draw_rect(Rect::new(left, top, config.rail_width, self.height), body);

        let mut line_top = top;
        for (line, content) in self.lines.iter().enumerate() {
            let line_height = self.line_height(line);
            match content {
                LineContent::Sequence(seq) => seq.draw(
                    canvas,
                    metrics,
                    line_top + config.element_padding_vertical,
                    left + config.rail_width + config.element_padding_horizontal,
                ),
                LineContent::Slots(slots) => {
                    canvas.draw_rect(
                        Rect::new(left, line_top, self.line_width(line), line_height),
                        body,
                    );
                    let baseline = line_top + line_height / 2.0 + metrics.baseline_offset();

                    for (column, content) in slots.iter().enumerate() {
                        let Some(bounds) = self.slot_bounds(line, column, metrics) else {
                            continue;
                        };
                        let bounds = bounds.translate(left, top);
                        match self.schema.slot(line, column) {
                            Some(Slot::Text(label)) => canvas.draw_text(label, bounds.x, baseline),
                            Some(Slot::Code(kind)) => {
                                canvas.draw_rect(bounds, field_paint(*kind, category));
                                match content {
                                    SlotContent::Child(child) => child.draw(
                                        canvas,
                                        metrics,
                                        bounds.y + config.element_padding_vertical,
                                        bounds.x + config.element_padding_horizontal,
                                    ),
                                    SlotContent::Literal(value) => canvas.draw_text(
                                        value,
                                        bounds.x + config.inner_padding_horizontal,
                                        baseline,
                                    ),
                                    SlotContent::Empty => {}
                                }
                            }
                            None => {}
                        }
                    }
                }
            }
            line_top += line_height;
        }

        let closing = self.closing_line_height(metrics);
        if closing > 0.0 {
            canvas.draw_rect(
                Rect::new(left, top + self.height - closing, config.closing_line_width, closing),
                body,
            );
        }
    }

    // ── Summary ──
    //
    // Compact one-line rendering used while a block is held by a drag or
    // shown in a palette.

    /// Schema name, followed by `" ..."` when the node holds anything
    pub fn summary_text(&self) -> String {
        if self.has_content() {
            format!("{} ...", self.schema.name())
        } else {
            self.schema.name().to_string()
        }
    }

    pub fn summary_width(&self, metrics: &dyn LayoutMetrics) -> f32 {
        metrics.measure_text(&self.summary_text()) + 2.0 * metrics.config().inner_padding_horizontal
    }

    pub fn summary_height(&self, metrics: &dyn LayoutMetrics) -> f32 {
        metrics.text_height() + 2.0 * metrics.config().inner_padding_vertical
    }

    pub fn draw_summary(&self, canvas: &mut dyn Canvas, metrics: &dyn LayoutMetrics, top: f32, left: f32) {
        let width = self.summary_width(metrics);
        let height = self.summary_height(metrics);
        canvas.draw_rect(Rect::new(left, top, width, height), Paint::Body(self.schema.category()));
        canvas.draw_text(
            &self.summary_text(),
            left + metrics.config().inner_padding_horizontal,
            top + height / 2.0 + metrics.baseline_offset(),
        );
    }
}

impl BlockSequence {
    /// Paint the elements stacked downwards from `(left, top)`
    pub fn draw(&self, canvas: &mut dyn Canvas, metrics: &dyn LayoutMetrics, top: f32, left: f32) {
        let gap = metrics.config().element_padding_vertical;
        let mut top = top;
        for element in &self.elements {
            if top > canvas.height() {
                break;
            }
            element.draw(canvas, metrics, top, left);
            top += element.height + gap;
        }
    }
}
