//! The value-adjustment algorithm: step arithmetic, off-grid snapping,
//! clamping, and precision normalization of the written-back text.
//!
//! Adjustment never fails on malformed input: the current value degrades to
//! 0, a missing/zero/negative step to 1, and missing bounds to the extreme
//! representable values.

use crate::dom::NodeId;
use crate::number::{is_integer_text, parse_number, parse_number_opt, parse_precision};
use crate::{Page, Result};

impl Page {
    /// Applies one step in `direction` (+1 or -1) to the field's value and
    /// writes the normalized text back.
    pub(crate) fn adjust(&mut self, direction: i32, field: NodeId) -> Result<()> {
        let current = parse_number(&self.dom.value(field).unwrap_or_default(), 0.0);
        let step = self.step_of(field);
        let mut proposed = current + f64::from(direction) * step;

        // Snap an off-grid value to the nearest step boundary in the
        // direction of travel, using float-remainder semantics.
        let remainder = current % step;
        if remainder != 0.0 {
            proposed += if direction > 0 {
                -f64::from(direction) * remainder
            } else {
                step - remainder
            };
        }

        let min = parse_number(
            &self.dom.attr(field, "min").unwrap_or_default(),
            f64::MIN,
        );
        let max = parse_number(
            &self.dom.attr(field, "max").unwrap_or_default(),
            f64::MAX,
        );
        proposed = proposed.max(min).min(max);

        let mut text = format!("{proposed}");
        if !is_integer_text(&text) {
            // Cap the displayed digits at the step's own precision so binary
            // floating-point noise never inflates the written-back text.
            let precision = parse_precision(&self.dom.attr(field, "step").unwrap_or_default(), 0)
                .min(parse_precision(&text, 0));
            text = format!("{proposed:.precision$}");
        }

        self.trace_line(format!(
            "[spin] adjust field={} dir={direction} value={text}",
            self.node_label(field)
        ));
        self.dom.set_value(field, text)
    }

    /// The field's step size; absent, unparsable, zero, or negative step
    /// attributes are normalized to the unit step.
    pub(crate) fn step_of(&self, field: NodeId) -> f64 {
        match self
            .dom
            .attr(field, "step")
            .and_then(|text| parse_number_opt(&text))
        {
            Some(step) if step > 0.0 => step,
            _ => 1.0,
        }
    }
}
