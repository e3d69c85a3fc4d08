use crate::core::{ScreenPoint, Transform};
use crate::spec::Label;

/// Average glyph advance as a share of the font size, for hit boxes.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// A label that survived culling, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Position of the label in the specification's label list.
    pub slot: usize,
    pub label: Label,
    pub position: ScreenPoint,
}

impl PlacedLabel {
    #[must_use]
    pub fn hit(&self, point: ScreenPoint, font_size_px: f64) -> bool {
        let half_width = self.label.text.chars().count() as f64 * font_size_px * GLYPH_WIDTH_RATIO / 2.0;
        let half_height = font_size_px / 2.0;
        (point.x - self.position.x).abs() <= half_width
            && (point.y - self.position.y).abs() <= half_height
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LabelSlot {
    label: Label,
    frozen_x: Option<f64>,
    frozen_y: Option<f64>,
}

/// Screen placement for data labels across viewport changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelLayout {
    slots: Vec<LabelSlot>,
}

impl LabelLayout {
    #[must_use]
    pub fn new(labels: Vec<Label>) -> Self {
        Self {
            slots: labels
                .into_iter()
                .map(|label| LabelSlot {
                    label,
                    frozen_x: None,
                    frozen_y: None,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Projects every label and drops the ones outside the visible rectangle.
    ///
    /// Fixed axes are captured on the first call and reused afterwards.
    pub fn layout(&mut self, transform: &Transform) -> Vec<PlacedLabel> {
        let mut placed = Vec::with_capacity(self.slots.len());
        for (slot_index, slot) in self.slots.iter_mut().enumerate() {
            let x = if slot.label.fixed_x {
                *slot
                    .frozen_x
                    .get_or_insert_with(|| transform.x_to_screen(slot.label.x))
            } else {
                transform.x_to_screen(slot.label.x)
            };
            let y = if slot.label.fixed_y {
                *slot
                    .frozen_y
                    .get_or_insert_with(|| transform.y_to_screen(slot.label.y))
            } else {
                transform.y_to_screen(slot.label.y)
            };

            let position = ScreenPoint::new(x, y);
            if !transform.size.contains(position) {
                continue;
            }
            placed.push(PlacedLabel {
                slot: slot_index,
                label: slot.label.clone(),
                position,
            });
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::LabelLayout;
    use crate::core::{AxisRange, CanvasSize, ScreenPoint, Transform};
    use crate::spec::{Label, LabelKind};

    fn label(x: f64, y: f64, fixed_x: bool) -> Label {
        Label {
            x,
            y,
            fixed_x,
            fixed_y: false,
            text: "row".to_owned(),
            kind: LabelKind::Row,
            index: 0,
        }
    }

    fn transform(x0: f64, x1: f64) -> Transform {
        Transform::new(
            AxisRange::new(x0, x1),
            AxisRange::new(0.0, 10.0),
            CanvasSize::new(100, 100),
        )
    }

    #[test]
    fn labels_outside_view_are_removed() {
        let mut layout = LabelLayout::new(vec![label(5.0, 5.0, false), label(15.0, 5.0, false)]);
        let placed = layout.layout(&transform(0.0, 10.0));

        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].slot, 0);
        assert_eq!(placed[0].position, ScreenPoint::new(50.0, 50.0));
    }

    #[test]
    fn fixed_axis_is_frozen_after_first_layout() {
        let mut layout = LabelLayout::new(vec![label(5.0, 5.0, true), label(5.0, 5.0, false)]);
        layout.layout(&transform(0.0, 10.0));
        let placed = layout.layout(&transform(2.5, 7.5));

        assert_eq!(placed[0].position.x, 50.0);
        assert_eq!(placed[1].position.x, 50.0);

        let placed = layout.layout(&transform(0.0, 20.0));
        assert_eq!(placed[0].position.x, 50.0);
        assert_eq!(placed[1].position.x, 25.0);
    }

    #[test]
    fn hit_box_scales_with_text_length() {
        let mut layout = LabelLayout::new(vec![label(5.0, 5.0, false)]);
        let placed = layout.layout(&transform(0.0, 10.0));

        assert!(placed[0].hit(ScreenPoint::new(55.0, 52.0), 10.0));
        assert!(!placed[0].hit(ScreenPoint::new(60.0, 50.0), 10.0));
    }
}
